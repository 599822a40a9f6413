// aaxsplit - AAX audiobook chapter splitter
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Chapter inspection
//!
//! Reads chapter markers from an audiobook with FFprobe:
//! `ffprobe -show_chapters -loglevel error -print_format json <file>`
//!
//! # FFprobe Output
//! ```json
//! { "chapters": [
//!     { "id": 0, "start_time": "0.000000", "end_time": "612.345000",
//!       "tags": { "title": "Chapter 1" } }
//! ] }
//! ```
//!
//! Times are kept as the strings FFprobe printed; they go back to FFmpeg
//! unchanged, so no precision is lost in a float round trip.

use crate::audio::tools::{Toolchain, FFPROBE};
use crate::error::{AaxSplitError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// One chapter of the source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRecord {
    /// 1-based position in FFprobe's chapter list
    pub index: u32,
    pub title: String,
    /// Start time as printed by FFprobe (seconds)
    pub start_time: String,
    /// End time as printed by FFprobe (seconds)
    pub end_time: String,
}

/// Render a chapter as `{title}: {start}:{end}`
pub fn format_peek_line(chapter: &ChapterRecord) -> String {
    format!("{}: {}:{}", chapter.title, chapter.start_time, chapter.end_time)
}

/// Parse FFprobe `-show_chapters` JSON into chapter records
///
/// # Errors
/// - `ExternalTool` if the JSON does not have the expected shape (including
///   a missing or null `chapters` list) or a chapter has no `title` tag
pub fn parse_chapters(json: &str) -> Result<Vec<ChapterRecord>> {
    let listing: ChapterListing = serde_json::from_str(json).map_err(|e| {
        AaxSplitError::external(FFPROBE, format!("failed to parse chapter output: {}", e))
    })?;

    listing
        .chapters
        .into_iter()
        .enumerate()
        .map(|(pos, entry)| -> Result<ChapterRecord> {
            let index = pos as u32 + 1;
            let title = entry
                .tags
                .and_then(|mut tags| tags.remove("title"))
                .ok_or_else(|| {
                    AaxSplitError::external(
                        FFPROBE,
                        format!("chapter {} has no title tag", index),
                    )
                })?;

            Ok(ChapterRecord {
                index,
                title,
                start_time: entry.start_time,
                end_time: entry.end_time,
            })
        })
        .collect()
}

/// Reads chapter lists via FFprobe
#[derive(Debug, Clone, Default)]
pub struct ChapterInspector {
    tools: Toolchain,
}

impl ChapterInspector {
    pub fn new(tools: Toolchain) -> Self {
        Self { tools }
    }

    /// List the chapters of `file`, in FFprobe's order
    ///
    /// Every call runs FFprobe again; nothing is cached.
    ///
    /// # Errors
    /// - `ToolNotFound` if ffprobe is not on the search path
    /// - `ExternalTool` if ffprobe fails or its output cannot be parsed
    pub async fn inspect(&self, file: &Path) -> Result<Vec<ChapterRecord>> {
        let args = chapter_query_args(file);
        let stdout = self.tools.capture(FFPROBE, &args).await?;

        let json = String::from_utf8_lossy(&stdout);
        let chapters = parse_chapters(&json)?;
        debug!(file = %file.display(), count = chapters.len(), "Read chapters");
        Ok(chapters)
    }
}

fn chapter_query_args(file: &Path) -> Vec<String> {
    vec![
        "-show_chapters".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        file.to_string_lossy().to_string(),
    ]
}

/// FFprobe chapter output
#[derive(Debug, Deserialize)]
struct ChapterListing {
    chapters: Vec<ChapterEntry>,
}

#[derive(Debug, Deserialize)]
struct ChapterEntry {
    start_time: String,
    end_time: String,
    tags: Option<HashMap<String, String>>,
}
