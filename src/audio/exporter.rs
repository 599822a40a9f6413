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


//! Per-chapter MP3 export
//!
//! # Split by Chapter
//! - One FFmpeg run per selected chapter, in ascending chapter order
//! - Command:
//!   `ffmpeg -y -activation_bytes KEY -i book.aax -ss START -to END
//!    -metadata title=TITLE [-metadata album=ALBUM] -c:a mp3 -vn book_N.mp3`
//! - Output files: `{stem}_{n}.mp3`, or `{stem}_{suffix}_{n}.mp3` with a suffix
//!
//! # Failure Policy
//! The first failing chapter aborts the run. Files already written stay in
//! place and later chapters are not attempted.

use crate::audio::chapters::ChapterRecord;
use crate::audio::tools::{Toolchain, FFMPEG};
use crate::crypto::ActivationBytes;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Inclusive, 1-based chapter range
///
/// `None` on either side leaves that side unbounded. Bounds are plain
/// integers: a start of zero or below selects from the first chapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChapterSelection {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl ChapterSelection {
    pub fn new(start: Option<i64>, end: Option<i64>) -> Self {
        Self { start, end }
    }

    /// Every chapter
    pub fn all() -> Self {
        Self::default()
    }

    /// Whether the chapter at 1-based `index` is selected
    pub fn contains(&self, index: u32) -> bool {
        let index = i64::from(index);
        self.start.map_or(true, |start| index >= start)
            && self.end.map_or(true, |end| index <= end)
    }

    /// Selected chapters, in their original order
    pub fn apply<'a>(
        &self,
        chapters: &'a [ChapterRecord],
    ) -> impl Iterator<Item = &'a ChapterRecord> + 'a {
        let selection = *self;
        chapters.iter().filter(move |c| selection.contains(c.index))
    }
}

/// Export settings
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Album tag for every chapter; when unset FFmpeg keeps the source's own tags
    pub album: Option<String>,

    /// Inserted between the stem and the chapter number
    pub suffix: Option<String>,

    pub selection: ChapterSelection,

    /// Where output files go; `None` means the current working directory
    pub output_dir: Option<PathBuf>,

    /// Pass `-y` so existing outputs are replaced
    pub overwrite: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            album: None,
            suffix: None,
            selection: ChapterSelection::all(),
            output_dir: None,
            overwrite: true,
        }
    }
}

/// Output file name for one chapter: `{stem}_{[suffix_]}{index}.mp3`
pub fn output_file_name(stem: &str, suffix: Option<&str>, index: u32) -> String {
    match suffix.filter(|s| !s.is_empty()) {
        Some(suffix) => format!("{}_{}_{}.mp3", stem, suffix, index),
        None => format!("{}_{}.mp3", stem, index),
    }
}

/// A single chapter's FFmpeg run
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub source_file: PathBuf,
    pub activation_bytes: ActivationBytes,
    pub chapter: ChapterRecord,
    pub album_override: Option<String>,
    pub output_path: PathBuf,
    pub overwrite: bool,
}

impl ExportJob {
    /// FFmpeg arguments (program name excluded)
    pub fn ffmpeg_args(&self) -> Vec<String> {
        self.build_args(self.activation_bytes.expose())
    }

    /// Same as [`ExportJob::ffmpeg_args`] with the key masked, for logging
    pub fn redacted_args(&self) -> Vec<String> {
        self.build_args(&self.activation_bytes.redacted())
    }

    fn build_args(&self, key: &str) -> Vec<String> {
        let mut cmd = Vec::with_capacity(18);

        if self.overwrite {
            cmd.push("-y".to_string());
        }

        cmd.push("-activation_bytes".to_string());
        cmd.push(key.to_string());
        cmd.push("-i".to_string());
        cmd.push(self.source_file.to_string_lossy().to_string());

        // Time range, verbatim from ffprobe
        cmd.push("-ss".to_string());
        cmd.push(self.chapter.start_time.clone());
        cmd.push("-to".to_string());
        cmd.push(self.chapter.end_time.clone());

        cmd.push("-metadata".to_string());
        cmd.push(format!("title={}", self.chapter.title));

        if let Some(album) = &self.album_override {
            cmd.push("-metadata".to_string());
            cmd.push(format!("album={}", album));
        }

        cmd.push("-c:a".to_string());
        cmd.push("mp3".to_string());
        cmd.push("-vn".to_string());

        cmd.push(self.output_path.to_string_lossy().to_string());

        cmd
    }
}

/// Runs FFmpeg once per selected chapter
#[derive(Debug, Clone, Default)]
pub struct ChapterExporter {
    tools: Toolchain,
}

impl ChapterExporter {
    pub fn new(tools: Toolchain) -> Self {
        Self { tools }
    }

    /// Build the jobs for every selected chapter without running anything
    pub fn plan(
        chapters: &[ChapterRecord],
        source: &Path,
        activation_bytes: &ActivationBytes,
        options: &ExportOptions,
    ) -> Vec<ExportJob> {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "audiobook".to_string());
        let album = options.album.clone().filter(|a| !a.is_empty());

        options
            .selection
            .apply(chapters)
            .map(|chapter| {
                let file_name = output_file_name(&stem, options.suffix.as_deref(), chapter.index);
                let output_path = match &options.output_dir {
                    Some(dir) => dir.join(file_name),
                    None => PathBuf::from(file_name),
                };

                ExportJob {
                    source_file: source.to_path_buf(),
                    activation_bytes: activation_bytes.clone(),
                    chapter: chapter.clone(),
                    album_override: album.clone(),
                    output_path,
                    overwrite: options.overwrite,
                }
            })
            .collect()
    }

    /// Export the selected chapters, returning the files written
    ///
    /// # Errors
    /// - `ToolNotFound` if ffmpeg is not on the search path (checked before the first chapter)
    /// - `ExternalTool` for the first chapter whose ffmpeg run fails; the run stops there
    pub async fn export(
        &self,
        chapters: &[ChapterRecord],
        source: &Path,
        activation_bytes: &ActivationBytes,
        options: &ExportOptions,
    ) -> Result<Vec<PathBuf>> {
        let ffmpeg = self.tools.locate(FFMPEG)?;

        let jobs = Self::plan(chapters, source, activation_bytes, options);
        if jobs.is_empty() {
            warn!(
                available = chapters.len(),
                start = ?options.selection.start,
                end = ?options.selection.end,
                "No chapters selected; nothing to export"
            );
            return Ok(Vec::new());
        }
        debug!(selected = jobs.len(), available = chapters.len(), "Exporting chapters");

        let mut written = Vec::with_capacity(jobs.len());
        for job in jobs {
            info!(
                chapter = job.chapter.index,
                title = %job.chapter.title,
                output = %job.output_path.display(),
                command = %format!("{} {}", FFMPEG, job.redacted_args().join(" ")),
                "Exporting chapter"
            );

            self.tools
                .run_located(FFMPEG, &ffmpeg, &job.ffmpeg_args())
                .await?;

            written.push(job.output_path);
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AaxSplitError;
    use std::collections::HashSet;

    fn chapter(index: u32, title: &str, start: &str, end: &str) -> ChapterRecord {
        ChapterRecord {
            index,
            title: title.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
        }
    }

    fn three_chapters() -> Vec<ChapterRecord> {
        vec![
            chapter(1, "Ch1", "0", "10"),
            chapter(2, "Ch2", "10", "25"),
            chapter(3, "Ch3", "25", "40"),
        ]
    }

    fn key() -> ActivationBytes {
        ActivationBytes::new("1CEB00DA")
    }

    fn metadata_values(args: &[String]) -> Vec<&str> {
        args.windows(2)
            .filter(|w| w[0] == "-metadata")
            .map(|w| w[1].as_str())
            .collect()
    }

    #[test]
    fn test_selection_bounds() {
        let sel = ChapterSelection::new(Some(2), Some(3));
        assert!(!sel.contains(1));
        assert!(sel.contains(2));
        assert!(sel.contains(3));
        assert!(!sel.contains(4));
    }

    #[test]
    fn test_selection_open_ends() {
        let from_two = ChapterSelection::new(Some(2), None);
        assert!(!from_two.contains(1));
        assert!(from_two.contains(500));

        let negative_start = ChapterSelection::new(Some(-1), Some(2));
        assert!(negative_start.contains(1));
        assert!(negative_start.contains(2));
        assert!(!negative_start.contains(3));

        let negative_end = ChapterSelection::new(None, Some(-1));
        assert!(!negative_end.contains(1));

        let up_to_two = ChapterSelection::new(None, Some(2));
        assert!(up_to_two.contains(1));
        assert!(!up_to_two.contains(3));

        assert!(ChapterSelection::all().contains(1));
    }

    #[test]
    fn test_selection_matches_range_for_all_bounds() {
        let chapters: Vec<ChapterRecord> = (1..=6)
            .map(|i| chapter(i, &format!("Ch{}", i), "0", "1"))
            .collect();
        let bounds = [None, Some(-2), Some(0), Some(1), Some(3), Some(6), Some(9)];

        for start in bounds {
            for end in bounds {
                let sel = ChapterSelection::new(start, end);
                let got: Vec<u32> = sel.apply(&chapters).map(|c| c.index).collect();
                let want: Vec<u32> = (1..=6)
                    .filter(|i| {
                        let i = i64::from(*i);
                        start.map_or(true, |s| i >= s) && end.map_or(true, |e| i <= e)
                    })
                    .collect();
                assert_eq!(got, want, "start={:?} end={:?}", start, end);
            }
        }
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("book", None, 3), "book_3.mp3");
        assert_eq!(output_file_name("book", Some(""), 3), "book_3.mp3");
        assert_eq!(output_file_name("book", Some("part"), 3), "book_part_3.mp3");
    }

    #[test]
    fn test_plan_range_scenario() {
        let options = ExportOptions {
            selection: ChapterSelection::new(Some(2), Some(3)),
            ..Default::default()
        };
        let jobs = ChapterExporter::plan(&three_chapters(), Path::new("/books/Tower.aax"), &key(), &options);

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].output_path, PathBuf::from("Tower_2.mp3"));
        assert_eq!(jobs[1].output_path, PathBuf::from("Tower_3.mp3"));
        assert_eq!(metadata_values(&jobs[0].ffmpeg_args()), vec!["title=Ch2"]);
        assert_eq!(metadata_values(&jobs[1].ffmpeg_args()), vec!["title=Ch3"]);
    }

    #[test]
    fn test_ffmpeg_args_layout() {
        let jobs = ChapterExporter::plan(
            &three_chapters()[1..2],
            Path::new("Tower.aax"),
            &key(),
            &ExportOptions::default(),
        );
        assert_eq!(
            jobs[0].ffmpeg_args(),
            vec![
                "-y", "-activation_bytes", "1CEB00DA", "-i", "Tower.aax", "-ss", "10", "-to",
                "25", "-metadata", "title=Ch2", "-c:a", "mp3", "-vn", "Tower_2.mp3",
            ]
        );
    }

    #[test]
    fn test_album_tag_only_when_set() {
        let chapters = three_chapters();
        let source = Path::new("Tower.aax");

        let untagged = ChapterExporter::plan(&chapters, source, &key(), &ExportOptions::default());
        for job in &untagged {
            assert!(metadata_values(&job.ffmpeg_args()).iter().all(|m| !m.starts_with("album=")));
        }

        let empty = ExportOptions {
            album: Some(String::new()),
            ..Default::default()
        };
        for job in ChapterExporter::plan(&chapters, source, &key(), &empty) {
            assert!(job.album_override.is_none());
        }

        let tagged = ExportOptions {
            album: Some("The Tower of the Swallow".to_string()),
            ..Default::default()
        };
        for job in ChapterExporter::plan(&chapters, source, &key(), &tagged) {
            assert!(metadata_values(&job.ffmpeg_args()).contains(&"album=The Tower of the Swallow"));
        }
    }

    #[test]
    fn test_no_overwrite_drops_flag() {
        let options = ExportOptions {
            overwrite: false,
            ..Default::default()
        };
        let jobs = ChapterExporter::plan(&three_chapters(), Path::new("Tower.aax"), &key(), &options);
        assert!(jobs.iter().all(|j| !j.ffmpeg_args().contains(&"-y".to_string())));
    }

    #[test]
    fn test_output_names_distinct_with_suffix_and_dir() {
        let chapters: Vec<ChapterRecord> = (1..=12)
            .map(|i| chapter(i, "x", "0", "1"))
            .collect();
        let options = ExportOptions {
            suffix: Some("disc1".to_string()),
            output_dir: Some(PathBuf::from("/tmp/out")),
            ..Default::default()
        };
        let jobs = ChapterExporter::plan(&chapters, Path::new("Tower.aax"), &key(), &options);

        let names: HashSet<&PathBuf> = jobs.iter().map(|j| &j.output_path).collect();
        assert_eq!(names.len(), 12);
        assert_eq!(jobs[10].output_path, PathBuf::from("/tmp/out/Tower_disc1_11.mp3"));
    }

    #[test]
    fn test_redacted_args_hide_key() {
        let jobs = ChapterExporter::plan(&three_chapters(), Path::new("Tower.aax"), &key(), &ExportOptions::default());
        let logged = jobs[0].redacted_args().join(" ");
        assert!(!logged.contains("1CEB00DA"));
        assert!(logged.contains("-activation_bytes 1C******"));
    }

    #[tokio::test]
    async fn test_export_without_ffmpeg() {
        let exporter = ChapterExporter::new(Toolchain::with_search_path(""));
        let err = exporter
            .export(&three_chapters(), Path::new("Tower.aax"), &key(), &ExportOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AaxSplitError::ToolNotFound { ref tool } if tool == "ffmpeg"));
    }
}
