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


//! Chapter inspection and per-chapter export
//!
//! # Module Organization
//!
//! ## tools
//! Locating and running the external media tools:
//! - `Toolchain` - `PATH` lookup, captured and pass-through execution
//!
//! ## chapters
//! Reading chapter markers:
//! - `ChapterRecord` - Index, title, start and end time of one chapter
//! - `ChapterInspector` - Runs FFprobe and parses its JSON
//!
//! ## exporter
//! Splitting into MP3 files:
//! - `ChapterSelection` - Inclusive 1-based chapter range
//! - `ExportOptions` - Album tag, file suffix, output directory
//! - `ExportJob` - One chapter's FFmpeg command
//! - `ChapterExporter` - Runs the jobs in chapter order
//!
//! # FFmpeg Integration
//!
//! FFmpeg and FFprobe must be installed and available in PATH:
//! - FFprobe: chapter extraction
//! - FFmpeg: AAX decryption (`-activation_bytes`), slicing, MP3 encoding
//!
//! ## Installation
//! - macOS: `brew install ffmpeg`
//! - Linux: `apt-get install ffmpeg` or `yum install ffmpeg`
//! - Windows: Download from https://ffmpeg.org/download.html

pub mod chapters;
pub mod exporter;
pub mod tools;

pub use chapters::{format_peek_line, parse_chapters, ChapterInspector, ChapterRecord};
pub use exporter::{output_file_name, ChapterExporter, ChapterSelection, ExportJob, ExportOptions};
pub use tools::Toolchain;
