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


//! Command-line surface
//!
//! Each subcommand has a typed argument struct; [`dispatch`] maps the
//! parsed command onto its handler.

use crate::audio::{
    format_peek_line, ChapterExporter, ChapterInspector, ChapterSelection, ExportOptions, Toolchain,
};
use crate::crypto::ActivationBytes;
use crate::error::{AaxSplitError, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "aaxsplit")]
#[command(about = "Split AAX audiobooks into per-chapter MP3 files", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List chapter titles and time ranges
    #[command(name = "peek-file")]
    PeekFile(PeekArgs),
    /// Convert AAX to one MP3 per chapter given a set of activation bytes
    #[command(name = "convert-serial")]
    ConvertSerial(ConvertArgs),
}

#[derive(Debug, Args)]
pub struct PeekArgs {
    /// Input AAX file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Activation bytes (accepted for symmetry with convert-serial; unused)
    #[arg(short, long)]
    pub activation_bytes: Option<String>,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Input AAX file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Activation bytes
    #[arg(short, long)]
    pub activation_bytes: Option<String>,

    /// ID3v2 album tag; if not specified, the tag from the AAX is kept
    #[arg(long)]
    pub album: Option<String>,

    /// First chapter to export (1-based, inclusive)
    #[arg(long, allow_negative_numbers = true)]
    pub start: Option<i64>,

    /// Last chapter to export (1-based, inclusive)
    #[arg(long, allow_negative_numbers = true)]
    pub end: Option<i64>,

    /// Text inserted before the chapter number in output names
    #[arg(long)]
    pub suffix: Option<String>,

    /// Directory for the MP3 files (default: current directory)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Fail instead of replacing existing output files
    #[arg(long)]
    pub no_overwrite: bool,
}

/// Validated convert-serial input
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub file: PathBuf,
    pub activation_bytes: ActivationBytes,
    pub options: ExportOptions,
}

impl ConvertArgs {
    /// Check required arguments and build the export request
    ///
    /// # Errors
    /// - `Argument` if `file` or `activation_bytes` is missing or empty
    pub fn into_request(self) -> Result<ConvertRequest> {
        let file = self
            .file
            .filter(|f| !f.as_os_str().is_empty())
            .ok_or_else(|| AaxSplitError::argument("File and activation_bytes required (missing --file)"))?;
        let key = self
            .activation_bytes
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AaxSplitError::argument("File and activation_bytes required (missing --activation-bytes)")
            })?;

        Ok(ConvertRequest {
            file,
            activation_bytes: ActivationBytes::new(key),
            options: ExportOptions {
                album: self.album,
                suffix: self.suffix,
                selection: ChapterSelection::new(self.start, self.end),
                output_dir: self.output_dir,
                overwrite: !self.no_overwrite,
            },
        })
    }
}

/// Run one parsed command
///
/// `out` receives the command's user-facing output (the peek listing).
pub async fn dispatch<W: Write>(command: Commands, tools: &Toolchain, out: &mut W) -> Result<()> {
    match command {
        Commands::PeekFile(args) => peek_file(args, tools, out).await,
        Commands::ConvertSerial(args) => convert_serial(args, tools).await,
    }
}

async fn peek_file<W: Write>(args: PeekArgs, tools: &Toolchain, out: &mut W) -> Result<()> {
    let inspector = ChapterInspector::new(tools.clone());
    let chapters = inspector.inspect(&args.file).await?;

    for chapter in &chapters {
        writeln!(out, "{}", format_peek_line(chapter))?;
    }
    out.flush()?;

    Ok(())
}

async fn convert_serial(args: ConvertArgs, tools: &Toolchain) -> Result<()> {
    let request = args.into_request()?;

    let inspector = ChapterInspector::new(tools.clone());
    let chapters = inspector.inspect(&request.file).await?;
    debug!(?chapters, "Chapters read from source");

    let exporter = ChapterExporter::new(tools.clone());
    let written = exporter
        .export(&chapters, &request.file, &request.activation_bytes, &request.options)
        .await?;

    info!(files = written.len(), "Conversion finished");
    Ok(())
}
