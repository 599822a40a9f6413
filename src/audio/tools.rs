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


//! External tool lookup and execution
//!
//! FFprobe and FFmpeg are resolved on the execution path before they are
//! run, so a missing tool surfaces as `ToolNotFound` ahead of any parsing
//! or chapter work.

use crate::error::{AaxSplitError, Result};
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, trace};

/// Probing tool name
pub const FFPROBE: &str = "ffprobe";

/// Transcode tool name
pub const FFMPEG: &str = "ffmpeg";

/// Locates and runs the external media tools
#[derive(Debug, Clone, Default)]
pub struct Toolchain {
    /// Directories to search, in `PATH` syntax. `None` reads `PATH` at lookup time.
    search_path: Option<OsString>,
}

impl Toolchain {
    /// Resolve tools against the process `PATH`
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Resolve tools against an explicit search path instead of `PATH`
    pub fn with_search_path<P: Into<OsString>>(search_path: P) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }

    /// Find `tool` on the search path
    ///
    /// # Errors
    /// - `ToolNotFound` if no directory on the search path holds an executable `tool`
    pub fn locate(&self, tool: &str) -> Result<PathBuf> {
        let search_path = match &self.search_path {
            Some(path) => Some(path.clone()),
            None => env::var_os("PATH"),
        };

        let found = search_path.and_then(|path| find_in_path(tool, &path));
        match found {
            Some(path) => {
                trace!(tool, path = %path.display(), "Resolved external tool");
                Ok(path)
            }
            None => Err(AaxSplitError::tool_not_found(tool)),
        }
    }

    /// Run a tool and capture its stdout
    ///
    /// Stderr is captured too and folded into the error on a non-zero exit.
    pub async fn capture(&self, tool: &str, args: &[String]) -> Result<Vec<u8>> {
        let program = self.locate(tool)?;
        debug!(tool, ?args, "Running external tool (captured)");

        let output = Command::new(&program)
            .args(args)
            .output()
            .await
            .map_err(|e| spawn_error(tool, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let message = if stderr.is_empty() {
                format!("exited with status {}", output.status)
            } else {
                format!("exited with status {}: {}", output.status, stderr)
            };
            return Err(AaxSplitError::external(tool, message));
        }

        Ok(output.stdout)
    }

    /// Run an already-resolved tool with stdout/stderr passed through to the terminal
    pub(crate) async fn run_located(&self, tool: &str, program: &Path, args: &[String]) -> Result<()> {
        let status = Command::new(program)
            .args(args)
            .status()
            .await
            .map_err(|e| spawn_error(tool, e))?;

        if !status.success() {
            return Err(AaxSplitError::external(
                tool,
                format!("exited with status {}", status),
            ));
        }

        Ok(())
    }
}

fn spawn_error(tool: &str, e: std::io::Error) -> AaxSplitError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AaxSplitError::tool_not_found(tool)
    } else {
        AaxSplitError::external(tool, format!("failed to execute: {}", e))
    }
}

fn find_in_path(tool: &str, path_var: &OsString) -> Option<PathBuf> {
    for dir in env::split_paths(path_var) {
        let full = dir.join(tool);
        if is_executable(&full) {
            return Some(full);
        }
        #[cfg(windows)]
        {
            let exe = dir.join(format!("{tool}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
    }
    None
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
