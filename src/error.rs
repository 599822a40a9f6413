//! Error types for aaxsplit
//!
//! All fallible operations return [`Result<T>`], backed by a single
//! `thiserror` enum. Nothing is recovered internally: every error ends the
//! run and reaches the shell as a non-zero exit status.
//!
//! ## Categories
//!
//! - **Tooling**: `ffprobe` / `ffmpeg` missing from `PATH`, non-zero exits,
//!   output that does not match the expected JSON shape
//! - **Arguments**: required command-line values missing
//! - **I/O**: writing command output, via `#[from]`

use thiserror::Error;

/// Result type alias using our AaxSplitError type
pub type Result<T> = std::result::Result<T, AaxSplitError>;

/// Main error type for aaxsplit
#[derive(Error, Debug)]
pub enum AaxSplitError {
    // ===== Tooling Errors =====

    /// A required external tool is not on the execution path
    #[error("{tool} not found. Please install FFmpeg and ensure {tool} is in your PATH.")]
    ToolNotFound {
        /// Program name that was looked up (e.g. "ffprobe")
        tool: String,
    },

    /// External tool failed to run, exited non-zero, or produced unparseable output
    #[error("{tool} failed: {message}")]
    ExternalTool {
        tool: String,
        message: String,
    },

    // ===== Argument Errors =====

    /// Required command-line argument missing or unusable
    #[error("Invalid arguments: {0}")]
    Argument(String),

    // ===== External Library Errors =====

    /// Standard I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AaxSplitError {
    /// Create a ToolNotFound error
    pub fn tool_not_found<S: Into<String>>(tool: S) -> Self {
        AaxSplitError::ToolNotFound { tool: tool.into() }
    }

    /// Create an ExternalTool error
    pub fn external<T: Into<String>, M: Into<String>>(tool: T, message: M) -> Self {
        AaxSplitError::ExternalTool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create an Argument error
    pub fn argument<S: Into<String>>(message: S) -> Self {
        AaxSplitError::Argument(message.into())
    }

    /// Get user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            AaxSplitError::ToolNotFound { tool } => format!(
                "{} is required but was not found. Install FFmpeg (which ships ffmpeg and ffprobe) \
                 and make sure it is on your PATH.",
                tool
            ),
            AaxSplitError::ExternalTool { tool, message } => {
                format!("{} did not complete successfully: {}", tool, message)
            }
            AaxSplitError::Argument(message) => {
                format!("{}. Run with --help for usage.", message)
            }
            _ => self.to_string(),
        }
    }
}
