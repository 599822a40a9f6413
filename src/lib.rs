//! aaxsplit - split AAX audiobooks into per-chapter MP3 files
//!
//! Chapter boundaries come from FFprobe; decryption, slicing and encoding
//! are done by FFmpeg, one run per chapter.

pub mod audio;
pub mod crypto;
pub mod error;

#[cfg(feature = "cli")]
pub mod commands;

pub use error::{AaxSplitError, Result};
