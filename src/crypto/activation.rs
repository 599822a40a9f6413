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


//! Activation bytes handling
//!
//! # What are Activation Bytes?
//! - 4-byte key tied to an Audible account
//! - Used by FFmpeg (`-activation_bytes`) to decrypt AAX files
//! - Usually written as 8 hex characters (e.g., "1CEB00DA")
//!
//! # Handling
//! - Passed to FFmpeg verbatim; FFmpeg is the only judge of correctness
//! - Shape is checked only to emit a warning
//! - Never log or expose in plaintext

use std::fmt;
use tracing::warn;

/// Activation bytes as supplied by the user
///
/// Wraps the raw string so that `Debug` and `Display` never print the key.
/// Use [`ActivationBytes::expose`] where the real value has to reach FFmpeg.
#[derive(Clone, PartialEq, Eq)]
pub struct ActivationBytes(String);

impl ActivationBytes {
    /// Wrap a key exactly as given
    pub fn new<S: Into<String>>(key: S) -> Self {
        let key = Self(key.into());
        if !key.is_well_formed() {
            warn!(
                length = key.0.len(),
                "Activation bytes do not look like 8 hex characters; passing them to ffmpeg as-is"
            );
        }
        key
    }

    /// The plaintext key, for building the FFmpeg command line
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the key has the usual 8-hex-character shape
    ///
    /// Says nothing about whether the key actually decrypts the file.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == 8 && self.0.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Masked form for logs, e.g. `1C******`
    pub fn redacted(&self) -> String {
        let visible: String = self.0.chars().take(2).collect();
        let hidden = self.0.chars().count().saturating_sub(2);
        format!("{}{}", visible, "*".repeat(hidden))
    }
}

impl fmt::Debug for ActivationBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActivationBytes").field(&self.redacted()).finish()
    }
}

impl fmt::Display for ActivationBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}
