//! Reading accuracy level of a transcription.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::DocumentError;

/// How far a transcription has been checked by a human.
///
/// The string form is shared by the wire format, cache keys and facet keys.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ReadingLevel {
    /// Raw OCR output.
    #[default]
    #[serde(rename = "OCR")]
    Ocr,
    /// Human proofread text.
    #[serde(rename = "PROOF_READ")]
    ProofRead,
}

impl ReadingLevel {
    /// All levels in their canonical order.
    pub const ALL: [Self; 2] = [Self::Ocr, Self::ProofRead];

    /// Returns the stable string form of this level.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ocr => "OCR",
            Self::ProofRead => "PROOF_READ",
        }
    }
}

impl fmt::Display for ReadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingLevel {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| DocumentError::UnknownLevel {
                name: s.to_string(),
            })
    }
}
