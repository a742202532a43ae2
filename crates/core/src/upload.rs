//! Accepted upload kinds and the single-slot result type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stem every stored upload is renamed to, whatever the client called it.
pub const CANONICAL_STEM: &str = "cfip";

/// File kinds the slot accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Csv,
    Txt,
}

impl FileKind {
    /// Classify a client-supplied filename by its last extension.
    ///
    /// The comparison is case-insensitive, so `DATA.CSV` is a csv upload.
    /// An empty name means the client submitted the form without picking a file.
    pub fn from_filename(filename: &str) -> crate::Result<Self> {
        if filename.is_empty() {
            return Err(crate::Error::NoFileSelected);
        }

        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .ok_or_else(|| crate::Error::UnsupportedType(filename.to_string()))?;

        Self::parse(extension).ok_or_else(|| crate::Error::UnsupportedType(filename.to_string()))
    }

    /// Parse a bare extension (without the dot).
    pub fn parse(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    /// Get the lowercase extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Txt => "txt",
        }
    }

    /// The fixed name the slot stores this kind under.
    pub fn canonical_name(&self) -> String {
        format!("{CANONICAL_STEM}.{}", self.extension())
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Result of writing an upload into the slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Canonical name the content was stored under.
    pub filename: String,
    /// Name the client sent.
    pub originalname: String,
    /// Whether any file occupied the slot before this upload.
    pub replaced: bool,
    /// Stored size in bytes.
    pub size: u64,
    /// Earlier files that could not be removed while making room.
    #[serde(skip)]
    pub stale_left: usize,
}
