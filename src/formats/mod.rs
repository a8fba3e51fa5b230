//! Citation export formats.
//!
//! This module provides a uniform interface for reading and writing the two
//! supported line-tagged formats. Both implement the same traits.
//!
//! # Supported Formats
//!
//! | Format | Module | Record end | Record type |
//! |--------|--------|------------|-------------|
//! | RIS | [`ris`] | `ER  -` marker line | [`RisRecord`](crate::RisRecord) |
//! | PubMed (MEDLINE) | [`pubmed`] | blank line | [`PubMedRecord`](crate::PubMedRecord) |
//!
//! # Usage
//!
//! ```
//! use citedup::formats::{FormatReader, ris::RisReader};
//! use std::io::Cursor;
//!
//! let mut reader = RisReader::new(Cursor::new("TY  - JOUR\nDO  - 10.1000/x\nER  - \n"));
//! let record = reader.read_record()?.unwrap();
//! assert_eq!(record.get("DO"), Some("10.1000/x"));
//! # Ok::<(), citedup::CiteError>(())
//! ```

mod traits;

use serde::Serialize;

pub mod pubmed;
pub mod ris;

pub use traits::{FormatReader, FormatReaderExt, FormatWriter, RecordIterator};

/// Supported format types for detection and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Format {
    /// RIS tagged format (`.ris`)
    Ris,
    /// PubMed / MEDLINE tagged format (`.txt`, `.nbib`)
    PubMed,
}

impl Format {
    /// Detect format from file extension.
    ///
    /// Returns `None` if the extension is not recognized.
    ///
    /// # Example
    ///
    /// ```
    /// use citedup::formats::Format;
    ///
    /// assert_eq!(Format::from_extension("RIS"), Some(Format::Ris));
    /// assert_eq!(Format::from_extension("nbib"), Some(Format::PubMed));
    /// assert_eq!(Format::from_extension("bib"), None);
    /// ```
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "ris" => Some(Self::Ris),
            "txt" | "nbib" | "medline" => Some(Self::PubMed),
            _ => None,
        }
    }

    /// Default glob for locating input files of this format.
    #[must_use]
    pub const fn default_pattern(&self) -> &'static str {
        match self {
            Self::Ris => "*.ris",
            Self::PubMed => "pubmed-*.txt",
        }
    }

    /// Get the human-readable name for this format.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ris => "RIS",
            Self::PubMed => "PubMed",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_extension("ris"), Some(Format::Ris));
        assert_eq!(Format::from_extension("TXT"), Some(Format::PubMed));
        assert_eq!(Format::from_extension("medline"), Some(Format::PubMed));
        assert_eq!(Format::from_extension("mrc"), None);
    }

    #[test]
    fn test_default_patterns() {
        assert_eq!(Format::Ris.default_pattern(), "*.ris");
        assert_eq!(Format::PubMed.default_pattern(), "pubmed-*.txt");
    }

    #[test]
    fn test_format_display() {
        assert_eq!(format!("{}", Format::Ris), "RIS");
        assert_eq!(Format::PubMed.to_string(), "PubMed");
    }
}
