//! Citation record structures.
//!
//! - [`RisRecord`]: an ordered tag → value mapping built from an RIS block.
//! - [`PubMedRecord`]: the raw lines of a PubMed block, without line endings.
//!
//! Both implement [`CitationRecord`], which is all the dedup engine needs.

use crate::doi;
use indexmap::IndexMap;

/// RIS tag holding the DOI.
pub const DOI_TAG: &str = "DO";

/// RIS tag holding the abstract, used as the merge tie-breaker.
pub const ABSTRACT_TAG: &str = "AB";

/// Common interface of citation records seen by the dedup engine.
pub trait CitationRecord {
    /// The record's DOI, or `None` if it has no usable identifier.
    fn identifier(&self) -> Option<&str>;

    /// Returns true if the record carries no content at all.
    fn is_empty(&self) -> bool;
}

/// An RIS citation.
///
/// Fields are stored in insertion order using `IndexMap`, so a record is
/// written back with its tags in the order they were first seen. Tags are
/// unique: a repeated tag extends the existing value (see [`add_field`]).
///
/// [`add_field`]: RisRecord::add_field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RisRecord {
    /// Tag → value, preserves insertion order
    pub fields: IndexMap<String, String>,
}

impl RisRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`add_field`](Self::add_field).
    ///
    /// ```
    /// use citedup::RisRecord;
    ///
    /// let record = RisRecord::new()
    ///     .with_field("TY", "JOUR")
    ///     .with_field("KW", "alpha")
    ///     .with_field("KW", "beta");
    /// assert_eq!(record.get("KW"), Some("alpha beta"));
    /// ```
    #[must_use]
    pub fn with_field(mut self, tag: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_field(tag, value);
        self
    }

    /// Add a field value.
    ///
    /// The first occurrence of a tag sets its value. Later occurrences append
    /// `" " + value` to it; values are never overwritten.
    pub fn add_field(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.fields.entry(tag.into()) {
            indexmap::map::Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.push(' ');
                existing.push_str(&value);
            },
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(value);
            },
        }
    }

    /// Get a field value by tag.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.fields.get(tag).map(String::as_str)
    }

    /// Length of the abstract in characters, 0 if absent.
    #[must_use]
    pub fn abstract_len(&self) -> usize {
        self.get(ABSTRACT_TAG).map_or(0, |text| text.chars().count())
    }

    /// Number of distinct tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over `(tag, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(tag, value)| (tag.as_str(), value.as_str()))
    }
}

impl CitationRecord for RisRecord {
    fn identifier(&self) -> Option<&str> {
        doi::from_field(self.get(DOI_TAG))
    }

    fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A PubMed citation, kept as its raw lines.
///
/// No tag map is built: the identifier is found by scanning the `LID` / `AID`
/// lines and the record is written back unmodified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PubMedRecord {
    /// Source lines without line endings
    pub lines: Vec<String>,
}

impl PubMedRecord {
    /// Create a record from its raw lines.
    #[must_use]
    pub fn new(lines: Vec<String>) -> Self {
        PubMedRecord { lines }
    }

    /// The record text, lines joined with `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl CitationRecord for PubMedRecord {
    fn identifier(&self) -> Option<&str> {
        doi::extract_from_lines(self.lines.iter().map(String::as_str))
    }

    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
