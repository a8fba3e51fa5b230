//! DOI identifier extraction.
//!
//! Both input formats use the DOI as the dedup key, but they place it
//! differently:
//!
//! - RIS carries it as the value of the `DO` field ([`from_field`]).
//! - PubMed embeds it in free text on `LID` / `AID` lines, suffixed with
//!   `[doi]` ([`extract_from_lines`]).
//!
//! Every function here is pure. Malformed input yields `None`, never an error.
//!
//! # Examples
//!
//! ```
//! use citedup::doi;
//!
//! let line = "AID - 10.1016/j.cell.2020.01.001 [doi]";
//! assert_eq!(doi::extract_tagged(line), Some("10.1016/j.cell.2020.01.001"));
//! assert!(doi::is_canonical("10.1016/j.cell.2020.01.001"));
//! ```

use lazy_static::lazy_static;
use regex::Regex;

/// Tag markers of the PubMed lines that may carry a DOI.
pub const CANDIDATE_MARKERS: [&str; 2] = ["LID -", "AID -"];

lazy_static! {
    static ref TAGGED_DOI: Regex =
        Regex::new(r"(?i)(10\.\d{4,9}/[-._;()/:A-Z0-9]+)\s\[doi\]").unwrap();
    static ref CANONICAL_DOI: Regex =
        Regex::new(r"(?i)^10\.\d{4,9}/[-._;()/:A-Z0-9]+$").unwrap();
}

/// Returns true if `value` has the canonical DOI shape
/// (`10.` + 4-9 digit registrant + `/` + suffix).
#[must_use]
pub fn is_canonical(value: &str) -> bool {
    CANONICAL_DOI.is_match(value)
}

/// Returns true if a PubMed line is a location or article identifier line.
#[must_use]
pub fn is_candidate_line(line: &str) -> bool {
    CANDIDATE_MARKERS.iter().any(|marker| line.contains(marker))
}

/// Extract a DOI immediately followed by whitespace and `[doi]`.
///
/// The match is case-insensitive; the separator must be a single whitespace
/// character.
#[must_use]
pub fn extract_tagged(line: &str) -> Option<&str> {
    TAGGED_DOI
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Scan PubMed record lines for the first candidate line carrying a DOI.
///
/// Only lines containing an `LID -` or `AID -` marker are inspected. Scanning
/// stops at the first line that yields a match.
///
/// ```
/// use citedup::doi::extract_from_lines;
///
/// let lines = [
///     "PMID- 1",
///     "AID - S0092-8674(20)30001-1 [pii]",
///     "AID - 10.1016/j.cell.2020.01.001 [doi]",
/// ];
/// assert_eq!(extract_from_lines(lines), Some("10.1016/j.cell.2020.01.001"));
/// ```
pub fn extract_from_lines<'a, I>(lines: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .filter(|line| is_candidate_line(line))
        .find_map(extract_tagged)
}

/// Read an identifier straight from a field value.
///
/// An absent field and an empty (after trimming) value are both `None`.
#[must_use]
pub fn from_field(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_tagged_basic() {
        assert_eq!(
            extract_tagged("LID - 10.1000/xyz123 [doi]"),
            Some("10.1000/xyz123")
        );
    }

    #[test]
    fn test_extract_tagged_case_insensitive() {
        assert_eq!(
            extract_tagged("AID - 10.1002/ABC.def-1 [DOI]"),
            Some("10.1002/ABC.def-1")
        );
    }

    #[test]
    fn test_extract_tagged_requires_suffix() {
        assert_eq!(extract_tagged("AID - 10.1000/xyz123 [pii]"), None);
        assert_eq!(extract_tagged("AID - 10.1000/xyz123"), None);
    }

    #[test]
    fn test_extract_tagged_separator_is_whitespace_sensitive() {
        assert_eq!(extract_tagged("AID - 10.1000/xyz123[doi]"), None);
        assert_eq!(
            extract_tagged("AID - 10.1000/xyz123\t[doi]"),
            Some("10.1000/xyz123")
        );
    }

    #[test]
    fn test_extract_tagged_registrant_width() {
        assert_eq!(extract_tagged("AID - 10.123/abc [doi]"), None);
        assert_eq!(
            extract_tagged("AID - 10.123456789/abc [doi]"),
            Some("10.123456789/abc")
        );
    }

    #[test]
    fn test_extract_from_lines_skips_non_candidates() {
        let lines = ["TI  - about 10.1000/xyz123 [doi]", "AB  - nothing"];
        assert_eq!(extract_from_lines(lines), None);
    }

    #[test]
    fn test_extract_from_lines_first_match_wins() {
        let lines = [
            "LID - 10.1000/first [doi]",
            "AID - 10.1000/second [doi]",
        ];
        assert_eq!(extract_from_lines(lines), Some("10.1000/first"));
    }

    #[test]
    fn test_extract_from_lines_falls_through_to_later_candidate() {
        let lines = ["LID - e12345 [pii]", "AID - 10.1000/second [doi]"];
        assert_eq!(extract_from_lines(lines), Some("10.1000/second"));
    }

    #[test]
    fn test_from_field() {
        assert_eq!(from_field(Some(" 10.1000/x ")), Some("10.1000/x"));
        assert_eq!(from_field(Some("")), None);
        assert_eq!(from_field(Some("   ")), None);
        assert_eq!(from_field(None), None);
    }

    #[test]
    fn test_is_canonical() {
        assert!(is_canonical("10.1000/xyz123"));
        assert!(is_canonical("10.1016/S0140-6736(20)30183-5"));
        assert!(!is_canonical("10.1000/has space"));
        assert!(!is_canonical("doi:10.1000/xyz"));
        assert!(!is_canonical(""));
    }
}
