//! DOI-based deduplication and merge.
//!
//! Every record is classified exactly once as [`Classification::Unique`],
//! [`Classification::Duplicate`] or [`Classification::Faulty`] (no DOI), and
//! the matching [`Counters`] field is incremented. The two formats use
//! different policies:
//!
//! - **RIS** ([`RisDeduplicator`]): collisions are resolved within the run
//!   through a [`DedupTable`]. When a record arrives whose DOI is already
//!   retained, the incoming record replaces the retained one only if its
//!   abstract is strictly longer; on a tie the first record stays. The unique
//!   partition is the table's final contents.
//! - **PubMed** ([`PubMedDeduplicator`]): a record is a duplicate if its DOI
//!   is in the pre-seeded, read-only [`IdentifierIndex`] or was already
//!   emitted as unique in this run. Content is never merged.
//!
//! Classification decisions are order-dependent, so all mutations go through
//! one owner. Parallel parsing must hand records over in input order.

use crate::boundary::LineDecoder;
use crate::doi;
use crate::error::Result;
use crate::record::{CitationRecord, PubMedRecord, RisRecord, DOI_TAG};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;

/// Outcome of classifying one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// First record seen for its identifier.
    Unique,
    /// Identifier already known; the record is suppressed or merged.
    Duplicate,
    /// No identifier could be extracted.
    Faulty,
}

/// Per-run record counts.
///
/// Each classified record increments `total` and exactly one of the other
/// three counters, so `total == unique + duplicates + faulty` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    /// Records seen
    pub total: usize,
    /// Records whose identifier was already known
    pub duplicates: usize,
    /// Distinct identifiers emitted
    pub unique: usize,
    /// Records without an identifier
    pub faulty: usize,
}

impl Counters {
    /// Count one classified record.
    pub fn record(&mut self, classification: Classification) {
        self.total += 1;
        match classification {
            Classification::Unique => self.unique += 1,
            Classification::Duplicate => self.duplicates += 1,
            Classification::Faulty => self.faulty += 1,
        }
    }

    /// Returns true if `total` equals the sum of the three partitions.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.total == self.unique + self.duplicates + self.faulty
    }
}

/// Set of identifiers considered already captured.
///
/// Seeded once before a PubMed run, typically from the RIS unique output,
/// and read-only while records are classified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierIndex {
    identifiers: HashSet<String>,
}

impl IdentifierIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an index from RIS text.
    ///
    /// Every line starting with `DO  -` contributes its trimmed value. Lines
    /// are decoded the same way as record input (see [`LineDecoder`]).
    ///
    /// ```
    /// use citedup::IdentifierIndex;
    /// use std::io::Cursor;
    ///
    /// let ris = "TY  - JOUR\nDO  - 10.1000/a \nER  - \n\nDO  - 10.1000/b\n";
    /// let index = IdentifierIndex::from_ris_reader(Cursor::new(ris))?;
    /// assert_eq!(index.len(), 2);
    /// assert!(index.contains("10.1000/a"));
    /// # Ok::<(), citedup::CiteError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub fn from_ris_reader<R: BufRead>(reader: R) -> Result<Self> {
        let prefix = format!("{DOI_TAG}  -");
        let mut index = Self::new();
        for line in LineDecoder::new(reader) {
            let line = line?;
            if let Some(value) = line.strip_prefix(&prefix) {
                let value = value.trim();
                if !value.is_empty() {
                    index.identifiers.insert(value.to_string());
                }
            }
        }
        Ok(index)
    }

    /// Seed an index from an RIS file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    pub fn from_ris_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let index = Self::from_ris_reader(std::io::BufReader::new(file))?;
        tracing::info!(
            path = %path.display(),
            identifiers = index.len(),
            "loaded identifier index"
        );
        Ok(index)
    }

    /// Returns true if `identifier` is in the index.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.identifiers.contains(identifier)
    }

    /// Number of identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    /// Returns true if the index holds no identifiers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for IdentifierIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        IdentifierIndex {
            identifiers: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Identifier → currently retained RIS record.
///
/// Entries keep the order in which their identifier was first seen; a
/// replacement updates the value in place.
#[derive(Debug, Clone, Default)]
pub struct DedupTable {
    entries: IndexMap<String, RisRecord>,
}

impl DedupTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The record retained for `identifier`.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&RisRecord> {
        self.entries.get(identifier)
    }

    /// Returns true if `identifier` has a retained record.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    /// Number of distinct identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over retained records in first-seen order.
    pub fn records(&self) -> impl Iterator<Item = &RisRecord> {
        self.entries.values()
    }

    /// Consume the table, yielding retained records in first-seen order.
    #[must_use]
    pub fn into_records(self) -> Vec<RisRecord> {
        self.entries.into_values().collect()
    }

    /// Insert or merge `record` under `identifier`.
    ///
    /// Returns [`Classification::Unique`] on first sight. Otherwise returns
    /// [`Classification::Duplicate`], replacing the retained record only if
    /// the incoming abstract is strictly longer.
    fn merge(&mut self, identifier: String, record: RisRecord) -> Classification {
        match self.entries.entry(identifier) {
            indexmap::map::Entry::Vacant(entry) => {
                tracing::debug!(doi = %entry.key(), "retained new identifier");
                entry.insert(record);
                Classification::Unique
            },
            indexmap::map::Entry::Occupied(mut entry) => {
                let retained_len = entry.get().abstract_len();
                let incoming_len = record.abstract_len();
                if incoming_len > retained_len {
                    tracing::debug!(
                        doi = %entry.key(),
                        retained_len,
                        incoming_len,
                        "duplicate replaces retained record"
                    );
                    *entry.get_mut() = record;
                } else {
                    tracing::debug!(doi = %entry.key(), "duplicate discarded");
                }
                Classification::Duplicate
            },
        }
    }
}

/// The three RIS output partitions and their counts.
#[derive(Debug, Clone, Default)]
pub struct RisPartitions {
    /// One record per distinct identifier, in first-seen order
    pub unique: Vec<RisRecord>,
    /// Records without an identifier, in input order
    pub faulty: Vec<RisRecord>,
    /// Classification counts
    pub counters: Counters,
}

/// Dedup/merge engine for RIS records.
///
/// # Examples
///
/// ```
/// use citedup::{Classification, RisDeduplicator, RisRecord};
///
/// let mut dedup = RisDeduplicator::new();
/// let short = RisRecord::new().with_field("DO", "10.1000/x").with_field("AB", "short");
/// let long = RisRecord::new().with_field("DO", "10.1000/x").with_field("AB", "much longer");
///
/// assert_eq!(dedup.classify(short), Classification::Unique);
/// assert_eq!(dedup.classify(long), Classification::Duplicate);
///
/// let partitions = dedup.finish();
/// assert_eq!(partitions.unique[0].get("AB"), Some("much longer"));
/// assert_eq!(partitions.counters.duplicates, 1);
/// ```
#[derive(Debug, Default)]
pub struct RisDeduplicator {
    table: DedupTable,
    faulty: Vec<RisRecord>,
    counters: Counters,
}

impl RisDeduplicator {
    /// Create an engine with an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one record and apply the resulting mutation.
    pub fn classify(&mut self, record: RisRecord) -> Classification {
        let classification = match record.identifier().map(str::to_string) {
            Some(identifier) => {
                if !doi::is_canonical(&identifier) {
                    tracing::debug!(doi = %identifier, "identifier is not a canonical DOI");
                }
                self.table.merge(identifier, record)
            },
            None => {
                self.faulty.push(record);
                Classification::Faulty
            },
        };
        self.counters.record(classification);
        classification
    }

    /// Classify every record from an iterator, in order.
    pub fn classify_all<I: IntoIterator<Item = RisRecord>>(&mut self, records: I) {
        for record in records {
            self.classify(record);
        }
    }

    /// Counts so far.
    #[must_use]
    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// The table of retained records.
    #[must_use]
    pub fn table(&self) -> &DedupTable {
        &self.table
    }

    /// Finalize the run: the unique partition is the table's final values.
    #[must_use]
    pub fn finish(self) -> RisPartitions {
        RisPartitions {
            unique: self.table.into_records(),
            faulty: self.faulty,
            counters: self.counters,
        }
    }
}

/// Dedup engine for PubMed records.
///
/// Borrows the pre-seeded index read-only and keeps its own set of
/// identifiers emitted as unique during this run.
#[derive(Debug)]
pub struct PubMedDeduplicator<'a> {
    index: &'a IdentifierIndex,
    seen: HashSet<String>,
    counters: Counters,
}

impl<'a> PubMedDeduplicator<'a> {
    /// Create an engine against `index`.
    #[must_use]
    pub fn new(index: &'a IdentifierIndex) -> Self {
        PubMedDeduplicator {
            index,
            seen: HashSet::new(),
            counters: Counters::default(),
        }
    }

    /// Classify one record.
    ///
    /// The caller writes [`Unique`](Classification::Unique) records to the
    /// unique partition and [`Faulty`](Classification::Faulty) records to the
    /// faulty partition. Duplicates are dropped.
    pub fn classify(&mut self, record: &PubMedRecord) -> Classification {
        let classification = match record.identifier() {
            None => Classification::Faulty,
            Some(identifier) if self.index.contains(identifier) => {
                tracing::debug!(doi = identifier, "identifier already indexed");
                Classification::Duplicate
            },
            Some(identifier) => {
                if self.seen.insert(identifier.to_string()) {
                    Classification::Unique
                } else {
                    tracing::debug!(doi = identifier, "identifier repeated within run");
                    Classification::Duplicate
                }
            },
        };
        self.counters.record(classification);
        classification
    }

    /// Counts so far.
    #[must_use]
    pub fn counters(&self) -> Counters {
        self.counters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ris(doi: Option<&str>, abstract_text: &str, title: &str) -> RisRecord {
        let mut record = RisRecord::new().with_field("TY", "JOUR");
        if let Some(doi) = doi {
            record.add_field("DO", doi);
        }
        record.add_field("TI", title);
        record.add_field("AB", abstract_text);
        record
    }

    fn pubmed(lines: &[&str]) -> PubMedRecord {
        PubMedRecord::new(lines.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn test_longer_abstract_replaces_retained() {
        let mut dedup = RisDeduplicator::new();
        dedup.classify(ris(Some("10.1000/x"), "short", "first"));
        dedup.classify(ris(Some("10.1000/x"), "a much longer abstract", "second"));

        let partitions = dedup.finish();
        assert_eq!(partitions.unique.len(), 1);
        assert_eq!(partitions.unique[0].get("TI"), Some("second"));
        assert_eq!(partitions.counters.duplicates, 1);
        assert_eq!(partitions.counters.unique, 1);
    }

    #[test]
    fn test_equal_abstract_keeps_first() {
        let mut dedup = RisDeduplicator::new();
        dedup.classify(ris(Some("10.1000/x"), "same", "first"));
        dedup.classify(ris(Some("10.1000/x"), "same", "second"));

        let partitions = dedup.finish();
        assert_eq!(partitions.unique[0].get("TI"), Some("first"));
    }

    #[test]
    fn test_shorter_abstract_is_discarded() {
        let mut dedup = RisDeduplicator::new();
        dedup.classify(ris(Some("10.1000/x"), "the longer one", "first"));
        assert_eq!(
            dedup.classify(ris(Some("10.1000/x"), "short", "second")),
            Classification::Duplicate
        );
        assert_eq!(dedup.table().get("10.1000/x").unwrap().get("TI"), Some("first"));
    }

    #[test]
    fn test_replacement_keeps_first_seen_position() {
        let mut dedup = RisDeduplicator::new();
        dedup.classify(ris(Some("10.1000/a"), "", "a1"));
        dedup.classify(ris(Some("10.1000/b"), "", "b1"));
        dedup.classify(ris(Some("10.1000/a"), "longer", "a2"));

        let titles: Vec<&str> = dedup.table().records().map(|r| r.get("TI").unwrap()).collect();
        assert_eq!(titles, vec!["a2", "b1"]);
    }

    #[test]
    fn test_missing_doi_is_faulty_not_duplicate() {
        let mut dedup = RisDeduplicator::new();
        assert_eq!(dedup.classify(ris(None, "x", "a")), Classification::Faulty);
        assert_eq!(dedup.classify(ris(None, "x", "a")), Classification::Faulty);
        assert_eq!(
            dedup.classify(ris(Some(""), "x", "a")),
            Classification::Faulty
        );

        let counters = dedup.counters();
        assert_eq!(counters.faulty, 3);
        assert_eq!(counters.duplicates, 0);
        assert!(counters.is_consistent());
        assert_eq!(dedup.finish().faulty.len(), 3);
    }

    #[test]
    fn test_pubmed_index_membership() {
        let index: IdentifierIndex = ["10.1000/known"].into_iter().collect();
        let mut dedup = PubMedDeduplicator::new(&index);

        let known = pubmed(&["PMID- 1", "AID - 10.1000/known [doi]"]);
        let fresh = pubmed(&["PMID- 2", "LID - 10.1000/fresh [doi]"]);
        let faulty = pubmed(&["PMID- 3", "TI  - no identifier"]);

        assert_eq!(dedup.classify(&known), Classification::Duplicate);
        assert_eq!(dedup.classify(&fresh), Classification::Unique);
        assert_eq!(dedup.classify(&faulty), Classification::Faulty);
        assert_eq!(
            dedup.counters(),
            Counters {
                total: 3,
                duplicates: 1,
                unique: 1,
                faulty: 1
            }
        );
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_pubmed_repeat_within_run_is_duplicate() {
        let index = IdentifierIndex::new();
        let mut dedup = PubMedDeduplicator::new(&index);
        let record = pubmed(&["PMID- 1", "AID - 10.1000/x [doi]"]);

        assert_eq!(dedup.classify(&record), Classification::Unique);
        assert_eq!(dedup.classify(&record), Classification::Duplicate);
        assert!(!index.contains("10.1000/x"));
    }

    #[test]
    fn test_index_from_ris_reader_ignores_other_tags() {
        let text =
            "TY  - JOUR\nDO  - 10.1000/a\nN1  - DO  - not a doi line\n DO  - indented\nDO  -\n";
        let index = IdentifierIndex::from_ris_reader(Cursor::new(text)).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.contains("10.1000/a"));
    }

    #[test]
    fn test_index_from_ris_reader_accepts_invalid_utf8() {
        let bytes = b"TY  - JOUR\nTI  - Caf\xE9\nDO  - 10.1000/a\nER  - \n".to_vec();
        let index = IdentifierIndex::from_ris_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.contains("10.1000/a"));
    }

    #[test]
    fn test_index_from_ris_reader_strips_bom_and_crlf() {
        let bytes = b"\xEF\xBB\xBFDO  - 10.1000/first\r\nDO  - 10.1000/second\r\n".to_vec();
        let index = IdentifierIndex::from_ris_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.contains("10.1000/first"));
        assert!(index.contains("10.1000/second"));
    }

    #[test]
    fn test_ris_non_canonical_identifier_still_deduplicated() {
        let mut dedup = RisDeduplicator::new();
        let first = RisRecord::new().with_field("DO", "doi:10.1000/x");
        let second = RisRecord::new().with_field("DO", "doi:10.1000/x");
        assert_eq!(dedup.classify(first), Classification::Unique);
        assert_eq!(dedup.classify(second), Classification::Duplicate);
    }

    #[test]
    fn test_counters_record() {
        let mut counters = Counters::default();
        counters.record(Classification::Unique);
        counters.record(Classification::Duplicate);
        counters.record(Classification::Faulty);
        counters.record(Classification::Unique);
        assert_eq!(counters.total, 4);
        assert_eq!(counters.unique, 2);
        assert!(counters.is_consistent());
    }
}
