#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # citedup: citation export deduplication
//!
//! Reads PubMed and RIS citation exports, extracts each record's DOI, and
//! splits the records into unique, duplicate and faulty (no DOI) partitions.
//!
//! ## Quick Start
//!
//! ```
//! use citedup::formats::{FormatReaderExt, ris::RisReader};
//! use citedup::RisDeduplicator;
//! use std::io::Cursor;
//!
//! let input = "TY  - JOUR\nDO  - 10.1000/xyz123\nAB  - short\nER  - \n\n\
//!              TY  - JOUR\nDO  - 10.1000/xyz123\nAB  - a much longer abstract\nER  - \n";
//!
//! let mut dedup = RisDeduplicator::new();
//! for record in RisReader::new(Cursor::new(input)).records() {
//!     dedup.classify(record?);
//! }
//! let partitions = dedup.finish();
//!
//! assert_eq!(partitions.counters.duplicates, 1);
//! assert_eq!(partitions.unique[0].get("AB"), Some("a much longer abstract"));
//! # Ok::<(), citedup::CiteError>(())
//! ```
//!
//! ## Modules
//!
//! - [`doi`]: DOI extraction from RIS fields and PubMed identifier lines
//! - [`boundary`]: Record boundary strategies and the lazy record segmenter
//! - [`record`]: `RisRecord` and `PubMedRecord`
//! - [`formats`]: Reader/writer traits and the RIS and PubMed implementations
//! - [`dedup`]: Classification, merge policy, counters, identifier index
//! - [`pipeline`]: Whole-run orchestration over input files
//! - [`report`]: Run summary rendering
//! - [`config`]: TOML settings
//! - [`error`]: Error types and result type

pub mod boundary;
pub mod config;
pub mod dedup;
pub mod doi;
pub mod error;
pub mod formats;
pub mod pipeline;
pub mod record;
pub mod report;

pub use boundary::{
    BlankLineBoundary, EndMarkerBoundary, LineDecoder, RawRecordBlock, RecordSegmenter,
};
pub use config::Settings;
pub use dedup::{
    Classification, Counters, DedupTable, IdentifierIndex, PubMedDeduplicator, RisDeduplicator,
    RisPartitions,
};
pub use error::{CiteError, Result};
pub use pipeline::{PubMedRun, RisRun};
pub use record::{CitationRecord, PubMedRecord, RisRecord};
pub use report::Report;
