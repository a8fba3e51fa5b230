//! End-to-end processing runs.
//!
//! A run locates its input files, reads them in sorted path order, classifies
//! every record through a single dedup engine, and writes the unique and
//! faulty partitions. Output files are created once per run and stay open for
//! its whole duration, so every input file contributes to the same partitions.
//!
//! With `parallel` enabled, files are parsed concurrently on the rayon thread
//! pool. Parsed records are still classified one file at a time in path
//! order, so the result is identical to a sequential run.
//!
//! # Example
//!
//! ```no_run
//! use citedup::{RisRun, Settings};
//!
//! let settings = Settings::default();
//! let report = RisRun::from_settings(&settings)?.execute()?;
//! println!("{}", report.render_table());
//! # Ok::<(), citedup::CiteError>(())
//! ```

use crate::boundary::EndMarkerBoundary;
use crate::config::Settings;
use crate::dedup::{Classification, IdentifierIndex, PubMedDeduplicator, RisDeduplicator};
use crate::error::{CiteError, Result};
use crate::formats::pubmed::{PubMedReader, PubMedWriter};
use crate::formats::ris::{RisReader, RisWriter};
use crate::formats::{Format, FormatReader, FormatWriter};
use crate::record::{PubMedRecord, RisRecord};
use crate::report::Report;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// List files in `dir` matching the glob `pattern`, sorted by path.
///
/// # Errors
///
/// Returns [`CiteError::InvalidPattern`] if the pattern is malformed or a
/// matched path cannot be read.
pub fn discover_inputs(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full = dir.join(pattern);
    let full = full
        .to_str()
        .ok_or_else(|| CiteError::InvalidPattern(format!("non UTF-8 path: {}", full.display())))?;

    let mut paths = glob::glob(full)
        .map_err(|e| CiteError::InvalidPattern(format!("{full}: {e}")))?
        .map(|entry| entry.map_err(|e| CiteError::InvalidPattern(e.to_string())))
        .collect::<Result<Vec<_>>>()?;
    paths.retain(|path| path.is_file());
    paths.sort();

    tracing::debug!(pattern = full, matched = paths.len(), "discovered input files");
    Ok(paths)
}

/// Read every record of one RIS file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn read_ris_file(path: &Path, boundary: EndMarkerBoundary) -> Result<Vec<RisRecord>> {
    let file = File::open(path)?;
    let mut reader = RisReader::with_boundary(BufReader::new(file), boundary);
    let records = reader.read_all()?;
    tracing::info!(
        path = %path.display(),
        lines = reader.lines_read(),
        records = records.len(),
        "read RIS file"
    );
    Ok(records)
}

/// Read every record of one PubMed file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn read_pubmed_file(path: &Path) -> Result<Vec<PubMedRecord>> {
    let file = File::open(path)?;
    let mut reader = PubMedReader::new(BufReader::new(file));
    let records = reader.read_all()?;
    tracing::info!(
        path = %path.display(),
        lines = reader.lines_read(),
        records = records.len(),
        "read PubMed file"
    );
    Ok(records)
}

/// Returns true if `path` has a file extension registered for `format`.
///
/// ```
/// use citedup::formats::Format;
/// use citedup::pipeline::has_format_extension;
/// use std::path::Path;
///
/// assert!(has_format_extension(Path::new("inputs/pubmed-1.txt"), Format::PubMed));
/// assert!(!has_format_extension(Path::new("inputs/scopus.csv"), Format::Ris));
/// ```
#[must_use]
pub fn has_format_extension(path: &Path, format: Format) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(Format::from_extension)
        == Some(format)
}

/// Warn about discovered inputs whose extension belongs to another format.
fn check_extensions(inputs: &[PathBuf], format: Format) {
    for path in inputs {
        if !has_format_extension(path, format) {
            tracing::warn!(
                path = %path.display(),
                expected = %format,
                "input file extension does not match the run's format"
            );
        }
    }
}

/// Parse all `inputs` with `read`, concurrently if `parallel`.
///
/// Results are returned in input order either way.
fn parse_inputs<T, F>(inputs: &[PathBuf], parallel: bool, read: F) -> Result<Vec<Vec<T>>>
where
    T: Send,
    F: Fn(&Path) -> Result<Vec<T>> + Sync,
{
    if parallel {
        inputs.par_iter().map(|path| read(path.as_path())).collect()
    } else {
        inputs.iter().map(|path| read(path.as_path())).collect()
    }
}

/// Create `path` for writing, creating its parent directory if needed.
fn create_output(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(BufWriter::new(File::create(path)?))
}

/// A configured RIS run.
#[derive(Debug, Clone)]
pub struct RisRun {
    /// Input files, in processing order
    pub inputs: Vec<PathBuf>,
    /// Destination of the unique partition
    pub unique_path: PathBuf,
    /// Destination of the faulty partition
    pub faulty_path: PathBuf,
    /// Record boundary configuration
    pub boundary: EndMarkerBoundary,
    /// Parse files concurrently
    pub parallel: bool,
}

impl RisRun {
    /// Build a run from settings, discovering its input files.
    ///
    /// # Errors
    ///
    /// Returns an error if input discovery fails.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let inputs = discover_inputs(&settings.input_dir, &settings.ris.pattern)?;
        check_extensions(&inputs, Format::Ris);
        Ok(RisRun {
            inputs,
            unique_path: settings.ris_unique_path(),
            faulty_path: settings.ris_faulty_path(),
            boundary: EndMarkerBoundary::new().keep_unterminated(settings.ris.keep_unterminated),
            parallel: settings.parallel,
        })
    }

    /// Read, deduplicate and write.
    ///
    /// The unique partition is only known once every input is consumed, so
    /// both partitions are written after classification.
    ///
    /// # Errors
    ///
    /// Returns an error on any I/O failure.
    pub fn execute(&self) -> Result<Report> {
        let boundary = self.boundary;
        let parsed = parse_inputs(&self.inputs, self.parallel, |path| {
            read_ris_file(path, boundary)
        })?;

        let mut dedup = RisDeduplicator::new();
        for records in parsed {
            dedup.classify_all(records);
        }
        let partitions = dedup.finish();

        write_partition(
            RisWriter::new(create_output(&self.unique_path)?),
            partitions.unique.as_slice(),
        )?;
        tracing::info!(
            path = %self.unique_path.display(),
            records = partitions.unique.len(),
            "wrote unique partition"
        );
        write_partition(
            RisWriter::new(create_output(&self.faulty_path)?),
            partitions.faulty.as_slice(),
        )?;
        tracing::info!(
            path = %self.faulty_path.display(),
            records = partitions.faulty.len(),
            "wrote faulty partition"
        );

        Ok(Report::new(Format::Ris, self.inputs.clone(), partitions.counters))
    }
}

fn write_partition<W: FormatWriter>(mut writer: W, records: &[W::Record]) -> Result<()> {
    writer.write_batch(records)?;
    writer.finish()
}

/// A configured PubMed run.
#[derive(Debug, Clone)]
pub struct PubMedRun {
    /// Input files, in processing order
    pub inputs: Vec<PathBuf>,
    /// Destination of the unique partition
    pub unique_path: PathBuf,
    /// Destination of the faulty partition
    pub faulty_path: PathBuf,
    /// Identifiers already captured
    pub index: IdentifierIndex,
    /// Parse files concurrently
    pub parallel: bool,
}

impl PubMedRun {
    /// Build a run from settings and a pre-seeded index.
    ///
    /// # Errors
    ///
    /// Returns an error if input discovery fails.
    pub fn from_settings(settings: &Settings, index: IdentifierIndex) -> Result<Self> {
        let inputs = discover_inputs(&settings.input_dir, &settings.pubmed.pattern)?;
        check_extensions(&inputs, Format::PubMed);
        Ok(PubMedRun {
            inputs,
            unique_path: settings.pubmed_unique_path(),
            faulty_path: settings.pubmed_faulty_path(),
            index,
            parallel: settings.parallel,
        })
    }

    /// Read, filter and write.
    ///
    /// Records are streamed to the partitions as they are classified.
    ///
    /// # Errors
    ///
    /// Returns an error on any I/O failure. Partitions flushed before the
    /// failure keep what was written.
    pub fn execute(&self) -> Result<Report> {
        let mut unique = PubMedWriter::new(create_output(&self.unique_path)?);
        let mut faulty = PubMedWriter::new(create_output(&self.faulty_path)?);
        let mut dedup = PubMedDeduplicator::new(&self.index);

        if self.parallel {
            for records in parse_inputs(&self.inputs, true, read_pubmed_file)? {
                for record in &records {
                    route(&mut dedup, record, &mut unique, &mut faulty)?;
                }
            }
        } else {
            for path in &self.inputs {
                let mut reader = PubMedReader::new(BufReader::new(File::open(path)?));
                while let Some(record) = reader.read_record()? {
                    route(&mut dedup, &record, &mut unique, &mut faulty)?;
                }
                tracing::info!(
                    path = %path.display(),
                    lines = reader.lines_read(),
                    records = reader.records_read().unwrap_or(0),
                    "read PubMed file"
                );
            }
        }

        unique.finish()?;
        faulty.finish()?;
        tracing::info!(
            unique = unique.records_written().unwrap_or(0),
            faulty = faulty.records_written().unwrap_or(0),
            "wrote PubMed partitions"
        );

        Ok(Report::new(Format::PubMed, self.inputs.clone(), dedup.counters()))
    }
}

fn route<W: FormatWriter<Record = PubMedRecord>>(
    dedup: &mut PubMedDeduplicator<'_>,
    record: &PubMedRecord,
    unique: &mut W,
    faulty: &mut W,
) -> Result<()> {
    match dedup.classify(record) {
        Classification::Unique => unique.write_record(record),
        Classification::Faulty => faulty.write_record(record),
        Classification::Duplicate => Ok(()),
    }
}
