//! RIS format reader and writer.
//!
//! An RIS line is a two-character tag, two spaces, a hyphen, a space, and the
//! value: `TY  - JOUR`. A record ends with an `ER  - ` line.
//!
//! Reading normalizes each block into a [`RisRecord`]: the tag is the first
//! two characters of the line and the value is everything from offset 6,
//! trimmed. A repeated tag extends the first value with a space.
//!
//! # Examples
//!
//! ```
//! use citedup::formats::{FormatWriter, ris::RisWriter};
//! use citedup::RisRecord;
//!
//! let record = RisRecord::new()
//!     .with_field("TY", "JOUR")
//!     .with_field("DO", "10.1000/xyz123");
//!
//! let mut buffer = Vec::new();
//! {
//!     let mut writer = RisWriter::new(&mut buffer);
//!     writer.write_record(&record)?;
//!     writer.finish()?;
//! }
//! assert_eq!(
//!     String::from_utf8(buffer).unwrap(),
//!     "TY  - JOUR\nDO  - 10.1000/xyz123\nER  - \n\n"
//! );
//! # Ok::<(), citedup::CiteError>(())
//! ```

use crate::boundary::{EndMarkerBoundary, RawRecordBlock, RecordSegmenter, END_OF_RECORD};
use crate::error::{CiteError, Result};
use crate::formats::{FormatReader, FormatWriter};
use crate::record::RisRecord;
use std::io::{BufRead, Write};

/// Width of an RIS tag.
const TAG_WIDTH: usize = 2;
/// Offset at which the value starts (`TY  - ` is six characters).
const VALUE_OFFSET: usize = 6;

/// Split an RIS line into tag and trimmed value.
///
/// Short lines are sliced best-effort: fewer than six characters yields an
/// empty value, fewer than two yields the whole line as the tag.
#[must_use]
pub fn split_line(line: &str) -> (&str, &str) {
    let byte_offset = |chars: usize| {
        line.char_indices()
            .nth(chars)
            .map_or(line.len(), |(offset, _)| offset)
    };
    let tag = &line[..byte_offset(TAG_WIDTH)];
    let value = line[byte_offset(VALUE_OFFSET)..].trim();
    (tag, value)
}

/// Convert a raw RIS block into a structured record.
///
/// Blank lines and end-of-record lines are skipped. An empty block yields an
/// empty record.
#[must_use]
pub fn normalize_block(block: &RawRecordBlock) -> RisRecord {
    let mut record = RisRecord::new();
    for line in &block.lines {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed == END_OF_RECORD {
            continue;
        }
        let (tag, value) = split_line(line);
        record.add_field(tag, value);
    }
    record
}

/// Reader for RIS exports.
///
/// Wraps a [`RecordSegmenter`] with the [`EndMarkerBoundary`] strategy and
/// normalizes every block.
#[derive(Debug)]
pub struct RisReader<R> {
    segmenter: RecordSegmenter<R, EndMarkerBoundary>,
    records_read: usize,
}

impl<R: BufRead> RisReader<R> {
    /// Create a reader that drops an unterminated trailing record.
    pub fn new(reader: R) -> Self {
        Self::with_boundary(reader, EndMarkerBoundary::new())
    }

    /// Create a reader with an explicit boundary configuration.
    ///
    /// ```
    /// use citedup::boundary::EndMarkerBoundary;
    /// use citedup::formats::{FormatReader, ris::RisReader};
    /// use std::io::Cursor;
    ///
    /// let input = Cursor::new("TY  - JOUR\nTI  - No end marker\n");
    /// let boundary = EndMarkerBoundary::new().keep_unterminated(true);
    /// let mut reader = RisReader::with_boundary(input, boundary);
    /// assert!(reader.read_record()?.is_some());
    /// # Ok::<(), citedup::CiteError>(())
    /// ```
    pub fn with_boundary(reader: R, boundary: EndMarkerBoundary) -> Self {
        RisReader {
            segmenter: RecordSegmenter::new(reader, boundary),
            records_read: 0,
        }
    }

    /// Number of source lines consumed so far.
    #[must_use]
    pub fn lines_read(&self) -> usize {
        self.segmenter.lines_read()
    }
}

impl<R: BufRead + std::fmt::Debug> FormatReader for RisReader<R> {
    type Record = RisRecord;

    fn read_record(&mut self) -> Result<Option<RisRecord>> {
        let Some(block) = self.segmenter.next_block()? else {
            return Ok(None);
        };
        self.records_read += 1;
        Ok(Some(normalize_block(&block)))
    }

    fn records_read(&self) -> Option<usize> {
        Some(self.records_read)
    }
}

/// Writer for RIS exports.
///
/// Each field value is split on `\n` and written as one `"<tag>  - <line>"`
/// line per segment, followed by `ER  - ` and a blank separator line.
#[derive(Debug)]
pub struct RisWriter<W: Write> {
    writer: W,
    records_written: usize,
    finished: bool,
}

impl<W: Write> RisWriter<W> {
    /// Create a new RIS writer.
    pub fn new(writer: W) -> Self {
        RisWriter {
            writer,
            records_written: 0,
            finished: false,
        }
    }
}

impl<W: Write + std::fmt::Debug> FormatWriter for RisWriter<W> {
    type Record = RisRecord;

    fn write_record(&mut self, record: &RisRecord) -> Result<()> {
        if self.finished {
            return Err(CiteError::InvalidRecord(
                "Cannot write to a finished writer".to_string(),
            ));
        }

        for (tag, value) in record.iter() {
            for line in value.split('\n') {
                writeln!(self.writer, "{tag}  - {line}")?;
            }
        }
        self.writer.write_all(b"ER  - \n\n")?;
        self.records_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.finished = true;
        Ok(())
    }

    fn records_written(&self) -> Option<usize> {
        Some(self.records_written)
    }
}
