//! Record boundary detection for line-oriented citation exports.
//!
//! Both supported formats are streams of text lines grouped into records.
//! They differ only in how a record ends:
//!
//! - PubMed: a blank line closes the open record ([`BlankLineBoundary`]).
//! - RIS: a line whose trimmed text is `ER  -` closes it, and blank lines are
//!   ignored ([`EndMarkerBoundary`]).
//!
//! [`RecordSegmenter`] drives either strategy over any [`BufRead`] source and
//! yields [`RawRecordBlock`]s lazily, one pass per document. Lines come from a
//! [`LineDecoder`], which is also used to read the identifier index seed.
//!
//! # Example
//!
//! ```
//! use citedup::boundary::{BlankLineBoundary, RecordSegmenter};
//! use std::io::Cursor;
//!
//! let input = "PMID- 1\nTI  - One\n\nPMID- 2\nTI  - Two\n";
//! let segmenter = RecordSegmenter::new(Cursor::new(input), BlankLineBoundary);
//! let blocks = segmenter.collect::<citedup::Result<Vec<_>>>()?;
//!
//! assert_eq!(blocks.len(), 2);
//! assert_eq!(blocks[1].lines, vec!["PMID- 2", "TI  - Two"]);
//! # Ok::<(), citedup::CiteError>(())
//! ```

use crate::error::Result;
use encoding_rs::UTF_8;
use std::io::BufRead;

/// The RIS end-of-record marker, as it appears after trimming.
pub const END_OF_RECORD: &str = "ER  -";

/// What a boundary strategy does with one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    /// Add the line to the open block (opening one if needed).
    Append,
    /// Close the open block. An empty block is discarded.
    Close,
    /// Ignore the line.
    Skip,
}

/// A format-specific rule for where records end.
pub trait RecordBoundary: std::fmt::Debug {
    /// Decide what to do with `line`, given whether a block is currently open.
    fn action(&self, line: &str, block_open: bool) -> LineAction;

    /// Whether a block still open at end of input is emitted as a record.
    fn keeps_unterminated(&self) -> bool;
}

/// Records separated by blank lines (PubMed).
///
/// A dangling final block without a trailing blank line is still emitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlankLineBoundary;

impl RecordBoundary for BlankLineBoundary {
    fn action(&self, line: &str, block_open: bool) -> LineAction {
        if !line.trim().is_empty() {
            LineAction::Append
        } else if block_open {
            LineAction::Close
        } else {
            LineAction::Skip
        }
    }

    fn keeps_unterminated(&self) -> bool {
        true
    }
}

/// Records closed by an explicit `ER  -` marker line (RIS).
///
/// By default a final block with no marker is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndMarkerBoundary {
    keep_unterminated: bool,
}

impl EndMarkerBoundary {
    /// Create a boundary that drops an unterminated final block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit an unterminated final block instead of dropping it.
    #[must_use]
    pub fn keep_unterminated(mut self, keep: bool) -> Self {
        self.keep_unterminated = keep;
        self
    }
}

impl RecordBoundary for EndMarkerBoundary {
    fn action(&self, line: &str, _block_open: bool) -> LineAction {
        let trimmed = line.trim();
        if trimmed == END_OF_RECORD {
            LineAction::Close
        } else if trimmed.is_empty() {
            LineAction::Skip
        } else {
            LineAction::Append
        }
    }

    fn keeps_unterminated(&self) -> bool {
        self.keep_unterminated
    }
}

/// The raw lines of one record, without terminators or the closing line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecordBlock {
    /// 1-based line number of the first line in the source document.
    pub start_line: usize,
    /// Record lines in source order, line endings removed.
    pub lines: Vec<String>,
}

/// Reads text lines from a byte source.
///
/// Input bytes are decoded as UTF-8 with replacement of invalid sequences,
/// and a byte-order mark at the start of the source is removed. `\n` and
/// `\r\n` line endings are both accepted and stripped.
///
/// ```
/// use citedup::boundary::LineDecoder;
/// use std::io::Cursor;
///
/// let mut lines = LineDecoder::new(Cursor::new(b"\xEF\xBB\xBFTI  - Caf\xE9\r\n".to_vec()));
/// assert_eq!(lines.read_line()?.as_deref(), Some("TI  - Caf\u{FFFD}"));
/// assert_eq!(lines.read_line()?, None);
/// # Ok::<(), citedup::CiteError>(())
/// ```
#[derive(Debug)]
pub struct LineDecoder<R> {
    reader: R,
    buffer: Vec<u8>,
    line_number: usize,
}

impl<R: BufRead> LineDecoder<R> {
    /// Create a decoder over `reader`.
    pub fn new(reader: R) -> Self {
        LineDecoder {
            reader,
            buffer: Vec::with_capacity(256),
            line_number: 0,
        }
    }

    /// 1-based number of the last line returned, 0 before the first read.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read and decode the next line.
    ///
    /// Returns `Ok(None)` once the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the underlying source fails.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        self.buffer.clear();
        if self.reader.read_until(b'\n', &mut self.buffer)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        let mut bytes = self.buffer.as_slice();
        if let Some(stripped) = bytes.strip_suffix(b"\n") {
            bytes = stripped;
        }
        if let Some(stripped) = bytes.strip_suffix(b"\r") {
            bytes = stripped;
        }

        let (text, malformed) = if self.line_number == 1 {
            UTF_8.decode_with_bom_removal(bytes)
        } else {
            UTF_8.decode_without_bom_handling(bytes)
        };
        if malformed {
            tracing::debug!(line = self.line_number, "replaced invalid UTF-8 in input line");
        }
        Ok(Some(text.into_owned()))
    }
}

impl<R: BufRead> Iterator for LineDecoder<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_line().transpose()
    }
}

/// Lazily splits a line source into [`RawRecordBlock`]s.
///
/// Lines are read through a [`LineDecoder`].
#[derive(Debug)]
pub struct RecordSegmenter<R, B> {
    lines: LineDecoder<R>,
    boundary: B,
    current: Vec<String>,
    start_line: usize,
    finished: bool,
}

impl<R: BufRead, B: RecordBoundary> RecordSegmenter<R, B> {
    /// Create a segmenter over `reader` using the `boundary` strategy.
    pub fn new(reader: R, boundary: B) -> Self {
        RecordSegmenter {
            lines: LineDecoder::new(reader),
            boundary,
            current: Vec::new(),
            start_line: 0,
            finished: false,
        }
    }

    /// Number of source lines consumed so far.
    #[must_use]
    pub fn lines_read(&self) -> usize {
        self.lines.line_number()
    }

    /// Read the next record block.
    ///
    /// Returns `Ok(None)` once the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the underlying source fails.
    pub fn next_block(&mut self) -> Result<Option<RawRecordBlock>> {
        if self.finished {
            return Ok(None);
        }

        while let Some(line) = self.lines.read_line()? {
            match self.boundary.action(&line, !self.current.is_empty()) {
                LineAction::Append => {
                    if self.current.is_empty() {
                        self.start_line = self.lines.line_number();
                    }
                    self.current.push(line);
                },
                LineAction::Close => {
                    if let Some(block) = self.take_block() {
                        return Ok(Some(block));
                    }
                },
                LineAction::Skip => {},
            }
        }

        self.finished = true;
        if self.current.is_empty() {
            return Ok(None);
        }
        if self.boundary.keeps_unterminated() {
            return Ok(self.take_block());
        }

        tracing::warn!(
            start_line = self.start_line,
            lines = self.current.len(),
            "dropping unterminated record at end of input"
        );
        self.current.clear();
        Ok(None)
    }

    fn take_block(&mut self) -> Option<RawRecordBlock> {
        if self.current.is_empty() {
            return None;
        }
        Some(RawRecordBlock {
            start_line: self.start_line,
            lines: std::mem::take(&mut self.current),
        })
    }
}

impl<R: BufRead, B: RecordBoundary> Iterator for RecordSegmenter<R, B> {
    type Item = Result<RawRecordBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_block().transpose()
    }
}
