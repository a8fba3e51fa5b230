//! PubMed (MEDLINE) format reader and writer.
//!
//! PubMed records are separated by blank lines. No field map is built: a
//! [`PubMedRecord`] keeps the block's lines verbatim apart from their line
//! endings, because the only uses are DOI scanning and passthrough output.

use crate::boundary::{BlankLineBoundary, RecordSegmenter};
use crate::error::{CiteError, Result};
use crate::formats::{FormatReader, FormatWriter};
use crate::record::PubMedRecord;
use std::io::{BufRead, Write};

/// Reader for PubMed exports.
///
/// A trailing record without a closing blank line is still returned.
///
/// # Examples
///
/// ```
/// use citedup::formats::{FormatReader, pubmed::PubMedReader};
/// use std::io::Cursor;
///
/// let mut reader = PubMedReader::new(Cursor::new("PMID- 1\n\nPMID- 2"));
/// assert_eq!(reader.read_all()?.len(), 2);
/// # Ok::<(), citedup::CiteError>(())
/// ```
#[derive(Debug)]
pub struct PubMedReader<R> {
    segmenter: RecordSegmenter<R, BlankLineBoundary>,
    records_read: usize,
}

impl<R: BufRead> PubMedReader<R> {
    /// Create a new PubMed reader.
    pub fn new(reader: R) -> Self {
        PubMedReader {
            segmenter: RecordSegmenter::new(reader, BlankLineBoundary),
            records_read: 0,
        }
    }

    /// Number of source lines consumed so far.
    #[must_use]
    pub fn lines_read(&self) -> usize {
        self.segmenter.lines_read()
    }
}

impl<R: BufRead + std::fmt::Debug> FormatReader for PubMedReader<R> {
    type Record = PubMedRecord;

    fn read_record(&mut self) -> Result<Option<PubMedRecord>> {
        let Some(block) = self.segmenter.next_block()? else {
            return Ok(None);
        };
        self.records_read += 1;
        Ok(Some(PubMedRecord::new(block.lines)))
    }

    fn records_read(&self) -> Option<usize> {
        Some(self.records_read)
    }
}

/// Passthrough writer for PubMed records.
///
/// Writes the record lines joined by `\n`, then two newlines, so records are
/// separated by exactly one blank line. Line content is unchanged, but line
/// endings are normalized: `\r\n` input is written with `\n` endings, and
/// the blank line after each record is the only separator.
#[derive(Debug)]
pub struct PubMedWriter<W: Write> {
    writer: W,
    records_written: usize,
    finished: bool,
}

impl<W: Write> PubMedWriter<W> {
    /// Create a new PubMed writer.
    pub fn new(writer: W) -> Self {
        PubMedWriter {
            writer,
            records_written: 0,
            finished: false,
        }
    }
}

impl<W: Write + std::fmt::Debug> FormatWriter for PubMedWriter<W> {
    type Record = PubMedRecord;

    fn write_record(&mut self, record: &PubMedRecord) -> Result<()> {
        if self.finished {
            return Err(CiteError::InvalidRecord(
                "Cannot write to a finished writer".to_string(),
            ));
        }
        self.writer.write_all(record.text().as_bytes())?;
        self.writer.write_all(b"\n\n")?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "PMID- 31978945\n\
TI  - A study.\n\
AB  - Line one of the abstract\n      continues here.\n\
AID - 10.1016/j.cell.2020.01.001 [doi]\n\
\n\
PMID- 31978946\n\
TI  - Another study.\n";

    #[test]
    fn test_read_keeps_lines_verbatim() {
        let mut reader = PubMedReader::new(Cursor::new(SAMPLE));
        let first = reader.read_record().unwrap().unwrap();
        assert_eq!(first.lines.len(), 5);
        assert_eq!(first.lines[3], "      continues here.");

        let second = reader.read_record().unwrap().unwrap();
        assert_eq!(second.lines, vec!["PMID- 31978946", "TI  - Another study."]);
        assert!(reader.read_record().unwrap().is_none());
        assert_eq!(reader.records_read(), Some(2));
    }

    #[test]
    fn test_crlf_input_is_written_with_lf_endings() {
        let input = "PMID- 1\r\nAID - 10.1000/x [doi]\r\n\r\nPMID- 2\r\n";
        let records = PubMedReader::new(Cursor::new(input)).read_all().unwrap();

        let mut buffer = Vec::new();
        {
            let mut writer = PubMedWriter::new(&mut buffer);
            writer.write_batch(&records).unwrap();
            writer.finish().unwrap();
        }
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "PMID- 1\nAID - 10.1000/x [doi]\n\nPMID- 2\n\n"
        );
    }

    #[test]
    fn test_passthrough_write() {
        let record = PubMedRecord::new(vec!["PMID- 1".to_string(), "TI  - T".to_string()]);
        let mut buffer = Vec::new();
        {
            let mut writer = PubMedWriter::new(&mut buffer);
            writer.write_batch(&[record.clone(), record]).unwrap();
            writer.finish().unwrap();
        }
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "PMID- 1\nTI  - T\n\nPMID- 1\nTI  - T\n\n"
        );
    }

    #[test]
    fn test_written_output_reads_back() {
        let mut reader = PubMedReader::new(Cursor::new(SAMPLE));
        let records = reader.read_all().unwrap();

        let mut buffer = Vec::new();
        {
            let mut writer = PubMedWriter::new(&mut buffer);
            writer.write_batch(&records).unwrap();
            writer.finish().unwrap();
        }

        let mut reread = PubMedReader::new(Cursor::new(buffer));
        assert_eq!(reread.read_all().unwrap(), records);
    }
}
