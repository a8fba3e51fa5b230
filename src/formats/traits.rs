//! Format reader and writer traits for citation records.
//!
//! Each textual format provides a reader that turns a line source into
//! records and a writer that turns records back into text. The record type
//! is an associated type, so RIS and PubMed keep their own representations.
//!
//! # Example
//!
//! ```
//! use citedup::formats::{FormatReader, FormatWriter};
//!
//! fn copy_records<R, W>(reader: &mut R, writer: &mut W) -> citedup::Result<usize>
//! where
//!     R: FormatReader,
//!     W: FormatWriter<Record = R::Record>,
//! {
//!     let mut count = 0;
//!     while let Some(record) = reader.read_record()? {
//!         writer.write_record(&record)?;
//!         count += 1;
//!     }
//!     writer.finish()?;
//!     Ok(count)
//! }
//! ```

use crate::error::Result;

/// Trait for readers that produce citation records from a source.
///
/// Implementations return `Ok(None)` when the source is exhausted.
pub trait FormatReader: std::fmt::Debug {
    /// The record type produced.
    type Record;

    /// Read the next record from the source.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the underlying source fails.
    fn read_record(&mut self) -> Result<Option<Self::Record>>;

    /// Read all remaining records into a vector.
    ///
    /// # Errors
    ///
    /// Returns an error if any read fails. On error, previously read records
    /// are discarded.
    fn read_all(&mut self) -> Result<Vec<Self::Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Returns the number of records read so far, if tracked.
    fn records_read(&self) -> Option<usize> {
        None
    }
}

/// Trait for writers that serialize citation records.
///
/// # Important: Always Call `finish`
///
/// Writers buffer their output. [`finish`](Self::finish) flushes it; after
/// that, further writes fail.
pub trait FormatWriter: std::fmt::Debug {
    /// The record type consumed.
    type Record;

    /// Write a single record.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer is finished or the output fails.
    fn write_record(&mut self, record: &Self::Record) -> Result<()>;

    /// Write multiple records in order.
    ///
    /// # Errors
    ///
    /// Returns an error if any record cannot be written.
    fn write_batch(&mut self, records: &[Self::Record]) -> Result<()> {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Flush buffered output and mark the writer finished.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing the underlying output fails.
    fn finish(&mut self) -> Result<()>;

    /// Returns the number of records written so far, if tracked.
    fn records_written(&self) -> Option<usize> {
        None
    }
}

/// Extension trait providing iterator-style access for format readers.
///
/// Automatically implemented for all types implementing [`FormatReader`].
pub trait FormatReaderExt: FormatReader {
    /// Create an iterator over records from this reader.
    fn records(&mut self) -> RecordIterator<'_, Self>
    where
        Self: Sized,
    {
        RecordIterator { reader: self }
    }
}

impl<T: FormatReader> FormatReaderExt for T {}

/// Iterator adapter for [`FormatReader`].
///
/// Created by the [`records`](FormatReaderExt::records) method.
#[derive(Debug)]
pub struct RecordIterator<'a, R: FormatReader> {
    reader: &'a mut R,
}

impl<R: FormatReader> Iterator for RecordIterator<'_, R> {
    type Item = Result<R::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().transpose()
    }
}
