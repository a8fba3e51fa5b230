//! Run summary.
//!
//! A [`Report`] carries the four counts of one run and renders them as a
//! grid table or as JSON.

use crate::dedup::Counters;
use crate::error::{CiteError, Result};
use crate::formats::Format;
use comfy_table::{presets, Cell, CellAlignment, Table};
use serde::Serialize;
use std::path::PathBuf;

/// Summary of one processing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Input format processed
    pub format: Format,
    /// Input files read, in processing order
    pub inputs: Vec<PathBuf>,
    /// Classification counts
    pub counters: Counters,
}

impl Report {
    /// Create a report.
    #[must_use]
    pub fn new(format: Format, inputs: Vec<PathBuf>, counters: Counters) -> Self {
        Report {
            format,
            inputs,
            counters,
        }
    }

    /// Heading printed above the table.
    #[must_use]
    pub fn title(&self) -> String {
        match self.format {
            Format::Ris => "> RIS processor".to_string(),
            _ => format!("> {} Processor", self.format),
        }
    }

    /// The four `(description, count)` rows in display order.
    #[must_use]
    pub fn rows(&self) -> [(&'static str, usize); 4] {
        [
            ("Total", self.counters.total),
            ("Duplicates", self.counters.duplicates),
            ("Unique", self.counters.unique),
            ("Faulty", self.counters.faulty),
        ]
    }

    /// Build the summary table.
    #[must_use]
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(presets::ASCII_FULL);
        table.set_header(vec!["Description", "Count"]);
        for (description, count) in self.rows() {
            table.add_row(vec![
                Cell::new(description),
                Cell::new(count).set_alignment(CellAlignment::Right),
            ]);
        }
        table
    }

    /// Title and table, ready to print.
    #[must_use]
    pub fn render_table(&self) -> String {
        format!("\n{}\n{}", self.title(), self.to_table())
    }

    /// Serialize the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CiteError::SerializationError`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CiteError::SerializationError(e.to_string()))
    }
}
