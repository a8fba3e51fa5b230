//! Common test helpers and fixtures shared across the test suite.

#![allow(dead_code)]

use citedup::Settings;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Path of a checked-in fixture under `tests/data`.
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

/// Builds the text of one RIS record.
///
/// `doi` and `abstract_text` are omitted when `None`.
pub fn ris_record(title: &str, doi: Option<&str>, abstract_text: Option<&str>) -> String {
    let mut text = format!("TY  - JOUR\nTI  - {title}\n");
    if let Some(doi) = doi {
        text.push_str(&format!("DO  - {doi}\n"));
    }
    if let Some(abstract_text) = abstract_text {
        text.push_str(&format!("AB  - {abstract_text}\n"));
    }
    text.push_str("ER  - \n\n");
    text
}

/// Builds the text of one PubMed record, with a blank separator line.
///
/// When `doi` is given it is placed on an `AID` line with the `[doi]` suffix.
pub fn pubmed_record(pmid: u32, doi: Option<&str>) -> String {
    let mut text = format!("PMID- {pmid}\nTI  - Article {pmid}.\n");
    if let Some(doi) = doi {
        text.push_str(&format!("AID - {doi} [doi]\n"));
    }
    text.push_str("AB  - Abstract text.\n\n");
    text
}

/// A scratch workspace with `inputs/` and `outputs/` directories.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Could not create temp dir");
        std::fs::create_dir(dir.path().join("inputs")).expect("Could not create inputs dir");
        Workspace { dir }
    }

    /// Write an input file under `inputs/`.
    pub fn input(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join("inputs").join(name);
        std::fs::write(&path, content).expect("Could not write input file");
        path
    }

    /// Copy a checked-in fixture into `inputs/` under `name`.
    pub fn input_fixture(&self, fixture_name: &str, name: &str) -> PathBuf {
        let path = self.dir.path().join("inputs").join(name);
        std::fs::copy(fixture(fixture_name), &path).expect("Could not copy fixture");
        path
    }

    /// Settings pointing at this workspace.
    pub fn settings(&self) -> Settings {
        Settings {
            input_dir: self.dir.path().join("inputs"),
            output_dir: self.dir.path().join("outputs"),
            ..Settings::default()
        }
    }

    /// Read an output file under `outputs/`.
    pub fn output(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join("outputs").join(name))
            .expect("Could not read output file")
    }
}
