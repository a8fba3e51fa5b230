//! Run configuration.
//!
//! Settings are read from a TOML file. Every key is optional; missing keys
//! take the defaults shown here.
//!
//! ```toml
//! input_dir = "./inputs"
//! output_dir = "./outputs"
//! parallel = false
//!
//! [ris]
//! pattern = "*.ris"
//! unique_file = "ris_cleaned.ris"
//! faulty_file = "ris_faulty.ris"
//! keep_unterminated = false
//!
//! [pubmed]
//! pattern = "pubmed-*.txt"
//! unique_file = "pubmed_cleaned.txt"
//! faulty_file = "pubmed_faulty.txt"
//! # defaults to <output_dir>/<ris.unique_file>
//! # index_file = "./outputs/ris_cleaned.ris"
//! ```

use crate::error::{CiteError, Result};
use crate::formats::Format;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "citedup.toml";

/// Top-level settings for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory searched for input files
    pub input_dir: PathBuf,
    /// Directory receiving the output partitions
    pub output_dir: PathBuf,
    /// Parse input files concurrently before classification
    pub parallel: bool,
    /// RIS path settings
    pub ris: RisSettings,
    /// PubMed path settings
    pub pubmed: PubMedSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            input_dir: PathBuf::from("./inputs"),
            output_dir: PathBuf::from("./outputs"),
            parallel: false,
            ris: RisSettings::default(),
            pubmed: PubMedSettings::default(),
        }
    }
}

/// RIS path settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RisSettings {
    /// Glob pattern for input files, relative to `input_dir`
    pub pattern: String,
    /// Unique partition file name, relative to `output_dir`
    pub unique_file: PathBuf,
    /// Faulty partition file name, relative to `output_dir`
    pub faulty_file: PathBuf,
    /// Emit a trailing record that has no `ER  -` line
    pub keep_unterminated: bool,
}

impl Default for RisSettings {
    fn default() -> Self {
        RisSettings {
            pattern: Format::Ris.default_pattern().to_string(),
            unique_file: PathBuf::from("ris_cleaned.ris"),
            faulty_file: PathBuf::from("ris_faulty.ris"),
            keep_unterminated: false,
        }
    }
}

/// PubMed path settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PubMedSettings {
    /// Glob pattern for input files, relative to `input_dir`
    pub pattern: String,
    /// Unique partition file name, relative to `output_dir`
    pub unique_file: PathBuf,
    /// Faulty partition file name, relative to `output_dir`
    pub faulty_file: PathBuf,
    /// RIS file seeding the identifier index
    pub index_file: Option<PathBuf>,
}

impl Default for PubMedSettings {
    fn default() -> Self {
        PubMedSettings {
            pattern: Format::PubMed.default_pattern().to_string(),
            unique_file: PathBuf::from("pubmed_cleaned.txt"),
            faulty_file: PathBuf::from("pubmed_faulty.txt"),
            index_file: None,
        }
    }
}

impl Settings {
    /// Parse settings from TOML text.
    ///
    /// ```
    /// use citedup::Settings;
    ///
    /// let text = "output_dir = \"out\"\n[ris]\nkeep_unterminated = true\n";
    /// let settings = Settings::from_toml_str(text)?;
    /// assert!(settings.ris.keep_unterminated);
    /// assert_eq!(settings.ris.pattern, "*.ris");
    /// # Ok::<(), citedup::CiteError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`CiteError::ConfigError`] if the text is not valid settings TOML.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| CiteError::ConfigError(e.to_string()))
    }

    /// Load settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CiteError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        let settings = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(settings)
    }

    /// Load `path` if given, else `./citedup.toml` if it exists, else defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a selected file cannot be read or parsed.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            },
        }
    }

    /// Full path of the RIS unique partition.
    #[must_use]
    pub fn ris_unique_path(&self) -> PathBuf {
        self.output_dir.join(&self.ris.unique_file)
    }

    /// Full path of the RIS faulty partition.
    #[must_use]
    pub fn ris_faulty_path(&self) -> PathBuf {
        self.output_dir.join(&self.ris.faulty_file)
    }

    /// Full path of the PubMed unique partition.
    #[must_use]
    pub fn pubmed_unique_path(&self) -> PathBuf {
        self.output_dir.join(&self.pubmed.unique_file)
    }

    /// Full path of the PubMed faulty partition.
    #[must_use]
    pub fn pubmed_faulty_path(&self) -> PathBuf {
        self.output_dir.join(&self.pubmed.faulty_file)
    }

    /// RIS file seeding the PubMed identifier index.
    ///
    /// Defaults to the RIS unique partition.
    #[must_use]
    pub fn pubmed_index_path(&self) -> PathBuf {
        self.pubmed
            .index_file
            .clone()
            .unwrap_or_else(|| self.ris_unique_path())
    }
}
