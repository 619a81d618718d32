// ProviderConfig — describe an ImageCsvDataset in a TOML file
//
//   labels = "data/labels.csv"
//   root = "data/images"
//   has_header = false   # optional
//   delimiter = ","      # optional
//
// Relative paths in a file loaded with `ProviderConfig::load` are resolved
// against the directory containing that file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use labelset_core::{Error, Result};

use crate::image_csv::ImageCsvDataset;
use crate::label_table::LabelTableConfig;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Path of the label table.
    pub labels: PathBuf,
    /// Directory the table's filenames are relative to.
    pub root: PathBuf,
    #[serde(default)]
    pub has_header: bool,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_delimiter() -> char {
    ','
}

impl ProviderConfig {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(labels: P, root: Q) -> Self {
        Self {
            labels: labels.into(),
            root: root.into(),
            has_header: false,
            delimiter: default_delimiter(),
        }
    }

    /// Parse a config from TOML text. Paths are kept as written.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read a config file, resolving relative paths against its directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            config.labels = base.join(&config.labels);
            config.root = base.join(&config.root);
        }
        Ok(config)
    }

    /// The label table format described by this config.
    pub fn table_config(&self) -> Result<LabelTableConfig> {
        if !self.delimiter.is_ascii() {
            return Err(Error::Config(format!(
                "delimiter {:?} is not a single ASCII character",
                self.delimiter
            )));
        }
        Ok(LabelTableConfig::default()
            .has_header(self.has_header)
            .delimiter(self.delimiter as u8))
    }

    /// Build the dataset, with no transforms configured.
    pub fn open(&self) -> Result<ImageCsvDataset> {
        ImageCsvDataset::with_config(&self.labels, &self.root, &self.table_config()?)
    }
}
