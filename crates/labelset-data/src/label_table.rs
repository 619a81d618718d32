// LabelTable — (filename, class index) rows loaded from a delimited file
//
// The expected format has no header and two columns:
//
//   tshirt1.jpg,0
//   trouser7.jpg,1
//
// Row order defines index order for every dataset built on top of the table.

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::Path;

use labelset_core::{Error, Result};

/// One row of a label table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRow {
    /// Sample filename, relative to the dataset root.
    pub file: String,
    /// Integer category index.
    pub label: usize,
}

/// Configuration for parsing a label table.
#[derive(Debug, Clone)]
pub struct LabelTableConfig {
    /// Whether the first row is a header (to be skipped).
    pub has_header: bool,
    /// Delimiter byte (default: `,`).
    pub delimiter: u8,
}

impl Default for LabelTableConfig {
    fn default() -> Self {
        Self {
            has_header: false,
            delimiter: b',',
        }
    }
}

impl LabelTableConfig {
    pub fn has_header(mut self, h: bool) -> Self {
        self.has_header = h;
        self
    }
    pub fn delimiter(mut self, d: u8) -> Self {
        self.delimiter = d;
        self
    }
}

/// An ordered, immutable list of labelled filenames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    rows: Vec<LabelRow>,
}

impl LabelTable {
    /// Build a table from rows already in memory.
    pub fn from_rows(rows: Vec<LabelRow>) -> Self {
        Self { rows }
    }

    /// Load a label table from disk with the default format.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with(path, &LabelTableConfig::default())
    }

    /// Load a label table from disk.
    pub fn load_with<P: AsRef<Path>>(path: P, config: &LabelTableConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        let table = Self::from_reader(file, config)?;
        log::debug!(
            "loaded label table {} ({} rows)",
            path.display(),
            table.len()
        );
        Ok(table)
    }

    /// Parse a label table from an in-memory string.
    pub fn from_string(content: &str, config: &LabelTableConfig) -> Result<Self> {
        Self::from_reader(content.as_bytes(), config)
    }

    /// Parse a label table from any reader.
    pub fn from_reader<R: io::Read>(reader: R, config: &LabelTableConfig) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(config.has_header)
            .delimiter(config.delimiter)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(csv_error)?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            // Whitespace-only lines. A row like `,` still has two fields
            // and must fail below.
            if record.len() == 1 && record[0].is_empty() {
                continue;
            }

            if record.len() != 2 {
                return Err(Error::Parse {
                    line,
                    message: format!("expected 2 columns, found {}", record.len()),
                });
            }

            let file = &record[0];
            if file.is_empty() {
                return Err(Error::Parse {
                    line,
                    message: "empty filename".to_string(),
                });
            }

            let label: usize = record[1].parse().map_err(|e| Error::Parse {
                line,
                message: format!("invalid label {:?}: {e}", &record[1]),
            })?;

            rows.push(LabelRow {
                file: file.to_string(),
                label,
            });
        }

        let table = Self { rows };
        let dups = table.duplicate_count();
        if dups > 0 {
            log::warn!("label table lists {dups} filename(s) more than once");
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row at `index`, if any.
    pub fn row(&self, index: usize) -> Option<&LabelRow> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[LabelRow] {
        &self.rows
    }

    /// One past the largest label (0 for an empty table).
    pub fn num_classes(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.label)
            .max()
            .map_or(0, |m| m.saturating_add(1))
    }

    /// Number of rows whose filename already appeared earlier in the table.
    pub fn duplicate_count(&self) -> usize {
        let mut seen = HashSet::with_capacity(self.rows.len());
        self.rows
            .iter()
            .filter(|r| !seen.insert(r.file.as_str()))
            .count()
    }
}

/// I/O failures stay `Io`; anything else the reader rejects (invalid UTF-8,
/// broken quoting) is a malformed table.
fn csv_error(e: csv::Error) -> Error {
    let line = e.position().map(|p| p.line()).unwrap_or(0);
    let message = e.to_string();
    match e.into_kind() {
        csv::ErrorKind::Io(io) => Error::Io(io),
        _ => Error::Parse { line, message },
    }
}

// Tests
