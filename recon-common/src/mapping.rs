//! Mapping Loader
//!
//! Reads a CSV or spreadsheet mapping file into a [`MappingTable`]:
//! source key -> one or more target values.
//!
//! Every header and cell is whitespace-trimmed. Required columns are matched
//! exactly (case-sensitive) after the trim. A missing column fails the whole
//! load; a missing cell only drops that field (or the row, when nothing
//! usable is left).

use calamine::{open_workbook_auto, Data, Reader};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Mapping load errors
#[derive(Debug, Error)]
pub enum LoadError {
    /// Mapping file does not exist
    #[error("mapping file not found: {0}")]
    FileNotFound(PathBuf),

    /// File exists but has no header row
    #[error("mapping file is empty or has no header row: {0}")]
    EmptyInput(PathBuf),

    /// Extension is not one of csv / xls / xlsx
    #[error("unsupported mapping file format '{0}' (use .csv, .xls or .xlsx)")]
    UnsupportedFormat(String),

    /// Table present but required columns are missing
    #[error("missing required columns {missing:?} (expected {expected:?})")]
    Schema {
        missing: Vec<String>,
        expected: Vec<String>,
    },

    /// Parser failure
    #[error("failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },
}

/// Normalize a lookup key: trimmed, lower-cased
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Header row plus data rows, all cells trimmed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Read a `.csv`, `.xls` or `.xlsx` file
    pub fn read(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::FileNotFound(path.to_path_buf()));
        }

        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let table = match ext.as_str() {
            "csv" => Self::read_csv(path)?,
            "xls" | "xlsx" => Self::read_workbook(path)?,
            other => return Err(LoadError::UnsupportedFormat(format!(".{}", other))),
        };

        if table.headers.iter().all(|h| h.is_empty()) {
            return Err(LoadError::EmptyInput(path.to_path_buf()));
        }

        Ok(table)
    }

    fn read_csv(path: &Path) -> Result<Self, LoadError> {
        let read_err = |e: csv::Error| LoadError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(read_err)?;

        let headers = reader
            .headers()
            .map_err(read_err)?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(read_err)?;
            rows.push(record.iter().map(|c| c.trim().to_string()).collect());
        }

        Ok(Self { headers, rows })
    }

    fn read_workbook(path: &Path) -> Result<Self, LoadError> {
        let read_err = |message: String| LoadError::Read {
            path: path.to_path_buf(),
            message,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| read_err(e.to_string()))?;
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range.map_err(|e| read_err(e.to_string()))?,
            None => return Err(LoadError::EmptyInput(path.to_path_buf())),
        };

        let mut rows_iter = range.rows();
        let headers = match rows_iter.next() {
            Some(row) => row.iter().map(cell_to_string).collect(),
            None => return Err(LoadError::EmptyInput(path.to_path_buf())),
        };
        let rows = rows_iter
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();

        Ok(Self { headers, rows })
    }

    /// Position of an exact (trimmed, case-sensitive) header
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name.trim())
    }

    fn cell(&self, row: usize, column: usize) -> &str {
        self.rows[row].get(column).map(String::as_str).unwrap_or("")
    }
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        // Spreadsheet ids typed as numbers come back as floats
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string().trim().to_string(),
    }
}

/// One usable row of the mapping file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    /// Trimmed key in its original case
    pub source_key: String,
    /// Non-blank value columns in header order
    pub fields: Vec<(String, String)>,
    /// 1-based data row number in the source file
    pub row: usize,
}

impl MappingEntry {
    pub fn normalized_key(&self) -> String {
        normalize_key(&self.source_key)
    }

    /// Value of one column, if present and non-blank
    pub fn value(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// First target value (single-target mappings such as `FinalName`)
    pub fn target_value(&self) -> Option<&str> {
        self.fields.first().map(|(_, value)| value.as_str())
    }
}

/// Loaded lookup table
///
/// Duplicate normalized keys are kept in storage; lookup order is load
/// order so the first-loaded entry wins.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    entries: Vec<MappingEntry>,
    index: HashMap<String, Vec<usize>>,
}

impl MappingTable {
    pub fn from_entries(entries: Vec<MappingEntry>) -> Self {
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            index.entry(entry.normalized_key()).or_default().push(i);
        }
        Self { entries, index }
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries stored under an already-normalized key, in load order
    pub fn candidates(&self, normalized_key: &str) -> Vec<&MappingEntry> {
        self.index
            .get(normalized_key)
            .map(|positions| positions.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    /// Number of keys that appear more than once
    pub fn duplicate_key_count(&self) -> usize {
        self.index.values().filter(|v| v.len() > 1).count()
    }
}

/// Mapping Loader
///
/// `key_column` identifies the source key, `value_columns` the target
/// value(s). All of them are required headers.
#[derive(Debug, Clone)]
pub struct MappingLoader {
    key_column: String,
    value_columns: Vec<String>,
}

impl MappingLoader {
    pub fn new(key_column: impl Into<String>, value_columns: Vec<String>) -> Self {
        Self {
            key_column: key_column.into(),
            value_columns,
        }
    }

    /// `Title` -> `FinalName` upload mapping
    pub fn title_to_final_name() -> Self {
        Self::new("Title", vec!["FinalName".to_string()])
    }

    pub fn required_columns(&self) -> Vec<String> {
        std::iter::once(self.key_column.clone())
            .chain(self.value_columns.iter().cloned())
            .collect()
    }

    /// Load and validate a mapping file
    pub fn load(&self, path: &Path) -> Result<MappingTable, LoadError> {
        let raw = RawTable::read(path)?;
        let table = self.from_raw(&raw)?;

        tracing::info!(
            path = %path.display(),
            rows = raw.rows.len(),
            mappings = table.len(),
            "Loaded mapping file"
        );

        Ok(table)
    }

    /// Validate columns and build the table from already-read rows
    pub fn from_raw(&self, raw: &RawTable) -> Result<MappingTable, LoadError> {
        let expected = self.required_columns();
        let missing: Vec<String> = expected
            .iter()
            .filter(|c| raw.column_index(c).is_none())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::Schema { missing, expected });
        }

        // Columns verified above
        let key_idx = raw.column_index(&self.key_column).unwrap_or_default();
        let value_idx: Vec<(String, usize)> = self
            .value_columns
            .iter()
            .map(|c| (c.clone(), raw.column_index(c).unwrap_or_default()))
            .collect();

        let mut entries = Vec::new();
        for row in 0..raw.rows.len() {
            let key = raw.cell(row, key_idx);
            if key.is_empty() {
                continue;
            }

            let fields: Vec<(String, String)> = value_idx
                .iter()
                .map(|(name, idx)| (name.clone(), raw.cell(row, *idx).to_string()))
                .filter(|(_, value)| !value.is_empty())
                .collect();
            if fields.is_empty() {
                tracing::debug!(row = row + 1, key = %key, "Dropping row with no target values");
                continue;
            }

            entries.push(MappingEntry {
                source_key: key.to_string(),
                fields,
                row: row + 1,
            });
        }

        Ok(MappingTable::from_entries(entries))
    }
}
