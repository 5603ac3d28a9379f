// 🗄️ Table - header + rows of text cells, loaded from and written to CSV
//
// Every dataset in the pipeline (bio, results, games, countries, tally) is a
// Table. Cells stay text; typed views live in `entities`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const BOM: char = '\u{feff}';

// ============================================================================
// TABLE
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Ordered column names, unique within the table
    pub header: Vec<String>,

    /// Rows in insertion order. Rows may be shorter than the header.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table with the given header and no rows
    pub fn with_header<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Table {
            header: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Builder: append a row
    pub fn with_row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    /// True when the table has no header at all (missing or empty file)
    pub fn is_blank(&self) -> bool {
        self.header.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Exact column lookup (surrounding whitespace ignored)
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h.trim() == name)
    }

    /// Case-insensitive column lookup
    pub fn column_ci(&self, name: &str) -> Option<usize> {
        self.header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }

    /// First alias (in priority order) that names a column, case-insensitive
    pub fn find_column(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|alias| self.column_ci(alias))
    }

    /// Index of `name`, appending an empty column when it does not exist yet
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column(name) {
            return idx;
        }
        self.header.push(name.to_string());
        for row in &mut self.rows {
            row.resize(self.header.len(), String::new());
        }
        self.header.len() - 1
    }

    /// All values of one column, empty string for short rows
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |row| cell(row, idx))
    }
}

/// Trimmed cell value, empty when the row is too short
pub fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|v| v.trim()).unwrap_or("")
}

/// Set a cell, padding short rows with empty cells
pub fn set_cell(row: &mut Vec<String>, idx: usize, value: impl Into<String>) {
    if row.len() <= idx {
        row.resize(idx + 1, String::new());
    }
    row[idx] = value.into();
}

// ============================================================================
// CSV I/O
// ============================================================================

/// Load a CSV file: first record is the header, the rest are rows.
///
/// A leading UTF-8 BOM is stripped and ragged rows are kept as-is.
pub fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let mut records = reader.records();
    let mut table = Table::default();

    if let Some(first) = records.next() {
        let first = first.with_context(|| format!("Failed to read header of {}", path.display()))?;
        table.header = first
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if i == 0 {
                    h.trim_start_matches(BOM).to_string()
                } else {
                    h.to_string()
                }
            })
            .collect();
    }

    for (line_num, result) in records.enumerate() {
        let record = result.with_context(|| {
            format!("Failed to parse CSV line {} in {}", line_num + 2, path.display())
        })?;
        table.rows.push(record.iter().map(str::to_string).collect());
    }

    debug!(path = %path.display(), rows = table.len(), "loaded table");
    Ok(table)
}

/// Load a CSV file, treating a missing file as an empty table
pub fn load_csv_or_empty(path: &Path) -> Result<Table> {
    if !path.exists() {
        warn!(path = %path.display(), "input file not found, continuing with an empty table");
        return Ok(Table::default());
    }
    load_csv(path)
}

/// Write a table as BOM-prefixed CSV and return the SHA-256 of the bytes written
pub fn write_csv(path: &Path, table: &Table) -> Result<String> {
    let bytes = to_csv_bytes(table)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    fs::write(path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), rows = table.len(), "wrote table");
    Ok(sha256_hex(&bytes))
}

fn to_csv_bytes(table: &Table) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(BOM.to_string().as_bytes());

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::CRLF)
        .from_writer(buffer);

    if !table.is_blank() {
        writer.write_record(&table.header).context("Failed to encode header")?;
    }
    for row in &table.rows {
        writer.write_record(row).context("Failed to encode row")?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV buffer: {}", e.error()))
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::with_header(["noc", "country"])
            .with_row(["FRA", "France"])
            .with_row(["USA", "United States"])
    }

    #[test]
    fn test_column_lookup() {
        let table = Table::with_header(["athlete_id", " Name ", "NOC"]);

        assert_eq!(table.column("athlete_id"), Some(0));
        assert_eq!(table.column("Name"), Some(1));
        assert_eq!(table.column("name"), None);
        assert_eq!(table.column_ci("name"), Some(1));
        assert_eq!(table.find_column(&["country_code", "noc"]), Some(2));
        assert_eq!(table.find_column(&["missing"]), None);
    }

    #[test]
    fn test_ensure_column_pads_rows() {
        let mut table = sample();
        let idx = table.ensure_column("age");

        assert_eq!(idx, 2);
        assert!(table.rows.iter().all(|r| r.len() == 3));
        assert_eq!(table.ensure_column("age"), 2);
    }

    #[test]
    fn test_cell_helpers() {
        let mut row = vec!["a".to_string()];
        assert_eq!(cell(&row, 0), "a");
        assert_eq!(cell(&row, 5), "");

        set_cell(&mut row, 2, "c");
        assert_eq!(row, vec!["a", "", "c"]);
    }

    #[test]
    fn test_csv_roundtrip_with_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("countries.csv");

        let table = sample().with_row(["CIV", "Côte d'Ivoire, Republic"]);
        let digest = write_csv(&path, &table).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with("\u{feff}".as_bytes()));
        assert_eq!(digest.len(), 64);

        let loaded = load_csv(&path).unwrap();
        assert_eq!(loaded, table);
        assert_eq!(sha256_hex(&to_csv_bytes(&loaded).unwrap()), digest);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = load_csv_or_empty(&dir.path().join("nope.csv")).unwrap();

        assert!(table.is_blank());
        assert!(table.is_empty());
    }

    #[test]
    fn test_ragged_rows_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        fs::write(&path, "a,b,c\n1,2\n3,4,5,6\n").unwrap();

        let table = load_csv(&path).unwrap();
        assert_eq!(table.rows[0], vec!["1", "2"]);
        assert_eq!(table.rows[1].len(), 4);
    }
}
