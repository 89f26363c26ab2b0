//! Row-oriented sheet store.
//!
//! The pantry keeps its data in two flat sheets (entries and rates), each a
//! header row plus data rows of text cells. Row indices used here are 0-based
//! data-row indices; the header is never addressable.

use crate::error::PantryError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};

/// One data row keyed by trimmed header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub row: usize,
    fields: HashMap<String, String>,
}

impl Record {
    /// Cell value for a header; missing columns read as empty.
    pub fn get(&self, header: &str) -> &str {
        self.fields.get(header).map(String::as_str).unwrap_or("")
    }
}

/// In-memory table: header + rows. All sheet semantics live here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(header: &[&str]) -> Self {
        Self {
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn from_parts(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All data rows as records. Header names are trimmed; short rows are
    /// padded with empty cells.
    pub fn records(&self) -> Vec<Record> {
        let header: Vec<String> = self.header.iter().map(|h| h.trim().to_string()).collect();
        self.rows
            .iter()
            .enumerate()
            .map(|(row, cells)| Record {
                row,
                fields: header
                    .iter()
                    .enumerate()
                    .map(|(col, name)| (name.clone(), cells.get(col).cloned().unwrap_or_default()))
                    .collect(),
            })
            .collect()
    }

    /// Every value in a column (data rows only).
    pub fn column_values(&self, col: usize) -> Vec<String> {
        self.rows
            .iter()
            .map(|cells| cells.get(col).cloned().unwrap_or_default())
            .collect()
    }

    pub fn append_row(&mut self, values: Vec<String>) -> usize {
        self.rows.push(values);
        self.rows.len() - 1
    }

    pub fn update_cell(&mut self, row: usize, col: usize, value: String) -> Result<(), PantryError> {
        let len = self.rows.len();
        let cells = self
            .rows
            .get_mut(row)
            .ok_or(PantryError::RowOutOfRange { index: row, len })?;
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value;
        Ok(())
    }

    pub fn update_row(&mut self, row: usize, values: Vec<String>) -> Result<(), PantryError> {
        let len = self.rows.len();
        let cells = self
            .rows
            .get_mut(row)
            .ok_or(PantryError::RowOutOfRange { index: row, len })?;
        *cells = values;
        Ok(())
    }

    pub fn delete_row(&mut self, row: usize) -> Result<Vec<String>, PantryError> {
        if row >= self.rows.len() {
            return Err(PantryError::RowOutOfRange {
                index: row,
                len: self.rows.len(),
            });
        }
        Ok(self.rows.remove(row))
    }

    /// Insert before `row`; `row == len` appends.
    pub fn insert_row(&mut self, row: usize, values: Vec<String>) -> Result<(), PantryError> {
        if row > self.rows.len() {
            return Err(PantryError::RowOutOfRange {
                index: row,
                len: self.rows.len(),
            });
        }
        self.rows.insert(row, values);
        Ok(())
    }
}

/// The external row store. Implementations own durability; callers get no
/// transactional guarantees across calls.
#[async_trait]
pub trait Sheet: Send + Sync {
    /// Sheet name, for logs.
    fn name(&self) -> &str;

    async fn read_all(&self) -> Result<Vec<Record>, PantryError>;

    async fn column_values(&self, col: usize) -> Result<Vec<String>, PantryError>;

    /// Append a row and return its index.
    async fn append_row(&self, values: Vec<String>) -> Result<usize, PantryError>;

    async fn update_cell(&self, row: usize, col: usize, value: String) -> Result<(), PantryError>;

    async fn update_row(&self, row: usize, values: Vec<String>) -> Result<(), PantryError>;

    /// Remove a row and return its former cells.
    async fn delete_row(&self, row: usize) -> Result<Vec<String>, PantryError>;

    async fn insert_row(&self, row: usize, values: Vec<String>) -> Result<(), PantryError>;
}

// -------------------------------------------------------------------------
// In-memory sheet
// -------------------------------------------------------------------------

/// Sheet held in process memory. Used when no data directory is configured
/// and in tests.
pub struct MemorySheet {
    name: String,
    table: RwLock<Table>,
}

impl MemorySheet {
    pub fn new(name: impl Into<String>, header: &[&str]) -> Self {
        Self::with_table(name, Table::new(header))
    }

    pub fn with_table(name: impl Into<String>, table: Table) -> Self {
        Self {
            name: name.into(),
            table: RwLock::new(table),
        }
    }
}

#[async_trait]
impl Sheet for MemorySheet {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_all(&self) -> Result<Vec<Record>, PantryError> {
        Ok(self.table.read().await.records())
    }

    async fn column_values(&self, col: usize) -> Result<Vec<String>, PantryError> {
        Ok(self.table.read().await.column_values(col))
    }

    async fn append_row(&self, values: Vec<String>) -> Result<usize, PantryError> {
        Ok(self.table.write().await.append_row(values))
    }

    async fn update_cell(&self, row: usize, col: usize, value: String) -> Result<(), PantryError> {
        self.table.write().await.update_cell(row, col, value)
    }

    async fn update_row(&self, row: usize, values: Vec<String>) -> Result<(), PantryError> {
        self.table.write().await.update_row(row, values)
    }

    async fn delete_row(&self, row: usize) -> Result<Vec<String>, PantryError> {
        self.table.write().await.delete_row(row)
    }

    async fn insert_row(&self, row: usize, values: Vec<String>) -> Result<(), PantryError> {
        self.table.write().await.insert_row(row, values)
    }
}

// -------------------------------------------------------------------------
// CSV-file sheet
// -------------------------------------------------------------------------

/// Sheet persisted as a CSV file. Every call re-reads the file so edits
/// made outside the service are picked up; mutations rewrite it whole.
pub struct CsvSheet {
    name: String,
    path: PathBuf,
    header: Vec<String>,
    lock: Mutex<()>,
}

impl CsvSheet {
    /// Open (or create with `header`) the CSV file at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        header: &[&str],
    ) -> Result<Self, PantryError> {
        let sheet = Self {
            name: name.into(),
            path: path.as_ref().to_path_buf(),
            header: header.iter().map(|h| h.to_string()).collect(),
            lock: Mutex::new(()),
        };

        if !sheet.path.exists() {
            if let Some(parent) = sheet.path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let table = Table::from_parts(sheet.header.clone(), Vec::new());
            let path = sheet.path.clone();
            run_blocking(move || save_table(&path, &table)).await?;
            info!(sheet = %sheet.name, "Created empty sheet");
        }

        Ok(sheet)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load, apply `op`, and write back when `op` reports a change.
    async fn with_table<T, F>(&self, op: F) -> Result<T, PantryError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Table) -> Result<(T, bool), PantryError> + Send + 'static,
    {
        let _guard = self.lock.lock().await;
        let path = self.path.clone();
        let header = self.header.clone();

        run_blocking(move || {
            let mut table = load_table(&path, header)?;
            let (value, changed) = op(&mut table)?;
            if changed {
                save_table(&path, &table)?;
                debug!(path = %path.display(), rows = table.len(), "Sheet written");
            }
            Ok(value)
        })
        .await
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, PantryError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PantryError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PantryError::Storage(anyhow::anyhow!("Sheet task failed: {}", e)))?
}

fn load_table(path: &Path, default_header: Vec<String>) -> Result<Table, PantryError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?.iter().map(str::to_string).collect(),
        None => default_header,
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table::from_parts(header, rows))
}

fn save_table(path: &Path, table: &Table) -> Result<(), PantryError> {
    let tmp = path.with_extension("csv.tmp");
    {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_path(&tmp)?;
        writer.write_record(table.header())?;
        for row in table.rows() {
            writer.write_record(row)?;
        }
        writer.flush()?;
    }
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[async_trait]
impl Sheet for CsvSheet {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_all(&self) -> Result<Vec<Record>, PantryError> {
        self.with_table(|t| Ok((t.records(), false))).await
    }

    async fn column_values(&self, col: usize) -> Result<Vec<String>, PantryError> {
        self.with_table(move |t| Ok((t.column_values(col), false)))
            .await
    }

    async fn append_row(&self, values: Vec<String>) -> Result<usize, PantryError> {
        self.with_table(move |t| Ok((t.append_row(values), true)))
            .await
    }

    async fn update_cell(&self, row: usize, col: usize, value: String) -> Result<(), PantryError> {
        self.with_table(move |t| t.update_cell(row, col, value).map(|_| ((), true)))
            .await
    }

    async fn update_row(&self, row: usize, values: Vec<String>) -> Result<(), PantryError> {
        self.with_table(move |t| t.update_row(row, values).map(|_| ((), true)))
            .await
    }

    async fn delete_row(&self, row: usize) -> Result<Vec<String>, PantryError> {
        self.with_table(move |t| t.delete_row(row).map(|cells| (cells, true)))
            .await
    }

    async fn insert_row(&self, row: usize, values: Vec<String>) -> Result<(), PantryError> {
        self.with_table(move |t| t.insert_row(row, values).map(|_| ((), true)))
            .await
    }
}
