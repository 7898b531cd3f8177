//! The process-wide dataset store.
//!
//! [`DatasetStore`] owns exactly one current [`Table`] plus load metadata.
//! It is designed for a single logical writer: one transformation commits (or
//! is rejected) before the next is issued, and read-only consumers take the
//! current snapshot at call entry.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{EngineError, EngineResult};
use crate::ingestion;
use crate::types::Table;

/// Metadata captured when a table is loaded.
#[derive(Debug, Clone)]
pub struct DatasetMetadata {
    /// Path the table was loaded from.
    pub source: PathBuf,
    /// File name component of `source`.
    pub file_name: String,
    /// Wall-clock load time.
    pub loaded_at: DateTime<Local>,
    /// Shape of the table as loaded, before any transformation.
    pub original_shape: (usize, usize),
}

/// Owner of the single live [`Table`].
///
/// Created empty; populated by [`DatasetStore::load`], which replaces any
/// prior table outright. A transformation either fully replaces the table via
/// [`DatasetStore::replace`] or leaves the store untouched.
#[derive(Debug, Default)]
pub struct DatasetStore {
    table: Option<Table>,
    metadata: Option<DatasetMetadata>,
}

impl DatasetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a delimited text file, replacing the current table and metadata.
    ///
    /// Delegates parsing to [`crate::ingestion::load_csv_from_path`]; any
    /// prior table is dropped only after the new parse succeeds.
    pub fn load(&mut self, path: impl AsRef<Path>) -> EngineResult<&Table> {
        let path = path.as_ref();
        let table = ingestion::load_csv_from_path(path)?;

        self.metadata = Some(DatasetMetadata {
            source: path.to_path_buf(),
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            loaded_at: Local::now(),
            original_shape: table.shape(),
        });
        self.table = Some(table);
        self.current()
    }

    /// Replace the current table from an in-memory value.
    ///
    /// Used by tests and by the sandbox after a successful transformation.
    pub fn replace(&mut self, table: Table) {
        self.table = Some(table);
    }

    /// Seed the store with an in-memory table and synthetic metadata.
    pub fn load_table(&mut self, table: Table, source_name: &str) {
        self.metadata = Some(DatasetMetadata {
            source: PathBuf::from(source_name),
            file_name: source_name.to_string(),
            loaded_at: Local::now(),
            original_shape: table.shape(),
        });
        self.table = Some(table);
    }

    /// The current table, or [`EngineError::NotLoaded`] before any load.
    pub fn current(&self) -> EngineResult<&Table> {
        self.table.as_ref().ok_or(EngineError::NotLoaded)
    }

    /// Load metadata, if a table has been loaded.
    pub fn metadata(&self) -> Option<&DatasetMetadata> {
        self.metadata.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, Field, Schema, Value};

    #[test]
    fn current_before_load_is_not_loaded() {
        let store = DatasetStore::new();
        assert!(matches!(store.current(), Err(EngineError::NotLoaded)));
    }

    #[test]
    fn load_table_seeds_metadata_and_shape() {
        let mut store = DatasetStore::new();
        let schema = Schema::new(vec![Field::new("id", DataType::Int64)]);
        store.load_table(
            Table::new(schema, vec![vec![Value::Int64(1)]]),
            "seed.csv",
        );
        assert_eq!(store.current().unwrap().shape(), (1, 1));
        let meta = store.metadata().unwrap();
        assert_eq!(meta.file_name, "seed.csv");
        assert_eq!(meta.original_shape, (1, 1));
    }

    #[test]
    fn replace_swaps_the_table() {
        let mut store = DatasetStore::new();
        let schema = Schema::new(vec![Field::new("id", DataType::Int64)]);
        store.load_table(
            Table::new(schema.clone(), vec![vec![Value::Int64(1)]]),
            "seed.csv",
        );
        store.replace(Table::new(schema, Vec::new()));
        assert_eq!(store.current().unwrap().row_count(), 0);
        // Metadata keeps the original shape.
        assert_eq!(store.metadata().unwrap().original_shape, (1, 1));
    }
}
