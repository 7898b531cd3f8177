//! Cleaned-table CSV output.

use std::path::Path;

use crate::error::EngineResult;
use crate::types::Table;

/// Write `table` to `path` as comma-delimited UTF-8, without an index column.
///
/// Parent directories are created as needed. Nulls are written as empty
/// cells; date-times as `YYYY-MM-DD HH:MM:SS`.
pub fn write_csv_to_path(table: &Table, path: impl AsRef<Path>) -> EngineResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(table.schema.field_names())?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(|v| v.render()))?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::csv::load_csv_from_bytes;

    #[test]
    fn round_trips_through_load() {
        let table = load_csv_from_bytes(b"id,name,score\n1,Ada,98.5\n2,Grace,\n").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("clean.csv");
        write_csv_to_path(&table, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let reloaded = load_csv_from_bytes(&bytes).unwrap();
        assert_eq!(reloaded, table);
    }
}
