//! Schema and quality profiling.
//!
//! [`profile`] computes a structural snapshot of the current table: per-column
//! type, null counts and percentages, distinct cardinality, full-row
//! duplicates, and overall completeness. The profile is a pure function of
//! the table at call time and is never cached across mutations. Output
//! adapters render it as JSON (machine-parseable) and Markdown
//! (human-readable), both derived from the same struct.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

use chrono::Local;
use serde::Serialize;

use crate::error::EngineResult;
use crate::types::{DataType, Table, Value, ValueKey};

/// Structural/quality profile of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    /// Column name.
    pub name: String,
    /// Declared type name (`int64`, `utf8`, ...).
    pub data_type: String,
    /// Broad classification: `numeric`, `categorical`, or `datetime`.
    pub kind: String,
    /// Number of null cells.
    pub null_count: usize,
    /// Null cells as a percentage of rows, rounded to 2 decimals.
    pub null_pct: f64,
    /// Distinct non-null values.
    pub distinct_count: usize,
}

/// Structural/quality profile of a whole table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaProfile {
    /// Name used in rendered documents.
    pub dataset_name: String,
    /// `(rows, columns)` at profiling time.
    pub shape: (usize, usize),
    /// Per-column profiles in schema order.
    pub columns: Vec<ColumnProfile>,
    /// Rows whose full value tuple appears earlier in the table.
    pub duplicate_row_count: usize,
    /// Non-null cells as a percentage of all cells, rounded to 2 decimals.
    pub completeness_pct: f64,
    /// Wall-clock profiling time, RFC 3339.
    pub generated_at: String,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn classify(data_type: DataType) -> &'static str {
    match data_type {
        DataType::Int64 | DataType::Float64 => "numeric",
        DataType::DateTime => "datetime",
        DataType::Bool | DataType::Utf8 => "categorical",
    }
}

/// Compute the profile of `table`.
pub fn profile(table: &Table) -> SchemaProfile {
    let row_count = table.row_count();
    let mut columns = Vec::with_capacity(table.column_count());
    let mut total_nulls = 0usize;

    for (idx, field) in table.schema.fields.iter().enumerate() {
        let mut null_count = 0usize;
        let mut distinct: HashSet<ValueKey> = HashSet::new();
        for value in table.column_values(idx) {
            if value.is_null() {
                null_count += 1;
            } else {
                distinct.insert(value.key());
            }
        }
        total_nulls += null_count;

        let null_pct = if row_count == 0 {
            0.0
        } else {
            round2(null_count as f64 / row_count as f64 * 100.0)
        };
        columns.push(ColumnProfile {
            name: field.name.clone(),
            data_type: field.data_type.name().to_string(),
            kind: classify(field.data_type).to_string(),
            null_count,
            null_pct,
            distinct_count: distinct.len(),
        });
    }

    let mut seen: HashSet<Vec<ValueKey>> = HashSet::with_capacity(row_count);
    let duplicate_row_count = table
        .rows
        .iter()
        .filter(|row| !seen.insert(row.iter().map(Value::key).collect()))
        .count();

    let total_cells = row_count * table.column_count();
    let completeness_pct = if total_cells == 0 {
        100.0
    } else {
        round2((total_cells - total_nulls) as f64 / total_cells as f64 * 100.0)
    };

    SchemaProfile {
        dataset_name: "dataset".to_string(),
        shape: table.shape(),
        columns,
        duplicate_row_count,
        completeness_pct,
        generated_at: Local::now().to_rfc3339(),
    }
}

impl SchemaProfile {
    /// Set the dataset name used in rendered documents.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.dataset_name = name.into();
        self
    }

    /// Pretty-printed JSON document.
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable schema-map document.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Schema Map - {}", self.dataset_name);
        let _ = writeln!(out, "\n**Generated:** {}", self.generated_at);
        let _ = writeln!(
            out,
            "\n**Shape:** {} rows x {} columns",
            self.shape.0, self.shape.1
        );
        let _ = writeln!(out, "\n**Duplicate Rows:** {}", self.duplicate_row_count);
        let _ = writeln!(out, "\n**Completeness:** {}%", self.completeness_pct);
        let _ = writeln!(out, "\n## Column Details\n");
        for col in &self.columns {
            let _ = writeln!(out, "### {}", col.name);
            let _ = writeln!(out, "- **Type:** {} ({})", col.data_type, col.kind);
            let _ = writeln!(out, "- **Unique Values:** {}", col.distinct_count);
            let _ = writeln!(
                out,
                "- **Missing Values:** {} ({}%)\n",
                col.null_count, col.null_pct
            );
        }
        out
    }

    /// Write `schema_map.json` and `schema_map.md` under `dir`.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> EngineResult<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join("schema_map.json"), self.to_json()?)?;
        std::fs::write(dir.join("schema_map.md"), self.to_markdown())?;
        Ok(())
    }
}
