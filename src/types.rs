//! Core data model types.
//!
//! The engine operates on a single in-memory [`Table`]: an ordered list of typed
//! columns described by a [`Schema`], stored row-major as `Vec<Vec<Value>>`.
//! Every row has exactly one [`Value`] per schema field; missing cells are
//! [`Value::Null`].

use chrono::NaiveDateTime;

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
    /// Calendar date-time (no timezone).
    DateTime,
}

impl DataType {
    /// Lowercase type name used in profiles and reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Bool => "bool",
            Self::Utf8 => "utf8",
            Self::DateTime => "datetime",
        }
    }

    /// Whether values of this type can be coerced to `f64` for statistics.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of fields describing the shape of a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single typed value in a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Calendar date-time.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Whether this value is the missing marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of the value, if it has one.
    ///
    /// `Int64` widens to `f64`; all other variants (including `Bool`) are not
    /// treated as numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int64(v) => Some(*v as f64),
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Render the value the way the CSV writer and reports do.
    ///
    /// `Null` renders as the empty string.
    pub fn render(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Int64(v) => v.to_string(),
            Self::Float64(v) => v.to_string(),
            Self::Bool(v) => v.to_string(),
            Self::Utf8(v) => v.clone(),
            Self::DateTime(v) => v.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Hashable identity key used for distinct/duplicate counting.
    ///
    /// Floats are keyed by bit pattern, so `0.0` and `-0.0` differ and equal
    /// NaN payloads collide; both are acceptable for cardinality counts.
    pub fn key(&self) -> ValueKey {
        match self {
            Self::Null => ValueKey::Null,
            Self::Int64(v) => ValueKey::Int64(*v),
            Self::Float64(v) => ValueKey::FloatBits(v.to_bits()),
            Self::Bool(v) => ValueKey::Bool(*v),
            Self::Utf8(v) => ValueKey::Utf8(v.clone()),
            Self::DateTime(v) => ValueKey::DateTime(v.and_utc().timestamp_micros()),
        }
    }
}

/// Owned, hashable identity of a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    /// Missing value.
    Null,
    /// Integer identity.
    Int64(i64),
    /// Float identity by bit pattern.
    FloatBits(u64),
    /// Boolean identity.
    Bool(bool),
    /// String identity.
    Utf8(String),
    /// Date-time identity as microseconds since the Unix epoch.
    DateTime(i64),
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`]
/// fields. All rows have the same length as the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create a table from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.schema.fields.len()
    }

    /// `(rows, columns)` shape tuple.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    /// Look up a column by name, returning its index and field.
    pub fn column(&self, name: &str) -> Option<(usize, &Field)> {
        let idx = self.schema.index_of(name)?;
        self.schema.fields.get(idx).map(|f| (idx, f))
    }

    /// Iterate the values of the column at `idx`, row by row.
    ///
    /// Rows shorter than the schema (which the engine never produces) yield
    /// `Null`.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> {
        self.rows
            .iter()
            .map(move |row| row.get(idx).unwrap_or(&Value::Null))
    }
}
