//! The transformation layer.
//!
//! Transformations are a closed, typed set of table-level operations
//! ([`Transformation`]) dispatched through a `match`. Expression text in
//! method-call style (`"fillna(score, 0)"`) is first screened by the
//! [`safety::SafetyPolicy`] deny-list and then parsed into a variant; anything
//! outside the allow-list fails as an execution error. Each operation is a
//! pure function from the current table to a new table.

pub mod ledger;
pub mod safety;
pub mod sandbox;

pub use ledger::{FileLedger, MemoryLedger, RecordOutcome, TransformationLedger, TransformationRecord};
pub use safety::SafetyPolicy;
pub use sandbox::{SandboxOptions, TransformResult, TransformationSandbox};

use std::collections::HashSet;
use std::fmt;

use crate::error::{EngineError, EngineResult};
use crate::ingestion::csv::{coerce_text, parse_datetime_text};
use crate::types::{DataType, Field, Table, Value, ValueKey};

/// Case target for [`Transformation::CaseNormalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    /// Lowercase the column.
    Lower,
    /// Uppercase the column.
    Upper,
}

/// Element-wise function for [`Transformation::ApplyElementwise`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementwiseFn {
    /// Trim surrounding whitespace (text columns).
    Strip,
    /// Lowercase (text columns).
    Lower,
    /// Uppercase (text columns).
    Upper,
    /// Absolute value (numeric columns).
    Abs,
    /// Round to the nearest integer (float columns; integers unchanged).
    Round,
}

impl ElementwiseFn {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "strip" => Some(Self::Strip),
            "lower" => Some(Self::Lower),
            "upper" => Some(Self::Upper),
            "abs" => Some(Self::Abs),
            "round" => Some(Self::Round),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Strip => "strip",
            Self::Lower => "lower",
            Self::Upper => "upper",
            Self::Abs => "abs",
            Self::Round => "round",
        }
    }
}

/// The allow-list of table-level operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Transformation {
    /// Remove duplicate rows, keeping the first occurrence.
    Deduplicate,
    /// Drop rows with a null in `column`, or in any column when `None`.
    DropMissing { column: Option<String> },
    /// Fill nulls in `column` (or every coercible column when `None`) with
    /// `value`, parsed per the target column's type.
    FillMissing { column: Option<String>, value: String },
    /// Rename a column.
    Rename { from: String, to: String },
    /// Drop a column.
    DropColumn { column: String },
    /// Cast a column to a new type; unconvertible values are an error.
    CastType { column: String, to: DataType },
    /// Replace exact values in a column.
    ReplaceValue { column: String, from: String, to: String },
    /// Lower/uppercase a text column.
    CaseNormalize { column: String, mode: CaseMode },
    /// Parse a column as date-times, coercing failures to null.
    ParseDatetime { column: String },
    /// Apply an element-wise function to a column.
    ApplyElementwise { column: String, func: ElementwiseFn },
}

impl Transformation {
    /// Parse a method-call-style expression into a typed operation.
    ///
    /// Accepts an optional `df.` prefix. Arguments may be bare or quoted.
    /// Operations outside the allow-list fail with
    /// [`EngineError::Execution`].
    pub fn parse(expression: &str) -> EngineResult<Self> {
        let trimmed = expression.trim();
        let trimmed = trimmed.strip_prefix("df.").unwrap_or(trimmed);

        let open = trimmed
            .find('(')
            .ok_or_else(|| EngineError::execution(format!("expected 'operation(args)', got '{trimmed}'")))?;
        let name = trimmed[..open].trim();
        let rest = &trimmed[open + 1..];
        let close = rest
            .rfind(')')
            .ok_or_else(|| EngineError::execution(format!("missing closing ')' in '{trimmed}'")))?;
        if !rest[close + 1..].trim().is_empty() {
            return Err(EngineError::execution(format!(
                "unexpected trailing text in '{trimmed}'"
            )));
        }

        let args: Vec<String> = split_args(&rest[..close]);
        Self::from_call(name, &args)
    }

    fn from_call(name: &str, args: &[String]) -> EngineResult<Self> {
        let wrong_arity = |expected: &str| {
            EngineError::execution(format!(
                "{name} expects {expected} argument(s), got {}",
                args.len()
            ))
        };

        match name {
            "drop_duplicates" => match args {
                [] => Ok(Self::Deduplicate),
                _ => Err(wrong_arity("0")),
            },
            "dropna" => match args {
                [] => Ok(Self::DropMissing { column: None }),
                [col] => Ok(Self::DropMissing {
                    column: Some(col.clone()),
                }),
                _ => Err(wrong_arity("0 or 1")),
            },
            "fillna" => match args {
                [value] => Ok(Self::FillMissing {
                    column: None,
                    value: value.clone(),
                }),
                [col, value] => Ok(Self::FillMissing {
                    column: Some(col.clone()),
                    value: value.clone(),
                }),
                _ => Err(wrong_arity("1 or 2")),
            },
            "rename" => match args {
                [from, to] => Ok(Self::Rename {
                    from: from.clone(),
                    to: to.clone(),
                }),
                _ => Err(wrong_arity("2")),
            },
            "drop" => match args {
                [col] => Ok(Self::DropColumn { column: col.clone() }),
                _ => Err(wrong_arity("1")),
            },
            "astype" => match args {
                [col, ty] => Ok(Self::CastType {
                    column: col.clone(),
                    to: parse_type_name(ty)?,
                }),
                _ => Err(wrong_arity("2")),
            },
            "replace" => match args {
                [col, from, to] => Ok(Self::ReplaceValue {
                    column: col.clone(),
                    from: from.clone(),
                    to: to.clone(),
                }),
                _ => Err(wrong_arity("3")),
            },
            "lower" => match args {
                [col] => Ok(Self::CaseNormalize {
                    column: col.clone(),
                    mode: CaseMode::Lower,
                }),
                _ => Err(wrong_arity("1")),
            },
            "upper" => match args {
                [col] => Ok(Self::CaseNormalize {
                    column: col.clone(),
                    mode: CaseMode::Upper,
                }),
                _ => Err(wrong_arity("1")),
            },
            "to_datetime" => match args {
                [col] => Ok(Self::ParseDatetime { column: col.clone() }),
                _ => Err(wrong_arity("1")),
            },
            "apply" => match args {
                [col, func] => Ok(Self::ApplyElementwise {
                    column: col.clone(),
                    func: ElementwiseFn::parse(func).ok_or_else(|| {
                        EngineError::execution(format!(
                            "unknown apply function '{func}' (use strip/lower/upper/abs/round)"
                        ))
                    })?,
                }),
                _ => Err(wrong_arity("2")),
            },
            other => Err(EngineError::execution(format!(
                "operation '{other}' is not in the allow-list"
            ))),
        }
    }

    /// Apply the operation to `table`, producing a new table.
    pub fn apply(&self, table: &Table) -> EngineResult<Table> {
        match self {
            Self::Deduplicate => Ok(deduplicate(table)),
            Self::DropMissing { column } => drop_missing(table, column.as_deref()),
            Self::FillMissing { column, value } => fill_missing(table, column.as_deref(), value),
            Self::Rename { from, to } => rename(table, from, to),
            Self::DropColumn { column } => drop_column(table, column),
            Self::CastType { column, to } => cast_type(table, column, *to),
            Self::ReplaceValue { column, from, to } => replace_value(table, column, from, to),
            Self::CaseNormalize { column, mode } => case_normalize(table, column, *mode),
            Self::ParseDatetime { column } => parse_datetime(table, column),
            Self::ApplyElementwise { column, func } => apply_elementwise(table, column, *func),
        }
    }
}

impl fmt::Display for Transformation {
    /// Canonical text form; parsing it yields this operation back.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deduplicate => write!(f, "drop_duplicates()"),
            Self::DropMissing { column: None } => write!(f, "dropna()"),
            Self::DropMissing { column: Some(c) } => write!(f, "dropna({c})"),
            Self::FillMissing { column: None, value } => write!(f, "fillna({value})"),
            Self::FillMissing {
                column: Some(c),
                value,
            } => write!(f, "fillna({c}, {value})"),
            Self::Rename { from, to } => write!(f, "rename({from}, {to})"),
            Self::DropColumn { column } => write!(f, "drop({column})"),
            Self::CastType { column, to } => write!(f, "astype({column}, {})", to.name()),
            Self::ReplaceValue { column, from, to } => write!(f, "replace({column}, {from}, {to})"),
            Self::CaseNormalize {
                column,
                mode: CaseMode::Lower,
            } => write!(f, "lower({column})"),
            Self::CaseNormalize {
                column,
                mode: CaseMode::Upper,
            } => write!(f, "upper({column})"),
            Self::ParseDatetime { column } => write!(f, "to_datetime({column})"),
            Self::ApplyElementwise { column, func } => write!(f, "apply({column}, {})", func.name()),
        }
    }
}

fn split_args(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|a| unquote(a.trim())).collect()
}

fn unquote(s: &str) -> String {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'\'' && last == b'\'') || (first == b'"' && last == b'"') {
            return s[1..s.len() - 1].to_string();
        }
    }
    s.to_string()
}

fn parse_type_name(name: &str) -> EngineResult<DataType> {
    match name.to_ascii_lowercase().as_str() {
        "int" | "int64" => Ok(DataType::Int64),
        "float" | "float64" => Ok(DataType::Float64),
        "bool" => Ok(DataType::Bool),
        "str" | "utf8" | "string" => Ok(DataType::Utf8),
        "datetime" => Ok(DataType::DateTime),
        other => Err(EngineError::execution(format!(
            "unknown type '{other}' (use int/float/bool/str/datetime)"
        ))),
    }
}

fn require_column<'t>(table: &'t Table, name: &str) -> EngineResult<(usize, &'t Field)> {
    table.column(name).ok_or_else(|| {
        EngineError::invalid_column(
            name,
            format!(
                "not found; available: {:?}",
                table.schema.field_names().collect::<Vec<_>>()
            ),
        )
    })
}

fn deduplicate(table: &Table) -> Table {
    let mut seen: HashSet<Vec<ValueKey>> = HashSet::with_capacity(table.row_count());
    let rows = table
        .rows
        .iter()
        .filter(|row| seen.insert(row.iter().map(Value::key).collect()))
        .cloned()
        .collect();
    Table::new(table.schema.clone(), rows)
}

fn drop_missing(table: &Table, column: Option<&str>) -> EngineResult<Table> {
    let rows = match column {
        Some(name) => {
            let (idx, _) = require_column(table, name)?;
            table
                .rows
                .iter()
                .filter(|row| row.get(idx).is_some_and(|v| !v.is_null()))
                .cloned()
                .collect()
        }
        None => table
            .rows
            .iter()
            .filter(|row| row.iter().all(|v| !v.is_null()))
            .cloned()
            .collect(),
    };
    Ok(Table::new(table.schema.clone(), rows))
}

fn fill_missing(table: &Table, column: Option<&str>, value: &str) -> EngineResult<Table> {
    // Parse the fill text once per target column, in that column's type.
    let mut fills: Vec<Option<Value>> = vec![None; table.column_count()];
    match column {
        Some(name) => {
            let (idx, field) = require_column(table, name)?;
            let fill = coerce_text(value, field.data_type).ok_or_else(|| {
                EngineError::execution(format!(
                    "cannot fill {} column '{}' with '{}'",
                    field.data_type.name(),
                    name,
                    value
                ))
            })?;
            fills[idx] = Some(fill);
        }
        None => {
            for (idx, field) in table.schema.fields.iter().enumerate() {
                fills[idx] = coerce_text(value, field.data_type);
            }
            if fills.iter().all(Option::is_none) {
                return Err(EngineError::execution(format!(
                    "'{value}' does not convert to any column type"
                )));
            }
        }
    }

    let rows = table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(idx, v)| match (v, &fills[idx]) {
                    (Value::Null, Some(fill)) => fill.clone(),
                    _ => v.clone(),
                })
                .collect()
        })
        .collect();
    Ok(Table::new(table.schema.clone(), rows))
}

fn rename(table: &Table, from: &str, to: &str) -> EngineResult<Table> {
    let (idx, _) = require_column(table, from)?;
    if table.schema.index_of(to).is_some() {
        return Err(EngineError::execution(format!(
            "cannot rename '{from}' to '{to}': column already exists"
        )));
    }
    let mut schema = table.schema.clone();
    schema.fields[idx].name = to.to_string();
    Ok(Table::new(schema, table.rows.clone()))
}

fn drop_column(table: &Table, column: &str) -> EngineResult<Table> {
    let (idx, _) = require_column(table, column)?;
    let mut schema = table.schema.clone();
    schema.fields.remove(idx);
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            row.remove(idx);
            row
        })
        .collect();
    Ok(Table::new(schema, rows))
}

fn cast_type(table: &Table, column: &str, to: DataType) -> EngineResult<Table> {
    let (idx, _) = require_column(table, column)?;
    let mut rows = table.rows.clone();
    for (row_idx, row) in rows.iter_mut().enumerate() {
        let cast = cast_value(&row[idx], to).ok_or_else(|| {
            EngineError::execution(format!(
                "cannot cast '{}' (row {}) to {}",
                row[idx].render(),
                row_idx,
                to.name()
            ))
        })?;
        row[idx] = cast;
    }
    let mut schema = table.schema.clone();
    schema.fields[idx].data_type = to;
    Ok(Table::new(schema, rows))
}

fn cast_value(value: &Value, to: DataType) -> Option<Value> {
    match (value, to) {
        (Value::Null, _) => Some(Value::Null),
        (_, DataType::Utf8) => Some(Value::Utf8(value.render())),
        (Value::Int64(v), DataType::Float64) => Some(Value::Float64(*v as f64)),
        (Value::Float64(v), DataType::Int64) if v.is_finite() => Some(Value::Int64(v.trunc() as i64)),
        (Value::Bool(v), DataType::Int64) => Some(Value::Int64(i64::from(*v))),
        (Value::Bool(v), DataType::Float64) => Some(Value::Float64(f64::from(u8::from(*v)))),
        (Value::Int64(v), DataType::Bool) => Some(Value::Bool(*v != 0)),
        (Value::Float64(v), DataType::Bool) => Some(Value::Bool(*v != 0.0)),
        (Value::Utf8(s), _) => coerce_text(s, to),
        (v, to) if const_type(v) == Some(to) => Some(v.clone()),
        _ => None,
    }
}

fn const_type(value: &Value) -> Option<DataType> {
    match value {
        Value::Null => None,
        Value::Int64(_) => Some(DataType::Int64),
        Value::Float64(_) => Some(DataType::Float64),
        Value::Bool(_) => Some(DataType::Bool),
        Value::Utf8(_) => Some(DataType::Utf8),
        Value::DateTime(_) => Some(DataType::DateTime),
    }
}

fn replace_value(table: &Table, column: &str, from: &str, to: &str) -> EngineResult<Table> {
    let (idx, field) = require_column(table, column)?;
    let parse = |text: &str| {
        coerce_text(text, field.data_type).ok_or_else(|| {
            EngineError::execution(format!(
                "'{}' does not convert to {} for column '{}'",
                text,
                field.data_type.name(),
                column
            ))
        })
    };
    let from = parse(from)?;
    let to = parse(to)?;

    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            if row[idx] == from {
                row[idx] = to.clone();
            }
            row
        })
        .collect();
    Ok(Table::new(table.schema.clone(), rows))
}

fn case_normalize(table: &Table, column: &str, mode: CaseMode) -> EngineResult<Table> {
    let (idx, field) = require_column(table, column)?;
    if field.data_type != DataType::Utf8 {
        return Err(EngineError::invalid_column(
            column,
            format!("case normalization needs a text column, got {}", field.data_type.name()),
        ));
    }
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            if let Value::Utf8(s) = &row[idx] {
                row[idx] = Value::Utf8(match mode {
                    CaseMode::Lower => s.to_lowercase(),
                    CaseMode::Upper => s.to_uppercase(),
                });
            }
            row
        })
        .collect();
    Ok(Table::new(table.schema.clone(), rows))
}

fn parse_datetime(table: &Table, column: &str) -> EngineResult<Table> {
    let (idx, _) = require_column(table, column)?;
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            row[idx] = match &row[idx] {
                Value::DateTime(dt) => Value::DateTime(*dt),
                Value::Utf8(s) => parse_datetime_text(s).map(Value::DateTime).unwrap_or(Value::Null),
                _ => Value::Null,
            };
            row
        })
        .collect();
    let mut schema = table.schema.clone();
    schema.fields[idx].data_type = DataType::DateTime;
    Ok(Table::new(schema, rows))
}

fn apply_elementwise(table: &Table, column: &str, func: ElementwiseFn) -> EngineResult<Table> {
    let (idx, field) = require_column(table, column)?;
    let text_op = matches!(
        func,
        ElementwiseFn::Strip | ElementwiseFn::Lower | ElementwiseFn::Upper
    );
    if text_op && field.data_type != DataType::Utf8 {
        return Err(EngineError::invalid_column(
            column,
            format!("'{}' needs a text column, got {}", func.name(), field.data_type.name()),
        ));
    }
    if !text_op && !field.data_type.is_numeric() {
        return Err(EngineError::invalid_column(
            column,
            format!("'{}' needs a numeric column, got {}", func.name(), field.data_type.name()),
        ));
    }

    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            row[idx] = match (&row[idx], func) {
                (Value::Utf8(s), ElementwiseFn::Strip) => Value::Utf8(s.trim().to_string()),
                (Value::Utf8(s), ElementwiseFn::Lower) => Value::Utf8(s.to_lowercase()),
                (Value::Utf8(s), ElementwiseFn::Upper) => Value::Utf8(s.to_uppercase()),
                (Value::Int64(v), ElementwiseFn::Abs) => Value::Int64(v.abs()),
                (Value::Float64(v), ElementwiseFn::Abs) => Value::Float64(v.abs()),
                (Value::Int64(v), ElementwiseFn::Round) => Value::Int64(*v),
                (Value::Float64(v), ElementwiseFn::Round) => Value::Float64(v.round()),
                (v, _) => v.clone(),
            };
            row
        })
        .collect();
    Ok(Table::new(table.schema.clone(), rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Schema;

    fn sample() -> Table {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("name", DataType::Utf8),
            Field::new("score", DataType::Float64),
        ]);
        Table::new(
            schema,
            vec![
                vec![
                    Value::Int64(1),
                    Value::Utf8("Ada".to_string()),
                    Value::Float64(10.0),
                ],
                vec![Value::Int64(2), Value::Utf8("Grace".to_string()), Value::Null],
                vec![
                    Value::Int64(1),
                    Value::Utf8("Ada".to_string()),
                    Value::Float64(10.0),
                ],
            ],
        )
    }

    #[test]
    fn parse_round_trips_display() {
        for expr in [
            "drop_duplicates()",
            "dropna()",
            "dropna(score)",
            "fillna(score, 0)",
            "rename(score, points)",
            "drop(name)",
            "astype(id, float64)",
            "replace(name, Ada, Ada L.)",
            "lower(name)",
            "to_datetime(name)",
            "apply(score, abs)",
        ] {
            let op = Transformation::parse(expr).unwrap();
            assert_eq!(Transformation::parse(&op.to_string()).unwrap(), op);
        }
    }

    #[test]
    fn parse_accepts_df_prefix_and_quotes() {
        let op = Transformation::parse("df.fillna('score', '0')").unwrap();
        assert_eq!(
            op,
            Transformation::FillMissing {
                column: Some("score".to_string()),
                value: "0".to_string()
            }
        );
    }

    #[test]
    fn parse_rejects_unknown_operation() {
        let err = Transformation::parse("pivot(a, b)").unwrap_err();
        assert!(matches!(err, EngineError::Execution { .. }));
    }

    #[test]
    fn deduplicate_keeps_first_and_is_idempotent() {
        let table = sample();
        let once = Transformation::Deduplicate.apply(&table).unwrap();
        assert_eq!(once.row_count(), 2);
        let twice = Transformation::Deduplicate.apply(&once).unwrap();
        assert_eq!(twice.row_count(), 2);
    }

    #[test]
    fn drop_missing_all_and_single_column() {
        let table = sample();
        let all = Transformation::DropMissing { column: None }
            .apply(&table)
            .unwrap();
        assert_eq!(all.row_count(), 2);
        let one = Transformation::DropMissing {
            column: Some("score".to_string()),
        }
        .apply(&table)
        .unwrap();
        assert_eq!(one.row_count(), 2);
    }

    #[test]
    fn fill_missing_respects_column_type() {
        let table = sample();
        let filled = Transformation::parse("fillna(score, 0)")
            .unwrap()
            .apply(&table)
            .unwrap();
        assert_eq!(filled.rows[1][2], Value::Float64(0.0));

        let err = Transformation::parse("fillna(id, not_a_number)")
            .unwrap()
            .apply(&table)
            .unwrap_err();
        assert!(matches!(err, EngineError::Execution { .. }));
    }

    #[test]
    fn rename_refuses_collision() {
        let table = sample();
        let renamed = Transformation::parse("rename(score, points)")
            .unwrap()
            .apply(&table)
            .unwrap();
        assert!(renamed.schema.index_of("points").is_some());

        let err = Transformation::parse("rename(score, id)")
            .unwrap()
            .apply(&table)
            .unwrap_err();
        assert!(matches!(err, EngineError::Execution { .. }));
    }

    #[test]
    fn drop_column_shrinks_every_row() {
        let table = sample();
        let dropped = Transformation::parse("drop(name)")
            .unwrap()
            .apply(&table)
            .unwrap();
        assert_eq!(dropped.shape(), (3, 2));
        assert!(dropped.rows.iter().all(|r| r.len() == 2));
    }

    #[test]
    fn cast_type_is_strict() {
        let table = sample();
        let cast = Transformation::parse("astype(id, float)")
            .unwrap()
            .apply(&table)
            .unwrap();
        assert_eq!(cast.rows[0][0], Value::Float64(1.0));

        let err = Transformation::parse("astype(name, int)")
            .unwrap()
            .apply(&table)
            .unwrap_err();
        assert!(matches!(err, EngineError::Execution { .. }));
    }

    #[test]
    fn cast_preserves_nulls() {
        let table = sample();
        let cast = Transformation::parse("astype(score, str)")
            .unwrap()
            .apply(&table)
            .unwrap();
        assert_eq!(cast.rows[1][2], Value::Null);
        assert_eq!(cast.rows[0][2], Value::Utf8("10".to_string()));
    }

    #[test]
    fn replace_value_matches_typed_equality() {
        let table = sample();
        let replaced = Transformation::parse("replace(id, 1, 99)")
            .unwrap()
            .apply(&table)
            .unwrap();
        assert_eq!(replaced.rows[0][0], Value::Int64(99));
        assert_eq!(replaced.rows[1][0], Value::Int64(2));
    }

    #[test]
    fn case_normalize_requires_text() {
        let table = sample();
        let lowered = Transformation::parse("lower(name)")
            .unwrap()
            .apply(&table)
            .unwrap();
        assert_eq!(lowered.rows[0][1], Value::Utf8("ada".to_string()));

        let err = Transformation::parse("lower(id)").unwrap().apply(&table).unwrap_err();
        assert!(matches!(err, EngineError::InvalidColumn { .. }));
    }

    #[test]
    fn parse_datetime_coerces_failures_to_null() {
        let schema = Schema::new(vec![Field::new("when", DataType::Utf8)]);
        let table = Table::new(
            schema,
            vec![
                vec![Value::Utf8("2023-01-15".to_string())],
                vec![Value::Utf8("not a date".to_string())],
            ],
        );
        let parsed = Transformation::parse("to_datetime(when)")
            .unwrap()
            .apply(&table)
            .unwrap();
        assert_eq!(parsed.schema.fields[0].data_type, DataType::DateTime);
        assert!(matches!(parsed.rows[0][0], Value::DateTime(_)));
        assert_eq!(parsed.rows[1][0], Value::Null);
    }

    #[test]
    fn apply_elementwise_checks_column_kind() {
        let table = sample();
        let err = Transformation::parse("apply(name, abs)")
            .unwrap()
            .apply(&table)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidColumn { .. }));

        let stripped = Transformation::parse("apply(name, strip)")
            .unwrap()
            .apply(&table)
            .unwrap();
        assert_eq!(stripped.rows[0][1], Value::Utf8("Ada".to_string()));
    }
}
