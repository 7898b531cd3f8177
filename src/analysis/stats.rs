//! Descriptive statistics over the current table.
//!
//! These are the ad-hoc inspection helpers an orchestrating caller issues
//! between transformations: a five-number summary per numeric column, a
//! Pearson correlation matrix, single-level group-by aggregation, and value
//! counts. All ignore nulls.

use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::types::{Table, Value, ValueKey};

use super::{mean, percentile, sample_std};

/// Summary statistics for one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    /// Column name.
    pub name: String,
    /// Non-null values counted.
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Pearson correlation over the numeric columns of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    /// Numeric column names, in schema order.
    pub columns: Vec<String>,
    /// `values[i][j]` is the correlation between `columns[i]` and
    /// `columns[j]`; `NaN` when a pair has no spread or fewer than two
    /// complete rows.
    pub values: Vec<Vec<f64>>,
}

/// Aggregate applied by [`group_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupAgg {
    /// Sum of values per group.
    Sum,
    /// Mean of values per group.
    Mean,
    /// Count of non-null values per group.
    Count,
}

/// Five-number summaries for every numeric column with at least one value.
///
/// Fails with [`EngineError::NoValidData`] when the table has no numeric
/// values at all.
pub fn describe(table: &Table) -> EngineResult<Vec<ColumnSummary>> {
    let mut out = Vec::new();
    for (idx, field) in table.schema.fields.iter().enumerate() {
        if !field.data_type.is_numeric() {
            continue;
        }
        let mut values: Vec<f64> = table.column_values(idx).filter_map(|v| v.as_f64()).collect();
        if values.is_empty() {
            continue;
        }
        values.sort_by(|a, b| a.total_cmp(b));
        out.push(ColumnSummary {
            name: field.name.clone(),
            count: values.len(),
            mean: mean(&values),
            std: sample_std(&values),
            min: values[0],
            q1: percentile(&values, 0.25),
            median: percentile(&values, 0.5),
            q3: percentile(&values, 0.75),
            max: values[values.len() - 1],
        });
    }
    if out.is_empty() {
        return Err(EngineError::NoValidData {
            message: "no numeric columns to describe".to_string(),
        });
    }
    Ok(out)
}

/// Pairwise-complete Pearson correlation over the numeric columns.
pub fn correlation(table: &Table) -> EngineResult<CorrelationMatrix> {
    let numeric: Vec<(usize, String)> = table
        .schema
        .fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.data_type.is_numeric())
        .map(|(idx, f)| (idx, f.name.clone()))
        .collect();
    if numeric.is_empty() {
        return Err(EngineError::NoValidData {
            message: "no numeric columns for correlation".to_string(),
        });
    }

    let n = numeric.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let r = pearson(table, numeric[i].0, numeric[j].0);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: numeric.into_iter().map(|(_, name)| name).collect(),
        values,
    })
}

fn pearson(table: &Table, a: usize, b: usize) -> f64 {
    let pairs: Vec<(f64, f64)> = table
        .rows
        .iter()
        .filter_map(|row| Some((row[a].as_f64()?, row[b].as_f64()?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let xs: Vec<f64> = pairs.iter().map(|(x, _)| *x).collect();
    let ys: Vec<f64> = pairs.iter().map(|(_, y)| *y).collect();
    let (mx, my) = (mean(&xs), mean(&ys));
    let cov: f64 = pairs.iter().map(|(x, y)| (x - mx) * (y - my)).sum();
    let sx: f64 = xs.iter().map(|x| (x - mx).powi(2)).sum::<f64>().sqrt();
    let sy: f64 = ys.iter().map(|y| (y - my).powi(2)).sum::<f64>().sqrt();
    if sx == 0.0 || sy == 0.0 {
        return f64::NAN;
    }
    cov / (sx * sy)
}

/// Group `value_column` by `group_column` and aggregate, sorted descending by
/// the aggregate.
///
/// Null group keys are dropped. `Sum` and `Mean` require a numeric value
/// column; `Count` counts non-null values of any type.
pub fn group_by(
    table: &Table,
    group_column: &str,
    value_column: &str,
    agg: GroupAgg,
) -> EngineResult<Vec<(String, f64)>> {
    let missing = |name: &str| {
        EngineError::invalid_column(
            name,
            format!(
                "not found; available: {:?}",
                table.schema.field_names().collect::<Vec<_>>()
            ),
        )
    };
    let (group_idx, _) = table.column(group_column).ok_or_else(|| missing(group_column))?;
    let (value_idx, value_field) = table.column(value_column).ok_or_else(|| missing(value_column))?;
    if matches!(agg, GroupAgg::Sum | GroupAgg::Mean) && !value_field.data_type.is_numeric() {
        return Err(EngineError::invalid_column(
            value_column,
            format!(
                "sum/mean need a numeric column, got {}",
                value_field.data_type.name()
            ),
        ));
    }

    // Group over value identity; keep the first rendered label per key.
    let mut groups: HashMap<ValueKey, (String, Vec<f64>, usize)> = HashMap::new();
    for row in &table.rows {
        let group_value = &row[group_idx];
        if group_value.is_null() {
            continue;
        }
        let entry = groups
            .entry(group_value.key())
            .or_insert_with(|| (group_value.render(), Vec::new(), 0));
        match &row[value_idx] {
            Value::Null => {}
            v => {
                entry.2 += 1;
                if let Some(num) = v.as_f64() {
                    entry.1.push(num);
                }
            }
        }
    }

    let mut out: Vec<(String, f64)> = groups
        .into_values()
        .map(|(label, nums, non_null)| {
            let stat = match agg {
                GroupAgg::Sum => nums.iter().sum(),
                GroupAgg::Mean => mean(&nums),
                GroupAgg::Count => non_null as f64,
            };
            (label, stat)
        })
        .collect();
    out.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(out)
}

/// Most frequent non-null values of a column, descending by count (ties
/// broken by label), truncated to `top_n`.
pub fn value_counts(table: &Table, column: &str, top_n: usize) -> EngineResult<Vec<(String, usize)>> {
    let (idx, _) = table.column(column).ok_or_else(|| {
        EngineError::invalid_column(
            column,
            format!(
                "not found; available: {:?}",
                table.schema.field_names().collect::<Vec<_>>()
            ),
        )
    })?;

    let mut counts: HashMap<ValueKey, (String, usize)> = HashMap::new();
    for value in table.column_values(idx) {
        if value.is_null() {
            continue;
        }
        let entry = counts
            .entry(value.key())
            .or_insert_with(|| (value.render(), 0));
        entry.1 += 1;
    }

    let mut out: Vec<(String, usize)> = counts.into_values().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out.truncate(top_n);
    Ok(out)
}
