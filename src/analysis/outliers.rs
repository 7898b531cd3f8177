//! Per-column outlier detection.
//!
//! Two independent methods over the non-null values of a numeric column:
//!
//! - **z-score**: flag values with `|v − mean| / stddev > 3`, using the
//!   sample standard deviation. A zero stddev flags nothing.
//! - **IQR**: flag values outside `[Q1 − 1.5·IQR, Q3 + 1.5·IQR]` with
//!   linear-interpolated quartiles.

use crate::error::{EngineError, EngineResult};
use crate::types::Table;

use super::{mean, percentile, sample_std};

const ZSCORE_THRESHOLD: f64 = 3.0;
const IQR_FENCE: f64 = 1.5;
const SAMPLE_FULL_LIMIT: usize = 10;
const SAMPLE_HEAD: usize = 5;

/// Which detection method(s) to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlierMethod {
    /// Z-score only.
    ZScore,
    /// IQR only.
    Iqr,
    /// Both methods, independently.
    Both,
}

impl OutlierMethod {
    /// Parse a method name (`zscore`, `iqr`, `both`), case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "zscore" | "z-score" => Some(Self::ZScore),
            "iqr" => Some(Self::Iqr),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

/// Threshold/bounds a method used to flag values.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodBounds {
    /// Z-score parameters.
    ZScore { mean: f64, stddev: f64, threshold: f64 },
    /// IQR fences.
    Iqr { q1: f64, q3: f64, lower: f64, upper: f64 },
}

/// Result of one method run.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodReport {
    /// Method name (`zscore` or `iqr`).
    pub method: String,
    /// Number of flagged values.
    pub outlier_count: usize,
    /// Flagged values as a percentage of analyzed values, 2 decimals.
    pub outlier_pct: f64,
    /// Threshold or bounds the method used.
    pub bounds: MethodBounds,
    /// Flagged values for inspection: the full list when at most 10 were
    /// flagged, otherwise the first 5 in column order.
    pub sample: Vec<f64>,
}

/// Per-column outlier report.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierReport {
    /// Analyzed column.
    pub column: String,
    /// Non-null values that entered the analysis.
    pub analyzed_count: usize,
    /// One entry per method that ran.
    pub methods: Vec<MethodReport>,
}

/// Detect outliers in a numeric column.
///
/// Fails with [`EngineError::InvalidColumn`] if the column is absent or not
/// numeric, and with [`EngineError::EmptyColumn`] if no non-null values
/// remain.
pub fn detect_outliers(
    table: &Table,
    column: &str,
    method: OutlierMethod,
) -> EngineResult<OutlierReport> {
    let (idx, field) = table.column(column).ok_or_else(|| {
        EngineError::invalid_column(
            column,
            format!(
                "not found; available: {:?}",
                table.schema.field_names().collect::<Vec<_>>()
            ),
        )
    })?;
    if !field.data_type.is_numeric() {
        return Err(EngineError::invalid_column(
            column,
            format!("outlier detection needs a numeric column, got {}", field.data_type.name()),
        ));
    }

    let values: Vec<f64> = table.column_values(idx).filter_map(|v| v.as_f64()).collect();
    if values.is_empty() {
        return Err(EngineError::EmptyColumn {
            column: column.to_string(),
        });
    }

    let mut methods = Vec::new();
    if matches!(method, OutlierMethod::ZScore | OutlierMethod::Both) {
        methods.push(zscore_method(&values));
    }
    if matches!(method, OutlierMethod::Iqr | OutlierMethod::Both) {
        methods.push(iqr_method(&values));
    }

    Ok(OutlierReport {
        column: column.to_string(),
        analyzed_count: values.len(),
        methods,
    })
}

fn zscore_method(values: &[f64]) -> MethodReport {
    let m = mean(values);
    let std = sample_std(values);

    // Zero spread means no value can be three deviations out; flag nothing
    // rather than divide by zero.
    let flagged: Vec<f64> = if std == 0.0 {
        Vec::new()
    } else {
        values
            .iter()
            .copied()
            .filter(|v| ((v - m) / std).abs() > ZSCORE_THRESHOLD)
            .collect()
    };

    finish_method(
        "zscore",
        values.len(),
        flagged,
        MethodBounds::ZScore {
            mean: m,
            stddev: std,
            threshold: ZSCORE_THRESHOLD,
        },
    )
}

fn iqr_method(values: &[f64]) -> MethodReport {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let q1 = percentile(&sorted, 0.25);
    let q3 = percentile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower = q1 - IQR_FENCE * iqr;
    let upper = q3 + IQR_FENCE * iqr;

    let flagged: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| *v < lower || *v > upper)
        .collect();

    finish_method(
        "iqr",
        values.len(),
        flagged,
        MethodBounds::Iqr { q1, q3, lower, upper },
    )
}

fn finish_method(
    name: &str,
    analyzed: usize,
    flagged: Vec<f64>,
    bounds: MethodBounds,
) -> MethodReport {
    let count = flagged.len();
    let pct = (count as f64 / analyzed as f64 * 10_000.0).round() / 100.0;
    let sample = if count <= SAMPLE_FULL_LIMIT {
        flagged
    } else {
        flagged.into_iter().take(SAMPLE_HEAD).collect()
    };
    MethodReport {
        method: name.to_string(),
        outlier_count: count,
        outlier_pct: pct,
        bounds,
        sample,
    }
}
