//! Time-series trend analysis.
//!
//! Rows are coerced (dates parsed, values made numeric, failures dropped),
//! sorted ascending, bucketed into calendar periods, and aggregated per
//! period. Growth statistics are computed when at least 3 periods exist and
//! a recent-trend sub-summary when at least 6 do; below those counts the
//! analyses are omitted, not defaulted.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::error::{EngineError, EngineResult};
use crate::ingestion::csv::parse_datetime_text;
use crate::types::{Table, Value};

use super::{mean, sample_std};

const LOW_COMPLETENESS_PCT: f64 = 90.0;
const MIN_PERIODS_FOR_GROWTH: usize = 3;
const RECENT_WINDOW: usize = 6;

/// Period granularity for bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    /// Calendar day.
    Daily,
    /// Calendar month.
    Monthly,
    /// Calendar quarter.
    Quarterly,
    /// Calendar year.
    Yearly,
}

impl Frequency {
    /// Parse the conventional one-letter code (`D`, `M`, `Q`, `Y`).
    pub fn parse(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "D" => Some(Self::Daily),
            "M" => Some(Self::Monthly),
            "Q" => Some(Self::Quarterly),
            "Y" => Some(Self::Yearly),
            _ => None,
        }
    }

    fn bucket(self, date: NaiveDate) -> (i32, u32) {
        match self {
            Self::Daily => (date.year(), date.ordinal()),
            Self::Monthly => (date.year(), date.month()),
            Self::Quarterly => (date.year(), (date.month() - 1) / 3 + 1),
            Self::Yearly => (date.year(), 0),
        }
    }

    fn label(self, date: NaiveDate) -> String {
        match self {
            Self::Daily => date.format("%Y-%m-%d").to_string(),
            Self::Monthly => date.format("%Y-%m").to_string(),
            Self::Quarterly => format!("{}Q{}", date.year(), (date.month() - 1) / 3 + 1),
            Self::Yearly => date.year().to_string(),
        }
    }
}

/// Aggregates for one period bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodStat {
    /// Period label (`2023-01-15`, `2023-01`, `2023Q1`, or `2023`).
    pub label: String,
    /// Sum of values in the period.
    pub sum: f64,
    /// Mean of values in the period.
    pub mean: f64,
    /// Number of values in the period.
    pub count: usize,
}

/// Qualitative trend label over the whole series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    StrongUpward,
    ModerateUpward,
    Stable,
    ModerateDownward,
    StrongDownward,
}

impl TrendDirection {
    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::StrongUpward => "Strong Upward Trend",
            Self::ModerateUpward => "Moderate Upward Trend",
            Self::Stable => "Stable/Flat Trend",
            Self::ModerateDownward => "Moderate Downward Trend",
            Self::StrongDownward => "Strong Downward Trend",
        }
    }

    fn from_overall_growth(pct: f64) -> Self {
        if pct > 10.0 {
            Self::StrongUpward
        } else if pct > 2.0 {
            Self::ModerateUpward
        } else if pct < -10.0 {
            Self::StrongDownward
        } else if pct < -2.0 {
            Self::ModerateDownward
        } else {
            Self::Stable
        }
    }
}

/// Direction of the last-6-periods sub-summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecentDirection {
    Accelerating,
    Stable,
    Declining,
}

/// Growth statistics; present only with at least 3 periods and a non-zero
/// first-period sum.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthAnalysis {
    /// Mean of period-over-period percent changes.
    pub avg_growth_rate_pct: f64,
    /// Percent change from the first to the last period sum.
    pub overall_growth_pct: f64,
    /// Qualitative label derived from `overall_growth_pct`.
    pub direction: TrendDirection,
    /// Label of the period with the highest sum.
    pub peak_period: String,
    /// Label of the period with the lowest sum.
    pub valley_period: String,
}

/// Last-6-periods sub-summary; present only with at least 6 periods.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentTrend {
    /// Percent change over the last 6 period sums.
    pub change_pct: f64,
    /// Accelerating above +5%, declining below −5%, else stable.
    pub direction: RecentDirection,
}

/// Full result of a trend analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeries {
    /// Analyzed date column.
    pub date_column: String,
    /// Analyzed value column.
    pub value_column: String,
    /// Bucketing granularity.
    pub frequency: Frequency,
    /// Ordered period aggregates, ascending by period.
    pub periods: Vec<PeriodStat>,
    /// Sum of all period sums.
    pub total_sum: f64,
    /// Mean of period sums.
    pub mean_of_sums: f64,
    /// Sample standard deviation of period sums.
    pub std_of_sums: f64,
    /// Growth analysis, omitted below 3 periods.
    pub growth: Option<GrowthAnalysis>,
    /// Recent-trend sub-summary, omitted below 6 periods.
    pub recent: Option<RecentTrend>,
    /// Rows surviving coercion as a percentage of original rows, 2 decimals.
    pub completeness_pct: f64,
    /// Set when completeness is below 90%.
    pub low_completeness_warning: bool,
}

fn coerce_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::DateTime(dt) => Some(dt.date()),
        Value::Utf8(s) => parse_datetime_text(s).map(|dt| dt.date()),
        _ => None,
    }
}

fn coerce_value(value: &Value) -> Option<f64> {
    match value {
        Value::Utf8(s) => s.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    }
}

/// Resample `value_column` by `date_column` at the given granularity and
/// compute aggregate and growth statistics.
pub fn analyze_trend(
    table: &Table,
    date_column: &str,
    value_column: &str,
    frequency: Frequency,
) -> EngineResult<TrendSeries> {
    let missing = |name: &str| {
        EngineError::invalid_column(
            name,
            format!(
                "not found; available: {:?}",
                table.schema.field_names().collect::<Vec<_>>()
            ),
        )
    };
    let (date_idx, _) = table.column(date_column).ok_or_else(|| missing(date_column))?;
    let (value_idx, _) = table.column(value_column).ok_or_else(|| missing(value_column))?;

    let original_rows = table.row_count();

    // Coerce dates first, then values, per-row; a row survives only if both
    // coercions succeed.
    let mut dated_rows: Vec<(NaiveDate, &Value)> = Vec::new();
    for row in &table.rows {
        if let Some(date) = coerce_date(&row[date_idx]) {
            dated_rows.push((date, &row[value_idx]));
        }
    }
    if dated_rows.is_empty() {
        return Err(EngineError::NoValidData {
            message: format!("no valid dates in column '{date_column}'"),
        });
    }

    let mut points: Vec<(NaiveDate, f64)> = dated_rows
        .iter()
        .filter_map(|(date, value)| coerce_value(value).map(|v| (*date, v)))
        .collect();
    if points.is_empty() {
        return Err(EngineError::NoValidData {
            message: format!("no valid numeric values in column '{value_column}'"),
        });
    }

    points.sort_by_key(|(date, _)| *date);

    let mut buckets: BTreeMap<(i32, u32), (String, Vec<f64>)> = BTreeMap::new();
    for (date, value) in &points {
        let key = frequency.bucket(*date);
        buckets
            .entry(key)
            .or_insert_with(|| (frequency.label(*date), Vec::new()))
            .1
            .push(*value);
    }

    let periods: Vec<PeriodStat> = buckets
        .into_values()
        .map(|(label, values)| PeriodStat {
            label,
            sum: values.iter().sum(),
            mean: mean(&values),
            count: values.len(),
        })
        .collect();

    let sums: Vec<f64> = periods.iter().map(|p| p.sum).collect();
    let growth = (periods.len() >= MIN_PERIODS_FOR_GROWTH)
        .then(|| growth_analysis(&periods, &sums))
        .flatten();
    let recent = (periods.len() >= RECENT_WINDOW)
        .then(|| recent_trend(&sums))
        .flatten();

    let completeness_pct = if original_rows == 0 {
        100.0
    } else {
        (points.len() as f64 / original_rows as f64 * 10_000.0).round() / 100.0
    };

    Ok(TrendSeries {
        date_column: date_column.to_string(),
        value_column: value_column.to_string(),
        frequency,
        total_sum: sums.iter().sum(),
        mean_of_sums: mean(&sums),
        std_of_sums: sample_std(&sums),
        growth,
        recent,
        completeness_pct,
        low_completeness_warning: completeness_pct < LOW_COMPLETENESS_PCT,
        periods,
    })
}

fn growth_analysis(periods: &[PeriodStat], sums: &[f64]) -> Option<GrowthAnalysis> {
    let first = *sums.first()?;
    let last = *sums.last()?;
    if first == 0.0 {
        // Percent growth from a zero base is undefined; omit rather than
        // report infinity.
        return None;
    }

    let changes: Vec<f64> = sums
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0] * 100.0)
        .collect();
    let overall = (last - first) / first * 100.0;

    let peak = periods
        .iter()
        .max_by(|a, b| a.sum.total_cmp(&b.sum))?
        .label
        .clone();
    let valley = periods
        .iter()
        .min_by(|a, b| a.sum.total_cmp(&b.sum))?
        .label
        .clone();

    Some(GrowthAnalysis {
        avg_growth_rate_pct: mean(&changes),
        overall_growth_pct: overall,
        direction: TrendDirection::from_overall_growth(overall),
        peak_period: peak,
        valley_period: valley,
    })
}

fn recent_trend(sums: &[f64]) -> Option<RecentTrend> {
    let window = &sums[sums.len() - RECENT_WINDOW..];
    let first = *window.first()?;
    let last = *window.last()?;
    if first == 0.0 {
        return None;
    }
    let change_pct = (last - first) / first * 100.0;
    let direction = if change_pct > 5.0 {
        RecentDirection::Accelerating
    } else if change_pct < -5.0 {
        RecentDirection::Declining
    } else {
        RecentDirection::Stable
    };
    Some(RecentTrend { change_pct, direction })
}
