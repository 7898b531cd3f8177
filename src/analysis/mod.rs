//! Read-only statistical analysis of the current table.
//!
//! Every function here takes a table snapshot and computes an ephemeral
//! report; nothing in this module mutates the store.
//!
//! - [`outliers`]: per-column anomaly detection (z-score and IQR)
//! - [`trend`]: time-bucketed aggregation and growth analysis
//! - [`stats`]: descriptive statistics, correlation, group-by, value counts

pub mod outliers;
pub mod stats;
pub mod trend;

pub use outliers::{detect_outliers, MethodBounds, MethodReport, OutlierMethod, OutlierReport};
pub use stats::{correlation, describe, group_by, value_counts, ColumnSummary, CorrelationMatrix, GroupAgg};
pub use trend::{
    analyze_trend, Frequency, GrowthAnalysis, PeriodStat, RecentDirection, RecentTrend,
    TrendDirection, TrendSeries,
};

/// Arithmetic mean. Zero for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n − 1 denominator). Zero for fewer than two
/// values.
pub(crate) fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Linear-interpolated percentile (`q` in 0..=1) over `sorted` values.
///
/// Matches the conventional `(n − 1) * q` positioning with interpolation
/// between neighbors. Callers must pass a non-empty, ascending slice.
pub(crate) fn percentile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates_linearly() {
        let vals = [1.0, 2.0, 3.0, 4.0, 100.0];
        assert_eq!(percentile(&vals, 0.25), 2.0);
        assert_eq!(percentile(&vals, 0.75), 4.0);
        assert_eq!(percentile(&vals, 0.5), 3.0);
        assert_eq!(percentile(&vals, 0.0), 1.0);
        assert_eq!(percentile(&vals, 1.0), 100.0);
    }

    #[test]
    fn sample_std_uses_n_minus_one() {
        let vals = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let std = sample_std(&vals);
        assert!((std - 2.138).abs() < 1e-3);
        assert_eq!(sample_std(&[5.0]), 0.0);
    }
}
