//! Indicator assembly: packaging a series, its summary, its tripwire status,
//! and provenance into one output record.
//!
//! Display rounding is applied here and only here. Everything upstream
//! (tripwires, YoY base lookup) compares unrounded values; the rounded copy
//! exists purely for the serialized document.

pub mod format;

pub use format::*;

use crate::domain::{IndicatorRecord, SeriesPoint, Summary, TripwireRules, UniformSeries};
use crate::summary::{apply_tripwires, summarize};

/// Decimal places for serialized series point values.
const SERIES_DECIMALS: i32 = 6;
/// Decimal places for the summary's latest value.
const LATEST_DECIMALS: i32 = 4;
/// Decimal places for the summary's YoY percent.
const YOY_DECIMALS: i32 = 2;

/// Assemble one full indicator record.
///
/// Tripwires are evaluated against the unrounded latest value before the
/// rounded copies are produced.
pub fn assemble_indicator(
    label: &str,
    unit: &str,
    series: UniformSeries,
    source: String,
    rules: &TripwireRules,
) -> IndicatorRecord {
    let summary = summarize(&series);
    let status = apply_tripwires(summary.latest_value, rules);

    IndicatorRecord::Full {
        label: label.to_string(),
        unit: unit.to_string(),
        status,
        series: round_series(series),
        summary: round_summary(summary),
        source,
    }
}

fn round_series(series: UniformSeries) -> UniformSeries {
    let rows = series
        .iter()
        .map(|p| SeriesPoint::new(p.date, round_to(p.value, SERIES_DECIMALS)))
        .collect();
    UniformSeries::from_ordered(rows)
}

fn round_summary(summary: Summary) -> Summary {
    Summary {
        latest_date: summary.latest_date,
        latest_value: summary.latest_value.map(|v| round_to(v, LATEST_DECIMALS)),
        yoy_pct: summary.yoy_pct.map(|v| round_to(v, YOY_DECIMALS)),
    }
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (v * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TripwireStatus;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn series(rows: &[(&str, f64)]) -> UniformSeries {
        UniformSeries::from_unsorted(rows.iter().map(|(s, v)| SeriesPoint::new(d(s), *v)).collect())
    }

    #[test]
    fn rounding_is_presentation_only() {
        let s = series(&[("2024-01-01", 3.14159265)]);
        // Unrounded 3.14159265 sits below the threshold; the rounded display
        // value 3.1416 would not. Status must come from the unrounded value.
        let rules = TripwireRules {
            warn_gte: Some(3.1416),
            ..Default::default()
        };
        let rec = assemble_indicator("pi", "", s, "FRED PI".to_string(), &rules);
        let IndicatorRecord::Full { status, summary, .. } = rec else {
            panic!("expected full record");
        };
        assert_eq!(status, TripwireStatus::Ok);
        assert_eq!(summary.latest_value, Some(3.1416));
    }

    #[test]
    fn series_values_rounded_to_six_decimals() {
        let s = series(&[("2024-01-01", 1.23456789)]);
        let rec = assemble_indicator("x", "", s, "src".to_string(), &TripwireRules::default());
        let IndicatorRecord::Full { series, .. } = rec else {
            panic!("expected full record");
        };
        assert_eq!(series.first().unwrap().value, 1.234568);
    }

    #[test]
    fn assembles_summary_and_status_end_to_end() {
        // Matches the fetcher contract: the sentinel row is already dropped.
        let s = series(&[("2023-01-01", 100.0), ("2024-01-01", 120.0)]);
        let rules = TripwireRules {
            warn_gte: Some(110.0),
            ..Default::default()
        };
        let rec = assemble_indicator("demo", "idx", s, "FRED DEMO".to_string(), &rules);
        let IndicatorRecord::Full {
            status,
            summary,
            series,
            source,
            ..
        } = rec
        else {
            panic!("expected full record");
        };
        assert_eq!(series.len(), 2);
        assert_eq!(summary.latest_value, Some(120.0));
        assert_eq!(summary.yoy_pct, Some(20.0));
        assert_eq!(status, TripwireStatus::Warn);
        assert_eq!(source, "FRED DEMO");
    }

    #[test]
    fn empty_series_assembles_unknown_record() {
        let rec = assemble_indicator(
            "empty",
            "",
            UniformSeries::default(),
            "src".to_string(),
            &TripwireRules::default(),
        );
        let IndicatorRecord::Full { status, summary, .. } = rec else {
            panic!("expected full record");
        };
        assert_eq!(status, TripwireStatus::Unknown);
        assert_eq!(summary, Summary::default());
    }
}
