//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during normalization and derivation
//! - exported to the indicators JSON document
//! - reloaded later for display or comparisons

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single dated observation.
///
/// Serialized compactly (`d`/`v`) because the output document carries the
/// full history of every indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    #[serde(rename = "d")]
    pub date: NaiveDate,
    #[serde(rename = "v")]
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// The common normalized time-series representation.
///
/// Invariants (enforced by [`UniformSeries::from_unsorted`], the only way to
/// build one from raw rows):
///
/// - dates strictly increasing (no duplicates)
/// - all values finite (rows with NaN/inf are dropped, never stored)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniformSeries(Vec<SeriesPoint>);

impl UniformSeries {
    /// Normalize raw rows into a uniform series.
    ///
    /// Drops non-finite values, sorts ascending by date, and deduplicates
    /// dates keeping the last occurrence (later rows win, matching the
    /// "last write" behavior of the upstream sources).
    pub fn from_unsorted(mut rows: Vec<SeriesPoint>) -> Self {
        rows.retain(|p| p.value.is_finite());
        rows.sort_by_key(|p| p.date);

        let mut out: Vec<SeriesPoint> = Vec::with_capacity(rows.len());
        for p in rows {
            match out.last_mut() {
                Some(prev) if prev.date == p.date => *prev = p,
                _ => out.push(p),
            }
        }
        Self(out)
    }

    /// Build from rows already known to satisfy the invariants.
    ///
    /// Used by the derivation engine, whose outputs are constructed in date
    /// order from inputs that already hold the invariants.
    pub(crate) fn from_ordered(rows: Vec<SeriesPoint>) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0].date < w[1].date));
        debug_assert!(rows.iter().all(|p| p.value.is_finite()));
        Self(rows)
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&SeriesPoint> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.0.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SeriesPoint> {
        self.0.iter()
    }
}

/// Ordered threshold rules classifying an indicator's latest value.
///
/// Evaluation order is fixed regardless of which keys are present:
/// `severe_lte`, `warn_lte`, `severe_gte`, `warn_gte` — first match wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TripwireRules {
    pub severe_lte: Option<f64>,
    pub warn_lte: Option<f64>,
    pub severe_gte: Option<f64>,
    pub warn_gte: Option<f64>,
}

/// Health classification of an indicator's latest value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripwireStatus {
    Ok,
    Warn,
    Severe,
    Unknown,
}

impl TripwireStatus {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            TripwireStatus::Ok => "ok",
            TripwireStatus::Warn => "warn",
            TripwireStatus::Severe => "severe",
            TripwireStatus::Unknown => "unknown",
        }
    }
}

/// Derived headline numbers for one indicator.
///
/// All fields are `None` when the series is empty; `yoy_pct` is also `None`
/// when no observation exists at or before one year prior, or the base value
/// is zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub latest_date: Option<NaiveDate>,
    pub latest_value: Option<f64>,
    pub yoy_pct: Option<f64>,
}

/// One entry of the output document: either a fully assembled indicator or
/// the captured error that prevented assembling one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndicatorRecord {
    Full {
        label: String,
        unit: String,
        status: TripwireStatus,
        series: UniformSeries,
        summary: Summary,
        source: String,
    },
    Error {
        error: String,
    },
}

/// The complete run output: run metadata plus one record per configured
/// indicator (full or error, never absent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDocument {
    /// Seconds-precision UTC timestamp, ISO-8601 with trailing `Z`.
    pub generated_utc: String,
    /// Effective observation-start floor applied to every fetch.
    pub start_date: NaiveDate,
    pub indicators: BTreeMap<String, IndicatorRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn from_unsorted_sorts_and_drops_non_finite() {
        let series = UniformSeries::from_unsorted(vec![
            SeriesPoint::new(d("2020-03-01"), 3.0),
            SeriesPoint::new(d("2020-01-01"), f64::NAN),
            SeriesPoint::new(d("2020-02-01"), 2.0),
            SeriesPoint::new(d("2020-01-15"), f64::INFINITY),
            SeriesPoint::new(d("2020-01-01"), 1.0),
        ]);

        let dates: Vec<_> = series.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d("2020-01-01"), d("2020-02-01"), d("2020-03-01")]);
        assert!(series.iter().all(|p| p.value.is_finite()));
    }

    #[test]
    fn from_unsorted_dedups_keeping_last() {
        let series = UniformSeries::from_unsorted(vec![
            SeriesPoint::new(d("2020-01-01"), 1.0),
            SeriesPoint::new(d("2020-01-01"), 9.0),
        ]);
        assert_eq!(series.len(), 1);
        assert_eq!(series.last().unwrap().value, 9.0);
    }

    #[test]
    fn record_serializes_compact_points() {
        let series = UniformSeries::from_unsorted(vec![SeriesPoint::new(d("2020-01-01"), 1.5)]);
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"[{"d":"2020-01-01","v":1.5}]"#);
    }

    #[test]
    fn error_record_round_trips() {
        let rec = IndicatorRecord::Error {
            error: "boom".to_string(),
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(json, r#"{"error":"boom"}"#);
        let back: IndicatorRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }
}
