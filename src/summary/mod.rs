//! Series summarization and tripwire evaluation.
//!
//! Both operate on the unrounded series; display rounding happens later, at
//! assembly time, so thresholds and the YoY base lookup never see rounded
//! values.

use chrono::Months;

use crate::domain::{Summary, TripwireRules, TripwireStatus, UniformSeries};

/// Compute the headline numbers for a series.
///
/// `yoy_pct` compares the latest value to the last observation at or before
/// one year prior: `100 * (latest - base) / |base|`. It is `None` when no
/// such observation exists or the base is zero.
pub fn summarize(series: &UniformSeries) -> Summary {
    let Some(latest) = series.last() else {
        return Summary::default();
    };

    let yoy_pct = latest
        .date
        .checked_sub_months(Months::new(12))
        .and_then(|cutoff| {
            let base = series.iter().rev().find(|p| p.date <= cutoff)?;
            if base.value == 0.0 {
                return None;
            }
            Some(100.0 * (latest.value - base.value) / base.value.abs())
        });

    Summary {
        latest_date: Some(latest.date),
        latest_value: Some(latest.value),
        yoy_pct,
    }
}

/// Classify a latest value against threshold rules.
///
/// Evaluation order is fixed regardless of which thresholds are configured:
/// `severe_lte`, `warn_lte`, `severe_gte`, `warn_gte` — first match wins.
/// No latest value means `Unknown`; no matching threshold means `Ok`.
pub fn apply_tripwires(latest_value: Option<f64>, rules: &TripwireRules) -> TripwireStatus {
    let Some(v) = latest_value.filter(|v| v.is_finite()) else {
        return TripwireStatus::Unknown;
    };

    if rules.severe_lte.is_some_and(|t| v <= t) {
        return TripwireStatus::Severe;
    }
    if rules.warn_lte.is_some_and(|t| v <= t) {
        return TripwireStatus::Warn;
    }
    if rules.severe_gte.is_some_and(|t| v >= t) {
        return TripwireStatus::Severe;
    }
    if rules.warn_gte.is_some_and(|t| v >= t) {
        return TripwireStatus::Warn;
    }
    TripwireStatus::Ok
}
