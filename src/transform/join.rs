//! Nearest-date joining of two uniform series.
//!
//! The spread transform needs values from two series "on the same date", but
//! the sources rarely publish on identical calendars (daily vs weekly,
//! holiday gaps). We join each left-side date to the nearest right-side date
//! within a tolerance window and drop rows with no close-enough partner.

use chrono::NaiveDate;

use crate::domain::{SeriesPoint, UniformSeries};

/// Tolerance window for the spread transform's nearest-date join.
pub const SPREAD_TOLERANCE_DAYS: i64 = 7;

/// Join each point of `a` to the nearest point of `b` within
/// `tolerance_days`. Rows of `a` with no partner are dropped; `b` rows may
/// pair with multiple `a` rows. Output is keyed by `a`'s dates.
pub fn nearest_join(
    a: &UniformSeries,
    b: &UniformSeries,
    tolerance_days: i64,
) -> Vec<(NaiveDate, f64, f64)> {
    let bp = b.points();
    let mut out = Vec::with_capacity(a.len());

    for pa in a.iter() {
        let Some(pb) = nearest(bp, pa.date) else { continue };
        if (pb.date - pa.date).num_days().abs() <= tolerance_days {
            out.push((pa.date, pa.value, pb.value));
        }
    }
    out
}

/// Pairwise spread `a - b` on nearest-joined dates (7-day tolerance).
///
/// Either input being empty yields an empty result, not an error.
pub fn spread(a: &UniformSeries, b: &UniformSeries) -> UniformSeries {
    if a.is_empty() || b.is_empty() {
        return UniformSeries::default();
    }
    let rows = nearest_join(a, b, SPREAD_TOLERANCE_DAYS)
        .into_iter()
        .map(|(date, va, vb)| SeriesPoint::new(date, va - vb))
        .collect();
    UniformSeries::from_ordered(rows)
}

/// Nearest point of a date-sorted slice; earlier wins ties.
fn nearest(points: &[SeriesPoint], date: NaiveDate) -> Option<&SeriesPoint> {
    if points.is_empty() {
        return None;
    }
    let idx = points.partition_point(|p| p.date < date);

    let after = points.get(idx);
    let before = idx.checked_sub(1).and_then(|i| points.get(i));
    match (before, after) {
        (Some(b), Some(a)) => {
            let db = (date - b.date).num_days();
            let da = (a.date - date).num_days();
            if db <= da { Some(b) } else { Some(a) }
        }
        (Some(b), None) => Some(b),
        (None, a) => a,
    }
}
