//! Time-weighted resampling and the year-over-year transform.
//!
//! Raw observation cadence is irregular (daily, weekly, monthly mixes), so
//! "12 periods ago" is only well-defined after resampling to a fixed grid:
//! interpolate to daily, downsample to calendar month-ends, then difference
//! against the entry 12 months prior.
//!
//! Assumption (deliberate): linear bridging is reasonable when the source
//! cadence is at most a few months. Sparse series (e.g. quarterly) are still
//! bridged linearly, which smooths the derived YoY rather than failing.

use chrono::{Datelike, Months, NaiveDate};

use crate::domain::{SeriesPoint, UniformSeries};

/// Number of monthly periods a year-over-year comparison spans.
const YOY_PERIODS: usize = 12;

/// Expand a series to a daily grid between its first and last dates using
/// time-weighted linear interpolation between observed points.
///
/// Empty input yields an empty grid; a single observation yields itself.
pub fn daily_interpolated(series: &UniformSeries) -> Vec<SeriesPoint> {
    let pts = series.points();
    let (Some(first), Some(last)) = (pts.first(), pts.last()) else {
        return Vec::new();
    };

    let n_days = (last.date - first.date).num_days() as usize + 1;
    let mut out = Vec::with_capacity(n_days);

    let mut seg = 0usize;
    let mut day = first.date;
    loop {
        // Advance to the segment whose start is the latest observation <= day.
        while seg + 1 < pts.len() && pts[seg + 1].date <= day {
            seg += 1;
        }

        let value = if seg + 1 < pts.len() {
            let a = pts[seg];
            let b = pts[seg + 1];
            let span = (b.date - a.date).num_days() as f64;
            let elapsed = (day - a.date).num_days() as f64;
            a.value + (b.value - a.value) * (elapsed / span)
        } else {
            pts[seg].value
        };
        out.push(SeriesPoint::new(day, value));

        if day >= last.date {
            break;
        }
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }

    out
}

/// Downsample a daily grid to one value per calendar month: the last daily
/// value observed in the month, labeled with the calendar month-end date
/// (even when the grid ends mid-month).
pub fn month_end(daily: &[SeriesPoint]) -> Vec<SeriesPoint> {
    let mut out: Vec<SeriesPoint> = Vec::new();
    for p in daily {
        let label = end_of_month(p.date);
        match out.last_mut() {
            Some(prev) if prev.date == label => prev.value = p.value,
            _ => out.push(SeriesPoint::new(label, p.value)),
        }
    }
    out
}

/// Year-over-year percent change on a monthly grid:
/// `100 * (v[t] - v[t-12]) / v[t-12]`.
///
/// The first 12 months have no base and are dropped, as are entries whose
/// base is zero (the division is not representable as a finite percent).
pub fn yoy_pct(series: &UniformSeries) -> UniformSeries {
    let monthly = month_end(&daily_interpolated(series));

    let mut rows = Vec::new();
    for t in YOY_PERIODS..monthly.len() {
        let base = monthly[t - YOY_PERIODS].value;
        let pct = 100.0 * (monthly[t].value - base) / base;
        if pct.is_finite() {
            rows.push(SeriesPoint::new(monthly[t].date, pct));
        }
    }
    UniformSeries::from_ordered(rows)
}

fn end_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}
