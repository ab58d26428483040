//! Per-indicator pipeline orchestration.
//!
//! Drives fetch -> derive -> summarize -> assemble for every configured
//! indicator, sequentially. Each indicator runs to completion or failure in
//! isolation: a failure is captured as an error-shaped record under the same
//! key, and never aborts the rest of the run.

use std::collections::BTreeMap;

use chrono::{Months, NaiveDate, Utc};

use crate::config::{DerivedSpec, ExternalSpec, IndicatorsConfig, SeriesSpec};
use crate::data::{self, FredClient};
use crate::domain::{IndicatorRecord, OutputDocument};
use crate::error::PipelineError;
use crate::report::assemble_indicator;
use crate::transform::Transform;

/// Execute the full run with the configured history window.
pub fn run(cfg: &IndicatorsConfig) -> OutputDocument {
    build_document(cfg, start_date_years_back(cfg.start_years_back))
}

/// The observation-start floor: today (UTC) minus `years`.
pub fn start_date_years_back(years: u32) -> NaiveDate {
    let today = Utc::now().date_naive();
    today
        .checked_sub_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(today)
}

/// Build the output document for a fixed start date.
///
/// The FRED client is constructed once; a missing credential surfaces as an
/// error record on every FRED-backed indicator (externals are unaffected).
pub fn build_document(cfg: &IndicatorsConfig, start_date: NaiveDate) -> OutputDocument {
    let client = FredClient::from_env(&cfg.fred.api_key_env);
    let mut indicators = BTreeMap::new();

    for (key, spec) in &cfg.fred.series {
        let record = raw_record(&client, spec, start_date);
        indicators.insert(key.clone(), capture(record));
    }

    for (key, spec) in &cfg.fred.derived {
        let record = derived_record(&client, spec, start_date);
        indicators.insert(key.clone(), capture(record));
    }

    for (key, spec) in &cfg.externals {
        let record = external_record(spec, start_date);
        indicators.insert(key.clone(), capture(record));
    }

    OutputDocument {
        generated_utc: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        start_date,
        indicators,
    }
}

fn raw_record(
    client: &Result<FredClient, PipelineError>,
    spec: &SeriesSpec,
    start_date: NaiveDate,
) -> Result<IndicatorRecord, PipelineError> {
    let client = client.as_ref().map_err(|e| e.clone())?;
    let series = client.fetch_series(&spec.id, start_date)?;
    Ok(assemble_indicator(
        &spec.label,
        &spec.unit,
        series,
        format!("FRED {}", spec.id),
        &spec.tripwires,
    ))
}

fn derived_record(
    client: &Result<FredClient, PipelineError>,
    spec: &DerivedSpec,
    start_date: NaiveDate,
) -> Result<IndicatorRecord, PipelineError> {
    // Resolve the transform before touching the client so an unknown name is
    // reported even when the credential is also missing.
    let transform = Transform::from_spec(spec)?;
    let client = client.as_ref().map_err(|e| e.clone())?;
    let series = transform.apply(client, start_date)?;
    Ok(assemble_indicator(
        &spec.label,
        &spec.unit,
        series,
        transform.source_label(),
        &spec.tripwires,
    ))
}

fn external_record(
    spec: &ExternalSpec,
    start_date: NaiveDate,
) -> Result<IndicatorRecord, PipelineError> {
    let series = data::fetch_external(&spec.url, start_date, spec.column.as_deref())?;
    Ok(assemble_indicator(
        &spec.label,
        &spec.unit,
        series,
        spec.url.clone(),
        &spec.tripwires,
    ))
}

/// Convert a pipeline failure into the error record shape.
fn capture(result: Result<IndicatorRecord, PipelineError>) -> IndicatorRecord {
    result.unwrap_or_else(|e| IndicatorRecord::Error {
        error: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_date_is_years_back() {
        let start = start_date_years_back(10);
        let today = Utc::now().date_naive();
        let diff_days = (today - start).num_days();
        // 10 years, give or take leap days.
        assert!((3650 - 5..=3650 + 5).contains(&diff_days), "got {diff_days}");
    }

    #[test]
    fn failures_become_error_records_without_aborting() {
        // No credential available and an unknown transform: every indicator
        // still gets a record.
        let cfg: IndicatorsConfig = toml::from_str(
            r#"
            [fred]
            api_key_env = "TRIPWIRES_TEST_NO_SUCH_KEY"

            [fred.series.one]
            id = "ONE"
            label = "One"

            [fred.derived.bad]
            transform = "zscore"
            from_id = "ONE"
            label = "Bad"
            "#,
        )
        .unwrap();

        let doc = build_document(&cfg, "2020-01-01".parse().unwrap());
        assert_eq!(doc.indicators.len(), 2);

        let IndicatorRecord::Error { error } = &doc.indicators["one"] else {
            panic!("expected error record");
        };
        assert!(error.contains("TRIPWIRES_TEST_NO_SUCH_KEY"));

        // The unknown transform is reported as such, not as a credential
        // problem: transform resolution happens first.
        let IndicatorRecord::Error { error } = &doc.indicators["bad"] else {
            panic!("expected error record");
        };
        assert!(error.contains("Unknown transform"));
    }
}
