//! FRED observations API integration.
//!
//! Fetches a single named series as raw `(date, value)` observations and
//! normalizes it into a [`UniformSeries`]. Row-level problems (the `"."`
//! missing-value sentinel, empty cells, unparseable dates) are recovered by
//! dropping the row; only credential and transport problems are errors.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::{SeriesPoint, UniformSeries};
use crate::error::{ErrorKind, PipelineError};

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct FredClient {
    client: Client,
    api_key: String,
}

impl FredClient {
    /// Build a client for the given API key.
    ///
    /// An empty key fails immediately with a configuration error; this is
    /// checked here so no request is ever attempted without a credential.
    pub fn new(api_key: impl Into<String>) -> Result<Self, PipelineError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(PipelineError::new(
                ErrorKind::Configuration,
                "Missing FRED API key (empty credential).",
            ));
        }
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                PipelineError::new(
                    ErrorKind::Configuration,
                    format!("Failed to build HTTP client: {e}"),
                )
            })?;
        Ok(Self { client, api_key })
    }

    /// Build a client from the environment variable named `env_var` (`.env`
    /// files are honored via dotenvy).
    pub fn from_env(env_var: &str) -> Result<Self, PipelineError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var(env_var).map_err(|_| {
            PipelineError::new(
                ErrorKind::Configuration,
                format!("Missing {env_var} in environment (.env)."),
            )
        })?;
        Self::new(api_key)
    }

    /// Fetch all observations of `series_id` at or after `start_date`.
    pub fn fetch_series(
        &self,
        series_id: &str,
        start_date: NaiveDate,
    ) -> Result<UniformSeries, PipelineError> {
        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("series_id", series_id),
                ("api_key", &self.api_key),
                ("file_type", "json"),
                ("observation_start", &start_date.to_string()),
            ])
            .send()
            .map_err(|e| {
                PipelineError::new(ErrorKind::Network, format!("FRED request failed: {e}"))
            })?;

        if !resp.status().is_success() {
            return Err(PipelineError::new(
                ErrorKind::Network,
                format!("FRED request failed with status {}.", resp.status()),
            ));
        }

        let body: ObservationsResponse = resp.json().map_err(|e| {
            PipelineError::new(ErrorKind::Network, format!("Failed to parse FRED response: {e}"))
        })?;

        Ok(normalize_observations(body))
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

/// Turn a raw observations payload into a uniform series.
///
/// Rows with a missing-value sentinel or unparseable date are dropped;
/// ordering and duplicate dates are repaired by the series constructor.
fn normalize_observations(body: ObservationsResponse) -> UniformSeries {
    let mut rows = Vec::with_capacity(body.observations.len());
    for obs in body.observations {
        let Some(value) = parse_value(&obs.value) else {
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d") else {
            continue;
        };
        rows.push(SeriesPoint::new(date, value));
    }
    UniformSeries::from_unsorted(rows)
}

/// Parse a FRED observation value; `"."` is the documented missing sentinel.
fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(date: &str, value: &str) -> Observation {
        Observation {
            date: date.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn empty_credential_is_configuration_error() {
        let err = FredClient::new("   ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn sentinel_and_bad_rows_are_dropped() {
        let body = ObservationsResponse {
            observations: vec![
                obs("2023-01-01", "100"),
                obs("2023-06-01", "."),
                obs("2023-07-01", ""),
                obs("not-a-date", "5"),
                obs("2024-01-01", "120"),
            ],
        };
        let series = normalize_observations(body);
        let values: Vec<_> = series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![100.0, 120.0]);
    }

    #[test]
    fn unordered_and_duplicate_dates_do_not_corrupt_ordering() {
        let body = ObservationsResponse {
            observations: vec![
                obs("2024-01-01", "3"),
                obs("2023-01-01", "1"),
                obs("2023-01-01", "2"),
            ],
        };
        let series = normalize_observations(body);
        let dates: Vec<_> = series.iter().map(|p| p.date.to_string()).collect();
        assert_eq!(dates, vec!["2023-01-01", "2024-01-01"]);
        // Duplicate date keeps the later row.
        assert_eq!(series.first().unwrap().value, 2.0);
    }

    #[test]
    fn parse_value_accepts_finite_numbers_only() {
        assert_eq!(parse_value(" 1.25 "), Some(1.25));
        assert_eq!(parse_value("."), None);
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("inf"), None);
        assert_eq!(parse_value("abc"), None);
    }
}
