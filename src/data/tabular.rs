//! External tabular extraction (CSV or spreadsheet) and normalization.
//!
//! This module turns an arbitrary tabular document of unknown schema into a
//! clean [`UniformSeries`].
//!
//! Design goals:
//! - **One fetch** per source; both parse attempts reuse the same bytes
//! - **Row-level recovery** (drop bad rows, never fail the whole document)
//! - **Deterministic inference**: column detection is a priority-ordered
//!   lookup over header names, exposed as data so it is testable and
//!   overridable — it is a heuristic, not guaranteed-correct schema detection
//! - **Separation of concerns**: no summarization or derivation logic here

use std::io::Cursor;
use std::time::Duration;

use calamine::{Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{SeriesPoint, UniformSeries};
use crate::error::{ErrorKind, PipelineError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Header names recognized as the date axis, in decreasing priority.
///
/// The first name present in the parsed headers wins; if none is present the
/// first column is assumed to be the date axis.
pub const DATE_HEADER_PRIORITY: [&str; 6] = ["date", "Date", "observation_date", "t", "TIME", "Time"];

/// A parsed tabular document, schema unknown, every cell stringified.
///
/// Both parse paths (CSV and spreadsheet) produce this shape so column
/// inference and row normalization are shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Fetch a tabular document from `url` and normalize it.
pub fn fetch_external(
    url: &str,
    start_date: NaiveDate,
    column: Option<&str>,
) -> Result<UniformSeries, PipelineError> {
    let bytes = fetch_bytes(url)?;
    extract_series(&bytes, start_date, column)
}

/// Normalize an already-fetched payload. Idempotent for a given payload and
/// explicit column.
pub fn extract_series(
    bytes: &[u8],
    start_date: NaiveDate,
    column: Option<&str>,
) -> Result<UniformSeries, PipelineError> {
    extract_series_with(bytes, start_date, column, &DATE_HEADER_PRIORITY)
}

/// Like [`extract_series`], with a caller-supplied date-header priority list.
pub fn extract_series_with(
    bytes: &[u8],
    start_date: NaiveDate,
    column: Option<&str>,
    date_priority: &[&str],
) -> Result<UniformSeries, PipelineError> {
    let table = parse_table(bytes)?;
    let date_idx = date_column_by_priority(&table.headers, date_priority).unwrap_or(0);
    let value_idx = infer_value_column(&table, date_idx, column)?;

    let mut rows = Vec::with_capacity(table.rows.len());
    for record in &table.rows {
        let Some(date) = record.get(date_idx).and_then(|s| parse_date(s)) else {
            continue;
        };
        if date < start_date {
            continue;
        }
        let Some(value) = record.get(value_idx).and_then(|s| parse_number(s)) else {
            continue;
        };
        rows.push(SeriesPoint::new(date, value));
    }

    Ok(UniformSeries::from_unsorted(rows))
}

fn fetch_bytes(url: &str) -> Result<Vec<u8>, PipelineError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| {
            PipelineError::new(
                ErrorKind::Configuration,
                format!("Failed to build HTTP client: {e}"),
            )
        })?;

    let resp = client.get(url).send().map_err(|e| {
        PipelineError::new(ErrorKind::Network, format!("Request to '{url}' failed: {e}"))
    })?;

    if !resp.status().is_success() {
        return Err(PipelineError::new(
            ErrorKind::Network,
            format!("Request to '{url}' failed with status {}.", resp.status()),
        ));
    }

    let bytes = resp.bytes().map_err(|e| {
        PipelineError::new(ErrorKind::Network, format!("Failed to read body from '{url}': {e}"))
    })?;
    Ok(bytes.to_vec())
}

/// Parse the payload as CSV first, falling back to a spreadsheet.
fn parse_table(bytes: &[u8]) -> Result<Table, PipelineError> {
    if let Some(table) = parse_csv(bytes) {
        return Ok(table);
    }
    if let Some(table) = parse_spreadsheet(bytes) {
        return Ok(table);
    }
    Err(PipelineError::new(
        ErrorKind::Parse,
        "Payload is neither parseable CSV nor a readable spreadsheet.",
    ))
}

fn parse_csv(bytes: &[u8]) -> Option<Table> {
    // CSV is a text format; binary payloads (xlsx is a zip) go to the
    // spreadsheet path instead of being misread as one giant column.
    let text = std::str::from_utf8(bytes).ok()?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .ok()?
        .iter()
        .map(normalize_header)
        .collect();
    if headers.is_empty() {
        return None;
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.ok()?;
        rows.push(record.iter().map(|s| s.trim().to_string()).collect());
    }

    Some(Table { headers, rows })
}

fn parse_spreadsheet(bytes: &[u8]) -> Option<Table> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = calamine::open_workbook_auto_from_rs(cursor).ok()?;
    let range = workbook.worksheet_range_at(0)?.ok()?;

    let mut iter = range.rows();
    let headers: Vec<String> = iter
        .next()?
        .iter()
        .map(|c| normalize_header(&cell_to_string(c)))
        .collect();
    if headers.is_empty() {
        return None;
    }

    let rows = iter
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Some(Table { headers, rows })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|ndt| ndt.date().to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
    }
}

fn normalize_header(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on
    // the first header (e.g. "\u{feff}date"). If we don't strip it, the date
    // column would silently fail the priority lookup.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

/// Priority-ordered date-column lookup: the first candidate name that exists
/// among the headers wins. Returns `None` when no candidate matches.
pub fn date_column_by_priority(headers: &[String], priority: &[&str]) -> Option<usize> {
    for cand in priority {
        if let Some(idx) = headers.iter().position(|h| h == cand) {
            return Some(idx);
        }
    }
    None
}

/// Resolve the value column: the explicit name when it exists, otherwise the
/// last uniformly-numeric non-date column.
fn infer_value_column(
    table: &Table,
    date_idx: usize,
    explicit: Option<&str>,
) -> Result<usize, PipelineError> {
    if let Some(name) = explicit {
        if let Some(idx) = table.headers.iter().position(|h| h == name) {
            return Ok(idx);
        }
    }

    // Scan from last to first: external exports typically append the series
    // of interest after identifier/metadata columns.
    for idx in (0..table.headers.len()).rev() {
        if idx == date_idx {
            continue;
        }
        if is_numeric_column(&table.rows, idx) {
            return Ok(idx);
        }
    }

    Err(PipelineError::new(
        ErrorKind::NoNumericColumn,
        "No numeric column found in external table.",
    ))
}

/// A column is numeric when every non-empty cell parses as a finite float
/// and at least one cell is non-empty.
fn is_numeric_column(rows: &[Vec<String>], idx: usize) -> bool {
    let mut seen = false;
    for row in rows {
        let Some(cell) = row.get(idx) else { continue };
        if cell.is_empty() {
            continue;
        }
        if parse_number(cell).is_none() {
            return false;
        }
        seen = true;
    }
    seen
}

fn parse_number(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Parse a date cell.
///
/// ISO dates are recommended, but external exports commonly use slashed or
/// day-first forms, and spreadsheet cells may carry a time component. We
/// accept a small fixed set of formats to keep parsing deterministic.
fn parse_date(s: &str) -> Option<NaiveDate> {
    const DATE_FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    const DATETIME_FMTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

    let s = s.trim();
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    const START: &str = "2000-01-01";

    #[test]
    fn csv_with_standard_headers() {
        let csv = b"date,value\n2020-01-01,1.5\n2020-02-01,2.5\n";
        let series = extract_series(csv, d(START), None).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.first().unwrap().value, 1.5);
    }

    #[test]
    fn date_priority_beats_column_position() {
        // "TIME" is first, but "Date" ranks higher in the priority list.
        let csv = b"TIME,Date,value\n9,2020-01-01,1.0\n8,2020-02-01,2.0\n";
        let series = extract_series(csv, d(START), None).unwrap();
        let dates: Vec<_> = series.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d("2020-01-01"), d("2020-02-01")]);
    }

    #[test]
    fn falls_back_to_first_column_without_recognized_header() {
        let csv = b"when,level\n2020-01-01,4.0\n2020-02-01,5.0\n";
        let series = extract_series(csv, d(START), None).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.last().unwrap().value, 5.0);
    }

    #[test]
    fn value_column_scanned_last_to_first() {
        // "notes" (last) is not numeric; "b" should win over "a".
        let csv = b"date,a,b,notes\n2020-01-01,1,10,x\n2020-02-01,2,20,y\n";
        let series = extract_series(csv, d(START), None).unwrap();
        let values: Vec<_> = series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![10.0, 20.0]);
    }

    #[test]
    fn explicit_column_overrides_inference() {
        let csv = b"date,a,b\n2020-01-01,1,10\n2020-02-01,2,20\n";
        let series = extract_series(csv, d(START), Some("a")).unwrap();
        let values: Vec<_> = series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 2.0]);
    }

    #[test]
    fn missing_explicit_column_falls_back_to_inference() {
        let csv = b"date,a\n2020-01-01,1\n";
        let series = extract_series(csv, d(START), Some("nope")).unwrap();
        assert_eq!(series.first().unwrap().value, 1.0);
    }

    #[test]
    fn no_numeric_column_is_an_error() {
        let csv = b"date,name\n2020-01-01,alpha\n2020-02-01,beta\n";
        let err = extract_series(csv, d(START), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoNumericColumn);
    }

    #[test]
    fn bad_dates_dropped_and_start_floor_applied() {
        let csv = b"date,value\ngarbage,1.0\n1999-06-01,2.0\n2020-01-01,3.0\n";
        let series = extract_series(csv, d(START), None).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.first().unwrap().value, 3.0);
    }

    #[test]
    fn numeric_column_tolerates_gaps_but_not_text() {
        let rows = vec![
            vec!["2020-01-01".into(), "".into(), "1.0".into()],
            vec!["2020-02-01".into(), "x".into(), "".into()],
        ];
        assert!(!is_numeric_column(&rows, 1));
        assert!(is_numeric_column(&rows, 2));
        // All-empty column is not numeric.
        let empty = vec![vec!["".into()], vec!["".into()]];
        assert!(!is_numeric_column(&empty, 0));
    }

    #[test]
    fn extraction_is_idempotent_on_same_payload() {
        let csv = b"date,a,b\n2020-02-01,2,20\n2020-01-01,1,10\n";
        let one = extract_series(csv, d(START), Some("b")).unwrap();
        let two = extract_series(csv, d(START), Some("b")).unwrap();
        assert_eq!(one, two);
    }

    #[test]
    fn binary_garbage_is_a_parse_error() {
        let bytes = [0xff, 0xfe, 0x00, 0x13, 0x37, 0x00];
        let err = extract_series(&bytes, d(START), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn bom_on_first_header_is_stripped() {
        let csv = "\u{feff}date,value\n2020-01-01,1.0\n".as_bytes();
        let series = extract_series(csv, d(START), None).unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn datetime_cells_parse_to_dates() {
        assert_eq!(parse_date("2020-01-02T00:00:00"), Some(d("2020-01-02")));
        assert_eq!(parse_date("02/03/2020"), Some(d("2020-03-02")));
        assert_eq!(parse_date("nope"), None);
    }
}
