//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the normalized time series (`UniformSeries`, `SeriesPoint`)
//! - threshold rules and classifications (`TripwireRules`, `TripwireStatus`)
//! - output shapes (`Summary`, `IndicatorRecord`, `OutputDocument`)

pub mod types;

pub use types::*;
