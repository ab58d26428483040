//! Derived-series transforms.
//!
//! A derived indicator names a transform plus the raw series it consumes:
//!
//! - `direct`: passthrough fetch of one series
//! - `yoy_pct`: year-over-year percent change on a monthly grid (`resample`)
//! - `spread`: pairwise difference on nearest-joined dates (`join`)
//!
//! The numeric methods live in `resample`/`join` as standalone functions on
//! `UniformSeries`; this module only resolves descriptors and wires fetches.

pub mod join;
pub mod resample;

pub use join::*;
pub use resample::*;

use chrono::NaiveDate;

use crate::config::DerivedSpec;
use crate::data::FredClient;
use crate::domain::UniformSeries;
use crate::error::{ErrorKind, PipelineError};

/// A resolved transform descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    Direct { from_id: String },
    YoyPct { from_id: String },
    Spread { a_id: String, b_id: String },
}

impl Transform {
    /// Resolve a config descriptor; unrecognized names fail here, before any
    /// fetch is attempted.
    pub fn from_spec(spec: &DerivedSpec) -> Result<Self, PipelineError> {
        match spec.transform.as_str() {
            "direct" => Ok(Self::Direct {
                from_id: require(&spec.from_id, "from_id", "direct")?,
            }),
            "yoy_pct" => Ok(Self::YoyPct {
                from_id: require(&spec.from_id, "from_id", "yoy_pct")?,
            }),
            "spread" => Ok(Self::Spread {
                a_id: require(&spec.a_id, "a_id", "spread")?,
                b_id: require(&spec.b_id, "b_id", "spread")?,
            }),
            other => Err(PipelineError::new(
                ErrorKind::UnknownTransform,
                format!("Unknown transform: {other}"),
            )),
        }
    }

    /// Provenance string recorded in the output document.
    pub fn source_label(&self) -> String {
        match self {
            Transform::Direct { from_id } => format!("FRED {from_id}"),
            Transform::YoyPct { from_id } => format!("FRED {from_id} (YoY%)"),
            Transform::Spread { a_id, b_id } => format!("FRED {a_id} - {b_id}"),
        }
    }

    /// Fetch the required raw series and produce the derived series.
    pub fn apply(
        &self,
        client: &FredClient,
        start_date: NaiveDate,
    ) -> Result<UniformSeries, PipelineError> {
        match self {
            Transform::Direct { from_id } => client.fetch_series(from_id, start_date),
            Transform::YoyPct { from_id } => {
                let raw = client.fetch_series(from_id, start_date)?;
                Ok(resample::yoy_pct(&raw))
            }
            Transform::Spread { a_id, b_id } => {
                let a = client.fetch_series(a_id, start_date)?;
                let b = client.fetch_series(b_id, start_date)?;
                Ok(join::spread(&a, &b))
            }
        }
    }
}

fn require(field: &Option<String>, name: &str, transform: &str) -> Result<String, PipelineError> {
    field.clone().ok_or_else(|| {
        PipelineError::new(
            ErrorKind::Configuration,
            format!("Transform '{transform}' requires `{name}`."),
        )
    })
}
