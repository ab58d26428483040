//! Indicator configuration (TOML).
//!
//! The configuration file declares every indicator the run should produce:
//! raw FRED series, derived series (transform descriptors), and external
//! tabular sources. It is loaded once at startup and immutable thereafter.
//!
//! Example:
//!
//! ```toml
//! start_years_back = 10
//!
//! [fred]
//! api_key_env = "FRED_API_KEY"
//!
//! [fred.series.unrate]
//! id = "UNRATE"
//! label = "Unemployment rate"
//! unit = "%"
//! tripwires = { warn_gte = 5.0, severe_gte = 7.0 }
//!
//! [fred.derived.yield_spread]
//! transform = "spread"
//! a_id = "DGS10"
//! b_id = "DGS2"
//! label = "10y-2y Treasury spread"
//! unit = "pp"
//! tripwires = { severe_lte = 0.0 }
//!
//! [externals.shipping]
//! url = "https://example.org/index.csv"
//! column = "composite"
//! label = "Shipping index"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::domain::TripwireRules;
use crate::error::{ErrorKind, PipelineError};

const DEFAULT_API_KEY_ENV: &str = "FRED_API_KEY";
const DEFAULT_YEARS_BACK: u32 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct IndicatorsConfig {
    /// How many years of history to request, counted back from today (UTC).
    #[serde(default = "default_years_back")]
    pub start_years_back: u32,
    #[serde(default)]
    pub fred: FredConfig,
    #[serde(default)]
    pub externals: BTreeMap<String, ExternalSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FredConfig {
    /// Environment variable holding the FRED API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Raw series fetched as-is.
    #[serde(default)]
    pub series: BTreeMap<String, SeriesSpec>,
    /// Series derived from one or two raw series via a named transform.
    #[serde(default)]
    pub derived: BTreeMap<String, DerivedSpec>,
}

impl Default for FredConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            series: BTreeMap::new(),
            derived: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeriesSpec {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub tripwires: TripwireRules,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DerivedSpec {
    /// Transform name: `direct`, `yoy_pct`, or `spread`.
    pub transform: String,
    /// Source series for `direct` / `yoy_pct`.
    pub from_id: Option<String>,
    /// Left side of a `spread`.
    pub a_id: Option<String>,
    /// Right side of a `spread`.
    pub b_id: Option<String>,
    pub label: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub tripwires: TripwireRules,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalSpec {
    pub url: String,
    /// Explicit value-column name; inferred when absent.
    pub column: Option<String>,
    pub label: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub tripwires: TripwireRules,
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_years_back() -> u32 {
    DEFAULT_YEARS_BACK
}

/// Load and parse the indicators configuration file.
pub fn load(path: &Path) -> Result<IndicatorsConfig, PipelineError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        PipelineError::new(
            ErrorKind::Configuration,
            format!("Failed to read config '{}': {e}", path.display()),
        )
    })?;
    toml::from_str(&raw).map_err(|e| {
        PipelineError::new(
            ErrorKind::Configuration,
            format!("Invalid config '{}': {e}", path.display()),
        )
    })
}
