//! Remote data sources.
//!
//! - FRED observations API (`fred`)
//! - external CSV/spreadsheet endpoints (`tabular`)
//!
//! Both normalize into the common `UniformSeries` shape; nothing downstream
//! knows which source a series came from.

pub mod fred;
pub mod tabular;

pub use fred::*;
pub use tabular::*;
