//! Input/output helpers.
//!
//! - indicators document read/write (`document`)

pub mod document;

pub use document::*;
