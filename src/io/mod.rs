//! Input/output helpers.
//!
//! - aggregated ad exports (CSV) (`export`)

pub mod export;

pub use export::*;
