//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - date selection (`Preset`, `DateRange`)
//! - ad status and the status filter (`AdStatus`, `StatusFilter`)
//! - raw connector rows and their identity key (`RawAdRow`, `AdKey`)

pub mod types;

pub use types::*;
