//! `curveez` library crate.
//!
//! The binary (`curveez`) is a thin wrapper around this library so that:
//!
//! - date-range and aggregation logic is testable without spawning processes
//! - the CLI report and the TUI dashboard share one fetch/aggregate pipeline
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod metrics;
pub mod range;
pub mod report;
pub mod tui;
