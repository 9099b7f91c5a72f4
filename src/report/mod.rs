//! Reporting utilities: formatted terminal output for summaries and ad tables.

pub mod format;

pub use format::*;
