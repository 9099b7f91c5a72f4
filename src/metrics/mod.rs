//! Row aggregation and derived ad metrics.
//!
//! - `aggregate`: merge duplicate rows by ad identity and sum their numbers
//! - `ratios`: spend/purchases/revenue, CPA, ROAS, average order value, status

pub mod aggregate;
pub mod ratios;

pub use aggregate::*;
pub use ratios::*;
