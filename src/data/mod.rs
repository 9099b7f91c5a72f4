//! External data sources.
//!
//! - `windsor`: Windsor.ai connector client (ad performance rows)

pub mod windsor;

pub use windsor::{AdsQuery, DateSelection, WindsorClient};
