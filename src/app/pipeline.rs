//! Shared "fetch pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! resolve range -> Windsor fetch -> aggregate -> summarize
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::app::session::Session;
use crate::config::Config;
use crate::data::{AdsQuery, DateSelection, WindsorClient};
use crate::domain::{DateRange, Preset, RawAdRow, StatusFilter};
use crate::error::AppError;
use crate::range::resolve_range;

/// Options for one report run, after CLI parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub preset: Preset,
    /// Explicit range; only used when no preset was chosen on the command line.
    pub custom: Option<DateRange>,
    pub status: StatusFilter,
    pub account: Option<String>,
    pub source: Option<String>,
    pub timezone: Option<Tz>,
    pub top_n: usize,
    pub export: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            preset: Preset::DEFAULT,
            custom: None,
            status: StatusFilter::All,
            account: None,
            source: None,
            timezone: None,
            top_n: 20,
            export: None,
        }
    }
}

impl ReportConfig {
    pub fn query(&self) -> AdsQuery {
        let date = match self.custom {
            Some(range) => DateSelection::Custom(range),
            None => DateSelection::Preset(self.preset),
        };
        AdsQuery {
            date,
            account: self.account.clone(),
            timezone: self.timezone,
            source: self.source.clone(),
        }
    }
}

/// All computed outputs of a single report run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Calendar range the rows cover, in the effective timezone.
    pub range: DateRange,
    pub timezone: Tz,
    pub session: Session,
}

/// Fetch rows from Windsor and build the report views.
pub fn run_report(config: &Config, report: &ReportConfig) -> Result<RunOutput, AppError> {
    let client = WindsorClient::new(config.clone())?;
    let now = Utc::now();
    let rows = client.fetch_rows_at(&report.query(), now)?;
    let tz = report.timezone.unwrap_or(config.timezone);
    Ok(build_output(report, tz, now, rows))
}

/// Build the report views from already-fetched rows.
pub fn build_output(report: &ReportConfig, tz: Tz, now: DateTime<Utc>, rows: Vec<RawAdRow>) -> RunOutput {
    let range = report
        .custom
        .unwrap_or_else(|| resolve_range(report.preset, tz, now));

    let mut session = Session::new(report.preset, report.status, tz);
    session.set_rows(report.preset, rows);

    RunOutput {
        range,
        timezone: tz,
        session,
    }
}
