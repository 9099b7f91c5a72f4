//! Dashboard session state shared by the front-ends.
//!
//! A session holds the rows currently on screen and the views derived from
//! them. Every fetch is issued through [`Session::begin_load`], which hands out
//! a [`LoadTicket`] tagged with a request generation; results are applied with
//! [`Session::finish_load`] only if no newer request has been issued since.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::domain::{DateRange, Preset, RawAdRow, StatusFilter};
use crate::error::AppError;
use crate::metrics::{AdGroup, Summary, aggregate, filter_by_status, sort_by_purchases};
use crate::range::resolve_range;

/// Identifies one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub preset: Preset,
}

/// What happened to a finished fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { rows: usize },
    Failed(String),
    /// A newer request was issued; the result was dropped.
    Stale,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub preset: Preset,
    pub status_filter: StatusFilter,
    pub timezone: Tz,
    pub loading: bool,
    pub last_error: Option<String>,
    rows: Vec<RawAdRow>,
    /// Preset the current `rows` were fetched for.
    loaded_preset: Option<Preset>,
    generation: u64,
    groups: Vec<AdGroup>,
    summary: Summary,
}

impl Session {
    pub fn new(preset: Preset, status_filter: StatusFilter, timezone: Tz) -> Self {
        Self {
            preset,
            status_filter,
            timezone,
            loading: false,
            last_error: None,
            rows: Vec::new(),
            loaded_preset: None,
            generation: 0,
            groups: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Start a fetch for the current preset.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        LoadTicket {
            generation: self.generation,
            preset: self.preset,
        }
    }

    /// Apply (or drop) the result of a fetch.
    ///
    /// Failures keep the previous rows on screen. Either way the loading flag
    /// is cleared once the newest request has answered.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<Vec<RawAdRow>, AppError>) -> LoadOutcome {
        if ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                current = self.generation,
                "dropping stale fetch result"
            );
            return LoadOutcome::Stale;
        }

        self.loading = false;
        match result {
            Ok(rows) => {
                let n = rows.len();
                self.set_rows(ticket.preset, rows);
                self.last_error = None;
                LoadOutcome::Applied { rows: n }
            }
            Err(err) => {
                warn!(error = %err, preset = %ticket.preset, "failed to load ads");
                self.last_error = Some(err.message().to_string());
                LoadOutcome::Failed(err.message().to_string())
            }
        }
    }

    /// Replace the rows and rebuild every derived view.
    pub fn set_rows(&mut self, preset: Preset, rows: Vec<RawAdRow>) {
        self.rows = rows;
        self.loaded_preset = Some(preset);
        self.rebuild();
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.status_filter = filter;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        let all = aggregate(&self.rows);
        self.summary = Summary::from_rows(&self.rows, &all);
        let mut shown = filter_by_status(all, self.status_filter);
        sort_by_purchases(&mut shown);
        self.groups = shown;
    }

    /// Aggregated ads passing the status filter, most purchases first.
    pub fn groups(&self) -> &[AdGroup] {
        &self.groups
    }

    /// Totals over every loaded row (the status filter does not apply).
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn loaded_preset(&self) -> Option<Preset> {
        self.loaded_preset
    }

    /// The calendar range the selected preset covers right now.
    pub fn range_at(&self, now: DateTime<Utc>) -> DateRange {
        resolve_range(self.preset, self.timezone, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(spend: &[&str]) -> Vec<RawAdRow> {
        spend
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let status = if i % 2 == 0 { "ACTIVE" } else { "PAUSED" };
                RawAdRow::from_value(json!({
                    "ad_id": i.to_string(),
                    "ad_name": format!("ad {i}"),
                    "totalcost": s,
                    "status": status,
                }))
                .unwrap()
            })
            .collect()
    }

    fn session() -> Session {
        Session::new(Preset::Last7d, StatusFilter::All, chrono_tz::America::Buenos_Aires)
    }

    #[test]
    fn applies_latest_result() {
        let mut s = session();
        let t = s.begin_load();
        assert!(s.loading);
        let outcome = s.finish_load(t, Ok(rows(&["10", "20"])));
        assert_eq!(outcome, LoadOutcome::Applied { rows: 2 });
        assert!(!s.loading);
        assert_eq!(s.summary().metrics.spend, 30.0);
        assert_eq!(s.loaded_preset(), Some(Preset::Last7d));
    }

    #[test]
    fn stale_results_are_dropped() {
        let mut s = session();
        let old = s.begin_load();
        s.preset = Preset::ThisMonth;
        let new = s.begin_load();

        assert_eq!(s.finish_load(new, Ok(rows(&["5"]))), LoadOutcome::Applied { rows: 1 });
        assert_eq!(s.finish_load(old, Ok(rows(&["100", "100"]))), LoadOutcome::Stale);
        assert_eq!(s.summary().rows, 1);
        assert_eq!(s.loaded_preset(), Some(Preset::ThisMonth));
    }

    #[test]
    fn stale_result_does_not_clear_loading() {
        let mut s = session();
        let old = s.begin_load();
        let _new = s.begin_load();
        assert_eq!(s.finish_load(old, Ok(Vec::new())), LoadOutcome::Stale);
        assert!(s.loading);
    }

    #[test]
    fn failure_keeps_previous_rows() {
        let mut s = session();
        let t = s.begin_load();
        s.finish_load(t, Ok(rows(&["10"])));

        let t = s.begin_load();
        let outcome = s.finish_load(t, Err(AppError::api("boom")));
        assert_eq!(outcome, LoadOutcome::Failed("boom".to_string()));
        assert!(!s.loading);
        assert_eq!(s.summary().rows, 1);
        assert_eq!(s.last_error.as_deref(), Some("boom"));
    }

    #[test]
    fn status_filter_narrows_groups_but_not_summary() {
        let mut s = session();
        s.set_rows(Preset::Last7d, rows(&["1", "2", "3"]));
        s.set_status_filter(StatusFilter::On);
        assert_eq!(s.groups().len(), 2);
        assert_eq!(s.summary().metrics.spend, 6.0);
        s.set_status_filter(StatusFilter::Off);
        assert_eq!(s.groups().len(), 1);
    }
}
