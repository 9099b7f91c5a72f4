//! Windsor.ai connector integration for ad performance rows.

use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use reqwest::blocking::{Client, Request};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::{DateRange, Preset, RawAdRow};
use crate::error::AppError;
use crate::range::today_in;

const BASE_URL: &str = "https://connectors.windsor.ai/all";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fields requested from the connector.
pub const FIELDS: [&str; 12] = [
    "ad_id",
    "ad_name",
    "campaign",
    "campaign_id",
    "adset_id",
    "totalcost",
    "actions_offsite_conversion_fb_pixel_purchase",
    "action_values_omni_purchase",
    "status",
    "campaign_status",
    "adset_status",
    "thumbnail_url",
];

/// How the requested period is expressed to the connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSelection {
    Preset(Preset),
    Custom(DateRange),
}

impl Default for DateSelection {
    fn default() -> Self {
        DateSelection::Preset(Preset::DEFAULT)
    }
}

/// One fetch request. `None` fields fall back to the client's [`Config`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdsQuery {
    pub date: DateSelection,
    pub account: Option<String>,
    pub timezone: Option<Tz>,
    pub source: Option<String>,
}

pub struct WindsorClient {
    client: Client,
    config: Config,
}

impl WindsorClient {
    /// Build a client. Fails when no API key is configured.
    pub fn new(config: Config) -> Result<Self, AppError> {
        config.require_api_key()?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::api(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Fetch rows for `query`, using the current instant to resolve `today`.
    pub fn fetch_rows(&self, query: &AdsQuery) -> Result<Vec<RawAdRow>, AppError> {
        self.fetch_rows_at(query, Utc::now())
    }

    pub fn fetch_rows_at(&self, query: &AdsQuery, now: DateTime<Utc>) -> Result<Vec<RawAdRow>, AppError> {
        let req = self.build_request(query, now)?;
        debug!(date = ?query.date, "requesting windsor rows");

        let resp = self
            .client
            .execute(req)
            .map_err(|e| AppError::api(format!("Windsor request failed: {e}")))?;

        if !resp.status().is_success() {
            warn!(status = %resp.status(), "windsor request rejected");
            return Err(AppError::api(format!(
                "Windsor request failed with status {}.",
                resp.status()
            )));
        }

        let body: Value = resp
            .json()
            .map_err(|e| AppError::api(format!("Failed to parse Windsor response: {e}")))?;

        let rows = normalize_payload(body);
        info!(rows = rows.len(), "fetched windsor rows");
        Ok(rows)
    }

    /// Build (but do not send) the GET request for `query`.
    pub fn build_request(&self, query: &AdsQuery, now: DateTime<Utc>) -> Result<Request, AppError> {
        let params = self.query_params(query, now)?;
        self.client
            .get(BASE_URL)
            .query(&params)
            .build()
            .map_err(|e| AppError::api(format!("Failed to build Windsor request: {e}")))
    }

    fn query_params(&self, query: &AdsQuery, now: DateTime<Utc>) -> Result<Vec<(&'static str, String)>, AppError> {
        let api_key = self.config.require_api_key()?;
        let tz = query.timezone.unwrap_or(self.config.timezone);

        let mut params = vec![
            ("api_key", api_key.to_string()),
            ("fields", FIELDS.join(",")),
        ];

        match query.date {
            DateSelection::Preset(Preset::Today) => {
                let today = today_in(tz, now).to_string();
                params.push(("date_from", today.clone()));
                params.push(("date_to", today));
            }
            DateSelection::Preset(preset) => {
                params.push(("date_preset", api_preset_token(preset).to_string()));
            }
            DateSelection::Custom(range) => {
                params.push(("date_from", range.from.to_string()));
                params.push(("date_to", range.to.to_string()));
            }
        }

        let account = query.account.as_ref().or(self.config.account.as_ref());
        if let Some(account) = account.filter(|a| !a.trim().is_empty()) {
            params.push(("select_accounts", account.trim().to_string()));
        }
        let source = query.source.as_ref().or(self.config.source.as_ref());
        if let Some(source) = source.filter(|s| !s.trim().is_empty()) {
            params.push(("source", source.trim().to_string()));
        }
        params.push(("timezone", tz.name().to_string()));

        Ok(params)
    }
}

/// The connector's own name for a preset. Only two differ from ours.
pub fn api_preset_token(preset: Preset) -> &'static str {
    match preset {
        Preset::Yesterday => "last_1d",
        Preset::LastMonth => "last_1m",
        other => other.token(),
    }
}

/// Turn a response body into rows.
///
/// The rows live under `data` when present, otherwise the body itself is the
/// list. Anything that is not an array yields no rows; non-object entries
/// are skipped.
pub fn normalize_payload(body: Value) -> Vec<RawAdRow> {
    let payload = match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) if !data.is_null() => data,
            _ => Value::Object(map),
        },
        other => other,
    };

    let Value::Array(items) = payload else {
        debug!("windsor payload is not an array; treating as empty");
        return Vec::new();
    };

    let total = items.len();
    let rows: Vec<RawAdRow> = items.into_iter().filter_map(RawAdRow::from_value).collect();
    if rows.len() != total {
        debug!(skipped = total - rows.len(), "skipped non-object windsor entries");
    }
    rows
}
