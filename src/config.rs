//! Process configuration.
//!
//! Read once at startup from the environment (after loading `.env` with
//! `dotenvy`) and passed explicitly to the components that need it.

use chrono_tz::Tz;

use crate::error::AppError;
use crate::range::{DEFAULT_TIMEZONE, parse_timezone};

/// Connector settings.
#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    /// Account selector sent as `select_accounts`.
    pub account: Option<String>,
    pub timezone: Tz,
    /// Data source filter (`facebook`, `google_ads`, ...).
    pub source: Option<String>,
}

impl Config {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// Each setting reads `WINDSOR_<NAME>` first and `REACT_APP_WINDSOR_<NAME>`
    /// second. Values are trimmed; blank means unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            [format!("WINDSOR_{name}"), format!("REACT_APP_WINDSOR_{name}")]
                .iter()
                .filter_map(|key| lookup(key.as_str()))
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        };

        let timezone = match read("TIMEZONE") {
            Some(name) => parse_timezone(&name)?,
            None => parse_timezone(DEFAULT_TIMEZONE)?,
        };

        Ok(Self {
            api_key: read("API_KEY"),
            account: read("ACCOUNT"),
            timezone,
            source: read("SOURCE"),
        })
    }

    /// The API key, or a configuration error explaining how to set it.
    pub fn require_api_key(&self) -> Result<&str, AppError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::config("Missing WINDSOR_API_KEY in environment (.env)."))
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("account", &self.account)
            .field("timezone", &self.timezone)
            .field("source", &self.source)
            .finish()
    }
}
