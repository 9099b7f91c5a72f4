//! Shared domain types.
//!
//! Raw rows are kept as loosely-typed JSON objects: the connector returns
//! numbers either as JSON numbers or as numeric strings, and the field set
//! depends on the data source. Typed accessors live on `RawAdRow`.

use std::fmt;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Named shorthand for a calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
pub enum Preset {
    #[serde(rename = "today")]
    #[value(name = "today")]
    Today,
    #[serde(rename = "yesterday")]
    #[value(name = "yesterday", alias = "ayer")]
    Yesterday,
    #[serde(rename = "last_7d")]
    #[value(name = "last_7d")]
    Last7d,
    #[serde(rename = "last_14d")]
    #[value(name = "last_14d")]
    Last14d,
    #[serde(rename = "last_30d")]
    #[value(name = "last_30d")]
    Last30d,
    #[serde(rename = "this_month")]
    #[value(name = "this_month")]
    ThisMonth,
    #[serde(rename = "last_month")]
    #[value(name = "last_month")]
    LastMonth,
    #[serde(rename = "this_year")]
    #[value(name = "this_year")]
    ThisYear,
}

impl Preset {
    /// All presets in display order.
    pub const ALL: [Preset; 8] = [
        Preset::Today,
        Preset::Yesterday,
        Preset::Last7d,
        Preset::Last14d,
        Preset::Last30d,
        Preset::ThisMonth,
        Preset::LastMonth,
        Preset::ThisYear,
    ];

    /// The preset used when nothing (or something unknown) is selected.
    pub const DEFAULT: Preset = Preset::ThisMonth;

    pub fn token(self) -> &'static str {
        match self {
            Preset::Today => "today",
            Preset::Yesterday => "yesterday",
            Preset::Last7d => "last_7d",
            Preset::Last14d => "last_14d",
            Preset::Last30d => "last_30d",
            Preset::ThisMonth => "this_month",
            Preset::LastMonth => "last_month",
            Preset::ThisYear => "this_year",
        }
    }

    /// Human-readable label for terminal output.
    pub fn label(self) -> &'static str {
        match self {
            Preset::Today => "Today",
            Preset::Yesterday => "Yesterday",
            Preset::Last7d => "Last 7 days",
            Preset::Last14d => "Last 14 days",
            Preset::Last30d => "Last 30 days",
            Preset::ThisMonth => "This month",
            Preset::LastMonth => "Last month",
            Preset::ThisYear => "This year",
        }
    }

    /// Parse a preset token. `ayer` is accepted as an alias of `yesterday`.
    pub fn from_token(token: &str) -> Option<Preset> {
        let token = token.trim();
        if token == "ayer" {
            return Some(Preset::Yesterday);
        }
        Preset::ALL.into_iter().find(|p| p.token() == token)
    }

    /// Parse a preset token, falling back to [`Preset::DEFAULT`] for unknown input.
    pub fn from_token_or_default(token: &str) -> Preset {
        Preset::from_token(token).unwrap_or(Preset::DEFAULT)
    }

    pub fn next(self) -> Preset {
        let idx = self.index();
        Preset::ALL[(idx + 1) % Preset::ALL.len()]
    }

    pub fn prev(self) -> Preset {
        let idx = self.index();
        Preset::ALL[(idx + Preset::ALL.len() - 1) % Preset::ALL.len()]
    }

    fn index(self) -> usize {
        Preset::ALL
            .iter()
            .position(|p| *p == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Inclusive range of civil calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Build a range, swapping the ends if they arrive out of order.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        if from <= to {
            Self { from, to }
        } else {
            Self { from: to, to: from }
        }
    }

    pub fn single(day: NaiveDate) -> Self {
        Self { from: day, to: day }
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.from == self.to {
            write!(f, "{}", self.from)
        } else {
            write!(f, "{} → {}", self.from, self.to)
        }
    }
}

/// ON/OFF classification of an ad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdStatus {
    On,
    Off,
}

impl AdStatus {
    pub fn label(self) -> &'static str {
        match self {
            AdStatus::On => "ON",
            AdStatus::Off => "OFF",
        }
    }
}

/// Which ads to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StatusFilter {
    #[default]
    All,
    On,
    Off,
}

impl StatusFilter {
    pub fn matches(self, status: AdStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::On => status == AdStatus::On,
            StatusFilter::Off => status == AdStatus::Off,
        }
    }

    pub fn next(self) -> StatusFilter {
        match self {
            StatusFilter::All => StatusFilter::On,
            StatusFilter::On => StatusFilter::Off,
            StatusFilter::Off => StatusFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::On => "ON",
            StatusFilter::Off => "OFF",
        }
    }
}

/// One record as returned by the connector.
///
/// Unknown fields are preserved so they survive aggregation and export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawAdRow {
    fields: Map<String, Value>,
}

impl RawAdRow {
    /// Wrap a JSON value; returns `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Read a field as text. Numbers and booleans are stringified; `null` is absent.
    pub fn text(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Read a field as a finite float. Numeric strings are parsed leniently.
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.fields.get(name)? {
            Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
            Value::String(s) => parse_number(s),
            _ => None,
        }
    }

    /// Store a float. Non-finite values are ignored.
    pub fn set_number(&mut self, name: &str, value: f64) {
        if let Some(n) = Number::from_f64(value) {
            self.fields.insert(name.to_string(), Value::Number(n));
        }
    }

    pub fn ad_id(&self) -> Option<String> {
        self.text("ad_id")
    }

    pub fn ad_name(&self) -> Option<String> {
        self.text("ad_name")
    }

    pub fn campaign(&self) -> Option<String> {
        self.text("campaign")
    }

    pub fn campaign_id(&self) -> Option<String> {
        self.text("campaign_id")
    }

    pub fn adset_id(&self) -> Option<String> {
        self.text("adset_id")
    }

    pub fn status(&self) -> Option<String> {
        self.text("status")
    }

    pub fn thumbnail_url(&self) -> Option<String> {
        self.text("thumbnail_url")
    }
}

/// Parse a numeric string the way spreadsheet-style exports need it:
/// surrounding whitespace and trailing units (`"1.5%"`) are tolerated.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(v) = trimmed.parse::<f64>() {
        return v.is_finite().then_some(v);
    }
    let prefix: String = trimmed
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        .collect();
    // Trim back until the prefix parses ("12e" -> "12").
    let mut end = prefix.len();
    while end > 0 {
        if let Ok(v) = prefix[..end].parse::<f64>() {
            return v.is_finite().then_some(v);
        }
        end -= 1;
    }
    None
}

/// Identity of a logical ad: rows sharing a key are merged by aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AdKey {
    pub ad_id: String,
    pub ad_name: String,
    pub campaign_id: String,
    pub adset_id: String,
}

impl AdKey {
    pub fn of(row: &RawAdRow) -> Self {
        Self {
            ad_id: row.ad_id().unwrap_or_default(),
            ad_name: row.ad_name().unwrap_or_default(),
            campaign_id: row.campaign_id().unwrap_or_default(),
            adset_id: row.adset_id().unwrap_or_default(),
        }
    }
}

impl fmt::Display for AdKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            self.ad_id, self.ad_name, self.campaign_id, self.adset_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preset_tokens_round_trip_and_alias() {
        for p in Preset::ALL {
            assert_eq!(Preset::from_token(p.token()), Some(p));
        }
        assert_eq!(Preset::from_token("ayer"), Some(Preset::Yesterday));
        assert_eq!(Preset::from_token(" last_7d "), Some(Preset::Last7d));
        assert_eq!(Preset::from_token("last_90d"), None);
        assert_eq!(Preset::from_token_or_default("bogus"), Preset::ThisMonth);
    }

    #[test]
    fn preset_cycling_wraps() {
        assert_eq!(Preset::ThisYear.next(), Preset::Today);
        assert_eq!(Preset::Today.prev(), Preset::ThisYear);
        assert_eq!(Preset::Last7d.next().prev(), Preset::Last7d);
    }

    #[test]
    fn date_range_orders_ends_and_counts_days() {
        let a = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let b = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let r = DateRange::new(a, b);
        assert_eq!(r.from, b);
        assert_eq!(r.to, a);
        assert_eq!(r.days(), 10);
        assert_eq!(DateRange::single(a).days(), 1);
    }

    #[test]
    fn status_filter_matches() {
        assert!(StatusFilter::All.matches(AdStatus::Off));
        assert!(StatusFilter::On.matches(AdStatus::On));
        assert!(!StatusFilter::On.matches(AdStatus::Off));
        assert!(StatusFilter::Off.matches(AdStatus::Off));
        assert_eq!(StatusFilter::Off.next(), StatusFilter::All);
    }

    #[test]
    fn raw_row_reads_numbers_from_strings_and_numbers() {
        let row = RawAdRow::from_value(json!({
            "ad_id": 123,
            "totalcost": "10.5",
            "clicks": 7,
            "ctr": "1.25%",
            "status": null,
            "bad": "n/a",
            "weird": "NaN",
        }))
        .unwrap();

        assert_eq!(row.ad_id().as_deref(), Some("123"));
        assert_eq!(row.number("totalcost"), Some(10.5));
        assert_eq!(row.number("clicks"), Some(7.0));
        assert_eq!(row.number("ctr"), Some(1.25));
        assert_eq!(row.status(), None);
        assert_eq!(row.number("bad"), None);
        assert_eq!(row.number("weird"), None);
        assert_eq!(row.number("missing"), None);
    }

    #[test]
    fn from_value_rejects_non_objects() {
        assert!(RawAdRow::from_value(json!([1, 2])).is_none());
        assert!(RawAdRow::from_value(json!("x")).is_none());
    }

    #[test]
    fn ad_key_uses_empty_for_missing_parts() {
        let row = RawAdRow::from_value(json!({"ad_id": "1", "ad_name": "A"})).unwrap();
        let key = AdKey::of(&row);
        assert_eq!(key.to_string(), "1_A__");
    }
}
