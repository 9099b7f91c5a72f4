//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and testable
//! - the CLI report and the TUI render numbers identically

use chrono_tz::Tz;
use serde::Serialize;

use crate::app::pipeline::{ReportConfig, RunOutput};
use crate::domain::{DateRange, Preset};
use crate::error::AppError;
use crate::metrics::{AdGroup, AdMetrics, Summary, ad_status};

/// Placeholder for unavailable values.
pub const DASH: &str = "-";

/// `$1,234.56`.
pub fn fmt_money(v: f64) -> String {
    let sign = if v < 0.0 { "-" } else { "" };
    let cents = format!("{:.2}", v.abs());
    let (int, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    format!("{sign}${}.{frac}", group_thousands(int))
}

pub fn fmt_money_opt(v: Option<f64>) -> String {
    v.map(fmt_money).unwrap_or_else(|| DASH.to_string())
}

/// Two-decimal ratio, or a dash.
pub fn fmt_ratio(v: Option<f64>) -> String {
    v.map(|r| format!("{r:.2}")).unwrap_or_else(|| DASH.to_string())
}

/// Counts are usually whole; fractional counts keep up to two decimals.
pub fn fmt_count(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        let s = format!("{:.0}", v.abs());
        let sign = if v < 0.0 { "-" } else { "" };
        format!("{sign}{}", group_thousands(&s))
    } else {
        let s = format!("{v:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// The six summary cards as (label, value) pairs.
pub fn summary_cards(metrics: &AdMetrics) -> [(&'static str, String); 6] {
    [
        ("Spend", fmt_money(metrics.spend)),
        ("Purchases", fmt_count(metrics.purchases)),
        ("CPA", fmt_money_opt(metrics.cpa())),
        ("Revenue", fmt_money(metrics.revenue)),
        ("ROAS", fmt_ratio(metrics.roas())),
        ("Avg order", fmt_money_opt(metrics.average_order_value())),
    ]
}

/// Heading line, e.g. `Last 7 days · 2025-10-13 → 2025-10-19 (America/Buenos_Aires)`.
pub fn range_label(label: &str, range: &DateRange, tz: Tz) -> String {
    format!("{label} · {range} ({})", tz.name())
}

/// Format the run summary: selected period and the summary cards.
pub fn format_summary(run: &RunOutput, report: &ReportConfig) -> String {
    let summary: &Summary = run.session.summary();
    let label = if report.custom.is_some() {
        "Custom range"
    } else {
        report.preset.label()
    };

    let mut out = String::new();
    out.push_str("=== Curveez - Ad Performance ===\n");
    out.push_str(&range_label(label, &run.range, run.timezone));
    out.push('\n');
    out.push_str(&format!(
        "Rows: {} | Ads: {} (ON {} / OFF {}) | Filter: {}\n\n",
        summary.rows,
        summary.ads,
        summary.ads_on,
        summary.ads_off(),
        report.status.label(),
    ));

    for (label, value) in summary_cards(&summary.metrics) {
        out.push_str(&format!("{label:<10} {value:>16}\n"));
    }

    out
}

/// Format the per-ad table (top `top_n` rows).
pub fn format_ads(groups: &[AdGroup], top_n: usize) -> String {
    if groups.is_empty() {
        return "No ads available.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(
        format!(
            "{:<4} {:<28} {:<20} {:>12} {:>9} {:>10} {:>12} {:>6}",
            "", "ad", "campaign", "spend", "purchases", "cpa", "revenue", "roas"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        "{:-<4} {:-<28} {:-<20} {:->12} {:->9} {:->10} {:->12} {:->6}\n",
        "", "", "", "", "", "", "", ""
    ));

    for g in groups.iter().take(top_n) {
        let m = g.metrics();
        let row = format!(
            "{:<4} {:<28} {:<20} {:>12} {:>9} {:>10} {:>12} {:>6}",
            ad_status(&g.row).label(),
            truncate(&g.row.ad_name().unwrap_or_default(), 28),
            truncate(&g.row.campaign().unwrap_or_default(), 20),
            fmt_money(m.spend),
            fmt_count(m.purchases),
            fmt_money_opt(m.cpa()),
            fmt_money(m.revenue),
            fmt_ratio(m.roas()),
        );
        out.push_str(row.trim_end());
        out.push('\n');
    }

    if groups.len() > top_n {
        out.push_str(&format!("… {} more\n", groups.len() - top_n));
    }

    out
}

/// Format resolved preset ranges, one per line.
pub fn format_ranges(ranges: &[(Preset, DateRange)], tz: Tz) -> String {
    let mut out = format!("Timezone: {}\n", tz.name());
    for (preset, range) in ranges {
        out.push_str(&format!(
            "{:<12} {} {} ({} days)\n",
            preset.token(),
            range.from,
            range.to,
            range.days()
        ));
    }
    out
}

#[derive(Serialize)]
struct RangeListing<'a> {
    timezone: &'a str,
    ranges: Vec<RangeEntry>,
}

#[derive(Serialize)]
struct RangeEntry {
    preset: Preset,
    #[serde(flatten)]
    range: DateRange,
    days: i64,
}

/// Resolved preset ranges as pretty-printed JSON, for scripts.
pub fn format_ranges_json(ranges: &[(Preset, DateRange)], tz: Tz) -> Result<String, AppError> {
    let listing = RangeListing {
        timezone: tz.name(),
        ranges: ranges
            .iter()
            .map(|&(preset, range)| RangeEntry {
                preset,
                range,
                days: range.days(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&listing).map_err(|e| AppError::io(format!("Failed to encode ranges as JSON: {e}")))
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawAdRow;
    use crate::metrics::aggregate;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn money_formatting() {
        assert_eq!(fmt_money(0.0), "$0.00");
        assert_eq!(fmt_money(25.0), "$25.00");
        assert_eq!(fmt_money(1234.5), "$1,234.50");
        assert_eq!(fmt_money(1_234_567.891), "$1,234,567.89");
        assert_eq!(fmt_money(-42.1), "-$42.10");
        assert_eq!(fmt_money_opt(None), "-");
    }

    #[test]
    fn ratio_and_count_formatting() {
        assert_eq!(fmt_ratio(Some(4.0)), "4.00");
        assert_eq!(fmt_ratio(None), "-");
        assert_eq!(fmt_count(4.0), "4");
        assert_eq!(fmt_count(12345.0), "12,345");
        assert_eq!(fmt_count(2.5), "2.5");
    }

    #[test]
    fn summary_cards_for_example_row() {
        let cards = summary_cards(&AdMetrics::new(100.0, 4.0, 400.0));
        let values: Vec<&str> = cards.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(values, ["$100.00", "4", "$25.00", "$400.00", "4.00", "$100.00"]);

        let empty = summary_cards(&AdMetrics::default());
        assert_eq!(empty[2].1, "-");
        assert_eq!(empty[4].1, "-");
        assert_eq!(empty[5].1, "-");
    }

    #[test]
    fn ads_table_lists_status_and_truncates() {
        let rows = vec![
            RawAdRow::from_value(json!({
                "ad_id": "1",
                "ad_name": "A very long ad name that will not fit in the column",
                "campaign": "Spring",
                "totalcost": "100",
                "actions_omni_purchase": "4",
                "action_values_omni_purchase": "400",
                "status": "ACTIVE",
            }))
            .unwrap(),
            RawAdRow::from_value(json!({"ad_id": "2", "ad_name": "B"})).unwrap(),
        ];
        let table = format_ads(&aggregate(&rows), 1);
        assert!(table.contains("ON"));
        assert!(table.contains("$25.00"));
        assert!(table.contains("4.00"));
        assert!(table.contains('…'));
        assert!(table.contains("1 more"));
    }

    #[test]
    fn empty_table_message() {
        assert_eq!(format_ads(&[], 10), "No ads available.\n");
    }

    #[test]
    fn ranges_listing() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let out = format_ranges(&[(Preset::Today, DateRange::single(d))], chrono_tz::UTC);
        assert!(out.contains("Timezone: UTC"));
        assert!(out.contains("today        2025-01-01 2025-01-01 (1 days)"));
    }

    #[test]
    fn ranges_as_json() {
        let from = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 9, 30).unwrap();
        let out = format_ranges_json(&[(Preset::LastMonth, DateRange::new(from, to))], chrono_tz::UTC).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            v,
            json!({
                "timezone": "UTC",
                "ranges": [{"preset": "last_month", "from": "2025-09-01", "to": "2025-09-30", "days": 30}],
            })
        );
    }
}
