//! Command-line parsing for the Curveez ad dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetch/aggregation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{Preset, StatusFilter};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "curveez", version, about = "Ad performance dashboard for Windsor.ai data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch ads, print summary metrics and the per-ad table.
    Report(ReportArgs),
    /// Print the calendar range a preset resolves to (no network access).
    Range(RangeArgs),
    /// Launch the interactive dashboard.
    Tui(ReportArgs),
}

/// Options shared by `report` and `tui`.
#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    /// Date preset. Ignored for `report` when `--from`/`--to` are given without it.
    #[arg(short = 'p', long, value_enum)]
    pub preset: Option<Preset>,

    /// Start of a custom range (YYYY-MM-DD). Requires `--to`.
    #[arg(long, value_parser = parse_date, requires = "to")]
    pub from: Option<NaiveDate>,

    /// End of a custom range (YYYY-MM-DD). Requires `--from`.
    #[arg(long, value_parser = parse_date, requires = "from")]
    pub to: Option<NaiveDate>,

    /// Show only ads that are ON or OFF.
    #[arg(short = 's', long, value_enum, default_value_t = StatusFilter::All)]
    pub status: StatusFilter,

    /// Account selector (overrides WINDSOR_ACCOUNT).
    #[arg(long)]
    pub account: Option<String>,

    /// Data source filter, e.g. facebook or google_ads (overrides WINDSOR_SOURCE).
    #[arg(long)]
    pub source: Option<String>,

    /// IANA timezone (overrides WINDSOR_TIMEZONE).
    #[arg(long)]
    pub timezone: Option<String>,

    /// Show at most N ads in the table.
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Export aggregated ads to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

/// Options for `range`.
#[derive(Debug, Args, Clone)]
pub struct RangeArgs {
    /// Preset token; unknown tokens resolve like `this_month`.
    #[arg(default_value = "this_month")]
    pub preset: String,

    /// IANA timezone (overrides WINDSOR_TIMEZONE).
    #[arg(long)]
    pub timezone: Option<String>,

    /// Print every preset instead of one.
    #[arg(long)]
    pub all: bool,

    /// Print JSON instead of a text listing.
    #[arg(long)]
    pub json: bool,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| format!("invalid date '{raw}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_report_flags() {
        let cli = Cli::parse_from([
            "curveez", "report", "-p", "last_7d", "--status", "on", "--top", "5", "--source", "facebook",
        ]);
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.preset, Some(Preset::Last7d));
        assert_eq!(args.status, StatusFilter::On);
        assert_eq!(args.top, 5);
        assert_eq!(args.source.as_deref(), Some("facebook"));
    }

    #[test]
    fn custom_range_needs_both_ends() {
        assert!(Cli::try_parse_from(["curveez", "report", "--from", "2025-01-01"]).is_err());
        let cli = Cli::parse_from(["curveez", "report", "--from", "2025-01-01", "--to", "2025-01-31"]);
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.from, NaiveDate::from_ymd_opt(2025, 1, 1));
    }

    #[test]
    fn rejects_bad_dates_and_presets() {
        assert!(Cli::try_parse_from(["curveez", "report", "--from", "2025-13-01", "--to", "2025-01-31"]).is_err());
        assert!(Cli::try_parse_from(["curveez", "report", "-p", "last_90d"]).is_err());
    }

    #[test]
    fn range_accepts_free_form_token() {
        let cli = Cli::parse_from(["curveez", "range", "whatever", "--timezone", "UTC"]);
        let Command::Range(args) = cli.command else {
            panic!("expected range");
        };
        assert_eq!(args.preset, "whatever");
        assert_eq!(args.timezone.as_deref(), Some("UTC"));
        assert!(!args.json);
    }

    #[test]
    fn range_json_flag() {
        let cli = Cli::parse_from(["curveez", "range", "--all", "--json"]);
        let Command::Range(args) = cli.command else {
            panic!("expected range");
        };
        assert!(args.all);
        assert!(args.json);
        assert_eq!(args.preset, "this_month");
    }
}
