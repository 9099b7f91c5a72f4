//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads configuration and sets up logging
//! - fetches and aggregates ad rows
//! - prints reports or launches the dashboard
//! - writes optional exports

use chrono::Utc;
use clap::Parser;
use tracing::info;

use crate::cli::{Command, RangeArgs, ReportArgs};
use crate::config::Config;
use crate::domain::{DateRange, Preset};
use crate::error::AppError;
use crate::logging::LogTarget;
use crate::range::{parse_timezone, resolve_range, resolve_range_token};

pub mod pipeline;
pub mod session;

use pipeline::ReportConfig;

/// Entry point for the `curveez` binary.
pub fn run() -> Result<(), AppError> {
    // `curveez` and `curveez -p last_7d` behave like `curveez tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => {
            crate::logging::init(LogTarget::Stderr);
            handle_report(args)
        }
        Command::Range(args) => {
            crate::logging::init(LogTarget::Stderr);
            handle_range(args)
        }
        Command::Tui(args) => {
            crate::logging::init(LogTarget::from_env_file());
            handle_tui(args)
        }
    }
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = Config::from_env()?;
    let report = report_config_from_args(&args)?;
    info!(preset = %report.preset, status = report.status.label(), "running report");

    let run = pipeline::run_report(&config, &report)?;

    println!("{}", crate::report::format_summary(&run, &report));
    println!("{}", crate::report::format_ads(run.session.groups(), report.top_n));

    if let Some(path) = &report.export {
        crate::io::export::write_ads_csv(path, run.session.groups())?;
        info!(path = %path.display(), "exported ads");
    }

    Ok(())
}

fn handle_range(args: RangeArgs) -> Result<(), AppError> {
    let config = Config::from_env()?;
    let tz = match &args.timezone {
        Some(name) => parse_timezone(name)?,
        None => config.timezone,
    };
    let now = Utc::now();

    let ranges: Vec<(Preset, DateRange)> = if args.all {
        Preset::ALL
            .into_iter()
            .map(|p| (p, resolve_range(p, tz, now)))
            .collect()
    } else {
        let preset = Preset::from_token_or_default(&args.preset);
        vec![(preset, resolve_range_token(&args.preset, tz, now))]
    };

    if args.json {
        println!("{}", crate::report::format_ranges_json(&ranges, tz)?);
    } else {
        println!("{}", crate::report::format_ranges(&ranges, tz));
    }
    Ok(())
}

fn handle_tui(args: ReportArgs) -> Result<(), AppError> {
    let config = Config::from_env()?;
    let report = report_config_from_args(&args)?;
    crate::tui::run(config, report)
}

pub fn report_config_from_args(args: &ReportArgs) -> Result<ReportConfig, AppError> {
    let timezone = args.timezone.as_deref().map(parse_timezone).transpose()?;

    // An explicit preset wins over a custom range.
    let custom = match (args.preset, args.from, args.to) {
        (None, Some(from), Some(to)) => {
            if from > to {
                return Err(AppError::config(format!("--from {from} is after --to {to}.")));
            }
            Some(DateRange::new(from, to))
        }
        _ => None,
    };

    Ok(ReportConfig {
        preset: args.preset.unwrap_or(Preset::DEFAULT),
        custom,
        status: args.status,
        account: args.account.clone(),
        source: args.source.clone(),
        timezone,
        top_n: args.top,
        export: args.export.clone(),
    })
}

/// Rewrite argv so `curveez` defaults to `curveez tui`.
///
/// Rules:
/// - `curveez`                      -> `curveez tui`
/// - `curveez -p last_7d ...`       -> `curveez tui -p last_7d ...`
/// - `curveez --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "range" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
