//! Tracing subscriber setup.
//!
//! The filter comes from `CURVEEZ_LOG` (same syntax as `RUST_LOG`), default
//! `warn`. The dashboard owns the terminal, so in TUI mode logs go to
//! `CURVEEZ_LOG_FILE` when set and are dropped otherwise.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt};

const FILTER_ENV: &str = "CURVEEZ_LOG";
const FILE_ENV: &str = "CURVEEZ_LOG_FILE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    Discard,
}

impl LogTarget {
    /// `File` if `CURVEEZ_LOG_FILE` is set, `Discard` otherwise.
    pub fn from_env_file() -> Self {
        dotenvy::dotenv().ok();
        match std::env::var(FILE_ENV) {
            Ok(path) if !path.trim().is_empty() => LogTarget::File(PathBuf::from(path.trim())),
            _ => LogTarget::Discard,
        }
    }
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(target: LogTarget) {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = fmt().with_env_filter(filter).with_target(false);

    let _ = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).try_init(),
            Err(_) => builder.with_writer(std::io::sink).try_init(),
        },
        LogTarget::Discard => builder.with_writer(std::io::sink).try_init(),
    };
}
