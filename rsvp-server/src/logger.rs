//! Logging setup
//!
//! - `RUST_LOG` filter, falling back to the given default
//! - `LOG_FORMAT=json` for JSON lines
//! - `LOG_DIR` (when the directory exists) for a daily rolling file

use std::path::Path;

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "rsvp_server=info,tower_http=info";
const LOG_FILE_PREFIX: &str = "rsvp-server";

/// Output settings read from the environment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogOptions {
    pub json: bool,
    pub log_dir: Option<String>,
}

impl LogOptions {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            json: lookup("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
            log_dir: lookup("LOG_DIR").filter(|d| !d.trim().is_empty()),
        }
    }
}

/// Initialize the global subscriber from the environment
pub fn init_logger() {
    init_logger_with(DEFAULT_FILTER, &LogOptions::from_env());
}

pub fn init_logger_with(default_filter: &str, options: &LogOptions) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);

    let file_appender = options
        .log_dir
        .as_deref()
        .filter(|dir| Path::new(dir).is_dir())
        .map(|dir| tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX));

    match (options.json, file_appender) {
        (true, Some(appender)) => subscriber.json().with_writer(appender).init(),
        (true, None) => subscriber.json().init(),
        (false, Some(appender)) => subscriber.with_ansi(false).with_writer(appender).init(),
        (false, None) => subscriber.init(),
    }
}
