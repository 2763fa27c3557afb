use anyhow::{anyhow, Result};
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

use crate::util::env::env_opt;

/// Output layout for log lines, chosen with `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines with file and line number.
    #[default]
    Full,
    /// One short line per event.
    Compact,
    /// Newline-delimited JSON, including the current span's fields.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" | "text" => Ok(Self::Full),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown LOG_FORMAT '{other}' (expected full, compact or json)"
            )),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Full => "full",
            Self::Compact => "compact",
            Self::Json => "json",
        })
    }
}

/// Install the global subscriber for a binary.
///
/// `default_filter` applies when `RUST_LOG` is unset; `LOG_FORMAT` picks the layout.
pub fn init_tracing(default_filter: &str) -> Result<()> {
    let format = match env_opt("LOG_FORMAT") {
        Some(raw) => raw.parse::<LogFormat>().map_err(|e| anyhow!(e))?,
        None => LogFormat::default(),
    };
    init_tracing_with(default_filter, format)
}

pub fn init_tracing_with(default_filter: &str, format: LogFormat) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match format {
        LogFormat::Full => builder.with_line_number(true).with_file(true).try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };
    installed.map_err(|e| anyhow!("failed to initialize {format} tracing: {e}"))
}
