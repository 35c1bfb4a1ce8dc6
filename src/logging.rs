//! Tracing subscriber setup.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::GelrssError;
use crate::Result;

/// HTTP plumbing that only logs at warn and above unless `RUST_LOG` says otherwise.
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls", "mio"];

/// Map a configured level name to a tracing level. Unknown names fall back to info.
fn parse_level(level: &str) -> Level {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Filter directives for a configured level.
fn directives(level: &str) -> String {
    let level = parse_level(level).to_string().to_ascii_lowercase();
    std::iter::once(level)
        .chain(QUIET_TARGETS.iter().map(|target| format!("{target}=warn")))
        .collect::<Vec<_>>()
        .join(",")
}

/// `RUST_LOG` when set and valid, otherwise the configured level.
fn build_filter(level: &str) -> EnvFilter {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(filter) if !filter.trim().is_empty() => {
            EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new(directives(level)))
        }
        _ => EnvFilter::new(directives(level)),
    }
}

/// Install the global subscriber.
///
/// Events always go to stdout; when `config.file` is set they are also
/// appended to that file, whose parent directory is created if needed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let Some(file) = config.file.as_deref() else {
        init_console_only(&config.level);
        return Ok(());
    };

    if let Some(parent) = Path::new(file).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let log_file = Arc::new(File::options().create(true).append(true).open(file)?);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout.and(log_file))
                .with_ansi(false),
        )
        .with(build_filter(&config.level))
        .try_init()
        .map_err(|e| GelrssError::Config(format!("failed to install logger: {e}")))
}

/// Install a stdout-only subscriber. Does nothing if one is already installed.
pub fn init_console_only(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(build_filter(level))
        .try_init();
}
