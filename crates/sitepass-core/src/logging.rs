//! tracing subscriber setup shared by the CLI and the TUI.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogConfig, LogFormat};
use crate::error::{SitepassError, SitepassResult};

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// stderr, unless `log.file` is set
    Stderr,
    /// `log.file` only; nothing is logged when it is unset
    FileOnly,
}

/// Install the global subscriber. `RUST_LOG` overrides `config.level`.
///
/// Returns `Ok(false)` when logging stays disabled.
pub fn init_logging(config: &LogConfig, target: LogTarget) -> SitepassResult<bool> {
    let writer = match (&config.file, target) {
        (Some(path), _) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    SitepassError::Config(format!("opening log file {}: {e}", path.display()))
                })?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        (None, LogTarget::Stderr) => BoxMakeWriter::new(std::io::stderr),
        (None, LogTarget::FileOnly) => return Ok(false),
    };
    let ansi = config.file.is_none();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(writer))
            .try_init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(ansi).with_writer(writer))
            .try_init(),
    };
    result.map_err(|e| SitepassError::Config(format!("installing log subscriber: {e}")))?;
    Ok(true)
}
