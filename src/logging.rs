//! # Logging
//!
//! Process-wide `tracing` setup for the binary, plus the [`SearchLogger`]
//! collaborator that library code logs through.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Logging sink injected into the searcher and its workers.
pub trait SearchLogger: Send + Sync {
    fn log(&self, level: Level, message: &str);
}

/// Forwards every message to the global `tracing` dispatcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl SearchLogger for TracingLogger {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!("{message}"),
            Level::WARN => tracing::warn!("{message}"),
            Level::INFO => tracing::info!("{message}"),
            Level::DEBUG => tracing::debug!("{message}"),
            _ => tracing::trace!("{message}"),
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(err) = result {
        eprintln!("logging already initialised: {err}");
    }
}
