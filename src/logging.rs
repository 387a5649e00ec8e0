//! Tracing subscriber setup
//!
//! Logs go to stderr through the `fmt` layer. `RUST_LOG` overrides the
//! configured filter. When `logging.log_dir` is set, a second layer writes to
//! a daily rolling file through a non-blocking writer whose guard must be kept
//! alive for the lifetime of the process.

use crate::config::LoggingConfig;
use crate::error::{Result, ScopeError};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file prefix inside `log_dir`
pub const LOG_FILE_PREFIX: &str = "serial-scope.log";

/// Build the filter: `RUST_LOG` if set and valid, otherwise the configured one
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter))
}

/// Install the global subscriber.
///
/// Returns the file writer guard when file logging is enabled.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let registry = tracing_subscriber::registry()
        .with(env_filter(config))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .try_init()
                .map_err(|e| ScopeError::Config(format!("Failed to install logger: {}", e)))?;
            Ok(Some(guard))
        }
        None => {
            registry
                .try_init()
                .map_err(|e| ScopeError::Config(format!("Failed to install logger: {}", e)))?;
            Ok(None)
        }
    }
}
