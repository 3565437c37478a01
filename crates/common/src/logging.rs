//! Logging and tracing initialization.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::MockreelResult;

/// Initialize the tracing subscriber with the given configuration.
///
/// `RUST_LOG` takes precedence over `config.level`. When `config.file` is set,
/// events are appended to that file (without ANSI colors) instead of stderr.
/// Installing a second global subscriber is silently ignored so that tests and
/// embedders can call this more than once.
pub fn init_logging(config: &LoggingConfig) -> MockreelResult<()> {
    let filter = build_filter(&config.level);

    match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let builder = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            if config.json {
                tracing::subscriber::set_global_default(builder.json().finish()).ok();
            } else {
                tracing::subscriber::set_global_default(builder.with_target(true).finish()).ok();
            }
        }
        None => {
            let builder = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr);
            if config.json {
                tracing::subscriber::set_global_default(builder.json().finish()).ok();
            } else {
                let subscriber = builder
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .finish();
                tracing::subscriber::set_global_default(subscriber).ok();
            }
        }
    }

    Ok(())
}

/// Initialize logging with defaults (useful for tests and quick scripts).
pub fn init_default_logging() {
    // Default config has no log file, so this cannot fail on I/O.
    let _ = init_logging(&LoggingConfig::default());
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_level_falls_back_without_panicking() {
        let _ = build_filter("mockreel=notalevel[");
    }

    #[test]
    fn file_logging_creates_parent_directories() {
        let dir = std::env::temp_dir().join("mockreel_test_logging");
        let _ = std::fs::remove_dir_all(&dir);
        let config = LoggingConfig {
            level: "debug".to_string(),
            json: true,
            file: Some(dir.join("nested").join("mockreel.log")),
        };

        init_logging(&config).unwrap();
        assert!(dir.join("nested").join("mockreel.log").exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
