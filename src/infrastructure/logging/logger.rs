use super::config::{LogConfig, LogFormat, RotationPolicy, TRACE_LOG_FILE_NAME};
use anyhow::{Context, Result};
use std::io;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Owns the non-blocking writer guard for the trace log.
///
/// Dropping it flushes buffered records, so the run command keeps it alive
/// until the supervisor has stopped.
pub struct LoggerImpl {
    _guard: Option<WorkerGuard>,
}

impl LoggerImpl {
    /// Installs the global subscriber described by `config`.
    ///
    /// # Errors
    /// Returns an error if the level is invalid, the trace log cannot be
    /// created, or a global subscriber is already installed
    pub fn init(config: &LogConfig) -> Result<Self> {
        let default_level = parse_log_level(&config.level)?;
        let env_filter = || {
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy()
        };

        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut guard = None;

        if let Some(ref log_dir) = config.log_dir {
            let rotation = match config.rotation {
                RotationPolicy::Daily => Rotation::DAILY,
                RotationPolicy::Hourly => Rotation::HOURLY,
                RotationPolicy::Never => Rotation::NEVER,
            };

            let file_appender = RollingFileAppender::builder()
                .rotation(rotation)
                .filename_prefix(TRACE_LOG_FILE_NAME)
                .max_log_files(config.max_log_files)
                .build(log_dir)
                .context("failed to create trace log appender")?;

            let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);
            guard = Some(file_guard);

            // The trace log is JSON regardless of the console format
            layers.push(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(non_blocking_file)
                    .with_ansi(false)
                    .with_span_list(false)
                    .with_thread_names(true)
                    .with_filter(env_filter())
                    .boxed(),
            );
        }

        if config.enable_stderr {
            let layer = match config.format {
                LogFormat::Json => tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(io::stderr)
                    .with_span_list(false)
                    .with_filter(env_filter())
                    .boxed(),
                LogFormat::Pretty => tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(io::stderr)
                    .with_target(false)
                    .with_span_events(FmtSpan::NONE)
                    .with_filter(env_filter())
                    .boxed(),
            };
            layers.push(layer);
        }

        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .context("failed to install global tracing subscriber")?;

        tracing::debug!(
            level = %default_level,
            trace_log = ?config.log_dir,
            rotation = ?config.rotation,
            "tracing ready"
        );

        Ok(Self { _guard: guard })
    }
}

/// Parses a level name such as `info` or `WARN`.
pub fn parse_log_level(level: &str) -> Result<Level> {
    level
        .trim()
        .parse::<Level>()
        .map_err(|_| anyhow::anyhow!("unknown log level '{level}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names_are_case_insensitive() {
        for (name, level) in [
            ("trace", Level::TRACE),
            ("Debug", Level::DEBUG),
            ("INFO", Level::INFO),
            (" warn ", Level::WARN),
            ("error", Level::ERROR),
        ] {
            assert_eq!(parse_log_level(name).unwrap(), level, "{name}");
        }
        assert!(parse_log_level("verbose").is_err());
    }

    #[test]
    fn test_init_rejects_invalid_level() {
        let config = LogConfig {
            level: "chatty".to_string(),
            ..LogConfig::default()
        };
        assert!(LoggerImpl::init(&config).is_err());
    }

    // Successful initialization installs a global subscriber, so it is
    // covered by tests/logging_integration_test.rs in its own process.
}
