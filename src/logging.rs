use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{self, RollingFileAppender},
};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};
use uuid::Uuid;

use crate::config::{LogFormat, LoggingConfig, LoggingRotation};

const LOG_FILE_PREFIX: &str = "cot-guard.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps the file writer flushing until dropped.
pub struct LoggingGuard {
    _worker_guard: Option<WorkerGuard>,
    run_id: String,
}

impl LoggingGuard {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

/// Installs the global subscriber. Stdout is left alone: events go to
/// stderr, and additionally to rolling JSON files when `logging.dir` is set.
pub fn init_tracing(logging_config: &LoggingConfig) -> Result<LoggingGuard> {
    if logging_config.filter.trim().is_empty() {
        return Err(anyhow!("logging.filter cannot be empty"));
    }

    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
    layers.push(stderr_layer(logging_config.format, &logging_config.filter)?);

    let mut worker_guard = None;
    let mut file_dir = None;
    if let Some(dir) = &logging_config.dir {
        let log_dir = resolve_log_dir(dir)?;
        fs::create_dir_all(&log_dir).with_context(|| {
            format!("failed to create logging directory {}", log_dir.display())
        })?;

        let appender = build_rolling_appender(&log_dir, logging_config.rotation);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        layers.push(
            fmt::layer()
                .json()
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_target(true)
                .with_current_span(true)
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(build_env_filter(&logging_config.filter)?)
                .boxed(),
        );
        worker_guard = Some(guard);
        file_dir = Some(log_dir);
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .context("failed to initialize tracing subscriber")?;

    let run_id = Uuid::now_v7().to_string();
    tracing::info!(
        target: "logging",
        run_id = %run_id,
        dir = ?file_dir,
        filter = %logging_config.filter,
        format = ?logging_config.format,
        rotation = ?logging_config.rotation,
        "logging_initialized"
    );

    Ok(LoggingGuard {
        _worker_guard: worker_guard,
        run_id,
    })
}

fn stderr_layer(format: LogFormat, filter: &str) -> Result<BoxedLayer> {
    let env_filter = build_env_filter(filter)?;
    let layer = match format {
        LogFormat::Text => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(env_filter)
            .boxed(),
    };
    Ok(layer)
}

fn build_env_filter(filter: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(filter)
        .with_context(|| format!("failed to parse logging.filter '{}'", filter))
}

fn build_rolling_appender(log_dir: &Path, rotation: LoggingRotation) -> RollingFileAppender {
    match rotation {
        LoggingRotation::Daily => rolling::daily(log_dir, LOG_FILE_PREFIX),
        LoggingRotation::Hourly => rolling::hourly(log_dir, LOG_FILE_PREFIX),
        LoggingRotation::Never => rolling::never(log_dir, LOG_FILE_PREFIX),
    }
}

fn resolve_log_dir(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }

    Ok(std::env::current_dir()
        .context("failed to read current working directory for logging.dir resolution")?
        .join(dir))
}
