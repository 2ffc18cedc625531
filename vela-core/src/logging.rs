//! Logging initialization for the Vela core library.
//!
//! Built on the `tracing` ecosystem. Supports console output with an
//! optional daily-rolling file layer and a text or JSON format.

use std::io::stdout;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use once_cell::sync::Lazy;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{CoreError, LoggingError};

/// Keeps the non-blocking file writer alive for the process lifetime.
static FILE_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Initializes a minimal logging setup directed at `stderr`.
///
/// Intended for tests and early startup before configuration is loaded.
/// Filters on `RUST_LOG`, defaulting to "info". Errors (e.g. a global
/// subscriber already installed) are ignored, so it is safe to call more
/// than once.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .try_init();
}

fn create_file_layer(path: &Path, format: LogFormat) -> Result<BoxedLayer, CoreError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    if !parent.as_os_str().is_empty() && !parent.exists() {
        std::fs::create_dir_all(parent).map_err(|e| LoggingError::FilePathInvalid {
            path: PathBuf::from(path),
            reason: e.to_string(),
        })?;
    }
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::FilePathInvalid {
            path: PathBuf::from(path),
            reason: "missing file name".to_string(),
        })?;
    let appender = tracing_appender::rolling::daily(parent, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    *FILE_GUARD.lock().expect("file guard poisoned") = Some(guard);

    let layer: BoxedLayer = match format {
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
        LogFormat::Text => fmt::layer().with_ansi(false).with_writer(writer).boxed(),
    };
    Ok(layer)
}

/// Installs the global subscriber described by `config`.
///
/// Returns `LoggingError::InitializationFailure` if a subscriber is
/// already installed or the filter directive is malformed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), CoreError> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| LoggingError::InitializationFailure(e.to_string()))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let console: BoxedLayer = match config.format {
        LogFormat::Json => fmt::layer().json().with_writer(stdout).boxed(),
        LogFormat::Text => fmt::layer()
            .with_ansi(atty::is(atty::Stream::Stdout))
            .with_writer(stdout)
            .boxed(),
    };
    layers.push(console);

    if let Some(path) = &config.file_path {
        layers.push(create_file_layer(path, config.format)?);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| LoggingError::InitializationFailure(e.to_string()))?;
    Ok(())
}
