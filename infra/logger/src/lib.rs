//! # Logger
//!
//! Installs the process-wide `tracing` subscriber: a console layer (human-readable
//! or JSON) and an optional rolling log file written off the request path.
//!
//! `RUST_LOG` always wins over the programmatic level and filter.
//!
//! ## Example
//!
//! ```rust
//! # use sc_logger::{Logger, LevelFilter};
//! let _logger = Logger::builder()
//!     .name("software-center")
//!     .level(LevelFilter::DEBUG)
//!     .env_filter("sc_kernel=debug,tower_http=info")
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Sealed;
use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

/// Line format of a log sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Compact,
    Json,
}

#[derive(Debug)]
struct LoggerConfig {
    console: Option<Format>,
    directory: Option<PathBuf>,
    file_format: Format,
    level: LevelFilter,
    rotation: Rotation,
    max_files: usize,
    env_filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: Some(Format::Compact),
            directory: None,
            file_format: Format::Json,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            env_filter: None,
        }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);
#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// Configures the global subscriber. A name is required before [`init`](LoggerBuilder::init)
/// becomes available; file options only exist once a directory is set.
#[derive(Debug)]
#[must_use = "The builder must be configured before it can be used to initialize the logger."]
pub struct LoggerBuilder<N: Sealed = NoName, F: Sealed = NoFile> {
    config: LoggerConfig,
    name: N,
    file: PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<NoName, F> {
    /// Names the service; also the prefix of rolling log files.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName, F> {
        LoggerBuilder { config: self.config, name: WithName(name.into()), file: PhantomData }
    }
}

impl<N: Sealed, F: Sealed> LoggerBuilder<N, F> {
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Adds a programmatic filter (`sc_kernel=debug,hyper=warn`). `RUST_LOG` overrides it.
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    /// Console output format; `None` disables the console sink.
    pub const fn console(mut self, format: Option<Format>) -> Self {
        self.config.console = format;
        self
    }
}

impl<N: Sealed> LoggerBuilder<N, NoFile> {
    /// Also writes to rolling files in `directory`.
    pub fn directory(self, directory: impl Into<PathBuf>) -> LoggerBuilder<N, WithFile> {
        let mut config = self.config;
        config.directory = Some(directory.into());
        LoggerBuilder { config, name: self.name, file: PhantomData }
    }
}

impl<N: Sealed> LoggerBuilder<N, WithFile> {
    pub const fn file_format(mut self, format: Format) -> Self {
        self.config.file_format = format;
        self
    }

    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.config.rotation = rotation;
        self
    }

    pub const fn max_files(mut self, max: usize) -> Self {
        self.config.max_files = max;
        self
    }
}

impl<F: Sealed> LoggerBuilder<WithName, F> {
    /// Installs the subscriber.
    ///
    /// Keep the returned [`Logger`] alive until shutdown; dropping it flushes and stops
    /// the file writer.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, a bad filter or no sinks.
    /// * [`LoggerError::Io`] / [`LoggerError::Appender`] when the log directory is unusable.
    /// * [`LoggerError::Subscriber`] when a global subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let LoggerBuilder { config, name: WithName(name), .. } = self;
        validate_config(&config, &name)?;

        let filter = build_env_filter(&config)?;
        let mut layers = Vec::new();

        match config.console {
            Some(Format::Compact) => layers.push(layer().compact().with_ansi(true).boxed()),
            Some(Format::Json) => layers.push(layer().json().flatten_event(true).boxed()),
            None => {},
        }

        let guard = match &config.directory {
            Some(directory) => {
                fs::create_dir_all(directory)
                    .context(format!("Creating log directory {}", directory.display()))?;

                let appender = RollingFileAppender::builder()
                    .rotation(config.rotation.clone())
                    .filename_prefix(&name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(config.max_files)
                    .build(directory)
                    .context("Building rolling file appender")?;

                let (writer, guard) = tracing_appender::non_blocking(appender);
                let file_layer = layer().with_writer(writer).with_ansi(false);
                layers.push(match config.file_format {
                    Format::Json => file_layer.json().boxed(),
                    Format::Compact => file_layer.compact().boxed(),
                });
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging sinks enabled; enable the console or a log directory".into(),
                context: None,
            });
        }

        tracing_subscriber::registry()
            .with(filter)
            .with(layers)
            .try_init()
            .context("Installing global subscriber")?;

        tracing::debug!(logger = %name, level = %config.level, "Logger initialized");
        Ok(Logger { name, guard })
    }
}

/// Handle to the installed logging system.
#[must_use = "Dropping this handle stops the background file writer."]
#[derive(Debug)]
pub struct Logger {
    name: String,
    guard: Option<WorkerGuard>,
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { config: LoggerConfig::default(), name: NoName, file: PhantomData }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a rolling file sink is attached.
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!(logger = %self.name, "Logging system shutting down, flushing buffers...");
        }
    }
}

/// Parses a level name (`trace`..`error`, `off`), case-insensitively.
///
/// # Errors
/// Returns [`LoggerError::InvalidConfiguration`] for unknown names.
pub fn parse_level(raw: &str) -> Result<LevelFilter, LoggerError> {
    LevelFilter::from_str(raw.trim()).map_err(|_| LoggerError::InvalidConfiguration {
        message: format!("Unknown log level '{raw}'").into(),
        context: None,
    })
}

fn validate_config(config: &LoggerConfig, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }

    if config.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }

    Ok(())
}

fn build_env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());

    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return Ok(builder.from_env_lossy());
    }

    config.env_filter.as_ref().map_or_else(
        || Ok(builder.parse_lossy("")),
        |filter| {
            builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{filter}': {e}").into(),
                context: None,
            })
        },
    )
}
