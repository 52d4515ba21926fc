//! Logging for the graph inspector.
//!
//! The process-wide backend is `log4rs`, installed once via [`init_logger`]. Components never
//! log through the global facade directly: each one is handed a [`Logger`] at construction and
//! logs through it with the crate-level `trace!`/`debug!`/`info!`/`warn!`/`error!` macros.

use log::{LevelFilter, Log, Metadata, Record};
use log4rs::config::Root;
use std::{fmt, sync::Arc};
use thiserror::Error;

pub use log::Level;

mod appender;
pub mod consts;
mod filters;
mod memory;

use appender::AppenderSpec;
use consts::{DEFAULT_LOGGER_ENV, ERR_LOG_FILE_NAME, LOG_FILE_NAME};
use filters::Filters;
pub use memory::{CapturedRecord, MemoryLog};

const CONSOLE_APPENDER: &str = "stdout";
const LOG_FILE_APPENDER: &str = "log_file";
const ERR_LOG_FILE_APPENDER: &str = "err_log_file";

#[derive(Clone, Debug, Error)]
pub enum LogError {
    #[error("logger spec parsing error: {0}")]
    ParseLoggerSpec(String),

    #[error("log appender error: {0}")]
    Appender(String),

    #[error("log config error: {0}")]
    Config(String),

    #[error("logger init error: {0}")]
    Init(String),
}

/// Installs the process-wide `log4rs` backend: a console appender and, when `log_dir` is given,
/// a rolling log file plus a warn-level error log file.
///
/// `filters` is a comma separated list of `level` or `module=level` specs, applied on top of the
/// `RUST_LOG` environment variable. An empty expression defaults to `info`.
pub fn init_logger(log_dir: Option<&str>, filters: &str) -> Result<(), LogError> {
    let filters = if filters.is_empty() { "info" } else { filters };

    let mut appenders = vec![AppenderSpec::console(CONSOLE_APPENDER, None)];
    if let Some(log_dir) = log_dir {
        appenders.push(AppenderSpec::roller(LOG_FILE_APPENDER, None, log_dir, LOG_FILE_NAME)?);
        appenders.push(AppenderSpec::roller(ERR_LOG_FILE_APPENDER, Some(LevelFilter::Warn), log_dir, ERR_LOG_FILE_NAME)?);
    }

    let mut level_filters = Filters::default();
    level_filters.root_level(LevelFilter::Info).parse_env(DEFAULT_LOGGER_ENV)?.parse_expression(filters)?;

    let appender_names = appenders.iter().map(|spec| spec.name).collect::<Vec<_>>();
    let config = log4rs::config::Config::builder()
        .appenders(appenders.into_iter().map(AppenderSpec::appender))
        .loggers(level_filters.loggers())
        .build(Root::builder().appenders(appender_names).build(level_filters.root()))
        .map_err(|err| LogError::Config(err.to_string()))?;

    log4rs::init_config(config).map_err(|err| LogError::Init(err.to_string()))?;
    Ok(())
}

/// Console-only logger init for tests. Silently does nothing if a logger is already installed.
pub fn try_init_logger(filters: &str) {
    let _ = init_logger(None, filters);
}

/// A logging capability handed to each component.
///
/// Wraps a sink and the target every record is emitted under. [`Logger::global`] forwards to
/// the installed process backend; tests inject a [`MemoryLog`] to assert on emitted records.
#[derive(Clone)]
pub struct Logger {
    target: &'static str,
    sink: Arc<dyn Log>,
}

impl Logger {
    pub fn new(target: &'static str, sink: Arc<dyn Log>) -> Self {
        Self { target, sink }
    }

    pub fn global(target: &'static str) -> Self {
        Self::new(target, Arc::new(GlobalSink))
    }

    /// Same sink, different target
    pub fn with_target(&self, target: &'static str) -> Self {
        Self { target, sink: self.sink.clone() }
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.sink.enabled(&Metadata::builder().level(level).target(self.target).build())
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        let record = Record::builder().level(level).target(self.target).args(args).build();
        if self.sink.enabled(record.metadata()) {
            self.sink.log(&record);
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("target", &self.target).finish()
    }
}

struct GlobalSink;

impl Log for GlobalSink {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level() && log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        log::logger().log(record)
    }

    fn flush(&self) {
        log::logger().flush()
    }
}

#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log($crate::log::Level::Trace, format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log($crate::log::Level::Debug, format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log($crate::log::Level::Info, format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log($crate::log::Level::Warn, format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log($crate::log::Level::Error, format_args!($($arg)+))
    };
}
