//! Logging setup.
//!
//! Lines look like `2025-10-01 09:00:00,123 - tencent_billing::batch - INFO - account{name=A}: message`.
//! The console receives every event at or above the configured level; the
//! optional log file is size-rotated and only receives ERROR events.
//!
//! [`build`] returns a [`Dispatch`] rather than installing a global
//! subscriber, so callers decide how widely it applies.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Local;
use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{filter_fn, LevelFilter};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

use crate::error::BillingError;

/// Default size at which the log file rotates (10 MiB).
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Default number of rotated files kept.
pub const DEFAULT_BACKUP_COUNT: usize = 5;

/// Log verbosity, named the way operators pass it on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Equivalent `tracing` level filter. `CRITICAL` maps to ERROR.
    #[must_use]
    pub fn as_filter(self) -> LevelFilter {
        match self {
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Warning => LevelFilter::WARN,
            Self::Error | Self::Critical => LevelFilter::ERROR,
        }
    }
}

/// Where and how much to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: LogLevel,
    pub path: PathBuf,
    pub max_bytes: u64,
    pub backup_count: usize,
    pub console: bool,
    pub file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Debug,
            path: PathBuf::from("logs").join("TencentBilling.log"),
            max_bytes: DEFAULT_MAX_BYTES,
            backup_count: DEFAULT_BACKUP_COUNT,
            console: true,
            file: true,
        }
    }
}

/// Keeps the background file writer alive; dropping it flushes pending lines.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Build the subscriber described by `config`.
///
/// `RUST_LOG`, when set, overrides the console level.
///
/// # Errors
///
/// Returns [`BillingError::Config`] if the log directory or file cannot be created.
pub fn build(config: &LogConfig) -> Result<(Dispatch, LoggingGuard), BillingError> {
    let console = config.console.then(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::default().add_directive(config.level.as_filter().into()));
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .event_format(LineFormat)
            .with_filter(filter)
    });

    let (file, guard) = if config.file {
        let appender = rotating_appender(&config.path, config.max_bytes, config.backup_count)?;
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .event_format(LineFormat)
            .with_filter(filter_fn(|meta| meta.is_span() || *meta.level() == Level::ERROR));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let subscriber = tracing_subscriber::registry().with(console).with(file);
    Ok((Dispatch::new(subscriber), LoggingGuard { _file: guard }))
}

/// Open a size-rotated log file, creating its directory.
fn rotating_appender(
    path: &Path,
    max_bytes: u64,
    backup_count: usize,
) -> Result<BasicRollingFileAppender, BillingError> {
    let path = std::path::absolute(path).map_err(|e| {
        BillingError::Config(format!("invalid log path {}: {e}", path.display()))
    })?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            BillingError::Config(format!(
                "failed to create log directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    BasicRollingFileAppender::new(
        &path,
        RollingConditionBasic::new().max_size(max_bytes),
        backup_count,
    )
    .map_err(|e| BillingError::Config(format!("failed to open log file {}: {e}", path.display())))
}

/// `timestamp - target - LEVEL - spans: message fields`
struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        write!(
            writer,
            "{} - {} - {} - ",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            metadata.target(),
            metadata.level()
        )?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;
                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{fields}}}")?;
                    }
                }
                write!(writer, ": ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
