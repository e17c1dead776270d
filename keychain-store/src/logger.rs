//! Bridges `log` records to a logger implemented by the host application.

use std::sync::{Arc, OnceLock};

/// Receives log messages emitted by this crate.
///
/// Implemented in the host language and installed once with [`set_logger`].
///
/// ```rust
/// use keychain_store::logger::{LogLevel, Logger};
///
/// struct StderrLogger;
///
/// impl Logger for StderrLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         eprintln!("[{level:?}] {message}");
///     }
/// }
/// ```
///
/// ## Swift
///
/// ```swift
/// final class KeychainStoreLogBridge: KeychainStore.Logger {
///     func log(level: KeychainStore.LogLevel, message: String) {
///         os_log("%{public}@", message)
///     }
/// }
///
/// KeychainStore.setLogger(logger: KeychainStoreLogBridge())
/// ```
#[uniffi::export(with_foreign)]
pub trait Logger: Sync + Send {
    /// Records one message.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a forwarded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum LogLevel {
    /// Very detailed tracing.
    Trace,
    /// Backend round trips and fallbacks.
    Debug,
    /// Notable progress.
    Info,
    /// Swallowed or recoverable failures.
    Warn,
    /// Failures surfaced to the caller.
    Error,
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Forwards `log` records to [`LOGGER_INSTANCE`].
struct ForeignLogger;

/// Debug and trace records are only forwarded when they come from this crate.
fn should_forward(level: log::Level, module_path: Option<&str>) -> bool {
    let verbose = matches!(level, log::Level::Debug | log::Level::Trace);
    !verbose || module_path.is_some_and(|path| path.starts_with("keychain_store"))
}

impl log::Log for ForeignLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if !should_forward(record.level(), record.module_path()) {
            return;
        }

        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(record.level().into(), record.args().to_string());
        } else {
            eprintln!("Logger not set: {}", record.args());
        }
    }

    fn flush(&self) {}
}

/// Installs the host logger.
///
/// Only the first call takes effect; later calls are reported on stderr and
/// ignored.
#[uniffi::export]
pub fn set_logger(logger: Arc<dyn Logger>) {
    if LOGGER_INSTANCE.set(logger).is_err() {
        eprintln!("Logger already set");
        return;
    }

    static LOGGER: ForeignLogger = ForeignLogger;
    if let Err(e) = log::set_logger(&LOGGER) {
        eprintln!("Failed to set logger: {e}");
        return;
    }
    log::set_max_level(log::LevelFilter::Trace);
}
