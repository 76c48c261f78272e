//! The process-wide logger used by the free functions.
use {
    crate::{config::default_location, Logger, LoggerBuilder},
    once_cell::sync::Lazy,
    std::{fmt, fmt::Display},
};

static DEFAULT_LOGGER: Lazy<Logger> = Lazy::new(|| {
    let (directory, name) = default_location();
    LoggerBuilder::new(directory, &name).build()
});

/// The zero-configuration logger behind [`debug`], [`infof`] and friends.
///
/// It is created on first use, logging into a `log` directory next to the
/// executable, and its flush daemon runs for the rest of the process.
/// Adjust it through the usual setters before traffic starts:
///
/// ```no_run
/// logtier::default_logger().set_log_dir("/var/log/myapp");
/// logtier::default_logger().set_severity_limit(logtier::Severity::Info);
/// logtier::info(&[&"ready"]);
/// ```
pub fn default_logger() -> &'static Logger {
    &DEFAULT_LOGGER
}

#[track_caller]
pub fn debug(values: &[&dyn Display]) {
    DEFAULT_LOGGER.debug(values);
}

#[track_caller]
pub fn info(values: &[&dyn Display]) {
    DEFAULT_LOGGER.info(values);
}

#[track_caller]
pub fn warning(values: &[&dyn Display]) {
    DEFAULT_LOGGER.warning(values);
}

#[track_caller]
pub fn error(values: &[&dyn Display]) {
    DEFAULT_LOGGER.error(values);
}

#[track_caller]
pub fn debugf(args: fmt::Arguments<'_>) {
    DEFAULT_LOGGER.debugf(args);
}

#[track_caller]
pub fn infof(args: fmt::Arguments<'_>) {
    DEFAULT_LOGGER.infof(args);
}

#[track_caller]
pub fn warningf(args: fmt::Arguments<'_>) {
    DEFAULT_LOGGER.warningf(args);
}

#[track_caller]
pub fn errorf(args: fmt::Arguments<'_>) {
    DEFAULT_LOGGER.errorf(args);
}

/// Flush the default logger's files.
pub fn flush() {
    DEFAULT_LOGGER.flush();
}
