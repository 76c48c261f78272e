// Leveled logging macros.
//
// Each takes an optional logger followed by `format!`-style arguments. Without
// a logger the process-wide default is used.

/// Log a formatted message at debug severity.
///
/// # Examples
/// ```ignore
/// debug!(logger, "accepted {} from {}", fd, peer);
/// debug!("cache warmed in {:?}", elapsed);
/// ```
#[macro_export]
macro_rules! debug {
    ($fmt:literal $($arg:tt)*) => {
        $crate::log!($crate::default_logger(), $crate::Severity::Debug, $fmt $($arg)*)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Debug, $($arg)+)
    };
}

/// Log a formatted message at info severity.
///
/// # Examples
/// ```ignore
/// info!(logger, "listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
    ($fmt:literal $($arg:tt)*) => {
        $crate::log!($crate::default_logger(), $crate::Severity::Info, $fmt $($arg)*)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Info, $($arg)+)
    };
}

/// Log a formatted message at warning severity.
///
/// # Examples
/// ```ignore
/// warning!(logger, "retrying {} in {:?}", job, backoff);
/// ```
#[macro_export]
macro_rules! warning {
    ($fmt:literal $($arg:tt)*) => {
        $crate::log!($crate::default_logger(), $crate::Severity::Warning, $fmt $($arg)*)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Warning, $($arg)+)
    };
}

/// Log a formatted message at error severity. All files are flushed before
/// the macro returns.
///
/// # Examples
/// ```ignore
/// error!(logger, "failed to bind {}: {}", addr, err);
/// ```
#[macro_export]
macro_rules! error {
    ($fmt:literal $($arg:tt)*) => {
        $crate::log!($crate::default_logger(), $crate::Severity::Error, $fmt $($arg)*)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Error, $($arg)+)
    };
}

/// Log a formatted message at the given severity, recording the macro's
/// call site as the source location.
#[macro_export]
macro_rules! log {
    ($logger:expr, $severity:expr, $($arg:tt)+) => {
        $logger.log($severity, file!(), line!(), format_args!($($arg)+))
    };
}
