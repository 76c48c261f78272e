//! # LogTier
//!
//! LogTier is a leveled logging library for long-running services. Records
//! are written into one rotating file per severity and mirrored to a live
//! console stream. **A record lands in the file of its own severity and in
//! every file below it**, so the `DEBUG` file holds everything, the `ERROR`
//! file only errors, and each file can be read on its own without merging.
//!
//! Files are named `<base>.<SEVERITY>.<YYYYMMDD>-<HHMMSS>.<pid>.log`, start
//! with a three-line banner, and are replaced by a fresh file once writing a
//! record would bring them to the configured size. A `<base>.<SEVERITY>`
//! symlink always points at the newest file. Buffered records are flushed by
//! a background thread every 30 seconds, and synchronously after every
//! error record.
//!
//! Each record reads `[MM-DD hh:mm:ss.uuuuuu L file:line] message`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use logtier::{LoggerBuilder, RotationSize, Severity, TimeZone};
//!
//! fn main() {
//!     let logger = LoggerBuilder::new("./logs", "server")
//!         .max_file_size(RotationSize::MB(32)) // Start a new file every 32 MiB
//!         .severity_limit(Severity::Info) // Skip debug records
//!         .time_zone(TimeZone::UTC)
//!         .build();
//!
//!     logger.info(&[&"listening on port", &8080]);
//!     logtier::warning!(logger, "{} slow requests", 3);
//!     logtier::error!(logger, "lost connection to {}", "db-1");
//!
//!     // Or the zero-configuration process-wide logger.
//!     logtier::info(&[&"ready"]);
//!     logtier::flush();
//! }
//! ```
//!
//! With the `tracing` feature, [`LogTierLayer`] forwards `tracing` events
//! into a logger.
mod buffer;
mod config;
mod error;
mod global;
mod header;
#[cfg(feature = "tracing")]
mod layer;
mod logger;
mod macros;
mod severity;
mod sink;

pub use {
    buffer::{Buffer, BufferPool, MAX_POOLED_LEN},
    config::{default_location, Console, RotationSize, TimeZone, DEFAULT_MAX_FILE_SIZE},
    error::LogTierError,
    global::{debug, debugf, default_logger, error, errorf, flush, info, infof, warning, warningf},
    header::{short_file, stamp_header},
    logger::{Logger, LoggerBuilder, DEFAULT_FLUSH_INTERVAL},
    severity::{Severity, SeverityGate},
    sink::banner,
};

#[cfg(feature = "tracing")]
pub use layer::{severity_for, LogTierLayer};
