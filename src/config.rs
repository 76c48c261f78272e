//! Configuration values shared by the builder and the file sinks.
use {
    chrono::{FixedOffset, Local, Utc},
    std::{
        fmt,
        io::{self, Write},
        path::PathBuf,
    },
};

/// Default rotation threshold for every severity file (4 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 4 * 1024 * 1024;

/// Defines size thresholds for rotating log files in various units.
///
/// When writing a record would bring a file to the threshold, the file is
/// closed and a fresh one is started for the same severity.
///
/// * `Bytes` - Direct byte count (e.g., 1048576 bytes)
/// * `KB` - Kilobytes (1 KB = 1024 bytes)
/// * `MB` - Megabytes (1 MB = 1024 KB)
/// * `GB` - Gigabytes (1 GB = 1024 MB)
///
/// # Examples
/// ```
/// use logtier::{LoggerBuilder, RotationSize};
///
/// let logger = LoggerBuilder::new("./logs", "server")
///     .max_file_size(RotationSize::MB(64))
///     .build();
/// assert_eq!(logger.max_file_size(), 64 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationSize {
    /// Raw byte count
    Bytes(u64),
    /// Kilobytes (1 KB = 1024 bytes)
    KB(u64),
    /// Megabytes (1 MB = 1024 KB = 1,048,576 bytes)
    MB(u64),
    /// Gigabytes (1 GB = 1024 MB = 1,073,741,824 bytes)
    GB(u64),
}

impl RotationSize {
    /// Get the threshold in bytes.
    pub fn bytes(&self) -> u64 {
        match self {
            RotationSize::Bytes(b) => *b,
            RotationSize::KB(kb) => kb * 1024,
            RotationSize::MB(mb) => mb * 1024 * 1024,
            RotationSize::GB(gb) => gb * 1024 * 1024 * 1024,
        }
    }
}

impl Default for RotationSize {
    fn default() -> Self {
        RotationSize::Bytes(DEFAULT_MAX_FILE_SIZE)
    }
}

/// Specifies the time zone used for record headers, file banners and the
/// timestamp embedded in log file names.
///
/// # Examples
/// ```
/// use logtier::TimeZone;
/// use chrono::FixedOffset;
///
/// let utc = TimeZone::UTC;
/// let local = TimeZone::Local;
/// let china = TimeZone::Fix(FixedOffset::east_opt(8 * 3600).unwrap());
/// ```
#[derive(Debug, Clone)]
pub enum TimeZone {
    /// Use UTC time zone. Best for consistent timing in distributed systems.
    UTC,
    /// Use the system's local time zone, captured when the logger is built.
    Local,
    /// Use a fixed time zone offset.
    Fix(FixedOffset),
}

impl TimeZone {
    pub(crate) fn offset(&self) -> FixedOffset {
        match self {
            TimeZone::UTC => Utc::now().fixed_offset().offset().to_owned(),
            TimeZone::Local => Local::now().offset().to_owned(),
            TimeZone::Fix(fixed_offset) => *fixed_offset,
        }
    }
}

/// The live stream every accepted record is mirrored to.
pub enum Console {
    /// The process's standard error stream.
    Stderr,
    /// Records go to the files only.
    Disabled,
    /// Any other writer, e.g. an in-memory buffer for inspection.
    Writer(Box<dyn Write + Send>),
}

impl Console {
    /// Mirror one record. Console failures are never reported.
    pub(crate) fn write(&mut self, data: &[u8]) {
        let _ = match self {
            Console::Stderr => io::stderr().write_all(data),
            Console::Disabled => Ok(()),
            Console::Writer(writer) => writer.write_all(data),
        };
    }

    pub(crate) fn flush(&mut self) {
        if let Console::Writer(writer) = self {
            let _ = writer.flush();
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Console::Stderr
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Console::Stderr => f.write_str("Stderr"),
            Console::Disabled => f.write_str("Disabled"),
            Console::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

/// Resolve the directory and base name used by the process-wide logger.
///
/// Logs go to a `log` directory next to the running executable and are
/// named after the executable's file name. When the executable path cannot
/// be resolved, `./log` and `app` are used instead.
pub fn default_location() -> (PathBuf, String) {
    let fallback = || (PathBuf::from("./log"), String::from("app"));
    let Ok(exe) = std::env::current_exe() else {
        return fallback();
    };
    let (Some(parent), Some(name)) = (exe.parent(), exe.file_name()) else {
        return fallback();
    };
    (parent.join("log"), name.to_string_lossy().into_owned())
}
