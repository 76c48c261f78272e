//! Severity levels and the atomic severity gate.
use {
    crate::LogTierError,
    std::{
        fmt,
        str::FromStr,
        sync::atomic::{AtomicU8, Ordering},
    },
};

/// Log severity, ordered from least to most important.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    #[default]
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
}

impl Severity {
    /// Number of severity levels, and therefore of file sinks.
    pub const COUNT: usize = 4;

    /// All levels in ascending order.
    pub const ALL: [Severity; Severity::COUNT] =
        [Severity::Debug, Severity::Info, Severity::Warning, Severity::Error];

    /// Position of this level in [`Severity::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Upper-case name, used as the tag in file names and symlinks.
    pub const fn name(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }

    /// Single character shown in every record header.
    pub const fn as_char(self) -> u8 {
        match self {
            Severity::Debug => b'D',
            Severity::Info => b'I',
            Severity::Warning => b'W',
            Severity::Error => b'E',
        }
    }

    /// Create from the raw representation (returns None if invalid)
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Severity::Debug),
            1 => Some(Severity::Info),
            2 => Some(Severity::Warning),
            3 => Some(Severity::Error),
            _ => None,
        }
    }

    /// Like [`Severity::from_u8`], but unknown values resolve to `Info`.
    pub const fn from_u8_lossy(value: u8) -> Self {
        match Self::from_u8(value) {
            Some(severity) => severity,
            None => Severity::Info,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Severity {
    type Err = LogTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" | "d" => Ok(Severity::Debug),
            "info" | "i" => Ok(Severity::Info),
            "warning" | "warn" | "w" => Ok(Severity::Warning),
            "error" | "e" => Ok(Severity::Error),
            _ => Err(LogTierError::UnknownSeverity(s.to_string())),
        }
    }
}

/// Minimum severity a record needs to be written.
///
/// Reads and writes are plain atomics, so changing the limit never waits for
/// file I/O and an in-flight write sees either the old or the new value.
#[derive(Debug)]
pub struct SeverityGate(AtomicU8);

impl SeverityGate {
    pub const fn new(limit: Severity) -> Self {
        Self(AtomicU8::new(limit as u8))
    }

    #[inline]
    pub fn get(&self) -> Severity {
        Severity::from_u8_lossy(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set(&self, limit: Severity) {
        self.0.store(limit as u8, Ordering::Relaxed);
    }

    /// Whether a record at `severity` passes the gate.
    #[inline]
    pub fn admits(&self, severity: Severity) -> bool {
        severity >= self.get()
    }
}

impl Default for SeverityGate {
    fn default() -> Self {
        Self::new(Severity::Debug)
    }
}
