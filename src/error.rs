use std::path::PathBuf;

/// Errors raised while opening or rotating a log file, or parsing a
/// severity name.
///
/// None of these ever reach the caller of a leveled write: a file that
/// cannot be opened only costs the record that triggered the attempt.
#[derive(Debug, thiserror::Error)]
pub enum LogTierError {
    #[error("Failed to create directory '{0}': {1}")]
    CreateDirectoryFailed(PathBuf, String),
    #[error("Failed to create file '{0}': {1}")]
    CreateFileFailed(PathBuf, String),
    #[error("Failed to set file permissions for '{path}': {error}")]
    SetFilePermissionsError { path: PathBuf, error: String },
    #[error("File IO error: {0}")]
    FileIOError(#[from] std::io::Error),
    #[error("Unknown severity: {0}")]
    UnknownSeverity(String),
}
