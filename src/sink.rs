//! The per-severity rotating file sink.
use {
    crate::{LogTierError, Severity},
    chrono::{DateTime, FixedOffset, Utc},
    std::{
        fs::{self, File},
        io::{self, BufWriter, Write as _},
        path::{Path, PathBuf},
    },
};

#[cfg(unix)]
use std::{fs::Permissions, os::unix::fs::PermissionsExt};

/// Size of the buffered writer in front of each file. Large enough that
/// records accumulate without the writing thread blocking on the disk; the
/// flush daemon pays for the I/O instead.
pub(crate) const BUFFER_SIZE: usize = 256 * 1024;

/// Where sinks create their files.
///
/// Lives under the logger's lock; sinks only read it.
#[derive(Debug, Clone)]
pub(crate) struct LogTarget {
    /// The directory where the log files are stored.
    pub(crate) directory: PathBuf,
    /// Base name every file name starts with.
    pub(crate) name: String,
    /// Offset used for file name timestamps and banners.
    pub(crate) time_zone: FixedOffset,
    /// Mode applied to newly created files (Unix-like systems only).
    pub(crate) file_mode: Option<u32>,
}

impl LogTarget {
    /// Get the current time in the configured time zone.
    pub(crate) fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.time_zone)
    }

    /// Build the file name for a new file and the name of its symlink.
    ///
    /// Files are named `<base>.<TAG>.<YYYYMMDD>-<HHMMSS>.<pid>.log`; the
    /// symlink is `<base>.<TAG>`.
    pub(crate) fn file_names(&self, tag: &str, now: &DateTime<FixedOffset>) -> (String, String) {
        let name = format!(
            "{}.{}.{}.{}.log",
            self.name,
            tag,
            now.format("%Y%m%d-%H%M%S"),
            std::process::id()
        );
        (name, format!("{}.{}", self.name, tag))
    }

    /// Create a new log file, creating the directory first if needed, and
    /// append to it if it already exists.
    fn create_log_file(&self, log_path: &Path) -> Result<File, LogTierError> {
        let mut open_options = fs::OpenOptions::new();
        open_options.append(true).create(true);

        let mut create_log_file_res = open_options.open(log_path);
        if create_log_file_res.is_err() {
            if let Some(parent) = log_path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|err| LogTierError::CreateDirectoryFailed(parent.to_path_buf(), err.to_string()))?;
                create_log_file_res = open_options.open(log_path);
            }
        }

        let log_file = create_log_file_res
            .map_err(|err| LogTierError::CreateFileFailed(log_path.to_path_buf(), err.to_string()))?;

        self.set_permissions(log_path)?;

        Ok(log_file)
    }

    fn set_permissions(&self, path: &Path) -> Result<(), LogTierError> {
        if let Some(mode) = self.file_mode {
            #[cfg(unix)]
            {
                fs::set_permissions(path, Permissions::from_mode(mode)).map_err(|err| {
                    LogTierError::SetFilePermissionsError {
                        path: path.to_path_buf(),
                        error: err.to_string(),
                    }
                })?
            }
            #[cfg(not(unix))]
            {
                let _ = (mode, path);
            }
        }
        Ok(())
    }
}

/// Point `<dir>/<link>` at `name`. Failures are ignored: the link is only a
/// convenience for finding the newest file.
fn update_symlink(directory: &Path, name: &str, link: &str) {
    let symlink = directory.join(link);
    let _ = fs::remove_file(&symlink);
    #[cfg(unix)]
    {
        let _ = std::os::unix::fs::symlink(name, &symlink);
    }
    #[cfg(not(unix))]
    {
        let _ = name;
    }
}

/// The three-line banner written at the top of every file.
///
/// Its length does not depend on `now`.
pub fn banner(now: &DateTime<FixedOffset>) -> String {
    format!(
        "Log file created at: {}\nBinary: Built with {} {} for {}/{}\nLog line format: [mm-dd hh:mm:ss.uuuuuu L file:line] msg\n",
        now.format("%Y/%m/%d %H:%M:%S"),
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH,
    )
}

/// A buffered file for one severity that starts a new file once it grows to
/// the logger's size threshold.
///
/// A sink whose last rotation failed has no open file; records written to
/// it are dropped until a later write manages to open one.
pub(crate) struct RotatingFile {
    severity: Severity,
    writer: Option<BufWriter<File>>,
    path: Option<PathBuf>,
    /// Bytes written to the current file, banner included.
    nbytes: u64,
}

impl RotatingFile {
    /// Open the first file for `severity`.
    pub(crate) fn open(
        severity: Severity,
        target: &LogTarget,
        now: &DateTime<FixedOffset>,
    ) -> Result<Self, LogTierError> {
        let mut sink = RotatingFile {
            severity,
            writer: None,
            path: None,
            nbytes: 0,
        };
        sink.rotate(target, now)?;
        Ok(sink)
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[cfg(test)]
    pub(crate) fn bytes_written(&self) -> u64 {
        self.nbytes
    }

    /// Write one record, rotating first if it would bring the file to
    /// `max_size` bytes.
    pub(crate) fn write(&mut self, data: &[u8], target: &LogTarget, max_size: u64) {
        if self.writer.is_none() || self.nbytes + data.len() as u64 >= max_size {
            if let Err(err) = self.rotate(target, &target.now()) {
                eprintln!("Failed to rotate {} log file: {}", self.severity, err);
                return;
            }
        }
        if let Some(writer) = self.writer.as_mut() {
            if writer.write_all(data).is_ok() {
                self.nbytes += data.len() as u64;
            }
        }
    }

    /// Close the current file, if any, and start a new one stamped with
    /// `now`.
    pub(crate) fn rotate(&mut self, target: &LogTarget, now: &DateTime<FixedOffset>) -> Result<(), LogTierError> {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
            // Dropping the writer closes the file.
        }
        self.path = None;
        self.nbytes = 0;

        let (name, link) = target.file_names(self.severity.name(), now);
        let log_path = target.directory.join(&name);
        let mut file = target.create_log_file(&log_path)?;
        update_symlink(&target.directory, &name, &link);

        let banner = banner(now);
        file.write_all(banner.as_bytes())?;

        self.nbytes = banner.len() as u64;
        self.writer = Some(BufWriter::with_capacity(BUFFER_SIZE, file));
        self.path = Some(log_path);
        Ok(())
    }

    /// Push buffered bytes to the file.
    pub(crate) fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    /// Ask the OS to persist the file's contents.
    pub(crate) fn sync(&self) -> io::Result<()> {
        match self.writer.as_ref() {
            Some(writer) => writer.get_ref().sync_all(),
            None => Ok(()),
        }
    }
}
