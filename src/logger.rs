//! The logger: severity gate, cascading sinks and the flush daemon.
use {
    crate::{
        buffer::{Buffer, BufferPool},
        config::{Console, RotationSize, TimeZone, DEFAULT_MAX_FILE_SIZE},
        header::stamp_header,
        sink::{LogTarget, RotatingFile},
        LogTierError, Severity, SeverityGate,
    },
    chrono::{FixedOffset, Utc},
    std::{
        fmt::{self, Display, Write as _},
        panic::Location,
        path::{Path, PathBuf},
        sync::{
            atomic::{AtomicU64, Ordering},
            Arc, Mutex, MutexGuard, PoisonError, Weak,
        },
        thread,
        time::Duration,
    },
};

/// How often the flush daemon pushes buffered records to disk.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(30);

/// State guarded by the logger's lock.
struct State {
    /// One slot per severity. If slot `i` is populated, so is every slot
    /// between the severity limit and `i`.
    sinks: [Option<RotatingFile>; Severity::COUNT],
    target: LogTarget,
    console: Console,
}

impl State {
    /// Open every missing sink from `severity` down to `limit`, top-down.
    ///
    /// Either all missing sinks are installed or none are, so a failure
    /// never leaves a gap below a populated slot.
    fn create_sinks(&mut self, severity: Severity, limit: Severity) -> Result<(), LogTierError> {
        if severity < limit {
            return Ok(());
        }
        let range = limit.index()..=severity.index();
        if self.sinks[range.clone()].iter().all(Option::is_some) {
            return Ok(());
        }
        let now = self.target.now();
        let mut created = Vec::new();
        for s in Severity::ALL[range].iter().rev() {
            if self.sinks[s.index()].is_none() {
                created.push((*s, RotatingFile::open(*s, &self.target, &now)?));
            }
        }
        for (s, sink) in created {
            self.sinks[s.index()] = Some(sink);
        }
        Ok(())
    }

    /// Flush and sync every sink from the highest severity down, ignoring
    /// individual failures.
    fn flush_all(&mut self) {
        for sink in self.sinks.iter_mut().rev().flatten() {
            let _ = sink.flush();
            let _ = sink.sync();
        }
        self.console.flush();
    }

    /// Drop every sink; they are reopened lazily on the next write.
    fn reset_sinks(&mut self) {
        self.sinks = Default::default();
    }
}

struct Inner {
    state: Mutex<State>,
    gate: SeverityGate,
    max_size: AtomicU64,
    time_zone: FixedOffset,
    pool: BufferPool,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush(&self) {
        self.lock().flush_all();
    }

    fn header(&self, severity: Severity, file: &str, line: i64) -> Box<Buffer> {
        let mut buf = self.pool.acquire();
        let now = Utc::now().with_timezone(&self.time_zone);
        stamp_header(&mut buf, severity, file, line, &now);
        buf
    }

    /// Write a finished record into the cascade of sinks and the console,
    /// then give the buffer back to the pool.
    fn output(&self, severity: Severity, buf: Box<Buffer>) {
        {
            let mut guard = self.lock();
            let state = &mut *guard;
            if let Err(err) = state.create_sinks(severity, self.gate.get()) {
                eprintln!("Failed to open {} log file: {}", severity, err);
                drop(guard);
                self.pool.release(buf);
                return;
            }

            let data = buf.as_bytes();
            let max_size = self.max_size.load(Ordering::Relaxed);
            for s in &Severity::ALL[..=severity.index()] {
                if let Some(sink) = state.sinks[s.index()].as_mut() {
                    sink.write(data, &state.target, max_size);
                }
            }
            state.console.write(data);
        }
        self.pool.release(buf);

        if severity == Severity::Error {
            self.flush();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner).flush_all();
    }
}

/// A leveled logger writing every record into one file per severity at or
/// below the record's own, plus a console mirror.
///
/// `Logger` is a cheap handle; clones share the same files.
///
/// # Examples
/// ```no_run
/// use logtier::{LoggerBuilder, RotationSize, Severity};
///
/// let logger = LoggerBuilder::new("./logs", "server")
///     .max_file_size(RotationSize::MB(16))
///     .severity_limit(Severity::Info)
///     .build();
///
/// logger.info(&[&"listening on", &8080]);
/// logger.warningf(format_args!("{} connections dropped", 3));
/// logtier::error!(logger, "disk {} is full", "/dev/sda1");
/// ```
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("severity_limit", &self.severity_limit())
            .field("max_file_size", &self.max_file_size())
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Whether a record at `severity` would currently be written.
    #[inline]
    pub fn enabled(&self, severity: Severity) -> bool {
        self.inner.gate.admits(severity)
    }

    /// Write a record with an explicit source location. A trailing newline
    /// is added unless the formatted message already ends with one.
    pub fn log(&self, severity: Severity, file: &str, line: u32, args: fmt::Arguments<'_>) {
        if !self.enabled(severity) {
            return;
        }
        let mut buf = self.inner.header(severity, file, i64::from(line));
        let _ = buf.write_fmt(args);
        if !buf.ends_with_newline() {
            buf.push(b'\n');
        }
        self.inner.output(severity, buf);
    }

    /// Write the values separated by single spaces and terminated by a
    /// newline.
    pub fn log_values(&self, severity: Severity, file: &str, line: u32, values: &[&dyn Display]) {
        if !self.enabled(severity) {
            return;
        }
        let mut buf = self.inner.header(severity, file, i64::from(line));
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                buf.push(b' ');
            }
            let _ = write!(buf, "{value}");
        }
        buf.push(b'\n');
        self.inner.output(severity, buf);
    }

    #[track_caller]
    fn println(&self, severity: Severity, values: &[&dyn Display]) {
        let caller = Location::caller();
        self.log_values(severity, caller.file(), caller.line(), values);
    }

    #[track_caller]
    fn printf(&self, severity: Severity, args: fmt::Arguments<'_>) {
        let caller = Location::caller();
        self.log(severity, caller.file(), caller.line(), args);
    }

    /// Log the values at debug severity.
    #[track_caller]
    pub fn debug(&self, values: &[&dyn Display]) {
        self.println(Severity::Debug, values);
    }

    /// Log the values at info severity.
    #[track_caller]
    pub fn info(&self, values: &[&dyn Display]) {
        self.println(Severity::Info, values);
    }

    /// Log the values at warning severity.
    #[track_caller]
    pub fn warning(&self, values: &[&dyn Display]) {
        self.println(Severity::Warning, values);
    }

    /// Log the values at error severity and flush every file before
    /// returning.
    #[track_caller]
    pub fn error(&self, values: &[&dyn Display]) {
        self.println(Severity::Error, values);
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.printf(Severity::Debug, args);
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.printf(Severity::Info, args);
    }

    #[track_caller]
    pub fn warningf(&self, args: fmt::Arguments<'_>) {
        self.printf(Severity::Warning, args);
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.printf(Severity::Error, args);
    }

    /// Push buffered records of every file to disk, from the error file
    /// down. Failures are ignored so one stuck file cannot hold back the
    /// others.
    pub fn flush(&self) {
        self.inner.flush();
    }

    pub fn severity_limit(&self) -> Severity {
        self.inner.gate.get()
    }

    /// Change the minimum severity. Files that are already open stay open.
    pub fn set_severity_limit(&self, limit: Severity) {
        self.inner.gate.set(limit);
    }

    pub fn max_file_size(&self) -> u64 {
        self.inner.max_size.load(Ordering::Relaxed)
    }

    /// Change the rotation threshold. Meant for configuration before
    /// traffic starts; `0` restores the 4 MiB default.
    pub fn set_max_file_size(&self, bytes: u64) {
        let bytes = if bytes == 0 { DEFAULT_MAX_FILE_SIZE } else { bytes };
        self.inner.max_size.store(bytes, Ordering::Relaxed);
    }

    pub fn log_dir(&self) -> PathBuf {
        self.inner.lock().target.directory.clone()
    }

    /// Move logging to another directory. Open files are flushed and closed;
    /// new ones are created there on the next write.
    pub fn set_log_dir<P: AsRef<Path>>(&self, dir: P) {
        let dir = dir.as_ref();
        let mut state = self.inner.lock();
        if state.target.directory == dir {
            return;
        }
        state.flush_all();
        state.reset_sinks();
        state.target.directory = dir.to_path_buf();
    }

    pub fn log_name(&self) -> String {
        self.inner.lock().target.name.clone()
    }

    /// Change the base file name. Open files are flushed and closed; new
    /// ones are created under the new name on the next write.
    pub fn set_log_name(&self, name: &str) {
        let mut state = self.inner.lock();
        if state.target.name == name {
            return;
        }
        state.flush_all();
        state.reset_sinks();
        state.target.name = name.to_string();
    }

    /// The file currently written for each severity, indexed by
    /// [`Severity::index`].
    pub fn sink_paths(&self) -> [Option<PathBuf>; Severity::COUNT] {
        let state = self.inner.lock();
        std::array::from_fn(|i| state.sinks[i].as_ref().and_then(|s| s.path().map(Path::to_path_buf)))
    }
}

/// Periodically flushes the logger until its last handle is gone.
fn flush_daemon(inner: Weak<Inner>, interval: Duration) {
    loop {
        thread::sleep(interval);
        match inner.upgrade() {
            Some(inner) => inner.flush(),
            None => break,
        }
    }
}

/// Provides a fluent interface for configuring [`Logger`] instances.
///
/// # Default Configuration
///
/// * 4 MiB per file before rotating
/// * Every severity recorded
/// * Local system time zone
/// * Records mirrored to standard error
/// * Flushed every 30 seconds, and after every error record
///
/// # Examples
/// ```no_run
/// use logtier::{Console, LoggerBuilder, RotationSize, Severity, TimeZone};
/// use std::time::Duration;
///
/// let logger = LoggerBuilder::new("/var/log/myapp", "myapp")
///     .max_file_size(RotationSize::MB(100))
///     .severity_limit(Severity::Info)
///     .time_zone(TimeZone::UTC)
///     .flush_interval(Duration::from_secs(5))
///     .console(Console::Disabled)
///     .file_mode(0o640)
///     .build();
/// ```
pub struct LoggerBuilder {
    directory: PathBuf,
    name: String,
    max_size: RotationSize,
    limit: Severity,
    time_zone: TimeZone,
    flush_interval: Duration,
    console: Console,
    file_mode: Option<u32>,
}

impl LoggerBuilder {
    /// Create a new logger builder.
    /// # Arguments
    /// * `directory` - The directory where the log files are stored; created
    ///   on first use if missing.
    /// * `name` - Base name every log file and symlink starts with.
    pub fn new<P: AsRef<Path>>(directory: P, name: &str) -> Self {
        LoggerBuilder {
            directory: directory.as_ref().to_path_buf(),
            name: name.to_string(),
            max_size: RotationSize::default(),
            limit: Severity::Debug,
            time_zone: TimeZone::Local,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            console: Console::Stderr,
            file_mode: None,
        }
    }

    /// Set the size a file may reach before a new one is started.
    pub fn max_file_size(self, max_size: RotationSize) -> Self {
        Self { max_size, ..self }
    }

    /// Set the minimum severity to record.
    pub fn severity_limit(self, limit: Severity) -> Self {
        Self { limit, ..self }
    }

    /// Set the time zone for headers, banners and file names.
    pub fn time_zone(self, time_zone: TimeZone) -> Self {
        Self { time_zone, ..self }
    }

    /// Set how often the background thread flushes the files.
    pub fn flush_interval(self, flush_interval: Duration) -> Self {
        Self { flush_interval, ..self }
    }

    /// Set where records are mirrored besides the files.
    pub fn console(self, console: Console) -> Self {
        Self { console, ..self }
    }

    /// Set the file permissions for log files (Unix-like systems only).
    /// For example, 0o644 for rw-r--r-- permissions.
    pub fn file_mode(self, mode: u32) -> Self {
        Self {
            file_mode: Some(mode),
            ..self
        }
    }

    /// Build the logger and start its flush daemon. No file is created until
    /// the first record is written.
    pub fn build(self) -> Logger {
        let time_zone = self.time_zone.offset();
        let max_size = match self.max_size.bytes() {
            0 => DEFAULT_MAX_FILE_SIZE,
            bytes => bytes,
        };
        let inner = Arc::new(Inner {
            state: Mutex::new(State {
                sinks: Default::default(),
                target: LogTarget {
                    directory: self.directory,
                    name: self.name,
                    time_zone,
                    file_mode: self.file_mode,
                },
                console: self.console,
            }),
            gate: SeverityGate::new(self.limit),
            max_size: AtomicU64::new(max_size),
            time_zone,
            pool: BufferPool::new(),
        });

        let weak = Arc::downgrade(&inner);
        let interval = self.flush_interval;
        if let Err(err) = thread::Builder::new()
            .name("logtier-flush".to_string())
            .spawn(move || flush_daemon(weak, interval))
        {
            eprintln!("Failed to start log flush thread: {}", err);
        }

        Logger { inner }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::{fs, time::Instant}, tempfile::TempDir};

    fn quiet(dir: &TempDir) -> LoggerBuilder {
        LoggerBuilder::new(dir.path(), "unit")
            .console(Console::Disabled)
            .time_zone(TimeZone::UTC)
    }

    fn populated(logger: &Logger) -> Vec<bool> {
        logger.sink_paths().iter().map(Option::is_some).collect()
    }

    #[test]
    fn below_limit_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let logger = quiet(&dir).severity_limit(Severity::Warning).build();
        logger.debug(&[&"dropped"]);
        logger.infof(format_args!("dropped too"));
        assert_eq!(populated(&logger), [false; 4]);
        assert!(!dir.path().join("unit.INFO").exists());
    }

    #[test]
    fn sinks_are_created_top_down_without_gaps() {
        let dir = TempDir::new().unwrap();
        let logger = quiet(&dir).severity_limit(Severity::Info).build();

        logger.warning(&[&"first"]);
        assert_eq!(populated(&logger), [false, true, true, false]);

        logger.error(&[&"second"]);
        assert_eq!(populated(&logger), [false, true, true, true]);

        // Lowering the limit fills the new bottom slot on the next write.
        logger.set_severity_limit(Severity::Debug);
        logger.info(&[&"third"]);
        assert_eq!(populated(&logger), [true, true, true, true]);
    }

    #[test]
    fn values_are_space_separated() {
        let dir = TempDir::new().unwrap();
        let logger = quiet(&dir).build();
        logger.info(&[&"answer", &42, &true]);
        logger.flush();

        let path = logger.sink_paths()[Severity::Info.index()].clone().unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert!(content.ends_with("] answer 42 true\n"));
    }

    #[test]
    fn formatted_message_gets_single_newline() {
        let dir = TempDir::new().unwrap();
        let logger = quiet(&dir).build();
        logger.debugf(format_args!("no newline"));
        logger.debugf(format_args!("has newline\n"));
        logger.flush();

        let path = logger.sink_paths()[Severity::Debug.index()].clone().unwrap();
        let content = fs::read_to_string(path).unwrap();
        let records: Vec<&str> = content.lines().skip(3).collect();
        assert_eq!(records.len(), 2);
        assert!(records[0].ends_with("] no newline"));
        assert!(records[1].ends_with("] has newline"));
    }

    #[test]
    fn header_names_the_calling_file() {
        let dir = TempDir::new().unwrap();
        let logger = quiet(&dir).build();
        let line = line!() + 1;
        logger.warning(&[&"here"]);
        logger.flush();

        let path = logger.sink_paths()[Severity::Warning.index()].clone().unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains(&format!(" W logger.rs:{line}] here\n")));
    }

    #[test]
    fn set_log_name_resets_sinks() {
        let dir = TempDir::new().unwrap();
        let logger = quiet(&dir).build();
        logger.info(&[&"before"]);
        let before = logger.sink_paths();
        assert_eq!(populated(&logger), [true, true, false, false]);

        logger.set_log_name("unit");
        assert_eq!(logger.sink_paths(), before);

        logger.set_log_name("renamed");
        assert_eq!(populated(&logger), [false; 4]);
        assert_eq!(logger.log_name(), "renamed");

        // The old file was flushed before being closed.
        let old = fs::read_to_string(before[Severity::Info.index()].as_ref().unwrap()).unwrap();
        assert!(old.ends_with("] before\n"));

        logger.info(&[&"after"]);
        let after = logger.sink_paths()[Severity::Info.index()].clone().unwrap();
        assert!(after.file_name().unwrap().to_string_lossy().starts_with("renamed.INFO."));
    }

    #[test]
    fn set_log_dir_moves_new_files() {
        let dir = TempDir::new().unwrap();
        let logger = quiet(&dir).build();
        logger.error(&[&"old place"]);

        let moved = dir.path().join("moved");
        logger.set_log_dir(&moved);
        assert_eq!(logger.log_dir(), moved);
        assert_eq!(populated(&logger), [false; 4]);

        logger.error(&[&"new place"]);
        for path in logger.sink_paths().iter().flatten() {
            assert!(path.starts_with(&moved));
        }
    }

    #[test]
    fn max_file_size_zero_restores_default() {
        let dir = TempDir::new().unwrap();
        let logger = quiet(&dir).max_file_size(RotationSize::KB(1)).build();
        assert_eq!(logger.max_file_size(), 1024);
        logger.set_max_file_size(0);
        assert_eq!(logger.max_file_size(), DEFAULT_MAX_FILE_SIZE);
    }

    #[test]
    fn unwritable_directory_drops_record() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"file").unwrap();
        let logger = LoggerBuilder::new(blocker.join("logs"), "unit")
            .console(Console::Disabled)
            .build();

        logger.error(&[&"lost"]);
        assert_eq!(populated(&logger), [false; 4]);
    }

    #[test]
    fn flush_daemon_exits_with_logger() {
        let dir = TempDir::new().unwrap();
        let logger = quiet(&dir).flush_interval(Duration::from_millis(10)).build();
        let weak = Arc::downgrade(&logger.inner);
        logger.info(&[&"buffered"]);
        thread::sleep(Duration::from_millis(100));

        // The daemon flushed without an explicit call.
        let path = logger.sink_paths()[Severity::Info.index()].clone().unwrap();
        assert!(fs::read_to_string(path).unwrap().ends_with("] buffered\n"));

        // The daemon may briefly hold the core while flushing.
        drop(logger);
        let deadline = Instant::now() + Duration::from_secs(1);
        while weak.strong_count() > 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(weak.strong_count(), 0);
    }
}
