#![allow(dead_code)]

use {
    logtier::{Console, Logger, LoggerBuilder, Severity, TimeZone},
    std::{
        fs,
        io::{self, Write},
        sync::{Arc, Mutex},
    },
    tempfile::TempDir,
};

/// Lines in the file banner preceding the first record.
pub const BANNER_LINES: usize = 3;

/// Console writer that keeps everything in memory.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes).lines().map(str::to_string).collect()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A logger writing into `dir` with its console captured.
pub fn capturing_logger(dir: &TempDir, name: &str) -> (Logger, Capture) {
    let capture = Capture::default();
    let logger = LoggerBuilder::new(dir.path(), name)
        .time_zone(TimeZone::UTC)
        .console(Console::Writer(Box::new(capture.clone())))
        .build();
    (logger, capture)
}

/// The record lines of the file currently written for `severity`, or
/// `None` if that sink was never opened.
pub fn records(logger: &Logger, severity: Severity) -> Option<Vec<String>> {
    logger.flush();
    let path = logger.sink_paths()[severity.index()].clone()?;
    Some(records_in(&path))
}

pub fn records_in(path: &std::path::Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .skip(BANNER_LINES)
        .map(str::to_string)
        .collect()
}
