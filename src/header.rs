//! Record header formatting.
//!
//! Every record starts with `[MM-DD hh:mm:ss.uuuuuu L file:line] `. The
//! layout is fixed, so the digits are written by hand into the buffer's
//! workspace rather than going through `format!`.
use {
    crate::{buffer::Buffer, Severity},
    chrono::{DateTime, Datelike, FixedOffset, Timelike},
};

/// Reduce a source path to its last `/`-separated segment.
pub fn short_file(file: &str) -> &str {
    match file.rfind('/') {
        Some(slash) => &file[slash + 1..],
        None => file,
    }
}

/// Stamp the header for a record into `buf`.
///
/// # Arguments
/// * `buf` - The scratch buffer, normally freshly acquired from the pool.
/// * `severity` - The record's severity.
/// * `file` - Source location; only the last path segment is written.
/// * `line` - Source line; negative values are written as `0`.
/// * `now` - The record's timestamp.
pub fn stamp_header(buf: &mut Buffer, severity: Severity, file: &str, line: i64, now: &DateTime<FixedOffset>) {
    let line = line.max(0) as u64;
    // Leap seconds report nanoseconds past one billion.
    let micros = (now.nanosecond() % 1_000_000_000) / 1000;

    // [mm-dd hh:mm:ss.uuuuuu L file:line]
    buf.set_tmp(0, b'[');
    buf.two_digits(1, now.month());
    buf.set_tmp(3, b'-');
    buf.two_digits(4, now.day());
    buf.set_tmp(6, b' ');
    buf.two_digits(7, now.hour());
    buf.set_tmp(9, b':');
    buf.two_digits(10, now.minute());
    buf.set_tmp(12, b':');
    buf.two_digits(13, now.second());
    buf.set_tmp(15, b'.');
    buf.n_digits(6, 16, micros, b'0');
    buf.set_tmp(22, b' ');
    buf.set_tmp(23, severity.as_char());
    buf.set_tmp(24, b' ');
    buf.flush_tmp(25);

    buf.extend_from_slice(short_file(file).as_bytes());

    buf.set_tmp(0, b':');
    let n = buf.some_digits(1, line);
    buf.set_tmp(n + 1, b']');
    buf.set_tmp(n + 2, b' ');
    buf.flush_tmp(n + 3);
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::buffer::BufferPool,
        chrono::{NaiveDate, TimeZone},
    };

    fn at(month: u32, day: u32, h: u32, m: u32, s: u32, micro: u32) -> DateTime<FixedOffset> {
        let naive = NaiveDate::from_ymd_opt(2024, month, day)
            .unwrap()
            .and_hms_micro_opt(h, m, s, micro)
            .unwrap();
        FixedOffset::east_opt(0).unwrap().from_local_datetime(&naive).unwrap()
    }

    fn header(severity: Severity, file: &str, line: i64, now: DateTime<FixedOffset>) -> String {
        let pool = BufferPool::new();
        let mut buf = pool.acquire();
        stamp_header(&mut buf, severity, file, line, &now);
        String::from_utf8(buf.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn short_file_keeps_last_segment() {
        assert_eq!(short_file("src/net/server.rs"), "server.rs");
        assert_eq!(short_file("main.rs"), "main.rs");
        assert_eq!(short_file("dir/"), "");
    }

    #[test]
    fn header_layout() {
        let now = at(3, 7, 9, 5, 1, 42);
        assert_eq!(
            header(Severity::Warning, "src/server.rs", 118, now),
            "[03-07 09:05:01.000042 W server.rs:118] "
        );
    }

    #[test]
    fn numeric_fields_keep_fixed_width() {
        assert_eq!(
            header(Severity::Debug, "a.rs", 0, at(1, 1, 0, 0, 0, 0)),
            "[01-01 00:00:00.000000 D a.rs:0] "
        );
        assert_eq!(
            header(Severity::Error, "a.rs", 99, at(12, 31, 23, 59, 59, 999_999)),
            "[12-31 23:59:59.999999 E a.rs:99] "
        );
    }

    #[test]
    fn negative_line_is_clamped() {
        assert_eq!(
            header(Severity::Info, "x/y.rs", -12, at(6, 15, 12, 30, 45, 500_000)),
            "[06-15 12:30:45.500000 I y.rs:0] "
        );
    }

    #[test]
    fn only_timestamp_differs_between_instants() {
        let first = header(Severity::Info, "lib.rs", 7, at(2, 2, 2, 2, 2, 2));
        let second = header(Severity::Info, "lib.rs", 7, at(11, 28, 19, 48, 37, 123_456));
        assert_eq!(first.len(), second.len());
        assert_eq!(first[..1], second[..1]);
        assert_eq!(first[22..], second[22..]);
        assert_ne!(first[1..22], second[1..22]);
    }
}
