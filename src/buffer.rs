//! Pooled scratch buffers used to assemble one record at a time.
use std::{
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
};

/// Buffers whose content reached this length are dropped instead of pooled.
pub const MAX_POOLED_LEN: usize = 512;

const DIGITS: &[u8; 10] = b"0123456789";
const TMP_LEN: usize = 64;

/// A reusable byte accumulator with a small workspace for digit formatting.
///
/// The `next` link is only populated while the buffer sits in a
/// [`BufferPool`] free list.
pub struct Buffer {
    data: Vec<u8>,
    tmp: [u8; TMP_LEN],
    next: Option<Box<Buffer>>,
}

impl Buffer {
    fn new() -> Self {
        Buffer {
            data: Vec::with_capacity(128),
            tmp: [0; TMP_LEN],
            next: None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn reset(&mut self) {
        self.data.clear();
    }

    pub fn push(&mut self, byte: u8) {
        self.data.push(byte);
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn ends_with_newline(&self) -> bool {
        self.data.last() == Some(&b'\n')
    }

    /// Place `byte` at `tmp[i]`.
    pub(crate) fn set_tmp(&mut self, i: usize, byte: u8) {
        self.tmp[i] = byte;
    }

    /// Append `tmp[..n]` to the content.
    pub(crate) fn flush_tmp(&mut self, n: usize) {
        self.data.extend_from_slice(&self.tmp[..n]);
    }

    /// Formats a zero-prefixed two-digit integer at `tmp[i]`.
    pub(crate) fn two_digits(&mut self, i: usize, d: u32) {
        self.tmp[i + 1] = DIGITS[(d % 10) as usize];
        self.tmp[i] = DIGITS[(d / 10 % 10) as usize];
    }

    /// Formats an `n`-digit integer at `tmp[i]`, padding with `pad` on the
    /// left. Digits beyond `n` are cut off.
    pub(crate) fn n_digits(&mut self, n: usize, i: usize, mut d: u32, pad: u8) {
        let mut j = n;
        while j > 0 && d > 0 {
            j -= 1;
            self.tmp[i + j] = DIGITS[(d % 10) as usize];
            d /= 10;
        }
        while j > 0 {
            j -= 1;
            self.tmp[i + j] = pad;
        }
    }

    /// Formats a variable-width integer at `tmp[i]` and returns the number of
    /// digits written.
    pub(crate) fn some_digits(&mut self, i: usize, mut d: u64) -> usize {
        // Print into the top, then copy down.
        let mut j = TMP_LEN;
        loop {
            j -= 1;
            self.tmp[j] = DIGITS[(d % 10) as usize];
            d /= 10;
            if d == 0 {
                break;
            }
        }
        let n = TMP_LEN - j;
        self.tmp.copy_within(j.., i);
        n
    }
}

impl fmt::Write for Buffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.data.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("data", &String::from_utf8_lossy(&self.data))
            .finish_non_exhaustive()
    }
}

/// LIFO free list of [`Buffer`]s.
///
/// The pool has its own lock, held only while a buffer is linked or
/// unlinked, so formatting never waits on file I/O.
#[derive(Default)]
pub struct BufferPool {
    free_list: Mutex<Option<Box<Buffer>>>,
}

impl BufferPool {
    pub const fn new() -> Self {
        BufferPool {
            free_list: Mutex::new(None),
        }
    }

    fn free_list(&self) -> MutexGuard<'_, Option<Box<Buffer>>> {
        self.free_list.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take an empty buffer, recycling one from the free list when possible.
    pub fn acquire(&self) -> Box<Buffer> {
        let recycled = {
            let mut head = self.free_list();
            let mut buf = head.take();
            if let Some(b) = buf.as_mut() {
                *head = b.next.take();
            }
            buf
        };
        match recycled {
            Some(mut buf) => {
                buf.reset();
                buf
            }
            None => Box::new(Buffer::new()),
        }
    }

    /// Hand a buffer back. Buffers that grew to [`MAX_POOLED_LEN`] or beyond
    /// are dropped, which bounds the memory the pool retains.
    pub fn release(&self, mut buf: Box<Buffer>) {
        if buf.len() >= MAX_POOLED_LEN {
            return;
        }
        let mut head = self.free_list();
        buf.next = head.take();
        *head = Some(buf);
    }

    #[cfg(test)]
    fn free_count(&self) -> usize {
        let head = self.free_list();
        let mut count = 0;
        let mut cursor = head.as_deref();
        while let Some(buf) = cursor {
            count += 1;
            cursor = buf.next.as_deref();
        }
        count
    }
}

impl Drop for BufferPool {
    fn drop(&mut self) {
        // Unlink one node at a time instead of recursing through `next`.
        let mut cursor = self.free_list.get_mut().unwrap_or_else(PoisonError::into_inner).take();
        while let Some(mut buf) = cursor {
            cursor = buf.next.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::fmt::Write as _};

    fn digits(buf: &Buffer, n: usize) -> String {
        String::from_utf8(buf.tmp[..n].to_vec()).unwrap()
    }

    #[test]
    fn two_digits_is_zero_padded() {
        let mut buf = Buffer::new();
        for (value, expected) in [(0, "00"), (7, "07"), (10, "10"), (99, "99")] {
            buf.two_digits(0, value);
            assert_eq!(digits(&buf, 2), expected);
        }
    }

    #[test]
    fn n_digits_pads_on_the_left() {
        let mut buf = Buffer::new();
        buf.n_digits(6, 0, 0, b'0');
        assert_eq!(digits(&buf, 6), "000000");
        buf.n_digits(6, 0, 42, b'0');
        assert_eq!(digits(&buf, 6), "000042");
        buf.n_digits(6, 0, 999_999, b'0');
        assert_eq!(digits(&buf, 6), "999999");
        buf.n_digits(4, 0, 7, b' ');
        assert_eq!(digits(&buf, 4), "   7");
    }

    #[test]
    fn some_digits_is_minimal() {
        let mut buf = Buffer::new();
        buf.set_tmp(0, b':');
        let n = buf.some_digits(1, 0);
        assert_eq!(n, 1);
        assert_eq!(digits(&buf, n + 1), ":0");

        let n = buf.some_digits(1, 1234);
        assert_eq!(digits(&buf, n + 1), ":1234");

        let n = buf.some_digits(0, u64::MAX);
        assert_eq!(digits(&buf, n), u64::MAX.to_string());
    }

    #[test]
    fn fmt_write_appends() {
        let mut buf = Buffer::new();
        write!(buf, "{} {}", "a", 1).unwrap();
        assert_eq!(buf.as_bytes(), b"a 1");
        assert!(!buf.ends_with_newline());
        buf.push(b'\n');
        assert!(buf.ends_with_newline());
    }

    #[test]
    fn released_buffer_is_recycled_empty() {
        let pool = BufferPool::new();
        let mut buf = pool.acquire();
        buf.extend_from_slice(b"hello");
        let addr = &*buf as *const Buffer;
        pool.release(buf);
        assert_eq!(pool.free_count(), 1);

        let again = pool.acquire();
        assert_eq!(&*again as *const Buffer, addr);
        assert!(again.is_empty());
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn oversized_buffer_is_dropped() {
        let pool = BufferPool::new();
        let mut buf = pool.acquire();
        buf.extend_from_slice(&[b'x'; MAX_POOLED_LEN]);
        pool.release(buf);
        assert_eq!(pool.free_count(), 0);

        let mut buf = pool.acquire();
        buf.extend_from_slice(&[b'x'; MAX_POOLED_LEN - 1]);
        pool.release(buf);
        assert_eq!(pool.free_count(), 1);
    }

    #[test]
    fn free_list_is_lifo() {
        let pool = BufferPool::new();
        let first = pool.acquire();
        let second = pool.acquire();
        let (a, b) = (&*first as *const Buffer, &*second as *const Buffer);
        pool.release(first);
        pool.release(second);
        assert_eq!(pool.free_count(), 2);
        assert_eq!(&*pool.acquire() as *const Buffer, b);
        assert_eq!(&*pool.acquire() as *const Buffer, a);
    }

    #[test]
    fn concurrent_acquire_release() {
        let pool = std::sync::Arc::new(BufferPool::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let pool = pool.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        let mut buf = pool.acquire();
                        assert!(buf.is_empty());
                        write!(buf, "thread {i}").unwrap();
                        pool.release(buf);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(pool.free_count() <= 8);
    }
}
