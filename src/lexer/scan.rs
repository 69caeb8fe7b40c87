//! Fixed-capacity lookahead window over a byte stream.
//!
//! Unlike a `BufReader`, the unread region is guaranteed to hold at least
//! `capacity - shift` bytes (until end of input), so multi-byte patterns can
//! be compared in place without being split by a refill.

use log::debug;
use memchr::memchr_iter;

use std::fmt;
use std::io::{self, Read};

/// Capacity and compaction shift of a [`Window`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowConfig {
    /// Number of bytes the window can hold
    pub capacity: usize,
    /// Unread bytes are moved back to offset 0 once more than `shift` bytes
    /// have been consumed from the front.
    pub shift: usize,
}

impl WindowConfig {
    /// 16K window, compacted every 4K
    pub const DEFAULT: WindowConfig = WindowConfig::new(16384, 4096);

    /// Window of `capacity` bytes compacted every `shift` bytes
    pub const fn new(capacity: usize, shift: usize) -> WindowConfig {
        WindowConfig { capacity, shift }
    }

    /// Unread size under which the window may be compacted
    pub const fn cutoff(&self) -> usize {
        self.capacity.saturating_sub(self.shift)
    }

    /// Check that, before end of input, the unread region never holds fewer
    /// than `lookahead` bytes.
    pub const fn guarantees(&self, lookahead: usize) -> bool {
        self.shift > 0 && self.shift < self.capacity && self.cutoff() >= lookahead
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Bounded buffer holding the not yet consumed part of the input.
///
/// Bytes `[begin, end)` of `buf` are unread. Refills append at `end`,
/// compaction moves the unread bytes down to offset 0.
pub struct Window<R> {
    /// The reader provided by the client.
    inner: R,
    buf: Box<[u8]>,
    /// next unread byte
    begin: usize,
    /// one past the last buffered byte
    end: usize,
    shift: usize,
    eof: bool,
    /// line of the next unread byte
    line: u64,
    /// number of bytes consumed so far
    offset: u64,
}

impl<R: Read> Window<R> {
    /// Window with the default configuration
    pub fn new(inner: R) -> Window<R> {
        Self::with_config(inner, WindowConfig::DEFAULT)
    }

    /// # Panics
    ///
    /// If `shift` is zero or not smaller than `capacity`: such a window
    /// would stop refilling once full.
    pub fn with_config(inner: R, config: WindowConfig) -> Window<R> {
        assert!(
            config.shift > 0 && config.shift < config.capacity,
            "invalid window configuration: {config:?}"
        );
        Window {
            inner,
            buf: vec![0; config.capacity].into_boxed_slice(),
            begin: 0,
            end: 0,
            shift: config.shift,
            eof: false,
            line: 1,
            offset: 0,
        }
    }

    /// Make sure there is at least one unread byte, unless the input is
    /// exhausted.
    /// Return `false` when nothing is left to scan.
    pub fn ensure_data(&mut self) -> io::Result<bool> {
        if self.size() < self.cutoff() && self.begin > self.shift {
            self.compact();
        }
        while !self.eof && self.end < self.buf.len() {
            match self.inner.read(&mut self.buf[self.end..]) {
                Ok(0) => {
                    debug!(target: "window", "end of input after {} bytes", self.offset + self.size() as u64);
                    self.eof = true;
                }
                Ok(n) => {
                    self.end += n;
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    return Err(e);
                }
            }
        }
        Ok(self.size() > 0)
    }

    /// Shift the unread region to the start of the buffer.
    fn compact(&mut self) {
        debug!(target: "window", "compact(begin: {}, size: {})", self.begin, self.size());
        self.buf.copy_within(self.begin..self.end, 0);
        self.end -= self.begin;
        self.begin = 0;
    }
}

impl<R> Window<R> {
    fn cutoff(&self) -> usize {
        self.buf.len() - self.shift
    }

    /// Number of unread bytes
    pub fn size(&self) -> usize {
        self.end - self.begin
    }

    /// Total number of bytes the window can hold
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// `true` once the reader has returned end of input
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Unread bytes
    pub fn remaining(&self) -> &[u8] {
        &self.buf[self.begin..self.end]
    }

    /// Next unread byte, not consumed.
    ///
    /// # Panics
    ///
    /// If the window is empty.
    pub fn peek(&self) -> u8 {
        assert!(self.begin < self.end, "peek on an empty window");
        self.buf[self.begin]
    }

    /// Check whether the unread bytes start with `pattern`.
    /// A shorter remainder never matches.
    pub fn starts_with(&self, pattern: &[u8]) -> bool {
        self.remaining().starts_with(pattern)
    }

    /// Consume and return the next unread byte.
    ///
    /// # Panics
    ///
    /// If the window is empty.
    pub fn pop(&mut self) -> u8 {
        let byte = self.peek();
        if byte == b'\n' {
            self.line += 1;
        }
        self.begin += 1;
        self.offset += 1;
        byte
    }

    /// Consume `amt` unread bytes.
    ///
    /// # Panics
    ///
    /// If fewer than `amt` bytes are buffered.
    pub fn consume(&mut self, amt: usize) {
        assert!(amt <= self.size(), "consume({amt}) past the end of the window");
        let consumed = &self.buf[self.begin..self.begin + amt];
        self.line += memchr_iter(b'\n', consumed).count() as u64;
        self.begin += amt;
        self.offset += amt as u64;
    }

    /// Current line number (1-based)
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Number of bytes consumed since the start of input
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl<R> fmt::Debug for Window<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("capacity", &self.buf.len())
            .field("begin", &self.begin)
            .field("end", &self.end)
            .field("eof", &self.eof)
            .field("line", &self.line)
            .finish()
    }
}
