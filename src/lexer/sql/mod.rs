//! `CREATE TABLE` extraction from SQL dumps (backquoted table names, as
//! written by `mysqldump`).
//!
//! Only single-quoted literals, `/* ... */` and `-- ...` comments are
//! recognized: this is not a SQL tokenizer. Nested block comments and escaped
//! quotes (`''`, `\'`) are not supported.
pub use fallible_iterator::FallibleIterator;
use log::{debug, warn};
use memchr::memchr;

use std::fmt;
use std::io::{Read, Write};

use crate::lexer::{Window, WindowConfig};

mod error;

pub use error::Error;

/// Longest table name kept: longer names are truncated.
pub const MAX_TABLE_NAME_LEN: usize = 64;
/// Longest possible search target
pub const MAX_TARGET_LEN: usize = TARGET_PREFIX.len() + MAX_TABLE_NAME_LEN + TARGET_SUFFIX.len();

const TARGET_PREFIX: &[u8] = b"CREATE TABLE `";
const TARGET_SUFFIX: &[u8] = b"` (";
const QUOTE: u8 = b'\'';
const NEWLINE: u8 = b'\n';
const SEMI: u8 = b';';

const _: () = assert!(WindowConfig::DEFAULT.guarantees(MAX_TARGET_LEN));

/// The ``CREATE TABLE `name` (`` byte sequence searched for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pattern: Vec<u8>,
}

impl Target {
    /// Build the target from a table name.
    ///
    /// Leading whitespace is skipped and the name stops at the first
    /// whitespace byte. Names longer than [`MAX_TABLE_NAME_LEN`] bytes are
    /// truncated.
    pub fn new(table: &[u8]) -> Result<Target, Error> {
        let start = table
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(table.len());
        let table = &table[start..];
        let len = table
            .iter()
            .position(u8::is_ascii_whitespace)
            .unwrap_or(table.len());
        if len == 0 {
            return Err(Error::EmptyTableName);
        }
        if len < table.len() {
            warn!("ignoring text after table name");
        }
        let name = if len > MAX_TABLE_NAME_LEN {
            warn!("table name truncated to {MAX_TABLE_NAME_LEN} bytes");
            &table[..MAX_TABLE_NAME_LEN]
        } else {
            &table[..len]
        };
        let mut pattern = Vec::with_capacity(TARGET_PREFIX.len() + name.len() + TARGET_SUFFIX.len());
        pattern.extend_from_slice(TARGET_PREFIX);
        pattern.extend_from_slice(name);
        pattern.extend_from_slice(TARGET_SUFFIX);
        Ok(Target { pattern })
    }

    /// Bytes to match
    pub fn as_bytes(&self) -> &[u8] {
        &self.pattern
    }

    /// Table name, possibly truncated
    pub fn name(&self) -> &[u8] {
        &self.pattern[TARGET_PREFIX.len()..self.pattern.len() - TARGET_SUFFIX.len()]
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", String::from_utf8_lossy(self.name()))
    }
}

/// Lexical context of the byte being examined
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Context {
    /// Outside of literals and comments
    #[default]
    Code,
    /// Inside a single-quoted literal
    Quote,
    /// Inside `/* ... */`
    BlockComment,
    /// Inside `-- ...`, up to the end of line
    LineComment,
}

/// Byte by byte state machine deciding which bytes belong to the wanted
/// statement.
#[derive(Debug)]
pub struct Matcher {
    target: Target,
    context: Context,
    /// cleared once the target has been seen, never set again
    searching: bool,
    /// set while inside the matched statement
    found: bool,
    /// previous byte examined
    last: u8,
}

impl Matcher {
    /// Matcher looking for `target`
    pub fn new(target: Target) -> Matcher {
        Matcher {
            target,
            context: Context::Code,
            searching: true,
            found: false,
            last: NEWLINE,
        }
    }

    /// What is searched
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Current lexical context
    pub fn context(&self) -> Context {
        self.context
    }

    /// `true` until the target has been found
    pub fn is_searching(&self) -> bool {
        self.searching
    }

    /// `true` while the examined bytes belong to the matched statement
    pub fn is_found(&self) -> bool {
        self.found
    }

    /// Examine `data[0]`, `data` being all the unread bytes available.
    ///
    /// Literal and comment boundaries take precedence over the target and the
    /// statement terminator, so neither is recognized inside a literal or a
    /// comment.
    /// Return `true` when `data[0]` is the first byte following the `;` of the
    /// matched statement.
    ///
    /// # Panics
    ///
    /// If `data` is empty.
    pub fn advance(&mut self, data: &[u8]) -> bool {
        assert!(!data.is_empty(), "advance on empty data");
        let c = data[0];
        let mut terminated = false;
        match self.context {
            Context::Code if c == QUOTE => self.context = Context::Quote,
            Context::Code | Context::BlockComment if data.starts_with(b"/*") => {
                self.context = Context::BlockComment;
            }
            Context::Code | Context::LineComment if data.starts_with(b"--") => {
                self.context = Context::LineComment;
            }
            Context::Quote => {
                if c == QUOTE {
                    self.context = Context::Code;
                }
            }
            Context::BlockComment => {
                if data.starts_with(b"*/") {
                    self.context = Context::Code;
                }
            }
            Context::LineComment => {
                if c == NEWLINE {
                    self.context = Context::Code;
                }
            }
            Context::Code => {
                if self.searching && data.starts_with(self.target.as_bytes()) {
                    self.found = true;
                    self.searching = false;
                } else if self.found && self.last == SEMI {
                    self.found = false;
                    terminated = true;
                }
            }
        }
        self.last = c;
        terminated
    }

    /// Number of leading bytes of `data` that can neither change the
    /// context nor be emitted.
    pub fn inert_len(&self, data: &[u8]) -> usize {
        if self.found {
            return 0;
        }
        let stop = match self.context {
            Context::Code => return 0,
            Context::Quote => QUOTE,
            Context::BlockComment => b'*',
            Context::LineComment => NEWLINE,
        };
        memchr(stop, data).unwrap_or(data.len())
    }

    /// Step over a run measured by [`Matcher::inert_len`].
    pub fn skip(&mut self, run: &[u8]) {
        debug_assert_eq!(run.len(), self.inert_len(run));
        if let Some(&b) = run.last() {
            self.last = b;
        }
    }

    /// Signal end of input.
    /// Return `true` when the last byte was the `;` of the matched statement.
    pub fn finish(&mut self) -> bool {
        if self.found && self.last == SEMI {
            self.found = false;
            return true;
        }
        false
    }
}

/// Outcome of one extraction step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Byte of the matched statement
    Emit(u8),
    /// Number of bytes consumed without output
    Discard(usize),
    /// The matched statement is complete: a newline must be written.
    /// The byte consumed by this step, if any, is not part of the output.
    EndOfStatement,
}

/// Stream the matched statement out of a SQL dump.
///
/// Memory use is bounded by the window capacity, whatever the input size.
pub struct Extractor<R> {
    window: Window<R>,
    matcher: Matcher,
    done: bool,
}

impl<R: Read> Extractor<R> {
    /// Extractor with the default window
    pub fn new(input: R, target: Target) -> Extractor<R> {
        Self::build(input, target, WindowConfig::DEFAULT)
    }

    /// Extractor with a custom window.
    ///
    /// Fail if the window cannot always expose the whole target.
    pub fn with_config(input: R, target: Target, config: WindowConfig) -> Result<Extractor<R>, Error> {
        let lookahead = target.as_bytes().len();
        if !config.guarantees(lookahead) {
            return Err(Error::WindowTooSmall {
                capacity: config.capacity,
                shift: config.shift,
                lookahead,
            });
        }
        Ok(Self::build(input, target, config))
    }

    fn build(input: R, target: Target, config: WindowConfig) -> Extractor<R> {
        debug!(target: "matcher", "searching {} with {:?}", target, config);
        Extractor {
            window: Window::with_config(input, config),
            matcher: Matcher::new(target),
            done: false,
        }
    }
}

impl<R> Extractor<R> {
    /// Current line number (1-based)
    pub fn line(&self) -> u64 {
        self.window.line()
    }

    /// Number of bytes consumed so far
    pub fn offset(&self) -> u64 {
        self.window.offset()
    }

    /// `true` once the target has been found
    pub fn matched(&self) -> bool {
        !self.matcher.is_searching()
    }

    /// Scanner state
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }
}

impl<R: Read> FallibleIterator for Extractor<R> {
    type Item = Step;
    type Error = Error;

    fn next(&mut self) -> Result<Option<Step>, Error> {
        if self.done {
            return Ok(None);
        }
        if !self.window.ensure_data()? {
            self.done = true;
            if self.matcher.finish() {
                debug!(target: "matcher", "statement ends at end of input");
                return Ok(Some(Step::EndOfStatement));
            }
            if self.matcher.is_found() {
                warn!(
                    "end of input inside CREATE TABLE {}, statement not terminated",
                    self.matcher.target()
                );
            }
            return Ok(None);
        }
        let data = self.window.remaining();
        let inert = self.matcher.inert_len(data);
        if inert > 0 {
            self.matcher.skip(&data[..inert]);
            self.window.consume(inert);
            return Ok(Some(Step::Discard(inert)));
        }
        let searching = self.matcher.is_searching();
        let terminated = self.matcher.advance(data);
        if searching && !self.matcher.is_searching() {
            debug!(target: "matcher", "found {} at line {}", self.matcher.target(), self.window.line());
        }
        let byte = self.window.pop();
        if terminated {
            debug!(target: "matcher", "statement ends at line {}", self.window.line());
            return Ok(Some(Step::EndOfStatement));
        }
        Ok(Some(if self.matcher.is_found() {
            Step::Emit(byte)
        } else {
            Step::Discard(1)
        }))
    }
}

/// Copy the `CREATE TABLE` statement of `target` from `input` to `output`,
/// followed by a newline.
/// Return `false` if the table was not found.
pub fn extract<R: Read, W: Write>(
    input: R,
    target: Target,
    mut output: W,
    config: WindowConfig,
) -> Result<bool, Error> {
    let mut extractor = Extractor::with_config(input, target, config)?;
    while let Some(step) = extractor.next()? {
        match step {
            Step::Emit(byte) => output.write_all(&[byte])?,
            Step::Discard(_) => {}
            Step::EndOfStatement => output.write_all(&[NEWLINE])?,
        }
    }
    Ok(extractor.matched())
}
