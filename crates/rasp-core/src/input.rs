//! Parse sessions over strings, files, and byte streams.
//!
//! Three source modes with one backtracking contract:
//!
//! - **String**: the whole input is in memory and the cursor indexes into it,
//!   so rewinding is a plain position reset.
//! - **File**: bytes are read through a buffered reader and rewinding seeks.
//! - **Stream**: the source cannot seek, so while any mark is live every
//!   freshly-consumed byte is appended to a replay buffer; rewinding resets
//!   the position and subsequent reads are served from the buffer until it is
//!   exhausted. Committing the last mark discards the consumed prefix of the
//!   buffer and keeps any unconsumed tail for future reads.
//!
//! The backtrack counter turns `mark`/`rewind`/`unmark` into no-ops while
//! predictive parsing is active; the suppress counter makes the error
//! constructors return `None` so that `expect` does not pay for diagnostics
//! it is about to replace.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};

use crate::error::ParseError;
use crate::state::State;

pub struct Input {
    filename: String,
    source: Source,
    state: State,
    last: Option<u8>,
    backtrack: i32,
    suppress: i32,
    marks: Vec<Mark>,
}

#[derive(Clone, Copy)]
struct Mark {
    state: State,
    last: Option<u8>,
}

enum Source {
    Text(Vec<u8>),
    File(BufReader<File>),
    Stream {
        inner: BufReader<Box<dyn Read>>,
        replay: Vec<u8>,
        replay_start: usize,
    },
}

impl Input {
    pub fn string(filename: &str, text: &str) -> Input {
        Self::with_source(filename, Source::Text(text.as_bytes().to_vec()))
    }

    pub fn file(filename: &str, file: File) -> Input {
        Self::with_source(filename, Source::File(BufReader::new(file)))
    }

    pub fn stream(filename: &str, reader: Box<dyn Read>) -> Input {
        Self::with_source(
            filename,
            Source::Stream {
                inner: BufReader::new(reader),
                replay: Vec::new(),
                replay_start: 0,
            },
        )
    }

    /// Open a file path as a file-mode session.
    pub fn path(path: &str) -> Result<Input, ParseError> {
        match File::open(path) {
            Ok(file) => Ok(Self::file(path, file)),
            Err(_) => Err(ParseError::fail(path, State::new(), "Unable to open file!")),
        }
    }

    fn with_source(filename: &str, source: Source) -> Input {
        Input {
            filename: filename.to_string(),
            source,
            state: State::new(),
            last: None,
            backtrack: 1,
            suppress: 0,
            marks: Vec::new(),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn last(&self) -> Option<u8> {
        self.last
    }

    /// The next byte, without consuming it. `None` at end of input.
    pub fn peek(&mut self) -> Option<u8> {
        match &mut self.source {
            Source::Text(data) => data.get(self.state.pos).copied(),
            Source::File(file) => file.fill_buf().ok().and_then(|buf| buf.first().copied()),
            Source::Stream {
                inner,
                replay,
                replay_start,
            } => {
                let off = self.state.pos - *replay_start;
                if off < replay.len() {
                    Some(replay[off])
                } else {
                    inner.fill_buf().ok().and_then(|buf| buf.first().copied())
                }
            }
        }
    }

    /// Consume the next byte if it satisfies `cond`; the position is left
    /// unchanged (and the stream unread) otherwise.
    pub fn read_if(&mut self, cond: impl FnOnce(u8) -> bool) -> Option<u8> {
        let byte = self.peek()?;
        if !cond(byte) {
            return None;
        }
        self.consume(byte);
        Some(byte)
    }

    pub fn read_any(&mut self) -> Option<u8> {
        self.read_if(|_| true)
    }

    /// Match a multi-byte literal, rewinding fully on a partial match.
    ///
    /// Uses the ordinary mark/rewind machinery, so under predictive parsing
    /// a partial match is not undone.
    pub fn read_literal(&mut self, literal: &str) -> bool {
        self.mark();
        for &expected in literal.as_bytes() {
            if self.read_if(|b| b == expected).is_none() {
                self.rewind();
                return false;
            }
        }
        self.unmark();
        true
    }

    fn consume(&mut self, byte: u8) {
        match &mut self.source {
            Source::Text(_) => {}
            Source::File(file) => file.consume(1),
            Source::Stream {
                inner,
                replay,
                replay_start,
            } => {
                let off = self.state.pos - *replay_start;
                if off >= replay.len() {
                    inner.consume(1);
                    if !self.marks.is_empty() {
                        if replay.is_empty() {
                            *replay_start = self.state.pos;
                        }
                        replay.push(byte);
                    }
                }
            }
        }
        self.last = Some(byte);
        self.state.advance(byte);
    }

    /// Save the current position for a later `rewind` or `unmark`.
    pub fn mark(&mut self) {
        if self.backtrack < 1 {
            return;
        }
        self.marks.push(Mark {
            state: self.state,
            last: self.last,
        });
        if self.marks.len() == 1
            && let Source::Stream {
                replay,
                replay_start,
                ..
            } = &mut self.source
            && self.state.pos >= *replay_start + replay.len()
        {
            replay.clear();
            *replay_start = self.state.pos;
        }
    }

    /// Commit (discard) the most recent mark without moving.
    pub fn unmark(&mut self) {
        if self.backtrack < 1 {
            return;
        }
        self.marks.pop();
        if self.marks.is_empty()
            && let Source::Stream {
                replay,
                replay_start,
                ..
            } = &mut self.source
        {
            let consumed = self
                .state
                .pos
                .saturating_sub(*replay_start)
                .min(replay.len());
            replay.drain(..consumed);
            *replay_start += consumed;
        }
    }

    /// Pop the most recent mark and restore its position.
    pub fn rewind(&mut self) {
        if self.backtrack < 1 {
            return;
        }
        if let Some(mark) = self.marks.last().copied() {
            self.state = mark.state;
            self.last = mark.last;
            if let Source::File(file) = &mut self.source {
                let _ = file.seek(SeekFrom::Start(self.state.pos as u64));
            }
        }
        self.unmark();
    }

    pub fn backtrack_disable(&mut self) {
        self.backtrack -= 1;
    }

    pub fn backtrack_enable(&mut self) {
        self.backtrack += 1;
    }

    pub fn suppress_enable(&mut self) {
        self.suppress += 1;
    }

    pub fn suppress_disable(&mut self) {
        self.suppress -= 1;
    }

    /// True before anything has been consumed.
    pub fn at_soi(&self) -> bool {
        self.last.is_none()
    }

    /// True at end of input; matches at most once per position.
    pub fn at_eoi(&mut self) -> bool {
        if self.state.term {
            false
        } else if self.peek().is_none() {
            self.state.term = true;
            true
        } else {
            false
        }
    }

    /// Evaluate a zero-width anchor over (last consumed, next) bytes.
    pub fn anchor(&mut self, cond: fn(Option<u8>, Option<u8>) -> bool) -> bool {
        let next = self.peek();
        cond(self.last, next)
    }

    /// An expectation-mismatch error at the current position, or `None`
    /// while suppression is active.
    pub fn err_expected(&mut self, label: &str) -> Option<ParseError> {
        if self.suppress > 0 {
            return None;
        }
        let received = self.peek();
        Some(ParseError::expected(
            &self.filename,
            self.state,
            label,
            received,
        ))
    }

    /// A fatal failure at the current position, or `None` while suppression
    /// is active.
    pub fn err_fail(&mut self, message: &str) -> Option<ParseError> {
        if self.suppress > 0 {
            return None;
        }
        Some(ParseError::fail(&self.filename, self.state, message))
    }
}
