//! Parse errors and the farthest-failure merge rule.
//!
//! An error has one of two shapes: an *expectation mismatch* (a deduplicated,
//! insertion-ordered set of labels plus the byte actually seen) or a *fatal
//! failure* carrying a single message (undefined parser, depth exceeded,
//! rejected check, ...). When two errors meet - alternation, repetition
//! tails, the ambient tracker - the one that reached furthest into the input
//! wins outright; on a tie a fatal failure beats label sets, and label sets
//! union in first-seen order.

use std::fmt;

use indexmap::IndexSet;

use crate::state::State;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ParseError {
    pub filename: String,
    pub state: State,
    /// Expectation labels, deduplicated, in first-seen order.
    pub expected: IndexSet<String>,
    /// Fatal failure message; mutually exclusive with `expected`.
    pub failure: Option<String>,
    /// The byte at the failure position; `None` at end of input.
    pub received: Option<u8>,
}

impl ParseError {
    /// An expectation mismatch with a single label.
    pub fn expected(filename: &str, state: State, label: &str, received: Option<u8>) -> Self {
        let mut expected = IndexSet::new();
        expected.insert(label.to_string());
        Self {
            filename: filename.to_string(),
            state,
            expected,
            failure: None,
            received,
        }
    }

    /// A fatal failure.
    pub fn fail(filename: &str, state: State, message: &str) -> Self {
        Self {
            filename: filename.to_string(),
            state,
            expected: IndexSet::new(),
            failure: Some(message.to_string()),
            received: None,
        }
    }

    /// The error reported when a parse fails without ever constructing a
    /// diagnostic (every path ran under suppression).
    pub fn unknown(filename: &str) -> Self {
        Self::fail(filename, State::new(), "Unknown Error")
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }

    /// Merge two optional errors, preferring the one that reached furthest.
    ///
    /// Suppressed error construction yields `None`, which merges as a no-op.
    pub fn merge(a: Option<ParseError>, b: Option<ParseError>) -> Option<ParseError> {
        match (a, b) {
            (None, b) => b,
            (a, None) => a,
            (Some(a), Some(b)) => Some(a.merge_with(b)),
        }
    }

    /// Farthest-failure merge of two errors.
    ///
    /// Strictly-furthest wins. On a tie, the first fatal failure wins;
    /// otherwise label sets union in first-seen order and the received byte
    /// of the later error is kept.
    pub fn merge_with(mut self, other: ParseError) -> ParseError {
        if self.state.pos != other.state.pos {
            return if self.state.pos > other.state.pos {
                self
            } else {
                other
            };
        }
        if self.failure.is_some() {
            return self;
        }
        if other.failure.is_some() {
            return other;
        }
        self.received = other.received;
        for label in other.expected {
            self.expected.insert(label);
        }
        self
    }

    /// Compress the expectation set under a repetition prefix, turning e.g.
    /// `{digit}` into `{one or more of digit}` and `{a, b}` into
    /// `{<prefix>a or b}`.
    pub fn prefix_expected(mut self, prefix: &str) -> ParseError {
        match self.expected.len() {
            0 => {
                self.expected.insert(String::new());
            }
            1 => {
                let only = self.expected.swap_remove_index(0).unwrap_or_default();
                self.expected.insert(format!("{prefix}{only}"));
            }
            _ => {
                let joined = format!("{prefix}{}", join_labels(&self.expected));
                self.expected.clear();
                self.expected.insert(joined);
            }
        }
        self
    }

    /// The message portion of the rendering, without the file/position
    /// prefix.
    pub fn message(&self) -> String {
        if let Some(failure) = &self.failure {
            return failure.clone();
        }
        format!(
            "expected {} at {}",
            join_labels(&self.expected),
            received_name(self.received)
        )
    }
}

fn join_labels(labels: &IndexSet<String>) -> String {
    match labels.len() {
        0 => "ERROR: NOTHING EXPECTED".to_string(),
        1 => labels[0].clone(),
        n => {
            let mut out = String::new();
            for label in labels.iter().take(n - 2) {
                out.push_str(label);
                out.push_str(", ");
            }
            out.push_str(&labels[n - 2]);
            out.push_str(" or ");
            out.push_str(&labels[n - 1]);
            out
        }
    }
}

/// Human-readable name for the byte at a failure position.
pub fn received_name(byte: Option<u8>) -> String {
    match byte {
        None | Some(0) => "end of input".to_string(),
        Some(0x07) => "bell".to_string(),
        Some(0x08) => "backspace".to_string(),
        Some(0x0C) => "formfeed".to_string(),
        Some(b'\r') => "carriage return".to_string(),
        Some(0x0B) => "vertical tab".to_string(),
        Some(b'\n') => "newline".to_string(),
        Some(b'\t') => "tab".to_string(),
        Some(b' ') => "space".to_string(),
        Some(c) => format!("'{}'", c as char),
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(failure) = &self.failure {
            return write!(f, "{}: error: {}", self.filename, failure);
        }
        write!(
            f,
            "{}:{}:{}: error: {}",
            self.filename,
            self.state.line(),
            self.state.column(),
            self.message()
        )
    }
}

impl std::error::Error for ParseError {}
