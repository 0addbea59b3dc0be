//! The recursive parse engine.
//!
//! A single evaluator dispatches on node kind, threading an explicit
//! recursion-depth counter (and an optional step budget) so deeply
//! recursive grammars fail with an ordinary error instead of exhausting the
//! call stack. One [`Input`] session is owned per top-level parse call;
//! every discarded intermediate value from a losing path is dropped exactly
//! once as the engine unwinds.
//!
//! Failures are threaded two ways, mirroring the merge rule: composite
//! nodes return the error of the branch that failed, while alternation and
//! repetition tails merge into an ambient farthest-failure tracker that is
//! folded into the final diagnostic when the whole parse fails.

use std::fs::File;
use std::io::Read;

use rasp_core::{Input, ParseError};

use crate::graph::{Kind, Parser, Parsers};
use crate::value::Value;

#[cfg(test)]
mod engine_tests;

/// Runtime limits for a parse call.
#[derive(Clone, Copy, Debug)]
pub struct Limits {
    exec_fuel: Option<u32>,
    recursion_limit: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            exec_fuel: None,
            recursion_limit: 1000,
        }
    }
}

impl Limits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the total number of evaluation steps.
    pub fn exec_fuel(mut self, fuel: u32) -> Self {
        self.exec_fuel = Some(fuel);
        self
    }

    /// Bound the evaluator recursion depth.
    pub fn recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn get_exec_fuel(&self) -> Option<u32> {
        self.exec_fuel
    }

    pub fn get_recursion_limit(&self) -> u32 {
        self.recursion_limit
    }
}

/// Runs parsers from a graph against input sessions.
pub struct Engine<'g> {
    graph: &'g Parsers,
    limits: Limits,
}

impl<'g> Engine<'g> {
    pub fn new(graph: &'g Parsers) -> Self {
        Self {
            graph,
            limits: Limits::default(),
        }
    }

    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn parse(&self, filename: &str, text: &str, p: Parser) -> Result<Value, ParseError> {
        let mut input = Input::string(filename, text);
        self.parse_input(&mut input, p)
    }

    pub fn parse_file(&self, filename: &str, file: File, p: Parser) -> Result<Value, ParseError> {
        let mut input = Input::file(filename, file);
        self.parse_input(&mut input, p)
    }

    pub fn parse_stream(
        &self,
        filename: &str,
        reader: impl Read + 'static,
        p: Parser,
    ) -> Result<Value, ParseError> {
        let mut input = Input::stream(filename, Box::new(reader));
        self.parse_input(&mut input, p)
    }

    /// Open and parse a file path.
    pub fn parse_path(&self, path: &str, p: Parser) -> Result<Value, ParseError> {
        let mut input = Input::path(path)?;
        self.parse_input(&mut input, p)
    }

    pub fn parse_input(&self, input: &mut Input, p: Parser) -> Result<Value, ParseError> {
        let mut session = Session {
            graph: self.graph,
            input: &mut *input,
            ambient: None,
            fuel: self.limits.exec_fuel,
            recursion_limit: self.limits.recursion_limit,
        };
        let outcome = session.run(p, 0);
        let ambient = session.ambient.take();
        match outcome {
            Ok(value) => Ok(value),
            Err(error) => Err(ParseError::merge(ambient, error)
                .unwrap_or_else(|| ParseError::unknown(input.filename()))),
        }
    }
}

impl Parsers {
    pub fn parse(&self, filename: &str, text: &str, p: Parser) -> Result<Value, ParseError> {
        Engine::new(self).parse(filename, text, p)
    }

    pub fn parse_file(&self, filename: &str, file: File, p: Parser) -> Result<Value, ParseError> {
        Engine::new(self).parse_file(filename, file, p)
    }

    pub fn parse_stream(
        &self,
        filename: &str,
        reader: impl Read + 'static,
        p: Parser,
    ) -> Result<Value, ParseError> {
        Engine::new(self).parse_stream(filename, reader, p)
    }

    pub fn parse_path(&self, path: &str, p: Parser) -> Result<Value, ParseError> {
        Engine::new(self).parse_path(path, p)
    }

    pub fn parse_input(&self, input: &mut Input, p: Parser) -> Result<Value, ParseError> {
        Engine::new(self).parse_input(input, p)
    }
}

/// `Err(None)` is a failure whose diagnostic was suppressed (or, for bare
/// primitives, left for an enclosing `expect` to construct).
type Step = Result<Value, Option<ParseError>>;

struct Session<'g, 'i> {
    graph: &'g Parsers,
    input: &'i mut Input,
    ambient: Option<ParseError>,
    fuel: Option<u32>,
    recursion_limit: u32,
}

fn byte_value(byte: u8) -> Value {
    Value::Str((byte as char).to_string())
}

impl<'g> Session<'g, '_> {
    fn merge_ambient(&mut self, error: Option<ParseError>) {
        self.ambient = ParseError::merge(self.ambient.take(), error);
    }

    fn run(&mut self, p: Parser, depth: u32) -> Step {
        if depth >= self.recursion_limit {
            return Err(self.input.err_fail("Maximum recursion depth exceeded!"));
        }
        if let Some(fuel) = &mut self.fuel {
            if *fuel == 0 {
                return Err(self.input.err_fail("Maximum parse steps exceeded!"));
            }
            *fuel -= 1;
        }

        let graph = self.graph;
        match graph.kind(p) {
            // Primitive matchers fail without a diagnostic; the `expect`
            // wrapper the constructors add supplies the label.
            Kind::Any => self.input.read_any().map(byte_value).ok_or(None),
            Kind::Char(c) => {
                let c = *c;
                self.input.read_if(|b| b == c).map(byte_value).ok_or(None)
            }
            Kind::Range(start, end) => {
                let (start, end) = (*start, *end);
                self.input
                    .read_if(|b| b >= start && b <= end)
                    .map(byte_value)
                    .ok_or(None)
            }
            Kind::OneOf(set) => self
                .input
                .read_if(|b| set.as_bytes().contains(&b))
                .map(byte_value)
                .ok_or(None),
            Kind::NoneOf(set) => self
                .input
                .read_if(|b| !set.as_bytes().contains(&b))
                .map(byte_value)
                .ok_or(None),
            Kind::Satisfy(cond) => {
                let cond = *cond;
                self.input.read_if(cond).map(byte_value).ok_or(None)
            }
            Kind::Literal(s) => {
                if self.input.read_literal(s) {
                    Ok(Value::Str(s.clone()))
                } else {
                    Err(None)
                }
            }
            Kind::Anchor(cond) => {
                if self.input.anchor(*cond) {
                    Ok(Value::Null)
                } else {
                    Err(None)
                }
            }
            Kind::Soi => {
                if self.input.at_soi() {
                    Ok(Value::Null)
                } else {
                    Err(None)
                }
            }
            Kind::Eoi => {
                if self.input.at_eoi() {
                    Ok(Value::Null)
                } else {
                    Err(None)
                }
            }

            Kind::Undefined => Err(self.input.err_fail("Parser Undefined!")),
            Kind::Pass => Ok(Value::Null),
            Kind::Fail(message) => Err(self.input.err_fail(message)),
            Kind::Lift(ctor) => Ok(ctor.make()),
            Kind::LiftVal(value) => Ok(value.clone()),
            Kind::State => Ok(Value::State(self.input.state())),

            Kind::Apply { inner, f } => self.run(*inner, depth + 1).map(*f),
            Kind::ApplyWith { inner, f } => self.run(*inner, depth + 1).map(|v| f(v)),
            Kind::Check { inner, f, label } => {
                let mut value = self.run(*inner, depth + 1)?;
                if f(&mut value) {
                    Ok(value)
                } else {
                    drop(value);
                    Err(self.input.err_fail(label))
                }
            }
            Kind::CheckWith { inner, f, label } => {
                let mut value = self.run(*inner, depth + 1)?;
                if f(&mut value) {
                    Ok(value)
                } else {
                    drop(value);
                    Err(self.input.err_fail(label))
                }
            }

            Kind::Expect { inner, label } => {
                self.input.suppress_enable();
                let outcome = self.run(*inner, depth + 1);
                self.input.suppress_disable();
                match outcome {
                    Ok(value) => Ok(value),
                    Err(_) => Err(self.input.err_expected(label)),
                }
            }

            Kind::Predictive(inner) => {
                self.input.backtrack_disable();
                let outcome = self.run(*inner, depth + 1);
                self.input.backtrack_enable();
                outcome
            }

            Kind::Not { inner, ctor } => {
                self.input.mark();
                self.input.suppress_enable();
                match self.run(*inner, depth + 1) {
                    Ok(value) => {
                        self.input.rewind();
                        self.input.suppress_disable();
                        drop(value);
                        Err(self.input.err_expected("opposite"))
                    }
                    Err(_) => {
                        self.input.unmark();
                        self.input.suppress_disable();
                        Ok(ctor.make())
                    }
                }
            }

            Kind::Maybe { inner, ctor } => match self.run(*inner, depth + 1) {
                Ok(value) => Ok(value),
                Err(error) => {
                    self.merge_ambient(error);
                    Ok(ctor.make())
                }
            },

            Kind::Many { fold, inner } => {
                let mut results = Vec::with_capacity(4);
                loop {
                    match self.run(*inner, depth + 1) {
                        Ok(value) => results.push(value),
                        Err(error) => {
                            self.merge_ambient(error);
                            break;
                        }
                    }
                }
                Ok(fold.apply(results))
            }

            Kind::Many1 { fold, inner } => {
                let mut results = Vec::with_capacity(4);
                let terminating;
                loop {
                    match self.run(*inner, depth + 1) {
                        Ok(value) => results.push(value),
                        Err(error) => {
                            terminating = error;
                            break;
                        }
                    }
                }
                if results.is_empty() {
                    Err(terminating.map(|e| e.prefix_expected("one or more of ")))
                } else {
                    self.merge_ambient(terminating);
                    Ok(fold.apply(results))
                }
            }

            Kind::Count { n, fold, inner } => {
                let n = *n;
                self.input.mark();
                let mut results = Vec::with_capacity(n.min(4));
                let mut terminating = None;
                while results.len() < n {
                    match self.run(*inner, depth + 1) {
                        Ok(value) => results.push(value),
                        Err(error) => {
                            terminating = Some(error);
                            break;
                        }
                    }
                }
                if results.len() == n {
                    self.input.unmark();
                    Ok(fold.apply(results))
                } else {
                    self.input.rewind();
                    drop(results);
                    let error = terminating.flatten();
                    Err(error.map(|e| e.prefix_expected(&format!("{n} of "))))
                }
            }

            Kind::Or { alts } => {
                if alts.is_empty() {
                    return Ok(Value::Null);
                }
                for &alt in alts {
                    match self.run(alt, depth + 1) {
                        Ok(value) => return Ok(value),
                        Err(error) => self.merge_ambient(error),
                    }
                }
                Err(None)
            }

            Kind::And { fold, seq } => {
                if seq.is_empty() {
                    return Ok(Value::Null);
                }
                self.input.mark();
                let mut results = Vec::with_capacity(seq.len());
                for &q in seq {
                    match self.run(q, depth + 1) {
                        Ok(value) => results.push(value),
                        Err(error) => {
                            self.input.rewind();
                            drop(results);
                            return Err(error);
                        }
                    }
                }
                self.input.unmark();
                Ok(fold.apply(results))
            }
        }
    }
}
