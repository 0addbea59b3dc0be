//! Primitive and core combinator constructors.
//!
//! Construction is pure graph building: no I/O happens until a built parser
//! is run. Composite constructors take ownership of the handles they are
//! given, except for retained (declared) references.

use std::rc::Rc;

use super::{Kind, Parser, Parsers};
use crate::fold::{AnchorFn, ApplyFn, CheckFn, Ctor, Fold};
use crate::value::Value;

impl Parsers {
    /// Any single byte.
    pub fn any(&mut self) -> Parser {
        let p = self.push(Kind::Any);
        self.expect(p, "any character")
    }

    /// A single byte.
    pub fn char(&mut self, c: u8) -> Parser {
        let p = self.push(Kind::Char(c));
        let label = format!("'{}'", c as char);
        self.expect(p, &label)
    }

    /// A byte in the inclusive range `start..=end`.
    pub fn range(&mut self, start: u8, end: u8) -> Parser {
        let p = self.push(Kind::Range(start, end));
        let label = format!(
            "character between '{}' and '{}'",
            start as char, end as char
        );
        self.expect(p, &label)
    }

    /// Any byte of `set`.
    pub fn oneof(&mut self, set: &str) -> Parser {
        let p = self.push(Kind::OneOf(set.to_string()));
        let label = format!("one of '{set}'");
        self.expect(p, &label)
    }

    /// Any byte not in `set`.
    pub fn noneof(&mut self, set: &str) -> Parser {
        let p = self.push(Kind::NoneOf(set.to_string()));
        let label = format!("none of '{set}'");
        self.expect(p, &label)
    }

    /// A byte accepted by `cond`.
    pub fn satisfy(&mut self, cond: fn(u8) -> bool) -> Parser {
        let p = self.push(Kind::Satisfy(cond));
        self.expect(p, "character satisfying function")
    }

    /// An exact string.
    pub fn literal(&mut self, s: &str) -> Parser {
        let p = self.push(Kind::Literal(s.to_string()));
        let label = format!("\"{s}\"");
        self.expect(p, &label)
    }

    /// Always succeeds, consuming nothing and producing `Null`.
    pub fn pass(&mut self) -> Parser {
        self.push(Kind::Pass)
    }

    /// Always fails with a fatal message.
    pub fn fail(&mut self, message: &str) -> Parser {
        self.push(Kind::Fail(message.to_string()))
    }

    /// Succeeds without consuming, producing a constructed value.
    pub fn lift(&mut self, ctor: Ctor) -> Parser {
        self.push(Kind::Lift(ctor))
    }

    /// Succeeds without consuming, producing a clone of `value`.
    pub fn lift_val(&mut self, value: Value) -> Parser {
        self.push(Kind::LiftVal(value))
    }

    /// Succeeds without consuming, producing the current input position.
    pub fn state(&mut self) -> Parser {
        self.push(Kind::State)
    }

    /// A zero-width anchor over the (last consumed, next) byte pair.
    pub fn anchor(&mut self, cond: AnchorFn) -> Parser {
        let p = self.push(Kind::Anchor(cond));
        self.expect(p, "anchor")
    }

    /// Start of input.
    pub fn soi(&mut self) -> Parser {
        let p = self.push(Kind::Soi);
        self.expect(p, "start of input")
    }

    /// End of input.
    pub fn eoi(&mut self) -> Parser {
        let p = self.push(Kind::Eoi);
        self.expect(p, "end of input")
    }

    /// On failure, replace the inner diagnostics with the single `label`.
    pub fn expect(&mut self, inner: Parser, label: &str) -> Parser {
        self.push(Kind::Expect {
            inner,
            label: label.to_string(),
        })
    }

    /// Transform a success value; failure passes through unchanged.
    pub fn apply(&mut self, inner: Parser, f: ApplyFn) -> Parser {
        self.push(Kind::Apply { inner, f })
    }

    /// `apply` with a capturing transformer.
    pub fn apply_with(&mut self, inner: Parser, f: impl Fn(Value) -> Value + 'static) -> Parser {
        self.push(Kind::ApplyWith {
            inner,
            f: Rc::new(f),
        })
    }

    /// Run `inner`, then validate its output; rejection destroys the value
    /// and fails with `label`.
    pub fn check(&mut self, inner: Parser, cond: CheckFn, label: &str) -> Parser {
        self.push(Kind::Check {
            inner,
            f: cond,
            label: label.to_string(),
        })
    }

    /// `check` with a capturing validator.
    pub fn check_with(
        &mut self,
        inner: Parser,
        cond: impl Fn(&mut Value) -> bool + 'static,
        label: &str,
    ) -> Parser {
        self.push(Kind::CheckWith {
            inner,
            f: Rc::new(cond),
            label: label.to_string(),
        })
    }

    /// Disable backtracking for the duration of `inner`. Only valid for
    /// LL(1)-safe sub-grammars; trades backtracking for throughput.
    pub fn predictive(&mut self, inner: Parser) -> Parser {
        self.push(Kind::Predictive(inner))
    }

    /// Negative lookahead: succeeds with `Null` only when `inner` fails.
    pub fn not(&mut self, inner: Parser) -> Parser {
        self.not_lift(inner, Ctor::Null)
    }

    pub fn not_lift(&mut self, inner: Parser, ctor: Ctor) -> Parser {
        self.push(Kind::Not { inner, ctor })
    }

    /// Always succeeds: `inner`'s output, or a default on failure.
    pub fn maybe(&mut self, inner: Parser) -> Parser {
        self.maybe_lift(inner, Ctor::Null)
    }

    pub fn maybe_lift(&mut self, inner: Parser, ctor: Ctor) -> Parser {
        self.push(Kind::Maybe { inner, ctor })
    }

    /// Zero or more repetitions, folded; always succeeds.
    pub fn many(&mut self, fold: Fold, inner: Parser) -> Parser {
        self.push(Kind::Many { fold, inner })
    }

    /// One or more repetitions, folded.
    pub fn many1(&mut self, fold: Fold, inner: Parser) -> Parser {
        self.push(Kind::Many1 { fold, inner })
    }

    /// Exactly `n` repetitions, folded; rewinds fully on shortfall.
    pub fn count(&mut self, n: usize, fold: Fold, inner: Parser) -> Parser {
        self.push(Kind::Count { n, fold, inner })
    }

    /// Ordered choice; the first success wins.
    pub fn or(&mut self, alts: Vec<Parser>) -> Parser {
        self.push(Kind::Or { alts })
    }

    /// All-or-nothing sequence, folded with `fold`.
    pub fn and(&mut self, fold: Fold, seq: Vec<Parser>) -> Parser {
        self.push(Kind::And { fold, seq })
    }
}
