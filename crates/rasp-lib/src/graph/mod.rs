//! The parser node graph.
//!
//! All nodes live in a [`Parsers`] arena and are addressed by copyable
//! [`Parser`] handles, so recursive and mutually-recursive grammars are
//! plain index cycles rather than self-referential ownership. A node with a
//! name is *retained*: it is created undefined by [`Parsers::declare`] and
//! wired up later with [`Parsers::define`], and composite constructors never
//! treat it as owned. Anonymous nodes belong to the composite that received
//! their handle.

use std::fmt::Write;
use std::rc::Rc;

use crate::escape;
use crate::fold::{AnchorFn, ApplyFn, CheckFn, Ctor, Fold};
use crate::value::Value;

mod ast_build;
mod build;
mod common;
mod optimize;

#[cfg(test)]
mod optimize_tests;

/// Handle to a node in a [`Parsers`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Parser(pub(crate) u32);

impl Parser {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

pub(crate) struct Node {
    pub(crate) name: Option<String>,
    pub(crate) kind: Kind,
}

/// The closed variant set of parser nodes.
pub(crate) enum Kind {
    Undefined,
    Pass,
    Fail(String),
    Lift(Ctor),
    LiftVal(Value),
    State,
    Anchor(AnchorFn),
    Any,
    Char(u8),
    Range(u8, u8),
    OneOf(String),
    NoneOf(String),
    Satisfy(fn(u8) -> bool),
    Literal(String),
    Soi,
    Eoi,
    Expect { inner: Parser, label: String },
    Apply { inner: Parser, f: ApplyFn },
    ApplyWith { inner: Parser, f: Rc<dyn Fn(Value) -> Value> },
    Check { inner: Parser, f: CheckFn, label: String },
    CheckWith { inner: Parser, f: Rc<dyn Fn(&mut Value) -> bool>, label: String },
    Predictive(Parser),
    Not { inner: Parser, ctor: Ctor },
    Maybe { inner: Parser, ctor: Ctor },
    Many { fold: Fold, inner: Parser },
    Many1 { fold: Fold, inner: Parser },
    Count { n: usize, fold: Fold, inner: Parser },
    Or { alts: Vec<Parser> },
    And { fold: Fold, seq: Vec<Parser> },
}

/// Arena of parser nodes.
#[derive(Default)]
pub struct Parsers {
    nodes: Vec<Node>,
}

impl Parsers {
    pub fn new() -> Parsers {
        Parsers::default()
    }

    pub(crate) fn push(&mut self, kind: Kind) -> Parser {
        let handle = Parser(self.nodes.len() as u32);
        self.nodes.push(Node { name: None, kind });
        handle
    }

    pub(crate) fn kind(&self, p: Parser) -> &Kind {
        &self.nodes[p.index()].kind
    }

    pub(crate) fn kind_mut(&mut self, p: Parser) -> &mut Kind {
        &mut self.nodes[p.index()].kind
    }

    pub(crate) fn take_kind(&mut self, p: Parser) -> Kind {
        std::mem::replace(&mut self.nodes[p.index()].kind, Kind::Undefined)
    }

    /// The name of a retained node.
    pub fn name(&self, p: Parser) -> Option<&str> {
        self.nodes[p.index()].name.as_deref()
    }

    /// Whether the node is retained (named, not owned by referencing
    /// parents).
    pub fn retained(&self, p: Parser) -> bool {
        self.nodes[p.index()].name.is_some()
    }

    /// Create a retained, initially-undefined parser. Running it before
    /// [`define`](Parsers::define) fails with a structural error.
    pub fn declare(&mut self, name: &str) -> Parser {
        let p = self.push(Kind::Undefined);
        self.nodes[p.index()].name = Some(name.to_string());
        p
    }

    /// Wire a constructed body into a retained parser, completing a
    /// recursive definition. The body handle must be an anonymous
    /// construction result; it is consumed by this call.
    pub fn define(&mut self, target: Parser, body: Parser) {
        if !self.retained(target) {
            self.nodes[target.index()].kind =
                Kind::Fail("Attempt to assign to Unretained Parser!".to_string());
            return;
        }
        let kind = self.take_kind(body);
        self.nodes[target.index()].kind = kind;
    }

    /// Reset a retained parser back to undefined.
    pub fn undefine(&mut self, target: Parser) {
        self.nodes[target.index()].kind = Kind::Undefined;
    }

    /// Total number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn children_of(&self, p: Parser) -> Vec<Parser> {
        match self.kind(p) {
            Kind::Expect { inner, .. }
            | Kind::Apply { inner, .. }
            | Kind::ApplyWith { inner, .. }
            | Kind::Check { inner, .. }
            | Kind::CheckWith { inner, .. }
            | Kind::Predictive(inner)
            | Kind::Not { inner, .. }
            | Kind::Maybe { inner, .. }
            | Kind::Many { inner, .. }
            | Kind::Many1 { inner, .. }
            | Kind::Count { inner, .. } => vec![*inner],
            Kind::Or { alts } => alts.clone(),
            Kind::And { seq, .. } => seq.clone(),
            _ => Vec::new(),
        }
    }

    /// Number of nodes reachable from `p` without crossing retained
    /// references.
    pub fn node_count(&self, p: Parser) -> usize {
        self.count_node(p, true)
    }

    fn count_node(&self, p: Parser, force: bool) -> usize {
        if self.retained(p) && !force {
            return 0;
        }
        1 + self
            .children_of(p)
            .into_iter()
            .map(|c| self.count_node(c, false))
            .sum::<usize>()
    }

    /// Render the grammar rooted at `p` in a compact combinator notation.
    /// Retained references print as `<name>`.
    pub fn dump(&self, p: Parser) -> String {
        let mut out = String::new();
        self.dump_node(p, true, &mut out);
        out
    }

    fn dump_node(&self, p: Parser, force: bool, out: &mut String) {
        let node = &self.nodes[p.index()];
        if let Some(name) = &node.name
            && !force
        {
            let _ = write!(out, "<{name}>");
            return;
        }
        match &node.kind {
            Kind::Undefined => out.push_str("<?>"),
            Kind::Pass => out.push_str("<:>"),
            Kind::Fail(_) => out.push_str("<!>"),
            Kind::Lift(_) | Kind::LiftVal(_) => out.push_str("<#>"),
            Kind::State => out.push_str("<S>"),
            Kind::Anchor(_) => out.push_str("<@>"),
            Kind::Any => out.push_str("<.>"),
            Kind::Satisfy(_) => out.push_str("<f>"),
            Kind::Soi | Kind::Eoi => {}
            Kind::Char(c) => {
                let _ = write!(out, "'{}'", escape::escape(&(*c as char).to_string()));
            }
            Kind::Range(a, b) => {
                let _ = write!(
                    out,
                    "[{}-{}]",
                    escape::escape(&(*a as char).to_string()),
                    escape::escape(&(*b as char).to_string())
                );
            }
            Kind::OneOf(set) => {
                let _ = write!(out, "[{}]", escape::escape(set));
            }
            Kind::NoneOf(set) => {
                let _ = write!(out, "[^{}]", escape::escape(set));
            }
            Kind::Literal(s) => {
                let _ = write!(out, "\"{}\"", escape::escape(s));
            }
            Kind::Expect { label, .. } => out.push_str(label),
            Kind::Apply { inner, .. }
            | Kind::ApplyWith { inner, .. }
            | Kind::Predictive(inner) => self.dump_node(*inner, false, out),
            Kind::Not { inner, .. } => {
                self.dump_node(*inner, false, out);
                out.push('!');
            }
            Kind::Maybe { inner, .. } => {
                self.dump_node(*inner, false, out);
                out.push('?');
            }
            Kind::Many { inner, .. } => {
                self.dump_node(*inner, false, out);
                out.push('*');
            }
            Kind::Many1 { inner, .. } => {
                self.dump_node(*inner, false, out);
                out.push('+');
            }
            Kind::Count { n, inner, .. } => {
                self.dump_node(*inner, false, out);
                let _ = write!(out, "{{{n}}}");
            }
            Kind::Check { inner, .. } | Kind::CheckWith { inner, .. } => {
                self.dump_node(*inner, false, out);
                out.push_str("->?");
            }
            Kind::Or { alts } => {
                out.push('(');
                for (i, alt) in alts.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" | ");
                    }
                    self.dump_node(*alt, false, out);
                }
                out.push(')');
            }
            Kind::And { seq, .. } => {
                out.push('(');
                for (i, q) in seq.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    self.dump_node(*q, false, out);
                }
                out.push(')');
            }
        }
    }
}
