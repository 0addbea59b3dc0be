//! Graph-level structural simplification.
//!
//! Grammars compiled from the textual DSL come out deeply right-nested:
//! every alternation and sequence pairs one element with the rest. These
//! rewrites flatten `or`-of-`or` and same-fold `and`-of-`and` chains into
//! single n-ary nodes and drop the no-op head of two-element sequences,
//! shrinking recursion depth and per-step dispatch without changing the
//! accepted language or the produced trees. Retained nodes are never
//! spliced and never entered.

use super::{Kind, Parser, Parsers};
use crate::fold::{Ctor, Fold};

impl Parsers {
    /// Simplify the graph rooted at `p` in place.
    pub fn optimize(&mut self, p: Parser) {
        self.optimize_node(p, true);
    }

    fn optimize_node(&mut self, p: Parser, force: bool) {
        if self.retained(p) && !force {
            return;
        }
        for child in self.children_of(p) {
            self.optimize_node(child, false);
        }
        while self.rewrite(p) {}
    }

    fn rewrite(&mut self, p: Parser) -> bool {
        // Flatten an unretained trailing `or` alternative.
        let trailing = match self.kind(p) {
            Kind::Or { alts } => alts.last().copied().filter(|c| self.splicable_or(*c)),
            _ => None,
        };
        if let Some(c) = trailing {
            let inner = self.take_alts(c);
            if let Kind::Or { alts } = self.kind_mut(p) {
                alts.pop();
                alts.extend(inner);
            }
            return true;
        }

        // Flatten an unretained leading `or` alternative.
        let leading = match self.kind(p) {
            Kind::Or { alts } => alts.first().copied().filter(|c| self.splicable_or(*c)),
            _ => None,
        };
        if let Some(c) = leading {
            let mut inner = self.take_alts(c);
            if let Kind::Or { alts } = self.kind_mut(p) {
                alts.remove(0);
                inner.append(alts);
                *alts = inner;
            }
            return true;
        }

        // Drop the no-op head of a two-element sequence: `pass` in an
        // AST-building pair, an empty-string lift in a string-building pair.
        let body = match self.kind(p) {
            Kind::And { fold: Fold::Ast, seq }
                if seq.len() == 2
                    && !self.retained(seq[0])
                    && !self.retained(seq[1])
                    && matches!(self.kind(seq[0]), Kind::Pass) =>
            {
                Some(seq[1])
            }
            Kind::And {
                fold: Fold::Concat,
                seq,
            } if seq.len() == 2
                && !self.retained(seq[0])
                && !self.retained(seq[1])
                && matches!(self.kind(seq[0]), Kind::Lift(Ctor::EmptyStr)) =>
            {
                Some(seq[1])
            }
            _ => None,
        };
        if let Some(c) = body {
            let kind = self.take_kind(c);
            *self.kind_mut(p) = kind;
            return true;
        }

        // Splice an unretained leading or trailing same-fold `and`.
        for pick_last in [true, false] {
            if let Some(c) = self.splicable_and_end(p, pick_last) {
                let mut inner = self.take_seq(c);
                if let Kind::And { seq, .. } = self.kind_mut(p) {
                    if pick_last {
                        seq.pop();
                        seq.extend(inner);
                    } else {
                        seq.remove(0);
                        inner.append(seq);
                        *seq = inner;
                    }
                }
                return true;
            }
        }

        false
    }

    fn splicable_or(&self, c: Parser) -> bool {
        !self.retained(c) && matches!(self.kind(c), Kind::Or { .. })
    }

    fn splicable_and_end(&self, p: Parser, pick_last: bool) -> Option<Parser> {
        let (fold, seq) = match self.kind(p) {
            Kind::And { fold, seq } if !seq.is_empty() => (*fold, seq),
            _ => return None,
        };
        let want_ast = match fold {
            Fold::Ast => true,
            Fold::Concat => false,
            _ => return None,
        };
        let c = if pick_last {
            *seq.last().expect("non-empty")
        } else {
            seq[0]
        };
        if self.retained(c) {
            return None;
        }
        match self.kind(c) {
            Kind::And { fold: cf, .. }
                if matches!((want_ast, cf), (true, Fold::Ast) | (false, Fold::Concat)) =>
            {
                Some(c)
            }
            _ => None,
        }
    }

    fn take_alts(&mut self, c: Parser) -> Vec<Parser> {
        match self.take_kind(c) {
            Kind::Or { alts } => alts,
            _ => unreachable!("checked to be an or node"),
        }
    }

    fn take_seq(&mut self, c: Parser) -> Vec<Parser> {
        match self.take_kind(c) {
            Kind::And { seq, .. } => seq,
            _ => unreachable!("checked to be an and node"),
        }
    }
}
