//! AST-producing combinator wrappers.
//!
//! These fix the fold/apply slots to the generic tagged-tree rules, so a
//! grammar can be assembled without writing any fold functions by hand.

use super::{Parser, Parsers};
use crate::fold::{self, Fold};
use crate::value::Value;

impl Parsers {
    /// Replace the output tree's tag.
    pub fn ast_tag(&mut self, inner: Parser, tag: &str) -> Parser {
        let tag = tag.to_string();
        self.apply_with(inner, move |v| match v {
            Value::Ast(mut ast) => {
                ast.set_tag(&tag);
                Value::Ast(ast)
            }
            other => other,
        })
    }

    /// Prefix the output tree's tag with `name|`.
    pub fn ast_add_tag(&mut self, inner: Parser, name: &str) -> Parser {
        let name = name.to_string();
        self.apply_with(inner, move |v| match v {
            Value::Ast(mut ast) => {
                ast.add_tag(&name);
                Value::Ast(ast)
            }
            other => other,
        })
    }

    /// Promote multi-child output trees to a synthetic root, so they survive
    /// enclosing sequence folds as a unit.
    pub fn ast_root(&mut self, inner: Parser) -> Parser {
        self.apply(inner, fold::ast_add_root)
    }

    /// Stamp the output tree with the position where `inner` began.
    pub fn ast_state(&mut self, inner: Parser) -> Parser {
        let state = self.state();
        self.and(Fold::StateAst, vec![state, inner])
    }

    pub fn ast_not(&mut self, inner: Parser) -> Parser {
        self.not(inner)
    }

    pub fn ast_maybe(&mut self, inner: Parser) -> Parser {
        self.maybe(inner)
    }

    pub fn ast_many(&mut self, inner: Parser) -> Parser {
        self.many(Fold::Ast, inner)
    }

    pub fn ast_many1(&mut self, inner: Parser) -> Parser {
        self.many1(Fold::Ast, inner)
    }

    pub fn ast_count(&mut self, n: usize, inner: Parser) -> Parser {
        self.count(n, Fold::Ast, inner)
    }

    pub fn ast_or(&mut self, alts: Vec<Parser>) -> Parser {
        self.or(alts)
    }

    pub fn ast_and(&mut self, seq: Vec<Parser>) -> Parser {
        self.and(Fold::Ast, seq)
    }

    pub fn ast_total(&mut self, inner: Parser) -> Parser {
        self.total(inner)
    }
}
