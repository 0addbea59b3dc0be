//! The textual grammar compiler.
//!
//! A grammar string is parsed by a parser built from this crate's own
//! combinators (in a scratch arena, discarded after the compile) and
//! lowered into the caller's arena as ordinary AST-building nodes.
//!
//! Two entry points:
//! - [`Parsers::grammar`] compiles one anonymous rule. Construction is
//!   total: malformed text yields a parser that fails lazily with
//!   `Invalid Grammar: ...`.
//! - [`Parsers::lang`] (+ `_file`/`_stream`/`_path`) compiles a
//!   multi-statement `name ["label"] : rule ;` language, wiring each
//!   statement into its declared target.
//!
//! Rule syntax:
//!
//! ```text
//! rule   : factor+ ('|' rule)?
//! factor : base ('*' | '+' | '?' | '!' | '{' int '}')?
//! base   : "string" | 'char' | /regex/modes | '<' (digits|ident) '>'
//!        | '(' rule ')'
//! ```
//!
//! Inside `<...>`, an identifier resolves against the supplied parser
//! handles by name and digits resolve positionally. An unresolved reference
//! compiles to a parser that fails lazily with `Unknown Parser '...'!`.

use std::fs::File;
use std::io::Read;

use rasp_core::{Ast, Input, ParseError};

use crate::escape;
use crate::fold::{self, Fold};
use crate::graph::{Parser, Parsers};
use crate::regex::RegexFlags;
use crate::value::Value;


/// Options for grammar compilation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LangFlags {
    /// Wrap each compiled rule in `predictive`, disabling backtracking.
    pub predictive: bool,
    /// Match literals exactly instead of as whitespace-delimited tokens.
    pub whitespace_sensitive: bool,
}

/// Errors from compiling a language description.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    /// The grammar text itself did not parse.
    #[error("{0}")]
    Parse(#[from] ParseError),
    /// A statement defines a rule with no matching declared parser.
    #[error("undefined rule '{0}'")]
    UndefinedRule(String),
}

impl Parsers {
    /// Compile a single anonymous rule against the supplied named parsers.
    pub fn grammar(&mut self, flags: LangFlags, text: &str, deps: &[Parser]) -> Parser {
        let mut input = Input::string("<grammar>", text);
        let ast = {
            let mut g = Parsers::new();
            let rule = build_rule_dsl(&mut g);
            let top = {
                let p = g.total(rule);
                g.predictive(p)
            };
            g.optimize(top);
            match g.parse_input(&mut input, top) {
                Ok(value) => value.into_ast(),
                Err(err) => return self.fail(&format!("Invalid Grammar: {err}")),
            }
        };
        let Some(ast) = ast else {
            return self.fail("Invalid Grammar: empty rule");
        };
        let cx = LowerCtx { deps, flags };
        let mut p = lower(self, &ast, &cx);
        self.optimize(p);
        if flags.predictive {
            p = self.predictive(p);
        }
        p
    }

    /// Compile a multi-statement language, defining each rule into its
    /// declared parser.
    pub fn lang(
        &mut self,
        flags: LangFlags,
        text: &str,
        deps: &[Parser],
    ) -> Result<(), GrammarError> {
        let mut input = Input::string("<grammar>", text);
        self.lang_input(flags, &mut input, deps)
    }

    pub fn lang_file(
        &mut self,
        flags: LangFlags,
        filename: &str,
        file: File,
        deps: &[Parser],
    ) -> Result<(), GrammarError> {
        let mut input = Input::file(filename, file);
        self.lang_input(flags, &mut input, deps)
    }

    pub fn lang_stream(
        &mut self,
        flags: LangFlags,
        filename: &str,
        reader: impl Read + 'static,
        deps: &[Parser],
    ) -> Result<(), GrammarError> {
        let mut input = Input::stream(filename, Box::new(reader));
        self.lang_input(flags, &mut input, deps)
    }

    pub fn lang_path(
        &mut self,
        flags: LangFlags,
        path: &str,
        deps: &[Parser],
    ) -> Result<(), GrammarError> {
        let mut input = Input::path(path)?;
        self.lang_input(flags, &mut input, deps)
    }

    pub fn lang_input(
        &mut self,
        flags: LangFlags,
        input: &mut Input,
        deps: &[Parser],
    ) -> Result<(), GrammarError> {
        let ast = parse_lang(input)?;

        for stmt in &ast.children {
            let ident = stmt
                .child_by_tag("ident")
                .map(|c| c.contents.clone())
                .unwrap_or_default();
            let label = stmt.child_by_tag("label").map(|c| c.contents.clone());
            let body_ast = stmt.children.last().expect("statement has a body");

            let target = deps
                .iter()
                .copied()
                .find(|d| self.name(*d) == Some(ident.as_str()))
                .ok_or_else(|| GrammarError::UndefinedRule(ident.clone()))?;

            let cx = LowerCtx { deps, flags };
            let mut body = lower(self, body_ast, &cx);
            body = {
                let name = ident.clone();
                self.apply_with(body, move |v| rule_tag(v, &name))
            };
            if flags.predictive {
                body = self.predictive(body);
            }
            if let Some(label) = label {
                body = self.expect(body, &label);
            }
            self.optimize(body);
            self.define(target, body);
        }
        Ok(())
    }
}

/// Tag a rule's output with the rule name: untagged trees take the name,
/// tagged trees get a `name|` prefix.
fn rule_tag(value: Value, name: &str) -> Value {
    match value {
        Value::Ast(mut ast) => {
            ast.prefix_tag(name);
            Value::Ast(ast)
        }
        other => other,
    }
}

struct LowerCtx<'a> {
    deps: &'a [Parser],
    flags: LangFlags,
}

/// Parse a full language description into a transient statement tree.
fn parse_lang(input: &mut Input) -> Result<Ast, ParseError> {
    let mut g = Parsers::new();

    let rule = build_rule_dsl(&mut g);

    let stmt = {
        let ident = g.ident();
        let ident = g.tok(ident);
        let label = g.string_lit();
        let label = g.tok(label);
        let label = g.maybe(label);
        let colon = g.sym(":");
        let semi = g.sym(";");
        g.and(
            Fold::Custom(stmt_fold),
            vec![ident, label, colon, rule, semi],
        )
    };

    let top = {
        let stmts = g.many(Fold::Custom(lang_fold), stmt);
        let p = g.predictive(stmts);
        g.total(p)
    };
    g.optimize(top);

    let value = g.parse_input(input, top)?;
    Ok(value
        .into_ast()
        .unwrap_or_else(|| Ast::with_children("lang", Vec::new())))
}

/// Build the rule grammar (shared by `grammar` and `lang`) into a scratch
/// arena, returning the entry rule.
fn build_rule_dsl(g: &mut Parsers) -> Parser {
    let rule = g.declare("rule");
    let term = g.declare("term");
    let factor = g.declare("factor");
    let base = g.declare("base");

    let body = {
        let bar = g.sym("|");
        let tail = g.and(Fold::Second, vec![bar, rule]);
        let tail = g.maybe(tail);
        g.and(Fold::Custom(alt_fold), vec![term, tail])
    };
    g.define(rule, body);

    let body = g.many1(Fold::Custom(seq_fold), factor);
    g.define(term, body);

    let body = {
        let star = g.sym("*");
        let plus = g.sym("+");
        let quest = g.sym("?");
        let bang = g.sym("!");
        let int = g.int();
        let reps = g.tok_brackets(int);
        let pass = g.pass();
        let op = g.or(vec![star, plus, quest, bang, reps, pass]);
        g.and(Fold::Custom(rep_fold), vec![base, op])
    };
    g.define(factor, body);

    let body = {
        let string = {
            let lit = g.string_lit();
            let lit = g.tok(lit);
            g.apply(lit, string_base)
        };
        let chr = {
            let lit = g.char_lit();
            let lit = g.tok(lit);
            g.apply(lit, char_base)
        };
        let regex = {
            let lit = g.regex_lit();
            let modes = {
                let m = g.oneof("ms");
                g.many(Fold::Concat, m)
            };
            let pair = g.and(Fold::Custom(regex_base), vec![lit, modes]);
            g.tok(pair)
        };
        let reference = {
            let digits = g.digits();
            let ident = g.ident();
            let name = g.or(vec![digits, ident]);
            let braced = g.tok_braces(name);
            g.apply(braced, ref_base)
        };
        let grouped = g.tok_parens(rule);
        g.or(vec![string, chr, regex, reference, grouped])
    };
    g.define(base, body);

    for p in [rule, term, factor, base] {
        g.optimize(p);
    }
    rule
}

fn alt_fold(xs: Vec<Value>) -> Value {
    let mut it = xs.into_iter();
    let head = it.next().unwrap_or(Value::Null);
    let tail = it.next().unwrap_or(Value::Null);
    match (head, tail) {
        (Value::Ast(h), Value::Ast(t)) => Value::Ast(Ast::with_children("alt", vec![h, t])),
        (head, _) => head,
    }
}

fn seq_fold(xs: Vec<Value>) -> Value {
    let mut children: Vec<Ast> = xs.into_iter().filter_map(Value::into_ast).collect();
    match children.len() {
        1 => Value::Ast(children.pop().expect("len checked")),
        _ => Value::Ast(Ast::with_children("seq", children)),
    }
}

fn rep_fold(xs: Vec<Value>) -> Value {
    let mut it = xs.into_iter();
    let base = it.next().unwrap_or(Value::Null);
    let op = it.next().unwrap_or(Value::Null);
    let Value::Ast(base) = base else { return base };
    match op {
        Value::Str(op) if !op.is_empty() => {
            let mut rep = Ast::new("rep", &op);
            rep.add_child(base);
            Value::Ast(rep)
        }
        Value::Int(n) => {
            let mut rep = Ast::new("rep", &n.to_string());
            rep.add_child(base);
            Value::Ast(rep)
        }
        _ => Value::Ast(base),
    }
}

fn string_base(value: Value) -> Value {
    match value {
        Value::Str(raw) => Value::Ast(Ast::new("string", &escape::unescape(&raw))),
        other => other,
    }
}

fn char_base(value: Value) -> Value {
    match value {
        Value::Str(raw) => Value::Ast(Ast::new("char", &escape::unescape(&raw))),
        other => other,
    }
}

fn regex_base(xs: Vec<Value>) -> Value {
    let mut it = xs.into_iter();
    let pattern = it.next().unwrap_or(Value::Null).into_string();
    let modes = it.next().unwrap_or(Value::Null).into_string();
    let mut node = Ast::new("regex", &escape::unescape_regex(&pattern));
    if !modes.is_empty() {
        node.add_child(Ast::new("mode", &modes));
    }
    Value::Ast(node)
}

fn ref_base(value: Value) -> Value {
    match value {
        Value::Str(name) => Value::Ast(Ast::new("ref", &name)),
        other => other,
    }
}

fn stmt_fold(xs: Vec<Value>) -> Value {
    let mut it = xs.into_iter();
    let ident = it.next().unwrap_or(Value::Null).into_string();
    let label = it.next().unwrap_or(Value::Null);
    let _colon = it.next();
    let body = it.next().unwrap_or(Value::Null);
    let mut stmt = Ast::new("stmt", "");
    stmt.add_child(Ast::new("ident", &ident));
    if let Value::Str(label) = label {
        stmt.add_child(Ast::new("label", &escape::unescape(&label)));
    }
    if let Value::Ast(body) = body {
        stmt.add_child(body);
    }
    Value::Ast(stmt)
}

fn lang_fold(xs: Vec<Value>) -> Value {
    let stmts = xs.into_iter().filter_map(Value::into_ast).collect();
    Value::Ast(Ast::with_children("lang", stmts))
}

/// Lower a rule tree into AST-building combinator nodes.
fn lower(ps: &mut Parsers, ast: &Ast, cx: &LowerCtx<'_>) -> Parser {
    match ast.tag.as_str() {
        "alt" => {
            let mut branches = Vec::new();
            collect_alts(ast, &mut branches);
            let lowered = branches.into_iter().map(|b| lower(ps, b, cx)).collect();
            ps.ast_or(lowered)
        }
        "seq" => {
            let seq = ast.children.iter().map(|c| lower(ps, c, cx)).collect();
            ps.ast_and(seq)
        }
        "rep" => {
            let inner = lower(ps, &ast.children[0], cx);
            match ast.contents.as_str() {
                "*" => ps.ast_many(inner),
                "+" => ps.ast_many1(inner),
                "?" => ps.ast_maybe(inner),
                "!" => ps.ast_not(inner),
                n => {
                    let n = n.parse().unwrap_or(0);
                    ps.ast_count(n, inner)
                }
            }
        }
        // Literal tokens parse but contribute nothing to the tree.
        "string" => {
            let lit = ps.literal(&ast.contents);
            let lit = maybe_tok(ps, lit, cx);
            ps.apply(lit, fold::discard)
        }
        "char" => {
            let p = match ast.contents.as_bytes().first() {
                Some(&c) => ps.char(c),
                None => ps.pass(),
            };
            let p = maybe_tok(ps, p, cx);
            ps.apply(p, fold::discard)
        }
        "regex" => {
            let flags = ast
                .child_by_tag("mode")
                .map(|m| RegexFlags::from_modes(&m.contents))
                .unwrap_or_default();
            let p = ps.re_mode(&ast.contents, flags);
            let p = maybe_tok(ps, p, cx);
            let p = ps.apply(p, fold::str_ast);
            ps.ast_state(p)
        }
        "ref" => match resolve(ps, cx, &ast.contents) {
            Ok(target) => {
                let p = ps.ast_root(target);
                ps.ast_state(p)
            }
            Err(message) => ps.fail(&message),
        },
        _ => ps.fail("Invalid Grammar: malformed rule"),
    }
}

fn maybe_tok(ps: &mut Parsers, p: Parser, cx: &LowerCtx<'_>) -> Parser {
    if cx.flags.whitespace_sensitive {
        p
    } else {
        ps.tok(p)
    }
}

fn collect_alts<'a>(ast: &'a Ast, out: &mut Vec<&'a Ast>) {
    if ast.tag == "alt" {
        for child in &ast.children {
            collect_alts(child, out);
        }
    } else {
        out.push(ast);
    }
}

/// Resolve a `<...>` reference: digits positionally, identifiers by the
/// supplied parsers' names.
fn resolve(ps: &Parsers, cx: &LowerCtx<'_>, name: &str) -> Result<Parser, String> {
    if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
        let index: usize = name.parse().unwrap_or(usize::MAX);
        cx.deps.get(index).copied().ok_or_else(|| {
            format!(
                "No Parser in position {}! Only supplied {} Parsers!",
                index,
                cx.deps.len()
            )
        })
    } else {
        cx.deps
            .iter()
            .copied()
            .find(|d| ps.name(*d) == Some(name))
            .ok_or_else(|| format!("Unknown Parser '{name}'!"))
    }
}
