//! The nested regex-literal compiler.
//!
//! `/regex/` literals are compiled into ordinary combinator graphs, not
//! delegated to a regex engine. The regex syntax itself is parsed by a
//! grammar built from this crate's own primitives (in a scratch arena,
//! discarded after the compile); the resulting tree is then lowered into
//! the caller's arena. A malformed pattern still returns a parser - one
//! that fails lazily with an `Invalid Regex: ...` message, keeping
//! construction total.
//!
//! Grammar:
//!
//! ```text
//! regex  : term ('|' regex)?
//! term   : factor*
//! factor : base ('*' | '+' | '?' | '{' int '}')?
//! base   : char | escape | '(' regex ')' | '[' class ']'
//! ```

use rasp_core::{Ast, ParseError};

use crate::fold::{Ctor, Fold};
use crate::graph::{Parser, Parsers};
use crate::value::Value;

#[cfg(test)]
mod regex_tests;

/// Regex mode flags: `m` makes `^`/`$` match at line boundaries, `s` makes
/// `.` match newlines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegexFlags {
    pub multiline: bool,
    pub dotall: bool,
}

impl RegexFlags {
    /// Parse a mode-letter suffix such as `ms`.
    pub fn from_modes(modes: &str) -> RegexFlags {
        RegexFlags {
            multiline: modes.contains('m'),
            dotall: modes.contains('s'),
        }
    }
}

impl Parsers {
    /// Compile a regex pattern into a parser producing the matched text.
    pub fn re(&mut self, pattern: &str) -> Parser {
        self.re_mode(pattern, RegexFlags::default())
    }

    /// Compile a regex pattern with explicit mode flags.
    pub fn re_mode(&mut self, pattern: &str, flags: RegexFlags) -> Parser {
        let ast = match parse_regex(pattern) {
            Ok(ast) => ast,
            Err(err) => return self.fail(&format!("Invalid Regex: {err}")),
        };
        let p = lower(self, &ast, flags);
        self.optimize(p);
        p
    }
}

/// Parse regex text into a transient tree using a scratch combinator
/// grammar.
fn parse_regex(pattern: &str) -> Result<Ast, ParseError> {
    let mut g = Parsers::new();

    let regex = g.declare("regex");
    let term = g.declare("term");
    let factor = g.declare("factor");
    let base = g.declare("base");
    let class = g.declare("class");

    let body = {
        let bar = g.char(b'|');
        let tail = g.and(Fold::Second, vec![bar, regex]);
        let tail = g.maybe(tail);
        g.and(Fold::Custom(alt_fold), vec![term, tail])
    };
    g.define(regex, body);

    let body = g.many(Fold::Custom(cat_fold), factor);
    g.define(term, body);

    let body = {
        let star = g.char(b'*');
        let plus = g.char(b'+');
        let quest = g.char(b'?');
        let int = g.int();
        let reps = g.brackets(int);
        let pass = g.pass();
        let op = g.or(vec![star, plus, quest, reps, pass]);
        g.and(Fold::Custom(rep_fold), vec![base, op])
    };
    g.define(factor, body);

    let body = {
        let group = g.parens(regex);
        let cls = g.squares(class);
        let esc = g.escape();
        let esc_atom = g.apply(esc, atom_apply);
        let plain = g.noneof(")|");
        let plain_atom = g.apply(plain, atom_apply);
        g.or(vec![group, cls, esc_atom, plain_atom])
    };
    g.define(base, body);

    let body = {
        let esc = g.escape();
        let plain = g.noneof("]");
        let item = g.or(vec![esc, plain]);
        let items = g.many(Fold::Concat, item);
        g.apply(items, class_apply)
    };
    g.define(class, body);

    let top = {
        let p = g.predictive(regex);
        g.whole(p)
    };
    for p in [top, regex, term, factor, base, class] {
        g.optimize(p);
    }

    let value = g.parse("<regex>", pattern, top)?;
    Ok(value.into_ast().unwrap_or_else(|| Ast::new("cat", "")))
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

fn cat_fold(xs: Vec<Value>) -> Value {
    let children = xs.into_iter().filter_map(Value::into_ast).collect();
    Value::Ast(Ast::with_children("cat", children))
}

fn rep_fold(xs: Vec<Value>) -> Value {
    let mut it = xs.into_iter();
    let base = it.next().unwrap_or(Value::Null);
    let op = it.next().unwrap_or(Value::Null);
    let Value::Ast(base) = base else { return base };
    match op {
        Value::Str(op) => {
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

fn atom_apply(value: Value) -> Value {
    match value {
        Value::Str(s) => Value::Ast(Ast::new("atom", &s)),
        other => other,
    }
}

fn class_apply(value: Value) -> Value {
    match value {
        Value::Str(s) => Value::Ast(Ast::new("class", &s)),
        other => other,
    }
}

/// Lower a regex tree into combinator nodes in the caller's arena.
fn lower(ps: &mut Parsers, ast: &Ast, flags: RegexFlags) -> Parser {
    match ast.tag.as_str() {
        "alt" => {
            let mut branches = Vec::new();
            collect_alts(ast, &mut branches);
            let lowered = branches.into_iter().map(|b| lower(ps, b, flags)).collect();
            ps.or(lowered)
        }
        "cat" => match ast.children.len() {
            0 => ps.lift(Ctor::EmptyStr),
            1 => lower(ps, &ast.children[0], flags),
            _ => {
                let seq = ast.children.iter().map(|c| lower(ps, c, flags)).collect();
                ps.and(Fold::Concat, seq)
            }
        },
        "rep" => {
            let inner = lower(ps, &ast.children[0], flags);
            match ast.contents.as_str() {
                "*" => ps.many(Fold::Concat, inner),
                "+" => ps.many1(Fold::Concat, inner),
                "?" => ps.maybe_lift(inner, Ctor::EmptyStr),
                n => {
                    let n = n.parse().unwrap_or(0);
                    ps.count(n, Fold::Concat, inner)
                }
            }
        }
        "atom" => lower_atom(ps, &ast.contents, flags),
        "class" => lower_class(ps, &ast.contents),
        _ => ps.fail("Invalid Regex: malformed pattern"),
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

fn lower_atom(ps: &mut Parsers, atom: &str, flags: RegexFlags) -> Parser {
    let bytes = atom.as_bytes();
    match bytes.first() {
        Some(b'.') => {
            if flags.dotall {
                ps.any()
            } else {
                let p = ps.noneof("\n");
                ps.expect(p, "any character except a newline")
            }
        }
        Some(b'^') => {
            let anchor = if flags.multiline {
                let soi = ps.soi();
                let nl = ps.boundary_newline();
                ps.or(vec![soi, nl])
            } else {
                ps.soi()
            };
            let empty = ps.lift(Ctor::EmptyStr);
            ps.and(Fold::Second, vec![anchor, empty])
        }
        Some(b'$') => {
            if flags.multiline {
                let nl = ps.newline();
                let eoi = ps.eoi();
                let empty = ps.lift(Ctor::EmptyStr);
                let at_end = ps.and(Fold::Second, vec![eoi, empty]);
                ps.or(vec![nl, at_end])
            } else {
                let nl = ps.newline();
                let eoi = ps.eoi();
                let final_nl = ps.and(Fold::First, vec![nl, eoi]);
                let eoi = ps.eoi();
                let empty = ps.lift(Ctor::EmptyStr);
                let at_end = ps.and(Fold::Second, vec![eoi, empty]);
                ps.or(vec![final_nl, at_end])
            }
        }
        Some(b'\\') => match bytes.get(1) {
            Some(&esc) => lower_escape(ps, esc),
            None => ps.char(b'\\'),
        },
        Some(&c) => ps.char(c),
        None => ps.fail("Invalid Regex: empty atom"),
    }
}

fn lower_escape(ps: &mut Parsers, esc: u8) -> Parser {
    match esc {
        b'a' => ps.char(0x07),
        b'f' => ps.char(0x0C),
        b'n' => ps.char(b'\n'),
        b'r' => ps.char(b'\r'),
        b't' => ps.char(b'\t'),
        b'v' => ps.char(0x0B),
        b'b' => {
            let b = ps.boundary();
            let empty = ps.lift(Ctor::EmptyStr);
            ps.and(Fold::Second, vec![b, empty])
        }
        b'B' => {
            let b = ps.boundary();
            ps.not_lift(b, Ctor::EmptyStr)
        }
        b'A' => {
            let soi = ps.soi();
            let empty = ps.lift(Ctor::EmptyStr);
            ps.and(Fold::Second, vec![soi, empty])
        }
        b'Z' => {
            let eoi = ps.eoi();
            let empty = ps.lift(Ctor::EmptyStr);
            ps.and(Fold::Second, vec![eoi, empty])
        }
        b'd' => ps.digit(),
        b'D' => {
            let d = ps.digit();
            ps.not_lift(d, Ctor::EmptyStr)
        }
        b's' => ps.whitespace(),
        b'S' => {
            let w = ps.whitespace();
            ps.not_lift(w, Ctor::EmptyStr)
        }
        b'w' => ps.alphanum(),
        b'W' => {
            let a = ps.alphanum();
            ps.not_lift(a, Ctor::EmptyStr)
        }
        other => ps.char(other),
    }
}

fn class_escape(esc: u8) -> Option<&'static str> {
    match esc {
        b'-' => Some("-"),
        b'a' => Some("\x07"),
        b'f' => Some("\x0C"),
        b'n' => Some("\n"),
        b'r' => Some("\r"),
        b't' => Some("\t"),
        b'v' => Some("\x0B"),
        b'b' => Some("\x08"),
        b'd' => Some("0123456789"),
        b's' => Some(" \x0C\n\r\t\x0B"),
        b'w' => Some("abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_"),
        _ => None,
    }
}

/// Expand a `[...]` body (ranges, escapes, leading `^` negation) into a
/// byte-set matcher.
fn lower_class(ps: &mut Parsers, body: &str) -> Parser {
    let bytes = body.as_bytes();
    let negated = bytes.first() == Some(&b'^');
    let content = &bytes[usize::from(negated)..];
    if content.is_empty() {
        return ps.fail("Invalid Regex Range Expression");
    }

    let mut set = String::new();
    let mut i = 0;
    while i < content.len() {
        match content[i] {
            b'\\' if i + 1 < content.len() => {
                match class_escape(content[i + 1]) {
                    Some(expansion) => set.push_str(expansion),
                    None => set.push(content[i + 1] as char),
                }
                i += 2;
            }
            b'-' if i == 0 || i + 1 >= content.len() => {
                set.push('-');
                i += 1;
            }
            b'-' => {
                // The range endpoints are pushed by their own iterations;
                // fill in the bytes between them.
                let start = content[i - 1].saturating_add(1);
                let end = content[i + 1].saturating_sub(1);
                for b in start..=end {
                    set.push(b as char);
                }
                i += 1;
            }
            c => {
                set.push(c as char);
                i += 1;
            }
        }
    }

    if negated {
        ps.noneof(&set)
    } else {
        ps.oneof(&set)
    }
}
