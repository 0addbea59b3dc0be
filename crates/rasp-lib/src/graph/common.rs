//! Common and convenience parsers built from the primitives.

use super::{Parser, Parsers};
use crate::fold::{self, Ctor, Fold};

fn is_word_byte(byte: Option<u8>) -> bool {
    matches!(byte, Some(b) if b == b'_' || b.is_ascii_alphanumeric())
}

fn word_boundary(prev: Option<u8>, next: Option<u8>) -> bool {
    is_word_byte(prev) != is_word_byte(next)
}

fn newline_boundary(prev: Option<u8>, _next: Option<u8>) -> bool {
    prev == Some(b'\n')
}

impl Parsers {
    /// A transition between word and non-word bytes.
    pub fn boundary(&mut self) -> Parser {
        let a = self.anchor(word_boundary);
        self.expect(a, "word boundary")
    }

    /// The position just after a newline.
    pub fn boundary_newline(&mut self) -> Parser {
        let a = self.anchor(newline_boundary);
        self.expect(a, "start of newline")
    }

    pub fn whitespace(&mut self) -> Parser {
        let p = self.oneof(" \x0C\n\r\t\x0B");
        self.expect(p, "whitespace")
    }

    pub fn whitespaces(&mut self) -> Parser {
        let ws = self.whitespace();
        let p = self.many(Fold::Concat, ws);
        self.expect(p, "spaces")
    }

    /// Optional whitespace, discarded.
    pub fn blank(&mut self) -> Parser {
        let ws = self.whitespaces();
        let p = self.apply(ws, fold::discard);
        self.expect(p, "whitespace")
    }

    pub fn newline(&mut self) -> Parser {
        let p = self.char(b'\n');
        self.expect(p, "newline")
    }

    pub fn tab(&mut self) -> Parser {
        let p = self.char(b'\t');
        self.expect(p, "tab")
    }

    /// A backslash escape pair, kept raw.
    pub fn escape(&mut self) -> Parser {
        let bs = self.char(b'\\');
        let any = self.any();
        self.and(Fold::Concat, vec![bs, any])
    }

    pub fn digit(&mut self) -> Parser {
        let p = self.oneof("0123456789");
        self.expect(p, "digit")
    }

    pub fn hexdigit(&mut self) -> Parser {
        let p = self.oneof("0123456789ABCDEFabcdef");
        self.expect(p, "hex digit")
    }

    pub fn octdigit(&mut self) -> Parser {
        let p = self.oneof("01234567");
        self.expect(p, "oct digit")
    }

    pub fn digits(&mut self) -> Parser {
        let d = self.digit();
        let p = self.many1(Fold::Concat, d);
        self.expect(p, "digits")
    }

    pub fn hexdigits(&mut self) -> Parser {
        let d = self.hexdigit();
        let p = self.many1(Fold::Concat, d);
        self.expect(p, "hex digits")
    }

    pub fn octdigits(&mut self) -> Parser {
        let d = self.octdigit();
        let p = self.many1(Fold::Concat, d);
        self.expect(p, "oct digits")
    }

    pub fn lower(&mut self) -> Parser {
        let p = self.oneof("abcdefghijklmnopqrstuvwxyz");
        self.expect(p, "lowercase letter")
    }

    pub fn upper(&mut self) -> Parser {
        let p = self.oneof("ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        self.expect(p, "uppercase letter")
    }

    pub fn alpha(&mut self) -> Parser {
        let p = self.oneof("abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ");
        self.expect(p, "letter")
    }

    pub fn underscore(&mut self) -> Parser {
        let p = self.char(b'_');
        self.expect(p, "underscore")
    }

    pub fn alphanum(&mut self) -> Parser {
        let a = self.alpha();
        let d = self.digit();
        let u = self.underscore();
        let p = self.or(vec![a, d, u]);
        self.expect(p, "alphanumeric")
    }

    pub fn int(&mut self) -> Parser {
        let d = self.digits();
        let p = self.apply(d, fold::int);
        self.expect(p, "integer")
    }

    pub fn hex(&mut self) -> Parser {
        let d = self.hexdigits();
        let p = self.apply(d, fold::hex);
        self.expect(p, "hexadecimal")
    }

    pub fn oct(&mut self) -> Parser {
        let d = self.octdigits();
        let p = self.apply(d, fold::oct);
        self.expect(p, "octadecimal")
    }

    pub fn number(&mut self) -> Parser {
        let i = self.int();
        let h = self.hex();
        let o = self.oct();
        let p = self.or(vec![i, h, o]);
        self.expect(p, "number")
    }

    /// `[+-]?\d+(\.\d+)?([eE][+-]?[0-9]+)?`, kept as text.
    pub fn real(&mut self) -> Parser {
        let sign = self.oneof("+-");
        let p0 = self.maybe_lift(sign, Ctor::EmptyStr);
        let p1 = self.digits();
        let p2 = {
            let dot = self.char(b'.');
            let ds = self.digits();
            let frac = self.and(Fold::Concat, vec![dot, ds]);
            self.maybe_lift(frac, Ctor::EmptyStr)
        };
        let p3 = {
            let e = self.oneof("eE");
            let sign = self.oneof("+-");
            let sign = self.maybe_lift(sign, Ctor::EmptyStr);
            let ds = self.digits();
            let exp = self.and(Fold::Concat, vec![e, sign, ds]);
            self.maybe_lift(exp, Ctor::EmptyStr)
        };
        let p = self.and(Fold::Concat, vec![p0, p1, p2, p3]);
        self.expect(p, "real")
    }

    pub fn float(&mut self) -> Parser {
        let r = self.real();
        let p = self.apply(r, fold::float);
        self.expect(p, "float")
    }

    /// A `'c'` character literal; contents kept raw (escapes intact).
    pub fn char_lit(&mut self) -> Parser {
        let esc = self.escape();
        let any = self.any();
        let body = self.or(vec![esc, any]);
        let p = self.between(body, "'", "'");
        self.expect(p, "char")
    }

    /// A `"..."` string literal; contents kept raw (escapes intact).
    pub fn string_lit(&mut self) -> Parser {
        let esc = self.escape();
        let plain = self.noneof("\"");
        let item = self.or(vec![esc, plain]);
        let body = self.many(Fold::Concat, item);
        let p = self.between(body, "\"", "\"");
        self.expect(p, "string")
    }

    /// A `/.../` regex literal; contents kept raw (escapes intact).
    pub fn regex_lit(&mut self) -> Parser {
        let esc = self.escape();
        let plain = self.noneof("/");
        let item = self.or(vec![esc, plain]);
        let body = self.many(Fold::Concat, item);
        let p = self.between(body, "/", "/");
        self.expect(p, "regex")
    }

    /// `[A-Za-z_][A-Za-z0-9_]*`.
    pub fn ident(&mut self) -> Parser {
        let a = self.alpha();
        let u = self.underscore();
        let head = self.or(vec![a, u]);
        let an = self.alphanum();
        let tail = self.many(Fold::Concat, an);
        self.and(Fold::Concat, vec![head, tail])
    }

    pub fn startwith(&mut self, inner: Parser) -> Parser {
        let soi = self.soi();
        self.and(Fold::Second, vec![soi, inner])
    }

    pub fn endwith(&mut self, inner: Parser) -> Parser {
        let eoi = self.eoi();
        self.and(Fold::First, vec![inner, eoi])
    }

    /// `inner` spanning the entire input.
    pub fn whole(&mut self, inner: Parser) -> Parser {
        let soi = self.soi();
        let eoi = self.eoi();
        self.and(Fold::Second, vec![soi, inner, eoi])
    }

    pub fn stripl(&mut self, inner: Parser) -> Parser {
        let blank = self.blank();
        self.and(Fold::Second, vec![blank, inner])
    }

    pub fn stripr(&mut self, inner: Parser) -> Parser {
        let blank = self.blank();
        self.and(Fold::First, vec![inner, blank])
    }

    pub fn strip(&mut self, inner: Parser) -> Parser {
        let lead = self.blank();
        let trail = self.blank();
        self.and(Fold::Second, vec![lead, inner, trail])
    }

    /// `inner` followed by discarded whitespace.
    pub fn tok(&mut self, inner: Parser) -> Parser {
        let blank = self.blank();
        self.and(Fold::First, vec![inner, blank])
    }

    /// A whitespace-delimited literal.
    pub fn sym(&mut self, s: &str) -> Parser {
        let lit = self.literal(s);
        self.tok(lit)
    }

    /// `inner` padded by whitespace and spanning the entire input.
    pub fn total(&mut self, inner: Parser) -> Parser {
        let stripped = self.strip(inner);
        self.whole(stripped)
    }

    pub fn between(&mut self, inner: Parser, open: &str, close: &str) -> Parser {
        let o = self.literal(open);
        let c = self.literal(close);
        self.and(Fold::Second, vec![o, inner, c])
    }

    pub fn parens(&mut self, inner: Parser) -> Parser {
        self.between(inner, "(", ")")
    }

    pub fn braces(&mut self, inner: Parser) -> Parser {
        self.between(inner, "<", ">")
    }

    pub fn brackets(&mut self, inner: Parser) -> Parser {
        self.between(inner, "{", "}")
    }

    pub fn squares(&mut self, inner: Parser) -> Parser {
        self.between(inner, "[", "]")
    }

    pub fn tok_between(&mut self, inner: Parser, open: &str, close: &str) -> Parser {
        let o = self.sym(open);
        let t = self.tok(inner);
        let c = self.sym(close);
        self.and(Fold::Second, vec![o, t, c])
    }

    pub fn tok_parens(&mut self, inner: Parser) -> Parser {
        self.tok_between(inner, "(", ")")
    }

    pub fn tok_braces(&mut self, inner: Parser) -> Parser {
        self.tok_between(inner, "<", ">")
    }

    pub fn tok_brackets(&mut self, inner: Parser) -> Parser {
        self.tok_between(inner, "{", "}")
    }

    pub fn tok_squares(&mut self, inner: Parser) -> Parser {
        self.tok_between(inner, "[", "]")
    }
}
