//! Regex compiler acceptance and rejection.

use crate::graph::{Parser, Parsers};
use crate::regex::RegexFlags;
use crate::value::Value;

fn matches(ps: &Parsers, p: Parser, input: &str) -> Option<String> {
    let whole = input.to_string();
    match ps.parse("<re>", &whole, p) {
        Ok(Value::Str(s)) => Some(s),
        Ok(other) => panic!("regex produced non-string: {other:?}"),
        Err(_) => None,
    }
}

#[test]
fn literal_characters() {
    let mut ps = Parsers::new();
    let p = ps.re("abc");
    assert_eq!(matches(&ps, p, "abc"), Some("abc".into()));
    assert_eq!(matches(&ps, p, "abd"), None);
}

#[test]
fn digits_with_optional_sign() {
    let mut ps = Parsers::new();
    let p = ps.re("-?[0-9]+");
    assert_eq!(matches(&ps, p, "42"), Some("42".into()));
    assert_eq!(matches(&ps, p, "-7"), Some("-7".into()));
    assert_eq!(matches(&ps, p, "x"), None);
}

#[test]
fn character_class_ranges() {
    let mut ps = Parsers::new();
    let p = ps.re("[a-c]");
    assert_eq!(matches(&ps, p, "a"), Some("a".into()));
    assert_eq!(matches(&ps, p, "b"), Some("b".into()));
    assert_eq!(matches(&ps, p, "c"), Some("c".into()));
    assert_eq!(matches(&ps, p, "d"), None);
}

#[test]
fn negated_class() {
    let mut ps = Parsers::new();
    let p = ps.re("[^ab]");
    assert_eq!(matches(&ps, p, "c"), Some("c".into()));
    assert_eq!(matches(&ps, p, "a"), None);
}

#[test]
fn class_shorthand_escapes() {
    let mut ps = Parsers::new();
    let p = ps.re("[\\d]+");
    assert_eq!(matches(&ps, p, "123"), Some("123".into()));
    assert_eq!(matches(&ps, p, "x"), None);
}

#[test]
fn quantifiers() {
    let mut ps = Parsers::new();

    let star = ps.re("ab*");
    assert_eq!(matches(&ps, star, "a"), Some("a".into()));
    assert_eq!(matches(&ps, star, "abbb"), Some("abbb".into()));

    let plus = ps.re("ab+");
    assert_eq!(matches(&ps, plus, "a"), None);
    assert_eq!(matches(&ps, plus, "ab"), Some("ab".into()));

    let opt = ps.re("ab?c");
    assert_eq!(matches(&ps, opt, "abc"), Some("abc".into()));
    assert_eq!(matches(&ps, opt, "ac"), Some("ac".into()));

    let exact = ps.re("a{3}");
    assert_eq!(matches(&ps, exact, "aaa"), Some("aaa".into()));
    assert_eq!(matches(&ps, exact, "aa"), None);
}

#[test]
fn alternation_and_grouping() {
    let mut ps = Parsers::new();
    let p = ps.re("(ab|cd)ef");
    assert_eq!(matches(&ps, p, "abef"), Some("abef".into()));
    assert_eq!(matches(&ps, p, "cdef"), Some("cdef".into()));
    assert_eq!(matches(&ps, p, "adef"), None);
}

#[test]
fn shorthand_character_classes() {
    let mut ps = Parsers::new();
    let word = ps.re("\\w+");
    assert_eq!(matches(&ps, word, "ab_1"), Some("ab_1".into()));

    let digits = ps.re("\\d+");
    assert_eq!(matches(&ps, digits, "99"), Some("99".into()));
    assert_eq!(matches(&ps, digits, "ab"), None);

    let nondigit = ps.re("\\D");
    assert_eq!(matches(&ps, nondigit, "a"), Some("".into()));
    assert_eq!(matches(&ps, nondigit, "1"), None);
}

#[test]
fn escaped_metacharacters() {
    let mut ps = Parsers::new();
    let p = ps.re("\\(\\)");
    assert_eq!(matches(&ps, p, "()"), Some("()".into()));

    let nl = ps.re("a\\nb");
    assert_eq!(matches(&ps, nl, "a\nb"), Some("a\nb".into()));
}

#[test]
fn dot_respects_dotall() {
    let mut ps = Parsers::new();
    let plain = ps.re(".");
    assert_eq!(matches(&ps, plain, "x"), Some("x".into()));
    assert_eq!(matches(&ps, plain, "\n"), None);

    let dotall = ps.re_mode(
        ".",
        RegexFlags {
            multiline: false,
            dotall: true,
        },
    );
    assert_eq!(matches(&ps, dotall, "\n"), Some("\n".into()));
}

#[test]
fn anchors() {
    let mut ps = Parsers::new();
    let p = ps.re("^a$");
    assert_eq!(matches(&ps, p, "a"), Some("a".into()));

    let b = ps.re("a\\b");
    assert_eq!(matches(&ps, b, "a"), Some("a".into()));
}

#[test]
fn word_boundary_rejects_mid_word() {
    let mut ps = Parsers::new();
    // `a\bb` puts a boundary between two word bytes: never matches.
    let p = ps.re("a\\bb");
    assert_eq!(matches(&ps, p, "ab"), None);
}

#[test]
fn malformed_pattern_fails_lazily() {
    let mut ps = Parsers::new();
    let p = ps.re(")");
    let err = ps.parse("<re>", "x", p).unwrap_err();
    assert!(err.to_string().contains("Invalid Regex"), "got: {err}");

    let p = ps.re("[]");
    let err = ps.parse("<re>", "x", p).unwrap_err();
    assert!(
        err.to_string().contains("Invalid Regex Range Expression"),
        "got: {err}"
    );
}

#[test]
fn equivalent_to_hand_built_graph() {
    let mut ps = Parsers::new();
    let compiled = ps.re("a|b");
    let a = ps.char(b'a');
    let b = ps.char(b'b');
    let hand = ps.or(vec![a, b]);

    for input in ["a", "b", "c", ""] {
        let lhs = ps.parse("<re>", input, compiled);
        let rhs = ps.parse("<re>", input, hand);
        assert_eq!(lhs.is_ok(), rhs.is_ok(), "diverged on {input:?}");
        if let (Ok(l), Ok(r)) = (lhs, rhs) {
            assert_eq!(l, r, "diverged on {input:?}");
        }
    }
}
