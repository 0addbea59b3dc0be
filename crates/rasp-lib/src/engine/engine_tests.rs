//! Engine behavior: primitives, backtracking, repetition accounting,
//! error propagation, and the depth/fuel bounds.

use crate::engine::{Engine, Limits};
use crate::fold::{Ctor, Fold};
use crate::graph::Parsers;
use crate::value::Value;

fn str_value(s: &str) -> Value {
    Value::Str(s.to_string())
}

#[test]
fn char_matches_and_reports() {
    let mut ps = Parsers::new();
    let a = ps.char(b'a');
    assert_eq!(ps.parse("t", "abc", a).unwrap(), str_value("a"));

    let err = ps.parse("t", "xyz", a).unwrap_err();
    assert_eq!(err.to_string(), "t:1:1: error: expected 'a' at 'x'");
}

#[test]
fn oneof_mismatch_reports_at_offset_zero() {
    let mut ps = Parsers::new();
    let p = ps.oneof("xyz");
    let err = ps.parse("t", "abc", p).unwrap_err();
    assert_eq!(err.state.pos, 0);
    insta::assert_snapshot!(err, @"t:1:1: error: expected one of 'xyz' at 'a'");
}

#[test]
fn or_short_circuits_and_leaves_cursor_after_match() {
    let mut ps = Parsers::new();
    let foo = ps.literal("foo");
    let bar = ps.literal("bar");
    let alt = ps.or(vec![foo, bar]);
    assert_eq!(ps.parse("t", "barxyz", alt).unwrap(), str_value("bar"));

    // The three consumed bytes leave the cursor at offset 3.
    let foo = ps.literal("foo");
    let bar = ps.literal("bar");
    let alt = ps.or(vec![foo, bar]);
    let rest = ps.literal("xyz");
    let seq = ps.and(Fold::Concat, vec![alt, rest]);
    assert_eq!(ps.parse("t", "barxyz", seq).unwrap(), str_value("barxyz"));
}

#[test]
fn or_merges_failures_from_all_alternatives() {
    let mut ps = Parsers::new();
    let foo = ps.literal("foo");
    let bar = ps.literal("bar");
    let alt = ps.or(vec![foo, bar]);
    let err = ps.parse("t", "qux", alt).unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("\"foo\""), "got: {rendered}");
    assert!(rendered.contains("\"bar\""), "got: {rendered}");
}

#[test]
fn many1_on_empty_input_reports_one_or_more() {
    let mut ps = Parsers::new();
    let d = ps.digit();
    let p = ps.many1(Fold::Concat, d);
    let err = ps.parse("t", "", p).unwrap_err();
    assert_eq!(
        err.to_string(),
        "t:1:1: error: expected one or more of digit at end of input"
    );
}

#[test]
fn many_consumes_each_accepted_repetition() {
    let mut ps = Parsers::new();
    let d = ps.digit();
    let digits = ps.many(Fold::Concat, d);
    let rest = ps.literal("abc");
    let seq = ps.and(Fold::Concat, vec![digits, rest]);
    assert_eq!(ps.parse("t", "123abc", seq).unwrap(), str_value("123abc"));

    // Zero repetitions still succeed.
    let d = ps.digit();
    let digits = ps.many(Fold::Concat, d);
    assert_eq!(ps.parse("t", "", digits).unwrap(), str_value(""));
}

#[test]
fn and_is_all_or_nothing() {
    let mut ps = Parsers::new();
    let ab = ps.literal("ab");
    let cd = ps.literal("cd");
    let pair = ps.and(Fold::Concat, vec![ab, cd]);
    let whole = ps.literal("abce");
    // The failing sequence must rewind fully for the fallback to see the
    // entire input.
    let alt = ps.or(vec![pair, whole]);
    assert_eq!(ps.parse("t", "abce", alt).unwrap(), str_value("abce"));
}

#[test]
fn count_matches_exactly_or_rewinds_to_zero_consumption() {
    let mut ps = Parsers::new();
    let d = ps.digit();
    let three = ps.count(3, Fold::Concat, d);
    assert_eq!(ps.parse("t", "123", three).unwrap(), str_value("123"));

    let d = ps.digit();
    let three = ps.count(3, Fold::Concat, d);
    let fallback = ps.literal("12a");
    let alt = ps.or(vec![three, fallback]);
    assert_eq!(ps.parse("t", "12a", alt).unwrap(), str_value("12a"));

    let d = ps.digit();
    let three = ps.count(3, Fold::Concat, d);
    let err = ps.parse("t", "12a", three).unwrap_err();
    assert!(err.to_string().contains("3 of digit"), "got: {err}");
}

#[test]
fn maybe_always_succeeds() {
    let mut ps = Parsers::new();
    let d = ps.digit();
    let opt = ps.maybe_lift(d, Ctor::EmptyStr);
    assert_eq!(ps.parse("t", "7", opt).unwrap(), str_value("7"));

    let d = ps.digit();
    let opt = ps.maybe_lift(d, Ctor::EmptyStr);
    assert_eq!(ps.parse("t", "x", opt).unwrap(), str_value(""));
}

#[test]
fn not_is_negative_lookahead() {
    let mut ps = Parsers::new();
    let d = ps.digit();
    let nd = ps.not(d);
    let a = ps.char(b'a');
    let seq = ps.and(Fold::Second, vec![nd, a]);
    assert_eq!(ps.parse("t", "a", seq).unwrap(), str_value("a"));

    let d = ps.digit();
    let nd = ps.not(d);
    assert!(ps.parse("t", "7", nd).is_err());
}

#[test]
fn predictive_disables_backtracking() {
    // `('a' 'a') | ('a' 'b')` needs backtracking on "ab".
    let mut ps = Parsers::new();
    let build = |ps: &mut Parsers| {
        let a1 = ps.char(b'a');
        let a2 = ps.char(b'a');
        let aa = ps.and(Fold::Concat, vec![a1, a2]);
        let a3 = ps.char(b'a');
        let b = ps.char(b'b');
        let ab = ps.and(Fold::Concat, vec![a3, b]);
        ps.or(vec![aa, ab])
    };

    let plain = build(&mut ps);
    assert_eq!(ps.parse("t", "ab", plain).unwrap(), str_value("ab"));

    let inner = build(&mut ps);
    let pred = ps.predictive(inner);
    assert!(ps.parse("t", "ab", pred).is_err());
}

#[test]
fn check_rejection_is_a_fatal_message() {
    let mut ps = Parsers::new();
    let d = ps.digits();
    let n = ps.apply(d, crate::fold::int);
    let small = ps.check(
        n,
        |v| matches!(v, Value::Int(i) if *i < 100),
        "number too large",
    );
    assert_eq!(ps.parse("t", "42", small).unwrap(), Value::Int(42));

    let err = ps.parse("t", "420", small).unwrap_err();
    assert_eq!(err.to_string(), "t: error: number too large");
}

#[test]
fn check_with_closure_context() {
    let mut ps = Parsers::new();
    let limit = 10;
    let d = ps.digits();
    let n = ps.apply(d, crate::fold::int);
    let bounded = ps.check_with(
        n,
        move |v| matches!(v, Value::Int(i) if *i < limit),
        "out of range",
    );
    assert!(ps.parse("t", "9", bounded).is_ok());
    assert!(ps.parse("t", "11", bounded).is_err());
}

#[test]
fn apply_with_captures_context() {
    let mut ps = Parsers::new();
    let prefix = "n=".to_string();
    let d = ps.digits();
    let labeled = ps.apply_with(d, move |v| Value::Str(format!("{prefix}{}", v.into_string())));
    assert_eq!(ps.parse("t", "42", labeled).unwrap(), str_value("n=42"));
}

#[test]
fn expect_replaces_inner_diagnostics() {
    let mut ps = Parsers::new();
    let d = ps.digit();
    let num = ps.many1(Fold::Concat, d);
    let labeled = ps.expect(num, "number");
    let err = ps.parse("t", "x", labeled).unwrap_err();
    assert_eq!(err.to_string(), "t:1:1: error: expected number at 'x'");
}

#[test]
fn undefined_parser_fails_structurally() {
    let mut ps = Parsers::new();
    let p = ps.declare("orphan");
    let err = ps.parse("t", "x", p).unwrap_err();
    assert_eq!(err.to_string(), "t: error: Parser Undefined!");
}

#[test]
fn recursive_definition_parses_nesting() {
    // parens : '(' <parens> ')' | 'x'
    let mut ps = Parsers::new();
    let parens = ps.declare("parens");
    let open = ps.char(b'(');
    let close = ps.char(b')');
    let nested = ps.and(Fold::Concat, vec![open, parens, close]);
    let x = ps.char(b'x');
    let body = ps.or(vec![nested, x]);
    ps.define(parens, body);

    assert_eq!(ps.parse("t", "((x))", parens).unwrap(), str_value("((x))"));
    assert!(ps.parse("t", "((x)", parens).is_err());
}

#[test]
fn deep_recursion_fails_cleanly() {
    let mut ps = Parsers::new();
    let parens = ps.declare("parens");
    let open = ps.char(b'(');
    let close = ps.char(b')');
    let nested = ps.and(Fold::Concat, vec![open, parens, close]);
    let x = ps.char(b'x');
    let body = ps.or(vec![nested, x]);
    ps.define(parens, body);

    let depth = 2000;
    let input = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
    let err = ps.parse("t", &input, parens).unwrap_err();
    assert!(
        err.to_string().contains("Maximum recursion depth exceeded!"),
        "got: {err}"
    );
}

#[test]
fn exec_fuel_bounds_total_work() {
    let mut ps = Parsers::new();
    let chars: Vec<_> = (0..10).map(|_| ps.char(b'a')).collect();
    let seq = ps.and(Fold::Concat, chars);

    let engine = Engine::new(&ps).limits(Limits::new().exec_fuel(3));
    let err = engine.parse("t", "aaaaaaaaaa", seq).unwrap_err();
    assert!(
        err.to_string().contains("Maximum parse steps exceeded!"),
        "got: {err}"
    );

    let engine = Engine::new(&ps).limits(Limits::new().exec_fuel(1000));
    assert!(engine.parse("t", "aaaaaaaaaa", seq).is_ok());
}

#[test]
fn lift_state_and_anchor() {
    let mut ps = Parsers::new();
    let a = ps.char(b'a');
    let st = ps.state();
    let seq = ps.and(Fold::Second, vec![a, st]);
    match ps.parse("t", "ab", seq).unwrap() {
        Value::State(s) => assert_eq!(s.pos, 1),
        other => panic!("unexpected: {other:?}"),
    }

    let lifted = ps.lift_val(Value::Int(7));
    assert_eq!(ps.parse("t", "", lifted).unwrap(), Value::Int(7));

    let word = ps.literal("cat");
    let b = ps.boundary();
    let seq = ps.and(Fold::First, vec![word, b]);
    assert_eq!(ps.parse("t", "cat!", seq).unwrap(), str_value("cat"));
}

#[test]
fn whole_requires_entire_input() {
    let mut ps = Parsers::new();
    let ab = ps.literal("ab");
    let whole = ps.whole(ab);
    assert!(ps.parse("t", "ab", whole).is_ok());

    let ab = ps.literal("ab");
    let whole = ps.whole(ab);
    let err = ps.parse("t", "abc", whole).unwrap_err();
    assert!(err.to_string().contains("end of input"), "got: {err}");
}

#[test]
fn parses_from_stream_and_file() {
    use std::io::{Cursor, Seek, SeekFrom, Write};

    let mut ps = Parsers::new();
    let foo = ps.literal("foo");
    let bar = ps.literal("bar");
    let alt = ps.or(vec![foo, bar]);

    let out = ps
        .parse_stream("<pipe>", Cursor::new(b"barbaz".to_vec()), alt)
        .unwrap();
    assert_eq!(out, str_value("bar"));

    let mut file = tempfile::tempfile().unwrap();
    file.write_all(b"foorest").unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    let out = ps.parse_file("<tmp>", file, alt).unwrap();
    assert_eq!(out, str_value("foo"));
}

#[test]
fn tok_discards_trailing_whitespace() {
    let mut ps = Parsers::new();
    let a = ps.literal("a");
    let ta = ps.tok(a);
    let b = ps.literal("b");
    let seq = ps.and(Fold::Concat, vec![ta, b]);
    assert_eq!(ps.parse("t", "a   b", seq).unwrap(), str_value("ab"));
}
