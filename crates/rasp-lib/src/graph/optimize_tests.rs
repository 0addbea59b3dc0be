//! Optimizer rewrites: flattening and no-op elision.

use crate::fold::{Ctor, Fold};
use crate::graph::Parsers;
use crate::value::Value;

#[test]
fn flattens_nested_or_chains() {
    let mut ps = Parsers::new();
    let a = ps.char(b'a');
    let b = ps.char(b'b');
    let c = ps.char(b'c');
    let inner = ps.or(vec![b, c]);
    let outer = ps.or(vec![a, inner]);

    ps.optimize(outer);
    assert_eq!(ps.dump(outer), "('a' | 'b' | 'c')");
}

#[test]
fn flattens_leading_or() {
    let mut ps = Parsers::new();
    let a = ps.char(b'a');
    let b = ps.char(b'b');
    let c = ps.char(b'c');
    let inner = ps.or(vec![a, b]);
    let outer = ps.or(vec![inner, c]);

    ps.optimize(outer);
    assert_eq!(ps.dump(outer), "('a' | 'b' | 'c')");
}

#[test]
fn flattens_same_fold_and_chains() {
    let mut ps = Parsers::new();
    let a = ps.char(b'a');
    let b = ps.char(b'b');
    let c = ps.char(b'c');
    let inner = ps.and(Fold::Concat, vec![b, c]);
    let outer = ps.and(Fold::Concat, vec![a, inner]);

    ps.optimize(outer);
    assert_eq!(ps.dump(outer), "('a' 'b' 'c')");
    assert_eq!(
        ps.parse("t", "abc", outer).unwrap(),
        Value::Str("abc".into())
    );
}

#[test]
fn does_not_merge_across_different_folds() {
    let mut ps = Parsers::new();
    let a = ps.char(b'a');
    let b = ps.char(b'b');
    let c = ps.char(b'c');
    let inner = ps.and(Fold::Ast, vec![b, c]);
    let outer = ps.and(Fold::Concat, vec![a, inner]);

    ps.optimize(outer);
    assert_eq!(ps.dump(outer), "('a' ('b' 'c'))");
}

#[test]
fn elides_no_op_sequence_heads() {
    let mut ps = Parsers::new();
    let pass = ps.pass();
    let a = ps.char(b'a');
    let pair = ps.and(Fold::Ast, vec![pass, a]);
    ps.optimize(pair);
    assert_eq!(ps.dump(pair), "'a'");

    let lift = ps.lift(Ctor::EmptyStr);
    let b = ps.char(b'b');
    let pair = ps.and(Fold::Concat, vec![lift, b]);
    ps.optimize(pair);
    assert_eq!(ps.dump(pair), "'b'");
}

#[test]
fn never_splices_retained_nodes() {
    let mut ps = Parsers::new();
    let named = ps.declare("named");
    let a = ps.char(b'a');
    let b = ps.char(b'b');
    let body = ps.or(vec![a, b]);
    ps.define(named, body);

    let c = ps.char(b'c');
    let outer = ps.or(vec![c, named]);
    ps.optimize(outer);
    assert_eq!(ps.dump(outer), "('c' | <named>)");
}

#[test]
fn optimization_preserves_parse_results() {
    let mut ps = Parsers::new();
    let build = |ps: &mut Parsers| {
        let a = ps.char(b'a');
        let b = ps.char(b'b');
        let c = ps.char(b'c');
        let tail = ps.or(vec![b, c]);
        ps.or(vec![a, tail])
    };

    let plain = build(&mut ps);
    let optimized = build(&mut ps);
    ps.optimize(optimized);

    for input in ["a", "b", "c", "d"] {
        let lhs = ps.parse("t", input, plain);
        let rhs = ps.parse("t", input, optimized);
        assert_eq!(lhs.is_ok(), rhs.is_ok(), "diverged on {input:?}");
        if let (Ok(l), Ok(r)) = (lhs, rhs) {
            assert_eq!(l, r, "diverged on {input:?}");
        }
    }
}
