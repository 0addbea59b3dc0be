//! Fold and apply machinery.
//!
//! Sequence and repetition nodes reduce their collected sub-results with a
//! [`Fold`]; `apply` nodes transform a single success value. The built-in
//! folds are enum variants rather than bare function pointers so the graph
//! optimizer can recognize the AST-building and string-building folds
//! structurally when it flattens nested sequences.

use rasp_core::Ast;

use crate::value::Value;

/// A caller-supplied sequence/repetition reducer.
pub type FoldFn = fn(Vec<Value>) -> Value;

/// A caller-supplied value transformer.
pub type ApplyFn = fn(Value) -> Value;

/// A caller-supplied validator; rejecting destroys the value.
pub type CheckFn = fn(&mut Value) -> bool;

/// A zero-width anchor predicate over (last consumed, next) bytes.
pub type AnchorFn = fn(Option<u8>, Option<u8>) -> bool;

/// Default-value constructors for `maybe`/`not`/`lift`.
#[derive(Debug, Clone, Copy)]
pub enum Ctor {
    Null,
    EmptyStr,
    Custom(fn() -> Value),
}

impl Ctor {
    pub fn make(self) -> Value {
        match self {
            Ctor::Null => Value::Null,
            Ctor::EmptyStr => Value::Str(String::new()),
            Ctor::Custom(f) => f(),
        }
    }
}

/// Sequence/repetition fold rules.
#[derive(Debug, Clone, Copy)]
pub enum Fold {
    /// Drop everything, produce `Null`.
    Null,
    /// Keep the first sub-result.
    First,
    /// Keep the second sub-result.
    Second,
    /// Keep the third sub-result.
    Third,
    /// Concatenate string sub-results.
    Concat,
    /// The AST sequence rule: skip nulls, pass single survivors through,
    /// splice nested containers.
    Ast,
    /// Attach a leading `State` capture to the following tree.
    StateAst,
    Custom(FoldFn),
}

impl Fold {
    pub fn apply(self, xs: Vec<Value>) -> Value {
        match self {
            Fold::Null => Value::Null,
            Fold::First => nth(xs, 0),
            Fold::Second => nth(xs, 1),
            Fold::Third => nth(xs, 2),
            Fold::Concat => concat(xs),
            Fold::Ast => ast_fold(xs),
            Fold::StateAst => state_ast(xs),
            Fold::Custom(f) => f(xs),
        }
    }
}

fn nth(xs: Vec<Value>, index: usize) -> Value {
    xs.into_iter().nth(index).unwrap_or(Value::Null)
}

fn concat(xs: Vec<Value>) -> Value {
    let mut out = String::new();
    for x in xs {
        if let Value::Str(s) = x {
            out.push_str(&s);
        }
    }
    Value::Str(out)
}

/// The AST-building sequence fold.
///
/// Null sub-results are skipped; a single survivor passes through
/// unchanged; two or more survivors are flattened one level under a fresh
/// `>` container, with collapsing single-child containers contributing
/// their tag prefix to the promoted child.
fn ast_fold(mut xs: Vec<Value>) -> Value {
    match xs.len() {
        0 => return Value::Null,
        1 => return xs.pop().expect("len checked"),
        2 if xs[1].is_null() => return xs.swap_remove(0),
        2 if xs[0].is_null() => return xs.pop().expect("len checked"),
        _ => {}
    }

    let mut root = Ast::new(">", "");
    for x in xs {
        let Value::Ast(ast) = x else { continue };
        match ast.children.len() {
            0 => root.add_child(ast),
            1 => {
                let Ast { tag, mut children, .. } = ast;
                let mut child = children.pop().expect("len checked");
                child.add_root_tag(&tag);
                root.add_child(child);
            }
            _ => {
                for child in ast.children {
                    root.add_child(child);
                }
            }
        }
    }

    if let Some(first) = root.children.first() {
        root.state = first.state;
    }
    Value::Ast(root)
}

fn state_ast(xs: Vec<Value>) -> Value {
    let mut it = xs.into_iter();
    let state = it.next().unwrap_or(Value::Null);
    let value = it.next().unwrap_or(Value::Null);
    match (state, value) {
        (Value::State(s), Value::Ast(mut ast)) => {
            ast.set_state(s);
            Value::Ast(ast)
        }
        (_, other) => other,
    }
}

/// Discard a value (`blank` and friends).
pub fn discard(_: Value) -> Value {
    Value::Null
}

/// Turn matched text into an untagged leaf.
pub fn str_ast(value: Value) -> Value {
    match value {
        Value::Str(s) => Value::Ast(Ast::new("", &s)),
        other => other,
    }
}

/// Promote a multi-child tree to a synthetic root.
pub fn ast_add_root(value: Value) -> Value {
    match value {
        Value::Ast(ast) => Value::Ast(ast.add_root()),
        other => other,
    }
}

pub fn int(value: Value) -> Value {
    Value::Int(value.into_string().parse().unwrap_or(0))
}

pub fn hex(value: Value) -> Value {
    Value::Int(i64::from_str_radix(&value.into_string(), 16).unwrap_or(0))
}

pub fn oct(value: Value) -> Value {
    Value::Int(i64::from_str_radix(&value.into_string(), 8).unwrap_or(0))
}

pub fn float(value: Value) -> Value {
    Value::Float(value.into_string().parse().unwrap_or(0.0))
}
