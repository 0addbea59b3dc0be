//! Runtime output values.

use rasp_core::{Ast, State};

/// The value produced by running a parser.
///
/// A closed sum over everything the built-in folds and apply functions
/// construct. Losing branches drop their values when the engine unwinds, so
/// discarded outputs are destroyed exactly once by ordinary ownership.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Str(String),
    Int(i64),
    Float(f64),
    State(State),
    Ast(Ast),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The string contents, or empty for non-string values.
    pub fn into_string(self) -> String {
        match self {
            Value::Str(s) => s,
            _ => String::new(),
        }
    }

    pub fn as_ast(&self) -> Option<&Ast> {
        match self {
            Value::Ast(ast) => Some(ast),
            _ => None,
        }
    }

    pub fn into_ast(self) -> Option<Ast> {
        match self {
            Value::Ast(ast) => Some(ast),
            _ => None,
        }
    }
}
