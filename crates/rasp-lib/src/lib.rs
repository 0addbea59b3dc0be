//! rasp: a runtime parser-combinator engine.
//!
//! Parsers are nodes in an arena ([`Parsers`]) addressed by copyable
//! [`Parser`] handles. Primitive matchers and composite combinators build a
//! graph; the engine walks it against a string, file, or byte stream with
//! full backtracking, producing either a [`Value`] (generically, a tagged
//! [`Ast`]) or a renderable [`ParseError`].
//!
//! The textual grammar DSL is compiled by a parser built from these same
//! combinators, including a nested regex-literal compiler.
//!
//! # Example
//!
//! ```
//! use rasp_lib::{LangFlags, Parsers, Value};
//!
//! let mut ps = Parsers::new();
//! let number = ps.declare("number");
//! ps.lang(LangFlags::default(), "number : /-?[0-9]+/ ;", &[number])
//!     .unwrap();
//!
//! match ps.parse("<stdin>", "42", number).unwrap() {
//!     Value::Ast(ast) => {
//!         assert_eq!(ast.tag, "number");
//!         assert_eq!(ast.contents, "42");
//!     }
//!     other => panic!("unexpected output: {other:?}"),
//! }
//! ```

pub mod engine;
pub mod escape;
pub mod fold;
pub mod grammar;
pub mod graph;
pub mod printer;
pub mod regex;
mod value;

pub use engine::{Engine, Limits};
pub use fold::{AnchorFn, ApplyFn, CheckFn, Ctor, Fold};
pub use grammar::{GrammarError, LangFlags};
pub use graph::{Parser, Parsers};
pub use printer::ErrorPrinter;
pub use rasp_core::{Ast, Input, ParseError, State};
pub use regex::RegexFlags;
pub use value::Value;
