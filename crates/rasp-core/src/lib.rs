//! Core data structures for rasp.
//!
//! This crate holds the pieces shared by the combinator graph and the
//! grammar compiler:
//! - [`State`] - a position in the input (byte offset, row, column)
//! - [`Input`] - a parse session over a string, file, or byte stream, with
//!   mark/rewind backtracking
//! - [`ParseError`] - the expectation-set / fatal-message error value and its
//!   farthest-failure merge rule
//! - [`Ast`] - the generic tagged tree produced by grammar-compiled parsers

pub mod ast;
pub mod error;
pub mod input;
pub mod state;

pub use ast::Ast;
pub use error::ParseError;
pub use input::Input;
pub use state::State;
