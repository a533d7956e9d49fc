//! # Ovum Bytecode Parser
//!
//! This crate turns Ovum bytecode source text into the execution tree the
//! VM interprets, populating the function and virtual-table stores along
//! the way.
//!
//! The front-end has two stages:
//!
//! - [`lexer`] produces positioned tokens over the fixed keyword and
//!   punctuation set of the bytecode dialect.
//! - [`parser`] is a recursive-descent parser over those tokens that
//!   recognizes `init-static`, `vtable`, and `function` declarations
//!   (with their `pure`/`no-jit` qualifiers), lowers `if`/`while`
//!   statements, and consults the opcode classification table for
//!   commands.
//!
//! The parser returns its first error and stops; both error types carry
//! the source position of the offending token.

pub mod errors;
pub mod lexer;
pub mod parser;
pub mod token;

pub use errors::{LexError, ParseError};
pub use lexer::tokenize;
pub use parser::{ParserOptions, parse_program};
pub use token::{Token, TokenKind};

/// Version of the Ovum bytecode parser
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
