//! Error types for the Ovum bytecode front-end.
//!
//! Lexical and syntactic errors both carry the 1-based source position of
//! the offending character or token; the parser reports its first error
//! and stops.

use thiserror::Error;

/// Errors produced while tokenizing bytecode source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    /// A character outside the language's alphabet.
    #[error("Unexpected character '{character}' at line {line} column {column}")]
    UnexpectedCharacter {
        /// The offending character.
        character: char,
        /// 1-based line.
        line: u32,
        /// 1-based column.
        column: u32,
    },
    /// A string literal without a closing quote on its line.
    #[error("Unterminated string literal at line {line} column {column}")]
    UnterminatedString {
        /// 1-based line.
        line: u32,
        /// 1-based column.
        column: u32,
    },
    /// An escape other than `\n \t \r \\ \" \0` inside a string literal.
    #[error("Unknown escape '\\{escape}' in string literal at line {line} column {column}")]
    InvalidEscape {
        /// The character following the backslash.
        escape: char,
        /// 1-based line.
        line: u32,
        /// 1-based column.
        column: u32,
    },
    /// A numeric literal that does not fit its type.
    #[error("Malformed numeric literal '{lexeme}' at line {line} column {column}")]
    MalformedNumber {
        /// The literal text.
        lexeme: String,
        /// 1-based line.
        line: u32,
        /// 1-based column.
        column: u32,
    },
}

/// Errors produced by the recursive-descent parser.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A lexical error surfaced during tokenization.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// A specific keyword was required.
    #[error("Expected keyword '{keyword}' at line {line} column {column}")]
    ExpectedKeyword {
        /// The required keyword.
        keyword: &'static str,
        /// 1-based line.
        line: u32,
        /// 1-based column.
        column: u32,
    },
    /// A specific punctuation character was required.
    #[error("Expected '{punct}' at line {line} column {column}")]
    ExpectedPunct {
        /// The required character.
        punct: char,
        /// 1-based line.
        line: u32,
        /// 1-based column.
        column: u32,
    },
    /// An identifier was required.
    #[error("Expected identifier at line {line} column {column}")]
    ExpectedIdentifier {
        /// 1-based line.
        line: u32,
        /// 1-based column.
        column: u32,
    },
    /// A literal of the given kind was required.
    #[error("Expected {what} literal at line {line} column {column}")]
    ExpectedLiteral {
        /// Human name of the literal kind.
        what: &'static str,
        /// 1-based line.
        line: u32,
        /// 1-based column.
        column: u32,
    },
    /// A literal lexed but does not fit its value type.
    #[error("Invalid {what} literal '{lexeme}' at line {line} column {column}")]
    InvalidLiteral {
        /// Human name of the literal kind.
        what: &'static str,
        /// The literal text.
        lexeme: String,
        /// 1-based line.
        line: u32,
        /// 1-based column.
        column: u32,
    },
    /// A second `init-static` block.
    #[error("Multiple init-static blocks are not allowed (line {line} column {column})")]
    DuplicateInitStatic {
        /// 1-based line.
        line: u32,
        /// 1-based column.
        column: u32,
    },
    /// A top-level token that starts no known declaration.
    #[error("Unknown top-level declaration {token} at line {line} column {column}")]
    UnknownDeclaration {
        /// Display form of the offending token.
        token: String,
        /// 1-based line.
        line: u32,
        /// 1-based column.
        column: u32,
    },
    /// A statement position held neither `if`, `while`, nor a command.
    #[error("Expected command at line {line} column {column}")]
    ExpectedCommand {
        /// 1-based line.
        line: u32,
        /// 1-based column.
        column: u32,
    },
    /// A command name outside the opcode set.
    #[error("Unknown or unimplemented command '{name}' at line {line} column {column}")]
    UnknownCommand {
        /// The unknown name.
        name: String,
        /// 1-based line.
        line: u32,
        /// 1-based column.
        column: u32,
    },
    /// A `vtable` directive other than size/interfaces/methods/vartable.
    #[error("Unknown vtable directive '{name}' at line {line} column {column}")]
    UnknownDirective {
        /// The unknown directive.
        name: String,
        /// 1-based line.
        line: u32,
        /// 1-based column.
        column: u32,
    },
    /// A `vartable` field type outside the value-type set.
    #[error("Unknown field type '{name}' at line {line} column {column}")]
    UnknownFieldType {
        /// The unknown type name.
        name: String,
        /// 1-based line.
        line: u32,
        /// 1-based column.
        column: u32,
    },
    /// The end of input arrived mid-declaration.
    #[error("Unexpected end of input")]
    UnexpectedEof,
    /// Installing a parsed declaration into a store failed.
    #[error("{message} (line {line} column {column})")]
    Install {
        /// The store's failure description.
        message: String,
        /// 1-based line.
        line: u32,
        /// 1-based column.
        column: u32,
    },
}
