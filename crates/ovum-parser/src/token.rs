//! Token definitions for the Ovum bytecode dialect.

use std::fmt::{self, Display, Formatter};

use logos::Logos;

/// The token kinds of the bytecode dialect.
///
/// Identifier bodies admit `<` and `>` because function ids like
/// `_GetHash_<C>` are single identifiers in this language.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    // Keywords
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("init-static")]
    InitStatic,
    #[token("function")]
    Function,
    #[token("pure")]
    Pure,
    #[token("no-jit")]
    NoJit,
    #[token("vtable")]
    VTable,
    #[token("size")]
    Size,
    #[token("interfaces")]
    Interfaces,
    #[token("methods")]
    Methods,
    #[token("vartable")]
    VarTable,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Literals and identifiers
    #[regex(r"[A-Za-z_][A-Za-z0-9_<>]*")]
    Identifier,
    #[regex(r"[0-9]+\.[0-9]*")]
    FloatLiteral,
    #[regex(r"[0-9]+")]
    IntLiteral,
    #[regex(r#""([^"\\\n]|\\[ntr\\"0])*""#)]
    StringLiteral,

    // Punctuation
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(":")]
    Colon,
    #[token("@")]
    At,

    // Synthetic
    EndOfFile,
}

impl TokenKind {
    /// Whether this kind is one of the fixed keywords.
    #[must_use]
    pub const fn is_keyword(self) -> bool {
        matches!(
            self,
            Self::If
                | Self::Then
                | Self::Else
                | Self::While
                | Self::InitStatic
                | Self::Function
                | Self::Pure
                | Self::NoJit
                | Self::VTable
                | Self::Size
                | Self::Interfaces
                | Self::Methods
                | Self::VarTable
                | Self::True
                | Self::False
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::If => "if",
            Self::Then => "then",
            Self::Else => "else",
            Self::While => "while",
            Self::InitStatic => "init-static",
            Self::Function => "function",
            Self::Pure => "pure",
            Self::NoJit => "no-jit",
            Self::VTable => "vtable",
            Self::Size => "size",
            Self::Interfaces => "interfaces",
            Self::Methods => "methods",
            Self::VarTable => "vartable",
            Self::True => "true",
            Self::False => "false",
            Self::Identifier => "<identifier>",
            Self::FloatLiteral => "<float literal>",
            Self::IntLiteral => "<integer literal>",
            Self::StringLiteral => "<string literal>",
            Self::LeftBrace => "{",
            Self::RightBrace => "}",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::LeftBracket => "[",
            Self::RightBracket => "]",
            Self::Colon => ":",
            Self::At => "@",
            Self::EndOfFile => "<end of file>",
        };
        write!(f, "{text}")
    }
}

/// One token: kind, source slice, and the position of its first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    /// Token kind.
    pub kind: TokenKind,
    /// The source text of the token.
    pub lexeme: &'src str,
    /// 1-based line of the first character.
    pub line: u32,
    /// 1-based column of the first character.
    pub column: u32,
}

impl Token<'_> {
    /// Decodes a string literal's body, resolving its escapes.
    ///
    /// Only call on [`TokenKind::StringLiteral`] tokens; the lexer has
    /// already guaranteed the quotes are balanced and every escape is one
    /// of `\n \t \r \\ \" \0`.
    #[must_use]
    pub fn unescaped_string(&self) -> String {
        let body = &self.lexeme[1..self.lexeme.len() - 1];
        let mut out = String::with_capacity(body.len());
        let mut chars = body.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some('0') => out.push('\0'),
                // Unreachable for lexer-produced tokens.
                Some(other) => out.push(other),
                None => {}
            }
        }
        out
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.lexeme.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "'{}'", self.lexeme)
        }
    }
}
