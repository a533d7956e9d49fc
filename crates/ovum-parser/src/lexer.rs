//! The bytecode lexer: a logos-driven scanner wrapped with line/column
//! tracking.
//!
//! The token table is the derived DFA on [`TokenKind`]; this module adds
//! source positions and turns match failures into diagnosable lexical
//! errors (unexpected character, unterminated string, invalid escape).

use logos::Logos;

use crate::errors::LexError;
use crate::token::{Token, TokenKind};

/// Byte offsets of every line start, for offset-to-position translation.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                starts.push(offset + 1);
            }
        }
        Self { starts }
    }

    /// 1-based `(line, column)` of a byte offset.
    fn position(&self, offset: usize) -> (u32, u32) {
        let line = match self.starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index - 1,
        };
        let column = offset - self.starts[line];
        (line as u32 + 1, column as u32 + 1)
    }
}

/// Tokenizes a whole source text.
///
/// Returns the token list terminated by a single end-of-input token, or
/// the first lexical error.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, LexError> {
    let index = LineIndex::new(source);
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let (line, column) = index.position(span.start);
        match result {
            Ok(kind) => {
                tokens.push(Token { kind, lexeme: &source[span.start..span.end], line, column });
            }
            Err(()) => {
                return Err(diagnose(source, span.start, &index));
            }
        }
    }

    let (line, column) = index.position(source.len());
    tokens.push(Token { kind: TokenKind::EndOfFile, lexeme: "", line, column });
    Ok(tokens)
}

/// Explains a match failure at `offset`.
///
/// A failure on a double quote means the string regex could not close:
/// either an invalid escape or a missing terminator. Everything else is a
/// character outside the alphabet.
fn diagnose(source: &str, offset: usize, index: &LineIndex) -> LexError {
    let (line, column) = index.position(offset);
    let mut chars = source[offset..].chars();
    let first = chars.next().unwrap_or('\0');

    if first != '"' {
        return LexError::UnexpectedCharacter { character: first, line, column };
    }

    let mut cursor = offset + 1;
    while let Some(c) = chars.next() {
        match c {
            '"' => break,
            '\n' => break,
            '\\' => {
                let escape = chars.next().unwrap_or('\0');
                if !matches!(escape, 'n' | 't' | 'r' | '\\' | '"' | '0') {
                    let (line, column) = index.position(cursor);
                    return LexError::InvalidEscape { escape, line, column };
                }
                cursor += c.len_utf8() + escape.len_utf8();
            }
            _ => cursor += c.len_utf8(),
        }
    }
    LexError::UnterminatedString { line, column }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_point_at_the_first_character() {
        let tokens = tokenize("vtable Foo {\n  size : 16\n}").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::VTable);
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!(tokens[1].lexeme, "Foo");
        assert_eq!((tokens[1].line, tokens[1].column), (1, 8));
        assert_eq!(tokens[3].kind, TokenKind::Size);
        assert_eq!((tokens[3].line, tokens[3].column), (2, 3));
    }

    #[test]
    fn identifiers_admit_angle_brackets() {
        let tokens = tokenize("_GetHash_<C>").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].lexeme, "_GetHash_<C>");
    }

    #[test]
    fn hyphenated_keywords_lex_as_one_token() {
        let tokens = tokenize("init-static no-jit").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::InitStatic);
        assert_eq!(tokens[1].kind, TokenKind::NoJit);
    }

    #[test]
    fn unexpected_characters_are_rejected() {
        let error = tokenize("PushInt $1").unwrap_err();
        assert_eq!(
            error,
            LexError::UnexpectedCharacter { character: '$', line: 1, column: 9 }
        );
    }

    #[test]
    fn unterminated_strings_are_rejected() {
        assert!(matches!(
            tokenize("PushString \"oops").unwrap_err(),
            LexError::UnterminatedString { .. }
        ));
        assert!(matches!(
            tokenize("PushString \"line\nbreak\"").unwrap_err(),
            LexError::UnterminatedString { .. }
        ));
    }

    #[test]
    fn invalid_escapes_are_rejected() {
        assert!(matches!(
            tokenize(r#"PushString "bad \x escape""#).unwrap_err(),
            LexError::InvalidEscape { escape: 'x', .. }
        ));
    }

    #[test]
    fn string_escapes_decode() {
        let tokens = tokenize(r#""a\tb\n\"q\"\\\0""#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].unescaped_string(), "a\tb\n\"q\"\\\0");
    }

    #[test]
    fn numeric_literals_split_on_the_dot() {
        let tokens = tokenize("42 3.25 7.").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::IntLiteral);
        assert_eq!(tokens[1].kind, TokenKind::FloatLiteral);
        assert_eq!(tokens[2].kind, TokenKind::FloatLiteral);
    }

    #[test]
    fn end_of_input_is_a_single_terminal_token() {
        let tokens = tokenize("").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::EndOfFile);
    }
}
