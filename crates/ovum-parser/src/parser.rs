//! Recursive-descent parser over the bytecode token stream.
//!
//! Top-level declarations are `init-static` (at most one), `vtable`, and
//! `function` with its optional `pure(...)` and `no-jit` qualifiers, in
//! that qualifier order. Statements inside blocks are `if`, `while`, or a
//! single command whose immediate count comes from the opcode
//! classification table.

use log::debug;
use ovum_runtime::{FieldKind, VirtualTable, VirtualTableStore};
use ovum_vm::commands::{ArgKind, CommandArg, CommandError, classify, create_command};
use ovum_vm::{
    Block, ConditionalExecution, Executable, Function, FunctionStore, IfMultibranch,
    JitExecutorFactory, JitFunction, PureFunction, StoredFunction, WhileExecution,
};

use crate::errors::ParseError;
use crate::token::{Token, TokenKind};

/// Wrapper configuration the parser applies to every function it builds.
pub struct ParserOptions<'run> {
    /// Creates the opaque executor behind each `JitFunction`.
    pub jit_factory: &'run dyn JitExecutorFactory,
    /// Action-count boundary that triggers compilation.
    pub jit_boundary: u64,
}

/// Parses a whole program, populating the two stores.
///
/// Returns the `init-static` block when the program declares one. The
/// first error stops the parse.
pub fn parse_program(
    tokens: &[Token<'_>],
    functions: &mut FunctionStore,
    vtables: &mut VirtualTableStore,
    options: &ParserOptions<'_>,
) -> Result<Option<Block>, ParseError> {
    let mut parser = Parser { tokens, pos: 0, functions, vtables, options, init_static: None };
    parser.parse_top_level()?;
    Ok(parser.init_static)
}

struct Parser<'src, 'run> {
    tokens: &'run [Token<'src>],
    pos: usize,
    functions: &'run mut FunctionStore,
    vtables: &'run mut VirtualTableStore,
    options: &'run ParserOptions<'run>,
    init_static: Option<Block>,
}

impl<'src> Parser<'src, '_> {
    fn current(&self) -> Token<'src> {
        self.tokens.get(self.pos).copied().unwrap_or(Token {
            kind: TokenKind::EndOfFile,
            lexeme: "",
            line: 0,
            column: 0,
        })
    }

    fn is_eof(&self) -> bool {
        self.current().kind == TokenKind::EndOfFile
    }

    fn advance(&mut self) {
        if !self.is_eof() {
            self.pos += 1;
        }
    }

    fn is_kind(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn expect_keyword(&mut self, kind: TokenKind, keyword: &'static str) -> Result<(), ParseError> {
        if !self.is_kind(kind) {
            let token = self.current();
            return Err(ParseError::ExpectedKeyword {
                keyword,
                line: token.line,
                column: token.column,
            });
        }
        self.advance();
        Ok(())
    }

    fn expect_punct(&mut self, kind: TokenKind, punct: char) -> Result<(), ParseError> {
        if !self.is_kind(kind) {
            let token = self.current();
            return Err(ParseError::ExpectedPunct { punct, line: token.line, column: token.column });
        }
        self.advance();
        Ok(())
    }

    fn skip_comma(&mut self) {
        if self.is_kind(TokenKind::Comma) {
            self.advance();
        }
    }

    fn consume_identifier(&mut self) -> Result<String, ParseError> {
        let token = self.current();
        if token.kind != TokenKind::Identifier {
            return Err(ParseError::ExpectedIdentifier { line: token.line, column: token.column });
        }
        self.advance();
        Ok(token.lexeme.to_string())
    }

    fn consume_string_literal(&mut self) -> Result<String, ParseError> {
        let token = self.current();
        if token.kind != TokenKind::StringLiteral {
            return Err(ParseError::ExpectedLiteral {
                what: "string",
                line: token.line,
                column: token.column,
            });
        }
        self.advance();
        Ok(token.unescaped_string())
    }

    fn consume_int_literal(&mut self) -> Result<i64, ParseError> {
        let token = self.current();
        if token.kind != TokenKind::IntLiteral {
            return Err(ParseError::ExpectedLiteral {
                what: "integer",
                line: token.line,
                column: token.column,
            });
        }
        let value = token.lexeme.parse::<i64>().map_err(|_| ParseError::InvalidLiteral {
            what: "integer",
            lexeme: token.lexeme.to_string(),
            line: token.line,
            column: token.column,
        })?;
        self.advance();
        Ok(value)
    }

    fn consume_float_literal(&mut self) -> Result<f64, ParseError> {
        let token = self.current();
        if token.kind != TokenKind::FloatLiteral {
            return Err(ParseError::ExpectedLiteral {
                what: "float",
                line: token.line,
                column: token.column,
            });
        }
        let value = token.lexeme.parse::<f64>().map_err(|_| ParseError::InvalidLiteral {
            what: "float",
            lexeme: token.lexeme.to_string(),
            line: token.line,
            column: token.column,
        })?;
        self.advance();
        Ok(value)
    }

    fn consume_bool_literal(&mut self) -> Result<bool, ParseError> {
        let token = self.current();
        let value = match token.kind {
            TokenKind::True => true,
            TokenKind::False => false,
            _ => {
                return Err(ParseError::ExpectedLiteral {
                    what: "boolean",
                    line: token.line,
                    column: token.column,
                });
            }
        };
        self.advance();
        Ok(value)
    }

    // --- Top level ---

    fn parse_top_level(&mut self) -> Result<(), ParseError> {
        while !self.is_eof() {
            match self.current().kind {
                TokenKind::InitStatic => self.parse_init_static()?,
                TokenKind::VTable => self.parse_vtable()?,
                TokenKind::Pure | TokenKind::NoJit | TokenKind::Function => {
                    self.parse_function()?;
                }
                _ => {
                    let token = self.current();
                    return Err(ParseError::UnknownDeclaration {
                        token: token.to_string(),
                        line: token.line,
                        column: token.column,
                    });
                }
            }
        }
        Ok(())
    }

    fn parse_init_static(&mut self) -> Result<(), ParseError> {
        let token = self.current();
        if self.init_static.is_some() {
            return Err(ParseError::DuplicateInitStatic {
                line: token.line,
                column: token.column,
            });
        }
        self.advance();
        let block = self.parse_braced_block()?;
        debug!("parsed init-static with {} statements", block.len());
        self.init_static = Some(block);
        Ok(())
    }

    // --- vtable declarations ---

    fn parse_vtable(&mut self) -> Result<(), ParseError> {
        self.advance();
        let name_token = self.current();
        let class_name = self.consume_identifier()?;
        self.expect_punct(TokenKind::LeftBrace, '{')?;

        let mut table = VirtualTable::new(class_name, 0);
        while !self.is_kind(TokenKind::RightBrace) && !self.is_eof() {
            match self.current().kind {
                TokenKind::Size => {
                    self.advance();
                    self.expect_punct(TokenKind::Colon, ':')?;
                    let size = self.consume_int_literal()?;
                    table.set_size(size.max(0) as usize);
                }
                TokenKind::Interfaces => {
                    self.advance();
                    self.expect_punct(TokenKind::LeftBrace, '{')?;
                    while !self.is_kind(TokenKind::RightBrace) {
                        let interface = self.consume_identifier()?;
                        table.add_interface(interface);
                        self.skip_comma();
                    }
                    self.expect_punct(TokenKind::RightBrace, '}')?;
                }
                TokenKind::Methods => {
                    self.advance();
                    self.expect_punct(TokenKind::LeftBrace, '{')?;
                    while !self.is_kind(TokenKind::RightBrace) {
                        let virtual_id = self.consume_identifier()?;
                        self.expect_punct(TokenKind::Colon, ':')?;
                        let real_id = self.consume_identifier()?;
                        table.add_method(virtual_id, real_id);
                        self.skip_comma();
                    }
                    self.expect_punct(TokenKind::RightBrace, '}')?;
                }
                TokenKind::VarTable => {
                    self.advance();
                    self.expect_punct(TokenKind::LeftBrace, '{')?;
                    while !self.is_kind(TokenKind::RightBrace) {
                        // The slot name exists only in the source; the
                        // runtime field table is positional.
                        let _slot_name = self.consume_identifier()?;
                        self.expect_punct(TokenKind::Colon, ':')?;
                        let type_token = self.current();
                        let type_name = self.consume_identifier()?;
                        let kind = FieldKind::parse(&type_name).ok_or_else(|| {
                            ParseError::UnknownFieldType {
                                name: type_name,
                                line: type_token.line,
                                column: type_token.column,
                            }
                        })?;
                        self.expect_punct(TokenKind::At, '@')?;
                        let offset = self.consume_int_literal()?;
                        let _ = table.add_field(kind, offset.max(0) as usize);
                        self.skip_comma();
                    }
                    self.expect_punct(TokenKind::RightBrace, '}')?;
                }
                _ => {
                    let token = self.current();
                    return Err(ParseError::UnknownDirective {
                        name: token.lexeme.to_string(),
                        line: token.line,
                        column: token.column,
                    });
                }
            }
        }
        self.expect_punct(TokenKind::RightBrace, '}')?;

        debug!("installing vtable {}", table.name());
        self.vtables.add(table).map_err(|error| ParseError::Install {
            message: error.to_string(),
            line: name_token.line,
            column: name_token.column,
        })?;
        Ok(())
    }

    // --- function declarations ---

    fn parse_function(&mut self) -> Result<(), ParseError> {
        let mut pure_types: Option<Vec<String>> = None;
        if self.is_kind(TokenKind::Pure) {
            self.advance();
            self.expect_punct(TokenKind::LeftParen, '(')?;
            let mut types = Vec::new();
            while !self.is_kind(TokenKind::RightParen) {
                types.push(self.consume_identifier()?);
                self.skip_comma();
            }
            self.expect_punct(TokenKind::RightParen, ')')?;
            pure_types = Some(types);
        }

        let no_jit = if self.is_kind(TokenKind::NoJit) {
            self.advance();
            true
        } else {
            false
        };

        self.expect_keyword(TokenKind::Function, "function")?;
        self.expect_punct(TokenKind::Colon, ':')?;
        let arity = self.consume_int_literal()?;
        let name_token = self.current();
        let name = self.consume_identifier()?;
        let body = self.parse_braced_block()?;

        let install_error = |message: String| ParseError::Install {
            message,
            line: name_token.line,
            column: name_token.column,
        };

        // Wrappers compose pure-outermost, then jit, then the plain body.
        let mut stored =
            StoredFunction::Plain(Function::new(name.clone(), arity.max(0) as usize, body));
        if !no_jit {
            let executor = self.options.jit_factory.create(&name);
            stored = StoredFunction::Jit(JitFunction::new(
                executor,
                stored,
                self.options.jit_boundary,
            ));
        }
        if let Some(types) = pure_types {
            stored = StoredFunction::Pure(
                PureFunction::new(stored, types).map_err(|error| install_error(error.to_string()))?,
            );
        }

        debug!("installing function {name}");
        self.functions
            .add(stored)
            .map_err(|error| install_error(error.to_string()))?;
        Ok(())
    }

    // --- Statements ---

    fn parse_braced_block(&mut self) -> Result<Block, ParseError> {
        self.expect_punct(TokenKind::LeftBrace, '{')?;
        let mut block = Block::new();
        while !self.is_kind(TokenKind::RightBrace) {
            if self.is_eof() {
                return Err(ParseError::UnexpectedEof);
            }
            self.parse_statement(&mut block)?;
        }
        self.expect_punct(TokenKind::RightBrace, '}')?;
        Ok(block)
    }

    fn parse_statement(&mut self, block: &mut Block) -> Result<(), ParseError> {
        match self.current().kind {
            TokenKind::If => {
                let node = self.parse_if()?;
                block.push(Executable::If(node));
                Ok(())
            }
            TokenKind::While => {
                let node = self.parse_while()?;
                block.push(Executable::While(node));
                Ok(())
            }
            TokenKind::Identifier => {
                let command = self.parse_command()?;
                block.push(Executable::Command(command));
                Ok(())
            }
            _ => {
                let token = self.current();
                Err(ParseError::ExpectedCommand { line: token.line, column: token.column })
            }
        }
    }

    /// `if { cond } then { body } (else if { } then { })* (else { })?`
    ///
    /// A trailing `else` lowers into a final branch whose condition pushes
    /// `true`, so the tree keeps a single representation.
    fn parse_if(&mut self) -> Result<IfMultibranch, ParseError> {
        self.advance();
        let mut node = IfMultibranch::new();

        let condition = self.parse_braced_block()?;
        self.expect_keyword(TokenKind::Then, "then")?;
        let body = self.parse_braced_block()?;
        node.add_branch(ConditionalExecution::new(condition, body));

        while self.is_kind(TokenKind::Else) {
            self.advance();
            if self.is_kind(TokenKind::If) {
                self.advance();
                let condition = self.parse_braced_block()?;
                self.expect_keyword(TokenKind::Then, "then")?;
                let body = self.parse_braced_block()?;
                node.add_branch(ConditionalExecution::new(condition, body));
            } else {
                let else_body = self.parse_braced_block()?;
                let mut always = Block::new();
                let push_true = create_command("PushBool", CommandArg::Bool(true))
                    .expect("PushBool is a known opcode");
                always.push(Executable::Command(push_true));
                node.add_branch(ConditionalExecution::new(always, else_body));
                break;
            }
        }
        Ok(node)
    }

    /// `while { cond } then { body }`
    fn parse_while(&mut self) -> Result<WhileExecution, ParseError> {
        self.advance();
        let condition = self.parse_braced_block()?;
        self.expect_keyword(TokenKind::Then, "then")?;
        let body = self.parse_braced_block()?;
        Ok(WhileExecution::new(condition, body))
    }

    fn parse_command(&mut self) -> Result<ovum_vm::Command, ParseError> {
        let name_token = self.current();
        let name = name_token.lexeme.to_string();
        self.advance();

        let arg = match classify(&name) {
            ArgKind::None => CommandArg::None,
            ArgKind::Str => CommandArg::Str(self.consume_string_literal()?),
            ArgKind::Int => CommandArg::Int(self.consume_int_literal()?),
            ArgKind::Float => CommandArg::Float(self.consume_float_literal()?),
            ArgKind::Bool => CommandArg::Bool(self.consume_bool_literal()?),
            ArgKind::Ident => CommandArg::Ident(self.consume_identifier()?),
        };

        create_command(&name, arg).map_err(|error| match error {
            CommandError::Unknown(name) | CommandError::BadArgument(name) => {
                ParseError::UnknownCommand {
                    name,
                    line: name_token.line,
                    column: name_token.column,
                }
            }
        })
    }
}
