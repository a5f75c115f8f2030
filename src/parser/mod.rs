pub mod ast;

use crate::{
    lexer::{
        token::{Token, TokenType},
        Lexer,
    },
    parser::ast::{Block, Expr, Ident, Infix, Literal, Precedence, Prefix, Program, Statement},
    stack::ensure_sufficient_stack,
};
use std::rc::Rc;
use thiserror::Error;
use tracing::debug;

/// Expressions and blocks nested deeper than this are rejected.
pub const MAX_NESTING_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected next token to be {expected}, got {found} instead")]
    UnexpectedToken { expected: TokenType, found: Token },
    #[error("no prefix parse function for {0} found")]
    NoPrefixParseFn(Token),
    #[error("could not parse {0:?} as integer")]
    InvalidInteger(String),
    #[error("expression nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

/// Every error recorded while parsing one program, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parser errors:\n{}", list_errors(.0))]
pub struct ParseErrors(pub Vec<ParseError>);

fn list_errors(errors: &[ParseError]) -> String {
    errors.iter().map(|error| format!("\t{}\n", error)).collect()
}

/// Lexes and parses `input`, failing if any statement was malformed.
pub fn parse(input: &str) -> Result<Program, ParseErrors> {
    let mut parser = Parser::new(Lexer::new(input));
    let program = parser.parse_program();

    if parser.errors.is_empty() {
        Ok(program)
    } else {
        Err(ParseErrors(parser.errors))
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peek: Token,
    errors: Vec<ParseError>,
    // Braces opened and not yet closed, counting the current token.
    brace_depth: usize,
    nesting: usize,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();

        let mut parser = Self {
            lexer,
            current,
            peek,
            errors: Vec::new(),
            brace_depth: 0,
            nesting: 0,
        };
        parser.track_braces();

        parser
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();

        while !self.current_is(TokenType::Eof) {
            match self.parse_statement() {
                Some(statement) => statements.push(statement),
                None => self.synchronize(),
            }
            self.next_token();
        }

        Program { statements }
    }

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.current = std::mem::replace(&mut self.peek, next);
        self.track_braces();
    }

    fn track_braces(&mut self) {
        match self.current.token_type {
            TokenType::LBrace => self.brace_depth += 1,
            TokenType::RBrace => self.brace_depth = self.brace_depth.saturating_sub(1),
            _ => {}
        }
    }

    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if self.nesting >= MAX_NESTING_DEPTH {
            self.push_error(ParseError::NestingTooDeep(MAX_NESTING_DEPTH));
            return None;
        }

        self.nesting += 1;
        let parsed = ensure_sufficient_stack(|| parse(self));
        self.nesting -= 1;

        parsed
    }

    // Skips the rest of a broken statement, stopping on its last token so the
    // caller's advance lands on the next statement or the enclosing `}`.
    // Braces opened while skipping are skipped as a whole.
    fn synchronize(&mut self) {
        let mut depth = 0usize;

        loop {
            match self.current.token_type {
                TokenType::LBrace => depth += 1,
                TokenType::RBrace => depth = depth.saturating_sub(1),
                TokenType::Semicolon if depth == 0 => return,
                TokenType::Eof => return,
                _ => {}
            }

            if self.peek_is(TokenType::Eof) || (depth == 0 && self.peek_is(TokenType::RBrace)) {
                return;
            }
            self.next_token();
        }
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current.token_type {
            TokenType::Let => self.parse_let_statement(),
            TokenType::Return => self.parse_return_statement(),
            TokenType::LBrace => self.parse_block_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        self.expect_peek(TokenType::Ident)?;
        let ident = self.current.literal.clone();
        self.expect_peek(TokenType::Assign)?;
        self.next_token();

        let expr = self.parse_expression(Precedence::Lowest)?;
        self.parse_to_semicolon_if_exists();

        Some(Statement::Let(ident, expr))
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        if self.peek_is(TokenType::Semicolon)
            || self.peek_is(TokenType::RBrace)
            || self.peek_is(TokenType::Eof)
        {
            self.parse_to_semicolon_if_exists();
            return Some(Statement::Return(None));
        }
        self.next_token();

        let expr = self.parse_expression(Precedence::Lowest)?;
        self.parse_to_semicolon_if_exists();

        Some(Statement::Return(Some(expr)))
    }

    fn parse_block_statement(&mut self) -> Option<Statement> {
        let block = self.parse_block()?;
        self.parse_to_semicolon_if_exists();

        Some(Statement::Block(block))
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.parse_to_semicolon_if_exists();

        Some(Statement::Expression(expr))
    }

    /// Parses `{ statement* }` starting on the opening brace, ending on the closing one.
    fn parse_block(&mut self) -> Option<Block> {
        self.nested(Self::parse_block_inner)
    }

    fn parse_block_inner(&mut self) -> Option<Block> {
        let opened_at = self.brace_depth;
        self.next_token();
        let mut statements = Vec::new();

        while !self.current_is(TokenType::RBrace) && !self.current_is(TokenType::Eof) {
            match self.parse_statement() {
                Some(statement) => statements.push(statement),
                // The broken statement ran into this block's own closing brace.
                None if self.current_is(TokenType::RBrace) && self.brace_depth < opened_at => {
                    break
                }
                None => self.synchronize(),
            }
            self.next_token();
        }

        if !self.current_is(TokenType::RBrace) {
            self.push_error(ParseError::UnexpectedToken {
                expected: TokenType::RBrace,
                found: self.current.clone(),
            });
            return None;
        }

        Some(Block { statements })
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expr> {
        self.nested(|parser| parser.parse_expression_inner(precedence))
    }

    fn parse_expression_inner(&mut self, precedence: Precedence) -> Option<Expr> {
        let mut left = self.parse_prefix()?;

        while !self.peek_is(TokenType::Semicolon) && precedence < self.peek_precedence() {
            self.next_token();
            left = self.parse_infix(left)?;
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expr> {
        match self.current.token_type {
            TokenType::Ident => Some(Expr::Ident(self.current.literal.clone())),
            TokenType::Int => self.parse_integer_literal(),
            TokenType::String => Some(Expr::Literal(Literal::String(
                self.current.literal.clone(),
            ))),
            TokenType::True => Some(Expr::Literal(Literal::Bool(true))),
            TokenType::False => Some(Expr::Literal(Literal::Bool(false))),
            TokenType::Bang => self.parse_prefix_operator(Prefix::Bang),
            TokenType::Minus => self.parse_prefix_operator(Prefix::Minus),
            TokenType::LParen => self.parse_paren(),
            TokenType::LBracket => self.parse_array(),
            TokenType::If => self.parse_if(),
            TokenType::Function => self.parse_function(),
            _ => {
                self.push_error(ParseError::NoPrefixParseFn(self.current.clone()));
                None
            }
        }
    }

    fn parse_infix(&mut self, left: Expr) -> Option<Expr> {
        match self.current.token_type {
            TokenType::LParen => {
                let arguments = self.parse_expr_list(TokenType::RParen)?;
                Some(Expr::Call {
                    function: Box::new(left),
                    arguments,
                })
            }
            TokenType::LBracket => self.parse_index(left),
            token_type => {
                let operator = Self::infix_operator(token_type)?;
                self.next_token();
                let right = self.parse_expression(operator.precedence())?;

                Some(Expr::Infix(operator, Box::new(left), Box::new(right)))
            }
        }
    }

    fn parse_integer_literal(&mut self) -> Option<Expr> {
        match self.current.literal.parse::<i64>() {
            Ok(int) => Some(Expr::Literal(Literal::Int(int))),
            Err(_) => {
                self.push_error(ParseError::InvalidInteger(self.current.literal.clone()));
                None
            }
        }
    }

    fn parse_prefix_operator(&mut self, prefix: Prefix) -> Option<Expr> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Prefix)?;

        Some(Expr::Prefix(prefix, Box::new(expr)))
    }

    fn parse_paren(&mut self) -> Option<Expr> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::RParen)?;

        Some(expr)
    }

    fn parse_array(&mut self) -> Option<Expr> {
        let elements = self.parse_expr_list(TokenType::RBracket)?;

        Some(Expr::Array(elements))
    }

    fn parse_index(&mut self, left: Expr) -> Option<Expr> {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::RBracket)?;

        Some(Expr::Index(Box::new(left), Box::new(index)))
    }

    fn parse_if(&mut self) -> Option<Expr> {
        self.expect_peek(TokenType::LParen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::RParen)?;
        self.expect_peek(TokenType::LBrace)?;
        let consequence = self.parse_block()?;

        let alternative = if self.peek_is(TokenType::Else) {
            self.next_token();
            self.expect_peek(TokenType::LBrace)?;
            Some(self.parse_block()?)
        } else {
            None
        };

        Some(Expr::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_function(&mut self) -> Option<Expr> {
        self.expect_peek(TokenType::LParen)?;
        let params = self.parse_function_params()?;
        self.expect_peek(TokenType::LBrace)?;
        let body = self.parse_block()?;

        Some(Expr::Function {
            params: Rc::from(params),
            body: Rc::new(body),
        })
    }

    fn parse_function_params(&mut self) -> Option<Vec<Ident>> {
        let mut idents = Vec::new();

        if self.peek_is(TokenType::RParen) {
            self.next_token();
            return Some(idents);
        }

        self.expect_peek(TokenType::Ident)?;
        idents.push(self.current.literal.clone());

        while self.peek_is(TokenType::Comma) {
            self.next_token();
            self.expect_peek(TokenType::Ident)?;
            idents.push(self.current.literal.clone());
        }
        self.expect_peek(TokenType::RParen)?;

        Some(idents)
    }

    /// Comma-separated expressions up to `end`, shared by call arguments and array literals.
    fn parse_expr_list(&mut self, end: TokenType) -> Option<Vec<Expr>> {
        let mut exprs = Vec::new();

        if self.peek_is(end) {
            self.next_token();
            return Some(exprs);
        }

        self.next_token();
        exprs.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_is(TokenType::Comma) {
            self.next_token();
            self.next_token();
            exprs.push(self.parse_expression(Precedence::Lowest)?);
        }
        self.expect_peek(end)?;

        Some(exprs)
    }

    fn infix_operator(token_type: TokenType) -> Option<Infix> {
        match token_type {
            TokenType::Plus => Some(Infix::Plus),
            TokenType::Minus => Some(Infix::Minus),
            TokenType::Asterisk => Some(Infix::Multiply),
            TokenType::Slash => Some(Infix::Divide),
            TokenType::Eq => Some(Infix::Equal),
            TokenType::NotEq => Some(Infix::NotEqual),
            TokenType::Gt => Some(Infix::GreaterThan),
            TokenType::Lt => Some(Infix::LessThan),
            _ => None,
        }
    }

    fn peek_precedence(&self) -> Precedence {
        match self.peek.token_type {
            TokenType::LParen | TokenType::LBracket => Precedence::Call,
            token_type => Self::infix_operator(token_type)
                .map(Infix::precedence)
                .unwrap_or(Precedence::Lowest),
        }
    }

    fn current_is(&self, token_type: TokenType) -> bool {
        self.current.token_type == token_type
    }

    fn peek_is(&self, token_type: TokenType) -> bool {
        self.peek.token_type == token_type
    }

    fn expect_peek(&mut self, token_type: TokenType) -> Option<()> {
        if self.peek_is(token_type) {
            self.next_token();
            Some(())
        } else {
            self.push_error(ParseError::UnexpectedToken {
                expected: token_type,
                found: self.peek.clone(),
            });
            None
        }
    }

    fn parse_to_semicolon_if_exists(&mut self) {
        if self.peek_is(TokenType::Semicolon) {
            self.next_token();
        }
    }

    fn push_error(&mut self, error: ParseError) {
        debug!(%error, "parse error");
        self.errors.push(error);
    }
}
