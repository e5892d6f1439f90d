// Author: Dustin Pilgrim
// License: MIT

use std::str::Chars;

use serde_json::Number;

use crate::CfgError;

mod scanner;
mod tokenizer;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // --- literals ---
    Ident(String),
    String(String),
    Number(Number),
    Bool(bool),
    Null,

    // --- comparisons ---
    EqEq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,

    // --- keywords ---
    If,
    Else,
    And,
    Or,

    // --- recognised so they can be rejected by name ---
    Not,
    In,
    Is,
    Lambda,
    Assign,
    Operator(String),
    Dot,
    Comma,
    LBracket,
    RBracket,

    // --- structure ---
    LParen,
    RParen,
    Eof,
}

/// Tokenizer for the `${...}` conditional expression language.
///
/// Expressions are single-line, so only a column is tracked.
pub struct Lexer<'a> {
    source: &'a str,
    input: Chars<'a>,
    peek: Option<char>,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut input = source.chars();
        let peek = input.next();
        Lexer {
            source,
            input,
            peek,
            column: 0,
        }
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn next_token(&mut self) -> Result<Token, CfgError> {
        tokenizer::next_token(self)
    }

    /// Tokenize the whole input, `Eof` included.
    pub fn tokenize(mut self) -> Result<Vec<Token>, CfgError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let done = tok == Token::Eof;
            tokens.push(tok);
            if done {
                return Ok(tokens);
            }
        }
    }

    pub(crate) fn error(&self, message: impl Into<String>, hint: Option<&str>, code: u32) -> CfgError {
        CfgError::ExpressionSyntax {
            message: message.into(),
            expression: self.source.to_string(),
            column: self.column,
            hint: hint.map(Into::into),
            code: Some(code),
        }
    }
}
