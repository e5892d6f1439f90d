// Author: Dustin Pilgrim
// License: MIT

use crate::ast::{BoolOp, CompareOp, ConditionalExpr, Expr, Value};
use crate::lexer::{Lexer, Token};
use crate::CfgError;

mod comparison;
mod conditional;
mod value;

const SUPPORTED_HINT: &str =
    "Conditionals only support literals, variable names, comparisons, and/or and `A if C else B`";

/// Recursive-descent parser for conditional expressions.
///
/// Only the node kinds in [`Expr`] can be produced. Constructs outside that set
/// are recognised by their leading token and rejected by name.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    peek: Option<Token>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Result<Self, CfgError> {
        let mut lexer = Lexer::new(input);
        let peek = Some(lexer.next_token()?);
        Ok(Self { lexer, peek })
    }

    pub(crate) fn bump(&mut self) -> Result<Token, CfgError> {
        let curr = self.peek.take().ok_or_else(|| {
            self.lexer.error("Unexpected end of expression", None, 201)
        })?;
        self.peek = Some(self.lexer.next_token()?);
        Ok(curr)
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.peek.as_ref()
    }

    pub(crate) fn expect(&mut self, expected: Token) -> Result<Token, CfgError> {
        let token = self.bump()?;
        if token != expected {
            return Err(self.syntax_error(
                format!("Expected {:?}, got {:?}", expected, token),
                Some("Check your syntax"),
                202,
            ));
        }
        Ok(token)
    }

    pub(crate) fn syntax_error(&self, message: impl Into<String>, hint: Option<&str>, code: u32) -> CfgError {
        self.lexer.error(message, hint, code)
    }

    pub(crate) fn unsupported(&self, construct: impl Into<String>) -> CfgError {
        CfgError::UnsupportedExpression {
            construct: construct.into(),
            expression: self.lexer.source().to_string(),
            hint: Some(SUPPORTED_HINT.into()),
            code: Some(230),
        }
    }

    /// Parse the whole input as one expression.
    pub fn parse_expression(&mut self) -> Result<Expr, CfgError> {
        let expr = conditional::parse_conditional(self)?;
        match self.bump()? {
            Token::Eof => Ok(expr),
            token => Err(self.syntax_error(
                format!("Unexpected {:?} after expression", token),
                Some(SUPPORTED_HINT),
                203,
            )),
        }
    }
}

/// Parse `input` into a restricted expression tree.
pub fn parse(input: &str) -> Result<Expr, CfgError> {
    Parser::new(input)?.parse_expression()
}

#[cfg(test)]
mod tests;
