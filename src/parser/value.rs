use super::*;

pub(super) fn parse_primary(parser: &mut Parser) -> Result<Expr, CfgError> {
    let expr = match parser.peek() {
        Some(Token::String(_)) | Some(Token::Number(_)) | Some(Token::Bool(_)) | Some(Token::Null) => {
            parse_literal(parser)?
        }
        Some(Token::Ident(_)) => parse_name(parser)?,
        Some(Token::LParen) => parse_group(parser)?,
        Some(Token::Not) => return Err(parser.unsupported("unary 'not'")),
        Some(Token::Operator(op)) => return Err(parser.unsupported(format!("unary operator '{}'", op))),
        Some(Token::Lambda) => return Err(parser.unsupported("lambda")),
        Some(Token::LBracket) => return Err(parser.unsupported("list literal")),
        Some(Token::Eof) | None => {
            return Err(parser.syntax_error(
                "Unexpected end of expression",
                Some("An operand is missing"),
                201,
            ));
        }
        Some(tok) => {
            return Err(parser.syntax_error(
                format!("Unexpected {:?} in value position", tok),
                None,
                205,
            ));
        }
    };

    reject_trailing(parser)?;
    Ok(expr)
}

fn parse_literal(parser: &mut Parser) -> Result<Expr, CfgError> {
    let value = match parser.bump()? {
        Token::String(s) => Value::String(s),
        Token::Number(n) => Value::Number(n),
        Token::Bool(b) => Value::Bool(b),
        _ => Value::Null,
    };
    Ok(Expr::Literal(value))
}

fn parse_name(parser: &mut Parser) -> Result<Expr, CfgError> {
    match parser.bump()? {
        Token::Ident(name) => Ok(Expr::Name(name)),
        token => Err(parser.syntax_error(
            format!("Expected variable name, got {:?}", token),
            None,
            205,
        )),
    }
}

fn parse_group(parser: &mut Parser) -> Result<Expr, CfgError> {
    parser.bump()?; // consume (
    let inner = conditional::parse_conditional(parser)?;
    parser.expect(Token::RParen)?;
    Ok(inner)
}

/// Tokens that may not follow an operand.
fn reject_trailing(parser: &Parser) -> Result<(), CfgError> {
    let construct = match parser.peek() {
        Some(Token::LParen) => "function call".to_string(),
        Some(Token::Dot) => "attribute access".to_string(),
        Some(Token::LBracket) => "subscript".to_string(),
        Some(Token::Operator(op)) => format!("operator '{}'", op),
        Some(Token::Assign) => "assignment".to_string(),
        Some(Token::In) | Some(Token::Not) => "membership test".to_string(),
        Some(Token::Is) => "identity test".to_string(),
        Some(Token::Comma) => "tuple".to_string(),
        _ => return Ok(()),
    };
    Err(parser.unsupported(construct))
}
