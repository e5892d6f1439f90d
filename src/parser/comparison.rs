use super::*;

pub(super) fn parse_comparison(parser: &mut Parser) -> Result<Expr, CfgError> {
    let first = value::parse_primary(parser)?;
    let mut rest = Vec::new();

    while let Some(op) = parser.peek().and_then(compare_op) {
        parser.bump()?;
        rest.push((op, value::parse_primary(parser)?));
    }

    if rest.is_empty() {
        Ok(first)
    } else {
        Ok(Expr::Compare {
            first: Box::new(first),
            rest,
        })
    }
}

fn compare_op(token: &Token) -> Option<CompareOp> {
    match token {
        Token::EqEq => Some(CompareOp::Eq),
        Token::NotEq => Some(CompareOp::NotEq),
        Token::Lt => Some(CompareOp::Lt),
        Token::LtE => Some(CompareOp::LtE),
        Token::Gt => Some(CompareOp::Gt),
        Token::GtE => Some(CompareOp::GtE),
        _ => None,
    }
}
