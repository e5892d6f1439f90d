use super::*;

/// `then_value if condition else else_value`; the else branch may nest.
pub(super) fn parse_conditional(parser: &mut Parser) -> Result<Expr, CfgError> {
    let then_value = parse_or(parser)?;

    if let Some(Token::If) = parser.peek() {
        parser.bump()?;
        let condition = parse_or(parser)?;

        if parser.peek() != Some(&Token::Else) {
            return Err(parser.syntax_error(
                "Expected 'else' in conditional",
                Some("Write conditionals as `A if C else B`"),
                204,
            ));
        }
        parser.bump()?;

        let else_value = parse_conditional(parser)?;
        return Ok(Expr::Conditional(Box::new(ConditionalExpr {
            condition,
            then_value,
            else_value,
        })));
    }

    Ok(then_value)
}

fn parse_or(parser: &mut Parser) -> Result<Expr, CfgError> {
    parse_bool_chain(parser, Token::Or, BoolOp::Or, parse_and)
}

fn parse_and(parser: &mut Parser) -> Result<Expr, CfgError> {
    parse_bool_chain(parser, Token::And, BoolOp::And, comparison::parse_comparison)
}

fn parse_bool_chain(
    parser: &mut Parser,
    separator: Token,
    op: BoolOp,
    operand: fn(&mut Parser) -> Result<Expr, CfgError>,
) -> Result<Expr, CfgError> {
    let mut operands = vec![operand(parser)?];

    while parser.peek() == Some(&separator) {
        parser.bump()?;
        operands.push(operand(parser)?);
    }

    if operands.len() == 1 {
        Ok(operands.remove(0))
    } else {
        Ok(Expr::Bool { op, operands })
    }
}
