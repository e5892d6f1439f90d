#[cfg(test)]
use super::*;
#[cfg(test)]
use pretty_assertions::assert_eq;

fn name(n: &str) -> Expr {
    Expr::Name(n.into())
}

fn lit(v: impl Into<Value>) -> Expr {
    Expr::Literal(v.into())
}

#[test]
fn test_parse_ternary_with_comparison() {
    let expr = parse("x > 5 if true else x").expect("Failed to parse");

    let expected = Expr::Conditional(Box::new(ConditionalExpr {
        condition: lit(true),
        then_value: Expr::Compare {
            first: Box::new(name("x")),
            rest: vec![(CompareOp::Gt, lit(5i64))],
        },
        else_value: name("x"),
    }));

    assert_eq!(expr, expected);
}

#[test]
fn test_and_binds_tighter_than_or() {
    let expr = parse("a or b and c").unwrap();
    assert_eq!(
        expr,
        Expr::Bool {
            op: BoolOp::Or,
            operands: vec![
                name("a"),
                Expr::Bool {
                    op: BoolOp::And,
                    operands: vec![name("b"), name("c")],
                },
            ],
        }
    );
}

#[test]
fn test_chained_comparison() {
    let expr = parse("1 < x <= 10").unwrap();
    assert_eq!(
        expr,
        Expr::Compare {
            first: Box::new(lit(1i64)),
            rest: vec![(CompareOp::Lt, name("x")), (CompareOp::LtE, lit(10i64))],
        }
    );
}

#[test]
fn test_else_branch_nests() {
    let expr = parse("'a' if x == 1 else 'b' if x == 2 else 'c'").unwrap();
    let Expr::Conditional(outer) = expr else {
        panic!("Expected conditional");
    };
    assert_eq!(outer.then_value, lit("a"));
    assert!(matches!(outer.else_value, Expr::Conditional(_)));
}

#[test]
fn test_parentheses_group() {
    let expr = parse("(a or b) and c").unwrap();
    let Expr::Bool { op, operands } = expr else {
        panic!("Expected bool op");
    };
    assert_eq!(op, BoolOp::And);
    assert!(matches!(operands[0], Expr::Bool { op: BoolOp::Or, .. }));
}

#[test]
fn test_unsupported_constructs_are_named() {
    let cases = [
        ("len(x) if a else b", "function call"),
        ("x.y if a else b", "attribute access"),
        ("x[0] if a else b", "subscript"),
        ("x + 1 if a else b", "operator '+'"),
        ("-1 if a else b", "unary operator '-'"),
        ("not a if b else c", "unary 'not'"),
        ("a if x in y else b", "membership test"),
        ("a if x is None else b", "identity test"),
        ("a if (x := 1) else b", "assignment"),
        ("(lambda: 1) if a else b", "lambda"),
        ("[1] if a else b", "list literal"),
    ];

    for (input, expected) in cases {
        match parse(input) {
            Err(CfgError::UnsupportedExpression { construct, code, .. }) => {
                assert_eq!(construct, expected, "input: {}", input);
                assert_eq!(code, Some(230));
            }
            other => panic!("Expected UnsupportedExpression for {}, got {:?}", input, other),
        }
    }
}

#[test]
fn test_missing_else_is_syntax_error() {
    match parse("a if b") {
        Err(CfgError::ExpressionSyntax { code, .. }) => assert_eq!(code, Some(204)),
        other => panic!("Expected ExpressionSyntax, got {:?}", other),
    }
}

#[test]
fn test_trailing_tokens_rejected() {
    match parse("a b if c else d") {
        Err(CfgError::ExpressionSyntax { code, .. }) => assert_eq!(code, Some(203)),
        other => panic!("Expected ExpressionSyntax, got {:?}", other),
    }
}

#[test]
fn test_dangling_operator() {
    match parse("a == if b else c") {
        Err(CfgError::ExpressionSyntax { code, .. }) => assert_eq!(code, Some(205)),
        other => panic!("Expected ExpressionSyntax, got {:?}", other),
    }
}
