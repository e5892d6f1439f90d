// Author: Dustin Pilgrim
// License: MIT

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde_json::Number;
use tracing::trace;

use crate::ast::{BoolOp, CompareOp, Expr, Value};
use crate::parser;
use crate::CfgError;

/// Variables visible to a conditional: the scalar bindings only.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Scope<'a> {
    vars: IndexMap<&'a str, &'a Value>,
}

impl<'a> Scope<'a> {
    /// Build a scope from bindings, skipping objects and arrays.
    pub fn scalars<I>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        let vars = bindings
            .into_iter()
            .filter(|(_, v)| !v.is_complex())
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        Self { vars }
    }

    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.vars.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }
}

/// Parse and evaluate a conditional expression.
pub fn evaluate(expression: &str, scope: &Scope) -> Result<Value, CfgError> {
    let expr = parser::parse(expression)?;
    let result = Evaluator { expression, scope }.eval(&expr)?;
    trace!(expression, ?result, "evaluated conditional");
    Ok(result)
}

struct Evaluator<'s, 'a> {
    expression: &'s str,
    scope: &'s Scope<'a>,
}

impl Evaluator<'_, '_> {
    fn eval(&self, expr: &Expr) -> Result<Value, CfgError> {
        match expr {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Name(name) => self.lookup(name),
            Expr::Compare { first, rest } => {
                let mut left = self.eval(first)?;
                for (op, operand) in rest {
                    let right = self.eval(operand)?;
                    if !self.compare(*op, &left, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }
            Expr::Bool { op, operands } => {
                // Short-circuits and yields the deciding operand.
                let mut last = Value::Null;
                for operand in operands {
                    last = self.eval(operand)?;
                    let decided = match op {
                        BoolOp::And => !last.truthy(),
                        BoolOp::Or => last.truthy(),
                    };
                    if decided {
                        break;
                    }
                }
                Ok(last)
            }
            Expr::Conditional(c) => {
                if self.eval(&c.condition)?.truthy() {
                    self.eval(&c.then_value)
                } else {
                    self.eval(&c.else_value)
                }
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<Value, CfgError> {
        self.scope.get(name).cloned().ok_or_else(|| CfgError::UndefinedVariable {
            name: name.to_string(),
            expression: self.expression.to_string(),
            hint: Some(format!(
                "Add '{}' to the defaults list or pass it as an override (note: object and array values are not visible to conditionals)",
                name
            )),
            code: Some(240),
        })
    }

    fn compare(&self, op: CompareOp, left: &Value, right: &Value) -> Result<bool, CfgError> {
        match op {
            CompareOp::Eq => return Ok(values_equal(left, right)),
            CompareOp::NotEq => return Ok(!values_equal(left, right)),
            _ => {}
        }

        let ordering = order(left, right).ok_or_else(|| CfgError::ExpressionType {
            message: format!(
                "'{}' not supported between {} and {}",
                op.symbol(),
                left.type_name(),
                right.type_name()
            ),
            expression: self.expression.to_string(),
            hint: Some("Ordering compares numbers and booleans with each other, or two strings".into()),
            code: Some(241),
        })?;

        Ok(match op {
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::LtE => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            _ => ordering != Ordering::Less,
        })
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Bool(_), Value::Bool(_)) => left == right,
        _ => match (numeric(left), numeric(right)) {
            (Some(_), Some(_)) => order(left, right) == Some(Ordering::Equal),
            _ => left == right,
        },
    }
}

/// Numbers as-is, booleans as 0 and 1.
fn numeric(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        Value::Bool(b) => Some(Number::from(i64::from(*b))),
        _ => None,
    }
}

fn order(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => {
            let (a, b) = (numeric(left)?, numeric(right)?);
            match (a.as_i64(), b.as_i64()) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn bindings(v: serde_json::Value) -> IndexMap<String, Value> {
        match Value::from(v) {
            Value::Object(map) => map,
            _ => panic!("bindings must be an object"),
        }
    }

    fn eval_with(expression: &str, vars: serde_json::Value) -> Result<Value, CfgError> {
        let table = bindings(vars);
        let scope = Scope::scalars(&table);
        evaluate(expression, &scope)
    }

    #[rstest]
    #[case("x > 5 if true else x", json!({"x": 10}), json!(true))]
    #[case("'big' if x >= 100 else 'small'", json!({"x": 10}), json!("small"))]
    #[case("'prod' if env == 'production' else 'dev'", json!({"env": "production"}), json!("prod"))]
    #[case("1 if a and b else 2", json!({"a": true, "b": false}), json!(2))]
    #[case("1 if a or b else 2", json!({"a": false, "b": 1}), json!(1))]
    #[case("1 if 0 < x < 10 else 2", json!({"x": 10}), json!(2))]
    #[case("1 if x == 10.0 else 2", json!({"x": 10}), json!(1))]
    #[case("1 if x != 'a' else 2", json!({"x": 3}), json!(1))]
    #[case("null if flag else 'set'", json!({"flag": true}), json!(null))]
    #[case("name or 'fallback' if true else 0", json!({"name": ""}), json!("fallback"))]
    fn test_evaluate(#[case] expression: &str, #[case] vars: serde_json::Value, #[case] expected: serde_json::Value) {
        let result = eval_with(expression, vars).expect("Failed to evaluate");
        assert_eq!(result, Value::from(expected));
    }

    #[test]
    fn test_undefined_variable_fails() {
        let err = eval_with("1 if missing else 2", json!({"x": 1})).unwrap_err();
        match err {
            CfgError::UndefinedVariable { name, code, .. } => {
                assert_eq!(name, "missing");
                assert_eq!(code, Some(240));
            }
            other => panic!("Expected UndefinedVariable, got {:?}", other),
        }
    }

    #[test]
    fn test_untaken_branch_is_not_evaluated() {
        let result = eval_with("'ok' if true else missing", json!({})).unwrap();
        assert_eq!(result, Value::from("ok"));
    }

    #[test]
    fn test_complex_bindings_are_invisible() {
        let err = eval_with("1 if obj else 2", json!({"obj": {"a": 1}})).unwrap_err();
        assert!(matches!(err, CfgError::UndefinedVariable { .. }));
    }

    #[test]
    fn test_null_binding_is_visible() {
        let result = eval_with("'none' if x == null else 'some'", json!({"x": null})).unwrap();
        assert_eq!(result, Value::from("none"));
    }

    #[test]
    fn test_incomparable_ordering_fails() {
        let err = eval_with("1 if x < 'a' else 2", json!({"x": 1})).unwrap_err();
        match err {
            CfgError::ExpressionType { message, .. } => {
                assert_eq!(message, "'<' not supported between number and string");
            }
            other => panic!("Expected ExpressionType, got {:?}", other),
        }
    }

    #[rstest]
    #[case("1 if flag == 1 else 2", json!({"flag": true}), json!(1))]
    #[case("1 if flag == 0.0 else 2", json!({"flag": false}), json!(1))]
    #[case("1 if flag < 2 else 2", json!({"flag": true}), json!(1))]
    #[case("1 if flag > 1 else 2", json!({"flag": true}), json!(2))]
    #[case("1 if flag != 1 else 2", json!({"flag": true}), json!(2))]
    fn test_booleans_compare_as_integers(
        #[case] expression: &str,
        #[case] vars: serde_json::Value,
        #[case] expected: serde_json::Value,
    ) {
        assert_eq!(eval_with(expression, vars).unwrap(), Value::from(expected));
    }

    #[test]
    fn test_strings_never_equal_numbers() {
        let result = eval_with("1 if x == 1 else 2", json!({"x": "1"})).unwrap();
        assert_eq!(result, Value::from(2i64));
        assert!(eval_with("1 if flag < 'a' else 2", json!({"flag": true})).is_err());
    }
}
