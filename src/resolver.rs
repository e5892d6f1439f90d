// Author: Dustin Pilgrim
// License: MIT

use std::iter::Peekable;
use std::vec::IntoIter;

use indexmap::IndexMap;
use serde_json::Number;
use tracing::debug;

use crate::ast::Value;
use crate::evaluator::Scope;
use crate::lexer::{Lexer, Token};
use crate::CfgError;

/// Top-level document key holding the fallback bindings.
pub const DEFAULTS_KEY: &str = "defaults";

/// Variable name to value, built once per run.
///
/// Runtime overrides are inserted first; defaults only fill names that are
/// still missing, so an override always wins and the first default for a name
/// beats any later one.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Bindings {
    vars: IndexMap<String, Value>,
}

impl Bindings {
    /// Merge a `key=value;key=value` override string over a defaults list.
    pub fn resolve(defaults: &[Value], overrides: &str) -> Result<Self, CfgError> {
        let mut vars = parse_overrides(overrides)?;

        for (index, default) in defaults.iter().enumerate() {
            let entries = default.as_object().ok_or_else(|| {
                CfgError::override_parse(
                    format!("defaults[{}] is a {}, expected an object", index, default.type_name()),
                    Some("Each defaults entry must be an object of name/value pairs"),
                    224,
                )
            })?;

            for (key, value) in entries {
                if !vars.contains_key(key) {
                    vars.insert(key.clone(), value.clone());
                }
            }
        }

        debug!(bindings = ?vars, "resolved bindings");
        Ok(Self { vars })
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.vars.iter()
    }

    /// The scalar-only view used by conditionals.
    pub fn scope(&self) -> Scope<'_> {
        Scope::scalars(&self.vars)
    }
}

impl FromIterator<(String, Value)> for Bindings {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

/// Remove and return the `defaults` list from the document root.
///
/// A missing or `null` key yields an empty list. The key is removed either way
/// so it never reaches the output.
pub fn take_defaults(document: &mut Value) -> Result<Vec<Value>, CfgError> {
    let Value::Object(root) = document else {
        return Ok(Vec::new());
    };

    match root.shift_remove(DEFAULTS_KEY) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(CfgError::override_parse(
            format!("'{}' is a {}, expected an array", DEFAULTS_KEY, other.type_name()),
            Some("Declare defaults as a list of objects, e.g. [{\"env\": \"prod\"}]"),
            223,
        )),
    }
}

/// Parse `key1=val1;key2=val2`. Blank segments are skipped; a repeated key
/// keeps its last value. Names are taken verbatim, whitespace included.
pub fn parse_overrides(raw: &str) -> Result<IndexMap<String, Value>, CfgError> {
    let mut overrides = IndexMap::new();

    for pair in raw.split(';') {
        if pair.trim().is_empty() {
            continue;
        }

        let (key, value) = pair.split_once('=').ok_or_else(|| {
            CfgError::override_parse(
                format!("Override '{}' is missing '='", pair),
                Some("Write overrides as key=value pairs separated by ';'"),
                220,
            )
        })?;

        if key.is_empty() {
            return Err(CfgError::override_parse(
                format!("Override '{}' has an empty name", pair),
                Some("Write overrides as key=value pairs separated by ';'"),
                220,
            ));
        }

        overrides.insert(key.to_string(), parse_override_value(value)?);
    }

    Ok(overrides)
}

/// Coerce one override value: object, array, bool, null, integer, float and
/// finally a string with surrounding double quotes stripped.
pub fn parse_override_value(token: &str) -> Result<Value, CfgError> {
    if token.starts_with('{') && token.ends_with('}') {
        return parse_literal(token, "object", 221);
    }
    if token.starts_with('[') && token.ends_with(']') {
        return parse_array(token);
    }

    match token.to_lowercase().as_str() {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        "null" | "none" => return Ok(Value::Null),
        _ => {}
    }

    let trimmed = token.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(Value::from(n));
    }
    if let Ok(n) = trimmed.parse::<u64>() {
        return Ok(Value::Number(n.into()));
    }
    if let Some(v) = trimmed.parse::<f64>().ok().and_then(Value::from_f64) {
        return Ok(v);
    }

    Ok(Value::String(token.trim_matches('"').to_string()))
}

fn parse_literal(token: &str, kind: &str, code: u32) -> Result<Value, CfgError> {
    serde_json::from_str::<serde_json::Value>(token)
        .map(Value::from)
        .map_err(|e| {
            CfgError::override_parse(
                format!("Invalid {} literal '{}': {}", kind, token, e),
                Some("Object overrides must be valid JSON"),
                code,
            )
        })
}

type Tokens = Peekable<IntoIter<Token>>;

/// A JSON array, or a list written with single-quoted strings and
/// `True`/`False`/`None`, e.g. `['a', 'b']` or `[True, None, -1]`.
fn parse_array(token: &str) -> Result<Value, CfgError> {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(token) {
        return Ok(Value::from(json));
    }

    let invalid = |detail: String| {
        CfgError::override_parse(
            format!("Invalid array literal '{}': {}", token, detail),
            Some("List items may be quoted strings, numbers, True/False, None or nested lists"),
            222,
        )
    };

    let tokens = Lexer::new(token).tokenize().map_err(|e| match e {
        CfgError::ExpressionSyntax { message, .. } => invalid(message),
        other => other,
    })?;
    let mut tokens = tokens.into_iter().peekable();

    let value = literal_item(&mut tokens).map_err(invalid)?;
    match tokens.next() {
        Some(Token::Eof) => Ok(value),
        other => Err(invalid(format!("unexpected {:?} after the list", other))),
    }
}

fn literal_item(tokens: &mut Tokens) -> Result<Value, String> {
    match tokens.next() {
        Some(Token::String(s)) => Ok(Value::String(s)),
        Some(Token::Number(n)) => Ok(Value::Number(n)),
        Some(Token::Bool(b)) => Ok(Value::Bool(b)),
        Some(Token::Null) => Ok(Value::Null),
        Some(Token::Operator(op)) if op == "-" => match tokens.next() {
            Some(Token::Number(n)) => negate(&n).ok_or_else(|| format!("cannot negate {}", n)),
            other => Err(format!("expected a number after '-', got {:?}", other)),
        },
        Some(Token::LBracket) => literal_list(tokens),
        other => Err(format!("unexpected {:?}", other)),
    }
}

/// Items up to the closing `]`; a trailing comma is allowed.
fn literal_list(tokens: &mut Tokens) -> Result<Value, String> {
    let mut items = Vec::new();
    loop {
        if tokens.peek() == Some(&Token::RBracket) {
            tokens.next();
            return Ok(Value::Array(items));
        }

        items.push(literal_item(tokens)?);

        match tokens.next() {
            Some(Token::Comma) => {}
            Some(Token::RBracket) => return Ok(Value::Array(items)),
            other => return Err(format!("expected ',' or ']', got {:?}", other)),
        }
    }
}

fn negate(n: &Number) -> Option<Value> {
    match n.as_i64() {
        Some(i) => i.checked_neg().map(Value::from),
        None => n.as_f64().and_then(|f| Value::from_f64(-f)),
    }
}

// -- Tests --
