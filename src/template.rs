// Author: Dustin Pilgrim
// License: MIT

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::ast::Value;
use crate::evaluator::{self, Scope};
use crate::resolver::Bindings;
use crate::CfgError;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern compiles"));
static IF_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bif\b").expect("if pattern compiles"));
static ELSE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\belse\b").expect("else pattern compiles"));

/// Result of rendering one string before it is turned back into a value.
#[derive(Debug, Clone, PartialEq)]
enum Rendered {
    Text(String),
    /// The whole string was a single placeholder bound to an object or array.
    /// Resolved by assigning the bound value to the field directly.
    Deferred(String),
}

/// Rewrites every `${...}` placeholder in a document.
pub struct Substituter<'a> {
    bindings: &'a Bindings,
    scope: Scope<'a>,
    legacy_null_text: bool,
}

impl<'a> Substituter<'a> {
    pub fn new(bindings: &'a Bindings) -> Self {
        Self {
            bindings,
            scope: bindings.scope(),
            legacy_null_text: true,
        }
    }

    /// When set (the default), a string that ends up as the text `null` stays
    /// the string `"null"`. When cleared it becomes a JSON null.
    pub fn legacy_null_text(mut self, enabled: bool) -> Self {
        self.legacy_null_text = enabled;
        self
    }

    pub fn substitute(&self, document: Value) -> Result<Value, CfgError> {
        self.walk(document, "")
    }

    fn walk(&self, value: Value, path: &str) -> Result<Value, CfgError> {
        match value {
            Value::Object(items) => {
                let mut out = indexmap::IndexMap::with_capacity(items.len());
                for (key, item) in items {
                    let child = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", path, key)
                    };
                    let item = self.walk(item, &child)?;
                    out.insert(key, item);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| self.walk(item, &format!("{}[{}]", path, i)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::String(s) => match self.render_string(&s, path)? {
                Rendered::Deferred(name) => {
                    trace!(path, name = name.as_str(), "assigning complex binding");
                    Ok(self.bindings.get(&name).cloned().unwrap_or(Value::Null))
                }
                Rendered::Text(text) => Ok(self.finalize(text)),
            },
            scalar => Ok(scalar),
        }
    }

    fn render_string(&self, s: &str, path: &str) -> Result<Rendered, CfgError> {
        let mut out = String::with_capacity(s.len());
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(s) {
            let (Some(whole), Some(expression)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&s[last..whole.start()]);

            match self.render_placeholder(expression.as_str(), whole.as_str())? {
                Rendered::Text(text) => {
                    debug!(path, placeholder = whole.as_str(), replacement = text.as_str(), "substituted");
                    out.push_str(&text);
                }
                Rendered::Deferred(name) if whole.start() == 0 && whole.end() == s.len() => {
                    return Ok(Rendered::Deferred(name));
                }
                Rendered::Deferred(name) => {
                    return Err(CfgError::UnsplicableValue {
                        name,
                        path: path.to_string(),
                        hint: Some(
                            "Object and array values can only replace a whole field, e.g. \"field\": \"${name}\"".into(),
                        ),
                        code: Some(250),
                    });
                }
            }
            last = whole.end();
        }

        out.push_str(&s[last..]);
        Ok(Rendered::Text(out))
    }

    fn render_placeholder(&self, expression: &str, raw: &str) -> Result<Rendered, CfgError> {
        if IF_TOKEN.is_match(expression) && ELSE_TOKEN.is_match(expression) {
            return Ok(match evaluator::evaluate(expression, &self.scope)? {
                Value::Null => Rendered::Text(raw.to_string()),
                result => Rendered::Text(render_value(&result)),
            });
        }

        let name = expression;
        Ok(match self.bindings.get(name) {
            None | Some(Value::Null) => Rendered::Text(raw.to_string()),
            Some(v) if v.is_complex() => Rendered::Deferred(name.to_string()),
            Some(v) => Rendered::Text(render_value(v)),
        })
    }

    /// Turn rendered text back into a typed value.
    fn finalize(&self, text: String) -> Value {
        if text.starts_with('"') && text.ends_with('"') {
            let inner = if text.len() >= 2 { &text[1..text.len() - 1] } else { "" };
            return Value::String(inner.to_string());
        }

        match text.as_str() {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            "null" if !self.legacy_null_text => return Value::Null,
            "null" => return Value::String(text),
            _ => {}
        }

        let trimmed = text.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return Value::from(n);
        }
        if let Ok(n) = trimmed.parse::<u64>() {
            return Value::Number(n.into());
        }
        if let Some(v) = trimmed.parse::<f64>().ok().and_then(Value::from_f64) {
            return v;
        }

        Value::String(text)
    }
}

/// Text form of a value spliced into a string. Strings are quoted so that a
/// string result can be told apart from numeric or boolean text afterwards.
fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("\"{}\"", s),
        complex => serde_json::to_string(complex).unwrap_or_default(),
    }
}

/// Substitute with default options.
pub fn substitute(document: Value, bindings: &Bindings) -> Result<Value, CfgError> {
    Substituter::new(bindings).substitute(document)
}
