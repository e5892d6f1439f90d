// Author: Dustin Pilgrim
// License: MIT

use thiserror::Error;

/// The error type for every stage of materialization.
///
/// Every variant is terminal: nothing is retried and no partial document is
/// produced once one of these is raised.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CfgError {
    #[error("[CFG] File not found '{path}'{}", suffix(.hint, .code))]
    NotFound {
        path: String,
        hint: Option<String>,
        code: Option<u32>,
    },

    #[error("[CFG] File Error '{path}': {message}{}", suffix(.hint, .code))]
    Io {
        path: String,
        message: String,
        hint: Option<String>,
        code: Option<u32>,
    },

    /// Raised when the input document is not valid JSON.
    #[error("[CFG] Invalid JSON content in {path} at {line}:{column}: {message}{}", suffix(.hint, .code))]
    MalformedDocument {
        path: String,
        message: String,
        line: usize,
        column: usize,
        hint: Option<String>,
        code: Option<u32>,
    },

    #[error("[CFG] JSON Schema error in {path}: {message}{}", suffix(.hint, .code))]
    MalformedSchema {
        path: String,
        message: String,
        hint: Option<String>,
        code: Option<u32>,
    },

    /// The document does not satisfy a schema. `pointer` is the JSON pointer of
    /// the offending instance location.
    #[error("[CFG] JSON validation error against {schema} at '{pointer}': {message}{}", suffix(.hint, .code))]
    Conformance {
        schema: String,
        pointer: String,
        message: String,
        hint: Option<String>,
        code: Option<u32>,
    },

    #[error("[CFG] Override Error: {message}{}", suffix(.hint, .code))]
    OverrideParse {
        message: String,
        hint: Option<String>,
        code: Option<u32>,
    },

    #[error("[CFG] Syntax Error in `{expression}` at column {column}: {message}{}", suffix(.hint, .code))]
    ExpressionSyntax {
        message: String,
        expression: String,
        column: usize,
        hint: Option<String>,
        code: Option<u32>,
    },

    #[error("[CFG] Unsupported operation {construct} in `{expression}`{}", suffix(.hint, .code))]
    UnsupportedExpression {
        construct: String,
        expression: String,
        hint: Option<String>,
        code: Option<u32>,
    },

    #[error("[CFG] Conditional error: variable '{name}' is not defined in `{expression}`{}", suffix(.hint, .code))]
    UndefinedVariable {
        name: String,
        expression: String,
        hint: Option<String>,
        code: Option<u32>,
    },

    #[error("[CFG] Type Error in `{expression}`: {message}{}", suffix(.hint, .code))]
    ExpressionType {
        message: String,
        expression: String,
        hint: Option<String>,
        code: Option<u32>,
    },

    /// An object or array binding was referenced inside a larger string.
    #[error("[CFG] Cannot splice '{name}' into the string at '{path}'{}", suffix(.hint, .code))]
    UnsplicableValue {
        name: String,
        path: String,
        hint: Option<String>,
        code: Option<u32>,
    },
}

fn suffix(hint: &Option<String>, code: &Option<u32>) -> String {
    format!(
        "{}{}",
        hint.as_ref().map_or(String::new(), |h| format!(" Hint: {}", h)),
        code.map_or(String::new(), |c| format!(" Code: {}", c))
    )
}

impl CfgError {
    pub fn code(&self) -> Option<u32> {
        match self {
            CfgError::NotFound { code, .. }
            | CfgError::Io { code, .. }
            | CfgError::MalformedDocument { code, .. }
            | CfgError::MalformedSchema { code, .. }
            | CfgError::Conformance { code, .. }
            | CfgError::OverrideParse { code, .. }
            | CfgError::ExpressionSyntax { code, .. }
            | CfgError::UnsupportedExpression { code, .. }
            | CfgError::UndefinedVariable { code, .. }
            | CfgError::ExpressionType { code, .. }
            | CfgError::UnsplicableValue { code, .. } => *code,
        }
    }

    /// Process exit status for this error category.
    pub fn exit_code(&self) -> i32 {
        match self {
            CfgError::Io { .. } => 1,
            CfgError::NotFound { .. } => 2,
            CfgError::MalformedDocument { .. } => 3,
            CfgError::MalformedSchema { .. } => 4,
            CfgError::Conformance { .. } => 5,
            CfgError::OverrideParse { .. }
            | CfgError::ExpressionSyntax { .. }
            | CfgError::UnsupportedExpression { .. }
            | CfgError::UndefinedVariable { .. }
            | CfgError::ExpressionType { .. }
            | CfgError::UnsplicableValue { .. } => 6,
        }
    }

    pub(crate) fn override_parse(message: impl Into<String>, hint: Option<&str>, code: u32) -> Self {
        CfgError::OverrideParse {
            message: message.into(),
            hint: hint.map(Into::into),
            code: Some(code),
        }
    }
}
