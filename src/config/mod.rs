// Author: Dustin Pilgrim
// License: MIT

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use crate::ast::Value;
use crate::export::export_document_to_json;
use crate::prune::prune_disabled;
use crate::resolver::{take_defaults, Bindings};
use crate::schema::{JsonSchemaValidator, Schema, SchemaValidator};
use crate::template::Substituter;
use crate::CfgError;

/// Knobs for a materialization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterializeOptions {
    /// Keep a field whose text resolves to `null` as the string `"null"`.
    /// Clear it to emit a real JSON null instead.
    pub legacy_null_text: bool,
    /// Indent rendered output instead of writing a single line.
    pub pretty: bool,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            legacy_null_text: true,
            pretty: false,
        }
    }
}

/// Runs resolve → substitute → validate → prune over one document.
///
/// # Example
/// ```
/// use workflow_cfg::{Materializer, MaterializeOptions};
///
/// let doc = r#"{
///     "defaults": [{"env": "prod"}],
///     "target": "${env}",
///     "debug": {"disabled": true, "level": 3}
/// }"#;
///
/// let out = Materializer::new(MaterializeOptions::default())
///     .render_str(doc, "env=dev", &[])
///     .unwrap();
/// assert_eq!(out, r#"{"target":"dev"}"#);
/// ```
pub struct Materializer<V: SchemaValidator = JsonSchemaValidator> {
    options: MaterializeOptions,
    validator: V,
}

impl Materializer<JsonSchemaValidator> {
    pub fn new(options: MaterializeOptions) -> Self {
        Self::with_validator(options, JsonSchemaValidator)
    }
}

impl Default for Materializer<JsonSchemaValidator> {
    fn default() -> Self {
        Self::new(MaterializeOptions::default())
    }
}

impl<V: SchemaValidator> Materializer<V> {
    /// Use a custom conformance checker.
    pub fn with_validator(options: MaterializeOptions, validator: V) -> Self {
        Self { options, validator }
    }

    pub fn options(&self) -> &MaterializeOptions {
        &self.options
    }

    /// Strip `defaults`, resolve bindings and substitute placeholders.
    ///
    /// With no defaults and no overrides the document is returned as-is,
    /// without the string coercion substitution would otherwise apply.
    pub fn apply_overrides(&self, mut document: Value, overrides: &str) -> Result<Value, CfgError> {
        let defaults = take_defaults(&mut document)?;

        if defaults.is_empty() && overrides.trim().is_empty() {
            debug!("No defaults and no runtime overrides, returning untouched document");
            return Ok(document);
        }

        let bindings = Bindings::resolve(&defaults, overrides)?;
        debug!(count = bindings.len(), "substituting placeholders");

        Substituter::new(&bindings)
            .legacy_null_text(self.options.legacy_null_text)
            .substitute(document)
    }

    /// The full pipeline on an already-parsed document.
    ///
    /// `None` means pruning removed the whole document.
    pub fn materialize(&self, document: Value, overrides: &str, schemas: &[Schema]) -> Result<Option<Value>, CfgError> {
        let document = self.apply_overrides(document, overrides)?;

        for schema in schemas {
            self.validator.validate(&document, schema)?;
        }

        Ok(self.prune(document))
    }

    pub fn materialize_str(&self, content: &str, overrides: &str, schemas: &[Schema]) -> Result<Option<Value>, CfgError> {
        let document = parse_document(content, "<string>")?;
        self.materialize(document, overrides, schemas)
    }

    /// Load the document, then each schema in turn as it is needed.
    pub fn materialize_file<P, S>(&self, path: P, overrides: &str, schema_paths: &[S]) -> Result<Option<Value>, CfgError>
    where
        P: AsRef<Path>,
        S: AsRef<Path>,
    {
        let document = load_document(path.as_ref())?;
        let document = self.apply_overrides(document, overrides)?;

        for schema_path in schema_paths {
            let schema = Schema::from_file(schema_path)?;
            self.validator.validate(&document, &schema)?;
            info!(schema = schema.source(), "document conforms");
        }

        Ok(self.prune(document))
    }

    pub fn render_str(&self, content: &str, overrides: &str, schemas: &[Schema]) -> Result<String, CfgError> {
        let doc = self.materialize_str(content, overrides, schemas)?;
        Ok(export_document_to_json(doc.as_ref(), self.options.pretty))
    }

    pub fn render_file<P, S>(&self, path: P, overrides: &str, schema_paths: &[S]) -> Result<String, CfgError>
    where
        P: AsRef<Path>,
        S: AsRef<Path>,
    {
        let doc = self.materialize_file(path, overrides, schema_paths)?;
        Ok(export_document_to_json(doc.as_ref(), self.options.pretty))
    }

    fn prune(&self, document: Value) -> Option<Value> {
        let pruned = prune_disabled(document);
        if pruned.is_none() {
            debug!("every section was disabled, document removed");
        }
        pruned
    }
}

/// Read and parse a JSON document from disk.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Value, CfgError> {
    let path = path.as_ref();
    let source = path.to_string_lossy().to_string();

    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CfgError::NotFound {
            path: source.clone(),
            hint: Some("Check that the file exists and is readable".into()),
            code: Some(301),
        },
        _ => CfgError::Io {
            path: source.clone(),
            message: format!("Failed to read file: {}", e),
            hint: None,
            code: Some(302),
        },
    })?;

    parse_document(&content, &source)
}

/// Parse JSON text; `source` names it in diagnostics.
pub fn parse_document(content: &str, source: &str) -> Result<Value, CfgError> {
    serde_json::from_str::<serde_json::Value>(content)
        .map(Value::from)
        .map_err(|e| CfgError::MalformedDocument {
            path: source.to_string(),
            message: e.to_string(),
            line: e.line(),
            column: e.column(),
            hint: None,
            code: Some(310),
        })
}
