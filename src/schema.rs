// Author: Dustin Pilgrim
// License: MIT

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use jsonschema::Validator;
use serde_json::Value as Json;
use tracing::debug;

use crate::ast::Value;
use crate::CfgError;

/// A loaded JSON Schema together with where it came from.
///
/// Schemas without a `$schema` declaration are read as Draft 7.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    source: String,
    root: Json,
}

impl Schema {
    /// Load and check a schema file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CfgError> {
        let path = path.as_ref();
        let source = path.to_string_lossy().to_string();

        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CfgError::NotFound {
                path: source.clone(),
                hint: Some("Check the schema path".into()),
                code: Some(301),
            },
            _ => CfgError::Io {
                path: source.clone(),
                message: e.to_string(),
                hint: None,
                code: Some(302),
            },
        })?;

        let root = serde_json::from_str(&content).map_err(|e| CfgError::MalformedSchema {
            path: source.clone(),
            message: format!("Invalid JSON at {}:{}: {}", e.line(), e.column(), e),
            hint: None,
            code: Some(320),
        })?;

        Self::from_json(source, root)
    }

    /// Wrap an in-memory schema; `source` names it in diagnostics.
    pub fn from_json(source: impl Into<String>, root: Json) -> Result<Self, CfgError> {
        let schema = Self {
            source: source.into(),
            root,
        };

        if !schema.root.is_object() && !schema.root.is_boolean() {
            return Err(schema.malformed("#", format!("{} is not a valid schema", schema.root), 321));
        }
        schema.check_refs()?;
        schema.compile()?;
        Ok(schema)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Json {
        &self.root
    }

    /// Build a validator for the declared draft, checking the schema against
    /// its meta-schema.
    pub fn compile(&self) -> Result<Validator, CfgError> {
        let built = if self.root.get("$schema").is_some() {
            jsonschema::validator_for(&self.root)
        } else {
            jsonschema::draft7::new(&self.root)
        };
        built.map_err(|e| self.malformed(&format!("#{}", e.instance_path), e.to_string(), 321))
    }

    fn malformed(&self, location: &str, message: impl Into<String>, code: u32) -> CfgError {
        CfgError::MalformedSchema {
            path: self.source.clone(),
            message: format!("{} (at {})", message.into(), location),
            hint: None,
            code: Some(code),
        }
    }

    /// Every local `$ref` must resolve, and no chain of `$ref` and in-place
    /// applicators may lead back to where it started.
    fn check_refs(&self) -> Result<(), CfgError> {
        let mut done = HashSet::new();
        let mut pending = vec![("#".to_string(), &self.root)];

        while let Some((at, node)) = pending.pop() {
            if let Some(reference) = node.get("$ref").and_then(Json::as_str) {
                let local = reference == "#" || reference.starts_with("#/");
                if local && self.lookup_ref(reference).is_none() {
                    return Err(self.malformed(&at, format!("unresolvable $ref '{}'", reference), 322));
                }
            }

            if self.in_place_cycle(node, &mut Vec::new(), &mut done) {
                return Err(self.malformed(
                    &at,
                    "$ref cycle that never reaches a keyword consuming the instance",
                    322,
                ));
            }

            pending.extend(
                subschemas(node)
                    .into_iter()
                    .map(|(key, child)| (format!("{}/{}", at, key), child)),
            );
        }

        Ok(())
    }

    fn in_place_cycle<'s>(
        &'s self,
        node: &'s Json,
        stack: &mut Vec<*const Json>,
        done: &mut HashSet<*const Json>,
    ) -> bool {
        let id = node as *const Json;
        if stack.contains(&id) {
            return true;
        }
        if done.contains(&id) {
            return false;
        }

        stack.push(id);
        let cyclic = self
            .in_place(node)
            .into_iter()
            .any(|child| self.in_place_cycle(child, stack, done));
        stack.pop();
        done.insert(id);
        cyclic
    }

    /// Subschemas checked against the same instance as `node`.
    fn in_place<'s>(&'s self, node: &'s Json) -> Vec<&'s Json> {
        let Json::Object(obj) = node else {
            return Vec::new();
        };

        let mut out = Vec::new();
        if let Some(target) = obj.get("$ref").and_then(Json::as_str).and_then(|r| self.lookup_ref(r)) {
            out.push(target);
        }
        for key in ["allOf", "anyOf", "oneOf"] {
            if let Some(Json::Array(children)) = obj.get(key) {
                out.extend(children.iter());
            }
        }
        for key in ["not", "if", "then", "else"] {
            if let Some(child) = obj.get(key) {
                out.push(child);
            }
        }
        out
    }

    /// Local references only: `#` or `#/json/pointer`.
    fn lookup_ref(&self, reference: &str) -> Option<&Json> {
        let pointer = reference.strip_prefix('#')?;
        self.root.pointer(pointer)
    }
}

/// Direct subschemas of `node` with the pointer segments leading to them.
fn subschemas(node: &Json) -> Vec<(String, &Json)> {
    let Json::Object(obj) = node else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for (key, value) in obj {
        match (key.as_str(), value) {
            (
                "properties" | "patternProperties" | "definitions" | "$defs" | "dependencies"
                | "dependentSchemas",
                Json::Object(children),
            ) => {
                for (name, child) in children {
                    if child.is_object() || child.is_boolean() {
                        out.push((format!("{}/{}", key, escape(name)), child));
                    }
                }
            }
            ("items" | "allOf" | "anyOf" | "oneOf" | "prefixItems", Json::Array(children)) => {
                for (i, child) in children.iter().enumerate() {
                    out.push((format!("{}/{}", key, i), child));
                }
            }
            (
                "items" | "additionalItems" | "additionalProperties" | "contains" | "propertyNames"
                | "not" | "if" | "then" | "else" | "unevaluatedItems" | "unevaluatedProperties",
                child,
            ) => out.push((key.clone(), child)),
            _ => {}
        }
    }
    out
}

/// RFC 6901 escaping for one pointer segment.
fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// The conformance-check seam. The pipeline calls this once per schema, in
/// order, and stops at the first error.
pub trait SchemaValidator {
    fn validate(&self, document: &Value, schema: &Schema) -> Result<(), CfgError>;
}

/// Validator backed by the `jsonschema` crate, covering the full vocabulary
/// of the schema's draft.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSchemaValidator;

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, document: &Value, schema: &Schema) -> Result<(), CfgError> {
        let instance = Json::from(document.clone());
        debug!(schema = schema.source(), "validating document");

        let validator = schema.compile()?;
        validator.validate(&instance).map_err(|e| CfgError::Conformance {
            schema: schema.source().to_string(),
            pointer: format!("#{}", e.instance_path),
            message: e.to_string(),
            hint: None,
            code: Some(450),
        })
    }
}

#[cfg(test)]
mod tests;
