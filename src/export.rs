// Author: Dustin Pilgrim
// License: MIT

use crate::ast::Value;

/// Serialize a materialized document.
///
/// A document pruned away entirely (`None`) is written as `null`. Compact
/// output is a single line; `pretty` indents with two spaces.
///
/// # Examples
/// ```
/// use workflow_cfg::export::export_document_to_json;
/// use workflow_cfg::Value;
///
/// let doc = Value::from(serde_json::json!({"name": "ci", "steps": [1, 2]}));
/// assert_eq!(export_document_to_json(Some(&doc), false), r#"{"name":"ci","steps":[1,2]}"#);
/// assert_eq!(export_document_to_json(None, false), "null");
/// ```
pub fn export_document_to_json(doc: Option<&Value>, pretty: bool) -> String {
    let json = doc.cloned().map_or(serde_json::Value::Null, serde_json::Value::from);
    if pretty {
        format!("{:#}", json)
    } else {
        json.to_string()
    }
}
