// Author: Dustin Pilgrim
// License: MIT

use crate::ast::Value;

/// Remove every object flagged `"disabled": true`.
///
/// Containers left empty are removed too, all the way up; `None` means the
/// value itself is gone. Scalars, `null` included, are always kept.
pub fn prune_disabled(value: Value) -> Option<Value> {
    match value {
        Value::Object(_) if value.is_disabled() => None,
        Value::Object(items) => {
            let kept: indexmap::IndexMap<String, Value> = items
                .into_iter()
                .filter_map(|(k, v)| prune_disabled(v).map(|v| (k, v)))
                .collect();
            (!kept.is_empty()).then_some(Value::Object(kept))
        }
        Value::Array(items) => {
            let kept: Vec<Value> = items.into_iter().filter_map(prune_disabled).collect();
            (!kept.is_empty()).then_some(Value::Array(kept))
        }
        scalar => Some(scalar),
    }
}
