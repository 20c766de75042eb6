//! Message trees: nested catalogs of translatable strings.
//!
//! A catalog is a JSON object whose leaves are strings or further objects.
//! Flattening turns it into dotted content identifiers in document order.

use serde_json::{Map, Value};

/// A nested message catalog, in document key order.
pub type Messages = Map<String, Value>;

/// Flatten a message tree into `(identifier, text)` pairs.
///
/// Pre-order, depth-first, following the tree's own key order. Arrays,
/// nulls, numbers and booleans are skipped without error.
pub fn flatten_messages(tree: &Messages) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten_into(tree, "", &mut out);
    out
}

/// Flatten any JSON value. Non-object roots produce nothing.
pub fn flatten_value(tree: &Value) -> Vec<(String, String)> {
    match tree {
        Value::Object(map) => flatten_messages(map),
        _ => Vec::new(),
    }
}

fn flatten_into(tree: &Messages, prefix: &str, out: &mut Vec<(String, String)>) {
    for (key, value) in tree {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            Value::String(text) => out.push((full_key, text.clone())),
            Value::Object(nested) => flatten_into(nested, &full_key, out),
            _ => {}
        }
    }
}
