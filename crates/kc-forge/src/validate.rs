//! Realm document validation.
//!
//! The only structural requirement is a truthy `realm` field on an object.
//! Nested sections are not checked here; the emitters tolerate and report
//! malformed sections themselves.

use std::path::Path;

use serde_json::Value;

use crate::model::de::truthy;

/// Returns true iff `doc` is an object with a truthy `realm` field.
#[must_use]
pub fn is_valid(doc: &Value) -> bool {
    doc.as_object()
        .and_then(|obj| obj.get("realm"))
        .is_some_and(truthy)
}

/// Resolves the realm name of a valid document.
///
/// A string `realm` is used as-is. Any other truthy value falls back to the
/// stem of the originating file name, then to `realm`.
#[must_use]
pub fn realm_name(doc: &Value, file_name: &str) -> String {
    if let Some(name) = doc.get("realm").and_then(Value::as_str) {
        return name.to_string();
    }
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("realm")
        .to_string()
}
