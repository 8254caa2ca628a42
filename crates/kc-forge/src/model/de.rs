//! Lenient field deserializers.
//!
//! Realm exports are hand-edited often enough that a wrong-typed leaf
//! (`"enabled": "false"`, `"port": 587`) must not reject the whole entity.
//! Each helper reads the raw JSON value and keeps what it can interpret,
//! mapping everything else to "absent" so the accessor default applies.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn raw<'de, D: Deserializer<'de>>(d: D) -> Result<Value, D::Error> {
    Ok(Option::<Value>::deserialize(d)?.unwrap_or(Value::Null))
}

/// JavaScript-style truthiness of a JSON value.
#[must_use]
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Interprets a scalar as a boolean: JSON booleans and `"true"`/`"false"` strings.
#[must_use]
pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Interprets a scalar as a string: strings as-is, numbers in their JSON form.
#[must_use]
pub fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Interprets a scalar as an integer: integral numbers, floats (truncated) and numeric strings.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn strings(items: &[Value]) -> Vec<String> {
    items.iter().filter_map(as_string).collect()
}

pub(crate) fn opt_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    Ok(as_bool(&raw(d)?))
}

pub(crate) fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match raw(d)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub(crate) fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(as_i64(&raw(d)?))
}

pub(crate) fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match raw(d)? {
        Value::Array(items) => strings(&items),
        _ => Vec::new(),
    })
}

pub(crate) fn opt_string_list<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<Vec<String>>, D::Error> {
    Ok(match raw(d)? {
        Value::Array(items) => Some(strings(&items)),
        _ => None,
    })
}

/// Object whose values are strings or lists of strings (user attributes, component config).
pub(crate) fn multi_map<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<BTreeMap<String, Vec<String>>, D::Error> {
    let Value::Object(map) = raw(d)? else {
        return Ok(BTreeMap::new());
    };
    Ok(map
        .into_iter()
        .filter_map(|(k, v)| match v {
            Value::Array(items) => Some((k, strings(&items))),
            other => as_string(&other).map(|s| (k, vec![s])),
        })
        .collect())
}

/// Object of scalar values; list values contribute their first element.
pub(crate) fn string_map<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<BTreeMap<String, String>, D::Error> {
    let Value::Object(map) = raw(d)? else {
        return Ok(BTreeMap::new());
    };
    Ok(map
        .into_iter()
        .filter_map(|(k, v)| match v {
            Value::Array(items) => items.first().and_then(as_string).map(|s| (k, s)),
            other => as_string(&other).map(|s| (k, s)),
        })
        .collect())
}

/// Object of string lists keyed by name (client role assignments).
pub(crate) fn list_map<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<BTreeMap<String, Vec<String>>, D::Error> {
    let Value::Object(map) = raw(d)? else {
        return Ok(BTreeMap::new());
    };
    Ok(map
        .into_iter()
        .filter_map(|(k, v)| match v {
            Value::Array(items) => Some((k, strings(&items))),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness_follows_javascript() {
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!(false)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(truthy(&json!("demo")));
        assert!(truthy(&json!(1)));
        assert!(truthy(&json!([])));
        assert!(truthy(&json!({})));
    }

    #[test]
    fn bools_accept_strings() {
        assert_eq!(as_bool(&json!("TRUE")), Some(true));
        assert_eq!(as_bool(&json!("false")), Some(false));
        assert_eq!(as_bool(&json!("yes")), None);
        assert_eq!(as_bool(&json!(1)), None);
    }

    #[test]
    fn integers_accept_numeric_strings() {
        assert_eq!(as_i64(&json!("587")), Some(587));
        assert_eq!(as_i64(&json!(30.9)), Some(30));
        assert_eq!(as_i64(&json!("soon")), None);
    }

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "multi_map")]
        attrs: BTreeMap<String, Vec<String>>,
        #[serde(default, deserialize_with = "string_map")]
        config: BTreeMap<String, String>,
        #[serde(default, deserialize_with = "string_list")]
        uris: Vec<String>,
    }

    #[test]
    fn maps_tolerate_mixed_values() {
        let sample: Sample = serde_json::from_value(json!({
            "attrs": {"dept": ["eng", "ops"], "level": 3, "skip": {"nested": true}},
            "config": {"host": ["ldap.example.com"], "port": 389, "none": null},
            "uris": ["https://a", 7, null]
        }))
        .unwrap();
        assert_eq!(sample.attrs["dept"], vec!["eng", "ops"]);
        assert_eq!(sample.attrs["level"], vec!["3"]);
        assert!(!sample.attrs.contains_key("skip"));
        assert_eq!(sample.config["host"], "ldap.example.com");
        assert_eq!(sample.config["port"], "389");
        assert!(!sample.config.contains_key("none"));
        assert_eq!(sample.uris, vec!["https://a", "7"]);
    }

    #[test]
    fn wrong_shapes_become_empty() {
        let sample: Sample = serde_json::from_value(json!({
            "attrs": "nope",
            "config": [1, 2],
            "uris": "https://single"
        }))
        .unwrap();
        assert!(sample.attrs.is_empty());
        assert!(sample.config.is_empty());
        assert!(sample.uris.is_empty());
    }
}
