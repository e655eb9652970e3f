//! Masking of sensitive fields before they reach an audit sink or a
//! returned envelope.
//!
//! The gateway carries the bearer token inside the JSON body and many
//! envelopes contain borrower account identifiers, so anything that gets
//! persisted or echoed back goes through [`redact`] first.

use serde_json::Value;

/// Replacement for masked values.
pub const REDACTED: &str = "[REDACTED]";

/// Keys whose values are masked wherever they appear in the tree.
fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    lower == "token" || lower == "password" || lower.contains("accountnumber") || lower.contains("ssn")
}

/// Return a copy of `value` with every sensitive field masked, at any depth.
pub fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, val)| {
                    if is_sensitive_key(key) {
                        (key.clone(), Value::String(REDACTED.to_string()))
                    } else {
                        (key.clone(), redact(val))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}
