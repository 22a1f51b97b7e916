use serde::Serialize;
use serde_json::Value;

use crate::signer::SignerError;

/// Canonical JSON text for any serializable value.
///
/// Object keys are emitted in sorted order at every nesting level, so two
/// values with the same fields produce the same string regardless of the
/// order in which the fields were declared or inserted.
pub fn canonical_string<T: Serialize>(value: &T) -> Result<String, SignerError> {
    let value =
        serde_json::to_value(value).map_err(|e| SignerError::Serialization(e.to_string()))?;
    Ok(canonicalize(&value))
}

/// Canonical JSON text for an already-built [`Value`].
pub fn canonicalize(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
