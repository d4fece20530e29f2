//! Deterministic, cycle-safe serialization of payload values.
//!
//! Output is compact JSON with object keys in sorted order. A node that is
//! reached again while it is still on the current traversal path is written as
//! [`CIRCULAR_SENTINEL`]; a node merely shared between siblings is written in
//! full each time.
//!
//! [`stable_json`] is the fingerprint form and writes big integers as decimal
//! strings. [`wire_json`] is the request-body form and writes them as bare
//! JSON numbers.

use serde_json::Value as Json;

use super::value::Value;

/// Marker written in place of a node that refers back to one of its ancestors
pub const CIRCULAR_SENTINEL: &str = "[Circular]";

/// Convert a payload into a JSON tree, or `None` when it is undefined.
pub fn to_json(value: &Value) -> Option<Json> {
    let mut path = Vec::new();
    convert(value, &mut path)
}

/// Compact JSON text for `value`; undefined serializes to the empty string.
pub fn stable_json(value: &Value) -> String {
    to_json(value).map(|json| json.to_string()).unwrap_or_default()
}

/// Serialization used inside fingerprints: strings are taken verbatim,
/// anything else goes through [`stable_json`], absent payloads are empty.
pub fn serialize_payload(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => stable_json(other),
    }
}

/// Compact JSON text for sending `value` over the wire.
///
/// Same layout as [`stable_json`] except that `BigInt` is written as a JSON
/// number, digits and all.
pub fn wire_json(value: &Value) -> String {
    let mut out = String::new();
    let mut path = Vec::new();
    if !write_wire(value, &mut path, &mut out) {
        out.clear();
    }
    out
}

/// Returns false (writing nothing) for undefined
fn write_wire(value: &Value, path: &mut Vec<usize>, out: &mut String) -> bool {
    match value {
        Value::Undefined => return false,
        Value::BigInt(n) => out.push_str(&n.to_string()),
        Value::Array(node) => {
            let id = node.id();
            if path.contains(&id) {
                out.push_str(&Json::from(CIRCULAR_SENTINEL).to_string());
                return true;
            }
            path.push(id);
            out.push('[');
            for (i, item) in node.read().iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                if !write_wire(item, path, out) {
                    out.push_str("null");
                }
            }
            out.push(']');
            path.pop();
        }
        Value::Object(node) => {
            let id = node.id();
            if path.contains(&id) {
                out.push_str(&Json::from(CIRCULAR_SENTINEL).to_string());
                return true;
            }
            path.push(id);
            out.push('{');
            let mut first = true;
            for (key, member) in node.read().iter() {
                if member.is_undefined() {
                    continue;
                }
                if !first {
                    out.push(',');
                }
                first = false;
                out.push_str(&Json::from(key.as_str()).to_string());
                out.push(':');
                write_wire(member, path, out);
            }
            out.push('}');
            path.pop();
        }
        scalar => match convert(scalar, path) {
            Some(json) => out.push_str(&json.to_string()),
            None => return false,
        },
    }
    true
}

fn convert(value: &Value, path: &mut Vec<usize>) -> Option<Json> {
    match value {
        Value::Undefined => None,
        Value::Null => Some(Json::Null),
        Value::Bool(b) => Some(Json::Bool(*b)),
        Value::Number(n) => Some(Json::Number(n.clone())),
        Value::BigInt(n) => Some(Json::String(n.to_string())),
        Value::String(s) => Some(Json::String(s.clone())),
        Value::Array(node) => {
            let id = node.id();
            if path.contains(&id) {
                return Some(Json::String(CIRCULAR_SENTINEL.to_string()));
            }
            path.push(id);
            let items = node
                .read()
                .iter()
                .map(|item| convert(item, path).unwrap_or(Json::Null))
                .collect();
            path.pop();
            Some(Json::Array(items))
        }
        Value::Object(node) => {
            let id = node.id();
            if path.contains(&id) {
                return Some(Json::String(CIRCULAR_SENTINEL.to_string()));
            }
            path.push(id);
            let map = node
                .read()
                .iter()
                .filter_map(|(key, member)| convert(member, path).map(|json| (key.clone(), json)))
                .collect::<serde_json::Map<String, Json>>();
            path.pop();
            Some(Json::Object(map))
        }
    }
}
