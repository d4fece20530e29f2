//! Structural payload values used for query parameters and request bodies.
//!
//! Arrays and objects live behind shared, interiorly mutable [`Node`]s, so a
//! payload graph may contain the same node more than once and may even refer
//! back to itself. Serialization (see [`super::serialize`]) is cycle-safe.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::serialize::stable_json;

/// Shared handle to an array or object payload.
///
/// Cloning a `Node` clones the handle, not the contents; both handles observe
/// the same data. Node identity is what cycle detection keys on.
pub struct Node<T>(Arc<RwLock<T>>);

impl<T> Node<T> {
    pub fn new(inner: T) -> Self {
        Self(Arc::new(RwLock::new(inner)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stable identity of the underlying allocation
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

/// A request payload value.
///
/// `Number` mirrors a JSON number. `BigInt` holds integers beyond
/// [`MAX_SAFE_INTEGER`]; every constructor picks between the two the same way,
/// so equal payloads have one representation however they were built.
/// `Undefined` is dropped from objects, becomes `null` inside arrays and
/// serializes to nothing at the top level.
/// Largest integer a double holds exactly (2^53 - 1)
pub const MAX_SAFE_INTEGER: i128 = (1 << 53) - 1;

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(serde_json::Number),
    BigInt(i128),
    String(String),
    Array(Node<Vec<Value>>),
    Object(Node<BTreeMap<String, Value>>),
}

impl Value {
    /// New empty object node
    pub fn object() -> Self {
        Value::Object(Node::new(BTreeMap::new()))
    }

    /// New empty array node
    pub fn array() -> Self {
        Value::Array(Node::new(Vec::new()))
    }

    /// Convert any serializable value.
    ///
    /// Values serde cannot represent degrade to `Null` instead of failing.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(json) => Value::from(json),
            Err(e) => {
                tracing::debug!(error = %e, "payload is not serializable, using null");
                Value::Null
            }
        }
    }

    /// Insert `key` into an object value.
    ///
    /// Returns false (and does nothing) when `self` is not an object.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        match self {
            Value::Object(node) => {
                node.write().insert(key.into(), value.into());
                true
            }
            _ => false,
        }
    }

    /// Append to an array value. Returns false when `self` is not an array.
    pub fn push(&self, value: impl Into<Value>) -> bool {
        match self {
            Value::Array(node) => {
                node.write().push(value.into());
                true
            }
            _ => false,
        }
    }

    /// Look up a member of an object value
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(node) => node.read().get(key).cloned(),
            _ => None,
        }
    }

    /// Integer as `Number` when it is exactly representable as a double,
    /// `BigInt` otherwise
    pub fn integer(n: i128) -> Self {
        if n.abs() <= MAX_SAFE_INTEGER {
            i64::try_from(n).map_or(Value::BigInt(n), |small| Value::Number(small.into()))
        } else {
            Value::BigInt(n)
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

// Derived Debug would recurse forever on self-referential payloads.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            other => f.write_str(&stable_json(other)),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Value::integer(i128::from(i)),
                (None, Some(u)) => Value::integer(i128::from(u)),
                (None, None) => Value::Number(n),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(Node::new(items.into_iter().map(Value::from).collect()))
            }
            serde_json::Value::Object(map) => Value::Object(Node::new(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            )),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

macro_rules! number_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Number(serde_json::Number::from(n))
                }
            }
        )*
    };
}

macro_rules! integer_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::integer(i128::from(n))
                }
            }
        )*
    };
}

number_from!(i8, i16, i32, u8, u16, u32);
integer_from!(i64, u64, i128);

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::from(f64::from(n))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Undefined, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(Node::new(items.into_iter().map(Into::into).collect()))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Object(Node::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect()))
    }
}
