// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Runtime value representation for module exports.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Shared storage backing a [`Value::Object`].
pub type ObjectRef = Arc<RwLock<HashMap<String, Value>>>;

/// A runtime value.
///
/// Cloning is cheap: the object variant shares its backing storage, so a
/// clone of an object observes later mutations of the original. Exports
/// containers depend on this: a requester holding a module's half-populated
/// exports sees the entries the factory adds afterwards.
#[derive(Debug, Clone)]
pub enum Value {
    /// undefined
    Undefined,
    /// null
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number (IEEE 754 double)
    Number(f64),
    /// String
    String(String),
    /// Shared mutable object
    Object(ObjectRef),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => {
                // Handle NaN comparisons
                if a.is_nan() && b.is_nan() {
                    false
                } else {
                    a == b
                }
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    /// Creates a fresh, empty object value.
    pub fn new_object() -> Self {
        Value::Object(Arc::new(RwLock::new(HashMap::new())))
    }

    /// Returns true if this value is undefined.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns true if this value is an object.
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Returns true if `self` and `other` are the same object.
    ///
    /// Scalar values always compare false; identity only exists for the
    /// shared object variant.
    pub fn same_object(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Reads a property from an object value.
    ///
    /// Returns `None` for missing keys and for non-object values.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(map) => map.read().get(key).cloned(),
            _ => None,
        }
    }

    /// Writes a property on an object value.
    ///
    /// Returns false (and does nothing) when the value is not an object.
    pub fn set(&self, key: impl Into<String>, value: Value) -> bool {
        match self {
            Value::Object(map) => {
                map.write().insert(key.into(), value);
                true
            }
            _ => false,
        }
    }

    /// Converts a parsed JSON document into a value.
    ///
    /// Arrays become objects with index keys plus a `length` entry, matching
    /// how plain-data modules are handed to requesters.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(arr) => {
                let object = Value::new_object();
                for (i, item) in arr.iter().enumerate() {
                    object.set(i.to_string(), Value::from_json(item));
                }
                object.set("length", Value::Number(arr.len() as f64));
                object
            }
            serde_json::Value::Object(map) => {
                let object = Value::new_object();
                for (key, item) in map {
                    object.set(key.clone(), Value::from_json(item));
                }
                object
            }
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Undefined
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Object(map) => write!(f, "[object: {} entries]", map.read().len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_clone_shares_storage() {
        let a = Value::new_object();
        let b = a.clone();
        a.set("answer", Value::Number(42.0));
        assert_eq!(b.get("answer"), Some(Value::Number(42.0)));
        assert!(a.same_object(&b));
    }

    #[test]
    fn test_distinct_objects_are_not_equal() {
        let a = Value::new_object();
        let b = Value::new_object();
        assert_ne!(a, b);
        assert!(!a.same_object(&b));
    }

    #[test]
    fn test_scalar_equality() {
        assert_eq!(Value::String("x".into()), Value::String("x".into()));
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
        assert_ne!(Value::Null, Value::Undefined);
    }

    #[test]
    fn test_get_set_on_non_object() {
        let s = Value::String("nope".into());
        assert!(!s.set("k", Value::Null));
        assert_eq!(s.get("k"), None);
    }

    #[test]
    fn test_from_json() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"name":"pkg","tags":["a","b"],"major":2,"beta":false}"#)
                .unwrap();
        let value = Value::from_json(&json);
        assert_eq!(value.get("name"), Some(Value::String("pkg".into())));
        assert_eq!(value.get("major"), Some(Value::Number(2.0)));
        assert_eq!(value.get("beta"), Some(Value::Boolean(false)));

        let tags = value.get("tags").unwrap();
        assert_eq!(tags.get("0"), Some(Value::String("a".into())));
        assert_eq!(tags.get("length"), Some(Value::Number(2.0)));
    }
}
