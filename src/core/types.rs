//! Runtime values and the type descriptors they are checked against.
//!
//! Methods on a validated class exchange dynamically typed [`Value`]s. Every
//! parameter and return slot may carry a [`TypeSpec`] which plays the role of
//! a type annotation: a plain data descriptor that the call wrapper compares
//! against the value actually supplied.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dynamic value passed to and returned from class methods.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(untagged)]
pub enum Value {
    /// Absence of a value
    #[default]
    None,
    /// Boolean value
    Boolean(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Ordered list of values
    List(Vec<Value>),
    /// String-keyed map preserving insertion order
    Map(IndexMap<String, Value>),
}

/// Type descriptor standing in for a parameter or return annotation.
///
/// Descriptors compare by plain equality, which is what validator contract
/// checks rely on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "inner", rename_all = "snake_case")]
pub enum TypeSpec {
    /// Accepts any value
    Any,
    /// Only [`Value::None`]
    None,
    /// Booleans only, never integers
    Boolean,
    /// Integers only, never booleans
    Integer,
    /// Floats, and integers through numeric widening
    Float,
    /// Strings
    String,
    /// List whose elements match the inner type
    List(Box<TypeSpec>),
    /// Map whose values match the inner type
    Map(Box<TypeSpec>),
    /// The inner type or [`Value::None`]
    Optional(Box<TypeSpec>),
    /// Any one of the listed types
    Union(Vec<TypeSpec>),
}

/// How much of a container is inspected when checking element types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollectionCheck {
    /// Only the first element of a list or first value of a map.
    FirstItem,
    /// Every element.
    #[default]
    AllItems,
}

// ============================================================================
// Value Implementation
// ============================================================================

impl Value {
    /// Name of the runtime type of this value, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "None",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
        }
    }

    /// Try to get this value as an integer.
    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    /// Try to get this value as a float.
    /// Integers are automatically converted to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_string(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// Try to get this value as a list reference.
    pub fn as_list(&self) -> Option<&[Value]> {
        if let Value::List(items) = self {
            Some(items)
        } else {
            None
        }
    }

    /// Try to get this value as a map reference.
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        if let Value::Map(map) = self {
            Some(map)
        } else {
            None
        }
    }

    /// Check if this value is None.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
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

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

// ============================================================================
// TypeSpec Implementation
// ============================================================================

impl TypeSpec {
    /// Shorthand for `List(inner)`.
    pub fn list(inner: TypeSpec) -> Self {
        TypeSpec::List(Box::new(inner))
    }

    /// Shorthand for `Map(inner)`.
    pub fn map(inner: TypeSpec) -> Self {
        TypeSpec::Map(Box::new(inner))
    }

    /// Shorthand for `Optional(inner)`.
    pub fn optional(inner: TypeSpec) -> Self {
        TypeSpec::Optional(Box::new(inner))
    }

    /// Check if a value matches this type, inspecting every container element.
    pub fn matches(&self, value: &Value) -> bool {
        self.check(value, CollectionCheck::AllItems).is_ok()
    }

    /// Check a value against this type.
    ///
    /// On failure returns a short description of what did not match, e.g.
    /// `item 0 is String, not Integer`.
    pub fn check(&self, value: &Value, strategy: CollectionCheck) -> Result<(), String> {
        match (self, value) {
            (TypeSpec::Any, _) => Ok(()),
            (TypeSpec::None, Value::None) => Ok(()),
            (TypeSpec::Boolean, Value::Boolean(_)) => Ok(()),
            (TypeSpec::Integer, Value::Integer(_)) => Ok(()),
            (TypeSpec::Float, Value::Float(_) | Value::Integer(_)) => Ok(()),
            (TypeSpec::String, Value::String(_)) => Ok(()),
            (TypeSpec::List(inner), Value::List(items)) => {
                let take = match strategy {
                    CollectionCheck::FirstItem => 1,
                    CollectionCheck::AllItems => items.len(),
                };
                for (index, item) in items.iter().enumerate().take(take) {
                    inner
                        .check(item, strategy)
                        .map_err(|detail| format!("item {}: {}", index, detail))?;
                }
                Ok(())
            }
            (TypeSpec::Map(inner), Value::Map(map)) => {
                let take = match strategy {
                    CollectionCheck::FirstItem => 1,
                    CollectionCheck::AllItems => map.len(),
                };
                for (key, item) in map.iter().take(take) {
                    inner
                        .check(item, strategy)
                        .map_err(|detail| format!("value of key {:?}: {}", key, detail))?;
                }
                Ok(())
            }
            (TypeSpec::Optional(_), Value::None) => Ok(()),
            (TypeSpec::Optional(inner), other) => inner.check(other, strategy),
            (TypeSpec::Union(options), other) => {
                if options.iter().any(|t| t.check(other, strategy).is_ok()) {
                    Ok(())
                } else {
                    Err(format!("{} did not match any element in {}", other.type_name(), self))
                }
            }
            (expected, got) => Err(format!("{} is not {}", got.type_name(), expected)),
        }
    }

    /// Get a human-readable name for this type.
    pub fn display_name(&self) -> String {
        match self {
            TypeSpec::Any => "Any".to_string(),
            TypeSpec::None => "None".to_string(),
            TypeSpec::Boolean => "Boolean".to_string(),
            TypeSpec::Integer => "Integer".to_string(),
            TypeSpec::Float => "Float".to_string(),
            TypeSpec::String => "String".to_string(),
            TypeSpec::List(inner) => format!("List[{}]", inner.display_name()),
            TypeSpec::Map(inner) => format!("Map[String, {}]", inner.display_name()),
            TypeSpec::Optional(inner) => format!("Optional[{}]", inner.display_name()),
            TypeSpec::Union(options) => {
                let names: Vec<String> = options.iter().map(|t| t.display_name()).collect();
                format!("Union[{}]", names.join(", "))
            }
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
