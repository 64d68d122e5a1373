//! Literal values embeddable in a graft.
//!
//! [`Literal`] covers exactly the JSON-compatible values the wire format can
//! carry: null, booleans, integers, floats, strings, and nested containers.
//! Map literals use [`IndexMap`] so serialization order is insertion order,
//! keeping identical grafts byte-identical on the wire.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A literal value embedded in a graft node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Literal>),
    Map(IndexMap<String, Literal>),
}

impl Literal {
    /// Converts to the JSON value the wire format embeds.
    pub fn to_json(&self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(i) => Value::from(*i),
            Literal::Float(f) => Value::from(*f),
            Literal::Str(s) => Value::String(s.clone()),
            Literal::List(items) => Value::Array(items.iter().map(Literal::to_json).collect()),
            Literal::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Returns `true` if every float in the literal is finite.
    ///
    /// JSON has no representation for NaN or infinity (`to_json` would
    /// collapse them to null), so callers check this before embedding a
    /// literal in a graft.
    pub fn is_finite(&self) -> bool {
        match self {
            Literal::Float(f) => f.is_finite(),
            Literal::List(items) => items.iter().all(Literal::is_finite),
            Literal::Map(entries) => entries.values().all(Literal::is_finite),
            _ => true,
        }
    }

    /// Short label for the literal's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::Null => "null",
            Literal::Bool(_) => "bool",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Str(_) => "str",
            Literal::List(_) => "list",
            Literal::Map(_) => "map",
        }
    }
}

// Conversions from the native Rust values users hand to promotion.

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self {
        Literal::Int(i)
    }
}

impl From<i32> for Literal {
    fn from(i: i32) -> Self {
        Literal::Int(i64::from(i))
    }
}

impl From<f64> for Literal {
    fn from(f: f64) -> Self {
        Literal::Float(f)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::Str(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::Str(s)
    }
}

impl<T: Into<Literal>> From<Vec<T>> for Literal {
    fn from(items: Vec<T>) -> Self {
        Literal::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Literal>> From<Option<T>> for Literal {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Literal::Null,
        }
    }
}
