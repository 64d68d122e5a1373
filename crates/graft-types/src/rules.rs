//! Lazy type-resolution tables for axis-dependent operations.
//!
//! Some operations' result types depend on an argument's value at graph
//! construction time -- a reduction over the `"images"` axis of a collection
//! yields one type, over `("images", "bands")` another. A [`TypeRuleTable`]
//! declares that mapping from axis shape to result type.
//!
//! Rules are declared as zero-argument type thunks rather than types, so a
//! table can name types whose declarations depend on each other without
//! ordering problems. The thunks run exactly once: the resolved table is
//! built behind a [`OnceLock`] on first lookup, and every later lookup (from
//! any thread) sees the identical cached [`Arc<ProxyType>`] values. That
//! identity matters -- resolved types are compared and used as map keys by
//! callers, and a recompute-on-miss scheme would hand different threads
//! different instances.

use indexmap::IndexMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use graft_core::{GraftArg, Literal};

use crate::error::TypeError;
use crate::proxy::ProxyType;
use crate::value::ProxyValue;

/// A normalized shape key: an ordered tuple of axis names.
///
/// A bare axis and the 1-tuple containing it are the same key -- both
/// canonicalize to the one-element form, so `resolve("images")` and
/// `resolve(("images",))` hit the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapeKey(Vec<String>);

impl ShapeKey {
    pub fn new(parts: Vec<String>) -> ShapeKey {
        ShapeKey(parts)
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ShapeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => write!(f, "'{single}'"),
            parts => {
                let quoted: Vec<String> = parts.iter().map(|p| format!("'{p}'")).collect();
                write!(f, "({})", quoted.join(", "))
            }
        }
    }
}

impl From<&str> for ShapeKey {
    fn from(axis: &str) -> Self {
        ShapeKey(vec![axis.to_string()])
    }
}

impl From<String> for ShapeKey {
    fn from(axis: String) -> Self {
        ShapeKey(vec![axis])
    }
}

impl From<(&str,)> for ShapeKey {
    fn from(axes: (&str,)) -> Self {
        ShapeKey(vec![axes.0.to_string()])
    }
}

impl From<(&str, &str)> for ShapeKey {
    fn from(axes: (&str, &str)) -> Self {
        ShapeKey(vec![axes.0.to_string(), axes.1.to_string()])
    }
}

impl From<(&str, &str, &str)> for ShapeKey {
    fn from(axes: (&str, &str, &str)) -> Self {
        ShapeKey(vec![
            axes.0.to_string(),
            axes.1.to_string(),
            axes.2.to_string(),
        ])
    }
}

impl From<&[&str]> for ShapeKey {
    fn from(axes: &[&str]) -> Self {
        ShapeKey(axes.iter().map(|a| a.to_string()).collect())
    }
}

/// A deferred type producer. Plain function pointers keep tables `Sync` and
/// cheap to declare in statics.
pub type TypeThunk = fn() -> ProxyType;

/// A declarative (shape -> result type) table, resolved lazily and exactly
/// once for the lifetime of the owning type.
pub struct TypeRuleTable {
    /// Name of the owning proxy type, for error messages.
    owner: String,
    rules: Vec<(ShapeKey, TypeThunk)>,
    resolved: OnceLock<IndexMap<ShapeKey, Arc<ProxyType>>>,
}

impl TypeRuleTable {
    pub fn new(owner: &str, rules: Vec<(ShapeKey, TypeThunk)>) -> TypeRuleTable {
        TypeRuleTable {
            owner: owner.to_string(),
            rules,
            resolved: OnceLock::new(),
        }
    }

    /// The fully-resolved mapping. Thunks run on first call only; all
    /// callers afterwards share the same cached types.
    fn resolved(&self) -> &IndexMap<ShapeKey, Arc<ProxyType>> {
        self.resolved.get_or_init(|| {
            self.rules
                .iter()
                .map(|(key, thunk)| (key.clone(), Arc::new(thunk())))
                .collect()
        })
    }

    /// Looks up the result type for `shape`.
    ///
    /// Returns the identical cached type on every call with the same shape
    /// (bare or tupled form). Unrecognized shapes fail with
    /// [`TypeError::UnknownShape`].
    pub fn resolve(&self, shape: impl Into<ShapeKey>) -> Result<Arc<ProxyType>, TypeError> {
        let key = shape.into();
        self.resolved()
            .get(&key)
            .cloned()
            .ok_or_else(|| TypeError::UnknownShape {
                shape: key.to_string(),
                owner: self.owner.clone(),
            })
    }
}

impl fmt::Debug for TypeRuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRuleTable")
            .field("owner", &self.owner)
            .field("rules", &self.rules.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .field("resolved", &self.resolved.get().is_some())
            .finish()
    }
}

/// Builds an axis-dependent reduction node: `"{Receiver}.{method}"` applied
/// to the receiver and the axis argument, typed by `table`.
///
/// The axis is embedded as a bare string for a single axis and as a list of
/// strings otherwise, matching how the executing backend reads it.
pub fn apply_reduction(
    receiver: &ProxyValue,
    method: &str,
    axis: impl Into<ShapeKey>,
    table: &TypeRuleTable,
) -> Result<ProxyValue, TypeError> {
    let key = axis.into();
    let result_ty = table.resolve(key.clone())?;
    let axis_literal = match key.parts() {
        [single] => Literal::Str(single.clone()),
        parts => Literal::List(parts.iter().map(|p| Literal::Str(p.clone())).collect()),
    };
    ProxyValue::from_apply(
        (*result_ty).clone(),
        &format!("{}.{}", receiver.ty().name(), method),
        vec![
            GraftArg::Node(receiver.graft().as_ref()),
            GraftArg::Lit(axis_literal),
        ],
    )
}
