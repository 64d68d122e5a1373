//! Promotion and explicit casts.
//!
//! Promotion converts a native value or an existing proxy value into a
//! required proxy type. The rules are conservative, mirroring the no-implicit
//! coercion policy of the type checker this layer feeds:
//!
//! - a proxy already of the target type passes through unchanged (identity,
//!   so repeated promotion is free);
//! - any proxy promotes to `Any` (supertype path, graft shared);
//! - a proxy of a *different* type never promotes -- even "safe" numeric
//!   widening like Int -> Float requires an explicit cast;
//! - a native literal promotes only when it matches the target's expected
//!   native representation exactly;
//! - generic container types are never promotion targets.

use graft_core::{GraftArg, Literal};

use crate::error::TypeError;
use crate::proxy::ProxyType;
use crate::value::ProxyValue;

/// A promotion input: an existing proxy value, or a native literal.
#[derive(Debug, Clone)]
pub enum Operand {
    Proxy(ProxyValue),
    Native(Literal),
}

impl Operand {
    /// Short description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Operand::Proxy(p) => p.ty().name(),
            Operand::Native(lit) => format!("native {}", lit.kind()),
        }
    }
}

impl From<ProxyValue> for Operand {
    fn from(value: ProxyValue) -> Self {
        Operand::Proxy(value)
    }
}

impl From<&ProxyValue> for Operand {
    fn from(value: &ProxyValue) -> Self {
        Operand::Proxy(value.clone())
    }
}

impl From<Literal> for Operand {
    fn from(value: Literal) -> Self {
        Operand::Native(value)
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Native(Literal::Int(value))
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Operand::Native(Literal::Int(i64::from(value)))
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Native(Literal::Float(value))
    }
}

impl From<bool> for Operand {
    fn from(value: bool) -> Self {
        Operand::Native(Literal::Bool(value))
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Operand::Native(Literal::Str(value.to_string()))
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Operand::Native(Literal::Str(value))
    }
}

/// Promotes `operand` to `target`.
///
/// See the module docs for the rules. The two failure modes are distinct:
/// [`TypeError::ExplicitCastRequired`] when a cast between the types exists
/// but was not used, [`TypeError::CannotPromote`] when no conversion exists.
pub fn promote(operand: impl Into<Operand>, target: &ProxyType) -> Result<ProxyValue, TypeError> {
    if target.is_generic() {
        return Err(TypeError::GenericType { ty: target.name() });
    }
    match operand.into() {
        Operand::Proxy(value) => {
            if value.ty() == target {
                return Ok(value);
            }
            if matches!(target, ProxyType::Any) {
                return Ok(value.retyped(ProxyType::Any));
            }
            if ProxyType::cast_exists(value.ty(), target) {
                Err(TypeError::ExplicitCastRequired {
                    from: value.ty().name(),
                    to: target.name(),
                })
            } else {
                Err(TypeError::CannotPromote {
                    value: value.ty().name(),
                    target: target.name(),
                })
            }
        }
        Operand::Native(lit) => {
            // JSON has no non-finite floats; embedding one would turn into
            // null on the wire.
            if !lit.is_finite() {
                return Err(TypeError::CannotPromote {
                    value: "non-finite native float".to_string(),
                    target: target.name(),
                });
            }
            if native_accepts(target, &lit) {
                ProxyValue::from_literal(target.clone(), lit)
            } else {
                Err(TypeError::CannotPromote {
                    value: format!("native {}", lit.kind()),
                    target: target.name(),
                })
            }
        }
    }
}

/// Whether `lit` is the expected native representation of `ty`.
///
/// Exact per kind: an int literal is not a valid `Float`, mirroring the
/// strictness of the proxy-level rule. Containers check recursively.
fn native_accepts(ty: &ProxyType, lit: &Literal) -> bool {
    match (ty, lit) {
        (ProxyType::Any, _) => true,
        (ProxyType::Bool, Literal::Bool(_)) => true,
        (ProxyType::Int, Literal::Int(_)) => true,
        (ProxyType::Float, Literal::Float(_)) => true,
        (ProxyType::Str, Literal::Str(_)) => true,
        (ProxyType::NoneType, Literal::Null) => true,
        (ProxyType::List(Some(elem)), Literal::List(items)) => {
            items.iter().all(|item| native_accepts(elem, item))
        }
        (ProxyType::Tuple(Some(types)), Literal::List(items)) => {
            types.len() == items.len()
                && types
                    .iter()
                    .zip(items)
                    .all(|(t, item)| native_accepts(t, item))
        }
        (ProxyType::Dict(Some(kv)), Literal::Map(entries)) => {
            // Map literals are string-keyed, so the key type must be Str.
            kv.0 == ProxyType::Str && entries.values().all(|v| native_accepts(&kv.1, v))
        }
        _ => false,
    }
}

/// Explicitly casts `value` to `target`.
///
/// A same-type cast passes the value through unchanged. Otherwise the cast is
/// recorded as an application named `"{Target}.cast"` with the source node as
/// its single argument -- this is the only sanctioned conversion between
/// proxy types.
pub fn cast(value: &ProxyValue, target: &ProxyType) -> Result<ProxyValue, TypeError> {
    if target.is_generic() {
        return Err(TypeError::GenericType { ty: target.name() });
    }
    if value.ty() == target {
        return Ok(value.clone());
    }
    if !ProxyType::cast_exists(value.ty(), target) {
        return Err(TypeError::CannotPromote {
            value: value.ty().name(),
            target: target.name(),
        });
    }
    ProxyValue::from_apply(
        target.clone(),
        &format!("{}.cast", target.name()),
        vec![GraftArg::Node(value.graft().as_ref())],
    )
}
