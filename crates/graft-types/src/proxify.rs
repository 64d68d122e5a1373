//! Target-free promotion: inferring a proxy type from a native value.
//!
//! `proxify` is the convenience entry point for callers who have a native
//! value and no particular type in mind: existing proxy values pass through,
//! scalars map to their primitive types, homogeneous lists become `List[T]`,
//! anything else sequence-shaped becomes a `Tuple`, and string-keyed maps
//! with homogeneous values become `Dict[Str, V]`.

use graft_core::Literal;

use crate::error::TypeError;
use crate::promote::Operand;
use crate::proxy::ProxyType;
use crate::value::ProxyValue;

/// Promotes a native value to the proxy type its shape implies.
pub fn proxify(value: impl Into<Operand>) -> Result<ProxyValue, TypeError> {
    match value.into() {
        Operand::Proxy(p) => Ok(p),
        Operand::Native(lit) => {
            if !lit.is_finite() {
                return Err(TypeError::CannotPromote {
                    value: "non-finite native float".to_string(),
                    target: ProxyType::Float.name(),
                });
            }
            let ty = infer_type(&lit)?;
            ProxyValue::from_literal(ty, lit)
        }
    }
}

fn infer_type(lit: &Literal) -> Result<ProxyType, TypeError> {
    Ok(match lit {
        Literal::Null => ProxyType::NoneType,
        Literal::Bool(_) => ProxyType::Bool,
        Literal::Int(_) => ProxyType::Int,
        Literal::Float(_) => ProxyType::Float,
        Literal::Str(_) => ProxyType::Str,
        Literal::List(items) => {
            let types = items
                .iter()
                .map(infer_type)
                .collect::<Result<Vec<_>, _>>()?;
            match types.split_first() {
                Some((first, rest)) if rest.iter().all(|t| t == first) => {
                    ProxyType::list_of(first.clone())
                }
                // Heterogeneous (or empty) sequences fall back to a Tuple.
                _ => ProxyType::tuple_of(types),
            }
        }
        Literal::Map(entries) => {
            let mut value_types = entries.values().map(infer_type);
            let first = value_types.next().transpose()?.ok_or_else(|| {
                TypeError::CannotPromote {
                    value: "native map".to_string(),
                    target: "Dict".to_string(),
                }
            })?;
            for ty in value_types {
                if ty? != first {
                    return Err(TypeError::CannotPromote {
                        value: "native map with mixed value types".to_string(),
                        target: "Dict".to_string(),
                    });
                }
            }
            ProxyType::dict_of(ProxyType::Str, first)
        }
    })
}
