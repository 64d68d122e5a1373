//! The proxy type system.
//!
//! [`ProxyType`] is the closed set of static types a proxy value can carry:
//! primitives (Bool, Int, Float, Str, NoneType), the dynamic escape hatch
//! Any, the Slice index helper, and parameterized containers (List, Tuple,
//! Dict). Container variants with `None` parameters are the *generic*,
//! unparameterized forms -- usable as a family name but never as the type of
//! an actual value, a parameter, or a promotion target.
//!
//! Type names (`"Int"`, `"List[Int]"`, `"Dict[Str, Float]"`) are the only
//! type information that survives into the wire format, embedded in
//! operation names like `"Int.cast"`. The executing backend re-derives
//! result types from those names, so they must be stable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A proxy type: the static type of a not-yet-evaluated expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProxyType {
    Bool,
    Int,
    Float,
    Str,
    NoneType,
    /// Accepts promotion from anything; the untyped escape hatch.
    Any,
    /// An index range for container slicing.
    Slice,
    /// Homogeneous sequence. `None` is the generic form.
    List(Option<Box<ProxyType>>),
    /// Fixed-arity heterogeneous sequence. `None` is the generic form.
    Tuple(Option<Vec<ProxyType>>),
    /// String-keyed mapping `Dict[K, V]`. `None` is the generic form.
    Dict(Option<Box<(ProxyType, ProxyType)>>),
}

impl ProxyType {
    /// A concrete `List[element]`.
    pub fn list_of(element: ProxyType) -> ProxyType {
        ProxyType::List(Some(Box::new(element)))
    }

    /// A concrete `Tuple[..]`.
    pub fn tuple_of(items: Vec<ProxyType>) -> ProxyType {
        ProxyType::Tuple(Some(items))
    }

    /// A concrete `Dict[key, value]`.
    pub fn dict_of(key: ProxyType, value: ProxyType) -> ProxyType {
        ProxyType::Dict(Some(Box::new((key, value))))
    }

    /// The type's display name, as embedded in operation names.
    pub fn name(&self) -> String {
        match self {
            ProxyType::Bool => "Bool".to_string(),
            ProxyType::Int => "Int".to_string(),
            ProxyType::Float => "Float".to_string(),
            ProxyType::Str => "Str".to_string(),
            ProxyType::NoneType => "NoneType".to_string(),
            ProxyType::Any => "Any".to_string(),
            ProxyType::Slice => "Slice".to_string(),
            ProxyType::List(None) => "List".to_string(),
            ProxyType::List(Some(elem)) => format!("List[{}]", elem.name()),
            ProxyType::Tuple(None) => "Tuple".to_string(),
            ProxyType::Tuple(Some(items)) => {
                let inner: Vec<String> = items.iter().map(ProxyType::name).collect();
                format!("Tuple[{}]", inner.join(", "))
            }
            ProxyType::Dict(None) => "Dict".to_string(),
            ProxyType::Dict(Some(kv)) => format!("Dict[{}, {}]", kv.0.name(), kv.1.name()),
        }
    }

    /// Returns `true` if this type is generic (unparameterized) anywhere in
    /// its structure. Generic types cannot type values, parameters, or
    /// promotion targets.
    pub fn is_generic(&self) -> bool {
        match self {
            ProxyType::List(None) | ProxyType::Tuple(None) | ProxyType::Dict(None) => true,
            ProxyType::List(Some(elem)) => elem.is_generic(),
            ProxyType::Tuple(Some(items)) => items.iter().any(ProxyType::is_generic),
            ProxyType::Dict(Some(kv)) => kv.0.is_generic() || kv.1.is_generic(),
            _ => false,
        }
    }

    /// Returns `true` for the numeric kinds participating in binary
    /// promotion.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ProxyType::Int | ProxyType::Float)
    }

    /// Widening rank among numeric kinds. The order is total, so binary
    /// promotion is deterministic and symmetric.
    fn numeric_rank(&self) -> Option<u8> {
        match self {
            ProxyType::Int => Some(1),
            ProxyType::Float => Some(2),
            _ => None,
        }
    }

    /// The wider of two numeric kinds, or `None` if either is non-numeric.
    ///
    /// `Float` wins whenever it appears on either side, in both argument
    /// orders.
    pub fn widest(a: &ProxyType, b: &ProxyType) -> Option<ProxyType> {
        let rank_a = a.numeric_rank()?;
        let rank_b = b.numeric_rank()?;
        Some(if rank_a >= rank_b { a.clone() } else { b.clone() })
    }

    /// Returns `true` if an explicit cast between the two types exists.
    ///
    /// Casts cover the numeric family (Bool, Int, Float, in any direction),
    /// numeric-to-Str rendering, and Any in either role. Promotion never
    /// performs these implicitly.
    pub fn cast_exists(from: &ProxyType, to: &ProxyType) -> bool {
        let numeric_family =
            |t: &ProxyType| matches!(t, ProxyType::Bool | ProxyType::Int | ProxyType::Float);
        if matches!(from, ProxyType::Any) || matches!(to, ProxyType::Any) {
            return true;
        }
        if numeric_family(from) && numeric_family(to) {
            return true;
        }
        numeric_family(from) && matches!(to, ProxyType::Str)
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
