//! Named parameters and identifiers.
//!
//! A parameter is a typed placeholder: a proxy value whose graft is a single
//! named reference, bound to a concrete value by the execution backend at
//! evaluation time. Nothing is looked up or bound here.

use graft_core::Graft;

use crate::error::TypeError;
use crate::proxy::ProxyType;
use crate::value::ProxyValue;

/// Creates a typed parameter named `name`.
///
/// The name must not be purely numeric (numeric keys are node IDs in the
/// wire encoding) and must not be `"returns"`; the type must be concrete.
/// Whether two parameters may share a name across independently-built
/// expressions is decided when their grafts merge: same declared type
/// unifies, different declared types is a construction-time error.
pub fn parameter(name: &str, ty: &ProxyType) -> Result<ProxyValue, TypeError> {
    if ty.is_generic() {
        return Err(TypeError::GenericType { ty: ty.name() });
    }
    identifier(name, ty)
}

/// Creates a proxy value referencing a graft key directly; used for builtin
/// constants as well as parameters.
pub fn identifier(name: &str, ty: &ProxyType) -> Result<ProxyValue, TypeError> {
    let graft = Graft::keyref(name, &ty.name())?;
    ProxyValue::from_graft(ty.clone(), graft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_core::{CoreError, NodeDef};

    #[test]
    fn parameter_builds_a_keyref() {
        let p = parameter("scale", &ProxyType::Float).unwrap();
        assert_eq!(p.ty(), &ProxyType::Float);
        assert_eq!(p.graft().len(), 1);
        assert_eq!(
            p.graft().root_node(),
            &NodeDef::KeyRef {
                name: "scale".into(),
                ty: "Float".into()
            }
        );
    }

    #[test]
    fn numeric_names_are_rejected() {
        let err = parameter("3", &ProxyType::Any).unwrap_err();
        assert!(matches!(
            err,
            TypeError::Core(CoreError::ReservedName { .. })
        ));
    }

    #[test]
    fn returns_name_is_rejected() {
        assert!(parameter("returns", &ProxyType::Int).is_err());
    }

    #[test]
    fn generic_types_are_rejected() {
        let err = parameter("x", &ProxyType::List(None)).unwrap_err();
        assert!(matches!(err, TypeError::GenericType { .. }));
    }

    #[test]
    fn parameters_participate_in_expressions() {
        let x = parameter("x", &ProxyType::Int).unwrap();
        let doubled = x.mul(2i64).unwrap();
        assert_eq!(doubled.ty(), &ProxyType::Int);
        // keyref, the promoted literal 2, and the application.
        assert_eq!(doubled.graft().len(), 3);
    }

    #[test]
    fn container_parameter_types_carry_their_name() {
        let xs = parameter("xs", &ProxyType::list_of(ProxyType::Float)).unwrap();
        match xs.graft().root_node() {
            NodeDef::KeyRef { ty, .. } => assert_eq!(ty, "List[Float]"),
            other => panic!("expected KeyRef root, got {other:?}"),
        }
    }
}
