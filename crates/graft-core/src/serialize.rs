//! Wire-format encoding for grafts.
//!
//! A graft serializes to a JSON object mapping node-ID strings to node
//! bodies, with the reserved key `"returns"` holding the root node's ID:
//!
//! - a scalar literal node is its JSON value;
//! - a container literal node is the single-entry object `{"quote": value}`.
//!   A bare array body always denotes an application and a bare object body
//!   always denotes a marker, so list and map literals must be quoted: an
//!   unquoted `List[Str]` whose first element names an operation would read
//!   as an application, and an unquoted map keyed `"parameter"` would read
//!   as a parameter reference;
//! - an application node is an array `[op, arg, ...]`, where a string
//!   argument is a node-ID reference and any other JSON value is an inline
//!   literal;
//! - a parameter reference is the single-entry object `{"parameter": name}`.
//!
//! Encoding is deterministic: node bodies follow from node content alone, and
//! identical grafts serialize to identical strings. The executing backend
//! re-derives result types from operation names, so the names emitted by the
//! dispatch layer are the only type information that survives serialization.

use serde_json::{Map, Value};

use crate::graph::Graft;
use crate::literal::Literal;
use crate::node::{Arg, NodeDef};

/// The reserved top-level key holding the root node's ID.
pub const RETURNS_KEY: &str = "returns";

/// The marker key encoding a parameter reference node.
pub const PARAMETER_KEY: &str = "parameter";

/// The marker key quoting a container literal in node-body position.
pub const QUOTE_KEY: &str = "quote";

/// Encodes a graft as its wire-format JSON value.
pub fn to_wire(graft: &Graft) -> Value {
    let mut map = Map::new();
    for (id, node) in graft.nodes() {
        map.insert(id.as_key(), node_body(node));
    }
    map.insert(
        RETURNS_KEY.to_string(),
        Value::String(graft.root().as_key()),
    );
    Value::Object(map)
}

/// Encodes a graft as its wire-format JSON string.
pub fn to_wire_string(graft: &Graft) -> String {
    // Value::Object uses a sorted map, so the output is deterministic.
    to_wire(graft).to_string()
}

fn node_body(node: &NodeDef) -> Value {
    match node {
        // Container literals are quoted; see the module docs.
        NodeDef::Literal(lit @ (Literal::List(_) | Literal::Map(_))) => {
            let mut quoted = Map::new();
            quoted.insert(QUOTE_KEY.to_string(), lit.to_json());
            Value::Object(quoted)
        }
        NodeDef::Literal(lit) => lit.to_json(),
        NodeDef::KeyRef { name, .. } => {
            let mut marker = Map::new();
            marker.insert(PARAMETER_KEY.to_string(), Value::String(name.clone()));
            Value::Object(marker)
        }
        NodeDef::Apply { op, args } => {
            let mut elements = Vec::with_capacity(args.len() + 1);
            elements.push(Value::String(op.clone()));
            for arg in args {
                elements.push(match arg {
                    Arg::Ref(id) => Value::String(id.as_key()),
                    Arg::Lit(lit) => lit.to_json(),
                });
            }
            Value::Array(elements)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraftArg;
    use crate::literal::Literal;
    use serde_json::json;

    #[test]
    fn literal_graft_wire_form() {
        let g = Graft::literal(1i64);
        let wire = to_wire(&g);
        let root_key = wire[RETURNS_KEY].as_str().unwrap().to_string();
        assert_eq!(wire[&root_key], json!(1));
    }

    #[test]
    fn list_literal_body_is_quoted() {
        let g = Graft::literal(Literal::from(vec!["Int.cast".to_string(), "0".to_string()]));
        let wire = to_wire(&g);
        let root_key = wire[RETURNS_KEY].as_str().unwrap().to_string();
        let body = wire[&root_key].as_object().unwrap();

        // Unquoted, this body would read as an `Int.cast` application on
        // node "0".
        assert_eq!(body.len(), 1);
        assert_eq!(body[QUOTE_KEY], json!(["Int.cast", "0"]));
    }

    #[test]
    fn map_literal_body_is_quoted() {
        let mut entries = indexmap::IndexMap::new();
        entries.insert("parameter".to_string(), Literal::Str("x".into()));
        let lit = Graft::literal(Literal::Map(entries));
        let lit_wire = to_wire(&lit);
        let lit_body = &lit_wire[&lit.root().as_key()];

        // Unquoted, this body would read as a reference to a parameter
        // named "x".
        let keyref = Graft::keyref("x", "Str").unwrap();
        let keyref_wire = to_wire(&keyref);
        assert_ne!(lit_body, &keyref_wire[&keyref.root().as_key()]);
        assert_eq!(lit_body[QUOTE_KEY], json!({"parameter": "x"}));
    }

    #[test]
    fn keyref_wire_form_is_single_entry_marker() {
        let g = Graft::keyref("scale", "Float").unwrap();
        let wire = to_wire(&g);
        let root_key = wire[RETURNS_KEY].as_str().unwrap().to_string();
        let body = wire[&root_key].as_object().unwrap();
        assert_eq!(body.len(), 1);
        assert_eq!(body[PARAMETER_KEY], json!("scale"));
        // The declared type never reaches the wire.
        assert!(body.get("ty").is_none());
    }

    #[test]
    fn apply_wire_form() {
        let a = Graft::literal(1i64);
        let b = Graft::literal(2.5f64);
        let g = Graft::apply("Int.__add__", vec![GraftArg::Node(&a), GraftArg::Node(&b)]).unwrap();
        let wire = to_wire(&g);

        let root_key = wire[RETURNS_KEY].as_str().unwrap().to_string();
        let body = wire[&root_key].as_array().unwrap();
        assert_eq!(body[0], json!("Int.__add__"));

        // Both arguments are node-ID references, resolving by table lookup.
        let lhs = body[1].as_str().unwrap();
        let rhs = body[2].as_str().unwrap();
        assert_eq!(wire[lhs], json!(1));
        assert_eq!(wire[rhs], json!(2.5));
    }

    #[test]
    fn inline_literal_argument_stays_inline() {
        let a = Graft::literal(1i64);
        let g = Graft::apply(
            "List[Int].__getitem__",
            vec![GraftArg::Node(&a), GraftArg::Lit(Literal::Int(3))],
        )
        .unwrap();
        let wire = to_wire(&g);
        let root_key = wire[RETURNS_KEY].as_str().unwrap().to_string();
        let body = wire[&root_key].as_array().unwrap();
        assert_eq!(body[2], json!(3));
    }

    #[test]
    fn string_literal_argument_becomes_a_node() {
        let a = Graft::literal(1i64);
        let g = Graft::apply(
            "Dict[Str, Int].__getitem__",
            vec![GraftArg::Node(&a), GraftArg::Lit(Literal::Str("k".into()))],
        )
        .unwrap();
        let wire = to_wire(&g);
        let root_key = wire[RETURNS_KEY].as_str().unwrap().to_string();
        let body = wire[&root_key].as_array().unwrap();

        // The argument is a reference whose node holds the string literal.
        let arg_key = body[2].as_str().unwrap();
        assert_eq!(wire[arg_key], json!("k"));
    }

    #[test]
    fn serialization_is_deterministic() {
        let a = Graft::literal(1i64);
        let b = Graft::literal(2.5f64);
        let g = Graft::apply("Int.__add__", vec![GraftArg::Node(&a), GraftArg::Node(&b)]).unwrap();
        assert_eq!(to_wire_string(&g), to_wire_string(&g));

        // Structurally identical grafts built independently also agree.
        let a2 = Graft::literal(1i64);
        let b2 = Graft::literal(2.5f64);
        let g2 =
            Graft::apply("Int.__add__", vec![GraftArg::Node(&a2), GraftArg::Node(&b2)]).unwrap();
        assert_eq!(to_wire_string(&g), to_wire_string(&g2));
    }

    #[test]
    fn returns_points_at_root() {
        let g = Graft::literal(true);
        let wire = to_wire(&g);
        assert_eq!(wire[RETURNS_KEY], json!(g.root().as_key()));
    }
}
