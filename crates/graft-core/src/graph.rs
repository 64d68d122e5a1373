//! Graft: the computation-graph container.
//!
//! A [`Graft`] maps node IDs to [`NodeDef`]s and designates one root node --
//! the node whose value the graft computes. Grafts are acyclic by
//! construction: nodes are stored in dependency order (a node only ever
//! references nodes inserted before it) and are never mutated after
//! insertion.
//!
//! Construction is transactional. Every constructor builds a fresh `Graft`
//! and either returns it whole or fails without touching its inputs; callers
//! never observe a partially-built graph. Combining values therefore means
//! building a new graft that imports the argument grafts' nodes (with ID
//! remapping), not mutating a shared one -- callers share built grafts behind
//! `Arc` and treat them as immutable.

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::error::CoreError;
use crate::id::NodeId;
use crate::literal::Literal;
use crate::node::{Arg, NodeDef};

/// An argument to [`Graft::apply`]: a subgraft (contributing its root node)
/// or an inline literal.
#[derive(Debug, Clone)]
pub enum GraftArg<'a> {
    Node(&'a Graft),
    Lit(Literal),
}

/// A serializable computation graph: nodes keyed by ID, plus one root.
#[derive(Debug, Clone, PartialEq)]
pub struct Graft {
    nodes: IndexMap<NodeId, NodeDef>,
    root: NodeId,
    next_id: u64,
}

impl Graft {
    /// Returns `true` if `name` cannot be used as a parameter name.
    ///
    /// Purely numeric names are indistinguishable from node-ID keys in the
    /// wire encoding, and `"returns"` is the reserved root pointer.
    pub fn is_name_reserved(name: &str) -> bool {
        name.is_empty() || name == "returns" || name.bytes().all(|b| b.is_ascii_digit())
    }

    /// Creates a graft computing a single literal value.
    pub fn literal(value: impl Into<Literal>) -> Graft {
        let mut graft = Graft::empty();
        let id = graft.insert(NodeDef::Literal(value.into()));
        graft.root = id;
        graft
    }

    /// Creates a graft referencing the named parameter `name`, declared with
    /// proxy type name `ty`.
    pub fn keyref(name: &str, ty: &str) -> Result<Graft, CoreError> {
        if Self::is_name_reserved(name) {
            return Err(CoreError::ReservedName {
                name: name.to_string(),
            });
        }
        let mut graft = Graft::empty();
        let id = graft.insert(NodeDef::KeyRef {
            name: name.to_string(),
            ty: ty.to_string(),
        });
        graft.root = id;
        Ok(graft)
    }

    /// Creates a graft applying `op` to `args`, importing argument subgrafts.
    ///
    /// String literals in argument position are hoisted into their own
    /// literal nodes: in the wire encoding a bare string argument always
    /// denotes a node-ID reference, so an inline string literal would be
    /// ambiguous.
    pub fn apply(op: &str, args: Vec<GraftArg<'_>>) -> Result<Graft, CoreError> {
        let mut graft = Graft::empty();
        let mut arg_defs = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                GraftArg::Node(sub) => {
                    let root = graft.import(sub)?;
                    arg_defs.push(Arg::Ref(root));
                }
                GraftArg::Lit(lit @ Literal::Str(_)) => {
                    let id = graft.insert(NodeDef::Literal(lit));
                    arg_defs.push(Arg::Ref(id));
                }
                GraftArg::Lit(lit) => arg_defs.push(Arg::Lit(lit)),
            }
        }
        let id = graft.insert(NodeDef::apply(op, arg_defs));
        graft.root = id;
        Ok(graft)
    }

    /// The root node's ID.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The root node's definition.
    pub fn root_node(&self) -> &NodeDef {
        &self.nodes[&self.root]
    }

    /// Looks up a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&NodeDef> {
        self.nodes.get(&id)
    }

    /// Number of nodes in the graft.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graft has no nodes. Grafts built through the
    /// public constructors always have at least one.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates nodes in dependency (insertion) order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeDef)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    // -----------------------------------------------------------------------
    // Internal construction helpers
    // -----------------------------------------------------------------------

    fn empty() -> Graft {
        Graft {
            nodes: IndexMap::new(),
            root: NodeId(0),
            next_id: 0,
        }
    }

    fn insert(&mut self, node: NodeDef) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    /// Finds an existing KeyRef node by parameter name.
    fn keyref_by_name(&self, name: &str) -> Option<(NodeId, &str)> {
        self.nodes.iter().find_map(|(id, node)| match node {
            NodeDef::KeyRef { name: n, ty } if n == name => Some((*id, ty.as_str())),
            _ => None,
        })
    }

    /// Imports all of `sub`'s nodes into `self` with fresh IDs, returning the
    /// remapped ID of `sub`'s root.
    ///
    /// KeyRef nodes are unified by name: importing a parameter this graft
    /// already contains reuses the existing node when the declared types
    /// agree, and fails with [`CoreError::ParameterCollision`] when they do
    /// not.
    fn import(&mut self, sub: &Graft) -> Result<NodeId, CoreError> {
        let mut remap: HashMap<NodeId, NodeId> = HashMap::with_capacity(sub.len());
        for (old_id, node) in sub.nodes() {
            let new_id = match node {
                NodeDef::KeyRef { name, ty } => match self.keyref_by_name(name) {
                    Some((existing_id, existing_ty)) if existing_ty == ty => existing_id,
                    Some((_, existing_ty)) => {
                        return Err(CoreError::ParameterCollision {
                            name: name.clone(),
                            existing: existing_ty.to_string(),
                            declared: ty.clone(),
                        })
                    }
                    None => self.insert(node.clone()),
                },
                NodeDef::Literal(_) => self.insert(node.clone()),
                NodeDef::Apply { op, args } => {
                    // Nodes are stored in dependency order, so every
                    // referenced ID has already been remapped.
                    let remapped: Vec<Arg> = args
                        .iter()
                        .map(|arg| match arg {
                            Arg::Ref(id) => Arg::Ref(remap[id]),
                            Arg::Lit(lit) => Arg::Lit(lit.clone()),
                        })
                        .collect();
                    self.insert(NodeDef::apply(op.clone(), remapped))
                }
            };
            remap.insert(old_id, new_id);
        }
        Ok(remap[&sub.root])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Reserved names
    // -----------------------------------------------------------------------

    #[test]
    fn numeric_names_are_reserved() {
        assert!(Graft::is_name_reserved("3"));
        assert!(Graft::is_name_reserved("007"));
        assert!(Graft::is_name_reserved(""));
    }

    #[test]
    fn returns_is_reserved() {
        assert!(Graft::is_name_reserved("returns"));
    }

    #[test]
    fn ordinary_names_are_not_reserved() {
        assert!(!Graft::is_name_reserved("x"));
        assert!(!Graft::is_name_reserved("scale2"));
        assert!(!Graft::is_name_reserved("_token"));
    }

    #[test]
    fn keyref_rejects_reserved_names() {
        assert!(matches!(
            Graft::keyref("42", "Int"),
            Err(CoreError::ReservedName { .. })
        ));
        assert!(matches!(
            Graft::keyref("returns", "Int"),
            Err(CoreError::ReservedName { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn literal_graft_has_one_node() {
        let g = Graft::literal(1i64);
        assert_eq!(g.len(), 1);
        assert_eq!(g.root_node(), &NodeDef::Literal(Literal::Int(1)));
    }

    #[test]
    fn keyref_graft_has_one_node() {
        let g = Graft::keyref("scale", "Float").unwrap();
        assert_eq!(g.len(), 1);
        assert_eq!(
            g.root_node(),
            &NodeDef::KeyRef {
                name: "scale".into(),
                ty: "Float".into()
            }
        );
    }

    #[test]
    fn apply_merges_argument_grafts() {
        let a = Graft::literal(1i64);
        let b = Graft::literal(2.5f64);
        let g = Graft::apply("Int.__add__", vec![GraftArg::Node(&a), GraftArg::Node(&b)]).unwrap();

        // literal 1, literal 2.5, and the application
        assert_eq!(g.len(), 3);
        match g.root_node() {
            NodeDef::Apply { op, args } => {
                assert_eq!(op, "Int.__add__");
                assert_eq!(args.len(), 2);
                // Arguments reference the two imported literals in order.
                let refs = g.root_node().references();
                assert_eq!(
                    g.get(refs[0]),
                    Some(&NodeDef::Literal(Literal::Int(1)))
                );
                assert_eq!(
                    g.get(refs[1]),
                    Some(&NodeDef::Literal(Literal::Float(2.5)))
                );
            }
            other => panic!("expected Apply root, got {other:?}"),
        }
    }

    #[test]
    fn apply_keeps_inline_literals_inline() {
        let a = Graft::literal(1i64);
        let g = Graft::apply(
            "List[Int].__getitem__",
            vec![GraftArg::Node(&a), GraftArg::Lit(Literal::Int(0))],
        )
        .unwrap();
        // No node is created for the inline int literal.
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn apply_hoists_string_literals() {
        let a = Graft::literal(1i64);
        let g = Graft::apply(
            "Dict[Str, Int].__getitem__",
            vec![GraftArg::Node(&a), GraftArg::Lit(Literal::Str("k".into()))],
        )
        .unwrap();
        // The string literal gets its own node so it cannot be mistaken for
        // a node-ID reference on the wire.
        assert_eq!(g.len(), 3);
        let refs = g.root_node().references();
        assert_eq!(refs.len(), 2);
        assert_eq!(
            g.get(refs[1]),
            Some(&NodeDef::Literal(Literal::Str("k".into())))
        );
    }

    #[test]
    fn arguments_do_not_mutate_inputs() {
        let a = Graft::literal(1i64);
        let b = Graft::literal(2i64);
        let before_a = a.clone();
        let before_b = b.clone();
        let _ = Graft::apply("Int.__add__", vec![GraftArg::Node(&a), GraftArg::Node(&b)]).unwrap();
        assert_eq!(a, before_a);
        assert_eq!(b, before_b);
    }

    // -----------------------------------------------------------------------
    // KeyRef unification
    // -----------------------------------------------------------------------

    #[test]
    fn same_parameter_unifies_on_merge() {
        let x = Graft::keyref("x", "Int").unwrap();
        let g = Graft::apply("Int.__add__", vec![GraftArg::Node(&x), GraftArg::Node(&x)]).unwrap();

        // One shared keyref node plus the application.
        assert_eq!(g.len(), 2);
        let refs = g.root_node().references();
        assert_eq!(refs[0], refs[1]);
    }

    #[test]
    fn conflicting_parameter_types_collide() {
        let x_int = Graft::keyref("x", "Int").unwrap();
        let x_float = Graft::keyref("x", "Float").unwrap();
        let err = Graft::apply(
            "Int.__add__",
            vec![GraftArg::Node(&x_int), GraftArg::Node(&x_float)],
        )
        .unwrap_err();
        match err {
            CoreError::ParameterCollision {
                name,
                existing,
                declared,
            } => {
                assert_eq!(name, "x");
                assert_eq!(existing, "Int");
                assert_eq!(declared, "Float");
            }
            other => panic!("expected ParameterCollision, got {other:?}"),
        }
    }

    #[test]
    fn nested_apply_preserves_structure() {
        let a = Graft::literal(1i64);
        let b = Graft::literal(2i64);
        let sum = Graft::apply("Int.__add__", vec![GraftArg::Node(&a), GraftArg::Node(&b)]).unwrap();
        let doubled =
            Graft::apply("Int.__mul__", vec![GraftArg::Node(&sum), GraftArg::Node(&a)]).unwrap();

        // 2 literals + add from `sum`, then literal 1 again + mul.
        assert_eq!(doubled.len(), 5);
        match doubled.root_node() {
            NodeDef::Apply { op, .. } => assert_eq!(op, "Int.__mul__"),
            other => panic!("expected Apply root, got {other:?}"),
        }

        // Every reference resolves within the graft (acyclicity by
        // dependency-ordered insertion).
        for (_, node) in doubled.nodes() {
            for r in node.references() {
                assert!(doubled.get(r).is_some());
            }
        }
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    use proptest::prelude::*;

    proptest! {
        // Import remaps every argument subgraft into the destination's own
        // ID sequence: one node per imported literal plus the application,
        // and every reference points at an earlier node.
        #[test]
        fn import_remaps_all_references(values in proptest::collection::vec(any::<i64>(), 1..6)) {
            let subs: Vec<Graft> = values.iter().map(|v| Graft::literal(*v)).collect();
            let args: Vec<GraftArg> = subs.iter().map(GraftArg::Node).collect();
            let g = Graft::apply("List[Int].construct", args).unwrap();

            prop_assert_eq!(g.len(), values.len() + 1);
            let order: Vec<NodeId> = g.nodes().map(|(id, _)| id).collect();
            for (pos, (_, node)) in g.nodes().enumerate() {
                for r in node.references() {
                    let target = order.iter().position(|id| *id == r).unwrap();
                    prop_assert!(target < pos);
                }
            }
        }

        // Unification holds for any non-reserved name, not just the ones the
        // unit tests spell out.
        #[test]
        fn same_name_parameters_unify_for_any_valid_name(name in "[a-z][a-z0-9_]{0,8}") {
            let x = Graft::keyref(&name, "Int").unwrap();
            let g = Graft::apply("Int.__add__", vec![GraftArg::Node(&x), GraftArg::Node(&x)]).unwrap();
            prop_assert_eq!(g.len(), 2);
        }
    }
}
