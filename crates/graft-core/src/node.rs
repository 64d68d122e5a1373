//! Node definitions for the graft.
//!
//! A graft node is one of three things: an embedded [`Literal`], a named
//! parameter reference ([`NodeDef::KeyRef`]), or the application of a named
//! operation to arguments ([`NodeDef::Apply`]). The graft itself is a dumb
//! container -- argument arity and kind checking is the dispatch layer's job.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::id::NodeId;
use crate::literal::Literal;

/// An argument to an [`NodeDef::Apply`] node: either a reference to another
/// node in the same graft, or an inline literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Arg {
    Ref(NodeId),
    Lit(Literal),
}

/// One node in a graft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeDef {
    /// An embedded literal value.
    Literal(Literal),

    /// A named parameter reference, bound to a concrete value by the
    /// execution backend at evaluation time.
    ///
    /// `ty` is the declared proxy type name. It is carried in-core only --
    /// never serialized -- so that merging two grafts can distinguish the
    /// same parameter reused from two parameters that merely share a name.
    KeyRef { name: String, ty: String },

    /// Application of `op` to `args`, in declared order.
    Apply {
        op: String,
        args: SmallVec<[Arg; 4]>,
    },
}

impl NodeDef {
    /// Creates an application node.
    pub fn apply(op: impl Into<String>, args: impl IntoIterator<Item = Arg>) -> Self {
        NodeDef::Apply {
            op: op.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Returns `true` if this node is a parameter reference.
    pub fn is_keyref(&self) -> bool {
        matches!(self, NodeDef::KeyRef { .. })
    }

    /// The node IDs this node's arguments reference, in argument order.
    pub fn references(&self) -> Vec<NodeId> {
        match self {
            NodeDef::Apply { args, .. } => args
                .iter()
                .filter_map(|arg| match arg {
                    Arg::Ref(id) => Some(*id),
                    Arg::Lit(_) => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}
