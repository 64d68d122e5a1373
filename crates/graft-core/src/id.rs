//! Stable ID newtype for graft nodes.
//!
//! Node IDs are graft-local: each [`Graft`](crate::graph::Graft) allocates
//! its own sequence starting from zero, and importing a subgraph remaps the
//! imported IDs into the destination's sequence. In the wire format a node ID
//! appears as its decimal string, which is why parameter names are forbidden
//! from being purely numeric -- the two would be indistinguishable.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable node identifier within a single graft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Renders the ID the way the wire format keys nodes.
    pub fn as_key(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
