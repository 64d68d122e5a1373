pub mod error;
pub mod graph;
pub mod id;
pub mod literal;
pub mod node;
pub mod serialize;

// Re-export commonly used types
pub use error::CoreError;
pub use graph::{Graft, GraftArg};
pub use id::NodeId;
pub use literal::Literal;
pub use node::{Arg, NodeDef};
pub use serialize::{to_wire, to_wire_string};
