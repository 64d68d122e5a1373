pub mod dispatch;
pub mod error;
pub mod identifier;
pub mod promote;
pub mod proxify;
pub mod proxy;
pub mod rules;
pub mod value;

// Re-export commonly used types
pub use dispatch::{BinaryOp, UnaryOp};
pub use error::TypeError;
pub use identifier::{identifier, parameter};
pub use promote::{cast, promote, Operand};
pub use proxify::proxify;
pub use proxy::ProxyType;
pub use rules::{apply_reduction, ShapeKey, TypeRuleTable, TypeThunk};
pub use value::ProxyValue;
