//! Error types for the proxy-type layer.
//!
//! All variants are synchronous, non-retryable construction-time errors.
//! The two promotion failures are deliberately distinct:
//! [`TypeError::ExplicitCastRequired`] tells the user a conversion exists but
//! must be invoked explicitly, while [`TypeError::CannotPromote`] means no
//! conversion exists at all. Tests assert on that distinction.

use graft_core::CoreError;
use thiserror::Error;

/// Errors produced by promotion, dispatch, parameter creation, and shape
/// resolution.
#[derive(Debug, Error)]
pub enum TypeError {
    /// No conversion from the given value to the target type exists.
    #[error("cannot promote {value} to {target}: no such conversion exists")]
    CannotPromote { value: String, target: String },

    /// A conversion exists between the two proxy types, but it is never
    /// implicit. The message names the cast the user must invoke.
    #[error(
        "cannot implicitly promote {from} to {to}: \
         you need to convert it explicitly, like `cast(x, {to})`"
    )]
    ExplicitCastRequired { from: String, to: String },

    /// A generic (unparameterized) container type was used where a concrete
    /// type is required.
    #[error("{ty} is generic; a concrete type (like List[Int], not plain List) is required")]
    GenericType { ty: String },

    /// An operator was applied to an operand no acceptable type matches, and
    /// no reflected handler accepted it either.
    #[error("unsupported operand for {op} on {receiver}: {operand}")]
    UnsupportedOperator {
        op: String,
        receiver: String,
        operand: String,
    },

    /// An axis/shape argument is not a recognized key of the rule table.
    #[error("unrecognized shape {shape} for {owner}")]
    UnknownShape { shape: String, owner: String },

    /// A tuple was indexed out of range at construction time.
    #[error("tuple index {index} out of range for {ty}")]
    IndexOutOfRange { index: i64, ty: String },

    /// Graft construction failed (reserved name, parameter collision).
    #[error(transparent)]
    Core(#[from] CoreError),
}
