//! Core error types for graft construction.
//!
//! Uses `thiserror` for structured, matchable error variants. All failures
//! here are synchronous construction-time user errors; a failed construction
//! never leaves a partially-built graft behind.

use thiserror::Error;

/// Errors produced by the graft-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A parameter name that would be ambiguous in the wire encoding:
    /// purely numeric (indistinguishable from a node ID) or the reserved
    /// root key `"returns"`.
    #[error("reserved parameter name: '{name}' (names cannot be purely numeric or 'returns')")]
    ReservedName { name: String },

    /// Two independently-declared parameters with the same name but different
    /// declared types ended up in the same graft.
    #[error(
        "parameter '{name}' declared twice with conflicting types: {existing} and {declared}"
    )]
    ParameterCollision {
        name: String,
        existing: String,
        declared: String,
    },
}
