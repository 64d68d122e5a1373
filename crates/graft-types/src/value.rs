//! ProxyValue: a typed handle to a not-yet-evaluated expression.
//!
//! A [`ProxyValue`] binds a static [`ProxyType`] to the graft that computes
//! it. Values are immutable: the type is fixed at construction, before the
//! underlying value is known, and never changes. The graft is shared behind
//! an `Arc` -- combining two values builds a new graft importing both, it
//! never mutates either.
//!
//! Operator methods (`add`, `lt`, `getitem`, ...) delegate to the dispatch
//! layer and return `Result`, since unsupported operand types are ordinary
//! construction-time errors here.

use std::sync::Arc;

use graft_core::{Graft, GraftArg, Literal};

use crate::dispatch::{self, BinaryOp, UnaryOp};
use crate::error::TypeError;
use crate::promote::{self, Operand};
use crate::proxy::ProxyType;
use crate::rules::{self, ShapeKey, TypeRuleTable};

/// A typed, lazy proxy value backed by a graft node.
#[derive(Debug, Clone)]
pub struct ProxyValue {
    ty: ProxyType,
    graft: Arc<Graft>,
}

impl ProxyValue {
    /// Wraps a graft as a value of static type `ty`.
    ///
    /// Rejects generic types: a graph node needs a concrete type.
    pub fn from_graft(ty: ProxyType, graft: Graft) -> Result<ProxyValue, TypeError> {
        if ty.is_generic() {
            return Err(TypeError::GenericType { ty: ty.name() });
        }
        Ok(ProxyValue {
            ty,
            graft: Arc::new(graft),
        })
    }

    /// Wraps a literal as a value of static type `ty`.
    pub(crate) fn from_literal(ty: ProxyType, value: Literal) -> Result<ProxyValue, TypeError> {
        Self::from_graft(ty, Graft::literal(value))
    }

    /// Builds an application node over `args` and wraps it as `ty`.
    pub(crate) fn from_apply(
        ty: ProxyType,
        op: &str,
        args: Vec<GraftArg<'_>>,
    ) -> Result<ProxyValue, TypeError> {
        Self::from_graft(ty, Graft::apply(op, args)?)
    }

    /// Rebinds an existing value under a different static type, sharing the
    /// graft. Used for the supertype (`Any`) promotion path only.
    pub(crate) fn retyped(&self, ty: ProxyType) -> ProxyValue {
        ProxyValue {
            ty,
            graft: Arc::clone(&self.graft),
        }
    }

    /// The value's static type.
    pub fn ty(&self) -> &ProxyType {
        &self.ty
    }

    /// The graft computing this value. The value is the graft's root node.
    pub fn graft(&self) -> &Arc<Graft> {
        &self.graft
    }

    // -----------------------------------------------------------------------
    // Primitive constructors
    // -----------------------------------------------------------------------

    pub fn int(value: i64) -> ProxyValue {
        ProxyValue {
            ty: ProxyType::Int,
            graft: Arc::new(Graft::literal(value)),
        }
    }

    pub fn float(value: f64) -> ProxyValue {
        ProxyValue {
            ty: ProxyType::Float,
            graft: Arc::new(Graft::literal(value)),
        }
    }

    pub fn boolean(value: bool) -> ProxyValue {
        ProxyValue {
            ty: ProxyType::Bool,
            graft: Arc::new(Graft::literal(value)),
        }
    }

    pub fn string(value: impl Into<String>) -> ProxyValue {
        ProxyValue {
            ty: ProxyType::Str,
            graft: Arc::new(Graft::literal(value.into())),
        }
    }

    pub fn none() -> ProxyValue {
        ProxyValue {
            ty: ProxyType::NoneType,
            graft: Arc::new(Graft::literal(Literal::Null)),
        }
    }

    /// An index range for container slicing. `None` bounds mean "open".
    pub fn slice(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> ProxyValue {
        let graft = Graft::apply(
            "Slice.from_parts",
            vec![
                GraftArg::Lit(Literal::from(start)),
                GraftArg::Lit(Literal::from(stop)),
                GraftArg::Lit(Literal::from(step)),
            ],
        )
        .expect("slice graft has no subgrafts and cannot collide");
        ProxyValue {
            ty: ProxyType::Slice,
            graft: Arc::new(graft),
        }
    }

    // -----------------------------------------------------------------------
    // Operators (two-phase dispatch, see `dispatch`)
    // -----------------------------------------------------------------------

    pub fn add(&self, other: impl Into<Operand>) -> Result<ProxyValue, TypeError> {
        dispatch::binary(self.clone(), BinaryOp::Add, other)
    }

    pub fn sub(&self, other: impl Into<Operand>) -> Result<ProxyValue, TypeError> {
        dispatch::binary(self.clone(), BinaryOp::Sub, other)
    }

    pub fn mul(&self, other: impl Into<Operand>) -> Result<ProxyValue, TypeError> {
        dispatch::binary(self.clone(), BinaryOp::Mul, other)
    }

    /// True division. Always yields `Float` on numeric operands.
    pub fn div(&self, other: impl Into<Operand>) -> Result<ProxyValue, TypeError> {
        dispatch::binary(self.clone(), BinaryOp::TrueDiv, other)
    }

    pub fn floordiv(&self, other: impl Into<Operand>) -> Result<ProxyValue, TypeError> {
        dispatch::binary(self.clone(), BinaryOp::FloorDiv, other)
    }

    pub fn rem(&self, other: impl Into<Operand>) -> Result<ProxyValue, TypeError> {
        dispatch::binary(self.clone(), BinaryOp::Mod, other)
    }

    pub fn pow(&self, other: impl Into<Operand>) -> Result<ProxyValue, TypeError> {
        dispatch::binary(self.clone(), BinaryOp::Pow, other)
    }

    /// Proxy equality: records a comparison node, unlike `==` on the handle.
    pub fn eq_(&self, other: impl Into<Operand>) -> Result<ProxyValue, TypeError> {
        dispatch::binary(self.clone(), BinaryOp::Eq, other)
    }

    pub fn ne_(&self, other: impl Into<Operand>) -> Result<ProxyValue, TypeError> {
        dispatch::binary(self.clone(), BinaryOp::Ne, other)
    }

    pub fn lt(&self, other: impl Into<Operand>) -> Result<ProxyValue, TypeError> {
        dispatch::binary(self.clone(), BinaryOp::Lt, other)
    }

    pub fn le(&self, other: impl Into<Operand>) -> Result<ProxyValue, TypeError> {
        dispatch::binary(self.clone(), BinaryOp::Le, other)
    }

    pub fn gt(&self, other: impl Into<Operand>) -> Result<ProxyValue, TypeError> {
        dispatch::binary(self.clone(), BinaryOp::Gt, other)
    }

    pub fn ge(&self, other: impl Into<Operand>) -> Result<ProxyValue, TypeError> {
        dispatch::binary(self.clone(), BinaryOp::Ge, other)
    }

    pub fn bitand(&self, other: impl Into<Operand>) -> Result<ProxyValue, TypeError> {
        dispatch::binary(self.clone(), BinaryOp::And, other)
    }

    pub fn bitor(&self, other: impl Into<Operand>) -> Result<ProxyValue, TypeError> {
        dispatch::binary(self.clone(), BinaryOp::Or, other)
    }

    pub fn bitxor(&self, other: impl Into<Operand>) -> Result<ProxyValue, TypeError> {
        dispatch::binary(self.clone(), BinaryOp::Xor, other)
    }

    pub fn shl(&self, other: impl Into<Operand>) -> Result<ProxyValue, TypeError> {
        dispatch::binary(self.clone(), BinaryOp::Shl, other)
    }

    pub fn shr(&self, other: impl Into<Operand>) -> Result<ProxyValue, TypeError> {
        dispatch::binary(self.clone(), BinaryOp::Shr, other)
    }

    pub fn neg(&self) -> Result<ProxyValue, TypeError> {
        dispatch::unary(self, UnaryOp::Neg)
    }

    pub fn pos(&self) -> Result<ProxyValue, TypeError> {
        dispatch::unary(self, UnaryOp::Pos)
    }

    pub fn abs_(&self) -> Result<ProxyValue, TypeError> {
        dispatch::unary(self, UnaryOp::Abs)
    }

    pub fn invert(&self) -> Result<ProxyValue, TypeError> {
        dispatch::unary(self, UnaryOp::Invert)
    }

    /// Indexing. Accepts an `Int` (element), a `Slice` (same container), or
    /// the dict key type, depending on the receiver.
    pub fn getitem(&self, index: impl Into<Operand>) -> Result<ProxyValue, TypeError> {
        dispatch::getitem(self, index.into())
    }

    /// Explicit cast to `target`, recorded as a `"{Target}.cast"` node.
    pub fn cast(&self, target: &ProxyType) -> Result<ProxyValue, TypeError> {
        promote::cast(self, target)
    }

    /// An axis-dependent reduction whose result type comes from `table`.
    pub fn reduce(
        &self,
        method: &str,
        axis: impl Into<ShapeKey>,
        table: &TypeRuleTable,
    ) -> Result<ProxyValue, TypeError> {
        rules::apply_reduction(self, method, axis, table)
    }
}
