//! Operator dispatch: turning operator invocations into graft nodes.
//!
//! Each supported operator is declared, per receiver type, as an ordered list
//! of acceptable operand types plus a result policy. Dispatch is two-phase:
//!
//! 1. the left operand's handler runs; if the operator is undeclared for its
//!    type, or the right operand promotes to none of the acceptable types,
//!    the handler declines (`None`) instead of erroring;
//! 2. on a declined forward handler, the right operand's reflected handler
//!    gets the same chance with the sides swapped;
//! 3. if both decline, the caller sees [`TypeError::UnsupportedOperator`].
//!
//! Emitted applications are always order-normalized: arguments are
//! `[left, right]` and the operation name encodes the method on the promoted
//! *left* operand's type, regardless of which side's handler dispatched. The
//! result-type policies are symmetric for every operator both sides can
//! declare, so dispatch direction never changes the result type.

use graft_core::GraftArg;
use graft_core::Literal;

use crate::error::TypeError;
use crate::promote::{promote, Operand};
use crate::proxy::ProxyType;
use crate::value::ProxyValue;

/// Binary operators supported by dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    TrueDiv,
    FloorDiv,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Xor,
    Shl,
    Shr,
}

impl BinaryOp {
    /// The dunder-style method name encoded into operation names.
    pub fn method(&self) -> &'static str {
        match self {
            BinaryOp::Add => "__add__",
            BinaryOp::Sub => "__sub__",
            BinaryOp::Mul => "__mul__",
            BinaryOp::TrueDiv => "__truediv__",
            BinaryOp::FloorDiv => "__floordiv__",
            BinaryOp::Mod => "__mod__",
            BinaryOp::Pow => "__pow__",
            BinaryOp::Eq => "__eq__",
            BinaryOp::Ne => "__ne__",
            BinaryOp::Lt => "__lt__",
            BinaryOp::Le => "__le__",
            BinaryOp::Gt => "__gt__",
            BinaryOp::Ge => "__ge__",
            BinaryOp::And => "__and__",
            BinaryOp::Or => "__or__",
            BinaryOp::Xor => "__xor__",
            BinaryOp::Shl => "__lshift__",
            BinaryOp::Shr => "__rshift__",
        }
    }
}

/// Unary operators supported by dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Abs,
    Invert,
}

impl UnaryOp {
    pub fn method(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "__neg__",
            UnaryOp::Pos => "__pos__",
            UnaryOp::Abs => "__abs__",
            UnaryOp::Invert => "__invert__",
        }
    }
}

/// How an operator's result type is computed.
enum ResultPolicy {
    /// Always this type (comparisons -> Bool, true division -> Float).
    Fixed(ProxyType),
    /// The receiver's own type.
    Receiver,
    /// The wider of the two numeric operand kinds.
    Widest,
}

/// The acceptable operand types (tried in order) and result policy for `op`
/// on a `receiver`-typed value, or `None` if the operator is undeclared.
fn binary_rule(receiver: &ProxyType, op: BinaryOp) -> Option<(Vec<ProxyType>, ResultPolicy)> {
    use BinaryOp::*;
    use ProxyType::*;
    let numeric = || vec![Int, Float];
    match receiver {
        Int | Float => match op {
            Add | Sub | Mul | FloorDiv | Mod | Pow => Some((numeric(), ResultPolicy::Widest)),
            TrueDiv => Some((numeric(), ResultPolicy::Fixed(Float))),
            Eq | Ne | Lt | Le | Gt | Ge => Some((numeric(), ResultPolicy::Fixed(Bool))),
            And | Or | Xor | Shl | Shr if *receiver == Int => {
                Some((vec![Int], ResultPolicy::Receiver))
            }
            _ => None,
        },
        Bool => match op {
            And | Or | Xor => Some((vec![Bool], ResultPolicy::Receiver)),
            Eq | Ne => Some((vec![Bool], ResultPolicy::Fixed(Bool))),
            _ => None,
        },
        Str => match op {
            Add => Some((vec![Str], ResultPolicy::Receiver)),
            Eq | Ne | Lt | Le | Gt | Ge => Some((vec![Str], ResultPolicy::Fixed(Bool))),
            _ => None,
        },
        List(Some(_)) => match op {
            // Concatenation with a list of the same element type.
            Add => Some((vec![receiver.clone()], ResultPolicy::Receiver)),
            _ => None,
        },
        _ => None,
    }
}

/// Two-phase binary dispatch. See the module docs.
pub fn binary(
    lhs: impl Into<Operand>,
    op: BinaryOp,
    rhs: impl Into<Operand>,
) -> Result<ProxyValue, TypeError> {
    let lhs = lhs.into();
    let rhs = rhs.into();

    if let Operand::Proxy(receiver) = &lhs {
        if let Some(result) = forward(receiver, op, &rhs)? {
            return Ok(result);
        }
    }
    if let Operand::Proxy(receiver) = &rhs {
        if let Some(result) = reflected(receiver, op, &lhs)? {
            return Ok(result);
        }
    }
    Err(TypeError::UnsupportedOperator {
        op: op.method().to_string(),
        receiver: lhs.describe(),
        operand: rhs.describe(),
    })
}

/// Left-operand handler: `receiver op operand`.
fn forward(
    receiver: &ProxyValue,
    op: BinaryOp,
    operand: &Operand,
) -> Result<Option<ProxyValue>, TypeError> {
    let Some((accepted, policy)) = binary_rule(receiver.ty(), op) else {
        return Ok(None);
    };
    let Some(operand) = resolve_operand(operand, &accepted) else {
        return Ok(None);
    };
    let Some(result_ty) = result_type(&policy, receiver.ty(), operand.ty()) else {
        return Ok(None);
    };
    emit(result_ty, op, receiver, &operand).map(Some)
}

/// Right-operand (reflected) handler: the receiver sits on the *right*.
/// The emitted application is order-normalized back to `[left, right]`.
fn reflected(
    receiver: &ProxyValue,
    op: BinaryOp,
    left_operand: &Operand,
) -> Result<Option<ProxyValue>, TypeError> {
    let Some((accepted, policy)) = binary_rule(receiver.ty(), op) else {
        return Ok(None);
    };
    let Some(left) = resolve_operand(left_operand, &accepted) else {
        return Ok(None);
    };
    let Some(result_ty) = result_type(&policy, receiver.ty(), left.ty()) else {
        return Ok(None);
    };
    emit(result_ty, op, &left, receiver).map(Some)
}

/// Promotes `operand` against the acceptable types in declared order; the
/// first successful promotion wins. `None` means no acceptable type matched.
fn resolve_operand(operand: &Operand, accepted: &[ProxyType]) -> Option<ProxyValue> {
    accepted
        .iter()
        .find_map(|ty| promote(operand.clone(), ty).ok())
}

fn result_type(
    policy: &ResultPolicy,
    receiver: &ProxyType,
    operand: &ProxyType,
) -> Option<ProxyType> {
    match policy {
        ResultPolicy::Fixed(ty) => Some(ty.clone()),
        ResultPolicy::Receiver => Some(receiver.clone()),
        ResultPolicy::Widest => ProxyType::widest(receiver, operand),
    }
}

/// Builds the order-normalized application: op name from the left operand's
/// type, arguments `[left, right]`.
fn emit(
    result_ty: ProxyType,
    op: BinaryOp,
    left: &ProxyValue,
    right: &ProxyValue,
) -> Result<ProxyValue, TypeError> {
    ProxyValue::from_apply(
        result_ty,
        &format!("{}.{}", left.ty().name(), op.method()),
        vec![
            GraftArg::Node(left.graft().as_ref()),
            GraftArg::Node(right.graft().as_ref()),
        ],
    )
}

/// Unary dispatch. No operand to resolve; the result type is fixed per
/// receiver type.
pub fn unary(receiver: &ProxyValue, op: UnaryOp) -> Result<ProxyValue, TypeError> {
    let supported = match (receiver.ty(), op) {
        (ProxyType::Int, _) => true,
        (ProxyType::Float, _) => true,
        (ProxyType::Bool, UnaryOp::Invert) => true,
        _ => false,
    };
    if !supported {
        return Err(TypeError::UnsupportedOperator {
            op: op.method().to_string(),
            receiver: receiver.ty().name(),
            operand: "()".to_string(),
        });
    }
    ProxyValue::from_apply(
        receiver.ty().clone(),
        &format!("{}.{}", receiver.ty().name(), op.method()),
        vec![GraftArg::Node(receiver.graft().as_ref())],
    )
}

/// Indexing dispatch.
///
/// - `List[T]` by `Int` yields `T`; by `Slice` yields `List[T]` itself.
/// - `Dict[K, V]` by `K` yields `V`.
/// - `Tuple[..]` requires a construction-time-known native int index, since
///   the positional result type depends on its value.
pub fn getitem(receiver: &ProxyValue, index: Operand) -> Result<ProxyValue, TypeError> {
    let op_name = format!("{}.__getitem__", receiver.ty().name());
    match receiver.ty() {
        ProxyType::List(Some(elem)) => {
            if let Ok(i) = promote(index.clone(), &ProxyType::Int) {
                return emit_getitem(elem.as_ref().clone(), &op_name, receiver, &i);
            }
            if let Ok(s) = promote(index.clone(), &ProxyType::Slice) {
                return emit_getitem(receiver.ty().clone(), &op_name, receiver, &s);
            }
            Err(unsupported_index(receiver, &index))
        }
        ProxyType::Dict(Some(kv)) => match promote(index.clone(), &kv.0) {
            Ok(key) => emit_getitem(kv.1.clone(), &op_name, receiver, &key),
            Err(_) => Err(unsupported_index(receiver, &index)),
        },
        ProxyType::Tuple(Some(types)) => {
            let Operand::Native(Literal::Int(raw)) = index else {
                return Err(unsupported_index(receiver, &index));
            };
            let len = types.len() as i64;
            let position = if raw < 0 { raw + len } else { raw };
            if position < 0 || position >= len {
                return Err(TypeError::IndexOutOfRange {
                    index: raw,
                    ty: receiver.ty().name(),
                });
            }
            ProxyValue::from_apply(
                types[position as usize].clone(),
                &op_name,
                vec![
                    GraftArg::Node(receiver.graft().as_ref()),
                    GraftArg::Lit(Literal::Int(raw)),
                ],
            )
        }
        _ => Err(unsupported_index(receiver, &index)),
    }
}

fn emit_getitem(
    result_ty: ProxyType,
    op_name: &str,
    receiver: &ProxyValue,
    index: &ProxyValue,
) -> Result<ProxyValue, TypeError> {
    ProxyValue::from_apply(
        result_ty,
        op_name,
        vec![
            GraftArg::Node(receiver.graft().as_ref()),
            GraftArg::Node(index.graft().as_ref()),
        ],
    )
}

fn unsupported_index(receiver: &ProxyValue, index: &Operand) -> TypeError {
    TypeError::UnsupportedOperator {
        op: "__getitem__".to_string(),
        receiver: receiver.ty().name(),
        operand: index.describe(),
    }
}
