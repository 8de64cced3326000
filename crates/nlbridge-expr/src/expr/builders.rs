//! Builder functions for constructing expression nodes.
//!
//! Every function allocates exactly one new node and shares its operands.
//! None of them simplify: canonicalization happens where the source graph
//! is read, so the shape built here is the shape requested.

use crate::expr::core::{BinaryOp, Expr, ExprRef, UnaryOp};
use crate::ids::VariableId;
use std::rc::Rc;

pub fn constant(value: f64) -> ExprRef {
    Rc::new(Expr::Constant(value))
}

pub fn variable(id: VariableId, name: impl Into<String>) -> ExprRef {
    Rc::new(Expr::Variable {
        id,
        name: name.into(),
    })
}

/// Apply a unary operation.
pub fn apply(op: UnaryOp, arg: ExprRef) -> ExprRef {
    Rc::new(Expr::Unary { op, arg })
}

/// Combine two operands with a binary operation.
pub fn combine(op: BinaryOp, lhs: ExprRef, rhs: ExprRef) -> ExprRef {
    Rc::new(Expr::Binary { op, lhs, rhs })
}

pub fn sum(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
    combine(BinaryOp::Add, lhs, rhs)
}

pub fn difference(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
    combine(BinaryOp::Sub, lhs, rhs)
}

pub fn product(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
    combine(BinaryOp::Mul, lhs, rhs)
}

pub fn quotient(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
    combine(BinaryOp::Div, lhs, rhs)
}

pub fn negation(arg: ExprRef) -> ExprRef {
    apply(UnaryOp::Neg, arg)
}

/// `coefficient * term`, with the coefficient as a constant left operand.
pub fn scaled(coefficient: f64, term: ExprRef) -> ExprRef {
    product(constant(coefficient), term)
}

/// General power `base^exponent`.
pub fn power(base: ExprRef, exponent: ExprRef) -> ExprRef {
    combine(BinaryOp::Pow, base, exponent)
}

pub fn int_power(base: ExprRef, exponent: i32) -> ExprRef {
    apply(UnaryOp::IntPow(exponent), base)
}

pub fn square(base: ExprRef) -> ExprRef {
    apply(UnaryOp::Sqr, base)
}

pub fn minimum(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
    combine(BinaryOp::Min, lhs, rhs)
}

pub fn maximum(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
    combine(BinaryOp::Max, lhs, rhs)
}

/// Base-10 logarithm expressed as `(1/ln 10) * ln(arg)`.
pub fn log10(arg: ExprRef) -> ExprRef {
    scaled(std::f64::consts::LOG10_E, apply(UnaryOp::Log, arg))
}
