//! Nonlinear expression DAG.
//!
//! - `core`       — Expr: constants, variables, unary and binary operations
//! - `builders`   — Constructor functions returning shared nodes
//! - `constraint` — ConstraintExpr: expression compared against zero
//! - `dag`        — Sharing statistics over expression DAGs
//! - `eval`       — Point evaluation
//! - `error`      — Expression errors

pub mod builders;
pub mod constraint;
pub mod core;
pub mod dag;
pub mod error;
mod eval;

pub use builders::*;
pub use constraint::{ComparisonSense, ConstraintExpr};
pub use core::{BinaryOp, Expr, ExprRef, UnaryOp};
pub use error::ExprError;
