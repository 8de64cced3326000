pub mod expr;
pub mod ids;

pub use expr::{
    BinaryOp, ComparisonSense, ConstraintExpr, Expr, ExprError, ExprRef, UnaryOp, dag,
};
pub use ids::{ConstraintId, VariableId};
