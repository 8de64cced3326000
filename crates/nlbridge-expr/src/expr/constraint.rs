//! Constraint expressions: an expression compared against zero.

use crate::expr::core::ExprRef;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonSense {
    LessEqual,
    GreaterEqual,
    Equal,
}

impl ComparisonSense {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonSense::LessEqual => "le",
            ComparisonSense::GreaterEqual => "ge",
            ComparisonSense::Equal => "eq",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonSense::LessEqual => "<=",
            ComparisonSense::GreaterEqual => ">=",
            ComparisonSense::Equal => "=",
        }
    }
}

/// `expr <sense> 0`
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintExpr {
    expr: ExprRef,
    sense: ComparisonSense,
}

impl ConstraintExpr {
    pub fn new(expr: ExprRef, sense: ComparisonSense) -> Self {
        Self { expr, sense }
    }

    pub fn expr(&self) -> &ExprRef {
        &self.expr
    }

    pub fn sense(&self) -> ComparisonSense {
        self.sense
    }

    /// Whether the constraint holds at `point` within `tolerance`.
    pub fn is_satisfied(&self, point: &[f64], tolerance: f64) -> Option<bool> {
        let value = self.expr.eval(point).ok()?;
        Some(match self.sense {
            ComparisonSense::LessEqual => value <= tolerance,
            ComparisonSense::GreaterEqual => value >= -tolerance,
            ComparisonSense::Equal => value.abs() <= tolerance,
        })
    }

    pub fn into_parts(self) -> (ExprRef, ComparisonSense) {
        (self.expr, self.sense)
    }
}

impl fmt::Display for ConstraintExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} 0", self.expr, self.sense.symbol())
    }
}
