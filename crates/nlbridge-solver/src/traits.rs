//! Target-system builder trait.

use crate::types::Bounds;
use nlbridge_expr::{ComparisonSense, ExprRef};

/// Sink for the declarations of a translated model.
///
/// Each element is declared exactly once, in source row order: all
/// variables, then the objective (if any), then the constraints. The
/// objective is always to be minimized. A constraint reads
/// `expr <sense> 0`.
pub trait SystemBuilder {
    fn declare_variable(&mut self, name: &str, bounds: Bounds);

    fn declare_objective(&mut self, expr: ExprRef, name: &str);

    fn declare_constraint(&mut self, expr: ExprRef, sense: ComparisonSense, name: &str);
}
