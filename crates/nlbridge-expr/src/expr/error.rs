//! Expression errors.

use crate::ids::VariableId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// Evaluation point has no value for this variable.
    UnboundVariable(VariableId),
}

impl ExprError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ExprError::UnboundVariable(_) => "EXPR_UNBOUND_VARIABLE",
        }
    }
}

impl std::fmt::Display for ExprError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprError::UnboundVariable(id) => {
                write!(f, "[{}] No value supplied for variable {}", self.code(), id)
            }
        }
    }
}

impl std::error::Error for ExprError {}
