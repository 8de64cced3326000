//! Translation error types.

use crate::graph::NodeId;
use crate::opcode::OpTag;

/// Errors that abort a model translation.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslateError {
    /// Model source could not be read or parsed
    FileUnreadable { path: String, reason: String },
    /// Opcode absent from the table, or present but not translatable
    UnsupportedOperator { opcode: u32, tag: Option<OpTag> },
    /// Defined-variable reference past the end of the defined variables
    UnknownDefinedVariable { index: usize },
    /// Defined variable whose expression references itself
    CyclicDefinedVariable { index: usize },
    /// Constraint row with no finite bound, or a NaN bound
    MalformedConstraintBounds {
        row: usize,
        name: String,
        lower: f64,
        upper: f64,
    },
    /// Linear term referencing something other than a plain variable
    VariableOutOfRange { index: usize, count: usize },
    /// Node reference outside the node arena
    InvalidNodeId(NodeId),
    /// Node operands do not fit its opcode
    MalformedNode { node: NodeId, expected: &'static str },
    /// Invalid sparse linear data
    InvalidLinearData { reason: String },
    /// Objective selector larger than the number of objectives
    ObjectiveOutOfRange { requested: u32, available: usize },
    /// Constraint row index past the last row
    ConstraintOutOfRange { row: usize, available: usize },
    /// Expression nesting deeper than the configured limit
    NestingTooDeep { limit: usize },
}

impl TranslateError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            TranslateError::FileUnreadable { .. } => "MODEL_FILE_UNREADABLE",
            TranslateError::UnsupportedOperator { .. } => "EXPR_UNSUPPORTED_OPERATOR",
            TranslateError::UnknownDefinedVariable { .. } => "DEFINED_VARIABLE_UNKNOWN",
            TranslateError::CyclicDefinedVariable { .. } => "DEFINED_VARIABLE_CYCLIC",
            TranslateError::MalformedConstraintBounds { .. } => "CONSTRAINT_MALFORMED_BOUNDS",
            TranslateError::VariableOutOfRange { .. } => "VARIABLE_OUT_OF_RANGE",
            TranslateError::InvalidNodeId(_) => "NODE_INVALID_ID",
            TranslateError::MalformedNode { .. } => "NODE_MALFORMED",
            TranslateError::InvalidLinearData { .. } => "LINEAR_INVALID_DATA",
            TranslateError::ObjectiveOutOfRange { .. } => "OBJECTIVE_OUT_OF_RANGE",
            TranslateError::ConstraintOutOfRange { .. } => "CONSTRAINT_OUT_OF_RANGE",
            TranslateError::NestingTooDeep { .. } => "EXPR_NESTING_TOO_DEEP",
        }
    }
}

impl std::fmt::Display for TranslateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslateError::FileUnreadable { path, reason } => write!(
                f,
                "[{}] Cannot read model file '{}': {}",
                self.code(),
                path,
                reason
            ),
            TranslateError::UnsupportedOperator { opcode, tag } => match tag {
                Some(tag) => write!(
                    f,
                    "[{}] Operator '{}' (opcode {}) is not supported",
                    self.code(),
                    tag.as_str(),
                    opcode
                ),
                None => write!(f, "[{}] Unknown opcode {}", self.code(), opcode),
            },
            TranslateError::UnknownDefinedVariable { index } => write!(
                f,
                "[{}] Defined variable {} does not exist",
                self.code(),
                index
            ),
            TranslateError::CyclicDefinedVariable { index } => write!(
                f,
                "[{}] Defined variable {} depends on itself",
                self.code(),
                index
            ),
            TranslateError::MalformedConstraintBounds {
                row,
                name,
                lower,
                upper,
            } => write!(
                f,
                "[{}] Constraint {} ('{}') has unusable bounds [{}, {}]",
                self.code(),
                row,
                name,
                lower,
                upper
            ),
            TranslateError::VariableOutOfRange { index, count } => write!(
                f,
                "[{}] Variable index {} out of range (model has {} variables)",
                self.code(),
                index,
                count
            ),
            TranslateError::InvalidNodeId(node) => {
                write!(f, "[{}] Node {} does not exist", self.code(), node.inner())
            }
            TranslateError::MalformedNode { node, expected } => write!(
                f,
                "[{}] Node {} is malformed: expected {}",
                self.code(),
                node.inner(),
                expected
            ),
            TranslateError::InvalidLinearData { reason } => {
                write!(f, "[{}] Linear data invalid: {}", self.code(), reason)
            }
            TranslateError::ObjectiveOutOfRange {
                requested,
                available,
            } => write!(
                f,
                "[{}] Objective {} requested but model has {} objectives",
                self.code(),
                requested,
                available
            ),
            TranslateError::ConstraintOutOfRange { row, available } => write!(
                f,
                "[{}] Constraint row {} requested but model has {} rows",
                self.code(),
                row,
                available
            ),
            TranslateError::NestingTooDeep { limit } => write!(
                f,
                "[{}] Expression nesting exceeds {} levels",
                self.code(),
                limit
            ),
        }
    }
}

impl std::error::Error for TranslateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes_code() {
        let err = TranslateError::UnsupportedOperator {
            opcode: 35,
            tag: Some(OpTag::IfNl),
        };
        assert_eq!(
            err.to_string(),
            "[EXPR_UNSUPPORTED_OPERATOR] Operator 'if' (opcode 35) is not supported"
        );

        let err = TranslateError::UnsupportedOperator {
            opcode: 99,
            tag: None,
        };
        assert_eq!(err.to_string(), "[EXPR_UNSUPPORTED_OPERATOR] Unknown opcode 99");
    }

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            TranslateError::FileUnreadable {
                path: "m.json".to_string(),
                reason: "missing".to_string(),
            },
            TranslateError::UnsupportedOperator {
                opcode: 4,
                tag: None,
            },
            TranslateError::UnknownDefinedVariable { index: 0 },
            TranslateError::CyclicDefinedVariable { index: 0 },
            TranslateError::MalformedConstraintBounds {
                row: 0,
                name: "c".to_string(),
                lower: f64::NEG_INFINITY,
                upper: f64::INFINITY,
            },
            TranslateError::VariableOutOfRange { index: 3, count: 2 },
            TranslateError::InvalidNodeId(NodeId::new(7)),
            TranslateError::MalformedNode {
                node: NodeId::new(0),
                expected: "literal",
            },
            TranslateError::InvalidLinearData {
                reason: "x".to_string(),
            },
            TranslateError::ObjectiveOutOfRange {
                requested: 2,
                available: 1,
            },
            TranslateError::ConstraintOutOfRange {
                row: 5,
                available: 5,
            },
            TranslateError::NestingTooDeep { limit: 4 },
        ];
        let codes: std::collections::HashSet<_> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_bounds_message_names_row() {
        let err = TranslateError::MalformedConstraintBounds {
            row: 3,
            name: "cap".to_string(),
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
        };
        let text = err.to_string();
        assert!(text.starts_with("[CONSTRAINT_MALFORMED_BOUNDS]"));
        assert!(text.contains("'cap'"));
        assert!(text.contains("[-inf, inf]"));
    }
}
