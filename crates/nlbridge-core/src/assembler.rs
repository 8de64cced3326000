//! Row assembly: nonlinear body, linear terms, bound shape.

use crate::builder::ExpressionBuilder;
use crate::error::TranslateError;
use crate::graph::{LinearTerm, ModelGraph};
use crate::linear::shift;
use nlbridge_expr::expr::{constant, difference, negation};
use nlbridge_expr::{ComparisonSense, ExprRef};
use nlbridge_solver::Sense;

/// Relational shape of a constraint row's bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundShape {
    /// `lower == upper`, finite.
    Equality(f64),
    /// Only the lower bound is finite.
    AtLeast(f64),
    /// Only the upper bound is finite.
    AtMost(f64),
    /// Both finite and distinct; emitted as two rows.
    Range { lower: f64, upper: f64 },
}

impl BoundShape {
    /// `None` when neither bound is finite or either is NaN.
    #[allow(clippy::float_cmp)]
    pub fn classify(lower: f64, upper: f64) -> Option<Self> {
        if lower.is_nan() || upper.is_nan() {
            return None;
        }
        match (lower.is_finite(), upper.is_finite()) {
            (true, _) if lower == upper => Some(BoundShape::Equality(lower)),
            (true, false) => Some(BoundShape::AtLeast(lower)),
            (false, true) => Some(BoundShape::AtMost(upper)),
            (true, true) => Some(BoundShape::Range { lower, upper }),
            (false, false) => None,
        }
    }
}

/// One constraint ready to be declared: `expr sense 0`.
#[derive(Debug, Clone)]
pub struct AssembledConstraint {
    pub expr: ExprRef,
    pub sense: ComparisonSense,
    pub name: String,
}

/// Assembles objective and constraint rows of one graph.
pub struct ConstraintAssembler<'g> {
    graph: &'g ModelGraph,
    builder: ExpressionBuilder<'g>,
    row_terms: Vec<Vec<LinearTerm>>,
}

impl<'g> ConstraintAssembler<'g> {
    /// Validate the constraint linear encoding and take over `builder`.
    pub fn new(graph: &'g ModelGraph, builder: ExpressionBuilder<'g>) -> Result<Self, TranslateError> {
        let num_rows = graph.constraints.len();
        graph
            .constraint_linear
            .validate(num_rows, graph.variable_count())?;
        let row_terms = graph.constraint_linear.row_terms(num_rows);
        Ok(Self {
            graph,
            builder,
            row_terms,
        })
    }

    pub fn builder(&self) -> &ExpressionBuilder<'g> {
        &self.builder
    }

    /// Body of objective `index`, negated when it is maximized.
    pub fn objective(&mut self, index: usize) -> Result<ExprRef, TranslateError> {
        let record = self
            .graph
            .objectives
            .get(index)
            .ok_or(TranslateError::ObjectiveOutOfRange {
                requested: index as u32 + 1,
                available: self.graph.objectives.len(),
            })?;
        let body = self.builder.build_root(record.root)?;
        let body = self.builder.fold_linear(body, &record.linear)?;

        tracing::debug!(
            component = "constraint_assembler",
            operation = "objective",
            status = "success",
            index,
            sense = ?record.sense,
            "Assembled objective"
        );
        Ok(match record.sense {
            Sense::Minimize => body,
            Sense::Maximize => negation(body),
        })
    }

    /// Declarations for constraint `row`: one, or two for a ranged row.
    pub fn constraint(&mut self, row: usize) -> Result<Vec<AssembledConstraint>, TranslateError> {
        let graph = self.graph;
        let record = graph
            .constraints
            .get(row)
            .ok_or(TranslateError::ConstraintOutOfRange {
                row,
                available: graph.constraints.len(),
            })?;
        let name = graph.constraint_name(row).into_owned();
        let shape = BoundShape::classify(record.lower_bound(), record.upper_bound()).ok_or_else(
            || TranslateError::MalformedConstraintBounds {
                row,
                name: name.clone(),
                lower: record.lower_bound(),
                upper: record.upper_bound(),
            },
        )?;

        let body = self.builder.build_root(record.root)?;
        let terms = self.row_terms.get(row).map(Vec::as_slice).unwrap_or(&[]);
        let body = self.builder.fold_linear(body, terms)?;

        let assembled = match shape {
            BoundShape::Equality(bound) => vec![AssembledConstraint {
                expr: shift(body, bound),
                sense: ComparisonSense::Equal,
                name,
            }],
            BoundShape::AtLeast(bound) => vec![AssembledConstraint {
                expr: shift(body, bound),
                sense: ComparisonSense::GreaterEqual,
                name,
            }],
            BoundShape::AtMost(bound) => vec![AssembledConstraint {
                expr: shift(body, bound),
                sense: ComparisonSense::LessEqual,
                name,
            }],
            BoundShape::Range { lower, upper } => vec![
                AssembledConstraint {
                    expr: difference(body.clone(), constant(upper)),
                    sense: ComparisonSense::LessEqual,
                    name: format!("{name}_1"),
                },
                AssembledConstraint {
                    expr: difference(body, constant(lower)),
                    sense: ComparisonSense::GreaterEqual,
                    name: format!("{name}_2"),
                },
            ],
        };

        tracing::debug!(
            component = "constraint_assembler",
            operation = "constraint",
            status = "success",
            row,
            linear_terms = terms.len(),
            emitted = assembled.len(),
            "Assembled constraint"
        );
        Ok(assembled)
    }
}
