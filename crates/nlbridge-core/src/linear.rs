//! Folding linear terms into an expression body.

use crate::error::TranslateError;
use crate::graph::LinearTerm;
use nlbridge_expr::ExprRef;
use nlbridge_expr::expr::{constant, difference, negation, scaled, sum};

/// Accumulates `body + sum(c_i * x_i)` term by term.
///
/// While the body is still the literal zero, the first term replaces it
/// instead of being added to it.
pub(crate) struct LinearFold<'a> {
    variables: &'a [ExprRef],
    body: ExprRef,
}

impl<'a> LinearFold<'a> {
    pub(crate) fn new(variables: &'a [ExprRef], body: ExprRef) -> Self {
        Self { variables, body }
    }

    #[allow(clippy::float_cmp)]
    pub(crate) fn push(&mut self, term: LinearTerm) -> Result<(), TranslateError> {
        if term.coefficient == 0.0 {
            return Ok(());
        }
        let x = self
            .variables
            .get(term.variable)
            .cloned()
            .ok_or(TranslateError::VariableOutOfRange {
                index: term.variable,
                count: self.variables.len(),
            })?;

        let body = self.body.clone();
        self.body = if body.is_zero_literal() {
            if term.coefficient == 1.0 {
                x
            } else if term.coefficient == -1.0 {
                negation(x)
            } else {
                scaled(term.coefficient, x)
            }
        } else if term.coefficient == 1.0 {
            sum(body, x)
        } else if term.coefficient == -1.0 {
            difference(body, x)
        } else {
            sum(body, scaled(term.coefficient, x))
        };
        Ok(())
    }

    pub(crate) fn extend(&mut self, terms: &[LinearTerm]) -> Result<(), TranslateError> {
        for &term in terms {
            self.push(term)?;
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> ExprRef {
        self.body
    }
}

/// Move a bound to the left-hand side: `body - bound`, never materializing
/// a zero shift and writing negative bounds as an addition.
pub(crate) fn shift(body: ExprRef, bound: f64) -> ExprRef {
    if bound == 0.0 {
        body
    } else if bound < 0.0 {
        sum(body, constant(-bound))
    } else {
        difference(body, constant(bound))
    }
}
