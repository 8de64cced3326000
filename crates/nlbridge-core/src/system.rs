//! In-memory target system.

use nlbridge_expr::{ComparisonSense, ConstraintExpr, ConstraintId, ExprRef, VariableId};
use nlbridge_solver::{Bounds, SystemBuilder};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone)]
pub struct VariableDecl {
    pub id: VariableId,
    pub name: String,
    pub bounds: Bounds,
}

/// Objective to be minimized.
#[derive(Debug, Clone)]
pub struct ObjectiveDecl {
    pub name: String,
    pub expr: ExprRef,
}

#[derive(Debug, Clone)]
pub struct ConstraintDecl {
    pub id: ConstraintId,
    pub name: String,
    pub constraint: ConstraintExpr,
}

/// Translated system held in memory.
#[derive(Debug, Clone, Default)]
pub struct System {
    variables: Vec<VariableDecl>,
    objective: Option<ObjectiveDecl>,
    constraints: Vec<ConstraintDecl>,
    variable_names: HashMap<String, VariableId>,
    constraint_names: HashMap<String, ConstraintId>,
}

impl System {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.objective.is_none() && self.constraints.is_empty()
    }

    pub fn variables(&self) -> &[VariableDecl] {
        &self.variables
    }

    pub fn constraints(&self) -> &[ConstraintDecl] {
        &self.constraints
    }

    pub fn objective(&self) -> Option<&ObjectiveDecl> {
        self.objective.as_ref()
    }

    pub fn get_variable(&self, id: VariableId) -> Option<&VariableDecl> {
        self.variables.get(id.index())
    }

    pub fn get_constraint(&self, id: ConstraintId) -> Option<&ConstraintDecl> {
        self.constraints.get(id.index())
    }

    /// First variable declared under `name`.
    pub fn variable_by_name(&self, name: &str) -> Option<&VariableDecl> {
        self.variable_names
            .get(name)
            .and_then(|id| self.get_variable(*id))
    }

    /// First constraint declared under `name`.
    pub fn constraint_by_name(&self, name: &str) -> Option<&ConstraintDecl> {
        self.constraint_names
            .get(name)
            .and_then(|id| self.get_constraint(*id))
    }

    /// Every expression root, objective first.
    pub fn roots(&self) -> impl Iterator<Item = &ExprRef> {
        self.objective
            .iter()
            .map(|objective| &objective.expr)
            .chain(self.constraints.iter().map(|c| c.constraint.expr()))
    }
}

impl SystemBuilder for System {
    fn declare_variable(&mut self, name: &str, bounds: Bounds) {
        let id = VariableId::new(self.variables.len() as u32);
        self.variable_names.entry(name.to_string()).or_insert(id);
        self.variables.push(VariableDecl {
            id,
            name: name.to_string(),
            bounds,
        });
    }

    fn declare_objective(&mut self, expr: ExprRef, name: &str) {
        self.objective = Some(ObjectiveDecl {
            name: name.to_string(),
            expr,
        });
    }

    fn declare_constraint(&mut self, expr: ExprRef, sense: ComparisonSense, name: &str) {
        let id = ConstraintId::new(self.constraints.len() as u32);
        self.constraint_names.entry(name.to_string()).or_insert(id);
        self.constraints.push(ConstraintDecl {
            id,
            name: name.to_string(),
            constraint: ConstraintExpr::new(expr, sense),
        });
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.objective {
            Some(objective) => writeln!(f, "Min {}: {}", objective.name, objective.expr)?,
            None => writeln!(f, "Objective: (not set)")?,
        }
        writeln!(f)?;
        write!(f, "s.t.")?;
        if self.constraints.is_empty() {
            write!(f, "\n (none)")?;
        } else {
            let lines: Vec<(String, &'static str)> = self
                .constraints
                .iter()
                .map(|c| {
                    (
                        format!("{}: {}", c.name, c.constraint.expr()),
                        c.constraint.sense().symbol(),
                    )
                })
                .collect();
            let width = lines.iter().map(|(lhs, _)| lhs.len()).max().unwrap_or(0);
            for (lhs, op) in lines {
                write!(f, "\n {lhs:width$} {op:>2} 0")?;
            }
        }

        let bounds: Vec<String> = self
            .variables
            .iter()
            .filter_map(|v| format_bounds_line(&v.name, v.bounds))
            .collect();
        if !bounds.is_empty() {
            write!(f, "\n\nBounds:")?;
            for line in bounds {
                write!(f, "\n {line}")?;
            }
        }
        Ok(())
    }
}

fn format_bounds_line(label: &str, bounds: Bounds) -> Option<String> {
    match (bounds.has_finite_lower(), bounds.has_finite_upper()) {
        (false, false) => None,
        (true, true) => Some(format!("{} <= {label} <= {}", bounds.lower, bounds.upper)),
        (true, false) => Some(format!("{} <= {label}", bounds.lower)),
        (false, true) => Some(format!("{label} <= {}", bounds.upper)),
    }
}
