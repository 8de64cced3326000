//! In-memory model graph as produced by a model reader.
//!
//! Nodes live in a flat arena and reference each other by [`NodeId`]. A
//! variable operand with an index at or past the plain variable count is a
//! reference to defined variable `index - variable_count`, so all plain
//! variables should be added before defined-variable references are taken.

mod json;

use crate::error::TranslateError;
use crate::opcode;
use nlbridge_solver::{Bounds, NlOptions, Sense};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Index of a node in [`ModelGraph::nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub fn inner(self) -> u32 {
        self.0
    }

    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Operands carried by a graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operands {
    Literal(f64),
    /// Plain variable index, or defined variable offset by the variable count.
    Variable(usize),
    Unary(NodeId),
    Binary(NodeId, NodeId),
    List(Vec<NodeId>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub opcode: u32,
    pub operands: Operands,
}

/// One `coefficient * variable` term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTerm {
    pub coefficient: f64,
    pub variable: usize,
}

impl LinearTerm {
    pub fn new(coefficient: f64, variable: usize) -> Self {
        Self {
            coefficient,
            variable,
        }
    }
}

/// Named common subexpression: a nonlinear part plus linear terms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinedVariable {
    /// Nonlinear part; `None` is the constant zero.
    #[serde(default)]
    pub root: Option<NodeId>,
    #[serde(default)]
    pub linear: Vec<LinearTerm>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `None` is unbounded below.
    #[serde(default)]
    pub lower: Option<f64>,
    /// `None` is unbounded above.
    #[serde(default)]
    pub upper: Option<f64>,
}

impl VariableRecord {
    pub fn new(lower: Option<f64>, upper: Option<f64>) -> Self {
        Self {
            name: None,
            lower,
            upper,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveRecord {
    #[serde(default)]
    pub sense: Sense,
    #[serde(default)]
    pub root: Option<NodeId>,
    #[serde(default)]
    pub linear: Vec<LinearTerm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ObjectiveRecord {
    pub fn new(sense: Sense, root: Option<NodeId>) -> Self {
        Self {
            sense,
            root,
            linear: Vec::new(),
            name: None,
        }
    }

    pub fn with_linear(mut self, linear: Vec<LinearTerm>) -> Self {
        self.linear = linear;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRecord {
    #[serde(default)]
    pub root: Option<NodeId>,
    /// `None` is `-inf`.
    #[serde(default)]
    pub lower: Option<f64>,
    /// `None` is `+inf`.
    #[serde(default)]
    pub upper: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ConstraintRecord {
    pub fn new(root: Option<NodeId>, lower: Option<f64>, upper: Option<f64>) -> Self {
        Self {
            root,
            lower,
            upper,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower.unwrap_or(f64::NEG_INFINITY)
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper.unwrap_or(f64::INFINITY)
    }
}

/// Linear part of the constraint rows, in one of two encodings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintLinear {
    /// Sparse column-major matrix over (constraint row, variable column).
    ColumnMajor {
        col_starts: Vec<usize>,
        row_indices: Vec<usize>,
        values: Vec<f64>,
    },
    /// One term list per constraint row; missing trailing rows are empty.
    RowLists(Vec<Vec<LinearTerm>>),
}

impl Default for ConstraintLinear {
    fn default() -> Self {
        ConstraintLinear::RowLists(Vec::new())
    }
}

impl ConstraintLinear {
    /// Check the encoding against the model dimensions.
    pub fn validate(&self, num_rows: usize, num_variables: usize) -> Result<(), TranslateError> {
        match self {
            ConstraintLinear::ColumnMajor {
                col_starts,
                row_indices,
                values,
            } => {
                if col_starts.len() != num_variables + 1 {
                    return Err(invalid("col_starts length must be variable count + 1"));
                }
                if row_indices.len() != values.len() {
                    return Err(invalid("row_indices and values must be the same length"));
                }
                if col_starts.first().copied().unwrap_or(0) != 0 {
                    return Err(invalid("col_starts must start at 0"));
                }
                if col_starts.last().copied().unwrap_or(0) != values.len() {
                    return Err(invalid("col_starts last entry must equal values length"));
                }
                if col_starts.windows(2).any(|pair| pair[0] > pair[1]) {
                    return Err(invalid("col_starts must be non-decreasing"));
                }
                if let Some(row) = row_indices.iter().find(|&&row| row >= num_rows) {
                    return Err(TranslateError::InvalidLinearData {
                        reason: format!("row index {row} out of range ({num_rows} rows)"),
                    });
                }
                Ok(())
            }
            ConstraintLinear::RowLists(lists) => {
                if lists.len() > num_rows {
                    return Err(TranslateError::InvalidLinearData {
                        reason: format!(
                            "{} row lists for {} constraint rows",
                            lists.len(),
                            num_rows
                        ),
                    });
                }
                Ok(())
            }
        }
    }

    /// Per-row term lists in encoding order: by column then by entry for
    /// the column-major form, list order otherwise.
    ///
    /// Call [`ConstraintLinear::validate`] first.
    pub fn row_terms(&self, num_rows: usize) -> Vec<Vec<LinearTerm>> {
        let mut rows = vec![Vec::new(); num_rows];
        match self {
            ConstraintLinear::ColumnMajor {
                col_starts,
                row_indices,
                values,
            } => {
                for (column, span) in col_starts.windows(2).enumerate() {
                    for entry in span[0]..span[1] {
                        if let Some(terms) = rows.get_mut(row_indices[entry]) {
                            terms.push(LinearTerm::new(values[entry], column));
                        }
                    }
                }
            }
            ConstraintLinear::RowLists(lists) => {
                for (terms, list) in rows.iter_mut().zip(lists) {
                    terms.extend_from_slice(list);
                }
            }
        }
        rows
    }
}

fn invalid(reason: &str) -> TranslateError {
    TranslateError::InvalidLinearData {
        reason: reason.to_string(),
    }
}

/// Complete model as handed over by a reader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelGraph {
    #[serde(default)]
    pub variables: Vec<VariableRecord>,
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub defined_variables: Vec<DefinedVariable>,
    #[serde(default)]
    pub objectives: Vec<ObjectiveRecord>,
    #[serde(default)]
    pub constraints: Vec<ConstraintRecord>,
    #[serde(default)]
    pub constraint_linear: ConstraintLinear,
    #[serde(default, skip_serializing_if = "NlOptions::is_empty")]
    pub options: NlOptions,
}

impl ModelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: NlOptions) -> Self {
        self.options = options;
        self
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Add a plain variable and return its index.
    pub fn add_variable(&mut self, record: VariableRecord) -> usize {
        self.variables.push(record);
        self.variables.len() - 1
    }

    pub fn add_node(&mut self, opcode: u32, operands: Operands) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(GraphNode { opcode, operands });
        id
    }

    /// Numeric literal node.
    pub fn number(&mut self, value: f64) -> NodeId {
        self.add_node(opcode::NUM, Operands::Literal(value))
    }

    /// Reference to plain variable `index`.
    pub fn variable(&mut self, index: usize) -> NodeId {
        self.add_node(opcode::VARVAL, Operands::Variable(index))
    }

    pub fn unary(&mut self, opcode: u32, arg: NodeId) -> NodeId {
        self.add_node(opcode, Operands::Unary(arg))
    }

    pub fn binary(&mut self, opcode: u32, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.add_node(opcode, Operands::Binary(lhs, rhs))
    }

    pub fn list(&mut self, opcode: u32, items: Vec<NodeId>) -> NodeId {
        self.add_node(opcode, Operands::List(items))
    }

    /// Add a defined variable and return its defined index.
    pub fn add_defined_variable(&mut self, root: Option<NodeId>, linear: Vec<LinearTerm>) -> usize {
        self.defined_variables.push(DefinedVariable { root, linear });
        self.defined_variables.len() - 1
    }

    /// Reference to defined variable `defined_index`.
    pub fn defined_reference(&mut self, defined_index: usize) -> NodeId {
        let index = self.variable_count() + defined_index;
        self.add_node(opcode::VARVAL, Operands::Variable(index))
    }

    pub fn add_objective(&mut self, record: ObjectiveRecord) -> usize {
        self.objectives.push(record);
        self.objectives.len() - 1
    }

    pub fn add_constraint(&mut self, record: ConstraintRecord) -> usize {
        self.constraints.push(record);
        self.constraints.len() - 1
    }

    /// Set the linear terms of one constraint row in the row-list encoding.
    pub fn set_row_linear(&mut self, row: usize, terms: Vec<LinearTerm>) -> Result<(), TranslateError> {
        match &mut self.constraint_linear {
            ConstraintLinear::RowLists(lists) => {
                if lists.len() <= row {
                    lists.resize(row + 1, Vec::new());
                }
                lists[row] = terms;
                Ok(())
            }
            ConstraintLinear::ColumnMajor { .. } => Err(invalid(
                "cannot set row terms on a column-major linear encoding",
            )),
        }
    }

    pub fn node(&self, id: NodeId) -> Result<&GraphNode, TranslateError> {
        self.nodes
            .get(id.index())
            .ok_or(TranslateError::InvalidNodeId(id))
    }

    pub fn defined_variable(&self, index: usize) -> Result<&DefinedVariable, TranslateError> {
        self.defined_variables
            .get(index)
            .ok_or(TranslateError::UnknownDefinedVariable { index })
    }

    pub fn variable_name(&self, index: usize) -> Cow<'_, str> {
        match self.variables.get(index).and_then(|v| v.name.as_deref()) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("_svar[{}]", index + 1)),
        }
    }

    pub fn variable_bounds(&self, index: usize) -> Bounds {
        self.variables
            .get(index)
            .map(|v| Bounds::from_options(v.lower, v.upper))
            .unwrap_or_default()
    }

    pub fn objective_name(&self, index: usize) -> Cow<'_, str> {
        match self.objectives.get(index).and_then(|o| o.name.as_deref()) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("_sobj[{}]", index + 1)),
        }
    }

    pub fn constraint_name(&self, index: usize) -> Cow<'_, str> {
        match self.constraints.get(index).and_then(|c| c.name.as_deref()) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("_scon[{}]", index + 1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names_are_one_based() {
        let mut graph = ModelGraph::new();
        graph.add_variable(VariableRecord::new(None, None));
        graph.add_variable(VariableRecord::new(None, None).with_name("y"));
        graph.add_objective(ObjectiveRecord::new(Sense::Minimize, None));
        graph.add_constraint(ConstraintRecord::new(None, Some(0.0), None));

        assert_eq!(graph.variable_name(0), "_svar[1]");
        assert_eq!(graph.variable_name(1), "y");
        assert_eq!(graph.objective_name(0), "_sobj[1]");
        assert_eq!(graph.constraint_name(0), "_scon[1]");
    }

    #[test]
    fn test_defined_reference_is_offset_by_variable_count() {
        let mut graph = ModelGraph::new();
        graph.add_variable(VariableRecord::new(None, None));
        graph.add_variable(VariableRecord::new(None, None));
        let d = graph.add_defined_variable(None, vec![LinearTerm::new(2.0, 0)]);
        let node = graph.defined_reference(d);
        assert_eq!(graph.node(node).unwrap().operands, Operands::Variable(2));
    }

    #[test]
    fn test_invalid_lookups() {
        let graph = ModelGraph::new();
        assert_eq!(
            graph.node(NodeId::new(3)),
            Err(TranslateError::InvalidNodeId(NodeId::new(3)))
        );
        assert_eq!(
            graph.defined_variable(0),
            Err(TranslateError::UnknownDefinedVariable { index: 0 })
        );
    }

    #[test]
    fn test_column_major_validation() {
        let good = ConstraintLinear::ColumnMajor {
            col_starts: vec![0, 1, 3],
            row_indices: vec![0, 0, 1],
            values: vec![1.0, 2.0, 3.0],
        };
        assert!(good.validate(2, 2).is_ok());
        assert!(good.validate(1, 2).is_err());
        assert!(good.validate(2, 3).is_err());

        let decreasing = ConstraintLinear::ColumnMajor {
            col_starts: vec![0, 2, 1, 2],
            row_indices: vec![0, 0],
            values: vec![1.0, 1.0],
        };
        let err = decreasing.validate(1, 3).unwrap_err();
        assert_eq!(err.code(), "LINEAR_INVALID_DATA");

        let bad_start = ConstraintLinear::ColumnMajor {
            col_starts: vec![1, 1],
            row_indices: vec![],
            values: vec![],
        };
        assert!(bad_start.validate(0, 1).is_err());
    }

    #[test]
    fn test_row_terms_follow_column_order() {
        let linear = ConstraintLinear::ColumnMajor {
            col_starts: vec![0, 2, 3],
            row_indices: vec![1, 0, 1],
            values: vec![4.0, 5.0, 6.0],
        };
        let rows = linear.row_terms(2);
        assert_eq!(rows[0], vec![LinearTerm::new(5.0, 0)]);
        assert_eq!(rows[1], vec![LinearTerm::new(4.0, 0), LinearTerm::new(6.0, 1)]);
    }

    #[test]
    fn test_row_lists_pad_missing_rows() {
        let mut graph = ModelGraph::new();
        graph.set_row_linear(1, vec![LinearTerm::new(1.0, 0)]).unwrap();
        let rows = graph.constraint_linear.row_terms(3);
        assert!(rows[0].is_empty());
        assert_eq!(rows[1].len(), 1);
        assert!(rows[2].is_empty());
        assert!(graph.constraint_linear.validate(1, 1).is_err());
    }
}
