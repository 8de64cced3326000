//! One-pass model translation.

use crate::assembler::{AssembledConstraint, ConstraintAssembler};
use crate::builder::{DEFAULT_MAX_DEPTH, ExpressionBuilder};
use crate::error::TranslateError;
use crate::graph::ModelGraph;
use crate::system::System;
use nlbridge_expr::{ExprRef, dag};
use nlbridge_solver::{Bounds, NlOptions, OptimizerSettings, SystemBuilder};
use std::borrow::Cow;
use std::path::Path;
use std::time::Instant;

/// Per-translation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslateConfig {
    /// 1-based objective selector; 0 translates no objective.
    pub objective_number: u32,
    /// Deepest expression nesting accepted.
    pub max_depth: usize,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            objective_number: 1,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl TranslateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(options: &NlOptions) -> Self {
        Self::default().with_objective_number(options.objective_number())
    }

    pub fn with_objective_number(mut self, number: u32) -> Self {
        self.objective_number = number;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Result of [`ModelTranslator::translate`].
#[derive(Debug, Clone)]
pub struct Translation {
    pub system: System,
    pub settings: OptimizerSettings,
}

enum Declaration<'g> {
    Variable { name: Cow<'g, str>, bounds: Bounds },
    Objective { expr: ExprRef, name: Cow<'g, str> },
    Constraint(AssembledConstraint),
}

/// Drives variable, objective and constraint translation for one graph.
///
/// Every declaration is staged before any reaches the target builder, so
/// a failing row leaves the builder untouched.
#[derive(Debug, Clone, Default)]
pub struct ModelTranslator {
    config: TranslateConfig,
}

impl ModelTranslator {
    pub fn new(config: TranslateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TranslateConfig {
        &self.config
    }

    /// Translate into a fresh in-memory system.
    pub fn translate(&self, graph: &ModelGraph) -> Result<Translation, TranslateError> {
        let mut system = System::new();
        self.translate_into(graph, &mut system)?;
        Ok(Translation {
            system,
            settings: graph.options.resolve(),
        })
    }

    /// Load a JSON model graph and translate it with its embedded options.
    pub fn translate_file(&self, path: impl AsRef<Path>) -> Result<Translation, TranslateError> {
        let graph = ModelGraph::from_json_path(path).map_err(log_translate_error)?;
        let translator = ModelTranslator::new(
            self.config
                .with_objective_number(graph.options.objective_number()),
        );
        translator.translate(&graph)
    }

    /// Translate into an external builder.
    pub fn translate_into<B: SystemBuilder + ?Sized>(
        &self,
        graph: &ModelGraph,
        target: &mut B,
    ) -> Result<(), TranslateError> {
        let started = Instant::now();
        let (staged, definitions) = self.stage(graph).map_err(log_translate_error)?;

        let mut roots: Vec<ExprRef> = Vec::new();
        let mut variables = 0usize;
        let mut constraints = 0usize;
        let mut has_objective = false;
        for declaration in staged {
            match declaration {
                Declaration::Variable { name, bounds } => {
                    target.declare_variable(&name, bounds);
                    variables += 1;
                }
                Declaration::Objective { expr, name } => {
                    roots.push(expr.clone());
                    target.declare_objective(expr, &name);
                    has_objective = true;
                }
                Declaration::Constraint(constraint) => {
                    roots.push(constraint.expr.clone());
                    target.declare_constraint(constraint.expr, constraint.sense, &constraint.name);
                    constraints += 1;
                }
            }
        }

        let tree_nodes = roots
            .iter()
            .fold(0u64, |acc, root| acc.saturating_add(dag::tree_size(root)));
        tracing::info!(
            component = "translator",
            operation = "translate",
            status = "success",
            num_variables = variables,
            num_constraints = constraints,
            has_objective,
            defined_variables = definitions,
            dag_nodes = dag::distinct_nodes(&roots),
            tree_nodes,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Translated model"
        );
        Ok(())
    }

    fn stage<'g>(
        &self,
        graph: &'g ModelGraph,
    ) -> Result<(Vec<Declaration<'g>>, usize), TranslateError> {
        let objective = self.select_objective(graph)?;
        let builder = ExpressionBuilder::new(graph).with_max_depth(self.config.max_depth);
        let mut assembler = ConstraintAssembler::new(graph, builder)?;

        let mut staged = Vec::with_capacity(graph.variable_count() + graph.constraints.len() + 1);
        for index in 0..graph.variable_count() {
            staged.push(Declaration::Variable {
                name: graph.variable_name(index),
                bounds: graph.variable_bounds(index),
            });
        }
        if let Some(index) = objective {
            staged.push(Declaration::Objective {
                expr: assembler.objective(index)?,
                name: graph.objective_name(index),
            });
        }
        for row in 0..graph.constraints.len() {
            staged.extend(
                assembler
                    .constraint(row)?
                    .into_iter()
                    .map(Declaration::Constraint),
            );
        }
        Ok((staged, assembler.builder().built_definitions()))
    }

    /// Zero-based objective row to translate, if any.
    fn select_objective(&self, graph: &ModelGraph) -> Result<Option<usize>, TranslateError> {
        let requested = self.config.objective_number;
        let available = graph.objectives.len();
        if requested == 0 || available == 0 {
            return Ok(None);
        }
        let index = requested as usize - 1;
        if index >= available {
            return Err(TranslateError::ObjectiveOutOfRange {
                requested,
                available,
            });
        }
        Ok(Some(index))
    }
}

fn log_translate_error(err: TranslateError) -> TranslateError {
    tracing::error!(
        component = "translator",
        operation = "translate",
        status = "error",
        code = err.code(),
        "{err}"
    );
    err
}
