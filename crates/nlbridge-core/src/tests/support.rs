use crate::builder::ExpressionBuilder;
use crate::error::TranslateError;
use crate::graph::{ModelGraph, NodeId, VariableRecord};
use crate::system::System;
use crate::translator::{ModelTranslator, TranslateConfig};
use nlbridge_expr::ExprRef;

/// Graph with one unbounded variable per name.
pub(super) fn graph_with_variables(names: &[&str]) -> ModelGraph {
    let mut graph = ModelGraph::new();
    for name in names {
        graph.add_variable(VariableRecord::new(None, None).with_name(*name));
    }
    graph
}

pub(super) fn build(graph: &ModelGraph, node: NodeId) -> Result<ExprRef, TranslateError> {
    ExpressionBuilder::new(graph).build(node)
}

pub(super) fn translate(graph: &ModelGraph) -> Result<System, TranslateError> {
    ModelTranslator::new(TranslateConfig::from_options(&graph.options))
        .translate(graph)
        .map(|translation| translation.system)
}

pub(super) fn eval(expr: &ExprRef, point: &[f64]) -> f64 {
    expr.eval(point).unwrap()
}
