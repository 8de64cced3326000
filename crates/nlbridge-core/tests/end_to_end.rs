use nlbridge_core::opcode;
use nlbridge_core::{
    ConstraintRecord, LinearTerm, ModelGraph, ModelTranslator, ObjectiveRecord, TranslateConfig,
    TranslateError, VariableRecord,
};
use nlbridge_expr::{ComparisonSense, ExprRef, dag};
use nlbridge_solver::{Bounds, NlOptions, Sense, SimplifyLevel, SystemBuilder};
use std::rc::Rc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
struct RecordingBuilder {
    calls: Vec<String>,
}

impl SystemBuilder for RecordingBuilder {
    fn declare_variable(&mut self, name: &str, bounds: Bounds) {
        self.calls
            .push(format!("var {name} [{}, {}]", bounds.lower, bounds.upper));
    }

    fn declare_objective(&mut self, expr: ExprRef, name: &str) {
        self.calls.push(format!("min {name}: {expr}"));
    }

    fn declare_constraint(&mut self, expr: ExprRef, sense: ComparisonSense, name: &str) {
        self.calls
            .push(format!("ctr {name}: {expr} {} 0", sense.symbol()));
    }
}

/// min x + y  s.t.  x <= 1, y >= -1
fn small_linear_model() -> ModelGraph {
    let mut graph = ModelGraph::new();
    graph.add_variable(VariableRecord::new(None, None).with_name("x"));
    graph.add_variable(VariableRecord::new(None, None).with_name("y"));
    graph.add_objective(
        ObjectiveRecord::new(Sense::Minimize, None)
            .with_linear(vec![LinearTerm::new(1.0, 0), LinearTerm::new(1.0, 1)]),
    );
    graph.add_constraint(ConstraintRecord::new(None, None, Some(1.0)).with_name("c1"));
    graph.add_constraint(ConstraintRecord::new(None, Some(-1.0), None).with_name("c2"));
    graph
        .set_row_linear(0, vec![LinearTerm::new(1.0, 0)])
        .expect("row lists");
    graph
        .set_row_linear(1, vec![LinearTerm::new(1.0, 1)])
        .expect("row lists");
    graph
}

#[test]
fn test_small_linear_model() {
    init_tracing();
    let graph = small_linear_model();
    let mut builder = RecordingBuilder::default();
    ModelTranslator::default()
        .translate_into(&graph, &mut builder)
        .expect("translation failed");

    assert_eq!(
        builder.calls,
        vec![
            "var x [-inf, inf]",
            "var y [-inf, inf]",
            "min _sobj[1]: (x+y)",
            "ctr c1: (x-1) <= 0",
            "ctr c2: (y+1) >= 0",
        ]
    );
}

#[test]
fn test_unsupported_last_row_emits_nothing() {
    init_tracing();
    let mut graph = small_linear_model();
    let x = graph.variable(0);
    let y = graph.variable(1);
    let condition = graph.binary(opcode::LT, x, y);
    let conditional = graph.list(opcode::IFNL, vec![condition, x, y]);
    graph.add_constraint(ConstraintRecord::new(Some(conditional), Some(0.0), None));

    let mut builder = RecordingBuilder::default();
    let err = ModelTranslator::default()
        .translate_into(&graph, &mut builder)
        .unwrap_err();
    assert_eq!(err.code(), "EXPR_UNSUPPORTED_OPERATOR");
    assert!(builder.calls.is_empty());
}

#[test]
fn test_shared_subexpression_across_rows() {
    init_tracing();
    let mut graph = ModelGraph::new();
    graph.add_variable(VariableRecord::new(Some(0.0), Some(10.0)).with_name("x"));
    let x = graph.variable(0);
    let root = graph.unary(opcode::SQRT, x);
    let d = graph.add_defined_variable(Some(root), Vec::new());
    for k in 0..4 {
        let reference = graph.defined_reference(d);
        graph.add_constraint(ConstraintRecord::new(
            Some(reference),
            None,
            Some(f64::from(k)),
        ));
    }

    let translation = ModelTranslator::default()
        .translate(&graph)
        .expect("translation failed");
    let system = &translation.system;
    assert_eq!(system.num_constraints(), 4);

    // Row 0 has a zero bound, so its body is the defined variable itself.
    let shared = system.constraints()[0].constraint.expr().clone();
    for decl in &system.constraints()[1..] {
        let nlbridge_expr::Expr::Binary { lhs, .. } = decl.constraint.expr().as_ref() else {
            panic!("expected shifted body");
        };
        assert!(Rc::ptr_eq(lhs, &shared));
    }

    let roots: Vec<ExprRef> = system.roots().cloned().collect();
    // x, sqrt(x), and one (body - k) plus constant per shifted row
    assert_eq!(dag::distinct_nodes(&roots), 2 + 3 * 2);
}

#[test]
fn test_long_linear_row_renders_evaluates_and_drops() {
    init_tracing();
    const TERMS: usize = 200_000;
    let mut graph = ModelGraph::new();
    let mut terms = Vec::with_capacity(TERMS);
    for i in 0..TERMS {
        graph.add_variable(VariableRecord::new(Some(0.0), Some(1.0)));
        terms.push(LinearTerm::new(2.0, i));
    }
    graph.add_constraint(ConstraintRecord::new(None, None, Some(1.0)).with_name("long"));
    graph.set_row_linear(0, terms).expect("row lists");

    let translation = ModelTranslator::default()
        .translate(&graph)
        .expect("translation failed");
    let row = &translation.system.constraints()[0];
    assert_eq!(row.name, "long");

    let rendered = row.constraint.to_string();
    assert!(rendered.ends_with("-1) <= 0"));
    assert_eq!(rendered.matches("2*_svar[").count(), TERMS);

    let point = vec![0.5; TERMS];
    let value = row.constraint.expr().eval(&point).expect("all variables bound");
    assert!((value - (TERMS as f64 - 1.0)).abs() < 1e-6);

    drop(translation);
    drop(graph);
}

#[test]
fn test_deep_rows_translate_up_to_the_default_limit() {
    init_tracing();
    let mut graph = ModelGraph::new();
    graph.add_variable(VariableRecord::new(None, None).with_name("x"));
    let chain = |graph: &mut ModelGraph, length: usize| {
        let mut node = graph.variable(0);
        for _ in 0..length {
            node = graph.unary(opcode::ABS, node);
        }
        node
    };
    let shallow = chain(&mut graph, 2000);
    let at_limit = chain(&mut graph, TranslateConfig::new().max_depth - 1);
    graph.add_constraint(ConstraintRecord::new(Some(shallow), None, Some(0.0)));
    graph.add_constraint(ConstraintRecord::new(Some(at_limit), None, Some(0.0)));

    let system = ModelTranslator::new(TranslateConfig::new())
        .translate(&graph)
        .expect("translation failed")
        .system;
    assert_eq!(system.num_constraints(), 2);
    assert_eq!(system.constraints()[1].constraint.expr().eval(&[-3.0]), Ok(3.0));

    let too_deep = graph.unary(opcode::ABS, at_limit);
    graph.add_constraint(ConstraintRecord::new(Some(too_deep), None, Some(0.0)));
    let err = ModelTranslator::new(TranslateConfig::new())
        .translate(&graph)
        .unwrap_err();
    assert_eq!(err.code(), "EXPR_NESTING_TOO_DEEP");
}

#[test]
fn test_translation_carries_resolved_settings() {
    let graph = small_linear_model().with_options(
        NlOptions::new()
            .with_timeout(60.0)
            .with_simpl_level(2)
            .with_abs_eps_f(-1.0),
    );
    let translation = ModelTranslator::new(TranslateConfig::from_options(&graph.options))
        .translate(&graph)
        .expect("translation failed");

    assert_eq!(translation.settings.timeout, Some(60.0));
    assert_eq!(translation.settings.simplify_level, SimplifyLevel::Advanced);
    assert!((translation.settings.abs_eps_f - 1e-7).abs() < f64::EPSILON);
}

#[test]
fn test_translate_file_round_trip() {
    init_tracing();
    let graph = small_linear_model().with_options(NlOptions::new().with_objective_number(0));
    let path = std::env::temp_dir().join(format!(
        "nlbridge-end-to-end-{}.json",
        std::process::id()
    ));
    std::fs::write(&path, graph.to_json_string().expect("serialize")).expect("write model");

    let translation = ModelTranslator::default()
        .translate_file(&path)
        .expect("translation failed");
    let _ = std::fs::remove_file(&path);

    assert!(translation.system.objective().is_none());
    assert_eq!(translation.settings.objective_number, 0);
    assert_eq!(
        translation.system.to_string(),
        "Objective: (not set)\n\ns.t.\n c1: (x-1) <= 0\n c2: (y+1) >= 0"
    );
}

#[test]
fn test_missing_file_is_unreadable() {
    let err = ModelTranslator::default()
        .translate_file("/definitely/not/here.json")
        .unwrap_err();
    assert!(matches!(err, TranslateError::FileUnreadable { .. }));
    assert!(err.to_string().starts_with("[MODEL_FILE_UNREADABLE]"));
}

#[test]
fn test_json_model_with_nonlinear_rows() {
    init_tracing();
    let graph = ModelGraph::from_json_str(
        r#"{
            "variables": [{"name": "x", "lower": 1.0, "upper": 2.0}, {"name": "y"}],
            "nodes": [
                {"opcode": 82, "operands": {"variable": 0}},
                {"opcode": 82, "operands": {"variable": 1}},
                {"opcode": 16, "operands": {"unary": 1}},
                {"opcode": 0, "operands": {"binary": [0, 2]}},
                {"opcode": 80, "operands": {"literal": 3.0}},
                {"opcode": 76, "operands": {"binary": [0, 4]}}
            ],
            "objectives": [{"sense": "maximize", "root": 3, "name": "gap"}],
            "constraints": [{"root": 5, "lower": 0.0, "upper": 8.0, "name": "cube"}],
            "constraint_linear": {"column_major": {
                "col_starts": [0, 0, 1],
                "row_indices": [0],
                "values": [-2.0]
            }}
        }"#,
    )
    .expect("valid model");

    let system = ModelTranslator::default()
        .translate(&graph)
        .expect("translation failed")
        .system;
    assert_eq!(
        system.objective().map(|o| o.expr.to_string()),
        Some("(-(x-y))".to_string())
    );
    let rendered: Vec<String> = system
        .constraints()
        .iter()
        .map(|c| format!("{}: {}", c.name, c.constraint))
        .collect();
    assert_eq!(
        rendered,
        vec![
            "cube_1: (((x^3)+(-2*y))-8) <= 0",
            "cube_2: (((x^3)+(-2*y))-0) >= 0",
        ]
    );
}
