//! Graph node to expression translation.

use crate::cache::SubexpressionCache;
use crate::error::TranslateError;
use crate::graph::{GraphNode, LinearTerm, ModelGraph, NodeId, Operands};
use crate::linear::LinearFold;
use crate::opcode::{self, OpTag, OpcodeTable};
use nlbridge_expr::expr::{apply, combine, constant, difference, log10, power, sum, variable};
use nlbridge_expr::{BinaryOp, ExprRef, UnaryOp, VariableId};

/// Default bound on expression nesting.
pub const DEFAULT_MAX_DEPTH: usize = 2048;

/// How an open node combines its built operands.
#[derive(Debug)]
enum Step {
    /// The node is its single operand.
    Forward,
    Unary(UnaryOp),
    Binary(BinaryOp),
    /// Left fold of a sum list; `true` marks an operand subtracted from the running sum.
    Sum(Vec<bool>),
    /// Pairwise left fold of a min or max list.
    Fold(BinaryOp),
    Log10,
    ConstExponent(f64),
    ConstBase(f64),
    /// Nonlinear part of a defined variable, linear terms still to fold.
    Defined(usize),
}

/// A node whose operands are being built.
#[derive(Debug)]
struct Frame {
    node: NodeId,
    step: Step,
    operands: Vec<NodeId>,
    built: Vec<ExprRef>,
}

impl Frame {
    fn new(node: NodeId, step: Step, operands: Vec<NodeId>) -> Self {
        let built = Vec::with_capacity(operands.len());
        Self {
            node,
            step,
            operands,
            built,
        }
    }

    fn next_operand(&self) -> Option<NodeId> {
        self.operands.get(self.built.len()).copied()
    }
}

enum Entered {
    Built(ExprRef),
    Open(Frame),
}

/// Builds expressions from one model graph.
///
/// Plain variables are allocated once up front and every reference to a
/// variable returns that same node. Defined variables are built at most
/// once per builder and shared by every row that references them.
///
/// Nodes are visited with an explicit frame stack, so nesting is limited by
/// `max_depth` rather than by the thread's stack.
pub struct ExpressionBuilder<'g> {
    graph: &'g ModelGraph,
    table: &'static OpcodeTable,
    variables: Vec<ExprRef>,
    cache: SubexpressionCache,
    max_depth: usize,
}

impl<'g> ExpressionBuilder<'g> {
    pub fn new(graph: &'g ModelGraph) -> Self {
        let variables = (0..graph.variable_count())
            .map(|index| variable(VariableId::new(index as u32), graph.variable_name(index)))
            .collect();
        Self {
            graph,
            table: OpcodeTable::shared(),
            variables,
            cache: SubexpressionCache::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The shared node of every plain variable, by index.
    pub fn variables(&self) -> &[ExprRef] {
        &self.variables
    }

    /// Number of defined variables built so far.
    pub fn built_definitions(&self) -> usize {
        self.cache.len()
    }

    /// Build a row root; an absent root is the constant zero.
    pub fn build_root(&mut self, root: Option<NodeId>) -> Result<ExprRef, TranslateError> {
        match root {
            Some(node) => self.build(node),
            None => Ok(constant(0.0)),
        }
    }

    /// Fold linear terms into `body` in the given order.
    pub fn fold_linear(
        &self,
        body: ExprRef,
        terms: &[LinearTerm],
    ) -> Result<ExprRef, TranslateError> {
        let mut fold = LinearFold::new(&self.variables, body);
        fold.extend(terms)?;
        Ok(fold.finish())
    }

    pub fn build(&mut self, root: NodeId) -> Result<ExprRef, TranslateError> {
        let result = self.walk(root);
        if result.is_err() {
            self.cache.abandon_in_flight();
        }
        result
    }

    /// Post-order walk from `root`. `ancestors` holds every open frame except
    /// the one in hand.
    fn walk(&mut self, root: NodeId) -> Result<ExprRef, TranslateError> {
        let mut ancestors: Vec<Frame> = Vec::new();
        let mut entered = self.enter(root, 0)?;
        loop {
            let frame = match entered {
                Entered::Open(frame) => frame,
                Entered::Built(expr) => match ancestors.pop() {
                    Some(mut parent) => {
                        parent.built.push(expr);
                        parent
                    }
                    None => return Ok(expr),
                },
            };
            entered = match frame.next_operand() {
                Some(operand) => {
                    let child = self.enter(operand, ancestors.len() + 1)?;
                    ancestors.push(frame);
                    child
                }
                None => Entered::Built(self.assemble(frame)?),
            };
        }
    }

    /// Visit a node `depth` levels below the root. Leaves and cached defined
    /// variables are built immediately; anything else opens a frame.
    fn enter(&mut self, id: NodeId, depth: usize) -> Result<Entered, TranslateError> {
        if depth >= self.max_depth {
            return Err(TranslateError::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        let graph = self.graph;
        let node = graph.node(id)?;
        let tag = self.table.translate(node.opcode)?;

        let (step, operands) = match tag {
            OpTag::Num => return Ok(Entered::Built(constant(literal(id, node)?))),
            OpTag::VarVal => match node.operands {
                Operands::Variable(index) => return self.variable_reference(id, index),
                _ => return Err(malformed(id, "variable index")),
            },

            OpTag::Plus => {
                let (a, b) = binary_operands(id, node)?;
                if let Some(b) = self.negated_child(b)? {
                    (Step::Binary(BinaryOp::Sub), vec![a, b])
                } else if let Some(a) = self.negated_child(a)? {
                    (Step::Binary(BinaryOp::Sub), vec![b, a])
                } else {
                    (Step::Binary(BinaryOp::Add), vec![b, a])
                }
            }
            OpTag::Minus => {
                let (a, b) = binary_operands(id, node)?;
                match self.negated_child(b)? {
                    Some(b) => (Step::Binary(BinaryOp::Add), vec![a, b]),
                    None => (Step::Binary(BinaryOp::Sub), vec![a, b]),
                }
            }
            OpTag::UMinus => {
                let a = unary_operand(id, node)?;
                match self.negated_child(a)? {
                    Some(inner) => (Step::Forward, vec![inner]),
                    None => (Step::Unary(UnaryOp::Neg), vec![a]),
                }
            }
            OpTag::Mult => {
                let (a, b) = binary_operands(id, node)?;
                (Step::Binary(BinaryOp::Mul), vec![a, b])
            }
            OpTag::Div => {
                let (a, b) = binary_operands(id, node)?;
                (Step::Binary(BinaryOp::Div), vec![a, b])
            }

            OpTag::SumList => {
                let (first, rest) = list_operands(id, node)?;
                let mut operands = Vec::with_capacity(rest.len() + 1);
                let mut negated = Vec::with_capacity(rest.len() + 1);
                operands.push(first);
                negated.push(false);
                for &item in rest {
                    match self.negated_child(item)? {
                        Some(inner) => {
                            operands.push(inner);
                            negated.push(true);
                        }
                        None => {
                            operands.push(item);
                            negated.push(false);
                        }
                    }
                }
                (Step::Sum(negated), operands)
            }
            OpTag::MinList | OpTag::MaxList => {
                let (first, rest) = list_operands(id, node)?;
                let op = if tag == OpTag::MinList {
                    BinaryOp::Min
                } else {
                    BinaryOp::Max
                };
                let operands = std::iter::once(first).chain(rest.iter().copied()).collect();
                (Step::Fold(op), operands)
            }

            OpTag::Pow => {
                let (a, b) = binary_operands(id, node)?;
                (Step::Binary(BinaryOp::Pow), vec![a, b])
            }
            OpTag::PowConstExponent => {
                let (a, b) = binary_operands(id, node)?;
                let exponent = literal(b, graph.node(b)?)
                    .map_err(|_| malformed(id, "literal exponent"))?;
                match exact_i32(exponent) {
                    Some(n) => (Step::Unary(UnaryOp::IntPow(n)), vec![a]),
                    None => (Step::ConstExponent(exponent), vec![a]),
                }
            }
            OpTag::Pow2 => (Step::Unary(UnaryOp::Sqr), vec![unary_operand(id, node)?]),
            OpTag::PowConstBase => {
                let (a, b) = binary_operands(id, node)?;
                let base =
                    literal(a, graph.node(a)?).map_err(|_| malformed(id, "literal base"))?;
                (Step::ConstBase(base), vec![b])
            }

            OpTag::Log10 => (Step::Log10, vec![unary_operand(id, node)?]),
            OpTag::Atan2 => {
                let (a, b) = binary_operands(id, node)?;
                (Step::Binary(BinaryOp::Atan2), vec![a, b])
            }

            _ => match unary_function(tag) {
                Some(op) => (Step::Unary(op), vec![unary_operand(id, node)?]),
                None => {
                    return Err(TranslateError::UnsupportedOperator {
                        opcode: node.opcode,
                        tag: Some(tag),
                    });
                }
            },
        };
        Ok(Entered::Open(Frame::new(id, step, operands)))
    }

    /// Combine the built operands of a completed frame.
    fn assemble(&mut self, frame: Frame) -> Result<ExprRef, TranslateError> {
        let Frame {
            node, step, built, ..
        } = frame;
        let expr = match (&step, built.as_slice()) {
            (Step::Forward, [a]) => a.clone(),
            (Step::Unary(op), [a]) => apply(*op, a.clone()),
            (Step::Binary(op), [a, b]) => combine(*op, a.clone(), b.clone()),
            (Step::Log10, [a]) => log10(a.clone()),
            (Step::ConstExponent(exponent), [a]) => power(a.clone(), constant(*exponent)),
            (Step::ConstBase(base), [b]) => power(constant(*base), b.clone()),
            (Step::Sum(negated), [first, rest @ ..]) => {
                rest.iter()
                    .zip(negated.iter().skip(1))
                    .fold(first.clone(), |acc, (item, &minus)| {
                        if minus {
                            difference(acc, item.clone())
                        } else {
                            sum(acc, item.clone())
                        }
                    })
            }
            (Step::Fold(op), [first, rest @ ..]) => rest
                .iter()
                .fold(first.clone(), |acc, item| combine(*op, acc, item.clone())),
            (Step::Defined(index), body) => {
                let index = *index;
                let body = body.first().cloned().unwrap_or_else(|| constant(0.0));
                return self.finish_defined(index, body);
            }
            _ => return Err(malformed(node, "operand list")),
        };
        Ok(expr)
    }

    fn variable_reference(
        &mut self,
        id: NodeId,
        index: usize,
    ) -> Result<Entered, TranslateError> {
        let count = self.variables.len();
        if index < count {
            return Ok(Entered::Built(self.variables[index].clone()));
        }

        let graph = self.graph;
        let defined = index - count;
        let definition = graph.defined_variable(defined)?;
        if let Some(expr) = self.cache.get(defined) {
            return Ok(Entered::Built(expr));
        }
        if !self.cache.register(defined) {
            return Err(TranslateError::CyclicDefinedVariable { index: defined });
        }
        let operands = definition.root.into_iter().collect();
        Ok(Entered::Open(Frame::new(id, Step::Defined(defined), operands)))
    }

    fn finish_defined(&mut self, index: usize, body: ExprRef) -> Result<ExprRef, TranslateError> {
        let graph = self.graph;
        let definition = graph.defined_variable(index)?;
        let expr = self.fold_linear(body, &definition.linear)?;
        self.cache.done(index, expr.clone());

        tracing::debug!(
            component = "expression_builder",
            operation = "defined_variable",
            status = "success",
            index,
            linear_terms = definition.linear.len(),
            "Built defined variable"
        );
        Ok(expr)
    }

    /// Operand of a negation node in the source graph.
    fn negated_child(&self, id: NodeId) -> Result<Option<NodeId>, TranslateError> {
        let node = self.graph.node(id)?;
        Ok(match node.operands {
            Operands::Unary(arg) if node.opcode == opcode::UMINUS => Some(arg),
            _ => None,
        })
    }
}

fn unary_function(tag: OpTag) -> Option<UnaryOp> {
    let op = match tag {
        OpTag::Sqrt => UnaryOp::Sqrt,
        OpTag::Exp => UnaryOp::Exp,
        OpTag::Log => UnaryOp::Log,
        OpTag::Cos => UnaryOp::Cos,
        OpTag::Sin => UnaryOp::Sin,
        OpTag::Tan => UnaryOp::Tan,
        OpTag::Cosh => UnaryOp::Cosh,
        OpTag::Sinh => UnaryOp::Sinh,
        OpTag::Tanh => UnaryOp::Tanh,
        OpTag::Acos => UnaryOp::Acos,
        OpTag::Asin => UnaryOp::Asin,
        OpTag::Atan => UnaryOp::Atan,
        OpTag::Acosh => UnaryOp::Acosh,
        OpTag::Asinh => UnaryOp::Asinh,
        OpTag::Atanh => UnaryOp::Atanh,
        OpTag::Floor => UnaryOp::Floor,
        OpTag::Ceil => UnaryOp::Ceil,
        OpTag::Abs => UnaryOp::Abs,
        _ => return None,
    };
    Some(op)
}

fn exact_i32(value: f64) -> Option<i32> {
    if value.fract() == 0.0 && value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX) {
        Some(value as i32)
    } else {
        None
    }
}

fn malformed(node: NodeId, expected: &'static str) -> TranslateError {
    TranslateError::MalformedNode { node, expected }
}

fn literal(id: NodeId, node: &GraphNode) -> Result<f64, TranslateError> {
    match node.operands {
        Operands::Literal(value) => Ok(value),
        _ => Err(malformed(id, "numeric literal")),
    }
}

fn unary_operand(id: NodeId, node: &GraphNode) -> Result<NodeId, TranslateError> {
    match node.operands {
        Operands::Unary(arg) => Ok(arg),
        _ => Err(malformed(id, "one operand")),
    }
}

fn binary_operands(id: NodeId, node: &GraphNode) -> Result<(NodeId, NodeId), TranslateError> {
    match node.operands {
        Operands::Binary(lhs, rhs) => Ok((lhs, rhs)),
        _ => Err(malformed(id, "two operands")),
    }
}

fn list_operands(id: NodeId, node: &GraphNode) -> Result<(NodeId, &[NodeId]), TranslateError> {
    match &node.operands {
        Operands::List(items) => match items.split_first() {
            Some((&first, rest)) => Ok((first, rest)),
            None => Err(malformed(id, "non-empty operand list")),
        },
        _ => Err(malformed(id, "operand list")),
    }
}
