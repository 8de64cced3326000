//! Point evaluation over f64.

use crate::expr::core::{BinaryOp, Expr, UnaryOp};
use crate::expr::error::ExprError;
use std::collections::HashMap;

impl Expr {
    /// Evaluate at `point`, where `point[i]` is the value of variable `i`.
    ///
    /// Shared nodes are evaluated once per call.
    pub fn eval(&self, point: &[f64]) -> Result<f64, ExprError> {
        let mut memo: HashMap<*const Expr, f64> = HashMap::new();
        let mut stack: Vec<(&Expr, bool)> = vec![(self, false)];
        let mut value = 0.0;
        while let Some((node, expanded)) = stack.pop() {
            let key = node as *const Expr;
            if let Some(known) = memo.get(&key) {
                value = *known;
                continue;
            }
            let children = node.children();
            if !expanded && !children.is_empty() {
                stack.push((node, true));
                stack.extend(children.into_iter().rev().map(|child| (child.as_ref(), false)));
                continue;
            }
            let operand = |index: usize| {
                children
                    .get(index)
                    .and_then(|child| memo.get(&(child.as_ref() as *const Expr)))
                    .copied()
                    .unwrap_or(f64::NAN)
            };
            value = eval_node(node, point, operand)?;
            memo.insert(key, value);
        }
        Ok(value)
    }
}

/// Value of one node given the values of its already evaluated operands.
fn eval_node(
    expr: &Expr,
    point: &[f64],
    operand: impl Fn(usize) -> f64,
) -> Result<f64, ExprError> {
    let value = match expr {
        Expr::Constant(value) => *value,
        Expr::Variable { id, .. } => *point
            .get(id.index())
            .ok_or(ExprError::UnboundVariable(*id))?,
        Expr::Unary { op, .. } => {
            let x = operand(0);
            match op {
                UnaryOp::Neg => -x,
                UnaryOp::Sqr => x * x,
                UnaryOp::IntPow(n) => x.powi(*n),
                UnaryOp::Sqrt => x.sqrt(),
                UnaryOp::Exp => x.exp(),
                UnaryOp::Log => x.ln(),
                UnaryOp::Cos => x.cos(),
                UnaryOp::Sin => x.sin(),
                UnaryOp::Tan => x.tan(),
                UnaryOp::Cosh => x.cosh(),
                UnaryOp::Sinh => x.sinh(),
                UnaryOp::Tanh => x.tanh(),
                UnaryOp::Acos => x.acos(),
                UnaryOp::Asin => x.asin(),
                UnaryOp::Atan => x.atan(),
                UnaryOp::Acosh => x.acosh(),
                UnaryOp::Asinh => x.asinh(),
                UnaryOp::Atanh => x.atanh(),
                UnaryOp::Abs => x.abs(),
                UnaryOp::Floor => x.floor(),
                UnaryOp::Ceil => x.ceil(),
            }
        }
        Expr::Binary { op, .. } => {
            let a = operand(0);
            let b = operand(1);
            match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                BinaryOp::Pow => a.powf(b),
                BinaryOp::Atan2 => a.atan2(b),
                BinaryOp::Min => a.min(b),
                BinaryOp::Max => a.max(b),
            }
        }
    };
    Ok(value)
}
