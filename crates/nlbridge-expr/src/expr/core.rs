//! Core expression type: a DAG of shared operation nodes.
//!
//! Nodes are immutable and reference their children through [`ExprRef`]
//! (`Rc<Expr>`). A child may be referenced by several parents, which is how
//! common subexpressions stay shared instead of being copied into a tree.
//!
//! Equality (`==`) is structural. Use [`Rc::ptr_eq`] to test identity.
//!
//! Long linear rows produce chains nested one level per term, so dropping,
//! comparing and rendering all walk the DAG with an explicit work stack.

use crate::ids::VariableId;
use std::fmt;
use std::rc::Rc;

/// Shared handle to an expression node.
pub type ExprRef = Rc<Expr>;

/// Single-operand operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    /// `x^2`
    Sqr,
    /// `x^n` for an integer exponent.
    IntPow(i32),
    Sqrt,
    Exp,
    /// Natural logarithm.
    Log,
    Cos,
    Sin,
    Tan,
    Cosh,
    Sinh,
    Tanh,
    Acos,
    Asin,
    Atan,
    Acosh,
    Asinh,
    Atanh,
    Abs,
    Floor,
    Ceil,
}

impl UnaryOp {
    /// Function name used when rendering, `None` for operators printed inline.
    pub fn function_name(self) -> Option<&'static str> {
        match self {
            UnaryOp::Neg | UnaryOp::IntPow(_) => None,
            UnaryOp::Sqr => Some("sqr"),
            UnaryOp::Sqrt => Some("sqrt"),
            UnaryOp::Exp => Some("exp"),
            UnaryOp::Log => Some("log"),
            UnaryOp::Cos => Some("cos"),
            UnaryOp::Sin => Some("sin"),
            UnaryOp::Tan => Some("tan"),
            UnaryOp::Cosh => Some("cosh"),
            UnaryOp::Sinh => Some("sinh"),
            UnaryOp::Tanh => Some("tanh"),
            UnaryOp::Acos => Some("acos"),
            UnaryOp::Asin => Some("asin"),
            UnaryOp::Atan => Some("atan"),
            UnaryOp::Acosh => Some("acosh"),
            UnaryOp::Asinh => Some("asinh"),
            UnaryOp::Atanh => Some("atanh"),
            UnaryOp::Abs => Some("abs"),
            UnaryOp::Floor => Some("floor"),
            UnaryOp::Ceil => Some("ceil"),
        }
    }
}

/// Two-operand operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    /// `lhs^rhs` with an arbitrary exponent expression.
    Pow,
    /// `atan2(lhs, rhs)`
    Atan2,
    Min,
    Max,
}

impl BinaryOp {
    /// Infix symbol, `None` for operations rendered as function calls.
    pub fn infix_symbol(self) -> Option<char> {
        match self {
            BinaryOp::Add => Some('+'),
            BinaryOp::Sub => Some('-'),
            BinaryOp::Mul => Some('*'),
            BinaryOp::Div => Some('/'),
            BinaryOp::Pow => Some('^'),
            BinaryOp::Atan2 | BinaryOp::Min | BinaryOp::Max => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Pow => "pow",
            BinaryOp::Atan2 => "atan2",
            BinaryOp::Min => "min",
            BinaryOp::Max => "max",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Constant(f64),
    Variable { id: VariableId, name: String },
    Unary { op: UnaryOp, arg: ExprRef },
    Binary { op: BinaryOp, lhs: ExprRef, rhs: ExprRef },
}

impl Expr {
    // ── Queries ─────────────────────────────────────────────

    /// True only for the literal constant zero (either sign).
    pub fn is_zero_literal(&self) -> bool {
        matches!(self, Expr::Constant(value) if *value == 0.0)
    }

    pub fn constant_value(&self) -> Option<f64> {
        match self {
            Expr::Constant(value) => Some(*value),
            _ => None,
        }
    }

    pub fn variable_id(&self) -> Option<VariableId> {
        match self {
            Expr::Variable { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Operand of a negation node.
    pub fn negated_operand(&self) -> Option<&ExprRef> {
        match self {
            Expr::Unary {
                op: UnaryOp::Neg,
                arg,
            } => Some(arg),
            _ => None,
        }
    }

    /// Direct children in operand order.
    pub fn children(&self) -> Vec<&ExprRef> {
        match self {
            Expr::Constant(_) | Expr::Variable { .. } => Vec::new(),
            Expr::Unary { arg, .. } => vec![arg],
            Expr::Binary { lhs, rhs, .. } => vec![lhs, rhs],
        }
    }
}

// ── Equality ────────────────────────────────────────────────

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        let mut pairs: Vec<(&Expr, &Expr)> = vec![(self, other)];
        while let Some((a, b)) = pairs.pop() {
            if std::ptr::eq(a, b) {
                continue;
            }
            match (a, b) {
                (Expr::Constant(x), Expr::Constant(y)) => {
                    if x != y {
                        return false;
                    }
                }
                (Expr::Variable { id: i, name: m }, Expr::Variable { id: j, name: n }) => {
                    if i != j || m != n {
                        return false;
                    }
                }
                (Expr::Unary { op: p, arg: x }, Expr::Unary { op: q, arg: y }) => {
                    if p != q {
                        return false;
                    }
                    pairs.push((x.as_ref(), y.as_ref()));
                }
                (
                    Expr::Binary {
                        op: p,
                        lhs: a1,
                        rhs: a2,
                    },
                    Expr::Binary {
                        op: q,
                        lhs: b1,
                        rhs: b2,
                    },
                ) => {
                    if p != q {
                        return false;
                    }
                    pairs.push((a2.as_ref(), b2.as_ref()));
                    pairs.push((a1.as_ref(), b1.as_ref()));
                }
                _ => return false,
            }
        }
        true
    }
}

// ── Teardown ────────────────────────────────────────────────

impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_unique_children(self, &mut pending);
        while let Some(mut node) = pending.pop() {
            if let Some(inner) = Rc::get_mut(&mut node) {
                detach_unique_children(inner, &mut pending);
            }
        }
    }
}

/// Move uniquely owned inner children onto `pending`, leaving leaves behind.
///
/// A detached slot is refilled with a constant, so the node that owned it
/// drops without descending further.
fn detach_unique_children(expr: &mut Expr, pending: &mut Vec<ExprRef>) {
    let slots: [Option<&mut ExprRef>; 2] = match expr {
        Expr::Constant(_) | Expr::Variable { .. } => [None, None],
        Expr::Unary { arg, .. } => [Some(arg), None],
        Expr::Binary { lhs, rhs, .. } => [Some(lhs), Some(rhs)],
    };
    for slot in slots.into_iter().flatten() {
        let inner = Rc::get_mut(slot).is_some_and(|child| {
            matches!(child, Expr::Unary { .. } | Expr::Binary { .. })
        });
        if inner {
            pending.push(std::mem::replace(slot, Rc::new(Expr::Constant(0.0))));
        }
    }
}

// ── Rendering ───────────────────────────────────────────────

enum Piece<'a> {
    Node(&'a Expr),
    Text(&'static str),
    Symbol(char),
    Exponent(i32),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![Piece::Node(self)];
        while let Some(piece) = stack.pop() {
            match piece {
                Piece::Text(text) => f.write_str(text)?,
                Piece::Symbol(symbol) => write!(f, "{symbol}")?,
                Piece::Exponent(exponent) => write!(f, "{exponent}")?,
                Piece::Node(Expr::Constant(value)) => write!(f, "{value}")?,
                Piece::Node(Expr::Variable { name, .. }) => f.write_str(name)?,
                Piece::Node(Expr::Unary { op, arg }) => match op {
                    UnaryOp::Neg => {
                        f.write_str("(-")?;
                        stack.extend([Piece::Text(")"), Piece::Node(arg.as_ref())]);
                    }
                    UnaryOp::IntPow(exponent) => {
                        f.write_str("(")?;
                        stack.extend([
                            Piece::Text(")"),
                            Piece::Exponent(*exponent),
                            Piece::Symbol('^'),
                            Piece::Node(arg.as_ref()),
                        ]);
                    }
                    _ => {
                        let name = op.function_name().unwrap_or("?");
                        write!(f, "{name}(")?;
                        stack.extend([Piece::Text(")"), Piece::Node(arg.as_ref())]);
                    }
                },
                Piece::Node(Expr::Binary { op, lhs, rhs }) => match op.infix_symbol() {
                    Some(symbol) => {
                        f.write_str("(")?;
                        stack.extend([
                            Piece::Text(")"),
                            Piece::Node(rhs.as_ref()),
                            Piece::Symbol(symbol),
                            Piece::Node(lhs.as_ref()),
                        ]);
                    }
                    None => {
                        write!(f, "{}(", op.as_str())?;
                        stack.extend([
                            Piece::Text(")"),
                            Piece::Node(rhs.as_ref()),
                            Piece::Symbol(','),
                            Piece::Node(lhs.as_ref()),
                        ]);
                    }
                },
            }
        }
        Ok(())
    }
}
