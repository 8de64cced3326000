//! Sharing statistics over expression DAGs.
//!
//! Both walks use an explicit work stack, so arbitrarily deep chains are
//! safe to measure.

use crate::expr::core::{Expr, ExprRef};
use std::collections::{HashMap, HashSet};

/// Number of distinct nodes reachable from `roots`.
pub fn distinct_nodes<'a>(roots: impl IntoIterator<Item = &'a ExprRef>) -> usize {
    let mut seen: HashSet<*const Expr> = HashSet::new();
    let mut stack: Vec<&Expr> = roots.into_iter().map(|root| root.as_ref()).collect();
    while let Some(node) = stack.pop() {
        if !seen.insert(node as *const Expr) {
            continue;
        }
        stack.extend(node.children().into_iter().map(|child| child.as_ref()));
    }
    seen.len()
}

/// Number of nodes if every shared node were duplicated into a tree.
///
/// Each distinct node is sized once, so the walk is linear in the DAG.
/// Saturates at `u64::MAX` for pathologically shared inputs.
pub fn tree_size(root: &ExprRef) -> u64 {
    let mut sizes: HashMap<*const Expr, u64> = HashMap::new();
    let mut stack: Vec<(&Expr, bool)> = vec![(root.as_ref(), false)];
    while let Some((node, expanded)) = stack.pop() {
        let key = node as *const Expr;
        if sizes.contains_key(&key) {
            continue;
        }
        let children = node.children();
        if expanded {
            let size = children.iter().fold(1u64, |acc, child| {
                let child_key = child.as_ref() as *const Expr;
                acc.saturating_add(sizes.get(&child_key).copied().unwrap_or(0))
            });
            sizes.insert(key, size);
        } else {
            stack.push((node, true));
            stack.extend(children.into_iter().map(|child| (child.as_ref(), false)));
        }
    }
    sizes
        .get(&(root.as_ref() as *const Expr))
        .copied()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VariableId;
    use crate::expr::{UnaryOp, apply, constant, product, sum, variable};

    #[test]
    fn shared_subexpression_counts_once() {
        let x = variable(VariableId::new(0), "x");
        let shared = apply(UnaryOp::Exp, x);
        let root = product(shared.clone(), shared);
        assert_eq!(distinct_nodes([&root]), 3);
        assert_eq!(tree_size(&root), 5);
    }

    #[test]
    fn multiple_roots_share_the_seen_set() {
        let x = variable(VariableId::new(0), "x");
        let a = sum(x.clone(), constant(1.0));
        let b = sum(x, constant(2.0));
        assert_eq!(distinct_nodes([&a, &b]), 5);
    }

    #[test]
    fn repeated_squaring_is_sized_without_expansion() {
        let mut e = variable(VariableId::new(0), "x");
        for _ in 0..70 {
            e = sum(e.clone(), e);
        }
        assert_eq!(distinct_nodes([&e]), 71);
        assert_eq!(tree_size(&e), u64::MAX);
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let mut e = variable(VariableId::new(0), "x");
        for _ in 0..50_000 {
            e = sum(e, constant(1.0));
        }
        assert_eq!(distinct_nodes([&e]), 100_001);
        assert_eq!(tree_size(&e), 100_001);
    }
}
