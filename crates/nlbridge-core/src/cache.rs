//! Per-pass cache of built defined variables.

use nlbridge_expr::ExprRef;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Register/done cache keyed by defined-variable index.
///
/// A registered index without a value is in flight: its expression is
/// being built by an open frame of the builder.
#[derive(Debug, Default)]
pub(crate) struct SubexpressionCache {
    items: HashMap<usize, Option<ExprRef>>,
}

impl SubexpressionCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register an index as in flight. Returns true only for the first caller.
    pub(crate) fn register(&mut self, index: usize) -> bool {
        match self.items.entry(index) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(None);
                true
            }
        }
    }

    /// Store the built expression of a registered index.
    pub(crate) fn done(&mut self, index: usize, value: ExprRef) {
        self.items.insert(index, Some(value));
    }

    /// Forget every in-flight registration after a failed build.
    pub(crate) fn abandon_in_flight(&mut self) {
        self.items.retain(|_, value| value.is_some());
    }

    /// Get a completed expression.
    pub(crate) fn get(&self, index: usize) -> Option<ExprRef> {
        self.items.get(&index).and_then(Option::clone)
    }

    /// Number of completed entries.
    pub(crate) fn len(&self) -> usize {
        self.items.values().filter(|value| value.is_some()).count()
    }
}
