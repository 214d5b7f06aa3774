use crate::common::NodeId;

use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f64,
    g: f64,
    id: NodeId,
}

// BinaryHeap is a max-heap, so "greater" means "popped first".
impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            // Higher g cost has higher priority
            .then_with(|| self.g.total_cmp(&other.g))
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

/// Frontier ordered by `f` ascending, ties broken by `g` descending.
///
/// The keys are copied into the heap entry so comparisons never touch the
/// node pool.
#[derive(Debug, Default)]
pub struct OpenList {
    heap: BinaryHeap<OpenEntry>,
}

impl OpenList {
    pub fn with_capacity(capacity: usize) -> Self {
        OpenList {
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, id: NodeId, f: f64, g: f64) {
        self.heap.push(OpenEntry { f, g, id });
    }

    pub fn pop(&mut self) -> Option<NodeId> {
        self.heap.pop().map(|entry| entry.id)
    }

    /// `f` of the node that would be popped next.
    pub fn peek_f(&self) -> Option<f64> {
        self.heap.peek().map(|entry| entry.f)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}
