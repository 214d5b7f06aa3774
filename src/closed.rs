//! Closed set: a single-sized chained hash table.
//!
//! Chains are threaded through the nodes themselves, so an entry costs one
//! link field in the node and nothing in the table. Entries are prepended and
//! never removed.

use crate::common::{Node, NodeId};
use crate::domain::PackedState;
use crate::pool::NodePool;

pub struct ClosedSet {
    buckets: Vec<u32>,
    len: usize,
}

impl ClosedSet {
    pub fn new(buckets: usize) -> Self {
        assert!(buckets > 0, "closed set needs at least one bucket");
        ClosedSet {
            buckets: vec![NodeId::NONE; buckets],
            len: 0,
        }
    }

    fn bucket(&self, key: u64) -> usize {
        (key % self.buckets.len() as u64) as usize
    }

    /// Find the node whose packed state equals `key`, comparing full state
    /// equality along the chain.
    pub fn find<P: PackedState>(&self, pool: &NodePool<Node<P>>, key: &P) -> Option<NodeId> {
        let mut cursor = NodeId::from_raw(self.buckets[self.bucket(key.hash_key())]);
        while let Some(id) = cursor {
            let node = pool.get(id);
            if node.packed == *key {
                return Some(id);
            }
            cursor = node.next;
        }
        None
    }

    /// Prepend `id` to its bucket. No duplicate check: callers must `find`
    /// first.
    pub fn add<P: PackedState>(&mut self, pool: &mut NodePool<Node<P>>, id: NodeId) {
        let ind = self.bucket(pool.get(id).packed.hash_key());
        pool.get_mut(id).next = NodeId::from_raw(self.buckets[ind]);
        self.buckets[ind] = id.0;
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
