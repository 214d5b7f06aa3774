//! Node arena.
//!
//! Slots live in fixed-size chunks that are never reallocated, so a slot
//! handed out once stays put for the lifetime of the pool. Destructed slots
//! go onto a free list and are handed out again before the pool grows.

use crate::common::NodeId;

const CHUNK_SHIFT: u32 = 16;
const CHUNK_SIZE: usize = 1 << CHUNK_SHIFT; // 65,536 slots
const CHUNK_MASK: usize = CHUNK_SIZE - 1;

pub struct NodePool<T> {
    chunks: Vec<Vec<T>>,
    free: Vec<NodeId>,
    // Slots ever handed out; the next fresh slot index.
    top: usize,
    live: usize,
}

impl<T: Default> NodePool<T> {
    pub fn new() -> Self {
        NodePool {
            chunks: Vec::new(),
            free: Vec::new(),
            top: 0,
            live: 0,
        }
    }

    /// Hand out a default-initialized slot, reusing a destructed one if any.
    pub fn construct(&mut self) -> NodeId {
        self.live += 1;
        if let Some(id) = self.free.pop() {
            *self.slot_mut(id) = T::default();
            return id;
        }

        assert!(
            self.top < NodeId::NONE as usize,
            "node pool exhausted after {} slots",
            self.top
        );
        let id = NodeId(self.top as u32);
        if self.top >> CHUNK_SHIFT == self.chunks.len() {
            self.chunks.push(Vec::with_capacity(CHUNK_SIZE));
        }
        self.chunks[self.top >> CHUNK_SHIFT].push(T::default());
        self.top += 1;
        id
    }

    /// Return a slot to the free list. The caller must hold no other
    /// reference to `id` (it must not be in the open list or closed set).
    pub fn destruct(&mut self, id: NodeId) {
        debug_assert!(id.index() < self.top, "destruct of unknown slot {id:?}");
        *self.slot_mut(id) = T::default();
        self.free.push(id);
        self.live -= 1;
    }

    pub fn get(&self, id: NodeId) -> &T {
        let i = id.index();
        &self.chunks[i >> CHUNK_SHIFT][i & CHUNK_MASK]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut T {
        self.slot_mut(id)
    }

    /// Number of slots currently handed out.
    pub fn live(&self) -> usize {
        self.live
    }

    /// Number of slots the pool has allocated storage for.
    pub fn allocated(&self) -> usize {
        self.top
    }

    fn slot_mut(&mut self, id: NodeId) -> &mut T {
        let i = id.index();
        &mut self.chunks[i >> CHUNK_SHIFT][i & CHUNK_MASK]
    }
}

impl<T: Default> Default for NodePool<T> {
    fn default() -> Self {
        Self::new()
    }
}
