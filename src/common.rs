use std::fmt;

/// Index of a node slot inside a [`NodePool`](crate::pool::NodePool).
///
/// Parent links and hash chains are stored as ids rather than references, so
/// tearing down the pool frees the whole search graph at once.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) const NONE: u32 = u32::MAX;

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_raw(raw: u32) -> Option<NodeId> {
        if raw == Self::NONE {
            None
        } else {
            Some(NodeId(raw))
        }
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Search node record held by the pool.
#[derive(Clone, Debug)]
pub struct Node<P> {
    pub f: f64,
    pub g: f64,
    pub parent: Option<NodeId>,
    pub packed: P,
    // Intrusive closed-set chain link.
    pub(crate) next: Option<NodeId>,
}

impl<P: Default> Default for Node<P> {
    fn default() -> Self {
        Node {
            f: 0.0,
            g: 0.0,
            parent: None,
            packed: P::default(),
            next: None,
        }
    }
}
