mod astar;
pub mod hook;

pub use astar::{
    EngineConfig, SearchStatus, WeightedAstar, DEFAULT_CLOSED_BUCKETS, DEFAULT_OPEN_CAPACITY,
};
pub use hook::{Candidate, Disposition, LocalOnly, Partitioner, SuccessorHook};

use crate::common::{Node, NodeId};
use crate::domain::Domain;
use crate::pool::NodePool;

// Walk parent links from the goal node, yielding states goal first.
fn construct_path<D: Domain>(
    domain: &D,
    pool: &NodePool<Node<D::Packed>>,
    goal: NodeId,
) -> Vec<D::State> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(id) = current {
        let node = pool.get(id);
        path.push(domain.unpack(&node.packed));
        current = node.parent;
    }
    path
}
