pub mod strips;
pub mod tiles;

pub use strips::{Strips, StripsHeuristic, StripsProblem};
pub use tiles::Tiles;

use std::fmt::Debug;

/// Compact, hashable encoding of a domain state.
///
/// Equality must compare every field the domain needs to rebuild the state;
/// `hash_key` only picks the closed-set bucket.
pub trait PackedState: Default + Clone + Eq + Debug {
    fn hash_key(&self) -> u64;
}

/// Result of applying one operator to a live state. Only lives for one
/// expansion step.
pub struct Edge<D: Domain + ?Sized> {
    pub cost: u32,
    pub op: D::Op,
    pub undo: D::Undo,
}

/// Capability set the search engine is parameterized over.
///
/// Operators mutate a live state in place and hand back an [`Edge`] whose
/// undo token restores the exact prior state. The engine always undoes an
/// edge before asking for the next operator of the same state.
pub trait Domain {
    type State: Clone + Debug;
    type Packed: PackedState;
    type Op: Copy + Debug + PartialEq;
    type Undo: Debug;

    fn initial(&self) -> Self::State;

    fn h(&self, state: &Self::State) -> u32;

    fn is_goal(&self, state: &Self::State) -> bool;

    /// Number of operators applicable in `state`.
    fn nops(&self, state: &Self::State) -> usize;

    /// The `n`th applicable operator, `n < nops(state)`. Stable for an
    /// unchanged state.
    fn nthop(&self, state: &Self::State, n: usize) -> Self::Op;

    fn apply(&self, state: &mut Self::State, op: Self::Op) -> Edge<Self>;

    fn undo(&self, state: &mut Self::State, edge: &Edge<Self>);

    /// Pack `state` into `dst`, overwriting it.
    fn pack(&self, dst: &mut Self::Packed, state: &Self::State);

    fn unpack(&self, packed: &Self::Packed) -> Self::State;
}
