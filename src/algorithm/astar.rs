use super::construct_path;
use super::hook::{Candidate, Disposition, LocalOnly, SuccessorHook};
use crate::closed::ClosedSet;
use crate::common::{Node, NodeId};
use crate::domain::{Domain, Edge};
use crate::open::OpenList;
use crate::pool::NodePool;
use crate::stat::SearchStats;

use anyhow::bail;
use tracing::{debug, info, instrument, trace, warn};

pub const DEFAULT_OPEN_CAPACITY: usize = 120;
pub const DEFAULT_CLOSED_BUCKETS: usize = 1 << 22;

/// Construction-time parameters of one search.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub open_capacity: usize,
    /// Heuristic weight, `>= 1`.
    pub weight: f64,
    /// Successors with `f` above this are discarded.
    pub incumbent: f64,
    pub closed_buckets: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            open_capacity: DEFAULT_OPEN_CAPACITY,
            weight: 1.0,
            incumbent: f64::INFINITY,
            closed_buckets: DEFAULT_CLOSED_BUCKETS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Init,
    Running,
    Found,
    Exhausted,
}

/// Weighted A* over an arbitrary [`Domain`].
///
/// Nodes are popped in `(f asc, g desc)` order and the first goal popped is
/// returned. Every generated successor is recorded in the closed set, and a
/// closed state is never reopened, so with `weight == 1` the result is
/// optimal only for a consistent heuristic. The root is only pushed, so it
/// is generated once more the first time a successor leads back to it.
///
/// An engine owns its pool, open list and closed set and runs exactly one
/// search.
pub struct WeightedAstar<'d, D: Domain, H = LocalOnly> {
    domain: &'d D,
    config: EngineConfig,
    hook: H,
    pool: NodePool<Node<D::Packed>>,
    closed: ClosedSet,
    open: OpenList,
    status: SearchStatus,
    stats: SearchStats,
}

impl<'d, D: Domain> WeightedAstar<'d, D, LocalOnly> {
    pub fn new(domain: &'d D, config: EngineConfig) -> Self {
        Self::with_hook(domain, config, LocalOnly)
    }
}

impl<'d, D: Domain, H: SuccessorHook<D::Packed>> WeightedAstar<'d, D, H> {
    pub fn with_hook(domain: &'d D, config: EngineConfig, hook: H) -> Self {
        WeightedAstar {
            domain,
            pool: NodePool::new(),
            closed: ClosedSet::new(config.closed_buckets),
            open: OpenList::with_capacity(config.open_capacity),
            config,
            hook,
            status: SearchStatus::Init,
            stats: SearchStats::default(),
        }
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    pub fn hook_mut(&mut self) -> &mut H {
        &mut self.hook
    }

    /// Search from `init`. Returns the solution states from goal back to
    /// `init`, or an empty path if the open list runs dry.
    #[instrument(skip_all, name = "weighted_astar", fields(weight = self.config.weight, incumbent = self.config.incumbent), level = "debug")]
    pub fn search(&mut self, init: &D::State) -> anyhow::Result<Vec<D::State>> {
        if self.status != SearchStatus::Init {
            bail!(
                "search engine already used (status {:?}), build a new one per search",
                self.status
            );
        }
        self.stats.start();
        self.status = SearchStatus::Running;

        let root = self.wrap(init, None, 0);
        let (root_f, root_g) = self.keys(root);
        self.open.push(root, root_f, root_g);

        let mut path = Vec::new();
        while let Some(id) = self.open.pop() {
            let (f, g) = self.keys(id);
            let mut state = self.domain.unpack(&self.pool.get(id).packed);
            trace!("expand node {id:?}: f {f} g {g}");

            if self.domain.is_goal(&state) {
                debug!("goal popped: f {f} g {g}");
                path = construct_path(self.domain, &self.pool, id);
                self.status = SearchStatus::Found;
                break;
            }

            self.stats.expanded += 1;

            let nops = self.domain.nops(&state);
            for i in 0..nops {
                let op = self.domain.nthop(&state, i);
                let edge = self.domain.apply(&mut state, op);
                let next = self.wrap(&state, Some(id), edge.cost);
                let (next_f, next_g) = self.keys(next);

                if self.config.weight == 1.0 && next_f < f {
                    // Heuristic is inconsistent; optimality is lost but the
                    // search goes on.
                    self.stats.f_decreases += 1;
                    warn!("f decreases from {f} to {next_f} on operator {op:?}");
                }

                // Pruning methods
                if next_f > self.config.incumbent {
                    self.stats.pruned_by_incumbent += 1;
                    self.discard(next, &mut state, &edge);
                    continue;
                }

                let disposition = self.hook.route(Candidate {
                    packed: &self.pool.get(next).packed,
                    f: next_f,
                    g: next_g,
                });
                if disposition == Disposition::Redirect {
                    self.stats.redirected += 1;
                    self.discard(next, &mut state, &edge);
                    continue;
                }

                if self
                    .closed
                    .find(&self.pool, &self.pool.get(next).packed)
                    .is_some()
                {
                    self.stats.pruned_duplicates += 1;
                    self.discard(next, &mut state, &edge);
                    continue;
                }

                self.stats.generated += 1;
                self.open.push(next, next_f, next_g);
                self.closed.add(&mut self.pool, next);
                self.domain.undo(&mut state, &edge);
            }
        }

        if self.status == SearchStatus::Running {
            self.status = SearchStatus::Exhausted;
            info!("open list exhausted without reaching a goal");
        }
        self.stats.finish();
        debug!(
            "{} nodes live in pool, {} closed",
            self.pool.live(),
            self.closed.len()
        );
        Ok(path)
    }

    fn keys(&self, id: NodeId) -> (f64, f64) {
        let node = self.pool.get(id);
        (node.f, node.g)
    }

    // Drop a successor that never entered the open list or closed set.
    fn discard(&mut self, id: NodeId, state: &mut D::State, edge: &Edge<D>) {
        self.pool.destruct(id);
        self.domain.undo(state, edge);
    }

    fn wrap(&mut self, state: &D::State, parent: Option<NodeId>, cost: u32) -> NodeId {
        let parent_g = parent.map_or(0.0, |p| self.pool.get(p).g);
        let g = parent_g + f64::from(cost);
        let f = g + f64::from(self.domain.h(state)) * self.config.weight;

        let id = self.pool.construct();
        let node = self.pool.get_mut(id);
        node.f = f;
        node.g = g;
        node.parent = parent;
        self.domain.pack(&mut node.packed, state);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::hook::Partitioner;
    use crate::domain::strips::tests::robot_ball;
    use crate::domain::{PackedState, StripsHeuristic, Tiles};
    use crate::solution::verify_path;

    use std::collections::{HashMap, VecDeque};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .try_init();
    }

    fn small_config() -> EngineConfig {
        EngineConfig {
            closed_buckets: 1 << 16,
            ..EngineConfig::default()
        }
    }

    // Vertices 0..n on a ring, joined by one bidirectional step operator.
    struct Ring {
        n: u32,
        start: u32,
        goal: u32,
        h: Vec<u32>,
    }

    impl Ring {
        fn new(n: u32, start: u32, goal: u32) -> Self {
            Ring {
                n,
                start,
                goal,
                h: vec![0; n as usize],
            }
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    struct Vertex(u32);

    impl PackedState for Vertex {
        fn hash_key(&self) -> u64 {
            u64::from(self.0)
        }
    }

    impl Domain for Ring {
        type State = u32;
        type Packed = Vertex;
        type Op = bool;
        type Undo = u32;

        fn initial(&self) -> u32 {
            self.start
        }

        fn h(&self, state: &u32) -> u32 {
            self.h[*state as usize]
        }

        fn is_goal(&self, state: &u32) -> bool {
            *state == self.goal
        }

        fn nops(&self, _state: &u32) -> usize {
            2
        }

        fn nthop(&self, _state: &u32, n: usize) -> bool {
            n == 0
        }

        fn apply(&self, state: &mut u32, forward: bool) -> Edge<Self> {
            let prev = *state;
            *state = if forward {
                (prev + 1) % self.n
            } else {
                (prev + self.n - 1) % self.n
            };
            Edge {
                cost: 1,
                op: forward,
                undo: prev,
            }
        }

        fn undo(&self, state: &mut u32, edge: &Edge<Self>) {
            *state = edge.undo;
        }

        fn pack(&self, dst: &mut Vertex, state: &u32) {
            dst.0 = *state;
        }

        fn unpack(&self, packed: &Vertex) -> u32 {
            packed.0
        }
    }

    // Brute-force baseline: goal-to-start path by breadth-first search.
    fn bfs<D: Domain>(domain: &D) -> Vec<D::State>
    where
        D::State: Eq + std::hash::Hash,
    {
        let start = domain.initial();
        let mut parent: HashMap<D::State, Option<D::State>> = HashMap::new();
        parent.insert(start.clone(), None);
        let mut queue = VecDeque::from([start]);
        while let Some(state) = queue.pop_front() {
            if domain.is_goal(&state) {
                let mut path = vec![state.clone()];
                let mut current = state;
                while let Some(Some(prev)) = parent.get(&current) {
                    path.push(prev.clone());
                    current = prev.clone();
                }
                return path;
            }
            let mut live = state.clone();
            for i in 0..domain.nops(&state) {
                let op = domain.nthop(&live, i);
                let edge = domain.apply(&mut live, op);
                if !parent.contains_key(&live) {
                    parent.insert(live.clone(), Some(state.clone()));
                    queue.push_back(live.clone());
                }
                domain.undo(&mut live, &edge);
            }
        }
        Vec::new()
    }

    #[test]
    fn test_ring_goal_next_to_start() {
        init_tracing();
        let ring = Ring::new(4, 0, 1);
        let mut engine = WeightedAstar::new(&ring, small_config());
        let path = engine.search(&ring.initial()).unwrap();

        assert_eq!(path, vec![1, 0]);
        assert_eq!(path, bfs(&ring));
        assert_eq!(engine.status(), SearchStatus::Found);
        assert_eq!(engine.stats().expanded, 1);
        assert_eq!(engine.stats().generated, 2);
        assert!(engine.stats().started.is_some());
        assert!(engine.stats().finished.is_some());
    }

    #[test]
    fn test_ring_matches_bfs_and_counters() {
        init_tracing();
        let ring = Ring::new(5, 0, 2);
        let mut engine = WeightedAstar::new(&ring, small_config());
        let path = engine.search(&ring.initial()).unwrap();

        assert_eq!(path, vec![2, 1, 0]);
        assert_eq!(path, bfs(&ring));
        assert_eq!(verify_path(&ring, &path), Some(2));

        let stats = engine.stats();
        assert_eq!(stats.expanded, 3);
        assert_eq!(stats.generated, 5);
        assert_eq!(stats.pruned_duplicates, 1);
        assert_eq!(stats.pruned_by_incumbent, 0);
        assert_eq!(stats.f_decreases, 0);
    }

    #[test]
    fn test_incumbent_below_optimum_gives_empty_path() {
        init_tracing();
        let ring = Ring::new(5, 0, 2);
        let config = EngineConfig {
            incumbent: 1.5,
            ..small_config()
        };
        let mut engine = WeightedAstar::new(&ring, config);
        let path = engine.search(&ring.initial()).unwrap();

        assert!(path.is_empty());
        assert_eq!(engine.status(), SearchStatus::Exhausted);
        assert_eq!(engine.stats().expanded, 3);
        assert_eq!(engine.stats().generated, 2);
        assert_eq!(engine.stats().pruned_by_incumbent, 4);
    }

    #[test]
    fn test_incumbent_at_optimum_still_solves() {
        let ring = Ring::new(5, 0, 2);
        let config = EngineConfig {
            incumbent: 2.0,
            ..small_config()
        };
        let mut engine = WeightedAstar::new(&ring, config);
        assert_eq!(engine.search(&ring.initial()).unwrap().len(), 3);
    }

    #[test]
    fn test_unreachable_goal_exhausts() {
        let ring = Ring::new(4, 0, 7);
        let mut engine = WeightedAstar::new(&ring, small_config());
        let path = engine.search(&ring.initial()).unwrap();

        assert!(path.is_empty());
        assert_eq!(engine.status(), SearchStatus::Exhausted);
        // The regenerated root is expanded a second time.
        assert_eq!(engine.stats().expanded, 5);
        assert_eq!(engine.stats().generated, 4);
        assert_eq!(engine.stats().pruned_duplicates, 6);
    }

    #[test]
    fn test_root_is_regenerated_once() {
        let ring = Ring::new(4, 0, 2);
        let mut engine = WeightedAstar::new(&ring, small_config());
        let path = engine.search(&ring.initial()).unwrap();

        assert_eq!(path, vec![2, 1, 0]);
        let stats = engine.stats();
        assert_eq!(stats.expanded, 3);
        // 1 and 3 from the root, then 2 and the root again from 1.
        assert_eq!(stats.generated, 4);
        assert_eq!(stats.pruned_duplicates, 2);
    }

    #[test]
    fn test_inconsistent_heuristic_warns_and_continues() {
        init_tracing();
        let mut ring = Ring::new(4, 0, 2);
        ring.h = vec![3, 0, 0, 0];
        let mut engine = WeightedAstar::new(&ring, small_config());
        let path = engine.search(&ring.initial()).unwrap();

        assert_eq!(engine.stats().f_decreases, 2);
        assert_eq!(engine.status(), SearchStatus::Found);
        assert_eq!(path.len(), 3);
        assert_eq!(verify_path(&ring, &path), Some(2));
    }

    #[test]
    fn test_second_search_is_rejected() {
        let ring = Ring::new(4, 0, 1);
        let mut engine = WeightedAstar::new(&ring, small_config());
        engine.search(&ring.initial()).unwrap();
        assert!(engine.search(&ring.initial()).is_err());
    }

    #[test]
    fn test_tiles_two_moves() {
        init_tracing();
        let tiles = Tiles::new(3, vec![1, 4, 2, 3, 0, 5, 6, 7, 8], 0).unwrap();
        let mut engine = WeightedAstar::new(&tiles, small_config());
        let path = engine.search(&tiles.initial()).unwrap();

        assert_eq!(path.len(), 3);
        assert_eq!(path.last(), Some(&tiles.initial()));
        assert_eq!(verify_path(&tiles, &path), Some(2));
        assert_eq!(engine.stats().expanded, 2);
    }

    #[test]
    fn test_tiles_optimal_and_weighted_bound() {
        init_tracing();
        // Optimal solution length 26.
        let board = vec![7, 2, 4, 5, 0, 6, 8, 3, 1];
        let tiles = Tiles::new(3, board, 0).unwrap();

        let mut optimal = WeightedAstar::new(&tiles, small_config());
        let path = optimal.search(&tiles.initial()).unwrap();
        assert_eq!(verify_path(&tiles, &path), Some(26));
        assert_eq!(optimal.stats().f_decreases, 0);

        let config = EngineConfig {
            weight: 2.0,
            ..small_config()
        };
        let mut weighted = WeightedAstar::new(&tiles, config);
        let path = weighted.search(&tiles.initial()).unwrap();
        let cost = verify_path(&tiles, &path).unwrap();
        assert!((26..=52).contains(&cost), "weighted cost {cost}");
    }

    #[test]
    fn test_tiles_odd_permutation_exhausts() {
        let tiles = Tiles::new(3, vec![0, 2, 1, 3, 4, 5, 6, 7, 8], 0).unwrap();
        let config = EngineConfig {
            closed_buckets: 1 << 18,
            ..EngineConfig::default()
        };
        let mut engine = WeightedAstar::new(&tiles, config);
        let path = engine.search(&tiles.initial()).unwrap();

        assert!(path.is_empty());
        // Half of 9! states are reachable. Each is generated once, the root
        // included, and the root is expanded twice.
        assert_eq!(engine.stats().expanded, 181_441);
        assert_eq!(engine.stats().generated, 181_440);
    }

    #[test]
    fn test_strips_plan() {
        init_tracing();
        let strips = robot_ball(StripsHeuristic::GoalCount);
        let mut engine = WeightedAstar::new(&strips, small_config());
        let path = engine.search(&strips.initial()).unwrap();

        assert_eq!(path.len(), 4);
        assert_eq!(verify_path(&strips, &path), Some(3));
        assert_eq!(strips.proposition_names(&path[0]), vec!["robot-b", "ball-b"]);
    }

    #[test]
    fn test_blind_strips_matches_goal_count_cost() {
        let blind = robot_ball(StripsHeuristic::Blind);
        let mut engine = WeightedAstar::new(&blind, small_config());
        let path = engine.search(&blind.initial()).unwrap();
        assert_eq!(verify_path(&blind, &path), Some(3));
    }

    #[test]
    fn test_partitioner_redirects_foreign_successors() {
        let tiles = Tiles::new(3, vec![7, 2, 4, 5, 0, 6, 8, 3, 1], 0).unwrap();
        let mut engine =
            WeightedAstar::with_hook(&tiles, small_config(), Partitioner::new(0, 2));
        let path = engine.search(&tiles.initial()).unwrap();

        // Half the state space is owned elsewhere, so this worker alone runs
        // dry before reaching the goal.
        assert!(path.is_empty());
        assert_eq!(engine.status(), SearchStatus::Exhausted);

        let redirected = engine.stats().redirected;
        assert!(redirected > 0);
        let buffered = engine.hook().outgoing_len();
        assert!(buffered > 0 && buffered as u64 <= redirected);
        let outgoing = engine.hook_mut().drain_outgoing();
        assert!(outgoing.iter().all(|o| o.worker == 1));
        assert!(outgoing.iter().all(|o| o.packed.hash_key() % 2 == 1));
        let mut keys: Vec<u64> = outgoing.iter().map(|o| o.packed.hash_key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), outgoing.len());
    }

    #[test]
    fn test_single_partition_behaves_like_local() {
        let tiles = Tiles::new(3, vec![1, 4, 2, 3, 0, 5, 6, 7, 8], 0).unwrap();
        let mut engine =
            WeightedAstar::with_hook(&tiles, small_config(), Partitioner::new(0, 1));
        let path = engine.search(&tiles.initial()).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(engine.stats().redirected, 0);
    }
}
