//! Grounded STRIPS planning.
//!
//! Problems arrive already grounded: a list of named propositions and
//! actions over them. States are sorted proposition-id sets.

use super::{Domain, Edge, PackedState};

use anyhow::{anyhow, bail, Context};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StripsHeuristic {
    Blind,
    #[default]
    GoalCount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionYaml {
    pub name: String,
    #[serde(default)]
    pub pre: Vec<String>,
    #[serde(default)]
    pub add: Vec<String>,
    #[serde(default)]
    pub del: Vec<String>,
    #[serde(default = "unit_cost")]
    pub cost: u32,
}

fn unit_cost() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripsProblem {
    pub propositions: Vec<String>,
    pub actions: Vec<ActionYaml>,
    pub init: Vec<String>,
    pub goal: Vec<String>,
}

impl StripsProblem {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read STRIPS problem {path}"))?;
        Self::from_yaml_str(&yaml).with_context(|| format!("error with STRIPS problem: {path}"))
    }
}

#[derive(Debug, Clone)]
struct GroundAction {
    name: String,
    pre: Vec<u32>,
    add: Vec<u32>,
    del: Vec<u32>,
    cost: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripsState {
    pub propositions: Vec<u32>,
    pub h: u32,
}

#[derive(Debug, Clone)]
pub struct StripsUndo {
    removed: Vec<u32>,
    added: Vec<u32>,
    h: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedStrips {
    propositions: Vec<u32>,
    hash: u64,
}

impl PackedState for PackedStrips {
    fn hash_key(&self) -> u64 {
        self.hash
    }
}

#[derive(Debug, Clone)]
pub struct Strips {
    names: Vec<String>,
    actions: Vec<GroundAction>,
    init: Vec<u32>,
    goal: Vec<u32>,
    heuristic: StripsHeuristic,
    zobrist: Vec<u64>,
}

fn resolve(ids: &HashMap<&str, u32>, names: &[String], what: &str) -> anyhow::Result<Vec<u32>> {
    let mut resolved = names
        .iter()
        .map(|name| {
            ids.get(name.as_str())
                .copied()
                .ok_or_else(|| anyhow!("unknown proposition {name:?} in {what}"))
        })
        .collect::<anyhow::Result<Vec<u32>>>()?;
    resolved.sort_unstable();
    resolved.dedup();
    Ok(resolved)
}

impl Strips {
    pub fn new(
        problem: &StripsProblem,
        heuristic: StripsHeuristic,
        seed: u64,
    ) -> anyhow::Result<Self> {
        if problem.actions.is_empty() {
            bail!("STRIPS problem has no actions");
        }
        let mut ids = HashMap::new();
        for (id, name) in problem.propositions.iter().enumerate() {
            if ids.insert(name.as_str(), id as u32).is_some() {
                bail!("duplicate proposition {name:?}");
            }
        }

        let actions = problem
            .actions
            .iter()
            .map(|action| -> anyhow::Result<GroundAction> {
                let what = format!("action {}", action.name);
                Ok(GroundAction {
                    name: action.name.clone(),
                    pre: resolve(&ids, &action.pre, &what)?,
                    add: resolve(&ids, &action.add, &what)?,
                    del: resolve(&ids, &action.del, &what)?,
                    cost: action.cost,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let mut rng = StdRng::seed_from_u64(seed);
        let zobrist = (0..problem.propositions.len())
            .map(|_| rng.gen::<u64>())
            .collect();

        Ok(Strips {
            names: problem.propositions.clone(),
            actions,
            init: resolve(&ids, &problem.init, "init")?,
            goal: resolve(&ids, &problem.goal, "goal")?,
            heuristic,
            zobrist,
        })
    }

    pub fn action_name(&self, action: usize) -> &str {
        &self.actions[action].name
    }

    pub fn proposition_names(&self, state: &StripsState) -> Vec<&str> {
        state
            .propositions
            .iter()
            .map(|&p| self.names[p as usize].as_str())
            .collect()
    }

    fn applicable<'a>(&'a self, state: &'a StripsState) -> impl Iterator<Item = usize> + 'a {
        let props = &state.propositions;
        self.actions
            .iter()
            .enumerate()
            .filter(move |(_, action)| action.pre.iter().all(|p| props.binary_search(p).is_ok()))
            .map(|(i, _)| i)
    }

    fn heuristic(&self, propositions: &[u32]) -> u32 {
        match self.heuristic {
            StripsHeuristic::Blind => 0,
            StripsHeuristic::GoalCount => self
                .goal
                .iter()
                .filter(|g| propositions.binary_search(g).is_err())
                .count() as u32,
        }
    }

    fn state_from(&self, propositions: Vec<u32>) -> StripsState {
        let h = self.heuristic(&propositions);
        StripsState { propositions, h }
    }
}

fn insert_sorted(props: &mut Vec<u32>, p: u32) {
    if let Err(pos) = props.binary_search(&p) {
        props.insert(pos, p);
    }
}

fn remove_sorted(props: &mut Vec<u32>, p: u32) {
    if let Ok(pos) = props.binary_search(&p) {
        props.remove(pos);
    }
}

impl Domain for Strips {
    type State = StripsState;
    type Packed = PackedStrips;
    type Op = usize;
    type Undo = StripsUndo;

    fn initial(&self) -> StripsState {
        self.state_from(self.init.clone())
    }

    fn h(&self, state: &StripsState) -> u32 {
        state.h
    }

    fn is_goal(&self, state: &StripsState) -> bool {
        self.goal
            .iter()
            .all(|g| state.propositions.binary_search(g).is_ok())
    }

    fn nops(&self, state: &StripsState) -> usize {
        self.applicable(state).count()
    }

    // TODO: nops and nthop both rescan every action; an applicability trie
    // over preconditions would make this sublinear.
    fn nthop(&self, state: &StripsState, n: usize) -> usize {
        self.applicable(state)
            .nth(n)
            .unwrap_or_else(|| panic!("operator {n} out of range"))
    }

    fn apply(&self, state: &mut StripsState, op: usize) -> Edge<Self> {
        let action = &self.actions[op];
        let props = &mut state.propositions;
        let removed: Vec<u32> = action
            .del
            .iter()
            .copied()
            .filter(|p| props.binary_search(p).is_ok() && action.add.binary_search(p).is_err())
            .collect();
        let added: Vec<u32> = action
            .add
            .iter()
            .copied()
            .filter(|p| props.binary_search(p).is_err())
            .collect();

        for &p in &removed {
            remove_sorted(props, p);
        }
        for &p in &added {
            insert_sorted(props, p);
        }

        let h = state.h;
        state.h = self.heuristic(&state.propositions);
        Edge {
            cost: action.cost,
            op,
            undo: StripsUndo { removed, added, h },
        }
    }

    fn undo(&self, state: &mut StripsState, edge: &Edge<Self>) {
        for &p in &edge.undo.added {
            remove_sorted(&mut state.propositions, p);
        }
        for &p in &edge.undo.removed {
            insert_sorted(&mut state.propositions, p);
        }
        state.h = edge.undo.h;
    }

    fn pack(&self, dst: &mut PackedStrips, state: &StripsState) {
        dst.propositions.clear();
        dst.propositions.extend_from_slice(&state.propositions);
        dst.hash = state
            .propositions
            .iter()
            .fold(0, |hash, &p| hash ^ self.zobrist[p as usize]);
    }

    fn unpack(&self, packed: &PackedStrips) -> StripsState {
        self.state_from(packed.propositions.clone())
    }
}
