//! Successor routing at the pruning decision point.
//!
//! A partitioned search runs one engine per worker; each successor that
//! belongs to another worker is handed off here instead of being pushed
//! locally. Transport between workers is left to the caller.

use crate::domain::PackedState;

use std::collections::HashMap;

/// A successor that survived the incumbent bound.
#[derive(Debug)]
pub struct Candidate<'a, P> {
    pub packed: &'a P,
    pub f: f64,
    pub g: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Local,
    Redirect,
}

pub trait SuccessorHook<P> {
    fn route(&mut self, candidate: Candidate<'_, P>) -> Disposition;
}

/// Keeps every successor in the local engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalOnly;

impl<P> SuccessorHook<P> for LocalOnly {
    fn route(&mut self, _candidate: Candidate<'_, P>) -> Disposition {
        Disposition::Local
    }
}

#[derive(Debug, Clone)]
pub struct Outgoing<P> {
    pub worker: usize,
    pub packed: P,
    pub f: f64,
    pub g: f64,
}

/// Assigns each state to `hash_key() % workers` and buffers the ones owned
/// by other workers.
///
/// A state is buffered at most once between drains; when it is reached again
/// the buffered copy keeps the smaller `g`.
#[derive(Debug)]
pub struct Partitioner<P> {
    worker_id: usize,
    workers: usize,
    outgoing: Vec<Outgoing<P>>,
    // hash_key -> indices into `outgoing`
    buffered: HashMap<u64, Vec<usize>>,
}

impl<P: PackedState> Partitioner<P> {
    pub fn new(worker_id: usize, workers: usize) -> Self {
        assert!(
            worker_id < workers,
            "worker id {worker_id} out of range for {workers} workers"
        );
        Partitioner {
            worker_id,
            workers,
            outgoing: Vec::new(),
            buffered: HashMap::new(),
        }
    }

    pub fn owner(&self, packed: &P) -> usize {
        (packed.hash_key() % self.workers as u64) as usize
    }

    pub fn outgoing_len(&self) -> usize {
        self.outgoing.len()
    }

    pub fn drain_outgoing(&mut self) -> Vec<Outgoing<P>> {
        self.buffered.clear();
        std::mem::take(&mut self.outgoing)
    }
}

impl<P: PackedState> SuccessorHook<P> for Partitioner<P> {
    fn route(&mut self, candidate: Candidate<'_, P>) -> Disposition {
        let owner = self.owner(candidate.packed);
        if owner == self.worker_id {
            return Disposition::Local;
        }

        let slots = self
            .buffered
            .entry(candidate.packed.hash_key())
            .or_default();
        if let Some(&ind) = slots
            .iter()
            .find(|&&ind| self.outgoing[ind].packed == *candidate.packed)
        {
            let buffered = &mut self.outgoing[ind];
            if candidate.g < buffered.g {
                buffered.f = candidate.f;
                buffered.g = candidate.g;
            }
            return Disposition::Redirect;
        }
        slots.push(self.outgoing.len());
        self.outgoing.push(Outgoing {
            worker: owner,
            packed: candidate.packed.clone(),
            f: candidate.f,
            g: candidate.g,
        });
        Disposition::Redirect
    }
}
