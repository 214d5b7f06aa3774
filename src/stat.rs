use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    pub expanded: u64,
    pub generated: u64,
    pub pruned_by_incumbent: u64,
    pub pruned_duplicates: u64,
    pub redirected: u64,
    // Successors whose f dropped below their parent's under w = 1.
    pub f_decreases: u64,
    pub started: Option<Instant>,
    pub finished: Option<Instant>,
}

impl SearchStats {
    pub(crate) fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    pub(crate) fn finish(&mut self) {
        self.finished = Some(Instant::now());
    }

    pub fn wall_time(&self) -> Duration {
        match (self.started, self.finished) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    pub fn print(&self) {
        info!(
            "Time(microseconds) {:?} Expanded {:?} Generated {:?} Pruned(incumbent) {:?} Pruned(duplicate) {:?} Redirected {:?}",
            self.wall_time().as_micros(),
            self.expanded,
            self.generated,
            self.pruned_by_incumbent,
            self.pruned_duplicates,
            self.redirected
        );
    }
}

/// One run, as written to the JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub domain: String,
    pub weight: f64,
    pub incumbent: Option<f64>,
    pub initial_heuristic: u32,
    pub expanded: u64,
    pub generated: u64,
    pub pruned_by_incumbent: u64,
    pub pruned_duplicates: u64,
    pub redirected: u64,
    pub f_decreases: u64,
    pub wall_time_us: u128,
    pub solution_length: usize,
    pub solution_cost: Option<u32>,
}

impl RunReport {
    pub fn write_json(&self, path: &str) -> anyhow::Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)?;
        Ok(())
    }
}
