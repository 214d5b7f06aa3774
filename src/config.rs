use crate::algorithm::{EngineConfig, DEFAULT_CLOSED_BUCKETS, DEFAULT_OPEN_CAPACITY};
use crate::domain::StripsHeuristic;

use anyhow::{anyhow, bail};
use clap::Parser;
use serde::Deserialize;

#[derive(Parser, Debug, Default)]
#[command(
    name = "Rust A*",
    about = "Weighted best-first search for sliding-tile puzzles and STRIPS planning.",
    version = "1.0"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Domain to solve: tiles or strips")]
    pub domain: Option<String>,

    #[arg(long, help = "Initial tile board, comma separated, blank is 0")]
    pub tiles: Option<String>,

    #[arg(long, help = "Width of the tile board")]
    pub width: Option<usize>,

    #[arg(long, help = "Path to a grounded STRIPS problem in YAML")]
    pub problem: Option<String>,

    #[arg(long, value_enum, help = "STRIPS heuristic")]
    pub heuristic: Option<StripsHeuristic>,

    #[arg(long, help = "Heuristic weight, at least 1.0")]
    pub weight: Option<f64>,

    #[arg(long, help = "Discard nodes whose f exceeds this bound")]
    pub incumbent: Option<f64>,

    #[arg(long, help = "Initial open list capacity")]
    pub open_capacity: Option<usize>,

    #[arg(long, help = "Number of closed set buckets")]
    pub closed_buckets: Option<usize>,

    #[arg(long, help = "Seed for the Zobrist tables")]
    pub seed: Option<u64>,

    #[arg(long, help = "Path to the JSON report")]
    pub output_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub domain: String,
    pub tiles: Option<String>,
    pub width: usize,
    pub problem: Option<String>,
    pub heuristic: StripsHeuristic,
    pub weight: f64,
    pub incumbent: Option<f64>,
    pub open_capacity: usize,
    pub closed_buckets: usize,
    pub seed: u64,
    pub output_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            domain: "tiles".to_string(),
            tiles: None,
            width: 4,
            problem: None,
            heuristic: StripsHeuristic::default(),
            weight: 1.0,
            incumbent: None,
            open_capacity: DEFAULT_OPEN_CAPACITY,
            closed_buckets: DEFAULT_CLOSED_BUCKETS,
            seed: 0,
            output_path: None,
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(domain) = &cli.domain {
            self.domain = domain.clone();
        }
        if let Some(tiles) = &cli.tiles {
            self.tiles = Some(tiles.clone());
        }
        if let Some(width) = cli.width {
            self.width = width;
        }
        if let Some(problem) = &cli.problem {
            self.problem = Some(problem.clone());
        }
        if let Some(heuristic) = cli.heuristic {
            self.heuristic = heuristic;
        }
        if let Some(weight) = cli.weight {
            self.weight = weight;
        }
        if let Some(incumbent) = cli.incumbent {
            self.incumbent = Some(incumbent);
        }
        if let Some(open_capacity) = cli.open_capacity {
            self.open_capacity = open_capacity;
        }
        if let Some(closed_buckets) = cli.closed_buckets {
            self.closed_buckets = closed_buckets;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(output_path) = &cli.output_path {
            self.output_path = Some(output_path.clone());
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        match self.domain.as_str() {
            "tiles" => {
                if self.tiles.is_none() {
                    bail!("Domain tiles needs an initial board (--tiles)");
                }
            }
            "strips" => {
                if self.problem.is_none() {
                    bail!("Domain strips needs a problem file (--problem)");
                }
            }
            other => return Err(anyhow!("Unknown domain: {other}")),
        }

        if self.weight.is_nan() || self.weight < 1.0 {
            return Err(anyhow!(
                "Heuristic weight must be at least 1.0, got {}",
                self.weight
            ));
        }
        if let Some(incumbent) = self.incumbent {
            if incumbent.is_nan() || incumbent < 0.0 {
                bail!("Incumbent bound must be non-negative, got {incumbent}");
            }
        }
        if self.closed_buckets == 0 {
            bail!("Closed set needs at least one bucket");
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            open_capacity: self.open_capacity,
            weight: self.weight,
            incumbent: self.incumbent.unwrap_or(f64::INFINITY),
            closed_buckets: self.closed_buckets,
        }
    }
}
