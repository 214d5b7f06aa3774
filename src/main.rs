use astar_rust::algorithm::WeightedAstar;
use astar_rust::config::{Cli, Config};
use astar_rust::domain::{Domain, Strips, StripsProblem, Tiles};
use astar_rust::solution::verify_path;
use astar_rust::stat::{RunReport, SearchStats};

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("failed to read config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        info!("No config file specified, using default config");
        Config::default()
    }
    .override_from_command_line(&cli)?;

    match config.domain.as_str() {
        "tiles" => {
            let board = Tiles::parse_board(config.tiles.as_deref().unwrap_or_default())?;
            let tiles = Tiles::new(config.width, board, config.seed)?;
            run(&tiles, &config)
        }
        "strips" => {
            let path = config
                .problem
                .as_deref()
                .ok_or_else(|| anyhow!("strips domain needs a problem file"))?;
            let problem = StripsProblem::load_from_file(path)?;
            let strips = Strips::new(&problem, config.heuristic, config.seed)?;
            run(&strips, &config)
        }
        other => Err(anyhow!("Unknown domain: {other}")),
    }
}

fn run<D: Domain>(domain: &D, config: &Config) -> anyhow::Result<()>
where
    D::State: PartialEq,
{
    let init = domain.initial();
    let initial_heuristic = domain.h(&init);
    info!(
        "domain {} weight {} incumbent {:?} initial heuristic {}",
        config.domain, config.weight, config.incumbent, initial_heuristic
    );

    let mut engine = WeightedAstar::new(domain, config.engine_config());
    let path = engine.search(&init)?;
    let stats = engine.stats();
    stats.print();

    let solution_cost = if path.is_empty() {
        info!("no solution");
        None
    } else {
        let cost = verify_path(domain, &path);
        match cost {
            Some(cost) => info!("solution length {} cost {}", path.len(), cost),
            None => error!("returned path does not verify"),
        }
        cost
    };

    if let Some(output_path) = &config.output_path {
        report(config, initial_heuristic, stats, path.len(), solution_cost)
            .write_json(output_path)
            .with_context(|| format!("failed to write report: {output_path}"))?;
    }
    Ok(())
}

fn report(
    config: &Config,
    initial_heuristic: u32,
    stats: &SearchStats,
    solution_length: usize,
    solution_cost: Option<u32>,
) -> RunReport {
    RunReport {
        domain: config.domain.clone(),
        weight: config.weight,
        incumbent: config.incumbent,
        initial_heuristic,
        expanded: stats.expanded,
        generated: stats.generated,
        pruned_by_incumbent: stats.pruned_by_incumbent,
        pruned_duplicates: stats.pruned_duplicates,
        redirected: stats.redirected,
        f_decreases: stats.f_decreases,
        wall_time_us: stats.wall_time().as_micros(),
        solution_length,
        solution_cost,
    }
}
