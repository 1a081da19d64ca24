//! Run a scenario.

use anyhow::{Context, Result};
use colored::Colorize;
use firewatch::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::config::resolve_scenario;

pub struct RunOptions {
    pub scenario: Option<PathBuf>,
    pub duration: u64,
    pub speed: Option<u32>,
    pub seed: Option<u64>,
    pub events_out: Option<PathBuf>,
}

pub fn run(options: RunOptions) -> Result<()> {
    let (mut scenario, source) = resolve_scenario(options.scenario.as_deref())?;
    if let Some(speed) = options.speed {
        scenario.simulation.speed_factor = speed;
    }
    if let Some(seed) = options.seed {
        scenario.fire.seed = Some(seed);
    }

    match &source {
        Some(path) => println!("{} Loaded scenario {}", "→".blue(), path.display()),
        None => println!("{} Using built-in scenario", "→".blue()),
    }
    println!(
        "{} Running for {}s at speed {}...",
        "→".blue(),
        options.duration.to_string().cyan(),
        scenario.simulation.speed_factor.to_string().cyan()
    );

    let duration = Duration::from_secs(options.duration);
    let pb = ProgressBar::new(duration.as_millis() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.red/yellow}] {elapsed_precise} {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    let report = runtime.block_on(run_scenario(&scenario, duration, |elapsed, stats| {
        pb.set_position(elapsed.as_millis() as u64);
        pb.set_message(format!(
            "agents {} | burned {}/{}",
            stats.active_agents, stats.burned_nodes, stats.total_nodes
        ));
    }))?;
    pb.finish_and_clear();
    debug!(stats = %report.stats, "final statistics");

    let stats = &report.stats;
    println!();
    println!(
        "{} Simulation started {} and finished after {:.1}s",
        "✓".green().bold(),
        report.started_at.format("%H:%M:%S"),
        report.elapsed.as_secs_f64()
    );
    println!(
        "  Agents:     {} spawned, {} lost to fire",
        stats.total_agents.to_string().green(),
        report.log.count(EventKind::Destroyed).to_string().red()
    );
    println!(
        "  Nodes:      {} burned, {} near fire, {} total",
        stats.burned_nodes.to_string().red(),
        stats.near_fire_nodes.to_string().yellow(),
        stats.total_nodes.to_string().cyan()
    );
    println!("  Events:     {}", stats.events_logged.to_string().cyan());

    if let Some(path) = options.events_out {
        report
            .log
            .write_json(&path)
            .with_context(|| format!("Failed to write events: {}", path.display()))?;
        println!("  {} Wrote events to {}", "✓".green(), path.display());
    }

    Ok(())
}
