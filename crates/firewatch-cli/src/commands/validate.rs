//! Check a scenario file and describe its topology.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::config::load_scenario;

pub fn run(file: &Path) -> Result<()> {
    let scenario = load_scenario(file)?;
    let topology = scenario
        .build_topology()
        .with_context(|| format!("Invalid scenario: {}", file.display()))?;

    println!("{} {} is valid", "✓".green().bold(), file.display());
    println!("  Nodes:        {}", topology.len().to_string().cyan());
    println!("  Edges:        {}", topology.edge_count().to_string().cyan());
    let components = topology.component_count();
    let components = if components > 1 {
        components.to_string().yellow()
    } else {
        components.to_string().cyan()
    };
    println!("  Components:   {}", components);
    println!("  Base station: {}", scenario.base_station.to_string().cyan());
    let origins: Vec<String> = scenario.fire_origins.iter().map(|l| l.to_string()).collect();
    println!("  Fire origins: {}", origins.join(", ").red());
    println!(
        "  Cycle:        {} ms / speed {}",
        scenario.simulation.base_cycle_ms,
        scenario.simulation.speed_factor
    );

    Ok(())
}
