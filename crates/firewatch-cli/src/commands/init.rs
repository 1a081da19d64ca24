//! Write a default scenario file.

use anyhow::{bail, Result};
use colored::Colorize;
use firewatch::prelude::Scenario;
use std::path::PathBuf;

use crate::config::{save_scenario, SCENARIO_FILE};

pub fn run(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(SCENARIO_FILE));
    if path.exists() && !force {
        bail!(
            "{} already exists (use {} to overwrite)",
            path.display(),
            "--force".cyan()
        );
    }

    println!("{} Writing default scenario...", "→".blue());
    save_scenario(&Scenario::default(), &path)?;
    println!("  {} Created {}", "✓".green(), path.display());

    println!();
    println!("Next steps:");
    println!("  {} firewatch validate {}", "1.".blue(), path.display());
    println!("  {} firewatch run --scenario {}", "2.".blue(), path.display());

    Ok(())
}
