//! Scenario files for the Firewatch CLI.

use anyhow::{Context, Result};
use firewatch::prelude::Scenario;
use std::path::{Path, PathBuf};

/// File name looked up by `firewatch run` when no scenario is given.
pub const SCENARIO_FILE: &str = "firewatch.toml";

/// Load and parse a scenario TOML file.
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse scenario: {}", path.display()))
}

/// Save a scenario to the specified path.
pub fn save_scenario(scenario: &Scenario, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(scenario).context("Failed to serialize scenario")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write scenario: {}", path.display()))?;
    Ok(())
}

/// The scenario to run: an explicit file, else `firewatch.toml` in the
/// current or a parent directory, else the built-in default.
pub fn resolve_scenario(explicit: Option<&Path>) -> Result<(Scenario, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_scenario_file(),
    };
    match path {
        Some(path) => Ok((load_scenario(&path)?, Some(path))),
        None => Ok((Scenario::default(), None)),
    }
}

/// Find firewatch.toml in current or parent directories.
fn find_scenario_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let path = dir.join(SCENARIO_FILE);
        if path.exists() {
            return Some(path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}
