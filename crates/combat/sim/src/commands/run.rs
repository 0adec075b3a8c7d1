//! Resolve a scenario and print what happened.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use combat_content::{ContentFactory, ScenarioOutcome};
use combat_core::env::WorldEvent;
use combat_core::{CombatReport, PcgRng, TargetResult};
use console::style;

/// Resolve one scenario
#[derive(Parser)]
pub struct Run {
    /// Scenario name (file stem under `scenarios/`)
    #[arg(value_name = "SCENARIO")]
    scenario: String,

    /// Content directory (defaults to the shipped content)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Override the scenario's roll seed
    #[arg(long)]
    seed: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Per-target outcomes and final health
    Summary,
    /// The combat report as JSON
    Json,
    /// Every recorded world mutation
    Events,
}

impl Run {
    pub fn execute(self) -> Result<()> {
        let factory = ContentFactory::new(self.data_dir.unwrap_or_else(super::default_data_dir));
        let config = factory.load_config()?;
        let combats = factory.load_combats()?;
        let mut scenario = factory.load_scenario(&self.scenario)?;
        if let Some(seed) = self.seed {
            scenario.seed = seed;
        }

        tracing::info!(scenario = %self.scenario, combat = %scenario.cast.combat, seed = scenario.seed, "resolving");
        let outcome = scenario.resolve(&combats, &config, &PcgRng)?;

        match self.format {
            OutputFormat::Summary => print_summary(&self.scenario, &outcome),
            OutputFormat::Json => print_json(&outcome.report)?,
            OutputFormat::Events => print_events(outcome.world.events()),
        }
        Ok(())
    }
}

fn print_summary(name: &str, outcome: &ScenarioOutcome) {
    let report = &outcome.report;
    println!("{} {}", style("Scenario:").bold().cyan(), name);
    println!(
        "{} {} {}",
        style("Rolled:").bold().cyan(),
        report.base_damage.primary.kind,
        report.base_damage.primary.value
    );
    println!(
        "{} {} reached, {} refused",
        style("Tiles:").bold().cyan(),
        report.tiles.len(),
        report.skipped_tiles.len()
    );
    println!();

    println!("{}", style("Targets:").bold().yellow());
    for entry in &report.outcomes {
        let health = outcome
            .world
            .health_of(entry.target)
            .map_or_else(|| "-".to_string(), |health| health.to_string());
        let result = match &entry.result {
            TargetResult::Applied { damage } => {
                let critical = if damage.critical { " (critical)" } else { "" };
                style(format!("{} {}{}", damage.primary.kind, damage.primary.value, critical)).green()
            }
            TargetResult::Blocked { block } => style(format!("blocked by {:?}", block)).red(),
            TargetResult::Rejected(reason) => style(reason.to_string()).red(),
            other => style(format!("{:?}", other)).dim(),
        };
        println!("  {:<6} health {:<6} {}", entry.target.to_string(), health, result);
    }

    for (position, reason) in &report.skipped_tiles {
        println!("  {} {}", style(position).dim(), style(reason).dim());
    }

    if report.leech.life != 0 || report.leech.mana != 0 {
        println!();
        println!(
            "{} life {} mana {}",
            style("Leech:").bold().yellow(),
            report.leech.life,
            report.leech.mana
        );
    }
}

fn print_json(report: &CombatReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")?;
    println!("{}", json);
    Ok(())
}

fn print_events(events: &[WorldEvent]) {
    for (index, event) in events.iter().enumerate() {
        println!("{:>4} {:?}", index, event);
    }
}
