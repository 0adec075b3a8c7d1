use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use combat_content::ContentFactory;
use console::style;

/// List combat definitions and scenarios
#[derive(Parser)]
pub struct List {
    /// Content directory (defaults to the shipped content)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

impl List {
    pub fn execute(self) -> Result<()> {
        let factory = ContentFactory::new(self.data_dir.unwrap_or_else(super::default_data_dir));
        let combats = factory.load_combats()?;

        println!("{}", style("Combats:").bold().yellow());
        for name in combats.names() {
            let Some(combat) = combats.get(name) else {
                continue;
            };
            let shape = if combat.area().is_some() { "area" } else { "target" };
            println!("  {:<20} {:<12} {}", name, combat.params().combat_type.to_string(), shape);
        }
        println!();

        println!("{}", style("Scenarios:").bold().yellow());
        for name in factory.scenario_names()? {
            let scenario = factory.load_scenario(&name)?;
            println!("  {:<20} casts {}", name, scenario.cast.combat);
        }
        Ok(())
    }
}
