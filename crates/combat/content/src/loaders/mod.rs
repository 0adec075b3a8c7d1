//! Content loaders for reading combat data from files.
//!
//! Every loader parses a RON or TOML document into a small serde mirror
//! type and then converts it into `combat-core` values, failing with file
//! context on the first malformed entry.

pub mod combats;
pub mod config;
pub mod factory;
pub mod scenario;

pub use combats::{
    AreaSpec, CombatDefinitionSpec, CombatLoader, CombatRegistry, ConditionSpec, FormulaSpecRon,
};
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use scenario::{
    CastSpec, CastTarget, CreatureSpec, PlayerSpec, ScenarioLoader, ScenarioOutcome, ScenarioSpec, TileSpec,
    WeaponSpec,
};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
