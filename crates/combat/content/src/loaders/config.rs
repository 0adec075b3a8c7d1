//! Engine configuration loader.

use std::path::Path;

use combat_core::CombatConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for engine configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys keep their `CombatConfig::default()` values.
    pub fn load(path: &Path) -> LoadResult<CombatConfig> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
    }

    /// Parse config data from TOML text.
    pub fn parse(content: &str) -> LoadResult<CombatConfig> {
        let config: CombatConfig =
            toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use combat_core::WorldType;

    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ConfigLoader::parse("protection_level = 30\nworld_type = \"no-pvp\"\n").unwrap();
        assert_eq!(config.protection_level, 30);
        assert_eq!(config.world_type, WorldType::NoPvp);
        assert_eq!(config.max_layers, CombatConfig::DEFAULT_MAX_LAYERS);
        assert_eq!(config.viewport_x, CombatConfig::DEFAULT_VIEWPORT_X);
    }

    #[test]
    fn unknown_world_type_is_rejected() {
        assert!(ConfigLoader::parse("world_type = \"arena\"\n").is_err());
    }
}
