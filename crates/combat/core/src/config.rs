/// World-wide PvP rule set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum WorldType {
    /// Players may attack each other outside protected zones.
    #[default]
    Pvp,
    /// Players may only fight each other inside PvP zones.
    NoPvp,
    /// Open PvP with no reputation penalties.
    PvpEnforced,
}

/// Combat engine constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Players below this level can neither attack nor be attacked by players.
    pub protection_level: u32,

    /// Global PvP mode.
    pub world_type: WorldType,

    /// Number of vertical layers in the world. Targets on `z >= max_layers` are ignored.
    pub max_layers: u8,

    /// Horizontal margin added to an area's extent when gathering spectators.
    pub viewport_x: u32,

    /// Vertical margin added to an area's extent when gathering spectators.
    pub viewport_y: u32,

    /// How many scripted callbacks may be on the stack at once.
    pub script_stack_depth: usize,
}

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of conditions a single combat definition can attach.
    pub const MAX_CONDITIONS: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_PROTECTION_LEVEL: u32 = 1;
    pub const DEFAULT_MAX_LAYERS: u8 = 16;
    pub const DEFAULT_VIEWPORT_X: u32 = 11;
    pub const DEFAULT_VIEWPORT_Y: u32 = 11;
    pub const DEFAULT_SCRIPT_STACK_DEPTH: usize = 16;

    /// Milliseconds after creation during which a field keeps its owner unconditionally.
    pub const FIELD_OWNERSHIP_GRACE_MS: u64 = 5000;

    pub fn new() -> Self {
        Self {
            protection_level: Self::DEFAULT_PROTECTION_LEVEL,
            world_type: WorldType::default(),
            max_layers: Self::DEFAULT_MAX_LAYERS,
            viewport_x: Self::DEFAULT_VIEWPORT_X,
            viewport_y: Self::DEFAULT_VIEWPORT_Y,
            script_stack_depth: Self::DEFAULT_SCRIPT_STACK_DEPTH,
        }
    }

    #[must_use]
    pub fn with_protection_level(mut self, level: u32) -> Self {
        self.protection_level = level;
        self
    }

    #[must_use]
    pub fn with_world_type(mut self, world_type: WorldType) -> Self {
        self.world_type = world_type;
        self
    }

    pub fn is_no_pvp_world(&self) -> bool {
        self.world_type == WorldType::NoPvp
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = CombatConfig::default();
        assert_eq!(config.max_layers, 16);
        assert_eq!(config.viewport_x, 11);
        assert_eq!(config.world_type, WorldType::Pvp);
        assert!(!config.is_no_pvp_world());
    }

    #[test]
    fn world_type_parses_kebab_case() {
        assert_eq!("no-pvp".parse::<WorldType>(), Ok(WorldType::NoPvp));
        assert_eq!(WorldType::PvpEnforced.to_string(), "pvp-enforced");
    }
}
