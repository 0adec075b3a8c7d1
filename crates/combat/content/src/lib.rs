//! Data-driven combat definitions and scenario worlds.
//!
//! This crate reads the authoring formats of the combat engine:
//! - Engine configuration (`config.toml`)
//! - Combat definitions: parameters, formula, area and conditions (`combats.ron`)
//! - Scenario worlds: tiles, creatures and one cast to resolve (`scenarios/*.ron`)
//!
//! Content is turned into `combat-core` values at load time and never
//! consulted during resolution.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    AreaSpec, CastSpec, CastTarget, CombatDefinitionSpec, CombatLoader, CombatRegistry, ConditionSpec,
    ConfigLoader, ContentFactory, CreatureSpec, FormulaSpecRon, PlayerSpec, ScenarioLoader, ScenarioOutcome,
    ScenarioSpec, TileSpec, WeaponSpec,
};
