//! Combat resolution for a tile-based creature world.
//!
//! `combat-core` turns a configured [`Combat`] into concrete world changes:
//! it projects direction-dependent areas onto locations, filters locations
//! and creatures through the eligibility rules, rolls base damage, and
//! applies hits, conditions, leech, fields and visuals through the
//! collaborator traits in [`env`]. The crate owns no world state; every
//! resolution receives a [`CombatEnv`] explicitly.
pub mod area;
pub mod combat;
pub mod config;
pub mod env;
pub mod error;
pub mod state;

pub use area::{AreaError, DirectionalArea, GridCell, ShapeGrid, project_area};
pub use combat::{
    BlockKind, CallbackError, CallbackHandle, Combat, CombatDamage, CombatError, CombatParam, CombatParams,
    CombatReport, Condition, ConditionKind, ConditionSet, DamageComponent, DamageKind, DistanceEffect, Eligibility,
    FormulaKind, FormulaSpec, LeechOutcome, MagicEffect, OriginKind, Rejection, ScriptStack, TargetOutcome,
    TargetResult,
};
pub use config::{CombatConfig, WorldType};
pub use env::{
    AllowAll, BlockRules, CombatEnv, MemoryWorld, OracleError, PcgRng, PolicyHook, RngOracle, RollStream,
    WeaponDamage, WeaponOracle, World, WorldMutator, WorldOracle,
};
pub use error::{CombatFault, ErrorSeverity};
pub use state::{
    CreatureKind, CreatureSnapshot, Direction, EntityId, PlayerFlags, PlayerProfile, Position, ResourceMeter, Skull,
    SpecialSkills, TileFlags, TileView, WeaponProfile, WeaponType, ZoneKind,
};
