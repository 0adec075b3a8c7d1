//! Combat domain: damage values, conditions, eligibility and resolution.
//!
//! # Module Structure
//!
//! - `damage`, `condition`: value types carried by a hit
//! - `params`: per-combat configuration and the numeric parameter surface
//! - `callback`: scripted hooks and the reentrancy guard
//! - `eligibility`: who may affect which location or creature
//! - `formula`: base damage computation
//! - `pipeline`, `area_combat`, `leech`: resolution against the world
//! - `field`: ground field placement and stepping

pub mod area_combat;
pub mod callback;
pub mod condition;
pub mod damage;
pub mod effects;
pub mod eligibility;
pub mod error;
pub mod field;
pub mod formula;
pub mod leech;
pub mod params;
pub mod pipeline;
pub mod report;

pub use area_combat::{do_area_combat, do_area_effects};
pub use callback::{
    CallbackError, CallbackHandle, CombatCallbacks, ScriptFrame, ScriptStack, TargetCallback, TileCallback,
    ValueCallback, ValueHookKind, ValueInput,
};
pub use condition::{Condition, ConditionKind, ConditionSet};
pub use damage::{BlockKind, CombatDamage, DamageComponent, DamageKind, OriginKind, percent_of};
pub use effects::{DistanceEffect, MagicEffect};
pub use eligibility::{Eligibility, Rejection, is_in_pvp_zone, is_protected};
pub use error::CombatError;
pub use field::{FieldPlacement, FieldStep, MagicField, on_step_in_field, resolve_field_item};
pub use formula::DamageResolver;
pub use leech::{area_leech, hit_leech};
pub use params::{CombatParam, CombatParams, FormulaKind, FormulaSpec};
pub use pipeline::{Combat, do_target_combat, scale_by_stats};
pub use report::{CombatReport, LeechOutcome, TargetOutcome, TargetResult};
