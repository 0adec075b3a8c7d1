//! Collaborator traits through which combat reads and changes the world.
//!
//! The world owns tiles, creatures and items. Combat never holds references
//! into it: queries return owned snapshots and every change goes through a
//! [`WorldMutator`] call.

use crate::combat::{
    CombatDamage, Condition, ConditionKind, DamageComponent, DistanceEffect, MagicEffect, Rejection,
};
use crate::state::{CreatureSnapshot, EntityId, Position, Skull, TileView};

/// Read-only world queries.
pub trait WorldOracle {
    /// The location at `position`, if it exists.
    fn tile(&self, position: Position) -> Option<TileView>;

    fn creature(&self, id: EntityId) -> Option<CreatureSnapshot>;

    /// Projectile-style sight check between two positions on the same layer.
    fn line_of_sight(&self, from: Position, to: Position) -> bool;

    /// Players able to see `center` within the given half-extents.
    fn spectators(&self, center: Position, range_x: u32, range_y: u32) -> Vec<EntityId>;

    /// Skull of `subject` as displayed to `viewer`.
    fn skull_seen_by(&self, viewer: EntityId, subject: EntityId) -> Skull;

    /// Whether `attacker` has recently attacked `victim`.
    fn has_been_attacked(&self, victim: EntityId, attacker: EntityId) -> bool;

    /// Monotonic world clock in milliseconds.
    fn now_ms(&self) -> u64;
}

/// Damage figures of a player's equipped weapon.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponDamage {
    /// Maximum physical damage of one swing.
    pub max: i32,
    /// Elemental share added to every hit.
    pub element: DamageComponent,
}

/// Weapon damage lookups.
pub trait WeaponOracle {
    /// `None` when `player` fights without a usable weapon.
    fn weapon_damage(&self, player: EntityId, target: Option<EntityId>) -> Option<WeaponDamage>;
}

/// Options forwarded to the blocking collaborator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockRules {
    pub by_shield: bool,
    pub by_armor: bool,
    /// The combat also places a ground field.
    pub has_field: bool,
    pub ignore_resistances: bool,
}

/// World mutations requested by combat.
pub trait WorldMutator {
    /// Returns the location at `position`, creating an empty one if absent.
    fn materialize_tile(&mut self, position: Position) -> TileView;

    /// Applies `damage` to the target's health. `false` if nothing changed.
    fn change_health(&mut self, source: Option<EntityId>, target: EntityId, damage: &CombatDamage) -> bool;

    /// Applies `damage` to the target's mana. `false` if nothing changed.
    fn change_mana(&mut self, source: Option<EntityId>, target: EntityId, damage: &CombatDamage) -> bool;

    /// Lets the target's defenses reduce `damage` and record a block kind.
    ///
    /// Returns `true` when the hit is vetoed entirely.
    fn block_hit(
        &mut self,
        damage: &mut CombatDamage,
        source: Option<EntityId>,
        target: EntityId,
        rules: BlockRules,
    ) -> bool;

    /// Places a ground field item owned by `owner`.
    fn place_field(&mut self, position: Position, item_id: u16, owner: Option<EntityId>) -> Result<(), Rejection>;

    fn remove_field(&mut self, position: Position, item_id: u16);

    /// Adds a condition outside of combat bookkeeping.
    fn add_condition(&mut self, target: EntityId, condition: Condition) -> bool;

    fn add_combat_condition(&mut self, target: EntityId, condition: Condition) -> bool;

    fn remove_condition(&mut self, target: EntityId, kind: ConditionKind);

    fn remove_combat_condition(&mut self, target: EntityId, kind: ConditionKind);

    fn add_in_fight_ticks(&mut self, player: EntityId);

    /// Effect visible to everyone near `position`.
    fn play_effect(&mut self, position: Position, effect: MagicEffect);

    /// Effect delivered to a precomputed spectator set.
    fn play_effect_for(&mut self, spectators: &[EntityId], position: Position, effect: MagicEffect);

    /// Effect delivered to one player only.
    fn send_effect_to(&mut self, player: EntityId, position: Position, effect: MagicEffect);

    fn play_distance_effect(&mut self, from: Position, to: Position, effect: DistanceEffect);
}

/// Everything the pipeline needs from the world, as one object.
pub trait World: WorldOracle + WeaponOracle + WorldMutator {}

impl<T: WorldOracle + WeaponOracle + WorldMutator + ?Sized> World for T {}
