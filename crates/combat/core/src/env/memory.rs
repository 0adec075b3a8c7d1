//! In-memory reference world.
//!
//! [`MemoryWorld`] implements every collaborator trait over plain maps and
//! records each mutation as a [`WorldEvent`]. It backs the integration tests
//! and the scenario runner; production servers provide their own world.

use std::collections::{BTreeMap, BTreeSet};

use crate::combat::{
    BlockKind, CombatDamage, Condition, ConditionKind, DistanceEffect, MagicEffect, Rejection,
};
use crate::state::{CreatureSnapshot, EntityId, Position, Skull, TileFlags, TileView, ZoneKind};

use super::{BlockRules, WeaponDamage, WeaponOracle, WorldMutator, WorldOracle};

/// A ground field lying on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacedField {
    pub item_id: u16,
    pub owner: Option<EntityId>,
    pub created_at_ms: u64,
}

/// Who a magic effect was delivered to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Audience {
    Everyone,
    Spectators(Vec<EntityId>),
    Player(EntityId),
}

/// One recorded world mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorldEvent {
    TileMaterialized(Position),
    Health {
        source: Option<EntityId>,
        target: EntityId,
        damage: CombatDamage,
    },
    Mana {
        source: Option<EntityId>,
        target: EntityId,
        damage: CombatDamage,
    },
    Blocked {
        target: EntityId,
        block: BlockKind,
    },
    FieldPlaced {
        position: Position,
        item_id: u16,
        owner: Option<EntityId>,
    },
    FieldRemoved {
        position: Position,
        item_id: u16,
    },
    ConditionAdded {
        target: EntityId,
        condition: Condition,
        combat: bool,
    },
    ConditionRemoved {
        target: EntityId,
        kind: ConditionKind,
        combat: bool,
    },
    InFight(EntityId),
    Effect {
        position: Position,
        effect: MagicEffect,
        audience: Audience,
    },
    Distance {
        from: Position,
        to: Position,
        effect: DistanceEffect,
    },
}

#[derive(Clone, Debug, Default)]
pub struct MemoryWorld {
    tiles: BTreeMap<Position, TileView>,
    creatures: BTreeMap<EntityId, CreatureSnapshot>,
    weapons: BTreeMap<EntityId, WeaponDamage>,
    skull_overrides: BTreeMap<(EntityId, EntityId), Skull>,
    attacked: BTreeSet<(EntityId, EntityId)>,
    block_outcomes: BTreeMap<EntityId, BlockKind>,
    fields: BTreeMap<Position, Vec<PlacedField>>,
    conditions: BTreeMap<EntityId, Vec<Condition>>,
    in_fight: BTreeMap<EntityId, u32>,
    events: Vec<WorldEvent>,
    now_ms: u64,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== setup =====

    /// Inserts (or replaces the flags of) a location.
    pub fn insert_tile(&mut self, position: Position, flags: TileFlags) {
        let tile = self.tiles.entry(position).or_insert_with(|| TileView::empty(position));
        tile.flags = flags;
    }

    /// Adds a creature on top of the stack at its position.
    ///
    /// The creature's zone is derived from the flags of that location.
    pub fn insert_creature(&mut self, mut creature: CreatureSnapshot) {
        let tile = self
            .tiles
            .entry(creature.position)
            .or_insert_with(|| TileView::empty(creature.position));
        creature.zone = zone_of(tile.flags);
        tile.creatures.retain(|id| *id != creature.id);
        tile.creatures.insert(0, creature.id);
        self.creatures.insert(creature.id, creature);
    }

    pub fn set_weapon(&mut self, player: EntityId, weapon: WeaponDamage) {
        self.weapons.insert(player, weapon);
    }

    /// Overrides the skull `viewer` sees on `subject`.
    pub fn set_skull_seen(&mut self, viewer: EntityId, subject: EntityId, skull: Skull) {
        self.skull_overrides.insert((viewer, subject), skull);
    }

    pub fn mark_attacked(&mut self, victim: EntityId, attacker: EntityId) {
        self.attacked.insert((victim, attacker));
    }

    /// Scripts the defense outcome of every hit on `target`.
    pub fn set_block(&mut self, target: EntityId, block: BlockKind) {
        self.block_outcomes.insert(target, block);
    }

    pub fn set_clock(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
    }

    pub fn insert_field(&mut self, position: Position, field: PlacedField) {
        self.fields.entry(position).or_default().push(field);
    }

    // ===== inspection =====

    pub fn events(&self) -> &[WorldEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn fields_at(&self, position: Position) -> &[PlacedField] {
        self.fields.get(&position).map_or(&[], Vec::as_slice)
    }

    pub fn conditions_of(&self, creature: EntityId) -> &[Condition] {
        self.conditions.get(&creature).map_or(&[], Vec::as_slice)
    }

    pub fn in_fight_ticks(&self, player: EntityId) -> u32 {
        self.in_fight.get(&player).copied().unwrap_or(0)
    }

    pub fn health_of(&self, creature: EntityId) -> Option<i32> {
        self.creatures.get(&creature).map(|c| c.health.current)
    }

    pub fn mana_of(&self, creature: EntityId) -> Option<i32> {
        self.creatures.get(&creature).map(|c| c.mana.current)
    }

    /// Magic effects recorded at `position`, in order.
    pub fn effects_at(&self, position: Position) -> Vec<MagicEffect> {
        self.events
            .iter()
            .filter_map(|event| match event {
                WorldEvent::Effect {
                    position: at, effect, ..
                } if *at == position => Some(*effect),
                _ => None,
            })
            .collect()
    }

    pub fn distance_effects(&self) -> Vec<(Position, Position, DistanceEffect)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                WorldEvent::Distance { from, to, effect } => Some((*from, *to, *effect)),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, event: WorldEvent) {
        tracing::trace!(?event, "world event");
        self.events.push(event);
    }

    fn blocks_sight(&self, position: Position) -> bool {
        self.tiles
            .get(&position)
            .is_some_and(|tile| tile.has_flag(TileFlags::BLOCK_PROJECTILE))
    }
}

fn zone_of(flags: TileFlags) -> ZoneKind {
    if flags.contains(TileFlags::PROTECTION_ZONE) {
        ZoneKind::Protection
    } else if flags.contains(TileFlags::NO_PVP_ZONE) {
        ZoneKind::NoPvp
    } else if flags.contains(TileFlags::PVP_ZONE) {
        ZoneKind::Pvp
    } else {
        ZoneKind::Normal
    }
}

impl WorldOracle for MemoryWorld {
    fn tile(&self, position: Position) -> Option<TileView> {
        self.tiles.get(&position).cloned()
    }

    fn creature(&self, id: EntityId) -> Option<CreatureSnapshot> {
        self.creatures.get(&id).cloned()
    }

    /// Walks a Bresenham line; any projectile-blocking tile strictly between
    /// the endpoints blocks sight.
    fn line_of_sight(&self, from: Position, to: Position) -> bool {
        if from.z != to.z {
            return false;
        }

        let (dx, dy) = (to.offset_x(from).abs(), -to.offset_y(from).abs());
        let (sx, sy) = (to.offset_x(from).signum(), to.offset_y(from).signum());
        let (mut x, mut y) = (from.x, from.y);
        let mut err = dx + dy;

        loop {
            if x == to.x && y == to.y {
                return true;
            }
            let doubled = 2 * err;
            if doubled >= dy {
                err += dy;
                x += sx;
            }
            if doubled <= dx {
                err += dx;
                y += sy;
            }
            let step = Position::new(x, y, from.z);
            if step != to && self.blocks_sight(step) {
                return false;
            }
        }
    }

    fn spectators(&self, center: Position, range_x: u32, range_y: u32) -> Vec<EntityId> {
        self.creatures
            .values()
            .filter(|creature| {
                creature.is_player()
                    && creature.position.z == center.z
                    && creature.position.distance_x(center) <= range_x
                    && creature.position.distance_y(center) <= range_y
            })
            .map(|creature| creature.id)
            .collect()
    }

    fn skull_seen_by(&self, viewer: EntityId, subject: EntityId) -> Skull {
        if let Some(skull) = self.skull_overrides.get(&(viewer, subject)) {
            return *skull;
        }
        self.creatures
            .get(&subject)
            .and_then(|creature| creature.player.as_ref())
            .map_or(Skull::None, |player| player.skull)
    }

    fn has_been_attacked(&self, victim: EntityId, attacker: EntityId) -> bool {
        self.attacked.contains(&(victim, attacker))
    }

    fn now_ms(&self) -> u64 {
        self.now_ms
    }
}

impl WeaponOracle for MemoryWorld {
    fn weapon_damage(&self, player: EntityId, _target: Option<EntityId>) -> Option<WeaponDamage> {
        self.weapons.get(&player).copied()
    }
}

impl WorldMutator for MemoryWorld {
    fn materialize_tile(&mut self, position: Position) -> TileView {
        if let Some(tile) = self.tiles.get(&position) {
            return tile.clone();
        }
        let tile = TileView::empty(position);
        self.tiles.insert(position, tile.clone());
        self.record(WorldEvent::TileMaterialized(position));
        tile
    }

    fn change_health(&mut self, source: Option<EntityId>, target: EntityId, damage: &CombatDamage) -> bool {
        let Some(creature) = self.creatures.get_mut(&target) else {
            return false;
        };
        if creature.health.current <= 0 {
            return false;
        }

        let delta = damage.primary.value + damage.secondary.value;
        let health = &mut creature.health;
        health.current = (health.current + delta).clamp(0, health.maximum);

        if let Some(attacker) = source.filter(|_| delta < 0) {
            self.attacked.insert((target, attacker));
        }
        self.record(WorldEvent::Health {
            source,
            target,
            damage: *damage,
        });
        true
    }

    fn change_mana(&mut self, source: Option<EntityId>, target: EntityId, damage: &CombatDamage) -> bool {
        let Some(creature) = self.creatures.get_mut(&target) else {
            return false;
        };
        if creature.mana.maximum <= 0 {
            return false;
        }

        let delta = damage.primary.value + damage.secondary.value;
        let mana = &mut creature.mana;
        mana.current = (mana.current + delta).clamp(0, mana.maximum);
        self.record(WorldEvent::Mana {
            source,
            target,
            damage: *damage,
        });
        true
    }

    /// Applies the scripted outcome for `target`: immunity vetoes the hit,
    /// a shield absorbs the primary component and vetoes only when nothing
    /// else is left, armor halves the harmful components.
    fn block_hit(
        &mut self,
        damage: &mut CombatDamage,
        _source: Option<EntityId>,
        target: EntityId,
        rules: BlockRules,
    ) -> bool {
        let outcome = match self.block_outcomes.get(&target).copied().unwrap_or_default() {
            BlockKind::Defense if !rules.by_shield => BlockKind::None,
            BlockKind::Armor if !rules.by_armor => BlockKind::None,
            outcome => outcome,
        };
        damage.block = outcome;

        let vetoed = match outcome {
            BlockKind::None => return false,
            BlockKind::Armor => {
                for component in damage.components_mut() {
                    if component.value < 0 {
                        component.value /= 2;
                    }
                }
                false
            }
            BlockKind::Defense => {
                damage.primary.value = 0;
                damage.secondary.value == 0
            }
            BlockKind::Immunity => true,
        };
        self.record(WorldEvent::Blocked { target, block: outcome });
        vetoed
    }

    fn place_field(&mut self, position: Position, item_id: u16, owner: Option<EntityId>) -> Result<(), Rejection> {
        if self.blocks_sight(position) {
            return Err(Rejection::NotEnoughRoom);
        }
        let field = PlacedField {
            item_id,
            owner,
            created_at_ms: self.now_ms,
        };
        self.fields.entry(position).or_default().push(field);
        self.record(WorldEvent::FieldPlaced {
            position,
            item_id,
            owner,
        });
        Ok(())
    }

    fn remove_field(&mut self, position: Position, item_id: u16) {
        let Some(fields) = self.fields.get_mut(&position) else {
            return;
        };
        if let Some(index) = fields.iter().position(|field| field.item_id == item_id) {
            fields.remove(index);
            self.record(WorldEvent::FieldRemoved { position, item_id });
        }
    }

    fn add_condition(&mut self, target: EntityId, condition: Condition) -> bool {
        self.push_condition(target, condition, false)
    }

    fn add_combat_condition(&mut self, target: EntityId, condition: Condition) -> bool {
        self.push_condition(target, condition, true)
    }

    fn remove_condition(&mut self, target: EntityId, kind: ConditionKind) {
        self.drop_condition(target, kind, false);
    }

    fn remove_combat_condition(&mut self, target: EntityId, kind: ConditionKind) {
        self.drop_condition(target, kind, true);
    }

    fn add_in_fight_ticks(&mut self, player: EntityId) {
        *self.in_fight.entry(player).or_default() += 1;
        self.record(WorldEvent::InFight(player));
    }

    fn play_effect(&mut self, position: Position, effect: MagicEffect) {
        self.record(WorldEvent::Effect {
            position,
            effect,
            audience: Audience::Everyone,
        });
    }

    fn play_effect_for(&mut self, spectators: &[EntityId], position: Position, effect: MagicEffect) {
        self.record(WorldEvent::Effect {
            position,
            effect,
            audience: Audience::Spectators(spectators.to_vec()),
        });
    }

    fn send_effect_to(&mut self, player: EntityId, position: Position, effect: MagicEffect) {
        self.record(WorldEvent::Effect {
            position,
            effect,
            audience: Audience::Player(player),
        });
    }

    fn play_distance_effect(&mut self, from: Position, to: Position, effect: DistanceEffect) {
        self.record(WorldEvent::Distance { from, to, effect });
    }
}

impl MemoryWorld {
    fn push_condition(&mut self, target: EntityId, condition: Condition, combat: bool) -> bool {
        if !self.creatures.contains_key(&target) {
            return false;
        }
        self.conditions.entry(target).or_default().push(condition);
        self.record(WorldEvent::ConditionAdded {
            target,
            condition,
            combat,
        });
        true
    }

    fn drop_condition(&mut self, target: EntityId, kind: ConditionKind, combat: bool) {
        let Some(conditions) = self.conditions.get_mut(&target) else {
            return;
        };
        let before = conditions.len();
        conditions.retain(|condition| condition.kind != kind);
        if conditions.len() != before {
            self.record(WorldEvent::ConditionRemoved { target, kind, combat });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{DamageComponent, DamageKind, OriginKind};
    use crate::state::CreatureKind;

    const Z: u8 = 7;

    #[test]
    fn creatures_stack_top_first_and_inherit_zone() {
        let mut world = MemoryWorld::new();
        let at = Position::new(5, 5, Z);
        world.insert_tile(at, TileFlags::NO_PVP_ZONE);
        world.insert_creature(CreatureSnapshot::new(EntityId(1), CreatureKind::Monster, at));
        world.insert_creature(CreatureSnapshot::new(EntityId(2), CreatureKind::Monster, at));

        let tile = world.tile(at).unwrap();
        assert_eq!(tile.creatures, vec![EntityId(2), EntityId(1)]);
        assert_eq!(world.creature(EntityId(1)).unwrap().zone, ZoneKind::NoPvp);
    }

    #[test]
    fn walls_block_sight_between_endpoints() {
        let mut world = MemoryWorld::new();
        world.insert_tile(Position::new(2, 0, Z), TileFlags::BLOCK_PROJECTILE);

        let from = Position::new(0, 0, Z);
        assert!(!world.line_of_sight(from, Position::new(4, 0, Z)));
        assert!(world.line_of_sight(from, Position::new(2, 0, Z)));
        assert!(world.line_of_sight(from, Position::new(0, 4, Z)));
        assert!(!world.line_of_sight(from, Position::new(0, 0, Z + 1)));
    }

    #[test]
    fn materialize_creates_once() {
        let mut world = MemoryWorld::new();
        let at = Position::new(1, 1, Z);
        world.materialize_tile(at);
        world.materialize_tile(at);
        assert_eq!(world.events(), &[WorldEvent::TileMaterialized(at)]);
    }

    #[test]
    fn health_changes_clamp_to_meter() {
        let mut world = MemoryWorld::new();
        let id = EntityId(3);
        world.insert_creature(CreatureSnapshot::new(id, CreatureKind::Monster, Position::new(0, 0, Z)));

        let hit = CombatDamage::new(DamageKind::Fire, -150, OriginKind::Spell);
        assert!(world.change_health(Some(EntityId(9)), id, &hit));
        assert_eq!(world.creature(id).unwrap().health.current, 0);
        assert!(world.has_been_attacked(id, EntityId(9)));
        assert!(!world.change_health(None, id, &hit));
    }

    #[test]
    fn armor_halves_without_veto() {
        let mut world = MemoryWorld::new();
        let id = EntityId(4);
        world.set_block(id, BlockKind::Armor);
        let rules = BlockRules {
            by_armor: true,
            ..BlockRules::default()
        };

        let mut damage = CombatDamage::new(DamageKind::Physical, -81, OriginKind::Melee);
        assert!(!world.block_hit(&mut damage, None, id, rules));
        assert_eq!(damage.primary.value, -40);
        assert_eq!(damage.block, BlockKind::Armor);

        let mut unguarded = CombatDamage::new(DamageKind::Physical, -81, OriginKind::Melee);
        assert!(!world.block_hit(&mut unguarded, None, id, BlockRules::default()));
        assert_eq!(unguarded.block, BlockKind::None);
    }

    #[test]
    fn shield_absorbs_primary_and_vetoes_when_nothing_remains() {
        let mut world = MemoryWorld::new();
        let id = EntityId(5);
        world.set_block(id, BlockKind::Defense);
        let rules = BlockRules {
            by_shield: true,
            ..BlockRules::default()
        };

        let mut plain = CombatDamage::new(DamageKind::Physical, -60, OriginKind::Melee);
        assert!(world.block_hit(&mut plain, None, id, rules));
        assert_eq!(plain.block, BlockKind::Defense);

        let mut enchanted = CombatDamage::new(DamageKind::Physical, -60, OriginKind::Melee);
        enchanted.secondary = DamageComponent::new(DamageKind::Fire, -20);
        assert!(!world.block_hit(&mut enchanted, None, id, rules));
        assert_eq!(enchanted.primary.value, 0);
        assert_eq!(enchanted.secondary.value, -20);
        assert_eq!(enchanted.block, BlockKind::Defense);
    }
}
