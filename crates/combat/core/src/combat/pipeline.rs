//! Combat definitions and single-target resolution.
//!
//! A [`Combat`] is configured once (parameters, formula, optional area) and
//! then resolved any number of times against a [`CombatEnv`]. Resolution is
//! synchronous and never rolls back: failures on one target only skip that
//! target.

use std::sync::Arc;

use crate::area::DirectionalArea;
use crate::config::CombatConfig;
use crate::env::{BlockRules, CombatEnv};
use crate::state::{CreatureSnapshot, EntityId, PlayerProfile, Position, Skull, TileFlags, TileView};

use super::area_combat::{do_area_combat, do_area_effects};
use super::leech::{apply_leech, hit_leech};
use super::{
    CallbackHandle, CombatDamage, CombatError, CombatParam, CombatParams, CombatReport, Condition, ConditionKind,
    DamageKind, DamageResolver, Eligibility, FormulaSpec, MagicEffect, OriginKind, Rejection, TargetResult,
    percent_of, resolve_field_item,
};

/// Divisor applied to strength/intelligence for single hits.
pub const TARGET_STAT_DIVISOR: f64 = 100.0;

/// Divisor applied to strength/intelligence for each area hit.
pub const AREA_STAT_DIVISOR: f64 = 230.0;

/// A configured combat action.
#[derive(Clone, Debug, Default)]
pub struct Combat {
    params: CombatParams,
    formula: FormulaSpec,
    area: Option<Arc<DirectionalArea>>,
}

impl Combat {
    pub fn new(params: CombatParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn params(&self) -> &CombatParams {
        &self.params
    }

    /// Sets a numeric parameter. `false` if the value is out of range.
    pub fn set_param(&mut self, param: CombatParam, value: u32) -> bool {
        self.params.set_param(param, value)
    }

    pub fn param(&self, param: CombatParam) -> i32 {
        self.params.param(param)
    }

    /// Reads a parameter by its raw id; unknown ids read as `i32::MAX`.
    pub fn param_raw(&self, raw: u32) -> i32 {
        self.params.param_raw(raw)
    }

    /// Installs a scripted hook, replacing any hook of the same role.
    pub fn set_callback(&mut self, handle: CallbackHandle) {
        self.params.callbacks.set(handle);
    }

    pub fn set_formula(&mut self, formula: FormulaSpec) {
        self.formula = formula;
    }

    pub fn formula(&self) -> &FormulaSpec {
        &self.formula
    }

    pub fn set_area(&mut self, area: Option<Arc<DirectionalArea>>) {
        self.area = area;
    }

    pub fn area(&self) -> Option<&DirectionalArea> {
        self.area.as_deref()
    }

    /// Appends a condition applied to every affected creature.
    ///
    /// # Errors
    ///
    /// Returns `CombatError::TooManyConditions` once the combat carries
    /// `CombatConfig::MAX_CONDITIONS` conditions.
    pub fn add_condition(&mut self, condition: Condition) -> Result<(), CombatError> {
        self.params
            .conditions
            .try_push(condition)
            .map_err(|_| CombatError::TooManyConditions {
                max: CombatConfig::MAX_CONDITIONS,
            })
    }

    /// Resolves the combat against a single creature.
    ///
    /// # Errors
    ///
    /// Returns `CombatError::Oracle` when the caster or target is unknown to
    /// the world. Eligibility failures are reported per target instead.
    pub fn do_combat_target(
        &self,
        env: &mut CombatEnv<'_>,
        caster: Option<EntityId>,
        target: EntityId,
    ) -> Result<CombatReport, CombatError> {
        let caster = caster.map(|id| env.creature(id)).transpose()?;
        let target = env.creature(target)?;
        let caster = caster.as_ref();
        tracing::debug!(
            caster = ?caster.map(|c| c.id),
            target = %target.id,
            combat_type = %self.params.combat_type,
            "resolving target combat"
        );

        if self.params.combat_type == DamageKind::None {
            return Ok(do_target_effects(env, &self.params, caster, &target));
        }

        let damage = self.resolve_damage(env, caster, Some(&target));
        let mut report = CombatReport {
            base_damage: damage,
            tiles: vec![target.position],
            ..CombatReport::default()
        };

        let is_self = caster.is_some_and(|c| c.id == target.id);
        let verdict = if !self.params.aggressive {
            Ok(())
        } else if is_self {
            Err(None)
        } else {
            entity_check(env, caster, &target).map_err(Some)
        };

        if is_self || verdict.is_ok() {
            play_impact(env, &self.params, target.position);
        }

        match verdict {
            Ok(()) => do_target_combat(env, &self.params, caster, &target, damage, &mut report),
            Err(None) => report.push(target.id, TargetResult::SelfTarget),
            Err(Some(reason)) => report.push(target.id, TargetResult::Rejected(reason)),
        }
        Ok(report)
    }

    /// Resolves the combat around `position`, shaped by the configured area.
    ///
    /// # Errors
    ///
    /// Returns `CombatError::AreaNotConfigured` when the area has no shape
    /// for the caster's facing, and `CombatError::Oracle` for an unknown
    /// caster.
    pub fn do_combat_area(
        &self,
        env: &mut CombatEnv<'_>,
        caster: Option<EntityId>,
        position: Position,
    ) -> Result<CombatReport, CombatError> {
        let caster = caster.map(|id| env.creature(id)).transpose()?;
        let caster = caster.as_ref();
        tracing::debug!(
            caster = ?caster.map(|c| c.id),
            %position,
            combat_type = %self.params.combat_type,
            "resolving area combat"
        );

        let result = if self.params.combat_type == DamageKind::None {
            do_area_effects(env, &self.params, caster, position, self.area())
        } else {
            let damage = self.resolve_damage(env, caster, None);
            do_area_combat(env, &self.params, caster, position, self.area(), damage)
        };

        if let Err(CombatError::AreaNotConfigured(direction)) = &result {
            tracing::error!(%direction, %position, "area has no shape for this direction");
        }
        result
    }

    fn resolve_damage(
        &self,
        env: &mut CombatEnv<'_>,
        caster: Option<&CreatureSnapshot>,
        target: Option<&CreatureSnapshot>,
    ) -> CombatDamage {
        let resolver = DamageResolver {
            formula: &self.formula,
            params: &self.params,
            weapons: &*env.world,
            scripts: env.scripts,
        };
        let damage = resolver.resolve(&mut env.rolls, caster, target);
        tracing::trace!(primary = damage.primary.value, secondary = damage.secondary.value, "damage rolled");
        damage
    }
}

/// Applies an already rolled `damage` to one creature.
///
/// Eligibility is the caller's concern. Results land in `report`.
pub fn do_target_combat(
    env: &mut CombatEnv<'_>,
    params: &CombatParams,
    caster: Option<&CreatureSnapshot>,
    target: &CreatureSnapshot,
    mut damage: CombatDamage,
    report: &mut CombatReport,
) {
    play_distance(env, params, caster, target.position);

    let caster_id = caster.map(|c| c.id);
    let caster_player = caster.filter(|c| c.is_player());

    let success = if damage.primary.kind != DamageKind::ManaDrain {
        if let Some(profile) = caster_player.and_then(|c| c.player.as_ref()) {
            scale_by_stats(&mut damage, profile, TARGET_STAT_DIVISOR);
        }

        if env.world.block_hit(&mut damage, caster_id, target.id, block_rules(params)) {
            report.push(target.id, TargetResult::Blocked { block: damage.block });
            return;
        }

        if let Some(attacker) = caster_player {
            if !damage.is_healing() && pvp_halving_applies(attacker, target) {
                halve(&mut damage);
            }
            if let Some(profile) = &attacker.player {
                roll_critical(env, profile, &mut damage);
            }
        }

        env.world.change_health(caster_id, target.id, &damage)
    } else {
        env.world.change_mana(caster_id, target.id, &damage)
    };

    if success {
        if damage.block.lets_conditions_through() {
            apply_conditions(env, params, caster, target);
        }
        if damage.critical {
            env.world.play_effect(target.position, MagicEffect::CRITICAL_DAMAGE);
        }
        if let Some(attacker) = caster_player {
            if attacker.id != target.id
                && !damage.leeched
                && !damage.is_healing()
                && damage.origin != OriginKind::Condition
            {
                let total = damage.total_magnitude();
                report.leech = apply_leech(
                    env,
                    attacker.id,
                    |amount| hit_leech(total, amount),
                    |amount| hit_leech(total, amount),
                );
            }
        }
        dispel(env, params, target.id);
        report.push(target.id, TargetResult::Applied { damage });
    } else {
        report.push(target.id, TargetResult::Unchanged);
    }

    run_target_hook(env, params, caster, target);
}

/// Single-target path for combats that carry no damage.
fn do_target_effects(
    env: &mut CombatEnv<'_>,
    params: &CombatParams,
    caster: Option<&CreatureSnapshot>,
    target: &CreatureSnapshot,
) -> CombatReport {
    let mut report = CombatReport {
        tiles: vec![target.position],
        ..CombatReport::default()
    };

    if params.aggressive {
        if caster.is_some_and(|c| c.id == target.id) {
            report.push(target.id, TargetResult::SelfTarget);
            return report;
        }
        if let Err(reason) = entity_check(env, caster, target) {
            report.push(target.id, TargetResult::Rejected(reason));
            return report;
        }
    }

    if params.origin != OriginKind::Melee {
        apply_conditions(env, params, caster, target);
    }
    dispel(env, params, target.id);

    let tile = env.world.materialize_tile(target.position);
    let spectators = env
        .world
        .spectators(target.position, env.config.viewport_x, env.config.viewport_y);
    tile_effects(env, params, caster, &tile, &spectators);

    run_target_hook(env, params, caster, target);
    play_distance(env, params, caster, target.position);

    report.push(target.id, TargetResult::Affected);
    report
}

pub(super) fn entity_check(
    env: &CombatEnv<'_>,
    caster: Option<&CreatureSnapshot>,
    target: &CreatureSnapshot,
) -> Result<(), Rejection> {
    Eligibility::new(&*env.world, env.policy, env.config).can_affect_entity(caster, target)
}

pub(super) fn location_check(
    env: &CombatEnv<'_>,
    caster: Option<&CreatureSnapshot>,
    tile: &TileView,
    aggressive: bool,
) -> Result<(), Rejection> {
    Eligibility::new(&*env.world, env.policy, env.config).can_affect_location(caster, tile, aggressive)
}

pub(super) fn block_rules(params: &CombatParams) -> BlockRules {
    BlockRules {
        by_shield: params.blocked_by_shield,
        by_armor: params.blocked_by_armor,
        has_field: params.field_item_id != 0,
        ignore_resistances: params.ignore_resistances,
    }
}

/// Strength boosts physical components, intelligence everything else.
pub fn scale_by_stats(damage: &mut CombatDamage, player: &PlayerProfile, divisor: f64) {
    for component in damage.components_mut() {
        let stat = if component.kind == DamageKind::Physical {
            player.strength
        } else {
            player.intelligence
        };
        if stat != 0 {
            component.value += (f64::from(component.value) * f64::from(stat) / divisor).round() as i32;
        }
    }
}

/// Player-versus-player damage is halved unless the victim carries a black skull.
pub(super) fn pvp_halving_applies(attacker: &CreatureSnapshot, target: &CreatureSnapshot) -> bool {
    attacker.is_player()
        && target.id != attacker.id
        && target.player.as_ref().is_some_and(|player| player.skull != Skull::Black)
}

pub(super) fn halve(damage: &mut CombatDamage) {
    for component in damage.components_mut() {
        component.value /= 2;
    }
}

fn roll_critical(env: &mut CombatEnv<'_>, profile: &PlayerProfile, damage: &mut CombatDamage) {
    if damage.critical || damage.is_healing() || damage.origin == OriginKind::Condition {
        return;
    }
    let skills = profile.skills;
    if skills.critical_amount > 0 && env.rolls.chance(skills.critical_chance) {
        for component in damage.components_mut() {
            component.value += percent_of(component.value, f64::from(skills.critical_amount));
        }
        damage.critical = true;
    }
}

/// Attaches every configured condition, owned by the caster.
///
/// Immunities are ignored when a creature conditions itself.
pub(super) fn apply_conditions(
    env: &mut CombatEnv<'_>,
    params: &CombatParams,
    caster: Option<&CreatureSnapshot>,
    target: &CreatureSnapshot,
) {
    let owner = caster.map(|c| c.id);
    let self_cast = owner == Some(target.id);
    for condition in &params.conditions {
        if self_cast || !target.is_immune(condition.kind) {
            env.world.add_combat_condition(target.id, condition.with_owner(owner));
        }
    }
}

pub(super) fn dispel(env: &mut CombatEnv<'_>, params: &CombatParams, target: EntityId) {
    match params.dispel_type {
        ConditionKind::None => {}
        ConditionKind::Paralyze => env.world.remove_condition(target, ConditionKind::Paralyze),
        kind => env.world.remove_combat_condition(target, kind),
    }
}

/// Field placement, tile hook and impact visual for one location.
pub(super) fn tile_effects(
    env: &mut CombatEnv<'_>,
    params: &CombatParams,
    caster: Option<&CreatureSnapshot>,
    tile: &TileView,
    spectators: &[EntityId],
) {
    if params.field_item_id != 0 {
        let controller = caster.and_then(|c| Eligibility::new(&*env.world, env.policy, env.config).controlling_player(c));
        let no_pvp_context = env.config.is_no_pvp_world() || tile.has_flag(TileFlags::NO_PVP_ZONE);
        let placement = resolve_field_item(params.field_item_id, controller.is_some(), no_pvp_context);
        if placement.marks_in_fight {
            if let Some(player) = &controller {
                env.world.add_in_fight_ticks(player.id);
            }
        }
        if let Err(reason) = env.world.place_field(tile.position, placement.item_id, caster.map(|c| c.id)) {
            tracing::debug!(position = %tile.position, item_id = placement.item_id, %reason, "field not placed");
        }
    }

    if let Some(hook) = &params.callbacks.tile {
        let position = tile.position;
        env.scripts.invoke("tile", || hook.on_tile(caster, position));
    }

    if !params.impact_effect.is_none() {
        env.world.play_effect_for(spectators, tile.position, params.impact_effect);
    }
}

pub(super) fn run_target_hook(
    env: &CombatEnv<'_>,
    params: &CombatParams,
    caster: Option<&CreatureSnapshot>,
    target: &CreatureSnapshot,
) {
    if let Some(hook) = &params.callbacks.target {
        env.scripts.invoke("target", || hook.on_target(caster, target));
    }
}

pub(super) fn play_distance(
    env: &mut CombatEnv<'_>,
    params: &CombatParams,
    caster: Option<&CreatureSnapshot>,
    to: Position,
) {
    let Some(caster) = caster else {
        return;
    };
    let effect = params.distance_effect.resolve(Some(caster));
    if !effect.is_none() {
        env.world.play_distance_effect(caster.position, to, effect);
    }
}

fn play_impact(env: &mut CombatEnv<'_>, params: &CombatParams, at: Position) {
    if !params.impact_effect.is_none() {
        env.world.play_effect(at, params.impact_effect);
    }
}
