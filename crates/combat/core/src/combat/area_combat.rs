//! Multi-target resolution over a projected area.

use crate::area::{DirectionalArea, project_area};
use crate::env::CombatEnv;
use crate::state::{CreatureSnapshot, EntityId, Position, TileView};

use super::leech::{AREA_LIFE_BONUS_PERCENT, AREA_MANA_BONUS_PERCENT, apply_leech, area_leech};
use super::pipeline::{
    AREA_STAT_DIVISOR, apply_conditions, block_rules, dispel, entity_check, halve, location_check, play_distance,
    pvp_halving_applies, run_target_hook, scale_by_stats, tile_effects,
};
use super::{
    CombatDamage, CombatError, CombatParams, CombatReport, DamageKind, MagicEffect, OriginKind, TargetResult,
    percent_of,
};

/// Applies an already rolled `damage` to every eligible creature in the area.
///
/// The critical roll happens once for the whole area; leech is computed once
/// from the strongest hit after every creature has been processed.
///
/// # Errors
///
/// Returns `CombatError::AreaNotConfigured` when `area` has no shape for the
/// direction from the caster to `position`.
pub fn do_area_combat(
    env: &mut CombatEnv<'_>,
    params: &CombatParams,
    caster: Option<&CreatureSnapshot>,
    position: Position,
    area: Option<&DirectionalArea>,
    mut damage: CombatDamage,
) -> Result<CombatReport, CombatError> {
    let tiles = project(env, caster, position, area)?;
    let caster_player = caster.filter(|c| c.is_player());
    let caster_id = caster.map(|c| c.id);

    let mut critical_bonus = (0, 0);
    if let Some(profile) = caster_player.and_then(|c| c.player.as_ref()) {
        let skills = profile.skills;
        if !damage.critical
            && !damage.is_healing()
            && damage.origin != OriginKind::Condition
            && skills.critical_amount > 0
            && env.rolls.chance(skills.critical_chance)
        {
            let amount = f64::from(skills.critical_amount);
            critical_bonus = (
                percent_of(damage.primary.value, amount),
                percent_of(damage.secondary.value, amount),
            );
            damage.critical = true;
        }
    }

    let mut report = CombatReport {
        base_damage: damage,
        tiles: tiles.iter().map(|tile| tile.position).collect(),
        ..CombatReport::default()
    };

    let spectators = spectators_for(env, position, &tiles);
    play_distance(env, params, caster, position);
    let targets = collect_targets(env, params, caster, &tiles, &spectators, &mut report);

    let rules = block_rules(params);
    let mut max_damage_found = 0;
    let mut total_targets = 0u32;

    for target in targets {
        let mut hit = damage;
        if let Some(profile) = caster_player.and_then(|c| c.player.as_ref()) {
            scale_by_stats(&mut hit, profile, AREA_STAT_DIVISOR);
        }

        let halved = hit.is_harmful() && caster.is_some_and(|attacker| pvp_halving_applies(attacker, &target));
        if halved {
            halve(&mut hit);
        }

        if hit.critical {
            let (primary, secondary) = critical_bonus;
            let divisor = if halved { 2 } else { 1 };
            hit.primary.value += primary / divisor;
            hit.secondary.value += secondary / divisor;
            env.world.play_effect(target.position, MagicEffect::CRITICAL_DAMAGE);
        }

        let success = if hit.primary.kind != DamageKind::ManaDrain {
            if env.world.block_hit(&mut hit, caster_id, target.id, rules) {
                report.push(target.id, TargetResult::Blocked { block: hit.block });
                continue;
            }
            env.world.change_health(caster_id, target.id, &hit)
        } else {
            env.world.change_mana(caster_id, target.id, &hit)
        };

        if !success {
            report.push(target.id, TargetResult::Unchanged);
            continue;
        }

        max_damage_found = max_damage_found.max(hit.total_magnitude());
        total_targets += 1;

        if hit.block.lets_conditions_through() {
            apply_conditions(env, params, caster, &target);
        }
        dispel(env, params, target.id);
        run_target_hook(env, params, caster, &target);
        report.push(target.id, TargetResult::Applied { damage: hit });
    }

    if let Some(attacker) = caster_player {
        if !damage.leeched
            && !damage.is_healing()
            && damage.origin != OriginKind::Condition
            && total_targets > 0
            && max_damage_found > 0
        {
            report.leech = apply_leech(
                env,
                attacker.id,
                |amount| area_leech(max_damage_found, total_targets, amount, AREA_LIFE_BONUS_PERCENT),
                |amount| area_leech(max_damage_found, total_targets, amount, AREA_MANA_BONUS_PERCENT),
            );
        }
    }

    tracing::debug!(tiles = report.tiles.len(), hits = total_targets, "area combat resolved");
    Ok(report)
}

/// Area path for combats that carry no damage: fields, conditions, dispel
/// and hooks only.
///
/// # Errors
///
/// Same as [`do_area_combat`].
pub fn do_area_effects(
    env: &mut CombatEnv<'_>,
    params: &CombatParams,
    caster: Option<&CreatureSnapshot>,
    position: Position,
    area: Option<&DirectionalArea>,
) -> Result<CombatReport, CombatError> {
    let tiles = project(env, caster, position, area)?;
    let mut report = CombatReport {
        tiles: tiles.iter().map(|tile| tile.position).collect(),
        ..CombatReport::default()
    };

    let spectators = spectators_for(env, position, &tiles);
    play_distance(env, params, caster, position);

    for tile in &tiles {
        if let Err(reason) = location_check(env, caster, tile, params.aggressive) {
            report.skipped_tiles.push((tile.position, reason));
            continue;
        }
        tile_effects(env, params, caster, tile, &spectators);

        for id in candidates(params, caster, tile) {
            let Some(target) = env.world.creature(id) else {
                continue;
            };
            if params.aggressive {
                if caster_id_matches(caster, id) {
                    report.push(id, TargetResult::SelfTarget);
                    continue;
                }
                if let Err(reason) = entity_check(env, caster, &target) {
                    report.push(id, TargetResult::Rejected(reason));
                    continue;
                }
            }
            apply_conditions(env, params, caster, &target);
            dispel(env, params, id);
            run_target_hook(env, params, caster, &target);
            report.push(id, TargetResult::Affected);

            if params.target_caster_or_topmost {
                break;
            }
        }
    }

    Ok(report)
}

fn project(
    env: &mut CombatEnv<'_>,
    caster: Option<&CreatureSnapshot>,
    position: Position,
    area: Option<&DirectionalArea>,
) -> Result<Vec<TileView>, CombatError> {
    let reference = caster.map_or(position, |c| c.position);
    let tiles = project_area(&mut *env.world, env.config, reference, position, area)?;
    tracing::debug!(%position, count = tiles.len(), "area projected");
    Ok(tiles)
}

/// Everyone who can see any projected tile.
fn spectators_for(env: &CombatEnv<'_>, center: Position, tiles: &[TileView]) -> Vec<EntityId> {
    let (reach_x, reach_y) = tiles.iter().fold((0, 0), |(x, y), tile| {
        (x.max(tile.position.distance_x(center)), y.max(tile.position.distance_y(center)))
    });
    env.world
        .spectators(center, reach_x + env.config.viewport_x, reach_y + env.config.viewport_y)
}

/// Visits eligible tiles, fires their effects and gathers creatures to hit.
fn collect_targets(
    env: &mut CombatEnv<'_>,
    params: &CombatParams,
    caster: Option<&CreatureSnapshot>,
    tiles: &[TileView],
    spectators: &[EntityId],
    report: &mut CombatReport,
) -> Vec<CreatureSnapshot> {
    let mut targets = Vec::new();
    for tile in tiles {
        if let Err(reason) = location_check(env, caster, tile, params.aggressive) {
            report.skipped_tiles.push((tile.position, reason));
            continue;
        }
        tile_effects(env, params, caster, tile, spectators);

        for id in candidates(params, caster, tile) {
            let Some(target) = env.world.creature(id) else {
                continue;
            };
            if params.aggressive {
                if caster_id_matches(caster, id) {
                    report.push(id, TargetResult::SelfTarget);
                    continue;
                }
                if let Err(reason) = entity_check(env, caster, &target) {
                    report.push(id, TargetResult::Rejected(reason));
                    continue;
                }
            }
            targets.push(target);
            if params.target_caster_or_topmost {
                break;
            }
        }
    }
    targets
}

/// With `target_caster_or_topmost`, only the caster (on its own tile) or the
/// topmost creature is a candidate.
fn candidates(params: &CombatParams, caster: Option<&CreatureSnapshot>, tile: &TileView) -> Vec<EntityId> {
    if !params.target_caster_or_topmost {
        return tile.creatures.clone();
    }
    match caster {
        Some(caster) if caster.position == tile.position => {
            tile.creatures.iter().copied().filter(|id| *id == caster.id).collect()
        }
        _ => tile.top_creature().into_iter().collect(),
    }
}

fn caster_id_matches(caster: Option<&CreatureSnapshot>, id: EntityId) -> bool {
    caster.is_some_and(|c| c.id == id)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::combat::{BlockKind, Combat, Condition, ConditionKind, DamageComponent, FormulaSpec, ScriptStack, field};
    use crate::config::CombatConfig;
    use crate::env::{AllowAll, MemoryWorld, RngOracle, RollStream};
    use crate::state::{CreatureKind, PlayerProfile, ResourceMeter, TileFlags};

    struct Zero;

    impl RngOracle for Zero {
        fn next_u32(&self, _seed: u64) -> u32 {
            0
        }
    }

    fn run<R>(world: &mut MemoryWorld, f: impl FnOnce(&mut CombatEnv<'_>) -> R) -> R {
        let config = CombatConfig::default();
        let scripts = ScriptStack::new(config.script_stack_depth);
        let mut env = CombatEnv::new(world, &AllowAll, &config, RollStream::new(&Zero, 0), &scripts);
        f(&mut env)
    }

    fn monster(id: u32, at: Position) -> CreatureSnapshot {
        let mut creature = CreatureSnapshot::new(EntityId(id), CreatureKind::Monster, at);
        creature.health = ResourceMeter::full(300);
        creature
    }

    fn druid(id: u32, at: Position) -> CreatureSnapshot {
        let mut creature = CreatureSnapshot::new(EntityId(id), CreatureKind::Player, at);
        creature.player = Some(PlayerProfile::new(80, 40));
        creature.health = ResourceMeter::full(600);
        creature
    }

    fn square_area() -> Arc<DirectionalArea> {
        Arc::new(DirectionalArea::from_template(&[1, 1, 1, 1, 3, 1, 1, 1, 1], 3).unwrap())
    }

    fn burst(field_item_id: u16) -> Combat {
        let mut combat = Combat::new(CombatParams {
            combat_type: DamageKind::Energy,
            impact_effect: MagicEffect::ENERGY_HIT,
            field_item_id,
            ..CombatParams::default()
        });
        combat.set_formula(FormulaSpec::fixed(-40.0, -40.0));
        combat.set_area(Some(square_area()));
        combat
    }

    #[test]
    fn burst_hits_every_creature_in_range() {
        let mut world = MemoryWorld::new();
        world.insert_creature(druid(1, Position::new(5, 5, 7)));
        world.insert_creature(monster(2, Position::new(9, 9, 7)));
        world.insert_creature(monster(3, Position::new(10, 9, 7)));
        world.insert_creature(monster(4, Position::new(12, 9, 7)));

        let report = run(&mut world, |env| burst(0).do_combat_area(env, Some(EntityId(1)), Position::new(10, 10, 7)))
            .unwrap();

        assert_eq!(report.tiles.len(), 9);
        assert_eq!(report.applied_count(), 2);
        assert_eq!(world.health_of(EntityId(2)), Some(260));
        assert_eq!(world.health_of(EntityId(3)), Some(260));
        assert_eq!(world.health_of(EntityId(4)), Some(300));
    }

    #[test]
    fn protection_zone_tiles_are_skipped() {
        let mut world = MemoryWorld::new();
        world.insert_tile(Position::new(9, 9, 7), TileFlags::PROTECTION_ZONE);
        world.insert_creature(monster(2, Position::new(9, 9, 7)));

        let report = run(&mut world, |env| burst(0).do_combat_area(env, None, Position::new(10, 10, 7))).unwrap();

        assert_eq!(report.applied_count(), 0);
        assert!(report.skipped_tiles.iter().any(|(position, _)| *position == Position::new(9, 9, 7)));
    }

    #[test]
    fn player_fields_turn_harmless_in_no_pvp_zone() {
        let mut world = MemoryWorld::new();
        world.insert_creature(druid(1, Position::new(5, 5, 7)));
        world.insert_tile(Position::new(10, 10, 7), TileFlags::NO_PVP_ZONE);

        run(&mut world, |env| {
            burst(field::items::ENERGYFIELD_PVP).do_combat_area(env, Some(EntityId(1)), Position::new(10, 10, 7))
        })
        .unwrap();

        assert_eq!(world.fields_at(Position::new(10, 10, 7))[0].item_id, field::items::ENERGYFIELD_NOPVP);
        assert_eq!(world.fields_at(Position::new(9, 9, 7))[0].item_id, field::items::ENERGYFIELD_PVP);
        assert_eq!(world.fields_at(Position::new(9, 9, 7))[0].owner, Some(EntityId(1)));
        assert_eq!(world.in_fight_ticks(EntityId(1)), 8);
    }

    #[test]
    fn effect_only_area_stops_at_topmost() {
        let mut world = MemoryWorld::new();
        world.insert_creature(monster(2, Position::new(10, 10, 7)));
        world.insert_creature(monster(3, Position::new(10, 10, 7)));
        let mut combat = Combat::new(CombatParams {
            target_caster_or_topmost: true,
            ..CombatParams::default()
        });
        combat
            .add_condition(Condition::new(ConditionKind::Paralyze, 2000, -300))
            .unwrap();

        let report = run(&mut world, |env| combat.do_combat_area(env, None, Position::new(10, 10, 7))).unwrap();

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcome_for(EntityId(3)), Some(&TargetResult::Affected));
        assert_eq!(world.conditions_of(EntityId(3)).len(), 1);
        assert!(world.conditions_of(EntityId(2)).is_empty());
    }

    #[test]
    fn area_critical_rolls_once_and_scales_per_target() {
        let mut world = MemoryWorld::new();
        let mut caster = druid(1, Position::new(5, 5, 7));
        if let Some(profile) = caster.player.as_mut() {
            profile.intelligence = 23;
            profile.skills.critical_chance = 100;
            profile.skills.critical_amount = 50;
        }
        world.insert_creature(caster.clone());
        world.insert_creature(monster(2, Position::new(9, 9, 7)));
        world.insert_creature(druid(3, Position::new(10, 9, 7)));
        world.insert_creature(monster(4, Position::new(11, 11, 7)));
        world.set_block(EntityId(4), BlockKind::Defense);

        let mut params = CombatParams {
            combat_type: DamageKind::Energy,
            blocked_by_shield: true,
            ..CombatParams::default()
        };
        params.conditions.push(Condition::new(ConditionKind::Paralyze, 2000, -300));
        let mut damage = CombatDamage::new(DamageKind::Energy, -40, OriginKind::Spell);
        damage.secondary = DamageComponent::new(DamageKind::Fire, -20);

        let area = square_area();
        let (report, draws) = run(&mut world, |env| {
            let report = do_area_combat(env, &params, Some(&caster), Position::new(10, 10, 7), Some(&*area), damage);
            (report, env.rolls.draws())
        });
        let report = report.unwrap();

        assert_eq!(draws, 1);
        assert!(report.base_damage.critical);
        assert_eq!(report.applied_count(), 3);

        // -40 scales to -44 and -20 to -22; the critical adds -20 and -10.
        assert_eq!(world.health_of(EntityId(2)), Some(300 - 64 - 32));
        // Halved for player versus player, critical included.
        assert_eq!(world.health_of(EntityId(3)), Some(600 - 32 - 16));
        // The shield takes the primary component, the element gets through.
        assert_eq!(world.health_of(EntityId(4)), Some(300 - 32));

        assert_eq!(world.conditions_of(EntityId(2)).len(), 1);
        assert_eq!(world.conditions_of(EntityId(3)).len(), 1);
        assert!(world.conditions_of(EntityId(4)).is_empty());

        for at in [Position::new(9, 9, 7), Position::new(10, 9, 7), Position::new(11, 11, 7)] {
            let criticals = world
                .effects_at(at)
                .into_iter()
                .filter(|effect| *effect == MagicEffect::CRITICAL_DAMAGE)
                .count();
            assert_eq!(criticals, 1, "critical visual at {at}");
        }
        assert!(!world.effects_at(Position::new(10, 10, 7)).contains(&MagicEffect::CRITICAL_DAMAGE));
    }
}
