//! Life and mana leech.
//!
//! A single hit returns a flat share of the damage it dealt. An area hit
//! returns a share of its strongest hit plus a bonus for every extra creature
//! struck, so wide spells do not leech once per victim.

use crate::env::CombatEnv;
use crate::state::EntityId;

use super::{CombatDamage, LeechOutcome, MagicEffect, percent_of};

/// Extra life leech per additional area target, in percent of the base.
pub const AREA_LIFE_BONUS_PERCENT: f64 = 10.0;

/// Extra mana leech per additional area target, in percent of the base.
pub const AREA_MANA_BONUS_PERCENT: f64 = 5.0;

/// `round(total * amount / 100)`.
pub fn hit_leech(total_damage: i32, amount: u16) -> i32 {
    percent_of(total_damage, f64::from(amount))
}

/// `round(base + base * extra% * (targets - 1))` with `base = max_damage * amount%`.
pub fn area_leech(max_damage: i32, targets: u32, amount: u16, extra_percent: f64) -> i32 {
    let base = f64::from(max_damage) * (f64::from(amount) / 100.0);
    let extras = base * (extra_percent / 100.0) * f64::from(targets.saturating_sub(1));
    (base + extras).round() as i32
}

/// Rolls and applies both leeches to `caster`.
///
/// Each pool is considered only while below its maximum, and each needs a
/// nonzero amount plus a successful chance roll. `life` and `mana` map the
/// leech amount skill onto the value to restore; non-positive results are
/// dropped.
pub(crate) fn apply_leech(
    env: &mut CombatEnv<'_>,
    caster: EntityId,
    life: impl Fn(u16) -> i32,
    mana: impl Fn(u16) -> i32,
) -> LeechOutcome {
    let mut outcome = LeechOutcome::default();
    let Some(snapshot) = env.world.creature(caster) else {
        return outcome;
    };
    let Some(skills) = snapshot.player.as_ref().map(|player| player.skills) else {
        return outcome;
    };

    if !snapshot.health.is_full()
        && skills.life_leech_amount > 0
        && env.rolls.normal_chance(skills.life_leech_chance)
    {
        let value = life(skills.life_leech_amount);
        if value > 0 {
            env.world.change_health(None, caster, &CombatDamage::leech(value));
            env.world.send_effect_to(caster, snapshot.position, MagicEffect::MAGIC_RED);
            outcome.life = value;
        }
    }

    if !snapshot.mana.is_full()
        && skills.mana_leech_amount > 0
        && env.rolls.normal_chance(skills.mana_leech_chance)
    {
        let value = mana(skills.mana_leech_amount);
        if value > 0 {
            env.world.change_mana(None, caster, &CombatDamage::leech(value));
            env.world.send_effect_to(caster, snapshot.position, MagicEffect::MAGIC_BLUE);
            outcome.mana = value;
        }
    }

    if outcome != LeechOutcome::default() {
        tracing::debug!(%caster, life = outcome.life, mana = outcome.mana, "leech applied");
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_leech_adds_bonus_per_extra_target() {
        assert_eq!(area_leech(2000, 10, 10, AREA_LIFE_BONUS_PERCENT), 380);
        assert_eq!(area_leech(2000, 10, 10, AREA_MANA_BONUS_PERCENT), 290);
        assert_eq!(area_leech(2000, 1, 10, AREA_LIFE_BONUS_PERCENT), 200);
        assert_eq!(area_leech(0, 5, 10, AREA_LIFE_BONUS_PERCENT), 0);
    }

    #[test]
    fn hit_leech_is_flat_share() {
        assert_eq!(hit_leech(150, 10), 15);
        assert_eq!(hit_leech(155, 10), 16);
        assert_eq!(hit_leech(150, 0), 0);
    }
}
