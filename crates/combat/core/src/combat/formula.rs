//! Base damage computation.

use crate::env::{RollStream, WeaponOracle};
use crate::state::CreatureSnapshot;

use super::{
    CombatDamage, CombatParams, FormulaKind, FormulaSpec, ScriptStack, ValueHookKind, ValueInput,
};

/// Attack value handed to skill hooks when the player holds no weapon.
const UNARMED_ATTACK: i32 = 7;

/// Produces the raw primary/secondary damage of one resolution.
///
/// Coefficients are turned into integers by truncation toward zero after a
/// fused multiply-add; the final value is a bell-curve sample between the
/// resulting bounds.
pub struct DamageResolver<'a, W: WeaponOracle + ?Sized> {
    pub formula: &'a FormulaSpec,
    pub params: &'a CombatParams,
    pub weapons: &'a W,
    pub scripts: &'a ScriptStack,
}

impl<W: WeaponOracle + ?Sized> DamageResolver<'_, W> {
    pub fn resolve(
        &self,
        rolls: &mut RollStream<'_>,
        caster: Option<&CreatureSnapshot>,
        target: Option<&CreatureSnapshot>,
    ) -> CombatDamage {
        let mut damage = CombatDamage::new(self.params.combat_type, 0, self.params.origin);
        let formula = self.formula;

        if formula.kind == FormulaKind::FixedRange {
            damage.primary.value = rolls.normal(formula.a1 as i32, formula.a2 as i32);
            return damage;
        }

        let Some(caster) = caster else {
            return damage;
        };

        if let Some((min, max)) = caster.combat_values {
            damage.primary.value = rolls.normal(min, max);
            return damage;
        }

        let Some(player) = &caster.player else {
            return damage;
        };

        if let Some((hook_kind, hook)) = &self.params.callbacks.value {
            let mut element = None;
            let input = match hook_kind {
                ValueHookKind::LevelMagic => ValueInput::LevelMagic {
                    level: player.level,
                    magic_level: player.magic_level,
                },
                ValueHookKind::Skill => {
                    let (skill, attack) = match player.weapon {
                        Some(weapon) => (weapon.skill, weapon.attack + weapon.ammo_attack.unwrap_or(0)),
                        None => (player.fist_skill, UNARMED_ATTACK),
                    };
                    element = self.weapons.weapon_damage(caster.id, None).map(|weapon| weapon.element);
                    ValueInput::Skill {
                        skill,
                        attack,
                        attack_factor: player.attack_factor,
                    }
                }
            };

            // A skipped or failed hook leaves both components at zero.
            if let Some((min, max)) = self.scripts.invoke("value", || hook.min_max(caster, input)) {
                damage.primary.value = rolls.normal(min, max);
                if let Some(element) = element {
                    damage.secondary = element;
                }
            }
            return damage;
        }

        match formula.kind {
            FormulaKind::LevelMagic => {
                let level = f64::from(player.level).mul_add(2.0, f64::from(player.magic_level) * 3.0);
                let min = level.mul_add(formula.a1, formula.b1) as i32;
                let max = level.mul_add(formula.a2, formula.b2) as i32;
                damage.primary.value = rolls.normal(min, max);
            }
            FormulaKind::WeaponSkill => {
                match self.weapons.weapon_damage(caster.id, target.map(|target| target.id)) {
                    Some(weapon) => {
                        let max = f64::from(weapon.max).mul_add(formula.a2, formula.b2) as i32;
                        damage.primary.value = rolls.normal(formula.b1 as i32, max);
                        damage.secondary = weapon.element;
                    }
                    None => {
                        damage.primary.value = rolls.normal(formula.b1 as i32, formula.b2 as i32);
                    }
                }
            }
            FormulaKind::FixedRange | FormulaKind::External => {}
        }

        damage
    }
}
