//! Combat definition parameters and the option/value surface scripts use to set them.

use arrayvec::ArrayVec;

use crate::config::CombatConfig;

use super::{
    CombatCallbacks, Condition, ConditionKind, DamageKind, DistanceEffect, MagicEffect, OriginKind,
};

/// Shared, read-only description of what a combat does.
#[derive(Clone, Debug)]
pub struct CombatParams {
    pub combat_type: DamageKind,
    pub impact_effect: MagicEffect,
    pub distance_effect: DistanceEffect,
    pub blocked_by_armor: bool,
    pub blocked_by_shield: bool,
    /// Only the caster (on its own tile) or the top-most creature is affected per tile.
    pub target_caster_or_topmost: bool,
    /// Ground field placed on every affected location; `0` for none.
    pub field_item_id: u16,
    pub aggressive: bool,
    pub dispel_type: ConditionKind,
    pub use_charges: bool,
    pub ignore_resistances: bool,
    pub origin: OriginKind,
    pub conditions: ArrayVec<Condition, { CombatConfig::MAX_CONDITIONS }>,
    pub callbacks: CombatCallbacks,
}

impl Default for CombatParams {
    fn default() -> Self {
        Self {
            combat_type: DamageKind::None,
            impact_effect: MagicEffect::NONE,
            distance_effect: DistanceEffect::NONE,
            blocked_by_armor: false,
            blocked_by_shield: false,
            target_caster_or_topmost: false,
            field_item_id: 0,
            aggressive: true,
            dispel_type: ConditionKind::None,
            use_charges: false,
            ignore_resistances: false,
            origin: OriginKind::Spell,
            conditions: ArrayVec::new(),
            callbacks: CombatCallbacks::default(),
        }
    }
}

/// Integer-addressable combat options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum CombatParam {
    Type = 1,
    Effect = 2,
    DistanceEffect = 3,
    BlockShield = 4,
    BlockArmor = 5,
    TargetCasterOrTopmost = 6,
    CreateItem = 7,
    Aggressive = 8,
    Dispel = 9,
    UseCharges = 10,
}

impl CombatParam {
    pub fn from_raw(raw: u32) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().find(|param| *param as u32 == raw)
    }
}

impl CombatParams {
    /// Sets one option from its integer encoding.
    ///
    /// Returns `false` when the value does not name a known damage or
    /// condition kind; the option is left unchanged.
    pub fn set_param(&mut self, param: CombatParam, value: u32) -> bool {
        match param {
            CombatParam::Type => match DamageKind::from_raw(value) {
                Some(kind) => self.combat_type = kind,
                None => return false,
            },
            CombatParam::Effect => self.impact_effect = MagicEffect(value as u16),
            CombatParam::DistanceEffect => self.distance_effect = DistanceEffect(value as u8),
            CombatParam::BlockShield => self.blocked_by_shield = value != 0,
            CombatParam::BlockArmor => self.blocked_by_armor = value != 0,
            CombatParam::TargetCasterOrTopmost => self.target_caster_or_topmost = value != 0,
            CombatParam::CreateItem => self.field_item_id = value as u16,
            CombatParam::Aggressive => self.aggressive = value != 0,
            CombatParam::Dispel => match ConditionKind::from_raw(value) {
                Some(kind) => self.dispel_type = kind,
                None => return false,
            },
            CombatParam::UseCharges => self.use_charges = value != 0,
        }
        true
    }

    pub fn param(&self, param: CombatParam) -> i32 {
        match param {
            CombatParam::Type => self.combat_type.raw() as i32,
            CombatParam::Effect => i32::from(self.impact_effect.0),
            CombatParam::DistanceEffect => i32::from(self.distance_effect.0),
            CombatParam::BlockShield => i32::from(self.blocked_by_shield),
            CombatParam::BlockArmor => i32::from(self.blocked_by_armor),
            CombatParam::TargetCasterOrTopmost => i32::from(self.target_caster_or_topmost),
            CombatParam::CreateItem => i32::from(self.field_item_id),
            CombatParam::Aggressive => i32::from(self.aggressive),
            CombatParam::Dispel => self.dispel_type.raw() as i32,
            CombatParam::UseCharges => i32::from(self.use_charges),
        }
    }

    /// Reads an option by raw id; unknown ids yield `i32::MAX`.
    pub fn param_raw(&self, raw: u32) -> i32 {
        CombatParam::from_raw(raw).map_or(i32::MAX, |param| self.param(param))
    }
}

// ============================================================================
// Formula
// ============================================================================

/// How the base magnitude of a hit is computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum FormulaKind {
    /// No built-in formula: only creature combat values or a value hook apply.
    #[default]
    External,
    /// Normal sample in `[a1, a2]`.
    FixedRange,
    /// `level * 2 + magic_level * 3` scaled by the coefficients.
    LevelMagic,
    /// Equipped weapon damage scaled by the coefficients.
    WeaponSkill,
}

/// Formula kind plus its four coefficients (`a1`/`b1` bound the minimum, `a2`/`b2` the maximum).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormulaSpec {
    pub kind: FormulaKind,
    pub a1: f64,
    pub b1: f64,
    pub a2: f64,
    pub b2: f64,
}

impl FormulaSpec {
    pub const fn new(kind: FormulaKind, a1: f64, b1: f64, a2: f64, b2: f64) -> Self {
        Self { kind, a1, b1, a2, b2 }
    }

    pub const fn fixed(min: f64, max: f64) -> Self {
        Self::new(FormulaKind::FixedRange, min, 0.0, max, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_aggressive_spell() {
        let params = CombatParams::default();
        assert!(params.aggressive);
        assert_eq!(params.origin, OriginKind::Spell);
        assert_eq!(params.param(CombatParam::Aggressive), 1);
    }

    #[test]
    fn set_and_read_back_params() {
        let mut params = CombatParams::default();
        assert!(params.set_param(CombatParam::Type, DamageKind::Fire.raw()));
        assert!(params.set_param(CombatParam::Effect, 7));
        assert!(params.set_param(CombatParam::CreateItem, 1492));
        assert!(params.set_param(CombatParam::Aggressive, 0));
        assert!(params.set_param(CombatParam::Dispel, ConditionKind::Paralyze.raw()));

        assert_eq!(params.combat_type, DamageKind::Fire);
        assert_eq!(params.param(CombatParam::Type), 8);
        assert_eq!(params.param(CombatParam::Effect), 7);
        assert_eq!(params.param(CombatParam::CreateItem), 1492);
        assert_eq!(params.param(CombatParam::Aggressive), 0);
        assert_eq!(params.dispel_type, ConditionKind::Paralyze);
    }

    #[test]
    fn invalid_kind_values_are_refused() {
        let mut params = CombatParams::default();
        assert!(!params.set_param(CombatParam::Type, 3));
        assert_eq!(params.combat_type, DamageKind::None);
    }

    #[test]
    fn unknown_raw_param_reads_as_max() {
        let params = CombatParams::default();
        assert_eq!(params.param_raw(99), i32::MAX);
        assert_eq!(params.param_raw(8), 1);
        assert_eq!("block-armor".parse::<CombatParam>(), Ok(CombatParam::BlockArmor));
    }
}
