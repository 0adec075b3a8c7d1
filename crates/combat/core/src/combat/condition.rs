//! Lingering conditions attached by combat definitions.
//!
//! The condition subsystem itself (ticking, stacking, expiry) lives in the
//! world. Combat only clones [`Condition`] values, stamps the caster as owner
//! and hands them to the world mutator.

use bitflags::bitflags;

use crate::state::EntityId;

use super::DamageKind;

bitflags! {
    /// Set of condition kinds, used for immunities.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ConditionSet: u32 {
        const POISON       = 1 << 0;
        const FIRE         = 1 << 1;
        const ENERGY       = 1 << 2;
        const BLEEDING     = 1 << 3;
        const HASTE        = 1 << 4;
        const PARALYZE     = 1 << 5;
        const OUTFIT       = 1 << 6;
        const INVISIBLE    = 1 << 7;
        const LIGHT        = 1 << 8;
        const MANA_SHIELD  = 1 << 9;
        const IN_FIGHT     = 1 << 10;
        const DRUNK        = 1 << 11;
        const REGENERATION = 1 << 13;
        const DROWN        = 1 << 15;
        const MUTED        = 1 << 16;
        const FREEZING     = 1 << 20;
        const DAZZLED      = 1 << 21;
        const CURSED       = 1 << 22;
        const BEWITCHED    = 1 << 23;
        const SPLASHED     = 1 << 24;
    }
}

/// Kind of a single condition.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ConditionKind {
    #[default]
    None,
    Poison,
    Fire,
    Energy,
    Bleeding,
    Haste,
    Paralyze,
    Outfit,
    Invisible,
    Light,
    ManaShield,
    InFight,
    Drunk,
    Regeneration,
    Drown,
    Muted,
    Freezing,
    Dazzled,
    Cursed,
    Bewitched,
    Splashed,
}

impl ConditionKind {
    /// Immunity bit for this kind. `None` maps to the empty set.
    pub const fn flag(self) -> ConditionSet {
        match self {
            ConditionKind::None => ConditionSet::empty(),
            ConditionKind::Poison => ConditionSet::POISON,
            ConditionKind::Fire => ConditionSet::FIRE,
            ConditionKind::Energy => ConditionSet::ENERGY,
            ConditionKind::Bleeding => ConditionSet::BLEEDING,
            ConditionKind::Haste => ConditionSet::HASTE,
            ConditionKind::Paralyze => ConditionSet::PARALYZE,
            ConditionKind::Outfit => ConditionSet::OUTFIT,
            ConditionKind::Invisible => ConditionSet::INVISIBLE,
            ConditionKind::Light => ConditionSet::LIGHT,
            ConditionKind::ManaShield => ConditionSet::MANA_SHIELD,
            ConditionKind::InFight => ConditionSet::IN_FIGHT,
            ConditionKind::Drunk => ConditionSet::DRUNK,
            ConditionKind::Regeneration => ConditionSet::REGENERATION,
            ConditionKind::Drown => ConditionSet::DROWN,
            ConditionKind::Muted => ConditionSet::MUTED,
            ConditionKind::Freezing => ConditionSet::FREEZING,
            ConditionKind::Dazzled => ConditionSet::DAZZLED,
            ConditionKind::Cursed => ConditionSet::CURSED,
            ConditionKind::Bewitched => ConditionSet::BEWITCHED,
            ConditionKind::Splashed => ConditionSet::SPLASHED,
        }
    }

    /// Raw bit used by the option/value parameter surface.
    pub const fn raw(self) -> u32 {
        self.flag().bits()
    }

    pub fn from_raw(raw: u32) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().find(|kind| kind.raw() == raw)
    }

    /// Damage element dealt by each tick of this condition.
    pub const fn to_damage_kind(self) -> DamageKind {
        match self {
            ConditionKind::Fire => DamageKind::Fire,
            ConditionKind::Energy => DamageKind::Energy,
            ConditionKind::Bleeding => DamageKind::Physical,
            ConditionKind::Drown => DamageKind::Drown,
            ConditionKind::Poison => DamageKind::Earth,
            ConditionKind::Freezing => DamageKind::Ice,
            ConditionKind::Dazzled => DamageKind::Holy,
            ConditionKind::Cursed => DamageKind::Death,
            ConditionKind::Bewitched => DamageKind::Arcane,
            ConditionKind::Splashed => DamageKind::Water,
            _ => DamageKind::None,
        }
    }
}

/// A condition template or an applied copy of one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Condition {
    pub kind: ConditionKind,
    /// Duration in milliseconds; negative means permanent.
    pub ticks: i32,
    /// Per-tick magnitude (damage, speed delta, ...), sign per kind.
    pub value: i32,
    pub owner: Option<EntityId>,
}

impl Condition {
    pub const fn new(kind: ConditionKind, ticks: i32, value: i32) -> Self {
        Self {
            kind,
            ticks,
            value,
            owner: None,
        }
    }

    /// Copy of this condition owned by `owner`.
    #[must_use]
    pub fn with_owner(mut self, owner: Option<EntityId>) -> Self {
        self.owner = owner;
        self
    }

    /// Whether each tick harms the bearer.
    pub fn is_damaging(&self) -> bool {
        self.kind.to_damage_kind() != DamageKind::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_and_condition_mappings_agree() {
        use strum::IntoEnumIterator;
        for kind in ConditionKind::iter() {
            let damage = kind.to_damage_kind();
            if damage != DamageKind::None {
                assert_eq!(damage.to_condition_kind(), kind, "{kind}");
            }
        }
    }

    #[test]
    fn raw_bits_identify_kinds() {
        assert_eq!(ConditionKind::Paralyze.raw(), 1 << 5);
        assert_eq!(ConditionKind::from_raw(1 << 5), Some(ConditionKind::Paralyze));
        assert_eq!(ConditionKind::from_raw(0), Some(ConditionKind::None));
        assert_eq!(ConditionKind::from_raw(1 << 30), None);
    }

    #[test]
    fn copies_carry_new_owner() {
        let template = Condition::new(ConditionKind::Fire, 4000, -10);
        let copy = template.with_owner(Some(EntityId(7)));
        assert_eq!(copy.owner, Some(EntityId(7)));
        assert_eq!(template.owner, None);
        assert!(copy.is_damaging());
    }

    #[test]
    fn immunity_flags_cover_kinds() {
        let immunities = ConditionSet::FIRE | ConditionSet::PARALYZE;
        assert!(immunities.contains(ConditionKind::Fire.flag()));
        assert!(!immunities.contains(ConditionKind::Poison.flag()));
    }
}
