//! Damage kinds and the per-resolution damage record.

use super::ConditionKind;

// ============================================================================
// Damage Kind
// ============================================================================

/// Element of a damage (or healing) component.
///
/// Raw values are single bits so scripts and data files can name them with
/// the same integers used by the option/value parameter surface.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum DamageKind {
    #[default]
    None,
    Physical,
    Energy,
    Earth,
    Fire,
    Undefined,
    LifeDrain,
    ManaDrain,
    Healing,
    Drown,
    Ice,
    Holy,
    Death,
    Arcane,
    Water,
}

impl DamageKind {
    /// Bit value used by the option/value parameter surface.
    pub const fn raw(self) -> u32 {
        match self {
            DamageKind::None => 0,
            DamageKind::Physical => 1 << 0,
            DamageKind::Energy => 1 << 1,
            DamageKind::Earth => 1 << 2,
            DamageKind::Fire => 1 << 3,
            DamageKind::Undefined => 1 << 4,
            DamageKind::LifeDrain => 1 << 5,
            DamageKind::ManaDrain => 1 << 6,
            DamageKind::Healing => 1 << 7,
            DamageKind::Drown => 1 << 8,
            DamageKind::Ice => 1 << 9,
            DamageKind::Holy => 1 << 10,
            DamageKind::Death => 1 << 11,
            DamageKind::Arcane => 1 << 12,
            DamageKind::Water => 1 << 13,
        }
    }

    pub fn from_raw(raw: u32) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().find(|kind| kind.raw() == raw)
    }

    /// Condition that lingers after a hit of this kind.
    pub const fn to_condition_kind(self) -> ConditionKind {
        match self {
            DamageKind::Fire => ConditionKind::Fire,
            DamageKind::Energy => ConditionKind::Energy,
            DamageKind::Drown => ConditionKind::Drown,
            DamageKind::Earth => ConditionKind::Poison,
            DamageKind::Ice => ConditionKind::Freezing,
            DamageKind::Holy => ConditionKind::Dazzled,
            DamageKind::Death => ConditionKind::Cursed,
            DamageKind::Water => ConditionKind::Splashed,
            DamageKind::Arcane => ConditionKind::Bewitched,
            DamageKind::Physical => ConditionKind::Bleeding,
            _ => ConditionKind::None,
        }
    }
}

// ============================================================================
// Damage Record
// ============================================================================

/// One typed share of a hit. Negative values harm, positive values heal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageComponent {
    pub kind: DamageKind,
    pub value: i32,
}

impl DamageComponent {
    pub const fn new(kind: DamageKind, value: i32) -> Self {
        Self { kind, value }
    }
}

/// What absorbed a hit, as reported by the blocking collaborator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockKind {
    #[default]
    None,
    Defense,
    Armor,
    Immunity,
}

impl BlockKind {
    /// Conditions still attach when nothing, or only armor, absorbed the hit.
    pub const fn lets_conditions_through(self) -> bool {
        matches!(self, BlockKind::None | BlockKind::Armor)
    }
}

/// Where a hit came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum OriginKind {
    #[default]
    None,
    Condition,
    Spell,
    Melee,
    Ranged,
    Wand,
    Reflect,
}

/// Damage produced fresh for one resolution and refined stage by stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatDamage {
    pub primary: DamageComponent,
    pub secondary: DamageComponent,
    pub critical: bool,
    pub leeched: bool,
    pub block: BlockKind,
    pub origin: OriginKind,
}

impl CombatDamage {
    pub fn new(kind: DamageKind, value: i32, origin: OriginKind) -> Self {
        Self {
            primary: DamageComponent::new(kind, value),
            origin,
            ..Self::default()
        }
    }

    /// Synthetic heal applied to a caster by leech; never leeches again.
    pub fn leech(value: i32) -> Self {
        Self {
            primary: DamageComponent::new(DamageKind::None, value),
            leeched: true,
            origin: OriginKind::None,
            ..Self::default()
        }
    }

    /// `|primary + secondary|`.
    pub fn total_magnitude(&self) -> i32 {
        self.primary.value.saturating_add(self.secondary.value).saturating_abs()
    }

    pub fn is_healing(&self) -> bool {
        self.primary.kind == DamageKind::Healing
    }

    pub fn is_harmful(&self) -> bool {
        self.primary.value < 0 || self.secondary.value < 0
    }

    pub(crate) fn components_mut(&mut self) -> [&mut DamageComponent; 2] {
        [&mut self.primary, &mut self.secondary]
    }
}

/// `value * percent / 100`, rounded half away from zero.
pub fn percent_of(value: i32, percent: f64) -> i32 {
    (f64::from(value) * (percent / 100.0)).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_round_trip_through_lookup() {
        assert_eq!(DamageKind::from_raw(8), Some(DamageKind::Fire));
        assert_eq!(DamageKind::from_raw(0), Some(DamageKind::None));
        assert_eq!(DamageKind::from_raw(3), None);
    }

    #[test]
    fn damage_kinds_map_to_lingering_conditions() {
        assert_eq!(DamageKind::Fire.to_condition_kind(), ConditionKind::Fire);
        assert_eq!(DamageKind::Earth.to_condition_kind(), ConditionKind::Poison);
        assert_eq!(DamageKind::Physical.to_condition_kind(), ConditionKind::Bleeding);
        assert_eq!(DamageKind::Healing.to_condition_kind(), ConditionKind::None);
    }

    #[test]
    fn percent_rounds_half_away_from_zero() {
        assert_eq!(percent_of(-100, 50.0), -50);
        assert_eq!(percent_of(5, 10.0), 1);
        assert_eq!(percent_of(-5, 10.0), -1);
        assert_eq!(percent_of(7, 0.0), 0);
    }

    #[test]
    fn total_magnitude_sums_components() {
        let mut damage = CombatDamage::new(DamageKind::Physical, -120, OriginKind::Melee);
        damage.secondary = DamageComponent::new(DamageKind::Fire, -30);
        assert_eq!(damage.total_magnitude(), 150);
        assert!(damage.is_harmful());
        assert!(!damage.is_healing());
    }

    #[test]
    fn total_magnitude_saturates() {
        let mut damage = CombatDamage::new(DamageKind::Physical, i32::MIN, OriginKind::Melee);
        damage.secondary = DamageComponent::new(DamageKind::Fire, -1);
        assert_eq!(damage.total_magnitude(), i32::MAX);
    }

    #[test]
    fn kinds_parse_from_names() {
        assert_eq!("life-drain".parse::<DamageKind>(), Ok(DamageKind::LifeDrain));
        assert_eq!("spell".parse::<OriginKind>(), Ok(OriginKind::Spell));
    }
}
