//! Visual effect identifiers.
//!
//! Effects are opaque numbers understood by the client. Combat only needs a
//! handful of them by name; everything else flows through from configuration.

use crate::state::{CreatureSnapshot, WeaponType};

/// Effect shown on a single tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MagicEffect(pub u16);

impl MagicEffect {
    pub const NONE: Self = Self(0);
    pub const DRAW_BLOOD: Self = Self(1);
    pub const EXPLOSION_AREA: Self = Self(5);
    pub const FIRE_AREA: Self = Self(7);
    pub const ENERGY_HIT: Self = Self(12);
    pub const MAGIC_BLUE: Self = Self(13);
    pub const MAGIC_RED: Self = Self(14);
    pub const HIT_BY_FIRE: Self = Self(16);
    pub const CRITICAL_DAMAGE: Self = Self(173);

    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

/// Projectile animated between two positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DistanceEffect(pub u8);

impl DistanceEffect {
    pub const NONE: Self = Self(0);
    pub const SPEAR: Self = Self(1);
    pub const FIRE: Self = Self(4);
    pub const ENERGY: Self = Self(5);
    pub const WHIRLWIND_SWORD: Self = Self(39);
    pub const WHIRLWIND_AXE: Self = Self(40);
    pub const WHIRLWIND_CLUB: Self = Self(41);
    /// Placeholder resolved from the caster's weapon at cast time.
    pub const WEAPON_TYPE: Self = Self(0xFE);

    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }

    /// Concrete projectile for `caster`.
    ///
    /// Only [`Self::WEAPON_TYPE`] depends on the caster: it becomes the
    /// whirlwind matching a melee player's weapon, or nothing otherwise.
    pub fn resolve(self, caster: Option<&CreatureSnapshot>) -> Self {
        if self != Self::WEAPON_TYPE {
            return self;
        }

        let weapon_type = caster
            .and_then(|caster| caster.player.as_ref())
            .and_then(|player| player.weapon)
            .map(|weapon| weapon.weapon_type);

        match weapon_type {
            Some(WeaponType::Axe) => Self::WHIRLWIND_AXE,
            Some(WeaponType::Sword) => Self::WHIRLWIND_SWORD,
            Some(WeaponType::Club) => Self::WHIRLWIND_CLUB,
            _ => Self::NONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CreatureKind, EntityId, PlayerProfile, Position, WeaponProfile};

    fn knight(weapon_type: Option<WeaponType>) -> CreatureSnapshot {
        let mut creature = CreatureSnapshot::new(EntityId(1), CreatureKind::Player, Position::new(0, 0, 7));
        let mut player = PlayerProfile::new(50, 5);
        player.weapon = weapon_type.map(|weapon_type| WeaponProfile {
            weapon_type,
            attack: 40,
            ammo_attack: None,
            skill: 80,
        });
        creature.player = Some(player);
        creature
    }

    #[test]
    fn weapon_type_sentinel_follows_weapon() {
        let effect = DistanceEffect::WEAPON_TYPE;
        assert_eq!(effect.resolve(Some(&knight(Some(WeaponType::Axe)))), DistanceEffect::WHIRLWIND_AXE);
        assert_eq!(effect.resolve(Some(&knight(Some(WeaponType::Sword)))), DistanceEffect::WHIRLWIND_SWORD);
        assert_eq!(effect.resolve(Some(&knight(Some(WeaponType::Club)))), DistanceEffect::WHIRLWIND_CLUB);
        assert_eq!(effect.resolve(Some(&knight(Some(WeaponType::Wand)))), DistanceEffect::NONE);
        assert_eq!(effect.resolve(Some(&knight(None))), DistanceEffect::NONE);
        assert_eq!(effect.resolve(None), DistanceEffect::NONE);
    }

    #[test]
    fn plain_effects_pass_through() {
        assert_eq!(DistanceEffect::FIRE.resolve(None), DistanceEffect::FIRE);
    }
}
