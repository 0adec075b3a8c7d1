//! Read-only views of creatures as seen by the combat pipeline.
//!
//! The world owns the full attribute model. Combat only needs the handful of
//! values captured in [`CreatureSnapshot`], so the world hands out a fresh
//! snapshot on every query and the pipeline never caches one across calls.

use bitflags::bitflags;

use crate::combat::{ConditionKind, ConditionSet};

use super::{EntityId, Position, ResourceMeter};

/// Broad creature category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CreatureKind {
    Player,
    Monster,
    Npc,
}

/// Reputation marker carried by players.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Skull {
    #[default]
    None,
    Yellow,
    Green,
    White,
    Red,
    Black,
    Orange,
}

/// Zone classification of the tile a creature stands on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZoneKind {
    #[default]
    Normal,
    Protection,
    NoPvp,
    Pvp,
}

bitflags! {
    /// Role flags granted to a player account.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct PlayerFlags: u16 {
        const CANNOT_USE_COMBAT      = 1 << 0;
        const CANNOT_ATTACK_PLAYER   = 1 << 1;
        const CANNOT_ATTACK_MONSTER  = 1 << 2;
        const CANNOT_BE_ATTACKED     = 1 << 3;
        const IGNORE_PROTECTION_ZONE = 1 << 4;
    }
}

/// Weapon category used to pick weapon-typed travel visuals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeaponType {
    #[default]
    None,
    Sword,
    Club,
    Axe,
    Shield,
    Distance,
    Wand,
    Ammo,
}

/// Equipped weapon as exposed to scripted value formulas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponProfile {
    pub weapon_type: WeaponType,
    pub attack: i32,
    /// Attack of the loaded ammunition, when the weapon fires ammo.
    pub ammo_attack: Option<i32>,
    /// Player skill level with this weapon (or its ammunition).
    pub skill: u32,
}

/// Percent-based special skills read by the critical and leech rolls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpecialSkills {
    pub critical_chance: u16,
    pub critical_amount: u16,
    pub life_leech_chance: u16,
    pub life_leech_amount: u16,
    pub mana_leech_chance: u16,
    pub mana_leech_amount: u16,
}

/// Player-only attributes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerProfile {
    pub level: u32,
    pub magic_level: u32,
    pub flags: PlayerFlags,
    pub vocation_allows_pvp: bool,
    pub skull: Skull,
    pub secure_mode: bool,
    pub strength: i32,
    pub intelligence: i32,
    pub skills: SpecialSkills,
    pub weapon: Option<WeaponProfile>,
    /// Skill used when fighting without a weapon.
    pub fist_skill: u32,
    pub attack_factor: f32,
}

impl PlayerProfile {
    pub fn new(level: u32, magic_level: u32) -> Self {
        Self {
            level,
            magic_level,
            flags: PlayerFlags::empty(),
            vocation_allows_pvp: true,
            skull: Skull::None,
            secure_mode: false,
            strength: 0,
            intelligence: 0,
            skills: SpecialSkills::default(),
            weapon: None,
            fist_skill: 10,
            attack_factor: 1.0,
        }
    }

    pub fn has_flag(&self, flag: PlayerFlags) -> bool {
        self.flags.contains(flag)
    }
}

/// Snapshot of a creature's combat-relevant state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureSnapshot {
    pub id: EntityId,
    pub kind: CreatureKind,
    pub position: Position,
    pub zone: ZoneKind,
    /// Summoner, when this creature is a summon.
    pub master: Option<EntityId>,
    pub attackable: bool,
    pub ghost: bool,
    pub health: ResourceMeter,
    pub mana: ResourceMeter,
    pub immunities: ConditionSet,
    /// Raw min/max hit values for creatures that bypass player formulas.
    pub combat_values: Option<(i32, i32)>,
    pub player: Option<PlayerProfile>,
}

impl CreatureSnapshot {
    pub fn new(id: EntityId, kind: CreatureKind, position: Position) -> Self {
        Self {
            id,
            kind,
            position,
            zone: ZoneKind::Normal,
            master: None,
            attackable: true,
            ghost: false,
            health: ResourceMeter::full(100),
            mana: ResourceMeter::full(0),
            immunities: ConditionSet::empty(),
            combat_values: None,
            player: None,
        }
    }

    pub fn is_player(&self) -> bool {
        self.player.is_some()
    }

    pub fn is_monster(&self) -> bool {
        self.kind == CreatureKind::Monster
    }

    pub fn is_summon(&self) -> bool {
        self.master.is_some()
    }

    pub fn is_immune(&self, kind: ConditionKind) -> bool {
        self.immunities.contains(kind.flag())
    }
}
