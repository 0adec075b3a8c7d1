//! Legality rules: may this actor affect that location or creature right now?
//!
//! Every predicate reads fresh snapshots and is evaluated per candidate.
//! Built-in rules run first; the [`PolicyHook`] has the last word.

use crate::config::CombatConfig;
use crate::env::{PolicyHook, WorldOracle};
use crate::error::{CombatFault, ErrorSeverity};
use crate::state::{CreatureSnapshot, PlayerFlags, Skull, TileFlags, TileView, ZoneKind};

/// Why an interaction is not permitted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rejection {
    #[error("there is not enough room")]
    NotEnoughRoom,

    #[error("first go downstairs")]
    FirstGoDownstairs,

    #[error("first go upstairs")]
    FirstGoUpstairs,

    #[error("action not permitted in a protection zone")]
    ProtectionZone,

    #[error("action not permitted in a non-pvp zone")]
    NoPvpZone,

    #[error("you may not attack this player")]
    MayNotAttackPlayer,

    #[error("you may not attack this creature")]
    MayNotAttackCreature,

    #[error("you may not attack a person in a protection zone")]
    MayNotAttackPersonInProtectionZone,

    #[error("turn secure mode off to attack unmarked players")]
    TurnSecureModeToAttackUnmarkedPlayers,

    /// Refused by the policy hook.
    #[error("vetoed: {0}")]
    Vetoed(String),
}

impl CombatFault for Rejection {
    fn severity(&self) -> ErrorSeverity {
        use Rejection::*;
        match self {
            // Position-dependent: moving may lift these.
            NotEnoughRoom | FirstGoDownstairs | FirstGoUpstairs | ProtectionZone | NoPvpZone
            | MayNotAttackPersonInProtectionZone => ErrorSeverity::Recoverable,

            MayNotAttackPlayer
            | MayNotAttackCreature
            | TurnSecureModeToAttackUnmarkedPlayers
            | Vetoed(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use Rejection::*;
        match self {
            NotEnoughRoom => "REJECT_NOT_ENOUGH_ROOM",
            FirstGoDownstairs => "REJECT_FIRST_GO_DOWNSTAIRS",
            FirstGoUpstairs => "REJECT_FIRST_GO_UPSTAIRS",
            ProtectionZone => "REJECT_PROTECTION_ZONE",
            NoPvpZone => "REJECT_NO_PVP_ZONE",
            MayNotAttackPlayer => "REJECT_MAY_NOT_ATTACK_PLAYER",
            MayNotAttackCreature => "REJECT_MAY_NOT_ATTACK_CREATURE",
            MayNotAttackPersonInProtectionZone => "REJECT_PERSON_IN_PROTECTION_ZONE",
            TurnSecureModeToAttackUnmarkedPlayers => "REJECT_SECURE_MODE",
            Vetoed(_) => "REJECT_VETOED",
        }
    }
}

/// Both creatures stand in a PvP zone.
pub fn is_in_pvp_zone(attacker: &CreatureSnapshot, target: &CreatureSnapshot) -> bool {
    attacker.zone == ZoneKind::Pvp && target.zone == ZoneKind::Pvp
}

/// Whether two players are shielded from each other.
///
/// Either is below the protection level, either vocation forbids PvP, or a
/// black-skulled attacker faces a target it sees unmarked. Non-players are
/// never protected.
pub fn is_protected<W>(world: &W, config: &CombatConfig, attacker: &CreatureSnapshot, target: &CreatureSnapshot) -> bool
where
    W: WorldOracle + ?Sized,
{
    let (Some(attacker_player), Some(target_player)) = (&attacker.player, &target.player) else {
        return false;
    };

    if attacker_player.level < config.protection_level || target_player.level < config.protection_level {
        return true;
    }

    if !attacker_player.vocation_allows_pvp || !target_player.vocation_allows_pvp {
        return true;
    }

    attacker_player.skull == Skull::Black && world.skull_seen_by(attacker.id, target.id) == Skull::None
}

/// Stateless rule evaluator over one world view.
pub struct Eligibility<'a, W: WorldOracle + ?Sized> {
    world: &'a W,
    policy: &'a dyn PolicyHook,
    config: &'a CombatConfig,
}

impl<'a, W: WorldOracle + ?Sized> Eligibility<'a, W> {
    pub fn new(world: &'a W, policy: &'a dyn PolicyHook, config: &'a CombatConfig) -> Self {
        Self { world, policy, config }
    }

    /// The player controlling `creature`: itself, or its master when summoned.
    pub fn controlling_player(&self, creature: &CreatureSnapshot) -> Option<CreatureSnapshot> {
        if creature.is_player() {
            return Some(creature.clone());
        }
        self.player_master(creature)
    }

    /// The master of a summon, when that master is a player.
    pub fn player_master(&self, creature: &CreatureSnapshot) -> Option<CreatureSnapshot> {
        creature
            .master
            .and_then(|master| self.world.creature(master))
            .filter(CreatureSnapshot::is_player)
    }

    /// Whether the tile under `creature` carries any of `flags`.
    ///
    /// Player-versus-player shelter reads raw tile flags, so a tile that is
    /// both protection and no-PvP still shelters.
    fn stands_on(&self, creature: &CreatureSnapshot, flags: TileFlags) -> bool {
        self.world
            .tile(creature.position)
            .is_some_and(|tile| tile.has_flag(flags))
    }

    /// Player, or summon of a player.
    pub fn is_player_combat(&self, target: &CreatureSnapshot) -> bool {
        target.is_player() || self.player_master(target).is_some()
    }

    pub fn is_protected(&self, attacker: &CreatureSnapshot, target: &CreatureSnapshot) -> bool {
        is_protected(self.world, self.config, attacker, target)
    }

    /// May `actor` project a combat onto `tile`?
    pub fn can_affect_location(
        &self,
        actor: Option<&CreatureSnapshot>,
        tile: &TileView,
        aggressive: bool,
    ) -> Result<(), Rejection> {
        if tile.has_flag(TileFlags::BLOCK_PROJECTILE | TileFlags::FLOOR_CHANGE | TileFlags::TELEPORT) {
            return Err(Rejection::NotEnoughRoom);
        }

        if let Some(actor) = actor {
            if actor.position.z < tile.position.z {
                return Err(Rejection::FirstGoDownstairs);
            }
            if actor.position.z > tile.position.z {
                return Err(Rejection::FirstGoUpstairs);
            }
            if actor
                .player
                .as_ref()
                .is_some_and(|player| player.has_flag(PlayerFlags::IGNORE_PROTECTION_ZONE))
            {
                return Ok(());
            }
        }

        if aggressive && tile.has_flag(TileFlags::PROTECTION_ZONE) {
            return Err(Rejection::ProtectionZone);
        }

        self.policy.on_area_combat(actor, tile, aggressive)
    }

    /// May `attacker` affect `target`?
    pub fn can_affect_entity(
        &self,
        attacker: Option<&CreatureSnapshot>,
        target: &CreatureSnapshot,
    ) -> Result<(), Rejection> {
        let Some(attacker) = attacker else {
            return self.policy.on_target_combat(None, target);
        };

        if let Some(target_player) = &target.player {
            if target_player.has_flag(PlayerFlags::CANNOT_BE_ATTACKED) {
                return Err(Rejection::MayNotAttackPlayer);
            }

            if let Some(attacker_player) = &attacker.player {
                if attacker_player.has_flag(PlayerFlags::CANNOT_ATTACK_PLAYER) {
                    return Err(Rejection::MayNotAttackPlayer);
                }
                if self.is_protected(attacker, target) {
                    return Err(Rejection::MayNotAttackPlayer);
                }
                if self.stands_on(target, TileFlags::NO_PVP_ZONE) {
                    return Err(Rejection::NoPvpZone);
                }
                if self.stands_on(attacker, TileFlags::NO_PVP_ZONE)
                    && !self.stands_on(target, TileFlags::NO_PVP_ZONE | TileFlags::PROTECTION_ZONE)
                {
                    return Err(Rejection::NoPvpZone);
                }
            }

            if let Some(master) = self.player_master(attacker) {
                if master
                    .player
                    .as_ref()
                    .is_some_and(|player| player.has_flag(PlayerFlags::CANNOT_ATTACK_PLAYER))
                {
                    return Err(Rejection::MayNotAttackPlayer);
                }
                if self.stands_on(target, TileFlags::NO_PVP_ZONE) {
                    return Err(Rejection::NoPvpZone);
                }
                if self.is_protected(&master, target) {
                    return Err(Rejection::MayNotAttackPlayer);
                }
            }
        } else if target.is_monster() {
            if let Some(attacker_player) = &attacker.player {
                if attacker_player.has_flag(PlayerFlags::CANNOT_ATTACK_MONSTER) {
                    return Err(Rejection::MayNotAttackCreature);
                }
                if target.zone == ZoneKind::NoPvp && self.player_master(target).is_some() {
                    return Err(Rejection::NoPvpZone);
                }
            } else if attacker.is_monster()
                && self.player_master(target).is_none()
                && self.player_master(attacker).is_none()
            {
                return Err(Rejection::MayNotAttackCreature);
            }
        }

        if self.config.is_no_pvp_world() && self.controlling_player(attacker).is_some() {
            if target.is_player() && !is_in_pvp_zone(attacker, target) {
                return Err(Rejection::MayNotAttackPlayer);
            }
            if self.player_master(target).is_some() && !is_in_pvp_zone(attacker, target) {
                return Err(Rejection::MayNotAttackCreature);
            }
        }

        self.policy.on_target_combat(Some(attacker), target)
    }

    /// May player `attacker` select `target` as its attack target?
    pub fn can_target_creature(&self, attacker: &CreatureSnapshot, target: &CreatureSnapshot) -> Result<(), Rejection> {
        if attacker.id == target.id {
            return Err(Rejection::MayNotAttackPlayer);
        }

        let flags = attacker
            .player
            .as_ref()
            .map_or(PlayerFlags::empty(), |player| player.flags);

        if !flags.contains(PlayerFlags::IGNORE_PROTECTION_ZONE) {
            if attacker.zone == ZoneKind::Protection || target.zone == ZoneKind::Protection {
                return Err(Rejection::ProtectionZone);
            }
            if self.is_player_combat(target) {
                if attacker.zone == ZoneKind::NoPvp {
                    return Err(Rejection::NoPvpZone);
                }
                if target.zone == ZoneKind::NoPvp {
                    return Err(Rejection::MayNotAttackPersonInProtectionZone);
                }
            }
        }

        if flags.contains(PlayerFlags::CANNOT_USE_COMBAT) || !target.attackable {
            return Err(if target.is_player() {
                Rejection::MayNotAttackPlayer
            } else {
                Rejection::MayNotAttackCreature
            });
        }

        if target.is_player() {
            if self.is_protected(attacker, target) {
                return Err(Rejection::MayNotAttackPlayer);
            }
            let secure = attacker.player.as_ref().is_some_and(|player| player.secure_mode);
            if secure
                && !is_in_pvp_zone(attacker, target)
                && self.world.skull_seen_by(attacker.id, target.id) == Skull::None
            {
                return Err(Rejection::TurnSecureModeToAttackUnmarkedPlayers);
            }
        }

        self.can_affect_entity(Some(attacker), target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{AllowAll, MemoryWorld};
    use crate::state::{CreatureKind, EntityId, PlayerProfile, Position};

    const Z: u8 = 7;

    fn player(id: u32, level: u32, at: Position) -> CreatureSnapshot {
        let mut creature = CreatureSnapshot::new(EntityId(id), CreatureKind::Player, at);
        creature.player = Some(PlayerProfile::new(level, 10));
        creature
    }

    fn monster(id: u32, at: Position) -> CreatureSnapshot {
        CreatureSnapshot::new(EntityId(id), CreatureKind::Monster, at)
    }

    struct DenyTargets;

    impl PolicyHook for DenyTargets {
        fn on_area_combat(&self, _: Option<&CreatureSnapshot>, _: &TileView, _: bool) -> Result<(), Rejection> {
            Ok(())
        }

        fn on_target_combat(&self, _: Option<&CreatureSnapshot>, _: &CreatureSnapshot) -> Result<(), Rejection> {
            Err(Rejection::Vetoed("event".into()))
        }
    }

    #[test]
    fn protection_covers_low_levels_and_vocations() {
        let world = MemoryWorld::new();
        let config = CombatConfig::default().with_protection_level(50);
        let at = Position::new(0, 0, Z);

        let veteran = player(1, 80, at);
        let novice = player(2, 20, at);
        assert!(is_protected(&world, &config, &veteran, &novice));
        assert!(is_protected(&world, &config, &novice, &veteran));
        assert!(!is_protected(&world, &config, &veteran, &player(3, 60, at)));

        let mut pacifist = player(4, 90, at);
        if let Some(profile) = pacifist.player.as_mut() {
            profile.vocation_allows_pvp = false;
        }
        assert!(is_protected(&world, &config, &veteran, &pacifist));
        assert!(!is_protected(&world, &config, &veteran, &monster(5, at)));
    }

    #[test]
    fn black_skull_cannot_hit_unmarked() {
        let mut world = MemoryWorld::new();
        let config = CombatConfig::default();
        let at = Position::new(0, 0, Z);

        let mut outlaw = player(1, 100, at);
        if let Some(profile) = outlaw.player.as_mut() {
            profile.skull = Skull::Black;
        }
        let victim = player(2, 100, at);
        assert!(is_protected(&world, &config, &outlaw, &victim));

        world.set_skull_seen(outlaw.id, victim.id, Skull::White);
        assert!(!is_protected(&world, &config, &outlaw, &victim));
    }

    #[test]
    fn locations_reject_obstacles_and_floors() {
        let world = MemoryWorld::new();
        let config = CombatConfig::default();
        let rules = Eligibility::new(&world, &AllowAll, &config);
        let caster = player(1, 100, Position::new(0, 0, Z));

        let mut tile = TileView::empty(Position::new(1, 0, Z));
        tile.flags = TileFlags::TELEPORT;
        assert_eq!(rules.can_affect_location(Some(&caster), &tile, true), Err(Rejection::NotEnoughRoom));

        let below = TileView::empty(Position::new(1, 0, Z + 1));
        assert_eq!(rules.can_affect_location(Some(&caster), &below, true), Err(Rejection::FirstGoDownstairs));
        let above = TileView::empty(Position::new(1, 0, Z - 1));
        assert_eq!(rules.can_affect_location(Some(&caster), &above, true), Err(Rejection::FirstGoUpstairs));
    }

    #[test]
    fn protection_zone_blocks_aggression_unless_flagged() {
        let world = MemoryWorld::new();
        let config = CombatConfig::default();
        let rules = Eligibility::new(&world, &AllowAll, &config);

        let mut tile = TileView::empty(Position::new(1, 0, Z));
        tile.flags = TileFlags::PROTECTION_ZONE;
        let mut caster = player(1, 100, Position::new(0, 0, Z));

        assert_eq!(rules.can_affect_location(Some(&caster), &tile, true), Err(Rejection::ProtectionZone));
        assert_eq!(rules.can_affect_location(Some(&caster), &tile, false), Ok(()));
        assert_eq!(rules.can_affect_location(None, &tile, true), Err(Rejection::ProtectionZone));

        if let Some(profile) = caster.player.as_mut() {
            profile.flags |= PlayerFlags::IGNORE_PROTECTION_ZONE;
        }
        assert_eq!(rules.can_affect_location(Some(&caster), &tile, true), Ok(()));
    }

    #[test]
    fn monsters_only_fight_player_sides() {
        let mut world = MemoryWorld::new();
        let config = CombatConfig::default();
        let at = Position::new(0, 0, Z);
        world.insert_creature(player(10, 100, at));

        let wild = monster(1, at);
        let other = monster(2, at);
        let mut pet = monster(3, at);
        pet.master = Some(EntityId(10));

        let rules = Eligibility::new(&world, &AllowAll, &config);
        assert_eq!(rules.can_affect_entity(Some(&wild), &other), Err(Rejection::MayNotAttackCreature));
        assert_eq!(rules.can_affect_entity(Some(&wild), &pet), Ok(()));
        assert_eq!(rules.can_affect_entity(Some(&pet), &wild), Ok(()));
        assert!(rules.is_player_combat(&pet));
        assert!(!rules.is_player_combat(&wild));
    }

    #[test]
    fn no_pvp_zones_shelter_players() {
        let mut world = MemoryWorld::new();
        let config = CombatConfig::default();
        let safe = Position::new(5, 5, Z);
        let open = Position::new(6, 5, Z);
        world.insert_tile(safe, TileFlags::NO_PVP_ZONE);
        world.insert_creature(player(1, 100, open));
        world.insert_creature(player(2, 100, safe));

        let attacker = world.creature(EntityId(1)).unwrap();
        let sheltered = world.creature(EntityId(2)).unwrap();
        let rules = Eligibility::new(&world, &AllowAll, &config);
        assert_eq!(rules.can_affect_entity(Some(&attacker), &sheltered), Err(Rejection::NoPvpZone));
        assert_eq!(rules.can_affect_entity(Some(&sheltered), &attacker), Err(Rejection::NoPvpZone));
    }

    #[test]
    fn no_pvp_flag_shelters_inside_protection_zone() {
        let mut world = MemoryWorld::new();
        let config = CombatConfig::default();
        let temple = Position::new(5, 5, Z);
        world.insert_tile(temple, TileFlags::PROTECTION_ZONE | TileFlags::NO_PVP_ZONE);
        world.insert_creature(player(1, 100, Position::new(6, 5, Z)));
        world.insert_creature(player(2, 100, temple));

        let attacker = world.creature(EntityId(1)).unwrap();
        let pilgrim = world.creature(EntityId(2)).unwrap();
        assert_eq!(pilgrim.zone, ZoneKind::Protection);

        let rules = Eligibility::new(&world, &AllowAll, &config);
        assert_eq!(rules.can_affect_entity(Some(&attacker), &pilgrim), Err(Rejection::NoPvpZone));
    }

    #[test]
    fn attacker_in_no_pvp_zone_may_hit_protected_tile() {
        let mut world = MemoryWorld::new();
        let config = CombatConfig::default();
        let shelter = Position::new(5, 5, Z);
        let sanctuary = Position::new(6, 5, Z);
        world.insert_tile(shelter, TileFlags::NO_PVP_ZONE);
        world.insert_tile(sanctuary, TileFlags::PROTECTION_ZONE);
        world.insert_creature(player(1, 100, shelter));
        world.insert_creature(player(2, 100, sanctuary));

        let attacker = world.creature(EntityId(1)).unwrap();
        let target = world.creature(EntityId(2)).unwrap();
        let rules = Eligibility::new(&world, &AllowAll, &config);
        assert_eq!(rules.can_affect_entity(Some(&attacker), &target), Ok(()));
    }

    #[test]
    fn no_pvp_world_requires_shared_pvp_zone() {
        let mut world = MemoryWorld::new();
        let config = CombatConfig::default().with_world_type(crate::config::WorldType::NoPvp);
        let arena = Position::new(0, 0, Z);
        let arena_too = Position::new(1, 0, Z);
        world.insert_tile(arena, TileFlags::PVP_ZONE);
        world.insert_tile(arena_too, TileFlags::PVP_ZONE);
        world.insert_creature(player(1, 100, arena));
        world.insert_creature(player(2, 100, arena_too));
        world.insert_creature(player(3, 100, Position::new(9, 9, Z)));

        let a = world.creature(EntityId(1)).unwrap();
        let b = world.creature(EntityId(2)).unwrap();
        let outside = world.creature(EntityId(3)).unwrap();
        let rules = Eligibility::new(&world, &AllowAll, &config);
        assert_eq!(rules.can_affect_entity(Some(&a), &b), Ok(()));
        assert_eq!(rules.can_affect_entity(Some(&a), &outside), Err(Rejection::MayNotAttackPlayer));
    }

    #[test]
    fn policy_has_final_word() {
        let world = MemoryWorld::new();
        let config = CombatConfig::default();
        let rules = Eligibility::new(&world, &DenyTargets, &config);
        let at = Position::new(0, 0, Z);
        assert_eq!(
            rules.can_affect_entity(None, &monster(1, at)),
            Err(Rejection::Vetoed("event".into()))
        );
    }

    #[test]
    fn targeting_checks_zones_and_secure_mode() {
        let mut world = MemoryWorld::new();
        let config = CombatConfig::default();
        let temple = Position::new(0, 0, Z);
        world.insert_tile(temple, TileFlags::PROTECTION_ZONE);
        world.insert_creature(player(1, 100, Position::new(5, 5, Z)));
        world.insert_creature(player(2, 100, Position::new(6, 5, Z)));
        world.insert_creature(player(3, 100, temple));

        let mut hunter = world.creature(EntityId(1)).unwrap();
        let prey = world.creature(EntityId(2)).unwrap();
        let pilgrim = world.creature(EntityId(3)).unwrap();
        let rules = Eligibility::new(&world, &AllowAll, &config);

        assert_eq!(rules.can_target_creature(&hunter, &hunter), Err(Rejection::MayNotAttackPlayer));
        assert_eq!(rules.can_target_creature(&hunter, &pilgrim), Err(Rejection::ProtectionZone));
        assert_eq!(rules.can_target_creature(&hunter, &prey), Ok(()));

        if let Some(profile) = hunter.player.as_mut() {
            profile.secure_mode = true;
        }
        assert_eq!(
            rules.can_target_creature(&hunter, &prey),
            Err(Rejection::TurnSecureModeToAttackUnmarkedPlayers)
        );

        let mut statue = monster(4, Position::new(7, 5, Z));
        statue.attackable = false;
        assert_eq!(rules.can_target_creature(&hunter, &statue), Err(Rejection::MayNotAttackCreature));
    }
}
