//! Ground fields: which item a combat places, and what happens when a
//! creature walks into one.

use crate::config::CombatConfig;
use crate::env::{OracleError, World};
use crate::state::{CreatureSnapshot, EntityId, Position, TileFlags};

use super::{Condition, eligibility};

/// Item ids of the ground fields combat knows about.
pub mod items {
    pub const FIREFIELD_PVP_FULL: u16 = 1487;
    pub const FIREFIELD_PVP_MEDIUM: u16 = 1488;
    pub const FIREFIELD_PVP_SMALL: u16 = 1489;
    pub const FIREFIELD_PERSISTENT_FULL: u16 = 1492;
    pub const FIREFIELD_PERSISTENT_MEDIUM: u16 = 1493;
    pub const FIREFIELD_PERSISTENT_SMALL: u16 = 1494;
    pub const FIREFIELD_NOPVP: u16 = 1500;

    pub const POISONFIELD_PVP: u16 = 1490;
    pub const POISONFIELD_PERSISTENT: u16 = 1496;
    pub const POISONFIELD_NOPVP: u16 = 1503;

    pub const ENERGYFIELD_PVP: u16 = 1491;
    pub const ENERGYFIELD_PERSISTENT: u16 = 1495;
    pub const ENERGYFIELD_NOPVP: u16 = 1504;

    pub const MAGICWALL: u16 = 1497;
    pub const MAGICWALL_PERSISTENT: u16 = 1498;
    pub const MAGICWALL_SAFE: u16 = 11095;
    pub const MAGICWALL_NOPVP: u16 = 11098;

    pub const WILDGROWTH: u16 = 1499;
    pub const WILDGROWTH_PERSISTENT: u16 = 2721;
    pub const WILDGROWTH_SAFE: u16 = 11096;
    pub const WILDGROWTH_NOPVP: u16 = 11099;
}

/// The item to place and whether placing it puts the casting player in fight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldPlacement {
    pub item_id: u16,
    pub marks_in_fight: bool,
}

/// Picks the concrete field item for a placement.
///
/// Persistent ids always become their PvP variant. When a player (or a
/// player's summon) casts in a no-PvP world or onto a no-PvP tile the PvP
/// variant is swapped for the harmless one; otherwise a damaging PvP field
/// marks the caster as in fight.
pub fn resolve_field_item(item_id: u16, player_caster: bool, no_pvp_context: bool) -> FieldPlacement {
    use items::*;

    let item_id = match item_id {
        FIREFIELD_PERSISTENT_FULL => FIREFIELD_PVP_FULL,
        FIREFIELD_PERSISTENT_MEDIUM => FIREFIELD_PVP_MEDIUM,
        FIREFIELD_PERSISTENT_SMALL => FIREFIELD_PVP_SMALL,
        ENERGYFIELD_PERSISTENT => ENERGYFIELD_PVP,
        POISONFIELD_PERSISTENT => POISONFIELD_PVP,
        MAGICWALL_PERSISTENT => MAGICWALL,
        WILDGROWTH_PERSISTENT => WILDGROWTH,
        other => other,
    };

    if !player_caster {
        return FieldPlacement {
            item_id,
            marks_in_fight: false,
        };
    }

    if no_pvp_context {
        let item_id = match item_id {
            FIREFIELD_PVP_FULL => FIREFIELD_NOPVP,
            POISONFIELD_PVP => POISONFIELD_NOPVP,
            ENERGYFIELD_PVP => ENERGYFIELD_NOPVP,
            MAGICWALL => MAGICWALL_NOPVP,
            WILDGROWTH => WILDGROWTH_NOPVP,
            other => other,
        };
        return FieldPlacement {
            item_id,
            marks_in_fight: false,
        };
    }

    FieldPlacement {
        item_id,
        marks_in_fight: matches!(item_id, FIREFIELD_PVP_FULL | POISONFIELD_PVP | ENERGYFIELD_PVP),
    }
}

/// A field lying on the ground, as seen by the stepping logic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MagicField {
    pub item_id: u16,
    pub position: Position,
    pub owner: Option<EntityId>,
    pub created_at_ms: u64,
    /// The item blocks movement (walls, growth).
    pub blocking: bool,
    /// Condition applied to creatures entering the field.
    pub condition: Option<Condition>,
}

/// What stepping into a field did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldStep {
    /// The field was destroyed.
    Removed,
    /// Nothing happened.
    Untouched,
    /// The field's condition was applied; `owner` is the owner it carries.
    Applied { owner: Option<EntityId> },
}

/// Handles `creature` entering `field`.
///
/// Walls and growth crumble under any visible creature; their no-PvP variants
/// only in no-PvP contexts. Damaging fields attach their condition and keep
/// the field owner on it only when the field is harmless to the victim, still
/// fresh, or the victim has already been attacked by that owner.
///
/// # Errors
///
/// Returns `OracleError::TileNotFound` when the field's location does not exist.
pub fn on_step_in_field<W: World + ?Sized>(
    world: &mut W,
    config: &CombatConfig,
    field: &MagicField,
    creature: &CreatureSnapshot,
) -> Result<FieldStep, OracleError> {
    use items::*;

    let tile = world
        .tile(field.position)
        .ok_or(OracleError::TileNotFound(field.position))?;
    let no_pvp_context = config.is_no_pvp_world() || tile.has_flag(TileFlags::NO_PVP_ZONE);

    if matches!(field.item_id, MAGICWALL | WILDGROWTH | MAGICWALL_SAFE | WILDGROWTH_SAFE) || field.blocking {
        if creature.ghost {
            return Ok(FieldStep::Untouched);
        }
        world.remove_field(field.position, field.item_id);
        return Ok(FieldStep::Removed);
    }

    if matches!(field.item_id, MAGICWALL_NOPVP | WILDGROWTH_NOPVP) {
        if !no_pvp_context {
            return Ok(FieldStep::Untouched);
        }
        world.remove_field(field.position, field.item_id);
        return Ok(FieldStep::Removed);
    }

    let Some(condition) = field.condition else {
        return Ok(FieldStep::Untouched);
    };

    let mut owner = None;
    if let Some(owner_id) = field.owner {
        let owner_creature = world.creature(owner_id);
        let mut harmful = true;

        if no_pvp_context && owner_creature.as_ref().is_some_and(|owner| player_side(&*world, owner)) {
            harmful = false;
        }

        let protected_pair = owner_creature
            .as_ref()
            .filter(|owner| owner.is_player() && creature.is_player())
            .is_some_and(|attacker| eligibility::is_protected(&*world, config, attacker, creature));
        if protected_pair {
            harmful = false;
        }

        let fresh = world.now_ms().saturating_sub(field.created_at_ms) <= CombatConfig::FIELD_OWNERSHIP_GRACE_MS;
        if !harmful || fresh || world.has_been_attacked(creature.id, owner_id) {
            owner = Some(owner_id);
        }
    }

    world.add_condition(creature.id, condition.with_owner(owner));
    Ok(FieldStep::Applied { owner })
}

/// Player or summon of a player.
fn player_side<W: World + ?Sized>(world: &W, creature: &CreatureSnapshot) -> bool {
    creature.is_player()
        || creature
            .master
            .and_then(|master| world.creature(master))
            .is_some_and(|master| master.is_player())
}

#[cfg(test)]
mod tests {
    use super::items::*;
    use super::*;
    use crate::combat::ConditionKind;
    use crate::env::MemoryWorld;
    use crate::env::PlacedField;
    use crate::state::{CreatureKind, PlayerProfile};

    const Z: u8 = 7;

    #[test]
    fn persistent_fields_become_pvp_variants() {
        assert_eq!(resolve_field_item(FIREFIELD_PERSISTENT_FULL, false, false).item_id, FIREFIELD_PVP_FULL);
        assert_eq!(resolve_field_item(WILDGROWTH_PERSISTENT, false, true).item_id, WILDGROWTH);
        assert!(!resolve_field_item(FIREFIELD_PVP_FULL, false, false).marks_in_fight);
    }

    #[test]
    fn players_in_no_pvp_context_get_harmless_fields() {
        let placement = resolve_field_item(POISONFIELD_PERSISTENT, true, true);
        assert_eq!(placement.item_id, POISONFIELD_NOPVP);
        assert!(!placement.marks_in_fight);
        assert_eq!(resolve_field_item(MAGICWALL, true, true).item_id, MAGICWALL_NOPVP);
    }

    #[test]
    fn damaging_pvp_fields_mark_player_in_fight() {
        let placement = resolve_field_item(ENERGYFIELD_PVP, true, false);
        assert_eq!(placement.item_id, ENERGYFIELD_PVP);
        assert!(placement.marks_in_fight);
        assert!(!resolve_field_item(MAGICWALL, true, false).marks_in_fight);
    }

    fn fire_field(owner: Option<EntityId>, created_at_ms: u64) -> MagicField {
        MagicField {
            item_id: FIREFIELD_PVP_FULL,
            position: Position::new(3, 3, Z),
            owner,
            created_at_ms,
            blocking: false,
            condition: Some(Condition::new(ConditionKind::Fire, 3000, -10)),
        }
    }

    fn setup() -> (MemoryWorld, CreatureSnapshot) {
        let mut world = MemoryWorld::new();
        world.insert_tile(Position::new(3, 3, Z), TileFlags::empty());
        let mut owner = CreatureSnapshot::new(EntityId(1), CreatureKind::Player, Position::new(0, 0, Z));
        owner.player = Some(PlayerProfile::new(100, 50));
        world.insert_creature(owner);
        let victim = CreatureSnapshot::new(EntityId(2), CreatureKind::Monster, Position::new(3, 3, Z));
        world.insert_creature(victim.clone());
        (world, victim)
    }

    #[test]
    fn fresh_field_keeps_owner() {
        let (mut world, victim) = setup();
        world.set_clock(6_000);
        let step = on_step_in_field(&mut world, &CombatConfig::default(), &fire_field(Some(EntityId(1)), 2_000), &victim);
        assert_eq!(step, Ok(FieldStep::Applied { owner: Some(EntityId(1)) }));
        assert_eq!(world.conditions_of(victim.id)[0].owner, Some(EntityId(1)));
    }

    #[test]
    fn stale_field_drops_owner_unless_attacked() {
        let (mut world, victim) = setup();
        world.set_clock(20_000);
        let field = fire_field(Some(EntityId(1)), 2_000);
        let config = CombatConfig::default();

        assert_eq!(
            on_step_in_field(&mut world, &config, &field, &victim),
            Ok(FieldStep::Applied { owner: None })
        );

        world.mark_attacked(victim.id, EntityId(1));
        assert_eq!(
            on_step_in_field(&mut world, &config, &field, &victim),
            Ok(FieldStep::Applied { owner: Some(EntityId(1)) })
        );
    }

    #[test]
    fn walls_crumble_for_visible_creatures() {
        let (mut world, mut victim) = setup();
        let at = Position::new(3, 3, Z);
        world.insert_field(
            at,
            PlacedField {
                item_id: MAGICWALL,
                owner: None,
                created_at_ms: 0,
            },
        );
        let wall = MagicField {
            item_id: MAGICWALL,
            position: at,
            owner: None,
            created_at_ms: 0,
            blocking: true,
            condition: None,
        };
        let config = CombatConfig::default();

        victim.ghost = true;
        assert_eq!(on_step_in_field(&mut world, &config, &wall, &victim), Ok(FieldStep::Untouched));
        victim.ghost = false;
        assert_eq!(on_step_in_field(&mut world, &config, &wall, &victim), Ok(FieldStep::Removed));
        assert!(world.fields_at(at).is_empty());
    }

    #[test]
    fn no_pvp_walls_only_crumble_in_no_pvp_context() {
        let (mut world, victim) = setup();
        let mut wall = fire_field(None, 0);
        wall.item_id = MAGICWALL_NOPVP;
        wall.condition = None;

        assert_eq!(
            on_step_in_field(&mut world, &CombatConfig::default(), &wall, &victim),
            Ok(FieldStep::Untouched)
        );
        let no_pvp = CombatConfig::default().with_world_type(crate::config::WorldType::NoPvp);
        assert_eq!(on_step_in_field(&mut world, &no_pvp, &wall, &victim), Ok(FieldStep::Removed));
    }

    #[test]
    fn missing_tile_is_an_error() {
        let (mut world, victim) = setup();
        let mut field = fire_field(None, 0);
        field.position = Position::new(40, 40, Z);
        assert_eq!(
            on_step_in_field(&mut world, &CombatConfig::default(), &field, &victim),
            Err(OracleError::TileNotFound(field.position))
        );
    }
}
