//! World-facing value types shared by every combat subsystem.
mod common;
mod creature;
mod tile;

pub use common::{Direction, EntityId, Position, ResourceMeter};
pub use creature::{
    CreatureKind, CreatureSnapshot, PlayerFlags, PlayerProfile, Skull, SpecialSkills,
    WeaponProfile, WeaponType, ZoneKind,
};
pub use tile::{TileFlags, TileView};
