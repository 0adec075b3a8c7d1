use bitflags::bitflags;

use super::{EntityId, Position};

bitflags! {
    /// Static and dynamic properties of a world location relevant to combat.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TileFlags: u16 {
        const PROTECTION_ZONE  = 1 << 0;
        const NO_PVP_ZONE      = 1 << 1;
        const PVP_ZONE         = 1 << 2;
        const FLOOR_CHANGE     = 1 << 3;
        const BLOCK_PROJECTILE = 1 << 4;
        const TELEPORT         = 1 << 5;
    }
}

/// A world location together with the creatures standing on it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileView {
    pub position: Position,
    pub flags: TileFlags,
    /// Creatures in stacking order, top-most first.
    pub creatures: Vec<EntityId>,
}

impl TileView {
    /// An empty, flagless location as produced by on-demand materialization.
    pub fn empty(position: Position) -> Self {
        Self {
            position,
            flags: TileFlags::empty(),
            creatures: Vec::new(),
        }
    }

    pub fn has_flag(&self, flag: TileFlags) -> bool {
        self.flags.intersects(flag)
    }

    pub fn top_creature(&self) -> Option<EntityId> {
        self.creatures.first().copied()
    }

    pub fn contains(&self, creature: EntityId) -> bool {
        self.creatures.contains(&creature)
    }
}
