//! Final veto over combat interactions.
//!
//! Built-in eligibility rules run first; the policy hook sees only requests
//! that already passed them, so servers can layer event scripts on top.

use crate::combat::Rejection;
use crate::state::{CreatureSnapshot, TileView};

pub trait PolicyHook: Send + Sync {
    /// Last check before an area combat touches `tile`.
    fn on_area_combat(
        &self,
        caster: Option<&CreatureSnapshot>,
        tile: &TileView,
        aggressive: bool,
    ) -> Result<(), Rejection>;

    /// Last check before `attacker` affects `target`.
    fn on_target_combat(
        &self,
        attacker: Option<&CreatureSnapshot>,
        target: &CreatureSnapshot,
    ) -> Result<(), Rejection>;
}

/// Approves everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl PolicyHook for AllowAll {
    fn on_area_combat(&self, _: Option<&CreatureSnapshot>, _: &TileView, _: bool) -> Result<(), Rejection> {
        Ok(())
    }

    fn on_target_combat(&self, _: Option<&CreatureSnapshot>, _: &CreatureSnapshot) -> Result<(), Rejection> {
        Ok(())
    }
}
