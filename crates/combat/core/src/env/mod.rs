//! Collaborators the combat engine talks to.
//!
//! The world, the policy hook, configuration, randomness and the script
//! stack are bundled into a [`CombatEnv`] that is passed explicitly to every
//! resolution. Nothing here is global.
mod error;
mod memory;
mod policy;
mod rng;
mod world;

pub use error::OracleError;
pub use memory::{Audience, MemoryWorld, PlacedField, WorldEvent};
pub use policy::{AllowAll, PolicyHook};
pub use rng::{PcgRng, RngOracle, RollStream, compute_seed};
pub use world::{BlockRules, WeaponDamage, WeaponOracle, World, WorldMutator, WorldOracle};

use crate::combat::ScriptStack;
use crate::config::CombatConfig;
use crate::state::{CreatureSnapshot, EntityId};

/// Everything one resolution needs besides the combat definition.
pub struct CombatEnv<'a> {
    pub world: &'a mut dyn World,
    pub policy: &'a dyn PolicyHook,
    pub config: &'a CombatConfig,
    pub rolls: RollStream<'a>,
    pub scripts: &'a ScriptStack,
}

impl<'a> CombatEnv<'a> {
    pub fn new(
        world: &'a mut dyn World,
        policy: &'a dyn PolicyHook,
        config: &'a CombatConfig,
        rolls: RollStream<'a>,
        scripts: &'a ScriptStack,
    ) -> Self {
        Self {
            world,
            policy,
            config,
            rolls,
            scripts,
        }
    }

    /// Fresh snapshot of `id`.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::CreatureNotFound` if the world no longer knows `id`.
    pub fn creature(&self, id: EntityId) -> Result<CreatureSnapshot, OracleError> {
        self.world.creature(id).ok_or(OracleError::CreatureNotFound(id))
    }
}
