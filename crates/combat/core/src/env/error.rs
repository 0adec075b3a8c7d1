//! World access errors.

use crate::error::{CombatFault, ErrorSeverity};
use crate::state::{EntityId, Position};

/// A referenced world object does not exist.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("creature {0} not found")]
    CreatureNotFound(EntityId),

    #[error("tile at {0} not found")]
    TileNotFound(Position),
}

impl CombatFault for OracleError {
    fn severity(&self) -> ErrorSeverity {
        // The caller referenced something that moved away or died.
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            OracleError::CreatureNotFound(_) => "ORACLE_CREATURE_NOT_FOUND",
            OracleError::TileNotFound(_) => "ORACLE_TILE_NOT_FOUND",
        }
    }
}
