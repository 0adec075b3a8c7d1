//! Errors that abort a whole resolution.

use crate::area::AreaError;
use crate::env::OracleError;
use crate::error::{CombatFault, ErrorSeverity};
use crate::state::Direction;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    /// The area has no shape for the facing the caster produced.
    #[error("area not configured for direction {0}")]
    AreaNotConfigured(Direction),

    #[error(transparent)]
    Area(AreaError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("combat already carries {max} conditions")]
    TooManyConditions { max: usize },
}

impl From<AreaError> for CombatError {
    fn from(err: AreaError) -> Self {
        match err {
            AreaError::DirectionNotConfigured(direction) => CombatError::AreaNotConfigured(direction),
            other => CombatError::Area(other),
        }
    }
}

impl CombatFault for CombatError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            CombatError::Oracle(err) => err.severity(),
            CombatError::AreaNotConfigured(_) | CombatError::Area(_) | CombatError::TooManyConditions { .. } => {
                ErrorSeverity::Fatal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            CombatError::AreaNotConfigured(_) => "COMBAT_AREA_NOT_CONFIGURED",
            CombatError::Area(err) => err.error_code(),
            CombatError::Oracle(err) => err.error_code(),
            CombatError::TooManyConditions { .. } => "COMBAT_TOO_MANY_CONDITIONS",
        }
    }
}
