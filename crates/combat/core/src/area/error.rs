//! Area geometry errors.

use crate::error::{CombatFault, ErrorSeverity};
use crate::state::Direction;

use super::GridCell;

/// Errors raised while building or querying an area of effect.
///
/// All of these indicate a misconfigured combat definition. None of them can
/// be caused by world state, so they are never retried.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AreaError {
    /// Template length is not a whole number of rows.
    #[error("area template of {len} cells cannot be split into {rows} rows")]
    TemplateShape { len: usize, rows: u32 },

    /// Cell vector does not match the declared dimensions.
    #[error("expected {expected} cells, got {actual}")]
    CellCount { expected: usize, actual: usize },

    /// Origin lies outside the grid.
    #[error("origin {origin:?} outside {rows}x{cols} grid")]
    OriginOutOfBounds { origin: GridCell, rows: u32, cols: u32 },

    /// Direction slot was never built.
    #[error("area has no shape for direction {0}")]
    DirectionNotConfigured(Direction),
}

impl CombatFault for AreaError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        use AreaError::*;
        match self {
            TemplateShape { .. } => "AREA_TEMPLATE_SHAPE",
            CellCount { .. } => "AREA_CELL_COUNT",
            OriginOutOfBounds { .. } => "AREA_ORIGIN_OUT_OF_BOUNDS",
            DirectionNotConfigured(_) => "AREA_DIRECTION_NOT_CONFIGURED",
        }
    }
}
