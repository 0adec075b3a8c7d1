use crate::config::CombatConfig;
use crate::env::{WorldMutator, WorldOracle};
use crate::state::{Direction, Position, TileView};

use super::{AreaError, DirectionalArea};

/// Lays `area` onto the world around `target` and returns the affected locations.
///
/// `reference` is the caster position, or the target itself for casterless
/// combats. It picks the facing of the area; sight is then checked from the
/// target's neighbour on the caster side to every active cell. Locations are
/// materialized on demand and returned in row-major stencil order. Without an
/// area only the target location is returned.
///
/// # Errors
///
/// Returns `AreaError::DirectionNotConfigured` when the facing selects a slot
/// the area never built.
pub fn project_area<W>(
    world: &mut W,
    config: &CombatConfig,
    reference: Position,
    target: Position,
    area: Option<&DirectionalArea>,
) -> Result<Vec<TileView>, AreaError>
where
    W: WorldOracle + WorldMutator + ?Sized,
{
    if target.z >= config.max_layers {
        return Ok(Vec::new());
    }

    let Some(area) = area else {
        return Ok(vec![world.materialize_tile(target)]);
    };

    let shape = area.select(reference, target)?;
    let sight_from = Direction::towards(target, reference).map_or(target, |heading| target.step(heading));
    let origin = shape.origin();
    let left = target.x - origin.x as i32;
    let top = target.y - origin.y as i32;

    let mut tiles = Vec::with_capacity(shape.active_count());
    for (row, col) in shape.active_cells() {
        let position = Position::new(left + col as i32, top + row as i32, target.z);
        if world.line_of_sight(sight_from, position) {
            tiles.push(world.materialize_tile(position));
        }
    }

    tracing::debug!(%target, tiles = tiles.len(), "projected area");
    Ok(tiles)
}
