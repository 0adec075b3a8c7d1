//! Direction-dependent area shapes.
//!
//! A [`DirectionalArea`] is authored once (from a template, a cone or a
//! radius) and stores one pre-rotated [`ShapeGrid`] per compass direction.
//! At resolution time the caster→target offset picks the slot.

use crate::state::{Direction, Position};

use super::{AreaError, ShapeGrid};

/// Concentric rings used by radius areas. `1` is the center, `8` the outermost ring.
const RING_TEMPLATE: [[u32; 13]; 13] = [
    [0, 0, 0, 0, 0, 0, 8, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 8, 8, 7, 8, 8, 0, 0, 0, 0],
    [0, 0, 0, 8, 7, 6, 6, 6, 7, 8, 0, 0, 0],
    [0, 0, 8, 7, 6, 5, 5, 5, 6, 7, 8, 0, 0],
    [0, 8, 7, 6, 5, 4, 4, 4, 5, 6, 7, 8, 0],
    [0, 8, 6, 5, 4, 3, 2, 3, 4, 5, 6, 8, 0],
    [8, 7, 6, 5, 4, 2, 1, 2, 4, 5, 6, 7, 8],
    [0, 8, 6, 5, 4, 3, 2, 3, 4, 5, 6, 8, 0],
    [0, 8, 7, 6, 5, 4, 4, 4, 5, 6, 7, 8, 0],
    [0, 0, 8, 7, 6, 5, 5, 5, 6, 7, 8, 0, 0],
    [0, 0, 0, 8, 7, 6, 6, 6, 7, 8, 0, 0, 0],
    [0, 0, 0, 0, 8, 8, 7, 8, 8, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 8, 0, 0, 0, 0, 0, 0],
];

/// Up to eight shapes indexed by [`Direction`].
///
/// Immutable after construction; share it behind an `Arc`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectionalArea {
    slots: [Option<ShapeGrid>; Direction::COUNT],
    has_diagonals: bool,
}

impl DirectionalArea {
    /// Builds the four cardinal shapes from a north-facing template.
    ///
    /// # Errors
    ///
    /// Returns `AreaError::TemplateShape` if the template is not `rows` whole rows.
    pub fn from_template(values: &[u32], rows: u32) -> Result<Self, AreaError> {
        let mut area = Self::default();
        area.set_cardinals(ShapeGrid::from_template(values, rows)?);
        Ok(area)
    }

    /// Tapering wave of `length` rows that loses one column on each side every
    /// `spread` rows. A `spread` of zero yields a straight beam.
    ///
    /// # Errors
    ///
    /// Returns `AreaError::TemplateShape` for a zero length.
    pub fn cone(length: u32, spread: u32) -> Result<Self, AreaError> {
        let (values, rows) = cone_template(length, spread);
        Self::from_template(&values, rows)
    }

    /// Circle of ring values `1..=radius` around the target.
    pub fn circle(radius: u32) -> Self {
        let values: Vec<u32> = RING_TEMPLATE
            .iter()
            .flatten()
            .map(|&ring| match ring {
                1 => 3,
                ring if ring > 0 && ring <= radius => 1,
                _ => 0,
            })
            .collect();

        let mut area = Self::default();
        // 13 rows of 13 cells always parse.
        if let Ok(grid) = ShapeGrid::from_template(&values, RING_TEMPLATE.len() as u32) {
            area.set_cardinals(grid);
        }
        area
    }

    /// Adds the four diagonal shapes from a north-west facing template.
    ///
    /// An empty template leaves the area unchanged.
    ///
    /// # Errors
    ///
    /// Returns `AreaError::TemplateShape` if the template is not `rows` whole rows.
    pub fn with_diagonals(mut self, values: &[u32], rows: u32) -> Result<Self, AreaError> {
        if values.is_empty() {
            return Ok(self);
        }

        let grid = ShapeGrid::from_template(values, rows)?;
        self.slots[Direction::NorthEast.index()] = Some(grid.mirror());
        self.slots[Direction::SouthWest.index()] = Some(grid.flip());
        self.slots[Direction::SouthEast.index()] = Some(grid.transpose());
        self.slots[Direction::NorthWest.index()] = Some(grid);
        self.has_diagonals = true;
        Ok(self)
    }

    pub fn has_diagonals(&self) -> bool {
        self.has_diagonals
    }

    /// The shape stored for `direction`, if that slot was built.
    pub fn shape(&self, direction: Direction) -> Option<&ShapeGrid> {
        self.slots[direction.index()].as_ref()
    }

    /// Direction slot used when `caster` acts on `target`.
    pub fn direction_for(&self, caster: Position, target: Position) -> Direction {
        let dx = target.offset_x(caster);
        let dy = target.offset_y(caster);

        if self.has_diagonals && dx != 0 && dy != 0 {
            return match (dx < 0, dy < 0) {
                (true, true) => Direction::NorthWest,
                (false, true) => Direction::NorthEast,
                (true, false) => Direction::SouthWest,
                (false, false) => Direction::SouthEast,
            };
        }

        if dx < 0 {
            Direction::West
        } else if dx > 0 {
            Direction::East
        } else if dy < 0 {
            Direction::North
        } else {
            Direction::South
        }
    }

    /// Shape to project when `caster` acts on `target`.
    ///
    /// # Errors
    ///
    /// Returns `AreaError::DirectionNotConfigured` when the selected slot was never built.
    pub fn select(&self, caster: Position, target: Position) -> Result<&ShapeGrid, AreaError> {
        let direction = self.direction_for(caster, target);
        self.shape(direction)
            .ok_or(AreaError::DirectionNotConfigured(direction))
    }

    fn set_cardinals(&mut self, north: ShapeGrid) {
        self.slots[Direction::East.index()] = Some(north.rotate90());
        self.slots[Direction::South.index()] = Some(north.rotate180());
        self.slots[Direction::West.index()] = Some(north.rotate270());
        self.slots[Direction::North.index()] = Some(north);
    }
}

/// Numeric template and row count for a wave of `length` rows.
fn cone_template(length: u32, spread: u32) -> (Vec<u32>, u32) {
    let rows = length as i64;
    let spread = spread as i64;
    let cols = if spread != 0 {
        ((rows - rows % spread) / spread) * 2 + 1
    } else {
        1
    };

    let center = (cols - cols % 2) / 2 + 1;
    let mut col_spread = cols;
    let mut values = Vec::with_capacity((rows * cols) as usize);
    for y in 1..=rows {
        let min_col = cols - col_spread + 1;
        let max_col = col_spread;

        for x in 1..=cols {
            let value = if y == rows && x == center {
                3
            } else if x >= min_col && x <= max_col {
                1
            } else {
                0
            };
            values.push(value);
        }

        if spread > 0 && y % spread == 0 {
            col_spread -= 1;
        }
    }

    (values, length)
}
