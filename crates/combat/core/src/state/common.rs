use std::fmt;

/// Unique identifier for any creature tracked by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discrete world position: tile coordinates plus vertical layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: u8,
}

impl Position {
    pub const fn new(x: i32, y: i32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Signed horizontal offset `self.x - other.x`.
    pub const fn offset_x(self, other: Position) -> i32 {
        self.x - other.x
    }

    /// Signed vertical offset `self.y - other.y`.
    pub const fn offset_y(self, other: Position) -> i32 {
        self.y - other.y
    }

    pub const fn distance_x(self, other: Position) -> u32 {
        self.offset_x(other).unsigned_abs()
    }

    pub const fn distance_y(self, other: Position) -> u32 {
        self.offset_y(other).unsigned_abs()
    }

    /// The neighbouring position one step in `direction`, on the same layer.
    pub fn step(self, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        Position::new(self.x + dx, self.y + dy, self.z)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Compass direction. Discriminants double as slot indices in a directional area table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
    SouthWest = 4,
    SouthEast = 5,
    NorthWest = 6,
    NorthEast = 7,
}

impl Direction {
    /// Number of compass directions (and slots in a directional table).
    pub const COUNT: usize = 8;

    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn is_diagonal(self) -> bool {
        self.index() >= 4
    }

    /// Unit step `(dx, dy)`; north is negative y.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::SouthWest => (-1, 1),
            Direction::SouthEast => (1, 1),
            Direction::NorthWest => (-1, -1),
            Direction::NorthEast => (1, -1),
        }
    }

    /// Eight-way heading from `from` towards `to`, `None` when both coincide.
    ///
    /// Ties between an axis and a diagonal resolve to the diagonal; otherwise
    /// the dominant axis wins.
    pub fn towards(from: Position, to: Position) -> Option<Direction> {
        if from.x == to.x && from.y == to.y {
            return None;
        }

        let mut x_offset = from.offset_x(to);
        let mut heading = if x_offset < 0 {
            x_offset = -x_offset;
            Direction::East
        } else {
            Direction::West
        };

        let y_offset = from.offset_y(to);
        if y_offset >= 0 {
            if y_offset > x_offset {
                heading = Direction::North;
            } else if y_offset == x_offset {
                heading = match heading {
                    Direction::East => Direction::NorthEast,
                    _ => Direction::NorthWest,
                };
            }
        } else {
            let y_offset = -y_offset;
            if y_offset > x_offset {
                heading = Direction::South;
            } else if y_offset == x_offset {
                heading = match heading {
                    Direction::East => Direction::SouthEast,
                    _ => Direction::SouthWest,
                };
            }
        }

        Some(heading)
    }
}

/// Integer resource meter (health, mana) tracked per creature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    pub current: i32,
    pub maximum: i32,
}

impl ResourceMeter {
    pub const fn new(current: i32, maximum: i32) -> Self {
        Self { current, maximum }
    }

    pub const fn full(maximum: i32) -> Self {
        Self::new(maximum, maximum)
    }

    pub const fn is_full(self) -> bool {
        self.current >= self.maximum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn towards_prefers_dominant_axis() {
        let origin = Position::new(10, 10, 7);
        assert_eq!(Direction::towards(origin, origin), None);
        assert_eq!(
            Direction::towards(origin, Position::new(10, 5, 7)),
            Some(Direction::North)
        );
        assert_eq!(
            Direction::towards(origin, Position::new(14, 11, 7)),
            Some(Direction::East)
        );
        assert_eq!(
            Direction::towards(origin, Position::new(7, 13, 7)),
            Some(Direction::SouthWest)
        );
        assert_eq!(
            Direction::towards(origin, Position::new(12, 8, 7)),
            Some(Direction::NorthEast)
        );
    }

    #[test]
    fn step_follows_delta() {
        let origin = Position::new(0, 0, 3);
        assert_eq!(origin.step(Direction::North), Position::new(0, -1, 3));
        assert_eq!(origin.step(Direction::SouthEast), Position::new(1, 1, 3));
    }
}
