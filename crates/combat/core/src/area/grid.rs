//! Boolean shape grids and their geometric transforms.

use super::AreaError;

/// Cell coordinate inside a grid: `x` is the column, `y` the row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCell {
    pub x: u32,
    pub y: u32,
}

impl GridCell {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Immutable row-major boolean grid with one anchor cell.
///
/// The origin is the cell that lands on the target position when the grid is
/// projected onto the world. Every transform returns a new grid and moves the
/// origin along with the cells.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapeGrid {
    rows: u32,
    cols: u32,
    cells: Vec<bool>,
    origin: GridCell,
}

impl ShapeGrid {
    /// Creates a grid from row-major cells.
    ///
    /// # Errors
    ///
    /// Returns `AreaError::CellCount` if `cells.len() != rows * cols` and
    /// `AreaError::OriginOutOfBounds` if the origin lies outside the grid.
    pub fn new(rows: u32, cols: u32, cells: Vec<bool>, origin: GridCell) -> Result<Self, AreaError> {
        let expected = rows as usize * cols as usize;
        if cells.len() != expected {
            return Err(AreaError::CellCount {
                expected,
                actual: cells.len(),
            });
        }
        if rows > 0 && cols > 0 && (origin.x >= cols || origin.y >= rows) {
            return Err(AreaError::OriginOutOfBounds { origin, rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            cells,
            origin,
        })
    }

    /// Parses a numeric template.
    ///
    /// Cell values: `0` empty, `1` active, `2` origin only, `3` active origin.
    /// When several cells claim the origin the last one wins; without any, the
    /// origin is the top-left cell.
    ///
    /// # Errors
    ///
    /// Returns `AreaError::TemplateShape` when `rows` is zero or does not
    /// evenly divide the template length.
    pub fn from_template(values: &[u32], rows: u32) -> Result<Self, AreaError> {
        if rows == 0 || values.len() % rows as usize != 0 {
            return Err(AreaError::TemplateShape {
                len: values.len(),
                rows,
            });
        }
        let cols = (values.len() / rows as usize) as u32;

        let mut cells = Vec::with_capacity(values.len());
        let mut origin = GridCell::default();
        for (index, &value) in values.iter().enumerate() {
            cells.push(value == 1 || value == 3);
            if value == 2 || value == 3 {
                let index = index as u32;
                origin = GridCell::new(index % cols, index / cols);
            }
        }

        Self::new(rows, cols, cells, origin)
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn origin(&self) -> GridCell {
        self.origin
    }

    /// Whether the cell at `(row, col)` participates in the area.
    pub fn is_active(&self, row: u32, col: u32) -> bool {
        row < self.rows && col < self.cols && self.cells[self.index(row, col)]
    }

    pub fn active_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }

    /// Active cells in row-major scan order as `(row, col)`.
    pub fn active_cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &active)| active)
            .map(|(index, _)| {
                let index = index as u32;
                (index / self.cols, index % self.cols)
            })
    }

    /// Clockwise quarter turn; dimensions swap.
    pub fn rotate90(&self) -> Self {
        let (rows, cols) = (self.cols, self.rows);
        self.remap(rows, cols, |r, c| (self.rows - 1 - c, r), |o| {
            GridCell::new(self.rows - 1 - o.y, o.x)
        })
    }

    pub fn rotate180(&self) -> Self {
        let mut cells = self.cells.clone();
        cells.reverse();
        Self {
            rows: self.rows,
            cols: self.cols,
            cells,
            origin: GridCell::new(self.cols - 1 - self.origin.x, self.rows - 1 - self.origin.y),
        }
    }

    /// Counter-clockwise quarter turn; dimensions swap.
    pub fn rotate270(&self) -> Self {
        let (rows, cols) = (self.cols, self.rows);
        self.remap(rows, cols, |r, c| (c, self.cols - 1 - r), |o| {
            GridCell::new(o.y, self.cols - 1 - o.x)
        })
    }

    /// Horizontal flip: column order reversed in every row.
    pub fn mirror(&self) -> Self {
        self.remap(self.rows, self.cols, |r, c| (r, self.cols - 1 - c), |o| {
            GridCell::new(self.cols - 1 - o.x, o.y)
        })
    }

    /// Vertical flip: row order reversed.
    pub fn flip(&self) -> Self {
        self.remap(self.rows, self.cols, |r, c| (self.rows - 1 - r, c), |o| {
            GridCell::new(o.x, self.rows - 1 - o.y)
        })
    }

    pub fn transpose(&self) -> Self {
        let (rows, cols) = (self.cols, self.rows);
        self.remap(rows, cols, |r, c| (c, r), |o| GridCell::new(o.y, o.x))
    }

    fn index(&self, row: u32, col: u32) -> usize {
        row as usize * self.cols as usize + col as usize
    }

    /// Builds a `rows × cols` grid whose cell `(r, c)` copies `source(r, c)` of self.
    fn remap(
        &self,
        rows: u32,
        cols: u32,
        source: impl Fn(u32, u32) -> (u32, u32),
        origin: impl Fn(GridCell) -> GridCell,
    ) -> Self {
        if self.cells.is_empty() {
            return self.clone();
        }

        let mut cells = Vec::with_capacity(self.cells.len());
        for r in 0..rows {
            for c in 0..cols {
                let (sr, sc) = source(r, c);
                cells.push(self.cells[self.index(sr, sc)]);
            }
        }

        Self {
            rows,
            cols,
            cells,
            origin: origin(self.origin),
        }
    }
}
