//! Dense tile storage with bounds-checked lookup.

use light_bulbs_core::{
    CellCoord, Connections, Direction, LevelLayout, Orientation, TileArchetype, TileSnapshot,
};
use thiserror::Error;

/// Wire piece occupying a single grid cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    cell: CellCoord,
    archetype: TileArchetype,
    connections: Connections,
    orientation: Orientation,
    energized: bool,
}

impl Tile {
    /// Creates an unrotated, unpowered tile for the provided cell.
    #[must_use]
    pub const fn new(cell: CellCoord, archetype: TileArchetype) -> Self {
        Self {
            cell,
            archetype,
            connections: archetype.base_connections(),
            orientation: Orientation::ZERO,
            energized: false,
        }
    }

    /// Cell the tile was created for.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Piece the tile was created from.
    #[must_use]
    pub const fn archetype(&self) -> TileArchetype {
        self.archetype
    }

    /// Sides currently carrying a wire end.
    #[must_use]
    pub const fn connections(&self) -> Connections {
        self.connections
    }

    /// Current orientation.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Whether the tile carried power after the most recent pass.
    ///
    /// The flag is stale between a rotation and the next recompute.
    #[must_use]
    pub const fn is_energized(&self) -> bool {
        self.energized
    }

    /// Rotates the tile a quarter turn.
    pub fn rotate(&mut self) {
        self.connections = self.connections.rotated();
        self.orientation = self.orientation.rotated();
    }

    /// Reports whether the tile has a wire end on the provided side.
    #[must_use]
    pub const fn connects_toward(&self, direction: Direction) -> bool {
        self.connections.connects(direction)
    }

    pub(crate) fn set_energized(&mut self, energized: bool) {
        self.energized = energized;
    }

    /// Captures an immutable snapshot of the tile.
    #[must_use]
    pub const fn snapshot(&self) -> TileSnapshot {
        TileSnapshot {
            cell: self.cell,
            archetype: self.archetype,
            orientation: self.orientation,
            connections: self.connections,
            energized: self.energized,
        }
    }
}

/// Rectangular board that exclusively owns one [`Tile`] per cell.
#[derive(Clone, Debug, Default)]
pub struct Grid {
    columns: u32,
    rows: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Builds a grid from a validated layout, applying each cell's initial rotations.
    #[must_use]
    pub fn from_layout(layout: &LevelLayout) -> Self {
        let tiles = layout
            .iter()
            .map(|(cell, layout_cell)| {
                let mut tile = Tile::new(cell, layout_cell.archetype);
                for _ in 0..layout_cell.rotations % 4 {
                    tile.rotate();
                }
                tile
            })
            .collect();

        Self {
            columns: layout.columns(),
            rows: layout.rows(),
            tiles,
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Returns the tile at the provided cell.
    pub fn get(&self, cell: CellCoord) -> Result<&Tile, GridError> {
        self.index(cell)
            .and_then(|index| self.tiles.get(index))
            .ok_or_else(|| self.out_of_bounds(cell))
    }

    pub(crate) fn get_mut(&mut self, cell: CellCoord) -> Result<&mut Tile, GridError> {
        let error = self.out_of_bounds(cell);
        match self.index(cell) {
            Some(index) => self.tiles.get_mut(index).ok_or(error),
            None => Err(error),
        }
    }

    /// Returns the adjacent cell in the provided direction when it lies inside the grid.
    #[must_use]
    pub fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        if !self.contains(cell) {
            return None;
        }

        let (column, row) = (cell.column(), cell.row());
        let adjacent = match direction {
            Direction::North => CellCoord::new(column, row.checked_sub(1)?),
            Direction::South => CellCoord::new(column, row.checked_add(1)?),
            Direction::West => CellCoord::new(column.checked_sub(1)?, row),
            Direction::East => CellCoord::new(column.checked_add(1)?, row),
        };

        self.contains(adjacent).then_some(adjacent)
    }

    /// Visits every tile in row-major order.
    pub fn for_each_tile<F>(&self, mut visitor: F)
    where
        F: FnMut(&Tile),
    {
        for tile in &self.tiles {
            visitor(tile);
        }
    }

    pub(crate) fn for_each_tile_mut<F>(&mut self, mut visitor: F)
    where
        F: FnMut(&mut Tile),
    {
        for tile in &mut self.tiles {
            visitor(tile);
        }
    }

    /// Iterator over every tile in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    fn out_of_bounds(&self, cell: CellCoord) -> GridError {
        GridError::OutOfBounds {
            cell,
            columns: self.columns,
            rows: self.rows,
        }
    }
}

/// Errors raised by grid lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The requested cell lies outside the grid.
    #[error("cell {cell} lies outside the {columns}x{rows} grid")]
    OutOfBounds {
        /// Cell that was requested.
        cell: CellCoord,
        /// Number of columns in the grid.
        columns: u32,
        /// Number of rows in the grid.
        rows: u32,
    },
}
