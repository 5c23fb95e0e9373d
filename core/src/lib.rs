#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Light Bulbs engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable views, and respond exclusively with new command batches.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Light Bulbs!";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replaces the current board with the provided level layout.
    LoadLevel {
        /// Validated layout describing every cell and its initial rotation count.
        layout: LevelLayout,
    },
    /// Rotates each listed tile a quarter turn, then recomputes the circuit once.
    RotateTiles {
        /// Cells whose tiles should rotate. Duplicate entries rotate again.
        cells: Vec<CellCoord>,
    },
    /// Recomputes the circuit without touching any tile.
    RefreshCircuit,
    /// Asks for the current level to be rebuilt from scratch.
    RequestRestart,
}

/// Events broadcast by the world and systems after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a fresh board replaced the previous one.
    LevelLoaded {
        /// Number of tile columns in the new board.
        columns: u32,
        /// Number of tile rows in the new board.
        rows: u32,
        /// Number of batteries discovered in the layout.
        batteries: u32,
        /// Number of lights discovered in the layout.
        lights: u32,
    },
    /// Confirms that a tile rotated a quarter turn.
    TileRotated {
        /// Cell holding the rotated tile.
        cell: CellCoord,
        /// Orientation of the tile after the rotation.
        orientation: Orientation,
    },
    /// Reports that a rotation request was ignored.
    RotationRejected {
        /// Cell named by the rejected request.
        cell: CellCoord,
        /// Specific reason the rotation failed.
        reason: RotationError,
    },
    /// Reports the outcome of a full connectivity pass.
    CircuitRecomputed {
        /// Number of tiles carrying power after the pass.
        energized_tiles: u32,
        /// Number of lights that are lit after the pass.
        lit_lights: u32,
        /// Number of lights on the board.
        total_lights: u32,
    },
    /// Announces that a light changed state during the latest pass.
    LightSwitched {
        /// Identifier of the light that changed.
        light: LightId,
        /// Cell the light occupies.
        cell: CellCoord,
        /// Whether the light is lit after the pass.
        lit: bool,
    },
    /// Announces that every light on the board became lit.
    PuzzleSolved,
    /// Announces that a restart of the current level was requested.
    RestartRequested,
    /// Publishes the latest progress summary computed by the progress system.
    ProgressUpdated {
        /// Snapshot of the player's progress.
        report: ProgressReport,
    },
}

/// Reasons a rotation request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationError {
    /// No level has been loaded yet.
    NoLevel,
    /// The requested cell lies outside the board.
    OutOfBounds,
}

/// Cardinal directions naming the four sides of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Up, toward decreasing row indices.
    North,
    /// Right, toward increasing column indices.
    East,
    /// Down, toward increasing row indices.
    South,
    /// Left, toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::North => 0b0001,
            Self::East => 0b0010,
            Self::South => 0b0100,
            Self::West => 0b1000,
        }
    }
}

/// Set of tile sides that carry a wire end.
///
/// Bits are laid out clockwise (north, east, south, west) so a quarter turn
/// is a 4-bit rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connections(u8);

impl Connections {
    /// No side is connected.
    pub const NONE: Self = Self(0);
    /// Every side is connected.
    pub const ALL: Self = Self(0b1111);

    /// Builds a connection set from one flag per side.
    #[must_use]
    pub const fn from_sides(up: bool, down: bool, left: bool, right: bool) -> Self {
        let mut bits = 0;
        if up {
            bits |= Direction::North.bit();
        }
        if down {
            bits |= Direction::South.bit();
        }
        if left {
            bits |= Direction::West.bit();
        }
        if right {
            bits |= Direction::East.bit();
        }
        Self(bits)
    }

    /// Returns a copy of the set with the provided side connected.
    #[must_use]
    pub const fn with(self, direction: Direction) -> Self {
        Self(self.0 | direction.bit())
    }

    /// Reports whether the provided side carries a wire end.
    #[must_use]
    pub const fn connects(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    /// Applies a single quarter turn.
    ///
    /// The new up side takes the old left, left takes down, down takes right
    /// and right takes up.
    #[must_use]
    pub const fn rotated(self) -> Self {
        Self(((self.0 << 1) | (self.0 >> 3)) & 0b1111)
    }

    /// Number of connected sides.
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Reports whether no side is connected.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw 4-bit representation, north in the lowest bit.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

/// Number of counter-clockwise quarter turns applied to a tile, in `0..4`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Orientation(u8);

impl Orientation {
    /// Orientation of a freshly created tile.
    pub const ZERO: Self = Self(0);

    /// Creates an orientation, wrapping the provided value into `0..4`.
    #[must_use]
    pub const fn new(quarter_turns: u8) -> Self {
        Self(quarter_turns % 4)
    }

    /// Number of quarter turns represented by the orientation.
    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        self.0
    }

    /// Orientation after one more rotation. Rotations count down modulo four.
    #[must_use]
    pub const fn rotated(self) -> Self {
        Self((self.0 + 3) % 4)
    }
}

/// Kind of piece a level cell was created from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileArchetype {
    /// Blank cell without any wire.
    Empty,
    /// Single-ended stub that hosts a battery.
    Battery,
    /// Single-ended stub that hosts a light.
    Light,
    /// Straight wire running up and down.
    Straight,
    /// Corner wire joining up and right.
    Elbow,
    /// Three-way junction joining up, down and right.
    Tee,
    /// Four-way junction.
    Cross,
}

impl TileArchetype {
    /// Connections carried by the archetype at orientation zero.
    #[must_use]
    pub const fn base_connections(self) -> Connections {
        match self {
            Self::Empty => Connections::NONE,
            Self::Battery | Self::Light => Connections::from_sides(true, false, false, false),
            Self::Straight => Connections::from_sides(true, true, false, false),
            Self::Elbow => Connections::from_sides(true, false, false, true),
            Self::Tee => Connections::from_sides(true, true, false, true),
            Self::Cross => Connections::ALL,
        }
    }

    /// Reports whether the archetype is a battery or light stub.
    #[must_use]
    pub const fn is_stub(self) -> bool {
        matches!(self, Self::Battery | Self::Light)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Unique identifier assigned to a light, in row-major discovery order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LightId(u32);

impl LightId {
    /// Creates a new light identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// One cell of a level layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutCell {
    /// Piece placed in the cell.
    pub archetype: TileArchetype,
    /// Quarter turns applied to the piece before play begins.
    pub rotations: u8,
}

impl LayoutCell {
    /// Creates a layout cell.
    #[must_use]
    pub const fn new(archetype: TileArchetype, rotations: u8) -> Self {
        Self {
            archetype,
            rotations,
        }
    }

    /// Creates a layout cell without any initial rotation.
    #[must_use]
    pub const fn unrotated(archetype: TileArchetype) -> Self {
        Self::new(archetype, 0)
    }
}

/// Validated rectangular level description consumed by the world.
///
/// Cells are stored in row-major order. Battery and light positions are
/// derived from the cells, so they always lie inside the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LayoutRecord", into = "LayoutRecord")]
pub struct LevelLayout {
    columns: u32,
    rows: u32,
    cells: Vec<LayoutCell>,
}

impl LevelLayout {
    /// Creates a layout after checking that the cells fill the board exactly.
    pub fn new(columns: u32, rows: u32, cells: Vec<LayoutCell>) -> Result<Self, LayoutError> {
        if columns == 0 || rows == 0 {
            return Err(LayoutError::EmptyGrid { columns, rows });
        }

        let expected = usize::try_from(u64::from(columns) * u64::from(rows))
            .map_err(|_| LayoutError::TooLarge { columns, rows })?;
        if cells.len() != expected {
            return Err(LayoutError::CellCountMismatch {
                expected,
                found: cells.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            cells,
        })
    }

    /// Number of columns in the board.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the board.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[LayoutCell] {
        &self.cells
    }

    /// Returns the layout cell at the provided coordinate, if it exists.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<&LayoutCell> {
        if coord.column() >= self.columns || coord.row() >= self.rows {
            return None;
        }
        let index = usize::try_from(coord.row())
            .ok()?
            .checked_mul(usize::try_from(self.columns).ok()?)?
            .checked_add(usize::try_from(coord.column()).ok()?)?;
        self.cells.get(index)
    }

    /// Iterates over every cell together with its coordinate in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &LayoutCell)> + '_ {
        let columns = self.columns;
        (0..self.rows)
            .flat_map(move |row| (0..columns).map(move |column| CellCoord::new(column, row)))
            .zip(self.cells.iter())
    }

    /// Coordinates of every cell holding the provided archetype, in row-major order.
    pub fn positions_of(&self, archetype: TileArchetype) -> impl Iterator<Item = CellCoord> + '_ {
        self.iter()
            .filter(move |(_, cell)| cell.archetype == archetype)
            .map(|(coord, _)| coord)
    }

    /// Produces a copy of the layout whose rotation counts come from `rotations`.
    #[must_use]
    pub fn with_rotations<F>(&self, mut rotations: F) -> Self
    where
        F: FnMut(CellCoord, TileArchetype) -> u8,
    {
        let cells = self
            .iter()
            .map(|(coord, cell)| LayoutCell::new(cell.archetype, rotations(coord, cell.archetype)))
            .collect();
        Self {
            columns: self.columns,
            rows: self.rows,
            cells,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct LayoutRecord {
    columns: u32,
    rows: u32,
    cells: Vec<LayoutCell>,
}

impl TryFrom<LayoutRecord> for LevelLayout {
    type Error = LayoutError;

    fn try_from(record: LayoutRecord) -> Result<Self, Self::Error> {
        Self::new(record.columns, record.rows, record.cells)
    }
}

impl From<LevelLayout> for LayoutRecord {
    fn from(layout: LevelLayout) -> Self {
        Self {
            columns: layout.columns,
            rows: layout.rows,
            cells: layout.cells,
        }
    }
}

/// Reasons a level layout fails validation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The board has no area.
    #[error("level grid must not be empty (received {columns}x{rows})")]
    EmptyGrid {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// The board does not fit in addressable memory.
    #[error("level grid {columns}x{rows} is too large")]
    TooLarge {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// The number of cells disagrees with the dimensions.
    #[error("level grid expects {expected} cells but {found} were provided")]
    CellCountMismatch {
        /// Cell count implied by the dimensions.
        expected: usize,
        /// Cell count actually provided.
        found: usize,
    },
}

/// Immutable representation of a single tile used for queries and rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileSnapshot {
    /// Cell holding the tile.
    pub cell: CellCoord,
    /// Piece the tile was created from.
    pub archetype: TileArchetype,
    /// Current orientation of the tile.
    pub orientation: Orientation,
    /// Sides connected after applying the orientation.
    pub connections: Connections,
    /// Whether the tile carried power after the most recent pass.
    pub energized: bool,
}

/// Read-only snapshot describing every tile on the board in row-major order.
#[derive(Clone, Debug, Default)]
pub struct TileView {
    columns: u32,
    rows: u32,
    snapshots: Vec<TileSnapshot>,
}

impl TileView {
    /// Creates a new tile view from row-major snapshots.
    #[must_use]
    pub fn from_snapshots(columns: u32, rows: u32, snapshots: Vec<TileSnapshot>) -> Self {
        Self {
            columns,
            rows,
            snapshots,
        }
    }

    /// Provides the dimensions of the captured board as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Returns the snapshot for the provided cell, if it exists.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<&TileSnapshot> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let index = usize::try_from(cell.row()).ok()? * width + usize::try_from(cell.column()).ok()?;
        self.snapshots.get(index)
    }

    /// Iterator over the captured tile snapshots in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &TileSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TileSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single light.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightSnapshot {
    /// Identifier assigned to the light.
    pub id: LightId,
    /// Cell the light occupies.
    pub cell: CellCoord,
    /// Whether the light is lit.
    pub lit: bool,
}

/// Read-only snapshot describing all lights on the board.
#[derive(Clone, Debug, Default)]
pub struct LightView {
    snapshots: Vec<LightSnapshot>,
}

impl LightView {
    /// Creates a new light view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<LightSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured light snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &LightSnapshot> {
        self.snapshots.iter()
    }

    /// Number of lights that are lit.
    #[must_use]
    pub fn lit_count(&self) -> usize {
        self.snapshots.iter().filter(|snapshot| snapshot.lit).count()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<LightSnapshot> {
        self.snapshots
    }
}

/// Summary of the player's progress on the current level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Input events that rotated at least one tile.
    pub moves: u32,
    /// Individual tile rotations.
    pub rotations: u32,
    /// Lights lit after the latest pass.
    pub lit_lights: u32,
    /// Lights on the board.
    pub total_lights: u32,
    /// Whether every light is lit.
    pub solved: bool,
    /// Restarts requested since the session began.
    pub restarts: u32,
}
