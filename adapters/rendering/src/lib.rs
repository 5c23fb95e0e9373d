#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Light Bulbs adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use light_bulbs_core::{
    CellCoord, Connections, LightId, LightSnapshot, Orientation, TileArchetype, TileSnapshot,
};
use std::{error::Error, fmt, time::Duration};

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Pointer position expressed in board units, with the board origin at the top-left corner.
    pub cursor_world_space: Option<Vec2>,
    /// Whether the pointer went down on this frame.
    pub pointer_pressed: bool,
    /// Whether the pointer was lifted on this frame.
    pub pointer_released: bool,
    /// Half-extent of the pointer footprint. Zero for a mouse cursor.
    pub pointer_radius: f32,
    /// Whether the player asked for a fresh board on this frame.
    pub restart_requested: bool,
}

/// Describes the rectangular tile grid that adapters draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single tile expressed in board units.
    pub tile_length: f32,
}

impl TileGridPresentation {
    /// Tile length used by the reference presentation.
    pub const DEFAULT_TILE_LENGTH: f32 = 60.0;

    /// Creates a new tile grid descriptor.
    ///
    /// Returns an error when `tile_length` is not a positive finite number.
    pub fn new(
        columns: u32,
        rows: u32,
        tile_length: f32,
    ) -> std::result::Result<Self, RenderingError> {
        if !tile_length.is_finite() || tile_length <= 0.0 {
            return Err(RenderingError::InvalidTileLength { tile_length });
        }

        Ok(Self {
            columns,
            rows,
            tile_length,
        })
    }

    /// Board-space position of the centre of the provided cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            (cell.column() as f32 + 0.5) * self.tile_length,
            (cell.row() as f32 + 0.5) * self.tile_length,
        )
    }
}

/// Visual description of a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TilePresentation {
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

impl TilePresentation {
    /// Creates a presentation from a world snapshot.
    #[must_use]
    pub const fn from_snapshot(snapshot: &TileSnapshot) -> Self {
        Self {
            cell: snapshot.cell,
            archetype: snapshot.archetype,
            orientation: snapshot.orientation,
            connections: snapshot.connections,
            energized: snapshot.energized,
        }
    }

    /// Counter-clockwise rotation that should be applied to the sprite.
    #[must_use]
    pub fn rotation_degrees(&self) -> f32 {
        f32::from(self.orientation.quarter_turns()) * 90.0
    }

    /// Name of the wire sprite drawn for the tile, or `None` for empty cells.
    ///
    /// Battery and light cells draw a single-ended wire beneath their overlay.
    #[must_use]
    pub const fn sprite_key(&self) -> Option<&'static str> {
        let (off, on) = match self.archetype {
            TileArchetype::Empty => return None,
            TileArchetype::Battery | TileArchetype::Light => ("wire1_off", "wire1_on"),
            TileArchetype::Straight => ("wire2a_off", "wire2a_on"),
            TileArchetype::Elbow => ("wire2b_off", "wire2b_on"),
            TileArchetype::Tee => ("wire3_off", "wire3_on"),
            TileArchetype::Cross => ("wire4_off", "wire4_on"),
        };
        Some(if self.energized { on } else { off })
    }

    /// Name of the unrotated sprite drawn on top of the wire, if any.
    #[must_use]
    pub const fn overlay_key(&self) -> Option<&'static str> {
        match self.archetype {
            TileArchetype::Battery => Some("battery"),
            TileArchetype::Light if self.energized => Some("bulb_on"),
            TileArchetype::Light => Some("bulb_off"),
            _ => None,
        }
    }
}

/// Visual description of a single light.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightPresentation {
    /// Identifier assigned to the light.
    pub id: LightId,
    /// Cell the light occupies.
    pub cell: CellCoord,
    /// Whether the light is lit.
    pub lit: bool,
}

impl From<&LightSnapshot> for LightPresentation {
    fn from(snapshot: &LightSnapshot) -> Self {
        Self {
            id: snapshot.id,
            cell: snapshot.cell,
            lit: snapshot.lit,
        }
    }
}

/// Scene description combining the tile grid and the circuit state.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Tile grid that composes the play area.
    pub tile_grid: TileGridPresentation,
    /// Tiles in row-major order.
    pub tiles: Vec<TilePresentation>,
    /// Lights ordered by identifier.
    pub lights: Vec<LightPresentation>,
    /// Cells holding batteries.
    pub batteries: Vec<CellCoord>,
    /// Whether every light is lit.
    pub solved: bool,
    /// Short status message shown beneath the board.
    pub status_line: String,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        tile_grid: TileGridPresentation,
        tiles: Vec<TilePresentation>,
        lights: Vec<LightPresentation>,
        batteries: Vec<CellCoord>,
        solved: bool,
        status_line: String,
    ) -> Self {
        Self {
            tile_grid,
            tiles,
            lights,
            batteries,
            solved,
            status_line,
        }
    }

    /// Returns the tile drawn at the provided cell.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<&TilePresentation> {
        if cell.column() >= self.tile_grid.columns || cell.row() >= self.tile_grid.rows {
            return None;
        }
        let index = cell.row() as usize * self.tile_grid.columns as usize + cell.column() as usize;
        self.tiles.get(index)
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            scene,
        }
    }
}

/// Rendering backend capable of presenting Light Bulbs scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and refreshes the scene before it is
    /// presented.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Tile length must be a positive finite number.
    InvalidTileLength {
        /// Provided length that failed validation.
        tile_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileLength { tile_length } => {
                write!(
                    f,
                    "tile_length must be positive and finite (received {tile_length})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
