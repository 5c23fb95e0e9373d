#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Light Bulbs experience.

use light_bulbs_core::{CellCoord, LightView, TileView};
use light_bulbs_world::{query, World};

/// Produces data required to greet the player and present the board.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Board dimensions as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(&self, world: &World) -> (u32, u32) {
        query::dimensions(world)
    }

    /// Exposes every tile for presentation purposes.
    #[must_use]
    pub fn tiles(&self, world: &World) -> TileView {
        query::tile_view(world)
    }

    /// Exposes every light for presentation purposes.
    #[must_use]
    pub fn lights(&self, world: &World) -> LightView {
        query::light_view(world)
    }

    /// Exposes the battery positions for presentation purposes.
    #[must_use]
    pub fn batteries(&self, world: &World) -> Vec<CellCoord> {
        query::batteries(world)
    }

    /// Reports whether the current board is solved.
    #[must_use]
    pub fn is_solved(&self, world: &World) -> bool {
        query::is_solved(world)
    }
}
