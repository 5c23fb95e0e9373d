#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state management for Light Bulbs.

mod circuit;
mod grid;

use light_bulbs_core::{
    CellCoord, Command, Event, LevelLayout, LightId, RotationError, TileArchetype, WELCOME_BANNER,
};
use tracing::{debug, info};

pub use grid::{Grid, GridError, Tile};

/// Represents the authoritative Light Bulbs board.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: Grid,
    batteries: Vec<Battery>,
    lights: Vec<Light>,
    loaded: bool,
    solved: bool,
}

impl World {
    /// Creates an empty world that waits for a level to be loaded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            grid: Grid::default(),
            batteries: Vec::new(),
            lights: Vec::new(),
            loaded: false,
            solved: false,
        }
    }

    fn load(&mut self, layout: &LevelLayout, out_events: &mut Vec<Event>) {
        self.grid = Grid::from_layout(layout);
        self.batteries = layout
            .positions_of(TileArchetype::Battery)
            .map(|cell| Battery { cell })
            .collect();
        self.lights = layout
            .positions_of(TileArchetype::Light)
            .enumerate()
            .map(|(index, cell)| Light {
                id: LightId::new(count_u32(index)),
                cell,
                lit: false,
            })
            .collect();
        self.loaded = true;
        self.solved = false;

        debug!(
            columns = layout.columns(),
            rows = layout.rows(),
            batteries = self.batteries.len(),
            lights = self.lights.len(),
            "level loaded"
        );
        out_events.push(Event::LevelLoaded {
            columns: layout.columns(),
            rows: layout.rows(),
            batteries: count_u32(self.batteries.len()),
            lights: count_u32(self.lights.len()),
        });

        self.recompute(out_events);
    }

    fn rotate_tiles(&mut self, cells: Vec<CellCoord>, out_events: &mut Vec<Event>) {
        let mut rotated = false;
        for cell in cells {
            if !self.loaded {
                out_events.push(Event::RotationRejected {
                    cell,
                    reason: RotationError::NoLevel,
                });
                continue;
            }

            match self.grid.get_mut(cell) {
                Ok(tile) => {
                    tile.rotate();
                    rotated = true;
                    out_events.push(Event::TileRotated {
                        cell,
                        orientation: tile.orientation(),
                    });
                }
                Err(error) => {
                    debug!(%error, "rotation rejected");
                    out_events.push(Event::RotationRejected {
                        cell,
                        reason: RotationError::OutOfBounds,
                    });
                }
            }
        }

        if rotated {
            self.recompute(out_events);
        }
    }

    fn recompute(&mut self, out_events: &mut Vec<Event>) {
        let energized = circuit::propagate(
            &mut self.grid,
            self.batteries.iter().map(|battery| battery.cell),
        );

        let mut lit_lights: u32 = 0;
        for light in &mut self.lights {
            let lit = self
                .grid
                .get(light.cell)
                .map(Tile::is_energized)
                .unwrap_or_else(|error| panic!("light refers to an invalid cell: {error}"));
            if lit != light.lit {
                light.lit = lit;
                out_events.push(Event::LightSwitched {
                    light: light.id,
                    cell: light.cell,
                    lit,
                });
            }
            if lit {
                lit_lights += 1;
            }
        }

        let total_lights = count_u32(self.lights.len());
        out_events.push(Event::CircuitRecomputed {
            energized_tiles: energized,
            lit_lights,
            total_lights,
        });

        let solved = total_lights > 0 && lit_lights == total_lights;
        if solved && !self.solved {
            info!(lights = total_lights, "puzzle solved");
            out_events.push(Event::PuzzleSolved);
        }
        self.solved = solved;
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { layout } => world.load(&layout, out_events),
        Command::RotateTiles { cells } => world.rotate_tiles(cells, out_events),
        Command::RefreshCircuit => {
            if world.loaded {
                world.recompute(out_events);
            }
        }
        Command::RequestRestart => out_events.push(Event::RestartRequested),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use light_bulbs_core::{CellCoord, LightSnapshot, LightView, TileSnapshot, TileView};

    use super::{GridError, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides the board dimensions as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.grid.columns(), world.grid.rows())
    }

    /// Captures the tile at the provided cell.
    pub fn tile(world: &World, cell: CellCoord) -> Result<TileSnapshot, GridError> {
        world.grid.get(cell).map(|tile| tile.snapshot())
    }

    /// Captures every tile in row-major order.
    #[must_use]
    pub fn tile_view(world: &World) -> TileView {
        let snapshots = world.grid.iter().map(|tile| tile.snapshot()).collect();
        TileView::from_snapshots(world.grid.columns(), world.grid.rows(), snapshots)
    }

    /// Captures the lit state of every light.
    #[must_use]
    pub fn light_view(world: &World) -> LightView {
        LightView::from_snapshots(
            world
                .lights
                .iter()
                .map(|light| LightSnapshot {
                    id: light.id,
                    cell: light.cell,
                    lit: light.lit,
                })
                .collect(),
        )
    }

    /// Cells acting as power sources, in row-major order.
    #[must_use]
    pub fn batteries(world: &World) -> Vec<CellCoord> {
        world.batteries.iter().map(|battery| battery.cell).collect()
    }

    /// Cells carrying power after the most recent pass, in row-major order.
    #[must_use]
    pub fn energized_cells(world: &World) -> Vec<CellCoord> {
        world
            .grid
            .iter()
            .filter(|tile| tile.is_energized())
            .map(|tile| tile.cell())
            .collect()
    }

    /// Reports whether every light is lit.
    #[must_use]
    pub fn is_solved(world: &World) -> bool {
        world.solved
    }
}

#[derive(Clone, Copy, Debug)]
struct Battery {
    cell: CellCoord,
}

#[derive(Clone, Copy, Debug)]
struct Light {
    id: LightId,
    cell: CellCoord,
    lit: bool,
}

fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use light_bulbs_core::{LayoutCell, Orientation};

    fn two_cell_layout() -> LevelLayout {
        LevelLayout::new(
            2,
            1,
            vec![
                LayoutCell::new(TileArchetype::Battery, 1),
                LayoutCell::new(TileArchetype::Light, 3),
            ],
        )
        .expect("valid layout")
    }

    #[test]
    fn load_level_announces_board_and_circuit() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::LoadLevel {
                layout: two_cell_layout(),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::LevelLoaded {
                    columns: 2,
                    rows: 1,
                    batteries: 1,
                    lights: 1,
                },
                Event::LightSwitched {
                    light: LightId::new(0),
                    cell: CellCoord::new(1, 0),
                    lit: true,
                },
                Event::CircuitRecomputed {
                    energized_tiles: 2,
                    lit_lights: 1,
                    total_lights: 1,
                },
                Event::PuzzleSolved,
            ]
        );
        assert!(query::is_solved(&world));
    }

    #[test]
    fn rotate_batch_recomputes_once() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::LoadLevel {
                layout: two_cell_layout(),
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut world,
            Command::RotateTiles {
                cells: vec![CellCoord::new(0, 0), CellCoord::new(1, 0)],
            },
            &mut events,
        );

        let passes = events
            .iter()
            .filter(|event| matches!(event, Event::CircuitRecomputed { .. }))
            .count();
        assert_eq!(passes, 1);
        assert!(events.contains(&Event::TileRotated {
            cell: CellCoord::new(0, 0),
            orientation: Orientation::new(2),
        }));
        assert!(!query::is_solved(&world));
    }

    #[test]
    fn rotation_before_load_is_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::RotateTiles {
                cells: vec![CellCoord::new(0, 0)],
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::RotationRejected {
                cell: CellCoord::new(0, 0),
                reason: RotationError::NoLevel,
            }]
        );
    }

    #[test]
    fn out_of_bounds_rotation_is_rejected_without_recompute() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::LoadLevel {
                layout: two_cell_layout(),
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut world,
            Command::RotateTiles {
                cells: vec![CellCoord::new(2, 0)],
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::RotationRejected {
                cell: CellCoord::new(2, 0),
                reason: RotationError::OutOfBounds,
            }]
        );
    }

    #[test]
    fn puzzle_solved_fires_only_on_transition() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::LoadLevel {
                layout: two_cell_layout(),
            },
            &mut events,
        );
        events.clear();

        apply(&mut world, Command::RefreshCircuit, &mut events);

        assert!(!events.contains(&Event::PuzzleSolved));
        assert!(query::is_solved(&world));
    }

    #[test]
    fn restart_request_is_broadcast() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(&mut world, Command::RequestRestart, &mut events);

        assert_eq!(events, vec![Event::RestartRequested]);
    }

    #[test]
    fn board_without_lights_is_never_solved() {
        let mut world = World::new();
        let mut events = Vec::new();
        let layout = LevelLayout::new(1, 1, vec![LayoutCell::unrotated(TileArchetype::Battery)])
            .expect("valid layout");

        apply(&mut world, Command::LoadLevel { layout }, &mut events);

        assert!(!query::is_solved(&world));
        assert!(!events.contains(&Event::PuzzleSolved));
        assert_eq!(query::energized_cells(&world), vec![CellCoord::new(0, 0)]);
    }

    #[test]
    fn light_ids_follow_row_major_order() {
        let mut world = World::new();
        let mut events = Vec::new();
        let layout = LevelLayout::new(
            2,
            2,
            vec![
                LayoutCell::unrotated(TileArchetype::Battery),
                LayoutCell::unrotated(TileArchetype::Light),
                LayoutCell::unrotated(TileArchetype::Light),
                LayoutCell::unrotated(TileArchetype::Light),
            ],
        )
        .expect("valid layout");

        apply(&mut world, Command::LoadLevel { layout }, &mut events);

        let lights: Vec<(LightId, CellCoord)> = query::light_view(&world)
            .iter()
            .map(|light| (light.id, light.cell))
            .collect();
        assert_eq!(
            lights,
            vec![
                (LightId::new(0), CellCoord::new(1, 0)),
                (LightId::new(1), CellCoord::new(0, 1)),
                (LightId::new(2), CellCoord::new(1, 1)),
            ]
        );
    }
}
