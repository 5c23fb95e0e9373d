#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure interaction system that maps pointer releases onto tile rotations.

use glam::Vec2;
use light_bulbs_core::{CellCoord, Command, Event};

/// Phase of a pointer contact reported by the adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    /// The pointer went down. Presses never rotate tiles.
    Pressed,
    /// The pointer was lifted.
    Released,
}

/// Pointer contact expressed in board space, where the top-left corner of the
/// board sits at the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// Centre of the contact.
    pub position: Vec2,
    /// Half-extent of the square contact footprint. Zero for a mouse cursor.
    pub radius: f32,
    /// Phase of the contact.
    pub phase: PointerPhase,
}

impl PointerEvent {
    /// Creates a zero-radius release, as produced by a mouse click.
    #[must_use]
    pub const fn released_at(position: Vec2) -> Self {
        Self {
            position,
            radius: 0.0,
            phase: PointerPhase::Released,
        }
    }

    /// Creates a release whose footprint extends `radius` in every direction.
    #[must_use]
    pub const fn touch_released_at(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            radius,
            phase: PointerPhase::Released,
        }
    }
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InteractionInput {
    /// Pointer contact observed during the frame, if any.
    pub pointer: Option<PointerEvent>,
    /// Indicates whether the player asked for a fresh board on this frame.
    pub restart_requested: bool,
}

/// Interaction system that translates pointer input into rotation commands.
#[derive(Clone, Debug)]
pub struct Interaction {
    tile_length: f32,
    dimensions: Option<(u32, u32)>,
}

impl Interaction {
    /// Creates a new interaction system using the tile length of the renderer.
    #[must_use]
    pub const fn new(tile_length: f32) -> Self {
        Self {
            tile_length,
            dimensions: None,
        }
    }

    /// Board dimensions observed from the most recent level load.
    #[must_use]
    pub const fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }

    /// Consumes world events and adapter-derived input to emit commands.
    ///
    /// Every cell touched by a released pointer is rotated through a single
    /// [`Command::RotateTiles`], listed in row-major order without repeats.
    pub fn handle(&mut self, events: &[Event], input: InteractionInput, out: &mut Vec<Command>) {
        for event in events {
            if let Event::LevelLoaded { columns, rows, .. } = event {
                self.dimensions = Some((*columns, *rows));
            }
        }

        if let Some(pointer) = input.pointer {
            if pointer.phase == PointerPhase::Released {
                let cells = self.hit_cells(pointer);
                if !cells.is_empty() {
                    out.push(Command::RotateTiles { cells });
                }
            }
        }

        if input.restart_requested {
            out.push(Command::RequestRestart);
        }
    }

    /// Returns every cell the pointer footprint overlaps, in row-major order.
    #[must_use]
    pub fn hit_cells(&self, pointer: PointerEvent) -> Vec<CellCoord> {
        let Some((columns, rows)) = self.dimensions else {
            return Vec::new();
        };
        let radius = pointer.radius.max(0.0);
        let horizontal = self.span(
            pointer.position.x - radius,
            pointer.position.x + radius,
            columns,
        );
        let vertical = self.span(
            pointer.position.y - radius,
            pointer.position.y + radius,
            rows,
        );
        let (Some((first_column, last_column)), Some((first_row, last_row))) =
            (horizontal, vertical)
        else {
            return Vec::new();
        };

        (first_row..=last_row)
            .flat_map(|row| {
                (first_column..=last_column).map(move |column| CellCoord::new(column, row))
            })
            .collect()
    }

    /// Inclusive range of cell indices along one axis covered by `[min, max]`.
    fn span(&self, min: f32, max: f32, count: u32) -> Option<(u32, u32)> {
        if count == 0 || !min.is_finite() || !max.is_finite() {
            return None;
        }
        if self.tile_length <= f32::EPSILON || !self.tile_length.is_finite() {
            return None;
        }

        let extent = self.tile_length * count as f32;
        if max < 0.0 || min >= extent {
            return None;
        }

        let first = (min.max(0.0) / self.tile_length).floor() as u32;
        let last = ((max / self.tile_length).floor() as u32).min(count - 1);
        Some((first.min(count - 1), last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(columns: u32, rows: u32) -> Interaction {
        let mut interaction = Interaction::new(10.0);
        let mut commands = Vec::new();
        interaction.handle(
            &[Event::LevelLoaded {
                columns,
                rows,
                batteries: 0,
                lights: 0,
            }],
            InteractionInput::default(),
            &mut commands,
        );
        interaction
    }

    #[test]
    fn cell_edges_are_half_open() {
        let interaction = loaded(3, 3);

        assert_eq!(
            interaction.hit_cells(PointerEvent::released_at(Vec2::new(10.0, 0.0))),
            vec![CellCoord::new(1, 0)]
        );
        assert_eq!(
            interaction.hit_cells(PointerEvent::released_at(Vec2::new(9.999, 29.999))),
            vec![CellCoord::new(0, 2)]
        );
        assert!(interaction
            .hit_cells(PointerEvent::released_at(Vec2::new(30.0, 5.0)))
            .is_empty());
    }

    #[test]
    fn footprint_is_clamped_to_the_board() {
        let interaction = loaded(2, 2);

        let cells = interaction.hit_cells(PointerEvent::touch_released_at(
            Vec2::new(-1.0, 15.0),
            100.0,
        ));

        assert_eq!(
            cells,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(0, 1),
                CellCoord::new(1, 1),
            ]
        );
    }

    #[test]
    fn degenerate_tile_length_hits_nothing() {
        let mut interaction = loaded(2, 2);
        interaction.tile_length = 0.0;

        assert!(interaction
            .hit_cells(PointerEvent::released_at(Vec2::new(0.0, 0.0)))
            .is_empty());
    }

    #[test]
    fn non_finite_positions_hit_nothing() {
        let interaction = loaded(2, 2);

        assert!(interaction
            .hit_cells(PointerEvent::released_at(Vec2::new(f32::NAN, 1.0)))
            .is_empty());
        assert!(interaction
            .hit_cells(PointerEvent::released_at(Vec2::new(1.0, f32::INFINITY)))
            .is_empty());
    }
}
