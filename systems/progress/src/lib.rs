#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic progress system that folds world events into a player report.

use light_bulbs_core::{Event, ProgressReport};

/// Pure progress system that tracks moves, lit lights and restarts.
#[derive(Debug, Default)]
pub struct Progress {
    report: ProgressReport,
    published: Option<ProgressReport>,
}

impl Progress {
    /// Creates a new progress system with an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current report.
    #[must_use]
    pub const fn report(&self) -> ProgressReport {
        self.report
    }

    /// Consumes the events produced by one world command and publishes an
    /// updated report when anything changed.
    ///
    /// A call containing at least one [`Event::TileRotated`] counts as a single
    /// move, however many tiles it turned.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Event>) {
        let mut moved = false;

        for event in events {
            match event {
                Event::LevelLoaded { lights, .. } => {
                    self.report = ProgressReport {
                        total_lights: *lights,
                        restarts: self.report.restarts,
                        ..ProgressReport::default()
                    };
                }
                Event::TileRotated { .. } => {
                    moved = true;
                    self.report.rotations = self.report.rotations.saturating_add(1);
                }
                Event::CircuitRecomputed {
                    lit_lights,
                    total_lights,
                    ..
                } => {
                    self.report.lit_lights = *lit_lights;
                    self.report.total_lights = *total_lights;
                    self.report.solved = *total_lights > 0 && lit_lights == total_lights;
                }
                Event::RestartRequested => {
                    self.report.restarts = self.report.restarts.saturating_add(1);
                }
                _ => {}
            }
        }

        if moved {
            self.report.moves = self.report.moves.saturating_add(1);
        }

        if self.published != Some(self.report) {
            self.published = Some(self.report);
            out.push(Event::ProgressUpdated {
                report: self.report,
            });
        }
    }
}
