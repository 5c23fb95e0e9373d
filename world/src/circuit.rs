//! Power propagation from batteries through mutually facing wire ends.

use std::collections::VecDeque;

use light_bulbs_core::{CellCoord, Direction};

use crate::grid::Grid;

/// Recomputes the energized flag of every tile from scratch.
///
/// Each battery seeds its own breadth-first traversal. A cell is energized the
/// first time it is dequeued; later visits are ignored, so overlapping
/// batteries share the work. A neighbor joins the frontier only when both
/// adjacent sides carry a wire end. Battery cells are always energized, even
/// when their own shape cannot pass power on.
///
/// Returns the number of energized tiles.
///
/// # Panics
///
/// Panics when a battery lies outside the grid. Battery positions are derived
/// from validated layouts, so this indicates a bug in the caller.
pub(crate) fn propagate<I>(grid: &mut Grid, batteries: I) -> u32
where
    I: IntoIterator<Item = CellCoord>,
{
    grid.for_each_tile_mut(|tile| tile.set_energized(false));

    let mut energized: u32 = 0;
    let mut frontier: VecDeque<CellCoord> = VecDeque::new();
    for battery in batteries {
        frontier.clear();
        frontier.push_back(battery);

        while let Some(cell) = frontier.pop_front() {
            let tile = grid
                .get_mut(cell)
                .unwrap_or_else(|error| panic!("propagation reached an invalid cell: {error}"));
            if tile.is_energized() {
                continue;
            }
            tile.set_energized(true);
            energized = energized.saturating_add(1);

            let connections = tile.connections();
            for direction in Direction::ALL {
                if !connections.connects(direction) {
                    continue;
                }
                let Some(next) = grid.neighbor(cell, direction) else {
                    continue;
                };
                if conducts_from(grid, next, direction) {
                    frontier.push_back(next);
                }
            }
        }
    }

    energized
}

fn conducts_from(grid: &Grid, cell: CellCoord, arriving: Direction) -> bool {
    grid.get(cell)
        .map(|tile| !tile.is_energized() && tile.connects_toward(arriving.opposite()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use light_bulbs_core::{LayoutCell, LevelLayout, TileArchetype};
    use proptest::prelude::*;

    use super::*;

    fn grid_from(columns: u32, rows: u32, cells: Vec<LayoutCell>) -> Grid {
        Grid::from_layout(&LevelLayout::new(columns, rows, cells).expect("valid layout"))
    }

    fn energized_cells(grid: &Grid) -> BTreeSet<CellCoord> {
        grid.iter()
            .filter(|tile| tile.is_energized())
            .map(|tile| tile.cell())
            .collect()
    }

    #[test]
    fn battery_without_partners_powers_only_itself() {
        let mut cells = vec![LayoutCell::unrotated(TileArchetype::Empty); 9];
        cells[4] = LayoutCell::unrotated(TileArchetype::Cross);
        let mut grid = grid_from(3, 3, cells);

        let count = propagate(&mut grid, [CellCoord::new(1, 1)]);

        assert_eq!(count, 1);
        assert_eq!(
            energized_cells(&grid),
            BTreeSet::from([CellCoord::new(1, 1)])
        );
    }

    #[test]
    fn blank_battery_cell_is_seeded_but_stays_isolated() {
        let cells = vec![
            LayoutCell::unrotated(TileArchetype::Empty),
            LayoutCell::unrotated(TileArchetype::Cross),
        ];
        let mut grid = grid_from(2, 1, cells);

        let count = propagate(&mut grid, [CellCoord::new(0, 0)]);

        assert_eq!(count, 1);
        assert!(grid.get(CellCoord::new(0, 0)).expect("in bounds").is_energized());
        assert!(!grid.get(CellCoord::new(1, 0)).expect("in bounds").is_energized());
    }

    #[test]
    fn one_sided_stub_does_not_conduct() {
        // Battery faces east, the straight piece beside it runs north-south.
        let cells = vec![
            LayoutCell::new(TileArchetype::Battery, 1),
            LayoutCell::unrotated(TileArchetype::Straight),
        ];
        let mut grid = grid_from(2, 1, cells);

        let _ = propagate(&mut grid, [CellCoord::new(0, 0)]);

        assert!(!grid.get(CellCoord::new(1, 0)).expect("in bounds").is_energized());
    }

    #[test]
    fn propagation_clears_stale_power() {
        let cells = vec![
            LayoutCell::new(TileArchetype::Battery, 1),
            LayoutCell::new(TileArchetype::Light, 3),
        ];
        let mut grid = grid_from(2, 1, cells);
        let battery = CellCoord::new(0, 0);
        let light = CellCoord::new(1, 0);

        assert_eq!(propagate(&mut grid, [battery]), 2);
        grid.get_mut(light).expect("in bounds").rotate();
        assert_eq!(propagate(&mut grid, [battery]), 1);
        assert!(!grid.get(light).expect("in bounds").is_energized());
    }

    #[test]
    fn duplicate_batteries_do_not_double_count() {
        let mut grid = grid_from(3, 1, vec![LayoutCell::new(TileArchetype::Cross, 0); 3]);
        let cell = CellCoord::new(0, 0);

        assert_eq!(propagate(&mut grid, [cell, cell, CellCoord::new(2, 0)]), 3);
    }

    #[test]
    #[should_panic(expected = "propagation reached an invalid cell")]
    fn battery_outside_grid_is_a_programming_error() {
        let mut grid = grid_from(1, 1, vec![LayoutCell::unrotated(TileArchetype::Cross)]);
        let _ = propagate(&mut grid, [CellCoord::new(5, 5)]);
    }

    fn archetype_strategy() -> impl Strategy<Value = TileArchetype> {
        prop_oneof![
            Just(TileArchetype::Empty),
            Just(TileArchetype::Battery),
            Just(TileArchetype::Light),
            Just(TileArchetype::Straight),
            Just(TileArchetype::Elbow),
            Just(TileArchetype::Tee),
            Just(TileArchetype::Cross),
        ]
    }

    fn board_strategy() -> impl Strategy<Value = (u32, u32, Vec<LayoutCell>)> {
        (1u32..=6, 1u32..=6).prop_flat_map(|(columns, rows)| {
            let cell = (archetype_strategy(), 0u8..4)
                .prop_map(|(archetype, rotations)| LayoutCell::new(archetype, rotations));
            (
                Just(columns),
                Just(rows),
                prop::collection::vec(cell, (columns * rows) as usize),
            )
        })
    }

    proptest! {
        #[test]
        fn adding_a_battery_never_shrinks_the_energized_set(
            (columns, rows, cells) in board_strategy(),
            seeds in prop::collection::vec((0u32..6, 0u32..6), 0..4),
            extra in (0u32..6, 0u32..6),
        ) {
            let batteries: Vec<CellCoord> = seeds
                .into_iter()
                .map(|(column, row)| CellCoord::new(column % columns, row % rows))
                .collect();
            let extra = CellCoord::new(extra.0 % columns, extra.1 % rows);

            let mut grid = grid_from(columns, rows, cells);
            let _ = propagate(&mut grid, batteries.iter().copied());
            let before = energized_cells(&grid);

            let _ = propagate(&mut grid, batteries.iter().copied().chain([extra]));
            let after = energized_cells(&grid);

            prop_assert!(before.is_subset(&after));
            prop_assert!(after.contains(&extra));
        }

        #[test]
        fn battery_order_does_not_change_the_result(
            (columns, rows, cells) in board_strategy(),
            seeds in prop::collection::vec((0u32..6, 0u32..6), 1..5),
        ) {
            let batteries: Vec<CellCoord> = seeds
                .into_iter()
                .map(|(column, row)| CellCoord::new(column % columns, row % rows))
                .collect();

            let mut grid = grid_from(columns, rows, cells);
            let forward = propagate(&mut grid, batteries.iter().copied());
            let forward_cells = energized_cells(&grid);
            let backward = propagate(&mut grid, batteries.iter().rev().copied());

            prop_assert_eq!(forward, backward);
            prop_assert_eq!(forward_cells, energized_cells(&grid));
        }
    }
}
