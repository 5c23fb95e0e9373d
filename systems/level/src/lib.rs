#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level loading system that turns character grids into scrambled board layouts.
//!
//! Levels are written one row per line. Each character names the piece placed
//! in that cell; blank lines and lines starting with `#` are ignored. The
//! [`LevelDirector`] owns a seeded random number generator, hands out the
//! initial [`Command::LoadLevel`], and answers every restart request with a
//! freshly scrambled copy of the same level.

use std::str::FromStr;

use light_bulbs_core::{Command, Event, LayoutCell, LayoutError, LevelLayout, TileArchetype};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::debug;

/// Reference 10x10 level shipped with the game.
pub const DEFAULT_LEVEL: &str = "\
# Two batteries feeding three lights.
..........
Paaab.....
....a.....
....3aaL..
....a.....
....baab..
.......a..
.......L..
P4aL......
..........
";

/// Maps a level character to the piece it denotes.
#[must_use]
pub const fn archetype_for_tag(tag: char) -> Option<TileArchetype> {
    match tag {
        '.' | '0' => Some(TileArchetype::Empty),
        'P' => Some(TileArchetype::Battery),
        'L' => Some(TileArchetype::Light),
        'a' => Some(TileArchetype::Straight),
        'b' => Some(TileArchetype::Elbow),
        '3' => Some(TileArchetype::Tee),
        '4' => Some(TileArchetype::Cross),
        _ => None,
    }
}

/// Selects which tiles receive random initial rotations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScramblePolicy {
    /// Every tile starts at orientation zero.
    Disabled,
    /// Wire pieces are scrambled; battery and light stubs start pointing up.
    #[default]
    WiresOnly,
    /// Every non-empty tile is scrambled, stubs included.
    Everything,
}

impl ScramblePolicy {
    /// Reports whether tiles of the provided archetype are scrambled.
    #[must_use]
    pub const fn scrambles(self, archetype: TileArchetype) -> bool {
        match self {
            Self::Disabled => false,
            Self::WiresOnly => !archetype.is_stub() && !matches!(archetype, TileArchetype::Empty),
            Self::Everything => !matches!(archetype, TileArchetype::Empty),
        }
    }
}

/// Parsed level with every tile at orientation zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelBlueprint {
    layout: LevelLayout,
}

impl LevelBlueprint {
    /// Parses a level from its character grid.
    pub fn parse(source: &str) -> Result<Self, LevelError> {
        let mut rows: Vec<Vec<TileArchetype>> = Vec::new();

        for (line_index, raw_line) in source.lines().enumerate() {
            let indent = raw_line.chars().take_while(|c| c.is_whitespace()).count();
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let row = line
                .chars()
                .enumerate()
                .map(|(column_index, tag)| {
                    archetype_for_tag(tag).ok_or(LevelError::UnknownTag {
                        tag,
                        line: line_index + 1,
                        column: indent + column_index + 1,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            if let Some(first) = rows.first() {
                if first.len() != row.len() {
                    return Err(LevelError::RaggedRow {
                        line: line_index + 1,
                        expected: first.len(),
                        found: row.len(),
                    });
                }
            }
            rows.push(row);
        }

        let Some(first) = rows.first() else {
            return Err(LevelError::Empty);
        };
        let columns = u32::try_from(first.len()).unwrap_or(u32::MAX);
        let row_count = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        let cells = rows
            .into_iter()
            .flatten()
            .map(LayoutCell::unrotated)
            .collect();
        let layout = LevelLayout::new(columns, row_count, cells)?;

        debug!(
            columns,
            rows = row_count,
            batteries = layout.positions_of(TileArchetype::Battery).count(),
            lights = layout.positions_of(TileArchetype::Light).count(),
            "level parsed"
        );
        Ok(Self { layout })
    }

    /// Layout with every tile at orientation zero.
    #[must_use]
    pub fn layout(&self) -> &LevelLayout {
        &self.layout
    }

    /// Produces a layout whose tiles receive zero to three random rotations.
    #[must_use]
    pub fn scrambled<R>(&self, rng: &mut R, policy: ScramblePolicy) -> LevelLayout
    where
        R: Rng,
    {
        self.layout.with_rotations(|_, archetype| {
            if policy.scrambles(archetype) {
                rng.gen_range(0..4)
            } else {
                0
            }
        })
    }
}

impl FromStr for LevelBlueprint {
    type Err = LevelError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::parse(source)
    }
}

/// Errors raised while parsing a level.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The source contained no rows.
    #[error("level contains no rows")]
    Empty,
    /// A row's width differs from the first row.
    #[error("line {line} has {found} cells but the first row has {expected}")]
    RaggedRow {
        /// One-based source line of the offending row.
        line: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A character does not name any piece.
    #[error("unknown tile tag {tag:?} at line {line}, column {column}")]
    UnknownTag {
        /// Offending character.
        tag: char,
        /// One-based source line.
        line: usize,
        /// One-based column within the line.
        column: usize,
    },
    /// The parsed grid failed layout validation.
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Pure system that issues level loads and answers restart requests.
#[derive(Debug)]
pub struct LevelDirector {
    blueprint: LevelBlueprint,
    policy: ScramblePolicy,
    rng: ChaCha8Rng,
}

impl LevelDirector {
    /// Creates a director whose scrambles are fully determined by `seed`.
    #[must_use]
    pub fn new(blueprint: LevelBlueprint, seed: u64, policy: ScramblePolicy) -> Self {
        Self {
            blueprint,
            policy,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Blueprint the director loads.
    #[must_use]
    pub fn blueprint(&self) -> &LevelBlueprint {
        &self.blueprint
    }

    /// Produces a load command carrying a freshly scrambled layout.
    #[must_use]
    pub fn load_command(&mut self) -> Command {
        let layout = self.blueprint.scrambled(&mut self.rng, self.policy);
        Command::LoadLevel { layout }
    }

    /// Consumes world events and emits a new load whenever a restart was requested.
    ///
    /// Several restart requests within the same batch collapse into one load.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        if events
            .iter()
            .any(|event| matches!(event, Event::RestartRequested))
        {
            debug!("restart requested, scrambling a fresh board");
            out.push(self.load_command());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use light_bulbs_core::CellCoord;

    #[test]
    fn parses_every_known_tag() {
        let blueprint = LevelBlueprint::parse("P.La\nb340").expect("valid level");
        let layout = blueprint.layout();

        assert_eq!((layout.columns(), layout.rows()), (4, 2));
        let archetypes: Vec<_> = layout.cells().iter().map(|cell| cell.archetype).collect();
        assert_eq!(
            archetypes,
            vec![
                TileArchetype::Battery,
                TileArchetype::Empty,
                TileArchetype::Light,
                TileArchetype::Straight,
                TileArchetype::Elbow,
                TileArchetype::Tee,
                TileArchetype::Cross,
                TileArchetype::Empty,
            ]
        );
        assert!(layout.cells().iter().all(|cell| cell.rotations == 0));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let blueprint = LevelBlueprint::parse("# header\n\n  PL  \r\n\n").expect("valid level");

        assert_eq!(blueprint.layout().columns(), 2);
        assert_eq!(blueprint.layout().rows(), 1);
    }

    #[test]
    fn rejects_unknown_tags_with_position() {
        let error = LevelBlueprint::parse("P.\n.x").expect_err("x is not a tile");

        assert_eq!(
            error,
            LevelError::UnknownTag {
                tag: 'x',
                line: 2,
                column: 2,
            }
        );
    }

    #[test]
    fn unknown_tag_column_counts_leading_indentation() {
        let error = "  Px"
            .parse::<LevelBlueprint>()
            .expect_err("x is not a tile");

        assert_eq!(
            error,
            LevelError::UnknownTag {
                tag: 'x',
                line: 1,
                column: 4,
            }
        );
    }

    #[test]
    fn rejects_ragged_rows() {
        let error = LevelBlueprint::parse("PaL\n#\nab").expect_err("second row is short");

        assert_eq!(
            error,
            LevelError::RaggedRow {
                line: 3,
                expected: 3,
                found: 2,
            }
        );
    }

    #[test]
    fn rejects_empty_source() {
        assert_eq!(
            LevelBlueprint::parse("# nothing here\n\n"),
            Err(LevelError::Empty)
        );
    }

    #[test]
    fn wires_only_policy_leaves_stubs_upright() {
        assert!(!ScramblePolicy::WiresOnly.scrambles(TileArchetype::Battery));
        assert!(!ScramblePolicy::WiresOnly.scrambles(TileArchetype::Empty));
        assert!(ScramblePolicy::WiresOnly.scrambles(TileArchetype::Tee));
        assert!(ScramblePolicy::Everything.scrambles(TileArchetype::Light));
        assert!(!ScramblePolicy::Disabled.scrambles(TileArchetype::Cross));
    }

    #[test]
    fn scramble_respects_policy() {
        let blueprint = LevelBlueprint::parse("PaaaaaaaL").expect("valid level");
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let layout = blueprint.scrambled(&mut rng, ScramblePolicy::WiresOnly);

        let battery = layout.cell(CellCoord::new(0, 0)).expect("in bounds");
        let light = layout.cell(CellCoord::new(8, 0)).expect("in bounds");
        assert_eq!(battery.rotations, 0);
        assert_eq!(light.rotations, 0);
        assert!(layout.cells().iter().all(|cell| cell.rotations < 4));
    }

    #[test]
    fn default_level_parses() {
        let blueprint = LevelBlueprint::parse(DEFAULT_LEVEL).expect("default level is valid");
        let layout = blueprint.layout();

        assert_eq!((layout.columns(), layout.rows()), (10, 10));
        assert_eq!(layout.positions_of(TileArchetype::Battery).count(), 2);
        assert_eq!(layout.positions_of(TileArchetype::Light).count(), 3);
    }
}
