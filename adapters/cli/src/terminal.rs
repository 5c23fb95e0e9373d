//! Line-oriented rendering backend that plays the game over stdin and stdout.

use std::{
    io::{BufRead, Write},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use glam::Vec2;
use light_bulbs_core::{CellCoord, TileArchetype};
use light_bulbs_rendering::{
    FrameInput, Presentation, RenderingBackend, Scene, TilePresentation,
};
use tracing::debug;

const HELP: &str = "\
commands:
  click X Y           release the pointer at board coordinates
  tap COLUMN ROW      release the pointer at the centre of a tile
  touch X Y RADIUS    release a touch footprint of the given half-extent
  r | restart         scramble a fresh board
  q | quit            leave the game";

/// Connection bitset (north 1, east 2, south 4, west 8) to light junction glyph.
const LIGHT_JUNCTIONS: [char; 16] = [
    ' ', '╵', '╶', '└', '╷', '│', '┌', '├', '╴', '┘', '─', '┴', '┐', '┤', '┬', '┼',
];

/// Connection bitset to heavy junction glyph, used for energized tiles.
const HEAVY_JUNCTIONS: [char; 16] = [
    ' ', '╹', '╺', '┗', '╻', '┃', '┏', '┣', '╸', '┛', '━', '┻', '┓', '┫', '┳', '╋',
];

/// A single line of player input.
#[derive(Clone, Copy, Debug, PartialEq)]
enum TerminalCommand {
    Click(Vec2),
    Tap(CellCoord),
    Touch { position: Vec2, radius: f32 },
    Restart,
    Quit,
    Help,
}

impl TerminalCommand {
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let arguments: Vec<&str> = words.collect();

        let command = match (verb, arguments.as_slice()) {
            ("click", [x, y]) => Self::Click(Vec2::new(number(x)?, number(y)?)),
            ("tap", [column, row]) => Self::Tap(CellCoord::new(index(column)?, index(row)?)),
            ("touch", [x, y, radius]) => Self::Touch {
                position: Vec2::new(number(x)?, number(y)?),
                radius: number(radius)?,
            },
            ("r" | "restart", []) => Self::Restart,
            ("q" | "quit", []) => Self::Quit,
            ("h" | "help" | "?", []) => Self::Help,
            _ => return Err(format!("unrecognised command `{}`", line.trim())),
        };
        Ok(Some(command))
    }

    fn frame_input(self, scene: &Scene) -> Option<FrameInput> {
        let (position, radius) = match self {
            Self::Click(position) => (position, 0.0),
            Self::Tap(cell) => (scene.tile_grid.cell_center(cell), 0.0),
            Self::Touch { position, radius } => (position, radius),
            Self::Restart => {
                return Some(FrameInput {
                    restart_requested: true,
                    ..FrameInput::default()
                })
            }
            Self::Quit | Self::Help => return None,
        };

        Some(FrameInput {
            cursor_world_space: Some(position),
            pointer_released: true,
            pointer_radius: radius,
            ..FrameInput::default()
        })
    }
}

fn number(word: &str) -> Result<f32, String> {
    word.parse::<f32>()
        .map_err(|_| format!("`{word}` is not a number"))
}

fn index(word: &str) -> Result<u32, String> {
    word.parse::<u32>()
        .map_err(|_| format!("`{word}` is not a tile index"))
}

/// Rendering backend that reads commands line by line and redraws the board
/// after each one.
#[derive(Debug)]
pub(crate) struct TerminalBackend<R, W> {
    input: R,
    output: W,
}

impl<R, W> TerminalBackend<R, W>
where
    R: BufRead,
    W: Write,
{
    pub(crate) fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R, W> RenderingBackend for TerminalBackend<R, W>
where
    R: BufRead,
    W: Write,
{
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self { input, mut output } = self;
        let Presentation {
            window_title,
            scene,
            ..
        } = presentation;
        let mut scene = scene;

        writeln!(output, "{window_title}\n{HELP}\n").context("failed to write to stdout")?;
        update_scene(Duration::ZERO, FrameInput::default(), &mut scene);
        write_scene(&mut output, &scene)?;

        let mut last_frame = Instant::now();
        for line in input.lines() {
            let line = line.context("failed to read from stdin")?;
            let command = match TerminalCommand::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(message) => {
                    writeln!(output, "{message} (type `help` for commands)")
                        .context("failed to write to stdout")?;
                    continue;
                }
            };
            debug!(?command, "terminal command");

            match command {
                TerminalCommand::Quit => break,
                TerminalCommand::Help => {
                    writeln!(output, "{HELP}").context("failed to write to stdout")?;
                    continue;
                }
                _ => {}
            }

            if let Some(frame_input) = command.frame_input(&scene) {
                let now = Instant::now();
                update_scene(now.duration_since(last_frame), frame_input, &mut scene);
                last_frame = now;
                write_scene(&mut output, &scene)?;
            }
        }

        output.flush().context("failed to flush stdout")
    }
}

fn write_scene<W: Write>(output: &mut W, scene: &Scene) -> Result<()> {
    write!(output, "{}", render_board(scene)).context("failed to write to stdout")?;
    writeln!(output, "{}", scene.status_line).context("failed to write to stdout")?;
    output.flush().context("failed to flush stdout")
}

/// Draws every tile as a 3x3 block of box-drawing characters.
///
/// Arms show the connected sides, the centre marks the piece: `B` for a
/// battery, `●`/`○` for a lit/unlit light and a junction glyph for wires.
/// Energized tiles use heavy strokes.
fn render_board(scene: &Scene) -> String {
    let grid = scene.tile_grid;
    let mut board = String::new();

    board.push_str("   ");
    for column in 0..grid.columns {
        board.push_str(&format!("{column:^3}"));
    }
    board.push('\n');

    for row in 0..grid.rows {
        let tiles: Vec<Option<&TilePresentation>> = (0..grid.columns)
            .map(|column| scene.tile(CellCoord::new(column, row)))
            .collect();

        for band in 0..3 {
            if band == 1 {
                board.push_str(&format!("{row:>2} "));
            } else {
                board.push_str("   ");
            }
            for tile in &tiles {
                match tile {
                    Some(tile) => board.push_str(&tile_band(tile, band)),
                    None => board.push_str("   "),
                }
            }
            board.push('\n');
        }
    }

    board
}

fn tile_band(tile: &TilePresentation, band: u8) -> String {
    use light_bulbs_core::Direction;

    let connections = tile.connections;
    let (vertical, horizontal) = if tile.energized {
        ('┃', '━')
    } else {
        ('│', '─')
    };
    let arm = |direction: Direction, glyph: char| {
        if connections.connects(direction) {
            glyph
        } else {
            ' '
        }
    };

    match band {
        0 => format!(" {} ", arm(Direction::North, vertical)),
        1 => {
            let centre = match tile.archetype {
                TileArchetype::Empty => '·',
                TileArchetype::Battery => 'B',
                TileArchetype::Light if tile.energized => '●',
                TileArchetype::Light => '○',
                _ if tile.energized => HEAVY_JUNCTIONS[usize::from(connections.bits())],
                _ => LIGHT_JUNCTIONS[usize::from(connections.bits())],
            };
            format!(
                "{}{centre}{}",
                arm(Direction::West, horizontal),
                arm(Direction::East, horizontal)
            )
        }
        _ => format!(" {} ", arm(Direction::South, vertical)),
    }
}
