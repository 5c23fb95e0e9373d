#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Light Bulbs experience.

mod config;
mod terminal;

use std::{collections::VecDeque, fs, io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use light_bulbs_core::{Command, Event, ProgressReport};
use light_bulbs_rendering::{
    FrameInput, LightPresentation, Presentation, RenderingBackend, Scene, TileGridPresentation,
    TilePresentation,
};
use light_bulbs_system_bootstrap::Bootstrap;
use light_bulbs_system_interaction::{
    Interaction, InteractionInput, PointerEvent, PointerPhase,
};
use light_bulbs_system_level::{LevelBlueprint, LevelDirector, ScramblePolicy, DEFAULT_LEVEL};
use light_bulbs_system_progress::Progress;
use light_bulbs_world::{self as world, World};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    config::{CliConfig, Overrides, ScrambleSetting, Settings, DEFAULT_LOG_LEVEL},
    terminal::TerminalBackend,
};

/// Rotate tiles until every light bulb is connected to a battery.
#[derive(Debug, Parser)]
#[command(name = "light-bulbs", version, about)]
struct Cli {
    /// Level file to play instead of the built-in board.
    #[arg(long, value_name = "PATH")]
    level: Option<PathBuf>,
    /// Seed for the board scramble. Random when omitted.
    #[arg(long, value_name = "U64")]
    seed: Option<u64>,
    /// Side length of a tile in board units.
    #[arg(long, value_name = "F32")]
    tile_length: Option<f32>,
    /// Which pieces receive random initial rotations.
    #[arg(long, value_enum)]
    scramble: Option<ScrambleSetting>,
    /// Configuration file. Defaults to `light-bulbs.toml` when present.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Log filter directive such as `debug` or `light_bulbs_world=trace`.
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            level: self.level.clone(),
            seed: self.seed,
            tile_length: self.tile_length,
            scramble: self.scramble,
            log_level: self.log_level.clone(),
        }
    }
}

/// Entry point for the Light Bulbs command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;
    let settings = Settings::resolve(cli.overrides(), config)?;
    init_tracing(settings.log_level.as_deref());

    let blueprint = load_blueprint(&settings).map_err(|error| {
        error!(%error, "failed to load level");
        error
    })?;
    let seed = settings.seed.unwrap_or_else(rand::random);
    info!(
        seed,
        tile_length = settings.tile_length,
        scramble = ?settings.scramble,
        level = ?settings.level,
        "starting Light Bulbs"
    );

    let mut simulation = Simulation::new(blueprint, seed, settings.scramble, settings.tile_length);
    let scene = simulation.scene()?;
    let presentation = Presentation::new(simulation.welcome_banner(), scene);

    let backend = TerminalBackend::new(io::stdin().lock(), io::stdout().lock());
    backend.run(presentation, move |_dt, input, scene| {
        simulation.step(&input);
        simulation.populate_scene(scene);
    })
}

fn init_tracing(directive: Option<&str>) {
    let directive = directive
        .map(str::to_owned)
        .or_else(|| std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let (filter, rejected) = match directive {
        Some(directive) => match EnvFilter::try_new(&directive) {
            Ok(filter) => (filter, None),
            Err(error) => (EnvFilter::new(DEFAULT_LOG_LEVEL), Some((directive, error))),
        },
        None => (EnvFilter::new(DEFAULT_LOG_LEVEL), None),
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .compact()
        .init();

    if let Some((directive, error)) = rejected {
        error!(
            %directive,
            %error,
            "invalid log filter, falling back to `{DEFAULT_LOG_LEVEL}`"
        );
    }
}

fn load_blueprint(settings: &Settings) -> Result<LevelBlueprint> {
    let Some(path) = &settings.level else {
        return LevelBlueprint::parse(DEFAULT_LEVEL).context("built-in level is invalid");
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read level file {}", path.display()))?;
    source
        .parse::<LevelBlueprint>()
        .with_context(|| format!("invalid level file {}", path.display()))
}

/// Owns the world and every system, routing commands and events between them.
#[derive(Debug)]
struct Simulation {
    world: World,
    bootstrap: Bootstrap,
    interaction: Interaction,
    director: LevelDirector,
    progress: Progress,
    pending_events: Vec<Event>,
    tile_length: f32,
}

impl Simulation {
    fn new(blueprint: LevelBlueprint, seed: u64, policy: ScramblePolicy, tile_length: f32) -> Self {
        let mut director = LevelDirector::new(blueprint, seed, policy);
        let initial = director.load_command();
        let mut simulation = Self {
            world: World::new(),
            bootstrap: Bootstrap,
            interaction: Interaction::new(tile_length),
            director,
            progress: Progress::new(),
            pending_events: Vec::new(),
            tile_length,
        };
        simulation.execute(vec![initial]);
        simulation
    }

    fn welcome_banner(&self) -> &str {
        self.bootstrap.welcome_banner(&self.world)
    }

    fn step(&mut self, input: &FrameInput) {
        let events = std::mem::take(&mut self.pending_events);
        let mut commands = Vec::new();
        self.interaction
            .handle(&events, interaction_input(input), &mut commands);
        self.execute(commands);
    }

    fn execute(&mut self, commands: Vec<Command>) {
        let mut queue: VecDeque<Command> = commands.into();
        while let Some(command) = queue.pop_front() {
            let mut events = Vec::new();
            world::apply(&mut self.world, command, &mut events);

            let mut follow_up = Vec::new();
            self.director.handle(&events, &mut follow_up);
            queue.extend(follow_up);

            let mut published = Vec::new();
            self.progress.handle(&events, &mut published);
            self.pending_events.extend(events);
            self.pending_events.extend(published);
        }
    }

    fn scene(&self) -> Result<Scene> {
        let (columns, rows) = self.bootstrap.dimensions(&self.world);
        let tile_grid = TileGridPresentation::new(columns, rows, self.tile_length)
            .context("invalid tile grid presentation")?;
        let mut scene = Scene::new(
            tile_grid,
            Vec::new(),
            Vec::new(),
            Vec::new(),
            false,
            String::new(),
        );
        self.populate_scene(&mut scene);
        Ok(scene)
    }

    fn populate_scene(&self, scene: &mut Scene) {
        let (columns, rows) = self.bootstrap.dimensions(&self.world);
        scene.tile_grid.columns = columns;
        scene.tile_grid.rows = rows;
        scene.tiles = self
            .bootstrap
            .tiles(&self.world)
            .iter()
            .map(TilePresentation::from_snapshot)
            .collect();
        scene.lights = self
            .bootstrap
            .lights(&self.world)
            .iter()
            .map(LightPresentation::from)
            .collect();
        scene.batteries = self.bootstrap.batteries(&self.world);
        scene.solved = self.bootstrap.is_solved(&self.world);
        scene.status_line = status_line(&self.progress.report());
    }
}

fn interaction_input(input: &FrameInput) -> InteractionInput {
    let phase = if input.pointer_released {
        Some(PointerPhase::Released)
    } else if input.pointer_pressed {
        Some(PointerPhase::Pressed)
    } else {
        None
    };
    let pointer = input
        .cursor_world_space
        .zip(phase)
        .map(|(position, phase)| PointerEvent {
            position,
            radius: input.pointer_radius,
            phase,
        });

    InteractionInput {
        pointer,
        restart_requested: input.restart_requested,
    }
}

fn status_line(report: &ProgressReport) -> String {
    if report.solved {
        return format!(
            "All {} lights are on after {} moves. Type `r` for a new board.",
            report.total_lights, report.moves
        );
    }
    format!(
        "{} of {} lights lit, {} moves, {} restarts",
        report.lit_lights, report.total_lights, report.moves, report.restarts
    )
}
