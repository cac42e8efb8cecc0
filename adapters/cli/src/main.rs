#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Outpost experience.

mod map_file;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use outpost_core::{Event, PlayerInput, SoundCue, UnitId};
use outpost_rendering::{Color, FrameInput, Presentation, RenderingBackend, Scene};
use outpost_rendering_macroquad::MacroquadBackend;
use outpost_simulation::{Frame, Simulation, FRAME_DURATION};
use outpost_system_bootstrap::{default_layout, Bootstrap, Scenario};
use outpost_world::{apply, query, CollisionMap, World, DEFAULT_SEED};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::map_file::Level;

/// Simulated frames allowed to catch up within a single rendered frame.
const MAX_CATCH_UP_FRAMES: u32 = 4;

const GAME_OVER_BANNER: &str = "Game over";

/// Outpost: defend the settlement against the goblin camps.
#[derive(Parser, Debug)]
#[command(name = "outpost", version)]
struct Args {
    /// Seed for construction timing
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// TOML level file replacing the built-in map
    #[arg(long)]
    map: Option<PathBuf>,

    /// Run this many frames without a window, then print a summary
    #[arg(long)]
    headless: Option<u64>,

    /// Synchronise presentation with the display refresh rate
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    vsync: bool,

    /// Log frame timing once per second
    #[arg(long)]
    show_fps: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn load_level(args: &Args) -> Result<Level> {
    match &args.map {
        Some(path) => map_file::load(path),
        None => Ok(Level {
            collision: CollisionMap::compile(&default_layout())
                .context("built-in map does not compile")?,
            scenario: Scenario::outpost(),
        }),
    }
}

fn populate(world: &mut World, scenario: &Scenario) {
    let bootstrap = Bootstrap;
    info!("{}", bootstrap.welcome_banner(world));

    let mut commands = Vec::new();
    bootstrap.handle(scenario, &mut commands);
    let mut events = Vec::new();
    for command in commands {
        apply(world, command, &mut events);
    }

    info!(
        pawns = query::pawn_view(world).len(),
        goblins = query::goblin_view(world).len(),
        buildings = query::building_view(world).len(),
        "world populated"
    );
}

fn log_cues(cues: &[SoundCue]) {
    for cue in cues {
        debug!(?cue, volume = cue_volume(cue), "sound cue");
    }
}

fn cue_volume(cue: &SoundCue) -> f32 {
    match cue {
        SoundCue::Play(sound) | SoundCue::StartLoop(sound) | SoundCue::StopLoop(sound) => {
            sound.volume()
        }
    }
}

/// Totals reported at the end of a headless run.
#[derive(Debug, Default)]
struct RunSummary {
    frames: u64,
    goblins_slain: usize,
    pawns_lost: usize,
    buildings_completed: usize,
    buildings_destroyed: usize,
    cues: usize,
}

impl RunSummary {
    fn record(&mut self, frame: &Frame) {
        self.frames += 1;
        self.cues += frame.cues.len();
        for event in &frame.events {
            match event {
                Event::UnitDied {
                    unit: UnitId::Goblin(_),
                } => self.goblins_slain += 1,
                Event::UnitDied {
                    unit: UnitId::Pawn(_),
                } => self.pawns_lost += 1,
                Event::ConstructionCompleted { .. } => self.buildings_completed += 1,
                Event::BuildingDestroyed { .. } => self.buildings_destroyed += 1,
                _ => {}
            }
        }
    }
}

fn run_headless(mut world: World, frames: u64) {
    let mut simulation = Simulation::new();
    let mut summary = RunSummary::default();
    let idle = PlayerInput::default();

    for _ in 0..frames {
        let frame = simulation.step(&mut world, FRAME_DURATION, &idle);
        log_cues(&frame.cues);
        summary.record(&frame);
        if frame.is_game_over() {
            info!(tick = query::tick_index(&world), "{GAME_OVER_BANNER}");
            break;
        }
    }

    info!(
        frames = summary.frames,
        elapsed_ms = query::elapsed(&world).as_millis() as u64,
        goblins_slain = summary.goblins_slain,
        pawns_lost = summary.pawns_lost,
        buildings_completed = summary.buildings_completed,
        buildings_destroyed = summary.buildings_destroyed,
        cues = summary.cues,
        game_over = query::is_game_over(&world),
        "headless run finished"
    );
}

/// Player intent collected across rendered frames until a simulated frame consumes it.
#[derive(Debug, Default)]
struct PendingInput(PlayerInput);

impl PendingInput {
    fn merge(&mut self, input: PlayerInput) {
        if input.selection.is_some() {
            self.0.selection = input.selection;
        }
        if input.move_order.is_some() {
            self.0.move_order = input.move_order;
        }
        self.0.camera = input.camera;
    }

    fn take(&mut self) -> PlayerInput {
        let camera = self.0.camera;
        let input = std::mem::take(&mut self.0);
        self.0.camera = camera;
        input
    }
}

fn run_windowed(mut world: World, args: &Args) -> Result<()> {
    let scene = Scene {
        obstacles: query::obstacles(&world),
        walkable: query::walkable_cells(&world).to_vec(),
        ..Scene::default()
    };
    let presentation = Presentation::new("Outpost", Color::from_rgb_u8(86, 125, 70), scene);
    let backend = MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_show_fps(args.show_fps);

    let mut simulation = Simulation::new();
    let mut pending = PendingInput::default();
    let mut backlog = Duration::ZERO;

    backend.run(
        presentation,
        move |dt: Duration, input: FrameInput, scene: &mut Scene| {
            if input.toggle_debug {
                scene.show_debug = !scene.show_debug;
            }
            pending.merge(input.to_player_input(&scene.camera));
            scene.selection_box = input.dragging;

            backlog = (backlog + dt).min(FRAME_DURATION * MAX_CATCH_UP_FRAMES);
            while backlog >= FRAME_DURATION {
                backlog -= FRAME_DURATION;
                let player = pending.take();
                scene.camera.pan(player.camera);
                let frame = simulation.step(&mut world, FRAME_DURATION, &player);
                log_cues(&frame.cues);

                scene.refresh(
                    &query::pawn_view(&world),
                    &query::goblin_view(&world),
                    &query::building_view(&world),
                );
                for event in &frame.events {
                    if let Event::MoveOrderIssued { target, .. } = event {
                        scene.move_marker = Some(*target);
                    }
                }
                if frame.is_game_over() {
                    info!("{GAME_OVER_BANNER}");
                    scene.banner = Some(GAME_OVER_BANNER.to_owned());
                }
            }
            scene.obstacles = query::obstacles(&world);
        },
    )
}

/// Entry point for the Outpost command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let level = load_level(&args)?;
    let mut world = World::new(level.collision, args.seed);
    populate(&mut world, &level.scenario);

    match args.headless {
        Some(frames) => {
            run_headless(world, frames);
            Ok(())
        }
        None => run_windowed(world, &args),
    }
}
