#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-order frame driver that wires the pure systems to the authoritative world.
//!
//! Each call to [`Simulation::step`] applies player input, advances the clock,
//! then lets buildings, pawns and goblins react in that order. Every stage reads
//! views captured at its start and applies its commands before the next stage
//! begins, so later stages observe earlier ones.

use std::time::Duration;

use outpost_core::{Command, Event, GoblinPursuit, PlayerInput, SoundCue};
use outpost_system_audio::Audio;
use outpost_system_combat::{acquire_goblin_targets, Combat};
use outpost_system_construction::Construction;
use outpost_system_movement::Movement;
use outpost_world::{apply, query, World};
use tracing::{debug, trace};

/// Simulated time covered by one frame at sixty frames per second.
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Everything one frame produced for the host.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    /// Events emitted by the world, in application order.
    pub events: Vec<Event>,
    /// Sound cues derived from the events and the camera state.
    pub cues: Vec<SoundCue>,
}

impl Frame {
    /// Reports whether the frame ended the game.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.events.contains(&Event::GameOver)
    }
}

/// Orchestrates the systems of one session.
#[derive(Debug, Default)]
pub struct Simulation {
    combat: Combat,
    movement: Movement,
    construction: Construction,
    audio: Audio,
    pursuits: Vec<GoblinPursuit>,
    commands: Vec<Command>,
}

impl Simulation {
    /// Creates a simulation with fresh system state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one frame of `dt` simulated time.
    pub fn step(&mut self, world: &mut World, dt: Duration, input: &PlayerInput) -> Frame {
        let mut events = Vec::new();

        self.apply_input(world, input, &mut events);
        apply(world, Command::Tick { dt }, &mut events);

        let pawns = query::pawn_view(world);
        let buildings = query::building_view(world);
        self.construction.handle(
            &events,
            &buildings,
            &pawns,
            query::elapsed(world),
            &mut self.commands,
        );
        self.flush(world, &mut events);

        let pawns = query::pawn_view(world);
        let goblins = query::goblin_view(world);
        self.combat
            .handle_pawns(&pawns, &goblins, &mut self.commands);
        self.movement.handle_pawns(
            &pawns,
            |rect| query::is_blocked(world, rect),
            &mut self.commands,
        );
        self.flush(world, &mut events);

        let pawns = query::pawn_view(world);
        let goblins = query::goblin_view(world);
        acquire_goblin_targets(&goblins, &pawns, &mut self.pursuits);
        self.combat.handle_goblins(&self.pursuits, &mut self.commands);
        self.movement.handle_goblins(
            &self.pursuits,
            &goblins,
            |rect| query::is_blocked(world, rect),
            &mut self.commands,
        );
        self.flush(world, &mut events);

        let mut cues = Vec::new();
        self.audio.handle(&events, input.camera, &mut cues);

        trace!(
            tick = query::tick_index(world),
            events = events.len(),
            cues = cues.len(),
            "frame simulated"
        );
        Frame { events, cues }
    }

    fn apply_input(&mut self, world: &mut World, input: &PlayerInput, events: &mut Vec<Event>) {
        if let Some(area) = input.selection {
            apply(world, Command::SelectPawns { area }, events);
        }

        if let Some(target) = input.move_order {
            let pawns = query::selected_pawns(world);
            if pawns.is_empty() {
                debug!("move order without selection ignored");
            } else {
                apply(world, Command::OrderMove { pawns, target }, events);
            }
        }
    }

    fn flush(&mut self, world: &mut World, events: &mut Vec<Event>) {
        for command in self.commands.drain(..) {
            apply(world, command, events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_core::{CameraPan, Sound, WorldPoint, WorldRect};
    use outpost_world::CollisionMap;

    #[test]
    fn frame_starts_with_input_then_tick() {
        let mut world = World::new(CollisionMap::empty(), 1);
        let mut spawn = Vec::new();
        apply(
            &mut world,
            Command::SpawnPawn {
                position: WorldPoint::new(0.0, 0.0),
            },
            &mut spawn,
        );

        let input = PlayerInput {
            selection: Some(WorldRect::new(0.0, 0.0, 100.0, 100.0)),
            move_order: Some(WorldPoint::new(400.0, 96.0)),
            camera: CameraPan::default(),
        };
        let frame = Simulation::new().step(&mut world, FRAME_DURATION, &input);

        assert!(matches!(
            frame.events.as_slice(),
            [
                Event::PawnsSelected { .. },
                Event::MoveOrderIssued { .. },
                Event::TimeAdvanced { tick: 1, .. },
                ..
            ]
        ));
        assert_eq!(
            frame.cues.first(),
            Some(&SoundCue::StartLoop(Sound::SeaWaves))
        );
        assert!(frame.cues.contains(&SoundCue::Play(Sound::Selection)));
        assert!(frame
            .cues
            .contains(&SoundCue::StartLoop(Sound::PawnWalking)));
    }

    #[test]
    fn move_order_without_selection_is_dropped() {
        let mut world = World::new(CollisionMap::empty(), 1);
        let input = PlayerInput {
            move_order: Some(WorldPoint::new(10.0, 10.0)),
            ..PlayerInput::default()
        };

        let frame = Simulation::new().step(&mut world, FRAME_DURATION, &input);

        assert_eq!(
            frame.events,
            vec![Event::TimeAdvanced {
                dt: FRAME_DURATION,
                tick: 1
            }]
        );
        assert!(!frame.is_game_over());
    }
}
