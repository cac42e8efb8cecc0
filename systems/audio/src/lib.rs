#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system translating world events into sound cues for the audio collaborator.

use outpost_core::{AnimationState, CameraPan, Event, Sound, SoundCue, UnitId, UnitKind};

/// Audio system remembering which continuous cues are currently audible.
#[derive(Debug, Default)]
pub struct Audio {
    camera_moving: bool,
    ambience_started: bool,
}

/// Background loops started by the player's first selection.
pub const AMBIENCE: [Sound; 3] = [Sound::SeaWaves, Sound::NatureAmbience, Sound::Music];

impl Audio {
    /// Creates a new audio system with the camera at rest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts the events of one frame and the held camera directions into cues.
    pub fn handle(&mut self, events: &[Event], camera: CameraPan, out: &mut Vec<SoundCue>) {
        for event in events {
            match event {
                Event::AnimationChanged { unit, from, to } => {
                    let kind = unit.kind();
                    if let Some(sound) = animation_loop(kind, *from) {
                        out.push(SoundCue::StopLoop(sound));
                    }
                    if let Some(sound) = animation_loop(kind, *to) {
                        out.push(SoundCue::StartLoop(sound));
                    }
                }
                Event::UnitDamaged { unit, .. } => out.push(SoundCue::Play(match unit {
                    UnitId::Pawn(_) => Sound::PawnHit,
                    UnitId::Goblin(_) => Sound::GoblinHit,
                })),
                Event::UnitDied { unit } => {
                    let kind = unit.kind();
                    out.push(SoundCue::Play(match kind {
                        UnitKind::Pawn => Sound::PawnDeath,
                        UnitKind::Goblin => Sound::GoblinDeath,
                    }));
                    for animation in [AnimationState::Walking, AnimationState::Attacking] {
                        if let Some(sound) = animation_loop(kind, animation) {
                            out.push(SoundCue::StopLoop(sound));
                        }
                    }
                }
                Event::PawnsSelected { pawns } => {
                    if !self.ambience_started {
                        self.ambience_started = true;
                        out.extend(AMBIENCE.map(SoundCue::StartLoop));
                    }
                    if !pawns.is_empty() {
                        out.push(SoundCue::Play(Sound::Selection));
                    }
                }
                Event::ConstructionCompleted { .. } => {
                    out.push(SoundCue::Play(Sound::BuildingCompleted));
                }
                _ => {}
            }
        }

        let moving = camera.is_moving();
        if moving != self.camera_moving {
            self.camera_moving = moving;
            out.push(if moving {
                SoundCue::StartLoop(Sound::CameraMovement)
            } else {
                SoundCue::StopLoop(Sound::CameraMovement)
            });
        }
    }
}

/// Loop played while a unit of `kind` shows `animation`.
#[must_use]
pub fn animation_loop(kind: UnitKind, animation: AnimationState) -> Option<Sound> {
    match (kind, animation) {
        (_, AnimationState::Idle) => None,
        (UnitKind::Pawn, AnimationState::Walking) => Some(Sound::PawnWalking),
        (UnitKind::Pawn, AnimationState::Attacking) => Some(Sound::SwordSwing),
        (UnitKind::Goblin, AnimationState::Walking) => Some(Sound::GoblinWalking),
        (UnitKind::Goblin, AnimationState::Attacking) => Some(Sound::TorchSlash),
    }
}
