#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system deciding when buildings finish construction and when ruined
//! buildings come down.

use std::time::Duration;

use outpost_core::{
    Body, BuildingView, Command, ConstructionState, Event, PawnView, WorldRect, DEMOLITION_DELAY,
};

/// Construction scheduler reacting to due attempts and depleted buildings.
#[derive(Debug, Default)]
pub struct Construction;

impl Construction {
    /// Creates a new construction system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Answers every due construction attempt and requests overdue demolitions.
    ///
    /// An attempt completes when no living pawn stands in the danger zone and
    /// is retried otherwise. `now` is the simulated time after the current tick.
    pub fn handle(
        &mut self,
        events: &[Event],
        buildings: &BuildingView,
        pawns: &PawnView,
        now: Duration,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            let Event::ConstructionAttemptDue { building } = event else {
                continue;
            };
            let Some(snapshot) = buildings
                .get(*building)
                .filter(|snapshot| snapshot.state == ConstructionState::UnderConstruction)
            else {
                continue;
            };

            if danger_zone_occupied(&snapshot.danger_zone(), pawns) {
                out.push(Command::RetryConstruction {
                    building: *building,
                });
            } else {
                out.push(Command::CompleteConstruction {
                    building: *building,
                });
            }
        }

        for snapshot in buildings.iter() {
            let overdue = snapshot.state == ConstructionState::Complete
                && snapshot.health.is_depleted()
                && snapshot
                    .depleted_at
                    .is_some_and(|since| now.saturating_sub(since) >= DEMOLITION_DELAY);
            if overdue {
                out.push(Command::DestroyBuilding {
                    building: snapshot.id,
                });
            }
        }
    }
}

/// Reports whether any living pawn's hitbox touches `zone`.
#[must_use]
pub fn danger_zone_occupied(zone: &WorldRect, pawns: &PawnView) -> bool {
    pawns
        .iter()
        .filter(|pawn| pawn.is_alive())
        .any(|pawn| pawn.hitbox_rect().touches(zone))
}
