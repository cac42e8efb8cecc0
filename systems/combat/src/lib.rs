#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves trigger-box scans and strikes between pawns and goblins.

use outpost_core::{
    AnimationState, Body, Command, Facing, GoblinPursuit, GoblinSnapshot, GoblinView,
    PawnEngagement, PawnView, UnitId, UnitKind, WorldPoint, PAWN_ATTACK_RANGE,
};

/// Combat system that reuses its engagement buffer between frames.
#[derive(Debug, Default)]
pub struct Combat {
    engagements: Vec<PawnEngagement>,
}

impl Combat {
    /// Creates a new combat system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits the attack and idle decisions of every living pawn.
    ///
    /// Pawns holding a move order still strike but leave their animation to
    /// the movement system.
    pub fn handle_pawns(&mut self, pawns: &PawnView, goblins: &GoblinView, out: &mut Vec<Command>) {
        acquire_pawn_targets(pawns, goblins, &mut self.engagements);

        for pawn in pawns.iter().filter(|pawn| pawn.is_alive()) {
            let unit = UnitId::Pawn(pawn.id);
            let engagement = self
                .engagements
                .iter()
                .find(|engagement| engagement.pawn() == pawn.id);

            match engagement {
                Some(PawnEngagement::Attacking { goblin, facing, .. }) => {
                    if pawn.move_order.is_none() {
                        out.push(Command::SetActivity {
                            unit,
                            animation: AnimationState::Attacking,
                            facing: Some(*facing),
                        });
                    }
                    out.push(Command::Strike {
                        attacker: unit,
                        target: UnitId::Goblin(*goblin),
                    });
                }
                Some(PawnEngagement::Noticed { .. }) | None => {
                    if pawn.move_order.is_none() {
                        out.push(Command::SetActivity {
                            unit,
                            animation: AnimationState::Idle,
                            facing: None,
                        });
                    }
                }
            }
        }
    }

    /// Emits strikes for goblins whose pursuit brought them within striking distance.
    pub fn handle_goblins(&mut self, pursuits: &[GoblinPursuit], out: &mut Vec<Command>) {
        for pursuit in pursuits
            .iter()
            .filter(|pursuit| pursuit.within_striking_distance())
        {
            let unit = UnitId::Goblin(pursuit.goblin);
            out.push(Command::SetActivity {
                unit,
                animation: AnimationState::Attacking,
                facing: Some(pursuit.facing),
            });
            out.push(Command::Strike {
                attacker: unit,
                target: UnitId::Pawn(pursuit.pawn),
            });
        }
    }
}

/// Scans every living pawn's trigger box for living goblins.
///
/// The nearest goblin within attack range is attacked. Otherwise the nearest
/// goblin inside the trigger box is only noticed. Ties keep the lower identifier.
pub fn acquire_pawn_targets(
    pawns: &PawnView,
    goblins: &GoblinView,
    out: &mut Vec<PawnEngagement>,
) {
    out.clear();

    for pawn in pawns.iter().filter(|pawn| pawn.is_alive()) {
        let trigger = pawn.trigger_box();
        let center = pawn.center();
        let mut in_range: Option<(f32, &GoblinSnapshot)> = None;
        let mut noticed: Option<(f32, &GoblinSnapshot)> = None;

        for goblin in goblins
            .iter()
            .filter(|goblin| goblin.is_alive() && goblin.hitbox_rect().touches(&trigger))
        {
            let distance = center.distance_to(goblin.center());
            let slot = if distance < PAWN_ATTACK_RANGE {
                &mut in_range
            } else {
                &mut noticed
            };
            if slot.map_or(true, |(best, _)| distance < best) {
                *slot = Some((distance, goblin));
            }
        }

        if let Some((_, goblin)) = in_range {
            out.push(PawnEngagement::Attacking {
                pawn: pawn.id,
                goblin: goblin.id,
                facing: Facing::toward(goblin.center().x() - center.x()),
            });
        } else if let Some((_, goblin)) = noticed {
            out.push(PawnEngagement::Noticed {
                pawn: pawn.id,
                goblin: goblin.id,
            });
        }
    }
}

/// Computes the chase target of every living goblin.
///
/// A goblin chases the first living pawn, in identifier order, whose hitbox
/// touches its trigger box. It aims for the side of the pawn facing it.
pub fn acquire_goblin_targets(
    goblins: &GoblinView,
    pawns: &PawnView,
    out: &mut Vec<GoblinPursuit>,
) {
    out.clear();

    let pawn_extent = UnitKind::Pawn.sprite_extent();
    let goblin_extent = UnitKind::Goblin.sprite_extent();

    for goblin in goblins.iter().filter(|goblin| goblin.is_alive()) {
        let trigger = goblin.trigger_box();
        let Some(pawn) = pawns
            .iter()
            .find(|pawn| pawn.is_alive() && pawn.hitbox_rect().touches(&trigger))
        else {
            continue;
        };

        let pawn_on_left = pawn.center().x() < goblin.position.x();
        let standoff = if pawn_on_left {
            WorldPoint::new(
                pawn.position.x() + pawn_extent.width() / 2.0,
                pawn.position.y(),
            )
        } else {
            WorldPoint::new(
                pawn.position.x() - goblin_extent.width() / 2.0,
                pawn.position.y(),
            )
        };
        let dx = standoff.x() - goblin.position.x();
        let facing = if dx < 0.0 && pawn_on_left {
            Facing::Left
        } else {
            Facing::Right
        };

        out.push(GoblinPursuit {
            goblin: goblin.id,
            pawn: pawn.id,
            standoff,
            distance: goblin.position.distance_to(standoff),
            facing,
        });
    }
}
