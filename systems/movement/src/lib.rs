#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that steers pawns toward their orders and
//! goblins toward the pawns they chase.

use outpost_core::{
    AnimationState, Body, Command, Facing, GoblinPursuit, GoblinView, PawnView, UnitId, UnitKind,
    WorldPoint, WorldRect, ARRIVAL_DISTANCE,
};

/// Pure system that turns move orders and pursuits into step commands.
///
/// Every step is checked against `is_blocked` before it is proposed. The world
/// repeats the check when applying the step.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Creates a new movement system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits walking, step and arrival commands for pawns holding a move order.
    ///
    /// A pawn whose next step would touch an obstacle keeps walking in place
    /// and tries again on the next frame.
    pub fn handle_pawns<F>(&mut self, pawns: &PawnView, is_blocked: F, out: &mut Vec<Command>)
    where
        F: Fn(&WorldRect) -> bool,
    {
        for pawn in pawns.iter().filter(|pawn| pawn.is_alive()) {
            let Some(target) = pawn.move_order else {
                continue;
            };
            let unit = UnitId::Pawn(pawn.id);
            let center = pawn.center();
            let distance = center.distance_to(target);

            if distance < ARRIVAL_DISTANCE {
                out.push(Command::CompleteMoveOrder { pawn: pawn.id });
                continue;
            }

            let dx = target.x() - center.x();
            out.push(Command::SetActivity {
                unit,
                animation: AnimationState::Walking,
                facing: Some(Facing::toward(dx)),
            });

            let next = step_toward(pawn.position, center, target, UnitKind::Pawn.speed());
            if !is_blocked(&UnitKind::Pawn.hitbox().rect_at(next)) {
                out.push(Command::StepUnit { unit, to: next });
            }
        }
    }

    /// Emits walking, step and idle commands for every living goblin.
    ///
    /// Goblins without a pursuit idle. A goblin whose step is blocked gives up
    /// for the frame and idles.
    pub fn handle_goblins<F>(
        &mut self,
        pursuits: &[GoblinPursuit],
        goblins: &GoblinView,
        is_blocked: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(&WorldRect) -> bool,
    {
        for goblin in goblins.iter().filter(|goblin| goblin.is_alive()) {
            let unit = UnitId::Goblin(goblin.id);
            let Some(pursuit) = pursuits
                .iter()
                .find(|pursuit| pursuit.goblin == goblin.id)
            else {
                out.push(Command::SetActivity {
                    unit,
                    animation: AnimationState::Idle,
                    facing: None,
                });
                continue;
            };

            if !pursuit.within_striking_distance() {
                out.push(Command::SetActivity {
                    unit,
                    animation: AnimationState::Walking,
                    facing: Some(pursuit.facing),
                });
            }

            if pursuit.arrived() {
                continue;
            }

            let next = step_toward(
                goblin.position,
                goblin.position,
                pursuit.standoff,
                UnitKind::Goblin.speed(),
            );
            if is_blocked(&UnitKind::Goblin.hitbox().rect_at(next)) {
                out.push(Command::SetActivity {
                    unit,
                    animation: AnimationState::Idle,
                    facing: None,
                });
            } else {
                out.push(Command::StepUnit { unit, to: next });
            }
        }
    }
}

/// Moves `anchor` by `speed` along the direction from `origin` to `target`.
fn step_toward(anchor: WorldPoint, origin: WorldPoint, target: WorldPoint, speed: f32) -> WorldPoint {
    let distance = origin.distance_to(target);
    if distance <= f32::EPSILON {
        return anchor;
    }
    let dx = (target.x() - origin.x()) / distance * speed;
    let dy = (target.y() - origin.y()) / distance * speed;
    anchor.offset(dx, dy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_core::{GoblinId, GoblinSnapshot, Health, PawnId, PawnSnapshot};

    fn pawn(x: f32, y: f32, order: Option<WorldPoint>) -> PawnView {
        PawnView::from_snapshots(vec![PawnSnapshot {
            id: PawnId::new(0),
            position: WorldPoint::new(x, y),
            health: Health::full(),
            animation: AnimationState::Idle,
            facing: Facing::Right,
            selected: true,
            move_order: order,
            attack_counter: 0,
            death: None,
        }])
    }

    fn goblin(x: f32, y: f32) -> GoblinView {
        GoblinView::from_snapshots(vec![GoblinSnapshot {
            id: GoblinId::new(0),
            position: WorldPoint::new(x, y),
            health: Health::full(),
            animation: AnimationState::Idle,
            facing: Facing::Right,
            attack_counter: 0,
            death: None,
        }])
    }

    fn pursuit(standoff: WorldPoint, from: WorldPoint) -> GoblinPursuit {
        GoblinPursuit {
            goblin: GoblinId::new(0),
            pawn: PawnId::new(0),
            standoff,
            distance: from.distance_to(standoff),
            facing: Facing::Left,
        }
    }

    #[test]
    fn pawn_steps_two_units_toward_its_order() {
        let view = pawn(0.0, 0.0, Some(WorldPoint::new(96.0, 196.0)));
        let mut commands = Vec::new();

        Movement::new().handle_pawns(&view, |_| false, &mut commands);

        assert_eq!(
            commands,
            vec![
                Command::SetActivity {
                    unit: UnitId::Pawn(PawnId::new(0)),
                    animation: AnimationState::Walking,
                    facing: Some(Facing::Right),
                },
                Command::StepUnit {
                    unit: UnitId::Pawn(PawnId::new(0)),
                    to: WorldPoint::new(0.0, 2.0),
                },
            ]
        );
    }

    #[test]
    fn pawn_near_its_order_completes_it() {
        let view = pawn(0.0, 0.0, Some(WorldPoint::new(99.0, 99.0)));
        let mut commands = Vec::new();

        Movement::new().handle_pawns(&view, |_| false, &mut commands);

        assert_eq!(
            commands,
            vec![Command::CompleteMoveOrder {
                pawn: PawnId::new(0)
            }]
        );
    }

    #[test]
    fn blocked_pawn_keeps_walking_in_place() {
        let view = pawn(0.0, 0.0, Some(WorldPoint::new(-500.0, 96.0)));
        let mut commands = Vec::new();

        Movement::new().handle_pawns(&view, |_| true, &mut commands);

        assert_eq!(
            commands,
            vec![Command::SetActivity {
                unit: UnitId::Pawn(PawnId::new(0)),
                animation: AnimationState::Walking,
                facing: Some(Facing::Left),
            }]
        );
    }

    #[test]
    fn pawn_without_order_is_left_alone() {
        let view = pawn(0.0, 0.0, None);
        let mut commands = Vec::new();

        Movement::new().handle_pawns(&view, |_| false, &mut commands);

        assert!(commands.is_empty());
    }

    #[test]
    fn step_veto_is_inclusive_at_the_obstacle_edge() {
        let obstacle = WorldRect::new(128.0, 64.0, 64.0, 64.0);
        let is_blocked = |rect: &WorldRect| rect.touches(&obstacle);
        let target = Some(WorldPoint::new(1_000.0, 96.0));

        let mut touching = Vec::new();
        Movement::new().handle_pawns(&pawn(22.0, 0.0, target), is_blocked, &mut touching);
        assert!(!touching
            .iter()
            .any(|command| matches!(command, Command::StepUnit { .. })));

        let mut clear = Vec::new();
        Movement::new().handle_pawns(&pawn(21.0, 0.0, target), is_blocked, &mut clear);
        assert!(clear.contains(&Command::StepUnit {
            unit: UnitId::Pawn(PawnId::new(0)),
            to: WorldPoint::new(23.0, 0.0),
        }));
    }

    #[test]
    fn goblin_without_pursuit_idles() {
        let mut commands = Vec::new();

        Movement::new().handle_goblins(&[], &goblin(0.0, 0.0), |_| false, &mut commands);

        assert_eq!(
            commands,
            vec![Command::SetActivity {
                unit: UnitId::Goblin(GoblinId::new(0)),
                animation: AnimationState::Idle,
                facing: None,
            }]
        );
    }

    #[test]
    fn distant_goblin_walks_toward_standoff() {
        let from = WorldPoint::new(300.0, 0.0);
        let pursuits = [pursuit(WorldPoint::new(0.0, 0.0), from)];
        let mut commands = Vec::new();

        Movement::new().handle_goblins(&pursuits, &goblin(300.0, 0.0), |_| false, &mut commands);

        assert_eq!(
            commands,
            vec![
                Command::SetActivity {
                    unit: UnitId::Goblin(GoblinId::new(0)),
                    animation: AnimationState::Walking,
                    facing: Some(Facing::Left),
                },
                Command::StepUnit {
                    unit: UnitId::Goblin(GoblinId::new(0)),
                    to: WorldPoint::new(298.5, 0.0),
                },
            ]
        );
    }

    #[test]
    fn striking_goblin_closes_in_without_walking_animation() {
        let from = WorldPoint::new(20.0, 0.0);
        let pursuits = [pursuit(WorldPoint::new(0.0, 0.0), from)];
        let mut commands = Vec::new();

        Movement::new().handle_goblins(&pursuits, &goblin(20.0, 0.0), |_| false, &mut commands);

        assert_eq!(
            commands,
            vec![Command::StepUnit {
                unit: UnitId::Goblin(GoblinId::new(0)),
                to: WorldPoint::new(18.5, 0.0),
            }]
        );
    }

    #[test]
    fn arrived_goblin_holds_position() {
        let from = WorldPoint::new(3.0, 0.0);
        let pursuits = [pursuit(WorldPoint::new(0.0, 0.0), from)];
        let mut commands = Vec::new();

        Movement::new().handle_goblins(&pursuits, &goblin(3.0, 0.0), |_| false, &mut commands);

        assert!(commands.is_empty());
    }

    #[test]
    fn blocked_goblin_gives_up_for_the_frame() {
        let from = WorldPoint::new(300.0, 0.0);
        let pursuits = [pursuit(WorldPoint::new(0.0, 0.0), from)];
        let mut commands = Vec::new();

        Movement::new().handle_goblins(&pursuits, &goblin(300.0, 0.0), |_| true, &mut commands);

        assert_eq!(
            commands.last(),
            Some(&Command::SetActivity {
                unit: UnitId::Goblin(GoblinId::new(0)),
                animation: AnimationState::Idle,
                facing: None,
            })
        );
    }
}
