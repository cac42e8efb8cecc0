use std::time::Duration;

use outpost_core::{AnimationState, Command, Event, PawnId, WorldPoint, WorldRect};
use outpost_system_movement::Movement;
use outpost_world::{apply, query, CollisionMap, World};

fn frame(world: &mut World, movement: &mut Movement, events: &mut Vec<Event>) {
    apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        events,
    );
    let pawns = query::pawn_view(world);
    let mut commands = Vec::new();
    movement.handle_pawns(&pawns, |rect| query::is_blocked(world, rect), &mut commands);
    for command in commands {
        apply(world, command, events);
    }
}

#[test]
fn pawn_halts_flush_against_a_wall_and_keeps_walking() {
    let wall = WorldRect::new(128.0, -1_000.0, 64.0, 2_000.0);
    let mut world = World::new(CollisionMap::from_obstacles(vec![wall]), 5);
    let mut events = Vec::new();
    let pawn = PawnId::new(0);
    apply(
        &mut world,
        Command::SpawnPawn {
            position: WorldPoint::new(0.0, 0.0),
        },
        &mut events,
    );
    apply(
        &mut world,
        Command::SelectPawns {
            area: WorldRect::new(0.0, 0.0, 200.0, 200.0),
        },
        &mut events,
    );
    apply(
        &mut world,
        Command::OrderMove {
            pawns: vec![pawn],
            target: WorldPoint::new(1_000.0, 96.0),
        },
        &mut events,
    );

    let mut movement = Movement::new();
    for _ in 0..100 {
        frame(&mut world, &mut movement, &mut events);
    }

    let view = query::pawn_view(&world);
    let snapshot = view.get(pawn).expect("pawn exists");
    assert_eq!(snapshot.position, WorldPoint::new(22.0, 0.0));
    assert_eq!(snapshot.animation, AnimationState::Walking);
    assert_eq!(snapshot.move_order, Some(WorldPoint::new(1_000.0, 96.0)));
    assert!(!query::is_blocked(
        &world,
        &outpost_core::UnitKind::Pawn.hitbox().rect_at(snapshot.position)
    ));
}

#[test]
fn pawn_reaches_open_target_and_idles() {
    let mut world = World::new(CollisionMap::empty(), 5);
    let mut events = Vec::new();
    let pawn = PawnId::new(0);
    apply(
        &mut world,
        Command::SpawnPawn {
            position: WorldPoint::new(0.0, 0.0),
        },
        &mut events,
    );
    apply(
        &mut world,
        Command::SelectPawns {
            area: WorldRect::new(0.0, 0.0, 200.0, 200.0),
        },
        &mut events,
    );
    apply(
        &mut world,
        Command::OrderMove {
            pawns: vec![pawn],
            target: WorldPoint::new(196.0, 96.0),
        },
        &mut events,
    );

    let mut movement = Movement::new();
    for _ in 0..60 {
        frame(&mut world, &mut movement, &mut events);
    }

    assert!(events.contains(&Event::MoveOrderCompleted { pawn }));
    let view = query::pawn_view(&world);
    let snapshot = view.get(pawn).expect("pawn exists");
    assert_eq!(snapshot.animation, AnimationState::Idle);
    assert_eq!(snapshot.move_order, None);
    assert!((snapshot.position.x() - 98.0).abs() < 5.0);
}
