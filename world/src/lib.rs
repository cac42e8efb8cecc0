#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Outpost.

mod collision;
mod schedule;
mod units;

use std::{collections::BTreeMap, time::Duration};

use outpost_core::{
    AnimationState, BuildingId, BuildingKind, Command, ConstructionState, DamageOutcome, Event,
    GoblinId, PawnId, UnitId, UnitKind, WorldPoint, WorldRect,
    BUILDING_REMOVAL_DELAY, CONSTRUCTION_DELAY_MAX, CONSTRUCTION_DELAY_MIN,
    CONSTRUCTION_RETRY_INTERVAL, DEMOLITION_DELAY, GOBLIN_REMOVAL_DELAY, WELCOME_BANNER,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

pub use collision::{
    CollisionMap, MapError, MapLayout, BLOCKING_SYMBOL, CELL_SIZE, DEFAULT_COLUMNS,
    DEFAULT_OFFSET, WALKABLE_SYMBOL,
};

use schedule::{Schedule, ScheduledEvent};
use units::{BuildingState, Damageable, PawnState, UnitState};

/// Seed used when hosts do not provide one.
pub const DEFAULT_SEED: u64 = 0x6f75_7470_6f73_7421;

/// Represents the authoritative Outpost world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    collision: CollisionMap,
    pawns: BTreeMap<PawnId, PawnState>,
    next_pawn_id: PawnId,
    goblins: BTreeMap<GoblinId, UnitState>,
    next_goblin_id: GoblinId,
    buildings: BTreeMap<BuildingId, BuildingState>,
    next_building_id: BuildingId,
    schedule: Schedule,
    rng: ChaCha8Rng,
    elapsed: Duration,
    tick_index: u64,
    game_over: bool,
}

impl World {
    /// Creates an empty world around the provided obstacle map.
    ///
    /// `seed` drives every randomised decision, so two worlds built with the
    /// same seed and fed the same commands emit identical event streams.
    #[must_use]
    pub fn new(collision: CollisionMap, seed: u64) -> Self {
        info!(
            obstacles = collision.obstacles().len(),
            seed, "world created"
        );
        Self {
            banner: WELCOME_BANNER,
            collision,
            pawns: BTreeMap::new(),
            next_pawn_id: PawnId::new(0),
            goblins: BTreeMap::new(),
            next_goblin_id: GoblinId::new(0),
            buildings: BTreeMap::new(),
            next_building_id: BuildingId::new(0),
            schedule: Schedule::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            elapsed: Duration::ZERO,
            tick_index: 0,
            game_over: false,
        }
    }

    fn unit(&self, unit: UnitId) -> Option<&UnitState> {
        match unit {
            UnitId::Pawn(pawn) => self.pawns.get(&pawn).map(|state| &state.unit),
            UnitId::Goblin(goblin) => self.goblins.get(&goblin),
        }
    }

    fn unit_mut(&mut self, unit: UnitId) -> Option<&mut UnitState> {
        match unit {
            UnitId::Pawn(pawn) => self.pawns.get_mut(&pawn).map(|state| &mut state.unit),
            UnitId::Goblin(goblin) => self.goblins.get_mut(&goblin),
        }
    }

    fn living_unit_mut(&mut self, unit: UnitId) -> Option<&mut UnitState> {
        self.unit_mut(unit).filter(|state| state.is_alive())
    }

    fn is_blocked(&self, rect: &WorldRect) -> bool {
        self.collision.is_blocked(rect)
            || self
                .buildings
                .values()
                .filter_map(BuildingState::boundary)
                .any(|boundary| rect.touches(&boundary))
    }

    fn danger_zone_occupied(&self, zone: &WorldRect) -> bool {
        self.pawns
            .values()
            .filter(|pawn| pawn.unit.is_alive())
            .any(|pawn| pawn.unit.hitbox_at(pawn.unit.position).touches(zone))
    }

    fn any_pawn_alive(&self) -> bool {
        self.pawns.values().any(|pawn| pawn.unit.is_alive())
    }

    fn construction_delay(&mut self) -> Duration {
        let min = CONSTRUCTION_DELAY_MIN.as_millis() as u64;
        let max = CONSTRUCTION_DELAY_MAX.as_millis() as u64;
        Duration::from_millis(self.rng.gen_range(min..=max))
    }

    fn set_animation(
        &mut self,
        unit: UnitId,
        animation: AnimationState,
        out_events: &mut Vec<Event>,
    ) {
        if let Some(state) = self.living_unit_mut(unit) {
            let previous = state.animation;
            if previous != animation {
                state.animation = animation;
                out_events.push(Event::AnimationChanged {
                    unit,
                    from: previous,
                    to: animation,
                });
            }
        }
    }

    fn advance_clock(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        self.elapsed = self.elapsed.saturating_add(dt);
        out_events.push(Event::TimeAdvanced {
            dt,
            tick: self.tick_index,
        });

        for pawn in self.pawns.values_mut() {
            pawn.unit.advance_death();
        }
        for goblin in self.goblins.values_mut() {
            goblin.advance_death();
        }

        while let Some(due) = self.schedule.pop_due(self.elapsed) {
            self.fire_scheduled(due, out_events);
        }
    }

    fn fire_scheduled(&mut self, due: ScheduledEvent, out_events: &mut Vec<Event>) {
        match due {
            ScheduledEvent::ConstructionAttempt(building) => {
                let Some(state) = self.buildings.get_mut(&building) else {
                    return;
                };
                state.attempt_pending = false;
                if state.state == ConstructionState::UnderConstruction {
                    out_events.push(Event::ConstructionAttemptDue { building });
                }
            }
            ScheduledEvent::RemoveGoblin(goblin) => {
                let dead = self
                    .goblins
                    .get(&goblin)
                    .is_some_and(|state| !state.is_alive());
                if dead {
                    let _ = self.goblins.remove(&goblin);
                    debug!(goblin = goblin.get(), "goblin removed");
                    out_events.push(Event::UnitRemoved {
                        unit: UnitId::Goblin(goblin),
                    });
                }
            }
            ScheduledEvent::RemoveBuilding(building) => {
                let destroyed = self
                    .buildings
                    .get(&building)
                    .is_some_and(|state| state.state == ConstructionState::Destroyed);
                if destroyed {
                    let _ = self.buildings.remove(&building);
                    debug!(building = building.get(), "building removed");
                    out_events.push(Event::BuildingRemoved { building });
                }
            }
        }
    }

    fn spawn_pawn(&mut self, position: WorldPoint, out_events: &mut Vec<Event>) {
        let pawn = self.next_pawn_id;
        self.next_pawn_id = PawnId::new(pawn.get().saturating_add(1));
        let _ = self.pawns.insert(pawn, PawnState::new(position));
        out_events.push(Event::PawnSpawned { pawn, position });
    }

    fn spawn_goblin(&mut self, position: WorldPoint, out_events: &mut Vec<Event>) {
        let goblin = self.next_goblin_id;
        self.next_goblin_id = GoblinId::new(goblin.get().saturating_add(1));
        let _ = self
            .goblins
            .insert(goblin, UnitState::new(UnitKind::Goblin, position));
        out_events.push(Event::GoblinSpawned { goblin, position });
    }

    fn place_building(
        &mut self,
        kind: BuildingKind,
        position: WorldPoint,
        out_events: &mut Vec<Event>,
    ) {
        let building = self.next_building_id;
        self.next_building_id = BuildingId::new(building.get().saturating_add(1));

        let mut state = BuildingState::new(kind, position);
        let delay = self.construction_delay();
        self.schedule.push(
            self.elapsed.saturating_add(delay),
            ScheduledEvent::ConstructionAttempt(building),
        );
        state.attempt_pending = true;

        let boundary = kind.construction_boundary(position);
        let _ = self.buildings.insert(building, state);
        debug!(
            building = building.get(),
            ?kind,
            delay_ms = delay.as_millis() as u64,
            "construction started"
        );
        out_events.push(Event::BuildingPlaced {
            building,
            kind,
            boundary,
        });
    }

    fn select_pawns(&mut self, area: WorldRect, out_events: &mut Vec<Event>) {
        let mut selected = Vec::new();
        for (&pawn, state) in self.pawns.iter_mut() {
            let inside = state.unit.is_alive()
                && state
                    .unit
                    .hitbox_at(state.unit.position)
                    .touches(&area);

            if !inside && state.move_order.take().is_some() {
                out_events.push(Event::MoveOrderCancelled { pawn });
            }
            state.selected = inside;
            if inside {
                selected.push(pawn);
            }
        }
        out_events.push(Event::PawnsSelected { pawns: selected });
    }

    fn order_move(&mut self, pawns: Vec<PawnId>, target: WorldPoint, out_events: &mut Vec<Event>) {
        for pawn in pawns {
            let Some(state) = self.pawns.get_mut(&pawn) else {
                continue;
            };
            if !state.selected || !state.unit.is_alive() {
                debug!(pawn = pawn.get(), "move order ignored");
                continue;
            }
            state.move_order = Some(target);
            out_events.push(Event::MoveOrderIssued { pawn, target });
        }
    }

    fn step_unit(&mut self, unit: UnitId, to: WorldPoint, out_events: &mut Vec<Event>) {
        let Some(state) = self.unit(unit).filter(|state| state.is_alive()) else {
            return;
        };
        let from = state.position;
        let candidate = state.hitbox_at(to);

        if self.is_blocked(&candidate) {
            out_events.push(Event::UnitMoveBlocked { unit });
            return;
        }

        if let Some(state) = self.unit_mut(unit) {
            state.position = to;
            out_events.push(Event::UnitMoved { unit, from, to });
        }
    }

    fn complete_move_order(&mut self, pawn: PawnId, out_events: &mut Vec<Event>) {
        let cleared = self
            .pawns
            .get_mut(&pawn)
            .filter(|state| state.unit.is_alive())
            .and_then(|state| state.move_order.take())
            .is_some();

        if cleared {
            self.set_animation(UnitId::Pawn(pawn), AnimationState::Idle, out_events);
            out_events.push(Event::MoveOrderCompleted { pawn });
        }
    }

    fn strike(&mut self, attacker: UnitId, target: UnitId, out_events: &mut Vec<Event>) {
        if attacker.kind() == target.kind() {
            return;
        }
        if self.unit(target).map_or(true, |state| !state.is_alive()) {
            return;
        }
        let Some(damage) = self
            .living_unit_mut(attacker)
            .and_then(UnitState::register_strike)
        else {
            return;
        };
        let Some(victim) = self.unit_mut(target) else {
            return;
        };

        let outcome = victim.take_damage(damage);
        out_events.push(Event::UnitDamaged {
            unit: target,
            amount: damage,
            remaining: victim.health.get(),
        });

        if outcome == DamageOutcome::Depleted {
            victim.die();
            self.unit_died(target, out_events);
        }
    }

    fn unit_died(&mut self, unit: UnitId, out_events: &mut Vec<Event>) {
        info!(?unit, "unit died");
        out_events.push(Event::UnitDied { unit });

        match unit {
            UnitId::Goblin(goblin) => self.schedule.push(
                self.elapsed.saturating_add(GOBLIN_REMOVAL_DELAY),
                ScheduledEvent::RemoveGoblin(goblin),
            ),
            UnitId::Pawn(pawn) => {
                if let Some(state) = self.pawns.get_mut(&pawn) {
                    state.selected = false;
                    state.move_order = None;
                }
                if !self.game_over && !self.any_pawn_alive() {
                    self.game_over = true;
                    info!(elapsed_ms = self.elapsed.as_millis() as u64, "game over");
                    out_events.push(Event::GameOver);
                }
            }
        }
    }

    fn complete_construction(&mut self, building: BuildingId, out_events: &mut Vec<Event>) {
        let Some(zone) = self
            .buildings
            .get(&building)
            .filter(|state| state.state == ConstructionState::UnderConstruction)
            .map(BuildingState::danger_zone)
        else {
            return;
        };

        if self.danger_zone_occupied(&zone) {
            self.retry_construction(building, out_events);
            return;
        }

        if let Some(state) = self.buildings.get_mut(&building) {
            state.state = ConstructionState::Complete;
            info!(building = building.get(), kind = ?state.kind, "construction completed");
            out_events.push(Event::ConstructionCompleted {
                building,
                boundary: zone,
            });
        }
    }

    fn retry_construction(&mut self, building: BuildingId, out_events: &mut Vec<Event>) {
        let Some(state) = self.buildings.get_mut(&building) else {
            return;
        };
        if state.state != ConstructionState::UnderConstruction || state.attempt_pending {
            return;
        }

        state.attempt_pending = true;
        self.schedule.push(
            self.elapsed.saturating_add(CONSTRUCTION_RETRY_INTERVAL),
            ScheduledEvent::ConstructionAttempt(building),
        );
        out_events.push(Event::ConstructionDelayed {
            building,
            retry_in: CONSTRUCTION_RETRY_INTERVAL,
        });
    }

    fn damage_building(&mut self, building: BuildingId, amount: u32, out_events: &mut Vec<Event>) {
        let elapsed = self.elapsed;
        let Some(state) = self
            .buildings
            .get_mut(&building)
            .filter(|state| state.state != ConstructionState::Destroyed)
        else {
            return;
        };

        if state.take_damage(amount) == DamageOutcome::Depleted {
            state.depleted_at = Some(elapsed);
        }
        out_events.push(Event::BuildingDamaged {
            building,
            remaining: state.health.get(),
        });
    }

    fn destroy_building(&mut self, building: BuildingId, out_events: &mut Vec<Event>) {
        let elapsed = self.elapsed;
        let Some(state) = self.buildings.get_mut(&building) else {
            return;
        };
        let demolished = state.state == ConstructionState::Complete
            && state.health.is_depleted()
            && state
                .depleted_at
                .is_some_and(|since| elapsed.saturating_sub(since) >= DEMOLITION_DELAY);
        if !demolished {
            debug!(building = building.get(), "destroy request ignored");
            return;
        }

        state.state = ConstructionState::Destroyed;
        self.schedule.push(
            elapsed.saturating_add(BUILDING_REMOVAL_DELAY),
            ScheduledEvent::RemoveBuilding(building),
        );
        info!(building = building.get(), "building destroyed");
        out_events.push(Event::BuildingDestroyed { building });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    // After game over only the clock and animation changes still apply, so
    // surviving goblins can settle back to Idle.
    if world.game_over && !matches!(command, Command::Tick { .. } | Command::SetActivity { .. })
    {
        debug!(?command, "command ignored after game over");
        return;
    }

    match command {
        Command::Tick { dt } => world.advance_clock(dt, out_events),
        Command::SpawnPawn { position } => world.spawn_pawn(position, out_events),
        Command::SpawnGoblin { position } => world.spawn_goblin(position, out_events),
        Command::PlaceBuilding { kind, position } => {
            world.place_building(kind, position, out_events)
        }
        Command::SelectPawns { area } => world.select_pawns(area, out_events),
        Command::OrderMove { pawns, target } => world.order_move(pawns, target, out_events),
        Command::SetActivity {
            unit,
            animation,
            facing,
        } => {
            world.set_animation(unit, animation, out_events);
            if let (Some(facing), Some(state)) = (facing, world.living_unit_mut(unit)) {
                state.facing = facing;
            }
        }
        Command::StepUnit { unit, to } => world.step_unit(unit, to, out_events),
        Command::CompleteMoveOrder { pawn } => world.complete_move_order(pawn, out_events),
        Command::Strike { attacker, target } => world.strike(attacker, target, out_events),
        Command::CompleteConstruction { building } => {
            world.complete_construction(building, out_events)
        }
        Command::RetryConstruction { building } => {
            world.retry_construction(building, out_events)
        }
        Command::DamageBuilding { building, amount } => {
            world.damage_building(building, amount, out_events)
        }
        Command::DestroyBuilding { building } => world.destroy_building(building, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use outpost_core::{
        BuildingView, GoblinView, PawnId, PawnView, WorldRect,
    };

    use super::{units::goblin_snapshot, BuildingState, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Captures a read-only view of every pawn, dead ones included.
    #[must_use]
    pub fn pawn_view(world: &World) -> PawnView {
        PawnView::from_snapshots(
            world
                .pawns
                .iter()
                .map(|(&id, pawn)| pawn.snapshot(id))
                .collect(),
        )
    }

    /// Captures a read-only view of every goblin still in the registry.
    #[must_use]
    pub fn goblin_view(world: &World) -> GoblinView {
        GoblinView::from_snapshots(
            world
                .goblins
                .iter()
                .map(|(&id, goblin)| goblin_snapshot(id, goblin))
                .collect(),
        )
    }

    /// Captures a read-only view of every building still in the registry.
    #[must_use]
    pub fn building_view(world: &World) -> BuildingView {
        BuildingView::from_snapshots(
            world
                .buildings
                .iter()
                .map(|(&id, building)| building.snapshot(id))
                .collect(),
        )
    }

    /// Pawns currently selected by the player, in identifier order.
    #[must_use]
    pub fn selected_pawns(world: &World) -> Vec<PawnId> {
        world
            .pawns
            .iter()
            .filter(|(_, pawn)| pawn.selected)
            .map(|(&id, _)| id)
            .collect()
    }

    /// Static obstacles compiled from the map.
    #[must_use]
    pub fn static_obstacles(world: &World) -> &[WorldRect] {
        world.collision.obstacles()
    }

    /// Every rectangle currently blocking movement: map cells then building boundaries.
    #[must_use]
    pub fn obstacles(world: &World) -> Vec<WorldRect> {
        world
            .collision
            .obstacles()
            .iter()
            .copied()
            .chain(world.buildings.values().filter_map(BuildingState::boundary))
            .collect()
    }

    /// Walkable tiles compiled from the map, kept for debug overlays.
    #[must_use]
    pub fn walkable_cells(world: &World) -> &[WorldRect] {
        world.collision.walkable()
    }

    /// Reports whether `rect` touches a static obstacle or an active building boundary.
    #[must_use]
    pub fn is_blocked(world: &World, rect: &WorldRect) -> bool {
        world.is_blocked(rect)
    }

    /// Simulated time accumulated by all ticks so far.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Reports whether the last pawn died.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_core::{Health, MAX_HEALTH};

    fn world() -> World {
        World::new(CollisionMap::empty(), 7)
    }

    fn run(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            apply(world, command, &mut events);
        }
        events
    }

    fn tick(world: &mut World, millis: u64) -> Vec<Event> {
        run(
            world,
            vec![Command::Tick {
                dt: Duration::from_millis(millis),
            }],
        )
    }

    #[test]
    fn spawns_allocate_monotonic_identifiers() {
        let mut world = world();
        let events = run(
            &mut world,
            vec![
                Command::SpawnPawn {
                    position: WorldPoint::new(0.0, 0.0),
                },
                Command::SpawnPawn {
                    position: WorldPoint::new(10.0, 0.0),
                },
                Command::SpawnGoblin {
                    position: WorldPoint::new(300.0, 0.0),
                },
            ],
        );

        assert_eq!(
            events,
            vec![
                Event::PawnSpawned {
                    pawn: PawnId::new(0),
                    position: WorldPoint::new(0.0, 0.0)
                },
                Event::PawnSpawned {
                    pawn: PawnId::new(1),
                    position: WorldPoint::new(10.0, 0.0)
                },
                Event::GoblinSpawned {
                    goblin: GoblinId::new(0),
                    position: WorldPoint::new(300.0, 0.0)
                },
            ]
        );
        assert_eq!(query::pawn_view(&world).len(), 2);
        assert!(query::pawn_view(&world)
            .iter()
            .all(|pawn| pawn.health == Health::new(MAX_HEALTH)));
    }

    #[test]
    fn tick_advances_clock_and_reports_index() {
        let mut world = world();
        let first = tick(&mut world, 16);
        let second = tick(&mut world, 16);

        assert_eq!(
            first,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(16),
                tick: 1
            }]
        );
        assert_eq!(
            second,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(16),
                tick: 2
            }]
        );
        assert_eq!(query::elapsed(&world), Duration::from_millis(32));
        assert_eq!(query::tick_index(&world), 2);
    }

    #[test]
    fn selection_uses_hitboxes_and_deselection_cancels_orders() {
        let mut world = world();
        let _ = run(
            &mut world,
            vec![
                Command::SpawnPawn {
                    position: WorldPoint::new(0.0, 0.0),
                },
                Command::SpawnPawn {
                    position: WorldPoint::new(500.0, 0.0),
                },
            ],
        );

        let events = run(
            &mut world,
            vec![
                Command::SelectPawns {
                    area: WorldRect::new(60.0, 60.0, 20.0, 20.0),
                },
                Command::OrderMove {
                    pawns: vec![PawnId::new(0), PawnId::new(1)],
                    target: WorldPoint::new(400.0, 400.0),
                },
            ],
        );
        assert_eq!(
            events,
            vec![
                Event::PawnsSelected {
                    pawns: vec![PawnId::new(0)]
                },
                Event::MoveOrderIssued {
                    pawn: PawnId::new(0),
                    target: WorldPoint::new(400.0, 400.0)
                },
            ]
        );

        let events = run(
            &mut world,
            vec![Command::SelectPawns {
                area: WorldRect::new(570.0, 570.0, 10.0, 10.0),
            }],
        );
        assert_eq!(
            events,
            vec![
                Event::MoveOrderCancelled {
                    pawn: PawnId::new(0)
                },
                Event::PawnsSelected { pawns: Vec::new() },
            ]
        );
        assert!(query::selected_pawns(&world).is_empty());
    }

    #[test]
    fn steps_into_obstacles_are_vetoed() {
        let mut world = World::new(
            CollisionMap::from_obstacles(vec![WorldRect::new(128.0, 64.0, 64.0, 64.0)]),
            7,
        );
        let _ = run(
            &mut world,
            vec![Command::SpawnPawn {
                position: WorldPoint::new(0.0, 0.0),
            }],
        );
        let unit = UnitId::Pawn(PawnId::new(0));

        let blocked = run(
            &mut world,
            vec![Command::StepUnit {
                unit,
                to: WorldPoint::new(24.0, 0.0),
            }],
        );
        assert_eq!(blocked, vec![Event::UnitMoveBlocked { unit }]);

        let moved = run(
            &mut world,
            vec![Command::StepUnit {
                unit,
                to: WorldPoint::new(23.0, 0.0),
            }],
        );
        assert_eq!(
            moved,
            vec![Event::UnitMoved {
                unit,
                from: WorldPoint::new(0.0, 0.0),
                to: WorldPoint::new(23.0, 0.0)
            }]
        );
    }

    #[test]
    fn strikes_against_same_kind_are_ignored() {
        let mut world = world();
        let _ = run(
            &mut world,
            vec![
                Command::SpawnPawn {
                    position: WorldPoint::default(),
                },
                Command::SpawnPawn {
                    position: WorldPoint::default(),
                },
            ],
        );
        let strike = Command::Strike {
            attacker: UnitId::Pawn(PawnId::new(0)),
            target: UnitId::Pawn(PawnId::new(1)),
        };
        let events = run(&mut world, vec![strike; 200]);

        assert!(events.is_empty());
    }

    #[test]
    fn last_pawn_death_ends_the_game_once() {
        let mut world = world();
        let _ = run(
            &mut world,
            vec![
                Command::SpawnPawn {
                    position: WorldPoint::default(),
                },
                Command::SpawnGoblin {
                    position: WorldPoint::default(),
                },
            ],
        );
        let strike = Command::Strike {
            attacker: UnitId::Goblin(GoblinId::new(0)),
            target: UnitId::Pawn(PawnId::new(0)),
        };

        let events = run(&mut world, vec![strike; 2_500]);

        let game_overs = events
            .iter()
            .filter(|event| matches!(event, Event::GameOver))
            .count();
        let damage = events
            .iter()
            .filter(|event| matches!(event, Event::UnitDamaged { .. }))
            .count();
        assert_eq!(game_overs, 1);
        assert_eq!(damage, 20);
        assert!(query::is_game_over(&world));
        assert!(events.contains(&Event::UnitDied {
            unit: UnitId::Pawn(PawnId::new(0))
        }));
    }

    #[test]
    fn goblins_settle_to_idle_after_game_over() {
        let mut world = world();
        let goblin = UnitId::Goblin(GoblinId::new(0));
        let _ = run(
            &mut world,
            vec![
                Command::SpawnPawn {
                    position: WorldPoint::default(),
                },
                Command::SpawnGoblin {
                    position: WorldPoint::default(),
                },
                Command::SetActivity {
                    unit: goblin,
                    animation: AnimationState::Attacking,
                    facing: None,
                },
            ],
        );
        let strike = Command::Strike {
            attacker: goblin,
            target: UnitId::Pawn(PawnId::new(0)),
        };
        let _ = run(&mut world, vec![strike; 2_500]);
        assert!(query::is_game_over(&world));

        let events = run(
            &mut world,
            vec![
                Command::SpawnGoblin {
                    position: WorldPoint::new(500.0, 0.0),
                },
                Command::SetActivity {
                    unit: goblin,
                    animation: AnimationState::Idle,
                    facing: None,
                },
            ],
        );

        assert_eq!(
            events,
            vec![Event::AnimationChanged {
                unit: goblin,
                from: AnimationState::Attacking,
                to: AnimationState::Idle,
            }]
        );
        assert_eq!(query::goblin_view(&world).len(), 1);
    }

    #[test]
    fn retry_is_not_duplicated_while_attempt_pending() {
        let mut world = world();
        let building = BuildingId::new(0);
        let _ = run(
            &mut world,
            vec![Command::PlaceBuilding {
                kind: BuildingKind::House,
                position: WorldPoint::new(0.0, 0.0),
            }],
        );

        let events = run(
            &mut world,
            vec![
                Command::RetryConstruction { building },
                Command::RetryConstruction { building },
            ],
        );
        assert!(events.is_empty());
    }

    #[test]
    fn construction_attempt_falls_within_delay_bounds() {
        let mut world = world();
        let _ = run(
            &mut world,
            vec![Command::PlaceBuilding {
                kind: BuildingKind::Castle,
                position: WorldPoint::new(0.0, 0.0),
            }],
        );

        let mut due_at = None;
        for _ in 0..16_000 {
            let events = tick(&mut world, 1);
            if events.contains(&Event::ConstructionAttemptDue {
                building: BuildingId::new(0),
            }) {
                due_at = Some(query::elapsed(&world));
                break;
            }
        }

        let due_at = due_at.expect("attempt fires");
        assert!(due_at >= CONSTRUCTION_DELAY_MIN);
        assert!(due_at <= CONSTRUCTION_DELAY_MAX);
    }

    #[test]
    fn destroy_requires_completed_and_depleted_building() {
        let mut world = world();
        let building = BuildingId::new(0);
        let _ = run(
            &mut world,
            vec![
                Command::PlaceBuilding {
                    kind: BuildingKind::House,
                    position: WorldPoint::new(0.0, 0.0),
                },
                Command::DamageBuilding {
                    building,
                    amount: 100,
                },
            ],
        );
        let _ = tick(&mut world, 2_000);
        assert!(run(&mut world, vec![Command::DestroyBuilding { building }]).is_empty());

        let events = run(&mut world, vec![Command::CompleteConstruction { building }]);
        assert!(matches!(
            events.as_slice(),
            [Event::ConstructionCompleted { .. }]
        ));

        let events = run(&mut world, vec![Command::DestroyBuilding { building }]);
        assert_eq!(events, vec![Event::BuildingDestroyed { building }]);
        assert!(query::obstacles(&world).is_empty());
    }
}
