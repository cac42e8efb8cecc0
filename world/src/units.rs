//! Authoritative unit and building state stored inside the world.

use std::time::Duration;

use outpost_core::{
    AnimationState, BuildingId, BuildingKind, BuildingSnapshot, ConstructionState, DamageOutcome,
    DeathAnimation, Facing, GoblinId, GoblinSnapshot, Health, PawnId, PawnSnapshot, UnitKind,
    WorldPoint, WorldRect, STRIKE_INTERVAL,
};

/// Capability shared by everything that owns a health pool.
pub(crate) trait Damageable {
    /// Mutable access to the health pool.
    fn health_mut(&mut self) -> &mut Health;

    /// Subtracts `amount` from the health pool, saturating at zero.
    fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        self.health_mut().apply_damage(amount)
    }
}

/// Combat and animation state shared by pawns and goblins.
#[derive(Clone, Debug)]
pub(crate) struct UnitState {
    pub(crate) kind: UnitKind,
    pub(crate) position: WorldPoint,
    pub(crate) health: Health,
    pub(crate) animation: AnimationState,
    pub(crate) facing: Facing,
    pub(crate) attack_counter: u32,
    pub(crate) death: Option<DeathAnimation>,
}

impl UnitState {
    /// Creates a living unit standing idle at `position`.
    pub(crate) fn new(kind: UnitKind, position: WorldPoint) -> Self {
        Self {
            kind,
            position,
            health: Health::full(),
            animation: AnimationState::Idle,
            facing: Facing::Right,
            attack_counter: 0,
            death: None,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }

    /// Collision rectangle if the unit stood at `anchor`.
    pub(crate) fn hitbox_at(&self, anchor: WorldPoint) -> WorldRect {
        self.kind.hitbox().rect_at(anchor)
    }

    /// Accumulates one strike and returns the damage due on this strike.
    pub(crate) fn register_strike(&mut self) -> Option<u32> {
        self.attack_counter = self.attack_counter.saturating_add(1);
        if self.attack_counter % STRIKE_INTERVAL == 0 {
            self.attack_counter = 0;
            Some(self.kind.strike_damage())
        } else {
            None
        }
    }

    /// Freezes the unit and starts its death animation.
    pub(crate) fn die(&mut self) {
        self.animation = AnimationState::Idle;
        self.attack_counter = 0;
        self.death = Some(DeathAnimation::default());
    }

    pub(crate) fn advance_death(&mut self) {
        if let Some(death) = self.death.as_mut() {
            death.advance();
        }
    }
}

impl Damageable for UnitState {
    fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }
}

/// Player-controlled unit.
#[derive(Clone, Debug)]
pub(crate) struct PawnState {
    pub(crate) unit: UnitState,
    pub(crate) selected: bool,
    pub(crate) move_order: Option<WorldPoint>,
}

impl PawnState {
    pub(crate) fn new(position: WorldPoint) -> Self {
        Self {
            unit: UnitState::new(UnitKind::Pawn, position),
            selected: false,
            move_order: None,
        }
    }

    pub(crate) fn snapshot(&self, id: PawnId) -> PawnSnapshot {
        PawnSnapshot {
            id,
            position: self.unit.position,
            health: self.unit.health,
            animation: self.unit.animation,
            facing: self.unit.facing,
            selected: self.selected,
            move_order: self.move_order,
            attack_counter: self.unit.attack_counter,
            death: self.unit.death,
        }
    }
}

pub(crate) fn goblin_snapshot(id: GoblinId, goblin: &UnitState) -> GoblinSnapshot {
    GoblinSnapshot {
        id,
        position: goblin.position,
        health: goblin.health,
        animation: goblin.animation,
        facing: goblin.facing,
        attack_counter: goblin.attack_counter,
        death: goblin.death,
    }
}

/// Building under construction, completed, or awaiting removal.
#[derive(Clone, Debug)]
pub(crate) struct BuildingState {
    pub(crate) kind: BuildingKind,
    pub(crate) position: WorldPoint,
    pub(crate) health: Health,
    pub(crate) state: ConstructionState,
    pub(crate) attempt_pending: bool,
    pub(crate) depleted_at: Option<Duration>,
}

impl BuildingState {
    pub(crate) fn new(kind: BuildingKind, position: WorldPoint) -> Self {
        Self {
            kind,
            position,
            health: Health::full(),
            state: ConstructionState::UnderConstruction,
            attempt_pending: false,
            depleted_at: None,
        }
    }

    /// Obstacle registered for the building in its current state.
    pub(crate) fn boundary(&self) -> Option<WorldRect> {
        match self.state {
            ConstructionState::UnderConstruction => {
                Some(self.kind.construction_boundary(self.position))
            }
            ConstructionState::Complete => Some(self.kind.completed_boundary(self.position)),
            ConstructionState::Destroyed => None,
        }
    }

    pub(crate) fn danger_zone(&self) -> WorldRect {
        self.kind.danger_zone(self.position)
    }

    pub(crate) fn snapshot(&self, id: BuildingId) -> BuildingSnapshot {
        BuildingSnapshot {
            id,
            kind: self.kind,
            position: self.position,
            health: self.health,
            state: self.state,
            boundary: self.boundary(),
            depleted_at: self.depleted_at,
        }
    }
}

impl Damageable for BuildingState {
    fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }
}
