#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Outpost simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshot views, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Outpost.";

/// Upper bound of every health pool.
pub const MAX_HEALTH: u32 = 100;

/// Centre-to-target distance under which a unit counts as arrived.
pub const ARRIVAL_DISTANCE: f32 = 5.0;

/// Centre-to-centre distance under which a pawn attacks a noticed goblin.
pub const PAWN_ATTACK_RANGE: f32 = 150.0;

/// Distance to the standoff point under which a goblin attacks its pawn.
pub const GOBLIN_ATTACK_DISTANCE: f32 = 50.0;

/// Number of accumulated strikes between two damage applications.
pub const STRIKE_INTERVAL: u32 = 100;

/// Lower bound of the randomised delay before the first construction attempt.
pub const CONSTRUCTION_DELAY_MIN: Duration = Duration::from_millis(5_000);

/// Upper bound (inclusive) of the randomised delay before the first construction attempt.
pub const CONSTRUCTION_DELAY_MAX: Duration = Duration::from_millis(15_000);

/// Delay between two construction attempts while the danger zone is occupied.
pub const CONSTRUCTION_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Time a completed building must spend at zero health before it is destroyed.
pub const DEMOLITION_DELAY: Duration = Duration::from_secs(1);

/// Grace period between destruction and removal of a building.
pub const BUILDING_REMOVAL_DELAY: Duration = Duration::from_secs(2);

/// Grace period between death and removal of a goblin.
pub const GOBLIN_REMOVAL_DELAY: Duration = Duration::from_secs(5);

/// Number of frames composing the death animation.
pub const DEATH_ANIMATION_FRAMES: u32 = 14;

/// Ticks spent on each frame of the death animation.
pub const DEATH_ANIMATION_TICKS_PER_FRAME: u32 = 10;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Spawns a player-controlled pawn with its sprite anchored at `position`.
    SpawnPawn {
        /// Top-left sprite anchor in world coordinates.
        position: WorldPoint,
    },
    /// Spawns an autonomous goblin with its sprite anchored at `position`.
    SpawnGoblin {
        /// Top-left sprite anchor in world coordinates.
        position: WorldPoint,
    },
    /// Places a building that immediately starts its construction.
    PlaceBuilding {
        /// Kind of building to construct.
        kind: BuildingKind,
        /// Top-left sprite anchor in world coordinates.
        position: WorldPoint,
    },
    /// Replaces the pawn selection with every living pawn touching `area`.
    SelectPawns {
        /// Selection rectangle in world coordinates.
        area: WorldRect,
    },
    /// Orders the listed pawns to walk toward `target`.
    OrderMove {
        /// Pawns receiving the order. Unselected or dead pawns ignore it.
        pawns: Vec<PawnId>,
        /// Destination in world coordinates.
        target: WorldPoint,
    },
    /// Updates the animation state and optionally the facing of a unit.
    SetActivity {
        /// Unit whose activity changes.
        unit: UnitId,
        /// Animation the unit should display.
        animation: AnimationState,
        /// New facing, or `None` to keep the current one.
        facing: Option<Facing>,
    },
    /// Moves a unit to the provided position unless the move is vetoed.
    StepUnit {
        /// Unit attempting to move.
        unit: UnitId,
        /// Sprite anchor the unit wants to occupy.
        to: WorldPoint,
    },
    /// Marks the pawn's move order as reached.
    CompleteMoveOrder {
        /// Pawn that arrived.
        pawn: PawnId,
    },
    /// Accumulates one attack tick from `attacker` against `target`.
    Strike {
        /// Unit performing the attack.
        attacker: UnitId,
        /// Unit receiving the attack.
        target: UnitId,
    },
    /// Finishes construction of a building whose danger zone is clear.
    CompleteConstruction {
        /// Building that completes.
        building: BuildingId,
    },
    /// Schedules another construction attempt after the retry interval.
    RetryConstruction {
        /// Building whose construction was delayed.
        building: BuildingId,
    },
    /// Damages a building.
    DamageBuilding {
        /// Building receiving damage.
        building: BuildingId,
        /// Amount of health to subtract.
        amount: u32,
    },
    /// Destroys a completed building whose health has been depleted.
    DestroyBuilding {
        /// Building to destroy.
        building: BuildingId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Index of the tick that just started, counting from one.
        tick: u64,
    },
    /// Confirms that a pawn joined the world.
    PawnSpawned {
        /// Identifier allocated to the pawn.
        pawn: PawnId,
        /// Sprite anchor of the new pawn.
        position: WorldPoint,
    },
    /// Confirms that a goblin joined the world.
    GoblinSpawned {
        /// Identifier allocated to the goblin.
        goblin: GoblinId,
        /// Sprite anchor of the new goblin.
        position: WorldPoint,
    },
    /// Confirms that a building was placed and started construction.
    BuildingPlaced {
        /// Identifier allocated to the building.
        building: BuildingId,
        /// Kind of the building.
        kind: BuildingKind,
        /// Construction footprint registered as an obstacle.
        boundary: WorldRect,
    },
    /// Reports the pawns selected after a selection command.
    PawnsSelected {
        /// Pawns now selected, in ascending identifier order. May be empty.
        pawns: Vec<PawnId>,
    },
    /// Confirms that a pawn accepted a move order.
    MoveOrderIssued {
        /// Pawn that accepted the order.
        pawn: PawnId,
        /// Destination of the order.
        target: WorldPoint,
    },
    /// Reports that a pawn reached its move order.
    MoveOrderCompleted {
        /// Pawn that arrived.
        pawn: PawnId,
    },
    /// Reports that a pawn dropped its move order because it was deselected.
    MoveOrderCancelled {
        /// Pawn whose order was dropped.
        pawn: PawnId,
    },
    /// Confirms that a unit moved.
    UnitMoved {
        /// Unit that moved.
        unit: UnitId,
        /// Sprite anchor before the move.
        from: WorldPoint,
        /// Sprite anchor after the move.
        to: WorldPoint,
    },
    /// Reports that a requested step touched an obstacle and was vetoed.
    UnitMoveBlocked {
        /// Unit whose step was vetoed.
        unit: UnitId,
    },
    /// Reports a change of the displayed animation.
    AnimationChanged {
        /// Unit whose animation changed.
        unit: UnitId,
        /// Previous animation.
        from: AnimationState,
        /// Current animation.
        to: AnimationState,
    },
    /// Reports that a unit lost health.
    UnitDamaged {
        /// Unit that was hit.
        unit: UnitId,
        /// Damage requested by the attacker.
        amount: u32,
        /// Health left after the hit.
        remaining: u32,
    },
    /// Reports that a unit's health reached zero.
    UnitDied {
        /// Unit that died.
        unit: UnitId,
    },
    /// Reports that a dead unit left the registry.
    UnitRemoved {
        /// Unit that was removed.
        unit: UnitId,
    },
    /// Indicates that a scheduled construction attempt is due.
    ConstructionAttemptDue {
        /// Building awaiting a completion decision.
        building: BuildingId,
    },
    /// Reports that a construction attempt was postponed.
    ConstructionDelayed {
        /// Building whose construction was delayed.
        building: BuildingId,
        /// Delay before the next attempt.
        retry_in: Duration,
    },
    /// Reports that a building finished construction.
    ConstructionCompleted {
        /// Building that completed.
        building: BuildingId,
        /// Full boundary now registered as an obstacle.
        boundary: WorldRect,
    },
    /// Reports that a building lost health.
    BuildingDamaged {
        /// Building that was hit.
        building: BuildingId,
        /// Health left after the hit.
        remaining: u32,
    },
    /// Reports that a building was destroyed and stopped blocking movement.
    BuildingDestroyed {
        /// Building that was destroyed.
        building: BuildingId,
    },
    /// Reports that a destroyed building left the registry.
    BuildingRemoved {
        /// Building that was removed.
        building: BuildingId,
    },
    /// Terminal event emitted once the last living pawn died.
    GameOver,
}

/// Unique identifier assigned to a pawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PawnId(u32);

impl PawnId {
    /// Creates a new pawn identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a goblin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GoblinId(u32);

impl GoblinId {
    /// Creates a new goblin identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a building.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(u32);

impl BuildingId {
    /// Creates a new building identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of any unit taking part in combat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnitId {
    /// A player-controlled pawn.
    Pawn(PawnId),
    /// An autonomous goblin.
    Goblin(GoblinId),
}

impl UnitId {
    /// Kind of the identified unit.
    #[must_use]
    pub const fn kind(&self) -> UnitKind {
        match self {
            Self::Pawn(_) => UnitKind::Pawn,
            Self::Goblin(_) => UnitKind::Goblin,
        }
    }
}

/// Kinds of units populating the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Player-controlled warrior.
    Pawn,
    /// Torch-wielding enemy.
    Goblin,
}

impl UnitKind {
    /// Distance covered per tick while walking.
    #[must_use]
    pub const fn speed(self) -> f32 {
        match self {
            Self::Pawn => 2.0,
            Self::Goblin => 1.5,
        }
    }

    /// Damage applied every [`STRIKE_INTERVAL`] accumulated strikes.
    #[must_use]
    pub const fn strike_damage(self) -> u32 {
        match self {
            Self::Pawn => 10,
            Self::Goblin => 5,
        }
    }

    /// Size of one sprite frame, used for centres and trigger boxes.
    #[must_use]
    pub const fn sprite_extent(self) -> Extent {
        match self {
            Self::Pawn | Self::Goblin => Extent::new(192.0, 192.0),
        }
    }

    /// Collision box relative to the sprite anchor.
    ///
    /// The offset mirrors the transparent padding around the figure drawn
    /// inside each sprite frame.
    #[must_use]
    pub const fn hitbox(self) -> Hitbox {
        match self {
            Self::Pawn | Self::Goblin => Hitbox::new(72.0, 72.0, 32.0, 32.0),
        }
    }
}

/// Point expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new world point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate, growing downward.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Returns the point shifted by the provided deltas.
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance_to(self, other: WorldPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Width and height of an axis-aligned area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    width: f32,
    height: f32,
}

impl Extent {
    /// Creates a new extent.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Horizontal size.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical size.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }
}

/// Axis-aligned rectangle expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldRect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl WorldRect {
    /// Constructs a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Constructs the rectangle spanned by two opposite corners in any order.
    #[must_use]
    pub fn from_corners(a: WorldPoint, b: WorldPoint) -> Self {
        let x = a.x().min(b.x());
        let y = a.y().min(b.y());
        Self::new(x, y, (a.x() - b.x()).abs(), (a.y() - b.y()).abs())
    }

    /// Left edge.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Top edge.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Horizontal size.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical size.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Top-left corner.
    #[must_use]
    pub const fn origin(&self) -> WorldPoint {
        WorldPoint::new(self.x, self.y)
    }

    /// Centre of the rectangle.
    #[must_use]
    pub fn center(&self) -> WorldPoint {
        WorldPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive overlap test shared by every collision check.
    ///
    /// Rectangles whose edges merely touch are considered overlapping.
    #[must_use]
    pub fn touches(&self, other: &WorldRect) -> bool {
        self.right() >= other.x
            && self.x <= other.right()
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    /// Returns a copy moved by `dy` and grown by `dh` along the vertical axis.
    #[must_use]
    pub fn stretched_vertically(self, dy: f32, dh: f32) -> Self {
        Self::new(self.x, self.y + dy, self.width, self.height + dh)
    }
}

/// Collision box expressed relative to a sprite anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hitbox {
    offset_x: f32,
    offset_y: f32,
    width: f32,
    height: f32,
}

impl Hitbox {
    /// Creates a hitbox from its anchor offset and size.
    #[must_use]
    pub const fn new(offset_x: f32, offset_y: f32, width: f32, height: f32) -> Self {
        Self {
            offset_x,
            offset_y,
            width,
            height,
        }
    }

    /// World rectangle covered by the hitbox when the sprite sits at `anchor`.
    #[must_use]
    pub fn rect_at(&self, anchor: WorldPoint) -> WorldRect {
        WorldRect::new(
            anchor.x() + self.offset_x,
            anchor.y() + self.offset_y,
            self.width,
            self.height,
        )
    }
}

/// Capability shared by every positioned unit.
pub trait Body {
    /// Top-left sprite anchor.
    fn position(&self) -> WorldPoint;

    /// Kind of the unit, which fixes its extent and hitbox.
    fn unit_kind(&self) -> UnitKind;

    /// Centre of the sprite frame.
    fn center(&self) -> WorldPoint {
        let extent = self.unit_kind().sprite_extent();
        self.position()
            .offset(extent.width() / 2.0, extent.height() / 2.0)
    }

    /// Collision rectangle at the current position.
    fn hitbox_rect(&self) -> WorldRect {
        self.unit_kind().hitbox().rect_at(self.position())
    }

    /// Area, double the sprite extent and centred on it, used to notice opponents.
    fn trigger_box(&self) -> WorldRect {
        let extent = self.unit_kind().sprite_extent();
        let position = self.position();
        WorldRect::new(
            position.x() - extent.width() / 2.0,
            position.y() - extent.height() / 2.0,
            extent.width() * 2.0,
            extent.height() * 2.0,
        )
    }
}

/// Animation displayed by a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum AnimationState {
    /// Standing still.
    #[default]
    Idle,
    /// Walking toward a destination.
    Walking,
    /// Swinging at an opponent.
    Attacking,
}

/// Horizontal orientation of a sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Facing {
    /// Sprite mirrored to look left.
    Left,
    /// Sprite drawn as authored, looking right.
    #[default]
    Right,
}

impl Facing {
    /// Facing toward a horizontal delta. Zero keeps facing right.
    #[must_use]
    pub fn toward(dx: f32) -> Self {
        if dx < 0.0 {
            Self::Left
        } else {
            Self::Right
        }
    }
}

/// Health pool clamped to `0..=MAX_HEALTH`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Health(u32);

impl Health {
    /// Creates a health pool, clamping the value to [`MAX_HEALTH`].
    #[must_use]
    pub const fn new(value: u32) -> Self {
        if value > MAX_HEALTH {
            Self(MAX_HEALTH)
        } else {
            Self(value)
        }
    }

    /// Creates a full health pool.
    #[must_use]
    pub const fn full() -> Self {
        Self(MAX_HEALTH)
    }

    /// Remaining health points.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the pool is empty.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 == 0
    }

    /// Subtracts `amount`, saturating at zero.
    pub fn apply_damage(&mut self, amount: u32) -> DamageOutcome {
        if self.is_depleted() {
            return DamageOutcome::AlreadyDepleted;
        }

        self.0 = self.0.saturating_sub(amount);
        if self.is_depleted() {
            DamageOutcome::Depleted
        } else {
            DamageOutcome::Wounded
        }
    }
}

/// Result of subtracting health from a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Health decreased (or stayed, for zero damage) and remains positive.
    Wounded,
    /// Health crossed to zero with this hit.
    Depleted,
    /// Health was already zero; nothing changed.
    AlreadyDepleted,
}

/// Progress of the one-shot death animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DeathAnimation {
    elapsed_ticks: u32,
}

impl DeathAnimation {
    /// Advances the animation by one tick, freezing on the final frame.
    pub fn advance(&mut self) {
        if !self.is_finished() {
            self.elapsed_ticks = self.elapsed_ticks.saturating_add(1);
        }
    }

    /// Index of the frame currently displayed.
    #[must_use]
    pub fn frame(&self) -> u32 {
        (self.elapsed_ticks / DEATH_ANIMATION_TICKS_PER_FRAME).min(DEATH_ANIMATION_FRAMES - 1)
    }

    /// Reports whether the final frame has been reached.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed_ticks >= (DEATH_ANIMATION_FRAMES - 1) * DEATH_ANIMATION_TICKS_PER_FRAME
    }
}

/// Kinds of buildings placed around the outpost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    /// Small dwelling.
    House,
    /// Large keep.
    Castle,
}

impl BuildingKind {
    /// Size of the collision footprint before construction adjustments.
    #[must_use]
    pub const fn hitbox(self) -> Extent {
        match self {
            Self::House => Extent::new(86.0, 64.0),
            Self::Castle => Extent::new(270.0, 70.0),
        }
    }

    /// Offset from the sprite anchor to the construction footprint.
    #[must_use]
    pub const fn construction_offset(self) -> (f32, f32) {
        match self {
            Self::House => (20.0, 86.0),
            Self::Castle => (25.0, 148.0),
        }
    }

    /// Vertical shift and growth turning the construction footprint into the
    /// completed boundary, which doubles as the danger zone.
    #[must_use]
    pub const fn completion_stretch(self) -> (f32, f32) {
        match self {
            Self::House => (-55.0, 32.0),
            Self::Castle => (-100.0, 86.0),
        }
    }

    /// Obstacle registered while the building is under construction.
    #[must_use]
    pub fn construction_boundary(self, anchor: WorldPoint) -> WorldRect {
        let (dx, dy) = self.construction_offset();
        let extent = self.hitbox();
        WorldRect::new(
            anchor.x() + dx,
            anchor.y() + dy,
            extent.width(),
            extent.height(),
        )
    }

    /// Area that must be free of pawns for construction to complete.
    #[must_use]
    pub fn danger_zone(self, anchor: WorldPoint) -> WorldRect {
        let (dy, dh) = self.completion_stretch();
        self.construction_boundary(anchor)
            .stretched_vertically(dy, dh)
    }

    /// Obstacle registered once construction completed.
    #[must_use]
    pub fn completed_boundary(self, anchor: WorldPoint) -> WorldRect {
        self.danger_zone(anchor)
    }
}

/// Construction lifecycle of a building.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstructionState {
    /// Scaffolding with a reduced footprint.
    UnderConstruction,
    /// Finished building with its full footprint.
    Complete,
    /// Ruin that no longer blocks movement.
    Destroyed,
}

/// Immutable representation of a single pawn used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct PawnSnapshot {
    /// Unique identifier assigned to the pawn.
    pub id: PawnId,
    /// Top-left sprite anchor.
    pub position: WorldPoint,
    /// Remaining health.
    pub health: Health,
    /// Animation currently displayed.
    pub animation: AnimationState,
    /// Horizontal orientation.
    pub facing: Facing,
    /// Whether the player selected the pawn.
    pub selected: bool,
    /// Destination of the active move order, if any.
    pub move_order: Option<WorldPoint>,
    /// Strikes accumulated since the last damage application.
    pub attack_counter: u32,
    /// Death animation progress, present once the pawn died.
    pub death: Option<DeathAnimation>,
}

impl PawnSnapshot {
    /// Reports whether the pawn is alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }
}

impl Body for PawnSnapshot {
    fn position(&self) -> WorldPoint {
        self.position
    }

    fn unit_kind(&self) -> UnitKind {
        UnitKind::Pawn
    }
}

/// Immutable representation of a single goblin used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct GoblinSnapshot {
    /// Unique identifier assigned to the goblin.
    pub id: GoblinId,
    /// Top-left sprite anchor.
    pub position: WorldPoint,
    /// Remaining health.
    pub health: Health,
    /// Animation currently displayed.
    pub animation: AnimationState,
    /// Horizontal orientation.
    pub facing: Facing,
    /// Strikes accumulated since the last damage application.
    pub attack_counter: u32,
    /// Death animation progress, present once the goblin died.
    pub death: Option<DeathAnimation>,
}

impl GoblinSnapshot {
    /// Reports whether the goblin is alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }
}

impl Body for GoblinSnapshot {
    fn position(&self) -> WorldPoint {
        self.position
    }

    fn unit_kind(&self) -> UnitKind {
        UnitKind::Goblin
    }
}

/// Immutable representation of a single building used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildingSnapshot {
    /// Identifier allocated to the building by the world.
    pub id: BuildingId,
    /// Kind of the building.
    pub kind: BuildingKind,
    /// Top-left sprite anchor.
    pub position: WorldPoint,
    /// Remaining health.
    pub health: Health,
    /// Construction lifecycle state.
    pub state: ConstructionState,
    /// Obstacle currently registered for the building.
    pub boundary: Option<WorldRect>,
    /// Simulated time at which health reached zero, if it did.
    pub depleted_at: Option<Duration>,
}

impl BuildingSnapshot {
    /// Area that must be free of pawns for construction to complete.
    #[must_use]
    pub fn danger_zone(&self) -> WorldRect {
        self.kind.danger_zone(self.position)
    }
}

macro_rules! snapshot_view {
    ($(#[$meta:meta])* $view:ident, $snapshot:ty, $id:ty) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default)]
        pub struct $view {
            snapshots: Vec<$snapshot>,
        }

        impl $view {
            /// Creates a new view from the provided snapshots.
            #[must_use]
            pub fn from_snapshots(mut snapshots: Vec<$snapshot>) -> Self {
                snapshots.sort_by_key(|snapshot| snapshot.id);
                Self { snapshots }
            }

            /// Iterator over the captured snapshots in ascending identifier order.
            pub fn iter(&self) -> impl Iterator<Item = &$snapshot> {
                self.snapshots.iter()
            }

            /// Looks up the snapshot captured for `id`.
            #[must_use]
            pub fn get(&self, id: $id) -> Option<&$snapshot> {
                self.snapshots
                    .binary_search_by_key(&id, |snapshot| snapshot.id)
                    .ok()
                    .map(|index| &self.snapshots[index])
            }

            /// Number of captured snapshots.
            #[must_use]
            pub fn len(&self) -> usize {
                self.snapshots.len()
            }

            /// Reports whether the view holds no snapshot.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.snapshots.is_empty()
            }

            /// Consumes the view, yielding the underlying snapshots.
            #[must_use]
            pub fn into_vec(self) -> Vec<$snapshot> {
                self.snapshots
            }
        }
    };
}

snapshot_view!(
    /// Read-only snapshot describing all pawns.
    PawnView,
    PawnSnapshot,
    PawnId
);
snapshot_view!(
    /// Read-only snapshot describing all goblins, dead ones included.
    GoblinView,
    GoblinSnapshot,
    GoblinId
);
snapshot_view!(
    /// Read-only snapshot describing all buildings still in the registry.
    BuildingView,
    BuildingSnapshot,
    BuildingId
);

/// Target acquired by a pawn's trigger-box scan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PawnEngagement {
    /// A goblin is within attack range and receives strikes.
    Attacking {
        /// Pawn performing the scan.
        pawn: PawnId,
        /// Goblin under attack.
        goblin: GoblinId,
        /// Orientation looking at the goblin.
        facing: Facing,
    },
    /// A goblin entered the trigger box but stays beyond attack range.
    Noticed {
        /// Pawn performing the scan.
        pawn: PawnId,
        /// Goblin that was noticed.
        goblin: GoblinId,
    },
}

impl PawnEngagement {
    /// Pawn that performed the scan.
    #[must_use]
    pub const fn pawn(&self) -> PawnId {
        match self {
            Self::Attacking { pawn, .. } | Self::Noticed { pawn, .. } => *pawn,
        }
    }
}

/// Chase target computed for a goblin that noticed a pawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GoblinPursuit {
    /// Goblin performing the chase.
    pub goblin: GoblinId,
    /// Pawn being chased.
    pub pawn: PawnId,
    /// Point beside the pawn the goblin walks toward.
    pub standoff: WorldPoint,
    /// Distance between the goblin anchor and the standoff point.
    pub distance: f32,
    /// Orientation the goblin adopts while chasing.
    pub facing: Facing,
}

impl GoblinPursuit {
    /// Reports whether the goblin is close enough to strike.
    #[must_use]
    pub fn within_striking_distance(&self) -> bool {
        self.distance < GOBLIN_ATTACK_DISTANCE
    }

    /// Reports whether the goblin reached its standoff point.
    #[must_use]
    pub fn arrived(&self) -> bool {
        self.distance < ARRIVAL_DISTANCE
    }
}

/// Camera panning directions held by the player on this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct CameraPan {
    /// Pan toward negative y.
    pub up: bool,
    /// Pan toward positive y.
    pub down: bool,
    /// Pan toward negative x.
    pub left: bool,
    /// Pan toward positive x.
    pub right: bool,
}

impl CameraPan {
    /// Reports whether any direction is held.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

/// Player intent gathered by the input collaborator for one frame.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct PlayerInput {
    /// Selection rectangle completed on this frame, in world coordinates.
    pub selection: Option<WorldRect>,
    /// Move order issued on this frame, in world coordinates.
    pub move_order: Option<WorldPoint>,
    /// Camera directions held on this frame.
    pub camera: CameraPan,
}

/// Sounds the audio collaborator knows how to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sound {
    /// Fanfare played when a building completes.
    BuildingCompleted,
    /// Click played when pawns get selected.
    Selection,
    /// Loop played while the camera pans.
    CameraMovement,
    /// Loop played while a pawn walks.
    PawnWalking,
    /// Loop played while a pawn attacks.
    SwordSwing,
    /// One-shot played when a pawn is hit.
    PawnHit,
    /// One-shot played when a pawn dies.
    PawnDeath,
    /// Loop played while a goblin walks.
    GoblinWalking,
    /// Loop played while a goblin attacks.
    TorchSlash,
    /// One-shot played when a goblin is hit.
    GoblinHit,
    /// One-shot played when a goblin dies.
    GoblinDeath,
    /// Ambient loop of waves breaking on the shore.
    SeaWaves,
    /// Ambient loop of birds and wind.
    NatureAmbience,
    /// Background music loop.
    Music,
}

impl Sound {
    /// Default playback volume in the range 0.0..=1.0.
    #[must_use]
    pub const fn volume(self) -> f32 {
        match self {
            Self::BuildingCompleted | Self::CameraMovement | Self::SwordSwing => 0.1,
            Self::Selection => 0.5,
            Self::PawnWalking => 0.05,
            Self::PawnHit | Self::TorchSlash | Self::GoblinDeath => 0.07,
            Self::PawnDeath => 0.2,
            Self::GoblinWalking => 0.04,
            Self::GoblinHit | Self::NatureAmbience => 0.02,
            Self::SeaWaves => 0.05,
            Self::Music => 0.005,
        }
    }
}

/// Instruction forwarded to the audio collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Play the sound once.
    Play(Sound),
    /// Start looping the sound until stopped.
    StartLoop(Sound),
    /// Stop a looping sound.
    StopLoop(Sound),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_count_as_overlap() {
        let left = WorldRect::new(0.0, 0.0, 10.0, 10.0);
        let adjacent = WorldRect::new(10.0, 0.0, 10.0, 10.0);
        let apart = WorldRect::new(10.5, 0.0, 10.0, 10.0);

        assert!(left.touches(&adjacent));
        assert!(adjacent.touches(&left));
        assert!(!left.touches(&apart));
    }

    #[test]
    fn hitbox_applies_sprite_padding() {
        let rect = UnitKind::Pawn.hitbox().rect_at(WorldPoint::new(10.0, 20.0));
        assert_eq!(rect, WorldRect::new(82.0, 92.0, 32.0, 32.0));
    }

    #[test]
    fn corners_in_any_order_build_the_same_rect() {
        let a = WorldPoint::new(50.0, 10.0);
        let b = WorldPoint::new(20.0, 70.0);
        assert_eq!(WorldRect::from_corners(a, b), WorldRect::new(20.0, 10.0, 30.0, 60.0));
        assert_eq!(WorldRect::from_corners(b, a), WorldRect::from_corners(a, b));
    }

    #[test]
    fn health_clamps_and_reports_depletion_once() {
        let mut health = Health::new(250);
        assert_eq!(health.get(), MAX_HEALTH);

        assert_eq!(health.apply_damage(95), DamageOutcome::Wounded);
        assert_eq!(health.get(), 5);
        assert_eq!(health.apply_damage(10), DamageOutcome::Depleted);
        assert_eq!(health.get(), 0);
        assert_eq!(health.apply_damage(10), DamageOutcome::AlreadyDepleted);
        assert_eq!(health.get(), 0);
    }

    #[test]
    fn death_animation_freezes_on_last_frame() {
        let mut animation = DeathAnimation::default();
        assert_eq!(animation.frame(), 0);

        for _ in 0..DEATH_ANIMATION_TICKS_PER_FRAME {
            animation.advance();
        }
        assert_eq!(animation.frame(), 1);

        for _ in 0..1_000 {
            animation.advance();
        }
        assert!(animation.is_finished());
        assert_eq!(animation.frame(), DEATH_ANIMATION_FRAMES - 1);
    }

    #[test]
    fn house_danger_zone_extends_above_construction_footprint() {
        let anchor = WorldPoint::new(100.0, 200.0);
        let footprint = BuildingKind::House.construction_boundary(anchor);
        let zone = BuildingKind::House.danger_zone(anchor);

        assert_eq!(footprint, WorldRect::new(120.0, 286.0, 86.0, 64.0));
        assert_eq!(zone, WorldRect::new(120.0, 231.0, 86.0, 96.0));
        assert_eq!(BuildingKind::House.completed_boundary(anchor), zone);
    }

    #[test]
    fn castle_footprint_matches_kind_offsets() {
        let anchor = WorldPoint::new(0.0, 0.0);
        assert_eq!(
            BuildingKind::Castle.construction_boundary(anchor),
            WorldRect::new(25.0, 148.0, 270.0, 70.0)
        );
        assert_eq!(
            BuildingKind::Castle.danger_zone(anchor),
            WorldRect::new(25.0, 48.0, 270.0, 156.0)
        );
    }

    #[test]
    fn trigger_box_doubles_sprite_extent() {
        let snapshot = GoblinSnapshot {
            id: GoblinId::new(0),
            position: WorldPoint::new(100.0, 100.0),
            health: Health::full(),
            animation: AnimationState::Idle,
            facing: Facing::Right,
            attack_counter: 0,
            death: None,
        };

        assert_eq!(snapshot.trigger_box(), WorldRect::new(4.0, 4.0, 384.0, 384.0));
        assert_eq!(snapshot.center(), WorldPoint::new(196.0, 196.0));
    }

    #[test]
    fn view_lookup_uses_identifier_order() {
        let pawn = |id: u32| PawnSnapshot {
            id: PawnId::new(id),
            position: WorldPoint::default(),
            health: Health::full(),
            animation: AnimationState::Idle,
            facing: Facing::Right,
            selected: false,
            move_order: None,
            attack_counter: 0,
            death: None,
        };
        let view = PawnView::from_snapshots(vec![pawn(4), pawn(1), pawn(2)]);

        let order: Vec<u32> = view.iter().map(|snapshot| snapshot.id.get()).collect();
        assert_eq!(order, vec![1, 2, 4]);
        assert!(view.get(PawnId::new(2)).is_some());
        assert!(view.get(PawnId::new(3)).is_none());
    }

    #[test]
    fn scenario_primitives_survive_binary_encoding() {
        let encoded = bincode::serialize(&BuildingKind::Castle).expect("serialize");
        let decoded: BuildingKind = bincode::deserialize(&encoded).expect("deserialize");
        assert_eq!(decoded, BuildingKind::Castle);

        let point = WorldPoint::new(-300.0, 1200.5);
        let encoded = bincode::serialize(&point).expect("serialize");
        let decoded: WorldPoint = bincode::deserialize(&encoded).expect("deserialize");
        assert_eq!(decoded, point);
    }
}
