#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Outpost adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use outpost_core::{
    AnimationState, BuildingKind, BuildingSnapshot, BuildingView, CameraPan, ConstructionState,
    Facing, GoblinSnapshot, GoblinView, PawnSnapshot, PawnView, PlayerInput, UnitKind, WorldPoint,
    WorldRect, MAX_HEALTH,
};
use std::time::Duration;

/// Screen pixels the camera travels per frame while a pan key is held.
pub const CAMERA_SPEED: f32 = 3.0;

/// Smallest horizontal camera offset, reached when panning right.
pub const CAMERA_MIN_X: f32 = -4_080.0;
/// Largest horizontal camera offset, reached when panning left.
pub const CAMERA_MAX_X: f32 = 1_324.0;
/// Smallest vertical camera offset, reached when panning down.
pub const CAMERA_MIN_Y: f32 = -1_312.0;
/// Largest vertical camera offset, reached when panning up.
pub const CAMERA_MAX_Y: f32 = 1_392.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with a different alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        let lift = |channel: f32| channel + (1.0 - channel) * amount;

        Self {
            red: lift(self.red),
            green: lift(self.green),
            blue: lift(self.blue),
            alpha: self.alpha,
        }
    }
}

/// Translation between world coordinates and screen pixels.
///
/// Panning shifts every world-space element at once. The offset is clamped so
/// the map never scrolls out of view.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Camera {
    offset: Vec2,
}

impl Camera {
    /// Creates a camera with the provided screen offset, clamped to the map bounds.
    #[must_use]
    pub fn new(offset: Vec2) -> Self {
        Self {
            offset: clamp_offset(offset),
        }
    }

    /// Current screen offset applied to world coordinates.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Moves the camera by one frame in the held directions.
    pub fn pan(&mut self, pan: CameraPan) {
        let mut delta = Vec2::ZERO;
        if pan.up {
            delta.y += CAMERA_SPEED;
        }
        if pan.down {
            delta.y -= CAMERA_SPEED;
        }
        if pan.left {
            delta.x += CAMERA_SPEED;
        }
        if pan.right {
            delta.x -= CAMERA_SPEED;
        }
        self.offset = clamp_offset(self.offset + delta);
    }

    /// Screen position of a world point.
    #[must_use]
    pub fn world_to_screen(&self, point: WorldPoint) -> Vec2 {
        Vec2::new(point.x(), point.y()) + self.offset
    }

    /// World position under a screen pixel.
    #[must_use]
    pub fn screen_to_world(&self, screen: Vec2) -> WorldPoint {
        let world = screen - self.offset;
        WorldPoint::new(world.x, world.y)
    }

    /// Screen rectangle covering a world rectangle.
    #[must_use]
    pub fn rect_to_screen(&self, rect: &WorldRect) -> (Vec2, Vec2) {
        (
            self.world_to_screen(rect.origin()),
            Vec2::new(rect.width(), rect.height()),
        )
    }
}

fn clamp_offset(offset: Vec2) -> Vec2 {
    Vec2::new(
        offset.x.clamp(CAMERA_MIN_X, CAMERA_MAX_X),
        offset.y.clamp(CAMERA_MIN_Y, CAMERA_MAX_Y),
    )
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Camera directions held on this frame.
    pub camera: CameraPan,
    /// Screen-space corners of a selection drag released on this frame.
    pub selection: Option<(Vec2, Vec2)>,
    /// Screen-space corners of the selection drag still in progress.
    pub dragging: Option<(Vec2, Vec2)>,
    /// Screen position of a move order issued on this frame.
    pub move_order: Option<Vec2>,
    /// Whether the adapter detected a debug overlay toggle on this frame.
    pub toggle_debug: bool,
}

impl FrameInput {
    /// Converts screen-space input into world-space player intent using `camera`.
    #[must_use]
    pub fn to_player_input(&self, camera: &Camera) -> PlayerInput {
        PlayerInput {
            selection: self.selection.map(|(start, end)| {
                WorldRect::from_corners(camera.screen_to_world(start), camera.screen_to_world(end))
            }),
            move_order: self.move_order.map(|screen| camera.screen_to_world(screen)),
            camera: self.camera,
        }
    }
}

/// Unit drawn in the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitPresentation {
    /// Kind of the unit.
    pub kind: UnitKind,
    /// Top-left sprite anchor in world coordinates.
    pub position: WorldPoint,
    /// Horizontal orientation.
    pub facing: Facing,
    /// Animation currently displayed.
    pub animation: AnimationState,
    /// Remaining health as a fraction of the maximum.
    pub health: f32,
    /// Whether the player selected the unit.
    pub selected: bool,
    /// Death animation frame, present once the unit died.
    pub death_frame: Option<u32>,
}

impl UnitPresentation {
    /// Describes a pawn snapshot.
    #[must_use]
    pub fn from_pawn(pawn: &PawnSnapshot) -> Self {
        Self {
            kind: UnitKind::Pawn,
            position: pawn.position,
            facing: pawn.facing,
            animation: pawn.animation,
            health: health_fraction(pawn.health.get()),
            selected: pawn.selected,
            death_frame: pawn.death.map(|death| death.frame()),
        }
    }

    /// Describes a goblin snapshot.
    #[must_use]
    pub fn from_goblin(goblin: &GoblinSnapshot) -> Self {
        Self {
            kind: UnitKind::Goblin,
            position: goblin.position,
            facing: goblin.facing,
            animation: goblin.animation,
            health: health_fraction(goblin.health.get()),
            selected: false,
            death_frame: goblin.death.map(|death| death.frame()),
        }
    }
}

fn health_fraction(health: u32) -> f32 {
    health as f32 / MAX_HEALTH as f32
}

/// Building drawn in the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildingPresentation {
    /// Kind of the building.
    pub kind: BuildingKind,
    /// Construction lifecycle state.
    pub state: ConstructionState,
    /// Area the building occupies on screen, in world coordinates.
    pub footprint: WorldRect,
}

impl BuildingPresentation {
    /// Describes a building snapshot.
    #[must_use]
    pub fn from_snapshot(building: &BuildingSnapshot) -> Self {
        Self {
            kind: building.kind,
            state: building.state,
            footprint: building.danger_zone(),
        }
    }
}

/// Scene description combining the map, buildings, units and overlays.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Scene {
    /// Camera translating world coordinates to the screen.
    pub camera: Camera,
    /// Obstacles currently blocking movement.
    pub obstacles: Vec<WorldRect>,
    /// Walkable tiles, drawn only in debug mode.
    pub walkable: Vec<WorldRect>,
    /// Whether the obstacle and walkable overlays are drawn.
    pub show_debug: bool,
    /// Buildings still present in the world.
    pub buildings: Vec<BuildingPresentation>,
    /// Pawns then goblins, each in identifier order.
    pub units: Vec<UnitPresentation>,
    /// Screen-space corners of the selection drag in progress.
    pub selection_box: Option<(Vec2, Vec2)>,
    /// Destination of the most recent move order.
    pub move_marker: Option<WorldPoint>,
    /// Message shown across the screen, if any.
    pub banner: Option<String>,
}

impl Scene {
    /// Replaces the buildings and units with the latest world views.
    pub fn refresh(&mut self, pawns: &PawnView, goblins: &GoblinView, buildings: &BuildingView) {
        self.buildings.clear();
        self.buildings
            .extend(buildings.iter().map(BuildingPresentation::from_snapshot));

        self.units.clear();
        self.units.extend(pawns.iter().map(UnitPresentation::from_pawn));
        self.units
            .extend(goblins.iter().map(UnitPresentation::from_goblin));

        let ordered = pawns.iter().any(|pawn| pawn.move_order.is_some());
        if !ordered {
            self.move_marker = None;
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Outpost scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta,
    /// per-frame input captured by the adapter, and may mutate the scene before
    /// it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}
