#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Outpost.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! The adapter therefore depends on macroquad without its default `audio`
//! feature and leaves sound cues to the host.
//!
//! Everything is drawn with coloured shapes; no textures are loaded.

use anyhow::Result;
use glam::Vec2;
use macroquad::math::Vec2 as MacroquadVec2;
use macroquad::input::{
    is_key_down, is_key_pressed, is_mouse_button_down, is_mouse_button_pressed,
    is_mouse_button_released, mouse_position, KeyCode, MouseButton,
};
use outpost_core::{
    BuildingKind, CameraPan, ConstructionState, Facing, UnitKind, WorldRect,
    DEATH_ANIMATION_FRAMES,
};
use outpost_rendering::{
    BuildingPresentation, Camera, Color, FrameInput, Presentation, RenderingBackend, Scene,
    UnitPresentation,
};
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};
use tracing::info;

const HEALTH_BAR_WIDTH: f32 = 60.0;
const HEALTH_BAR_HEIGHT: f32 = 10.0;
const HEALTH_BAR_DROP: f32 = 32.0;
const MOVE_MARKER_RADIUS: f32 = 12.0;
const BANNER_FONT_SIZE: f32 = 64.0;

const PAWN_COLOR: Color = Color::from_rgb_u8(52, 101, 164);
const GOBLIN_COLOR: Color = Color::from_rgb_u8(115, 155, 60);
const HOUSE_COLOR: Color = Color::from_rgb_u8(143, 89, 52);
const CASTLE_COLOR: Color = Color::from_rgb_u8(128, 128, 140);
const SELECTION_COLOR: Color = Color::from_rgb_u8(250, 220, 80);
const OBSTACLE_COLOR: Color = Color::new(0.8, 0.1, 0.1, 0.35);
const WALKABLE_COLOR: Color = Color::new(0.1, 0.8, 0.2, 0.2);
const HEALTH_BACKGROUND: Color = Color::from_rgb_u8(200, 30, 30);
const HEALTH_FILL: Color = Color::from_rgb_u8(40, 190, 60);

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Escape` quits the game loop.
    quit_requested: bool,
    /// `F3` toggles the obstacle and walkable overlays.
    toggle_debug: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape),
            toggle_debug: is_key_pressed(KeyCode::F3),
        }
    }
}

fn poll_camera_pan() -> CameraPan {
    CameraPan {
        up: is_key_down(KeyCode::W),
        down: is_key_down(KeyCode::S),
        left: is_key_down(KeyCode::A),
        right: is_key_down(KeyCode::D),
    }
}

/// Mouse button state sampled once per frame.
#[derive(Clone, Copy, Debug, Default)]
struct ButtonObservation {
    pressed: bool,
    down: bool,
    released: bool,
}

impl ButtonObservation {
    fn poll(button: MouseButton) -> Self {
        Self {
            pressed: is_mouse_button_pressed(button),
            down: is_mouse_button_down(button),
            released: is_mouse_button_released(button),
        }
    }
}

/// Left-button drag that turns into a selection when released.
#[derive(Clone, Copy, Debug, Default)]
struct SelectionDrag {
    anchor: Option<Vec2>,
}

/// Outcome of one frame of drag tracking.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct DragUpdate {
    released: Option<(Vec2, Vec2)>,
    in_progress: Option<(Vec2, Vec2)>,
}

impl SelectionDrag {
    fn observe(&mut self, button: ButtonObservation, cursor: Vec2) -> DragUpdate {
        if button.pressed {
            self.anchor = Some(cursor);
        }

        let Some(anchor) = self.anchor else {
            return DragUpdate::default();
        };

        if button.released || !button.down {
            self.anchor = None;
            return DragUpdate {
                released: Some((anchor, cursor)),
                in_progress: None,
            };
        }

        DragUpdate {
            released: None,
            in_progress: Some((anchor, cursor)),
        }
    }
}

fn gather_frame_input(drag: &mut SelectionDrag, keyboard: KeyboardShortcuts) -> FrameInput {
    let (cursor_x, cursor_y) = mouse_position();
    let cursor = Vec2::new(cursor_x, cursor_y);
    let update = drag.observe(ButtonObservation::poll(MouseButton::Left), cursor);
    let move_order = is_mouse_button_pressed(MouseButton::Right).then_some(cursor);

    FrameInput {
        camera: poll_camera_pan(),
        selection: update.released,
        dragging: update.in_progress,
        move_order,
        toggle_debug: keyboard.toggle_debug,
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the averages once one second has elapsed.
    fn record_frame(&mut self, frame: Duration, render: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.render_accum += render;

        self.frame_times.push_back(frame);
        self.window_duration += frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            match self.frame_times.pop_front() {
                Some(removed) => {
                    self.window_duration = self.window_duration.saturating_sub(removed);
                }
                None => break,
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let per_second = self.frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let avg_render = self.render_accum / self.frames.max(1);

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.render_accum = Duration::ZERO;
        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_render,
        })
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 1280,
            window_height: 800,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut drag = SelectionDrag::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    info!("quit requested");
                    break;
                }

                macroquad::window::clear_background(background);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = gather_frame_input(&mut drag, keyboard);

                update_scene(frame_dt, frame_input, &mut scene);

                let render_start = Instant::now();
                draw_scene(&scene);
                let render_duration = render_start.elapsed();

                if let Some(metrics) = fps_counter.record_frame(frame_dt, render_duration) {
                    if show_fps {
                        info!(
                            fps = metrics.per_second,
                            trailing_fps = metrics.trailing_ten_seconds,
                            render_ms = metrics.avg_render.as_secs_f64() * 1_000.0,
                            "frame timing"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn draw_scene(scene: &Scene) {
    let camera = &scene.camera;

    if scene.show_debug {
        for cell in &scene.walkable {
            draw_rect_outline(camera, cell, 1.0, WALKABLE_COLOR);
        }
        for obstacle in &scene.obstacles {
            draw_rect_filled(camera, obstacle, OBSTACLE_COLOR);
        }
    }

    for building in &scene.buildings {
        draw_building(camera, building);
    }

    for unit in &scene.units {
        draw_unit(camera, unit);
    }

    if let Some(marker) = scene.move_marker {
        let center = camera.world_to_screen(marker);
        macroquad::shapes::draw_circle_lines(
            center.x,
            center.y,
            MOVE_MARKER_RADIUS,
            2.0,
            to_macroquad_color(SELECTION_COLOR),
        );
    }

    if let Some((start, end)) = scene.selection_box {
        let (origin, size) = normalised_screen_rect(start, end);
        macroquad::shapes::draw_rectangle(
            origin.x,
            origin.y,
            size.x,
            size.y,
            to_macroquad_color(SELECTION_COLOR.with_alpha(0.15)),
        );
        macroquad::shapes::draw_rectangle_lines(
            origin.x,
            origin.y,
            size.x,
            size.y,
            2.0,
            to_macroquad_color(SELECTION_COLOR),
        );
    }

    if let Some(banner) = &scene.banner {
        draw_banner(banner);
    }
}

fn building_color(building: &BuildingPresentation) -> Color {
    let base = match building.kind {
        BuildingKind::House => HOUSE_COLOR,
        BuildingKind::Castle => CASTLE_COLOR,
    };
    match building.state {
        ConstructionState::UnderConstruction => base.lighten(0.5).with_alpha(0.7),
        ConstructionState::Complete => base,
        ConstructionState::Destroyed => Color::new(0.15, 0.12, 0.1, 0.8),
    }
}

fn draw_building(camera: &Camera, building: &BuildingPresentation) {
    draw_rect_filled(camera, &building.footprint, building_color(building));
    if building.state == ConstructionState::UnderConstruction {
        draw_rect_outline(camera, &building.footprint, 2.0, building_color(building));
    }
}

/// Opacity of a unit, fading out over its death animation.
fn unit_opacity(unit: &UnitPresentation) -> f32 {
    match unit.death_frame {
        None => 1.0,
        Some(frame) => 1.0 - (frame + 1) as f32 / DEATH_ANIMATION_FRAMES as f32,
    }
}

/// Background rectangle of the health bar drawn over a unit, in world units.
fn health_bar_rect(unit: &UnitPresentation) -> WorldRect {
    let extent = unit.kind.sprite_extent();
    WorldRect::new(
        unit.position.x() + extent.width() / 2.0 - HEALTH_BAR_WIDTH / 2.0,
        unit.position.y() + HEALTH_BAR_DROP,
        HEALTH_BAR_WIDTH,
        HEALTH_BAR_HEIGHT,
    )
}

fn draw_unit(camera: &Camera, unit: &UnitPresentation) {
    let opacity = unit_opacity(unit);
    let base = match unit.kind {
        UnitKind::Pawn => PAWN_COLOR,
        UnitKind::Goblin => GOBLIN_COLOR,
    };
    let body = unit.kind.hitbox().rect_at(unit.position);
    draw_rect_filled(camera, &body, base.with_alpha(opacity));

    let (origin, size) = camera.rect_to_screen(&body);
    let mid_y = origin.y + size.y / 2.0;
    let (edge, tip) = match unit.facing {
        Facing::Left => (origin.x, origin.x - size.x / 3.0),
        Facing::Right => (origin.x + size.x, origin.x + size.x + size.x / 3.0),
    };
    macroquad::shapes::draw_triangle(
        MacroquadVec2::new(edge, mid_y - size.y / 4.0),
        MacroquadVec2::new(edge, mid_y + size.y / 4.0),
        MacroquadVec2::new(tip, mid_y),
        to_macroquad_color(base.lighten(0.3).with_alpha(opacity)),
    );

    if unit.selected {
        draw_rect_outline(camera, &body, 2.0, SELECTION_COLOR);
    }

    if unit.death_frame.is_none() {
        let bar = health_bar_rect(unit);
        draw_rect_filled(camera, &bar, HEALTH_BACKGROUND);
        let fill = WorldRect::new(
            bar.x(),
            bar.y(),
            bar.width() * unit.health.clamp(0.0, 1.0),
            bar.height(),
        );
        draw_rect_filled(camera, &fill, HEALTH_FILL);
    }
}

fn draw_banner(text: &str) {
    let dimensions = macroquad::text::measure_text(text, None, BANNER_FONT_SIZE as u16, 1.0);
    let x = (macroquad::window::screen_width() - dimensions.width) / 2.0;
    let y = macroquad::window::screen_height() / 2.0;
    macroquad::text::draw_text(
        text,
        x,
        y,
        BANNER_FONT_SIZE,
        macroquad::color::WHITE,
    );
}

fn draw_rect_filled(camera: &Camera, rect: &WorldRect, color: Color) {
    let (origin, size) = camera.rect_to_screen(rect);
    macroquad::shapes::draw_rectangle(origin.x, origin.y, size.x, size.y, to_macroquad_color(color));
}

fn draw_rect_outline(camera: &Camera, rect: &WorldRect, thickness: f32, color: Color) {
    let (origin, size) = camera.rect_to_screen(rect);
    macroquad::shapes::draw_rectangle_lines(
        origin.x,
        origin.y,
        size.x,
        size.y,
        thickness,
        to_macroquad_color(color),
    );
}

fn normalised_screen_rect(start: Vec2, end: Vec2) -> (Vec2, Vec2) {
    let origin = start.min(end);
    (origin, start.max(end) - origin)
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_core::{AnimationState, WorldPoint};

    fn pressed() -> ButtonObservation {
        ButtonObservation {
            pressed: true,
            down: true,
            released: false,
        }
    }

    fn held() -> ButtonObservation {
        ButtonObservation {
            pressed: false,
            down: true,
            released: false,
        }
    }

    fn released() -> ButtonObservation {
        ButtonObservation {
            pressed: false,
            down: false,
            released: true,
        }
    }

    fn goblin(death_frame: Option<u32>) -> UnitPresentation {
        UnitPresentation {
            kind: UnitKind::Goblin,
            position: WorldPoint::new(100.0, 200.0),
            facing: Facing::Left,
            animation: AnimationState::Idle,
            health: 0.5,
            selected: false,
            death_frame,
        }
    }

    #[test]
    fn drag_reports_selection_only_on_release() {
        let mut drag = SelectionDrag::default();

        let start = drag.observe(pressed(), Vec2::new(10.0, 10.0));
        assert_eq!(start.released, None);
        assert_eq!(
            start.in_progress,
            Some((Vec2::new(10.0, 10.0), Vec2::new(10.0, 10.0)))
        );

        let moving = drag.observe(held(), Vec2::new(50.0, 40.0));
        assert_eq!(
            moving.in_progress,
            Some((Vec2::new(10.0, 10.0), Vec2::new(50.0, 40.0)))
        );

        let done = drag.observe(released(), Vec2::new(60.0, 45.0));
        assert_eq!(
            done.released,
            Some((Vec2::new(10.0, 10.0), Vec2::new(60.0, 45.0)))
        );
        assert_eq!(done.in_progress, None);

        let idle = drag.observe(ButtonObservation::default(), Vec2::new(0.0, 0.0));
        assert_eq!(idle, DragUpdate::default());
    }

    #[test]
    fn health_bar_sits_above_the_sprite_centre() {
        let bar = health_bar_rect(&goblin(None));

        assert_eq!(bar, WorldRect::new(166.0, 232.0, 60.0, 10.0));
    }

    #[test]
    fn dead_units_fade_out_over_the_death_animation() {
        assert_eq!(unit_opacity(&goblin(None)), 1.0);
        assert!(unit_opacity(&goblin(Some(0))) < 1.0);
        assert_eq!(unit_opacity(&goblin(Some(DEATH_ANIMATION_FRAMES - 1))), 0.0);
    }

    #[test]
    fn reversed_drag_draws_a_positive_rectangle() {
        let (origin, size) = normalised_screen_rect(Vec2::new(80.0, 90.0), Vec2::new(20.0, 30.0));

        assert_eq!(origin, Vec2::new(20.0, 30.0));
        assert_eq!(size, Vec2::new(60.0, 60.0));
    }

    #[test]
    fn fps_counter_reports_average_frames_per_second() {
        let mut counter = FpsCounter::default();
        let frame = Duration::from_millis(250);
        for _ in 0..3 {
            assert!(counter.record_frame(frame, Duration::ZERO).is_none());
        }

        let metrics = counter
            .record_frame(frame, Duration::from_millis(4))
            .expect("should report FPS after one second of samples");
        assert!((metrics.per_second - 4.0).abs() <= 1e-3);
        assert!((metrics.trailing_ten_seconds - 4.0).abs() <= 1e-3);
        assert_eq!(metrics.avg_render, Duration::from_millis(1));
    }

    #[test]
    fn destroyed_buildings_are_drawn_as_rubble() {
        let building = BuildingPresentation {
            kind: BuildingKind::Castle,
            state: ConstructionState::Destroyed,
            footprint: WorldRect::new(0.0, 0.0, 10.0, 10.0),
        };

        assert_eq!(building_color(&building).alpha, 0.8);
        let building = BuildingPresentation {
            state: ConstructionState::Complete,
            ..building
        };
        assert_eq!(building_color(&building), CASTLE_COLOR);
    }
}
