// viewport.rs - Pan/zoom camera over the cell world

use egui::{Pos2, Vec2, pos2, vec2};

use crate::config::ViewportConfig;

const FRAME_MS: f32 = 16.0;                           // Friction is applied per 60 Hz frame
const WHEEL_LINE: f32 = 100.0;                        // Scroll units per wheel notch

/// Gesture handlers that can be suspended independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plugin {
    Drag,
    Pinch,
    Wheel,
    Decelerate,
}

impl Plugin {
    fn bit(self) -> u8 {
        match self {
            Plugin::Drag => 1,
            Plugin::Pinch => 2,
            Plugin::Wheel => 4,
            Plugin::Decelerate => 8,
        }
    }
}

/// Camera state: `center` is the world point shown at the middle of the screen.
#[derive(Debug, Clone)]
pub struct Viewport {
    screen: Vec2,
    world: Vec2,
    center: Pos2,
    scale: f32,
    min_scale: f32,
    max_scale: f32,
    wheel_percent: f32,
    friction: f32,
    min_speed: f32,
    velocity: Vec2,                                   // screen px per ms
    paused: u8,
}

impl Viewport {
    pub fn new(screen: Vec2, world: Vec2, config: &ViewportConfig) -> Self {
        let mut viewport = Self {
            screen,
            world,
            center: (world / 2.0).to_pos2(),
            scale: 1.0,
            min_scale: config.min_zoom,
            max_scale: config.max_zoom,
            wheel_percent: config.wheel_percent,
            friction: config.friction,
            min_speed: config.min_speed,
            velocity: Vec2::ZERO,
            paused: 0,
        };
        viewport.set_zoom(config.initial_zoom);
        viewport
    }

    pub fn screen_size(&self) -> Vec2 {
        self.screen
    }

    pub fn world_size(&self) -> Vec2 {
        self.world
    }

    pub fn center(&self) -> Pos2 {
        self.center
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn is_moving(&self) -> bool {
        self.velocity != Vec2::ZERO
    }

    pub fn clamp_zoom(&mut self, min_scale: f32, max_scale: f32) {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self.scale = self.scale.clamp(min_scale, max_scale);
    }

    pub fn set_zoom(&mut self, scale: f32) {
        self.scale = scale.clamp(self.min_scale, self.max_scale);
    }

    pub fn move_center(&mut self, x: f32, y: f32) {
        self.center = pos2(x, y);
    }

    /// New screen and world dimensions; the camera keeps its center and scale.
    pub fn resize(&mut self, screen: Vec2, world: Vec2) {
        self.screen = screen;
        self.world = world;
    }

    pub fn pause(&mut self, plugin: Plugin) {
        self.paused |= plugin.bit();
        if plugin == Plugin::Decelerate {
            self.velocity = Vec2::ZERO;
        }
    }

    pub fn resume(&mut self, plugin: Plugin) {
        self.paused &= !plugin.bit();
    }

    pub fn is_paused(&self, plugin: Plugin) -> bool {
        self.paused & plugin.bit() != 0
    }

    pub fn world_to_screen(&self, world: Pos2) -> Pos2 {
        ((world - self.center) * self.scale + self.screen / 2.0).to_pos2()
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Pos2 {
        self.center + (screen.to_vec2() - self.screen / 2.0) / self.scale
    }

    /// Pans by a screen-space pointer delta. Returns false while dragging is paused.
    pub fn drag(&mut self, delta: Vec2) -> bool {
        if self.is_paused(Plugin::Drag) {
            return false;
        }
        self.velocity = Vec2::ZERO;
        self.center -= delta / self.scale;
        true
    }

    /// Starts momentum after a drag ends; `velocity` is in screen px per ms.
    pub fn release(&mut self, velocity: Vec2) {
        if self.is_paused(Plugin::Drag) || self.is_paused(Plugin::Decelerate) {
            return;
        }
        self.velocity = if velocity.length() < self.min_speed { Vec2::ZERO } else { velocity };
    }

    /// Zooms about a screen anchor by a scroll amount; positive zooms in.
    pub fn wheel(&mut self, delta: f32, anchor: Pos2) -> bool {
        if self.is_paused(Plugin::Wheel) || delta == 0.0 {
            return false;
        }
        let factor = (1.0 + self.wheel_percent).powf(delta / WHEEL_LINE);
        self.zoom_about(factor, anchor);
        true
    }

    pub fn pinch(&mut self, factor: f32, anchor: Pos2) -> bool {
        if self.is_paused(Plugin::Pinch) || factor == 1.0 {
            return false;
        }
        self.zoom_about(factor, anchor);
        true
    }

    /// Advances momentum by `elapsed_ms`. Returns true while still moving.
    pub fn update(&mut self, elapsed_ms: f32) -> bool {
        if self.velocity == Vec2::ZERO || self.is_paused(Plugin::Decelerate) {
            return false;
        }
        self.center -= self.velocity * elapsed_ms / self.scale;
        self.velocity *= self.friction.powf(elapsed_ms / FRAME_MS);
        if self.velocity.length() < self.min_speed {
            self.velocity = Vec2::ZERO;
        }
        self.is_moving()
    }

    // Keeps the world point under `anchor` fixed on screen.
    fn zoom_about(&mut self, factor: f32, anchor: Pos2) {
        let before = self.screen_to_world(anchor);
        self.scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);
        self.center = before - (anchor.to_vec2() - self.screen / 2.0) / self.scale;
    }
}

/// World size for a grid: `cols` pitches wide and `rows` pitches tall.
pub fn world_bounds(rows: usize, cols: usize, pitch: f32) -> Vec2 {
    vec2(cols as f32 * pitch, rows as f32 * pitch)
}

/// Geometric centroid the camera recenters on after a resize.
pub fn grid_centroid(rows: usize, cols: usize, pitch: f32) -> Pos2 {
    (world_bounds(rows, cols, pitch) / 2.0).to_pos2()
}
