//! Wave Arena - a wave-based arena combat simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, AI, combat, progression, phases)
//! - `tuning`: Data-driven game balance
//! - `error`: Command and tuning errors
//! - `web`: Browser bridge for the JS render/UI layer (wasm32 only)

pub mod error;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{CommandError, TuningError};
pub use tuning::Tuning;

use glam::Vec2;
use rand::Rng;

/// Timing and structural constants (not data-driven)
pub mod consts {
    /// Length of one combat round
    pub const ROUND_DURATION_MS: u64 = 30_000;
    /// Celebration window between victory and the shop
    pub const VICTORY_WINDOW_MS: u64 = 1_800;

    /// Delayed-materialization window (enemy visible but frozen)
    pub const FLASH_DURATION_MS: u64 = 1_000;
    /// Lock-and-dash speed multiplier while charging
    pub const DASH_SPEED_MULTIPLIER: f32 = 8.0;
    /// Dash ends when this close to the locked target
    pub const DASH_ARRIVAL_DISTANCE: f32 = 30.0;
    /// Dashers never spawn closer than this to the player
    pub const DASHER_MIN_SPAWN_DISTANCE: f32 = 200.0;

    /// Enemy walk cycle
    pub const ENEMY_ANIM_FRAMES: u32 = 12;
    pub const ENEMY_ANIM_FRAME_MS: u64 = 120;
    /// Enemy death (disappear) animation
    pub const DISAPPEAR_FRAMES: u32 = 5;
    pub const DISAPPEAR_FRAME_MS: u64 = 50;

    /// Player death animation; gameover once it completes
    pub const PLAYER_DEATH_FRAMES: u32 = 4;
    pub const PLAYER_DEATH_FRAME_MS: u64 = 200;

    /// Projectiles are culled this far outside the arena
    pub const PROJECTILE_BOUNDS_MARGIN: f32 = 100.0;

    /// Feedback lifetimes
    pub const DAMAGE_NUMBER_TTL_MS: u64 = 2_000;
    pub const LEVEL_UP_TEXT_TTL_MS: u64 = 3_000;

    /// Weapon slots on the player
    pub const MAX_WEAPONS: usize = 6;
    /// Pending events kept for the audio/render layer
    pub const MAX_EVENTS: usize = 256;
}

/// Clamp a circle's center so the whole circle stays inside the arena
#[inline]
pub fn clamp_to_arena(pos: Vec2, radius: f32, width: f32, height: f32) -> Vec2 {
    let min = Vec2::splat(radius);
    let max = Vec2::new(width - radius, height - radius).max(min);
    pos.clamp(min, max)
}

/// Whether a point lies inside the arena rectangle (edges inclusive)
#[inline]
pub fn in_arena(pos: Vec2, width: f32, height: f32) -> bool {
    pos.x >= 0.0 && pos.x <= width && pos.y >= 0.0 && pos.y <= height
}

/// Unit vector from `from` toward `to` (zero when they coincide)
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Rotate a vector by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Aim angle from a pivot toward a target, mirrored when the target is on the left.
///
/// dx is reflected before `atan2`, then the angle is clamped to [-90°, +90°] so
/// a weapon never aims behind its holder. Returns `(angle, mirrored)`.
pub fn mirrored_aim_angle(dx: f32, dy: f32) -> (f32, bool) {
    use std::f32::consts::FRAC_PI_2;
    let mirrored = dx < 0.0;
    let base_dx = if mirrored { -dx } else { dx };
    let angle = dy.atan2(base_dx).clamp(-FRAC_PI_2, FRAC_PI_2);
    (angle, mirrored)
}

/// Unit direction for a (possibly mirrored) aim angle
#[inline]
pub fn aim_direction(angle: f32, mirrored: bool) -> Vec2 {
    let dir = Vec2::new(angle.cos(), angle.sin());
    if mirrored { Vec2::new(-dir.x, dir.y) } else { dir }
}

/// Random point just outside one of the four arena edges
pub fn edge_spawn_point<R: Rng + ?Sized>(rng: &mut R, width: f32, height: f32, margin: f32) -> Vec2 {
    let x = rng.random_range(0.0..width.max(1.0));
    let y = rng.random_range(0.0..height.max(1.0));
    match rng.random_range(0..4u8) {
        0 => Vec2::new(x, -margin),
        1 => Vec2::new(width + margin, y),
        2 => Vec2::new(x, height + margin),
        _ => Vec2::new(-margin, y),
    }
}

/// Random point inside the arena, at least `margin` from every edge
pub fn interior_point<R: Rng + ?Sized>(rng: &mut R, width: f32, height: f32, margin: f32) -> Vec2 {
    let span = |extent: f32| {
        let lo = margin.min(extent / 2.0);
        let hi = (extent - margin).max(lo + f32::EPSILON);
        (lo, hi)
    };
    let (x_lo, x_hi) = span(width);
    let (y_lo, y_hi) = span(height);
    Vec2::new(rng.random_range(x_lo..x_hi), rng.random_range(y_lo..y_hi))
}
