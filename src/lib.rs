//! SnakeSouls - A top-down snake survival arcade game
//!
//! Core modules:
//! - `sim`: Simulation (entities, collisions, difficulty, procedural world)
//! - `game`: Orchestrator tying the simulation to a frame clock and score sink
//! - `renderer`: Primitive render target abstraction and scene drawing
//! - `platform`: Input, time and score-sink abstractions (+ browser front end)
//! - `config`: Data-driven game balance

pub mod config;
pub mod error;
pub mod game;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod sim;

pub use config::GameConfig;
pub use error::ConfigError;
pub use game::Game;
pub use highscores::HighScores;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Reference frame rate; speeds and turn rates are expressed per reference frame
    pub const REFERENCE_FPS: f32 = 60.0;
    /// Upper bound on a single simulation step (seconds)
    pub const MAX_FRAME_DELTA: f32 = 0.1;

    /// Starting lives
    pub const START_LIVES: u8 = 3;

    /// Segments closer to the head than this index never count as a self-bite
    pub const SELF_COLLISION_SKIP: usize = 5;
    pub const ENEMY_SELF_COLLISION_SKIP: usize = 6;

    /// Player speed change per reference frame while speed-up/down is held
    pub const SPEED_STEP: f32 = 0.05;

    /// Enemy position history bound: samples per world unit of body length, plus slack
    pub const HISTORY_SAMPLES_PER_UNIT: f32 = 1.0;
    pub const HISTORY_MARGIN: usize = 20;

    /// Aggressive enemies only hunt the player past this many segments
    pub const AGGRESSIVE_MIN_LENGTH: usize = 8;
    /// Distance from the world edge at which enemies turn back
    pub const WALL_AVOID_MARGIN: f32 = 80.0;

    /// Debris scoring
    pub const DEBRIS_POINTS: u64 = 5;
    pub const HEAD_DEBRIS_POINTS: u64 = 50;
    pub const HEAD_DEBRIS_GROWTH: usize = 3;
    pub const HEAD_DEBRIS_LIFETIME: f32 = 20.0;
    pub const DEBRIS_MIN_LIFETIME: f32 = 15.0;
    pub const DEBRIS_MAX_LIFETIME: f32 = 25.0;

    /// Seconds between segment losses while bleeding
    pub const BLEED_INTERVAL: f32 = 1.5;

    /// Ground tile texture variants
    pub const TILE_TEXTURE_COUNT: u8 = 4;
    /// Visual variants per pickup kind
    pub const PICKUP_VARIANTS: u8 = 3;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Signed shortest rotation from `from` to `to`, in (-π, π]
#[inline]
pub fn angle_difference(from: f32, to: f32) -> f32 {
    use std::f32::consts::PI;
    let delta = normalize_angle(to - from);
    // normalize_angle yields [-π, π); fold -π onto +π
    if delta <= -PI { delta + 2.0 * PI } else { delta }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Unit heading vector for an angle
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Rotate a vector by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Angle of a vector (atan2)
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Axis-aligned world rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_size(min: Vec2, size: Vec2) -> Self {
        Self {
            min,
            max: min + size,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Point membership, grown by `margin` on every side
    pub fn contains(&self, p: Vec2, margin: f32) -> bool {
        p.x >= self.min.x - margin
            && p.x <= self.max.x + margin
            && p.y >= self.min.y - margin
            && p.y <= self.max.y + margin
    }

    /// Clamp a point so it lies at least `inset` inside the rectangle
    pub fn clamp_inside(&self, p: Vec2, inset: f32) -> Vec2 {
        p.clamp(self.min + Vec2::splat(inset), self.max - Vec2::splat(inset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_angle_difference_takes_short_way() {
        let d = angle_difference(PI - 0.1, -PI + 0.1);
        assert!((d - 0.2).abs() < 1e-4);

        let d = angle_difference(0.3, 0.1);
        assert!((d + 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_angle_difference_half_turn_is_positive() {
        let d = angle_difference(0.0, PI);
        assert!((d - PI).abs() < 1e-4);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate(Vec2::X, PI / 2.0);
        assert!(v.abs_diff_eq(Vec2::Y, 1e-5));
    }

    #[test]
    fn test_rect_contains_with_margin() {
        let r = Rect::from_size(Vec2::ZERO, Vec2::new(100.0, 50.0));
        assert!(r.contains(Vec2::new(50.0, 25.0), 0.0));
        assert!(!r.contains(Vec2::new(110.0, 25.0), 0.0));
        assert!(r.contains(Vec2::new(110.0, 25.0), 20.0));
    }
}
