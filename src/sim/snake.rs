//! Player snake and the shared body capability
//!
//! The player body is a spring chain: every segment is pulled toward the one
//! ahead of it and stops at exactly `spacing`. The pull targets the leader's
//! current position, already moved this frame, so no adjacent pair ever ends
//! a frame more than `spacing` apart. Enemies use path replay instead
//! (see `enemy.rs`); the two looks are intentionally different.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::PlayerConfig;
use crate::consts::SELF_COLLISION_SKIP;
use crate::error::ConfigError;
use crate::{heading, normalize_angle};

/// Anything with a head and a chain of body points that can collide
pub trait Body {
    fn head(&self) -> Vec2;
    /// Radius used for head contacts
    fn collision_radius(&self) -> f32;
    /// Radius of one body segment
    fn segment_radius(&self) -> f32;
    fn is_active(&self) -> bool;
    /// Number of body points, head included
    fn body_len(&self) -> usize;
    /// Body point `index` (0 = head); `index < body_len()`
    fn body_point(&self, index: usize) -> Vec2;

    fn body_points(&self) -> Vec<Vec2> {
        (0..self.body_len()).map(|i| self.body_point(i)).collect()
    }
}

/// One link of the player's body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub pos: Vec2,
    pub radius: f32,
}

/// The input-driven snake
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnake {
    /// Head first
    pub segments: Vec<Segment>,
    /// Heading (radians)
    pub angle: f32,
    /// Pixels per reference frame
    pub speed: f32,
    pub base_speed: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Radians per reference frame
    pub turn_rate: f32,
    spacing: f32,
    radius: f32,
    initial_length: usize,
    pub skin: u8,
}

impl PlayerSnake {
    pub fn new(start: Vec2, angle: f32, config: &PlayerConfig) -> Result<Self, ConfigError> {
        if !(config.segment_spacing > 0.0) {
            return Err(ConfigError::NonPositiveSpacing(config.segment_spacing));
        }
        if !(config.segment_radius > 0.0) {
            return Err(ConfigError::NonPositiveRadius {
                what: "player segment",
                value: config.segment_radius,
            });
        }
        if config.initial_segments == 0 {
            return Err(ConfigError::NoStartingSegments);
        }

        let mut snake = Self {
            segments: Vec::with_capacity(config.initial_segments),
            angle: normalize_angle(angle),
            speed: config.base_speed,
            base_speed: config.base_speed,
            min_speed: config.min_speed,
            max_speed: config.max_speed,
            turn_rate: config.turn_rate,
            spacing: config.segment_spacing,
            radius: config.segment_radius,
            initial_length: config.initial_segments,
            skin: 0,
        };
        snake.reset_segments(start, angle);
        Ok(snake)
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn initial_length(&self) -> usize {
        self.initial_length
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn tail(&self) -> Vec2 {
        self.segments.last().map(|s| s.pos).unwrap_or_default()
    }

    /// Rebuild the starting body in a straight line behind `head`
    pub fn reset_segments(&mut self, head: Vec2, angle: f32) {
        self.angle = normalize_angle(angle);
        let back = -heading(self.angle) * self.spacing;
        self.segments.clear();
        self.segments.extend((0..self.initial_length).map(|i| Segment {
            pos: head + back * i as f32,
            radius: self.radius,
        }));
        self.speed = self.base_speed;
    }

    /// Steer left (-1) or right (+1)
    pub fn turn(&mut self, direction: f32, frames: f32) {
        self.angle = normalize_angle(self.angle + direction * self.turn_rate * frames);
    }

    /// Nudge speed, kept inside the configured range
    pub fn change_speed(&mut self, delta: f32) {
        self.speed = (self.speed + delta).clamp(self.min_speed, self.max_speed);
    }

    /// Move the head along the heading and drag the body behind it
    pub fn advance(&mut self, frames: f32, speed_multiplier: f32) {
        let Some(head) = self.segments.first_mut() else {
            return;
        };
        head.pos += heading(self.angle) * self.speed * speed_multiplier * frames;
        self.follow();
    }

    /// Pull each segment toward its leader's updated position, stopping at `spacing`
    fn follow(&mut self) {
        for i in 1..self.segments.len() {
            let lead = self.segments[i - 1].pos;
            let seg = &mut self.segments[i];
            let offset = seg.pos - lead;
            let dist = offset.length();
            if dist > self.spacing {
                seg.pos = lead + offset * (self.spacing / dist);
            }
        }
    }

    /// Append `n` segments stacked on the tail
    pub fn grow(&mut self, n: usize) {
        let tail = self.tail();
        self.segments.extend((0..n).map(|_| Segment {
            pos: tail,
            radius: self.radius,
        }));
    }

    /// Remove up to `n` tail segments, never the head; returns their positions
    pub fn trim_tail(&mut self, n: usize) -> Vec<Vec2> {
        let keep = self.segments.len().saturating_sub(n).max(1);
        self.segments.drain(keep..).map(|s| s.pos).collect()
    }

    /// Index of the first far segment the head overlaps
    pub fn self_collision(&self) -> Option<usize> {
        let head = self.head();
        self.segments
            .iter()
            .enumerate()
            .skip(SELF_COLLISION_SKIP)
            .find(|(_, seg)| head.distance(seg.pos) < seg.radius)
            .map(|(i, _)| i)
    }
}

impl Body for PlayerSnake {
    fn head(&self) -> Vec2 {
        debug_assert!(!self.segments.is_empty(), "player snake lost its head");
        self.segments.first().map(|s| s.pos).unwrap_or_default()
    }

    fn collision_radius(&self) -> f32 {
        self.radius
    }

    fn segment_radius(&self) -> f32 {
        self.radius
    }

    fn is_active(&self) -> bool {
        !self.segments.is_empty()
    }

    fn body_len(&self) -> usize {
        self.segments.len()
    }

    fn body_point(&self, index: usize) -> Vec2 {
        self.segments[index].pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn snake_at(x: f32, y: f32) -> PlayerSnake {
        PlayerSnake::new(Vec2::new(x, y), 0.0, &PlayerConfig::default()).unwrap()
    }

    fn assert_spacing(snake: &PlayerSnake) {
        for pair in snake.segments.windows(2) {
            let d = pair[0].pos.distance(pair[1].pos);
            assert!(d <= snake.spacing() + 1e-3, "gap {d}");
        }
    }

    #[test]
    fn test_initial_layout_trails_behind_head() {
        let snake = snake_at(400.0, 300.0);
        assert_eq!(snake.len(), 10);
        assert_eq!(snake.head(), Vec2::new(400.0, 300.0));
        assert!(snake.tail().abs_diff_eq(Vec2::new(310.0, 300.0), 1e-3));
    }

    #[test]
    fn test_straight_run_fifty_ticks() {
        let mut snake = snake_at(400.0, 300.0);
        for _ in 0..50 {
            snake.advance(1.0, 1.0);
        }
        assert!(snake.head().abs_diff_eq(Vec2::new(500.0, 300.0), 1e-3));
        for seg in &snake.segments {
            assert!((seg.pos.y - 300.0).abs() < 1e-3);
        }
        assert_spacing(&snake);
    }

    #[test]
    fn test_grow_appends_without_losing() {
        let mut snake = snake_at(0.0, 0.0);
        let before: Vec<Vec2> = snake.segments.iter().map(|s| s.pos).collect();
        snake.grow(4);
        assert_eq!(snake.len(), 14);
        for (i, p) in before.iter().enumerate() {
            assert_eq!(snake.segments[i].pos, *p);
        }
        assert_eq!(snake.segments[13].pos, before[9]);
    }

    #[test]
    fn test_grown_segments_unfold_while_moving() {
        let mut snake = snake_at(0.0, 0.0);
        snake.grow(3);
        for _ in 0..40 {
            snake.advance(1.0, 1.0);
        }
        let last = snake.segments.len() - 1;
        let gap = snake.segments[last - 1].pos.distance(snake.segments[last].pos);
        assert!(gap > 1.0);
        assert_spacing(&snake);
    }

    #[test]
    fn test_trim_tail_keeps_head() {
        let mut snake = snake_at(0.0, 0.0);
        let removed = snake.trim_tail(3);
        assert_eq!(removed.len(), 3);
        assert_eq!(snake.len(), 7);

        let removed = snake.trim_tail(100);
        assert_eq!(removed.len(), 6);
        assert_eq!(snake.len(), 1);
    }

    #[test]
    fn test_turn_wraps_angle() {
        let mut snake = snake_at(0.0, 0.0);
        snake.angle = 3.1;
        snake.turn(1.0, 2.0);
        assert!(snake.angle < 0.0);
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut snake = snake_at(0.0, 0.0);
        snake.change_speed(100.0);
        assert_eq!(snake.speed, snake.max_speed);
        snake.change_speed(-100.0);
        assert_eq!(snake.speed, snake.min_speed);
    }

    #[test]
    fn test_short_snake_cannot_bite_itself() {
        let mut snake = snake_at(0.0, 0.0);
        for _ in 0..500 {
            snake.turn(1.0, 1.0);
            snake.advance(1.0, 1.0);
            assert!(snake.self_collision().is_none());
        }
    }

    #[test]
    fn test_self_collision_detects_far_segment() {
        let mut snake = snake_at(0.0, 0.0);
        snake.segments[7].pos = snake.head() + Vec2::new(2.0, 0.0);
        assert_eq!(snake.self_collision(), Some(7));
    }

    #[test]
    fn test_self_collision_ignores_neck() {
        let mut snake = snake_at(0.0, 0.0);
        snake.segments[2].pos = snake.head();
        assert_eq!(snake.self_collision(), None);
    }

    #[test]
    fn test_reset_restores_initial_length() {
        let mut snake = snake_at(0.0, 0.0);
        snake.grow(20);
        snake.change_speed(1.0);
        snake.reset_segments(Vec2::new(50.0, 50.0), 1.0);
        assert_eq!(snake.len(), 10);
        assert_eq!(snake.head(), Vec2::new(50.0, 50.0));
        assert_eq!(snake.speed, snake.base_speed);
    }

    #[test]
    fn test_zero_spacing_is_rejected() {
        let config = PlayerConfig {
            segment_spacing: 0.0,
            ..PlayerConfig::default()
        };
        assert!(matches!(
            PlayerSnake::new(Vec2::ZERO, 0.0, &config),
            Err(ConfigError::NonPositiveSpacing(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_spacing_holds_under_any_steering(
            turns in prop::collection::vec(-1.0f32..=1.0, 1..300),
            grow_every in 5usize..40,
            speed in 0.5f32..6.0,
        ) {
            let mut snake = snake_at(0.0, 0.0);
            snake.speed = speed;
            for (i, dir) in turns.iter().enumerate() {
                snake.turn(*dir, 1.0);
                snake.advance(1.0, 1.0);
                if i % grow_every == 0 {
                    snake.grow(1);
                }
                for pair in snake.segments.windows(2) {
                    prop_assert!(pair[0].pos.distance(pair[1].pos) <= snake.spacing() + 1e-3);
                }
            }
        }
    }
}
