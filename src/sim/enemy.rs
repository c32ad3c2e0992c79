//! Enemy snakes and their steering behaviors
//!
//! Enemy bodies replay the path the head travelled: the head position is
//! sampled into a history buffer, and body point `i` sits at arclength
//! `i * spacing` along it.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::snake::Body;
use crate::config::EnemyConfig;
use crate::consts::{
    AGGRESSIVE_MIN_LENGTH, ENEMY_SELF_COLLISION_SKIP, HISTORY_MARGIN, HISTORY_SAMPLES_PER_UNIT,
    WALL_AVOID_MARGIN,
};
use crate::error::ConfigError;
use crate::{Rect, angle_difference, angle_of, heading, normalize_angle};

/// Frames of player motion an aggressive enemy leads its intercept by
const INTERCEPT_LEAD_FRAMES: f32 = 25.0;
/// Random heading change range for wandering (radians)
const WANDER_SPREAD: f32 = 1.2;
/// Random jitter added to evasive turns (radians)
const EVADE_JITTER: f32 = 0.8;

/// Steering profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    /// Hunts the player once long enough, otherwise goes for food
    Aggressive,
    /// Grazes and runs from the player
    Passive,
    /// Undirected wandering
    Random,
    /// Keeps its distance, wanders otherwise
    Evasive,
}

impl Behavior {
    /// Roll a profile; `aggressiveness` is the chance of `Aggressive`
    pub fn pick<R: Rng>(aggressiveness: f32, rng: &mut R) -> Self {
        if rng.random::<f32>() < aggressiveness.clamp(0.0, 1.0) {
            return Behavior::Aggressive;
        }
        match rng.random_range(0..20) {
            0..=8 => Behavior::Passive,
            9..=17 => Behavior::Random,
            _ => Behavior::Evasive,
        }
    }
}

/// What an enemy can see when deciding where to go
#[derive(Debug, Clone, Copy)]
pub struct SteerContext<'a> {
    pub player_head: Vec2,
    pub player_angle: f32,
    /// Player displacement per reference frame
    pub player_speed: f32,
    pub world: Rect,
    /// Edible things: debris and bonuses
    pub food: &'a [Vec2],
    /// Everyone steers to the player
    pub attraction: bool,
    /// Aggressive enemies ignore their hunt radius
    pub reveal: bool,
}

/// Validated per-enemy parameters shared by every spawn
#[derive(Debug, Clone)]
pub struct EnemyTemplate {
    pub base_speed: f32,
    pub turn_rate: f32,
    pub spacing: f32,
    pub segment_radius: f32,
    pub collision_radius: f32,
    pub flee_radius: f32,
    pub hunt_radius: f32,
    pub sight_radius: f32,
}

impl EnemyTemplate {
    pub fn new(config: &EnemyConfig) -> Result<Self, ConfigError> {
        if !(config.segment_spacing > 0.0) {
            return Err(ConfigError::NonPositiveSpacing(config.segment_spacing));
        }
        if !(config.segment_radius > 0.0) {
            return Err(ConfigError::NonPositiveRadius {
                what: "enemy segment",
                value: config.segment_radius,
            });
        }
        if !(config.collision_radius > 0.0) {
            return Err(ConfigError::NonPositiveRadius {
                what: "enemy collision",
                value: config.collision_radius,
            });
        }
        if !(config.turn_rate > 0.0) {
            return Err(ConfigError::NonPositiveTurnRate(config.turn_rate));
        }
        Ok(Self {
            base_speed: config.base_speed,
            turn_rate: config.turn_rate,
            spacing: config.segment_spacing,
            segment_radius: config.segment_radius,
            collision_radius: config.collision_radius,
            flee_radius: config.flee_radius,
            hunt_radius: config.hunt_radius,
            sight_radius: config.sight_radius,
        })
    }
}

/// An AI-driven snake
#[derive(Debug, Clone)]
pub struct EnemySnake {
    pub id: u32,
    pub angle: f32,
    /// Pixels per reference frame
    pub speed: f32,
    pub turn_rate: f32,
    pub behavior: Behavior,
    /// Segments gained per meal (floored, at least 1)
    pub growth_multiplier: f32,
    pub skin: u8,
    pub active: bool,
    /// Body segments behind the head
    segments: usize,
    spacing: f32,
    segment_radius: f32,
    collision_radius: f32,
    flee_radius: f32,
    hunt_radius: f32,
    sight_radius: f32,
    /// Head samples, newest first
    history: VecDeque<Vec2>,
    /// Replayed body, head first (`segments + 1` points)
    body: Vec<Vec2>,
    wander_timer: f32,
    wander_angle: f32,
}

impl EnemySnake {
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        id: u32,
        template: &EnemyTemplate,
        head: Vec2,
        angle: f32,
        segments: usize,
        speed_multiplier: f32,
        behavior: Behavior,
        growth_multiplier: f32,
        skin: u8,
    ) -> Self {
        let angle = normalize_angle(angle);
        // Lay the initial body out in a straight line behind the head
        let back = -heading(angle) * template.spacing;
        let history: VecDeque<Vec2> = (0..=segments).map(|i| head + back * i as f32).collect();

        let mut enemy = Self {
            id,
            angle,
            speed: template.base_speed * speed_multiplier,
            turn_rate: template.turn_rate,
            behavior,
            growth_multiplier,
            skin,
            active: true,
            segments,
            spacing: template.spacing,
            segment_radius: template.segment_radius,
            collision_radius: template.collision_radius,
            flee_radius: template.flee_radius,
            hunt_radius: template.hunt_radius,
            sight_radius: template.sight_radius,
            history,
            body: Vec::with_capacity(segments + 1),
            wander_timer: 0.0,
            wander_angle: angle,
        };
        enemy.rebuild_body();
        enemy
    }

    pub fn segment_count(&self) -> usize {
        self.segments
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Most samples the history may hold for the current length
    pub fn history_bound(&self) -> usize {
        ((self.segments + 1) as f32 * self.spacing * HISTORY_SAMPLES_PER_UNIT).ceil() as usize
            + HISTORY_MARGIN
    }

    pub fn body(&self) -> &[Vec2] {
        &self.body
    }

    /// Rotate toward `target` by at most `turn_rate * frames`, the short way round
    pub fn turn_towards(&mut self, target: f32, frames: f32) {
        let max_step = self.turn_rate * frames;
        let delta = angle_difference(self.angle, target).clamp(-max_step, max_step);
        self.angle = normalize_angle(self.angle + delta);
    }

    /// Move the head, record it, and replay the body along the new path
    pub fn advance(&mut self, frames: f32, speed_multiplier: f32) {
        let head = self.head() + heading(self.angle) * self.speed * speed_multiplier * frames;

        // Keep samples at least one unit apart so slow snakes still cover their length
        let min_step = 1.0 / HISTORY_SAMPLES_PER_UNIT;
        let coalesce = self.history.len() >= 2 && self.history[0].distance(self.history[1]) < min_step;
        if coalesce {
            self.history[0] = head;
        } else {
            self.history.push_front(head);
        }

        self.trim_history();
        self.rebuild_body();
    }

    fn trim_history(&mut self) {
        let bound = self.history_bound();
        self.history.truncate(bound);
        debug_assert!(self.history.len() <= bound);
    }

    /// Resample the body at `spacing` intervals along the history
    fn rebuild_body(&mut self) {
        self.body.clear();
        let Some(&first) = self.history.front() else {
            return;
        };
        self.body.push(first);

        let mut walked = 0.0;
        let mut next_mark = self.spacing;
        for (a, b) in self.history.iter().zip(self.history.iter().skip(1)) {
            if self.body.len() > self.segments {
                break;
            }
            let step = a.distance(*b);
            if step <= f32::EPSILON {
                continue;
            }
            while walked + step >= next_mark && self.body.len() <= self.segments {
                let t = (next_mark - walked) / step;
                self.body.push(a.lerp(*b, t));
                next_mark += self.spacing;
            }
            walked += step;
        }

        // History shorter than the body: stack the rest on the oldest sample
        let oldest = self.history.back().copied().unwrap_or(first);
        while self.body.len() <= self.segments {
            self.body.push(oldest);
        }
    }

    /// Add `floor(growth_multiplier)` segments (at least one); returns the gain
    pub fn eat(&mut self) -> usize {
        let gain = (self.growth_multiplier.floor() as usize).max(1);
        self.segments += gain;
        self.rebuild_body();
        gain
    }

    /// Drop up to `n` tail segments; returns how many went
    pub fn trim_tail(&mut self, n: usize) -> usize {
        let removed = n.min(self.segments);
        self.segments -= removed;
        self.trim_history();
        self.rebuild_body();
        removed
    }

    /// Cut the body at `index` (body point index, head = 0); points `index..` are
    /// removed. Returns the removed positions.
    pub fn truncate_at(&mut self, index: usize) -> Vec<Vec2> {
        let index = index.max(1);
        if index > self.segments {
            return Vec::new();
        }
        let removed = self.body[index..].to_vec();
        self.segments = index - 1;
        self.trim_history();
        self.rebuild_body();
        removed
    }

    /// First far body point the head runs into
    pub fn self_collision(&self) -> Option<usize> {
        let head = self.head();
        self.body
            .iter()
            .enumerate()
            .skip(ENEMY_SELF_COLLISION_SKIP)
            .find(|(_, p)| head.distance(**p) < self.segment_radius)
            .map(|(i, _)| i)
    }

    /// Decide a heading for this frame; `None` means evade
    pub fn think<R: Rng>(&mut self, ctx: &SteerContext, dt: f32, rng: &mut R) -> Option<f32> {
        let head = self.head();

        if self.heading_into_wall(ctx.world) {
            return None;
        }
        if ctx.attraction {
            return Some(angle_of(ctx.player_head - head));
        }

        let to_player = ctx.player_head - head;
        let player_dist = to_player.length();

        match self.behavior {
            Behavior::Aggressive => {
                let in_range = ctx.reveal || player_dist < self.hunt_radius;
                if self.segments >= AGGRESSIVE_MIN_LENGTH && in_range {
                    let lead = heading(ctx.player_angle) * ctx.player_speed * INTERCEPT_LEAD_FRAMES;
                    return Some(angle_of(ctx.player_head + lead - head));
                }
                self.nearest_food(ctx.food, self.sight_radius)
                    .map(|food| angle_of(food - head))
                    .or_else(|| Some(self.wander(dt, rng)))
            }
            Behavior::Passive => {
                if player_dist < self.flee_radius {
                    return Some(angle_of(-to_player));
                }
                self.nearest_food(ctx.food, self.sight_radius * 0.5)
                    .map(|food| angle_of(food - head))
                    .or_else(|| Some(self.wander(dt, rng)))
            }
            Behavior::Random => Some(self.wander(dt, rng)),
            Behavior::Evasive => {
                if player_dist < self.flee_radius * 0.5 {
                    None
                } else if player_dist < self.flee_radius * 1.5 {
                    Some(angle_of(-to_player))
                } else {
                    Some(self.wander(dt, rng))
                }
            }
        }
    }

    /// Heading used when `think` has no directive: back toward open space
    pub fn evade_heading<R: Rng>(&self, world: Rect, rng: &mut R) -> f32 {
        let to_center = world.center() - self.head();
        angle_of(to_center) + rng.random_range(-EVADE_JITTER..=EVADE_JITTER)
    }

    fn heading_into_wall(&self, world: Rect) -> bool {
        let head = self.head();
        let dir = heading(self.angle);
        (head.x < world.min.x + WALL_AVOID_MARGIN && dir.x < 0.0)
            || (head.x > world.max.x - WALL_AVOID_MARGIN && dir.x > 0.0)
            || (head.y < world.min.y + WALL_AVOID_MARGIN && dir.y < 0.0)
            || (head.y > world.max.y - WALL_AVOID_MARGIN && dir.y > 0.0)
    }

    fn nearest_food(&self, food: &[Vec2], range: f32) -> Option<Vec2> {
        let head = self.head();
        food.iter()
            .copied()
            .map(|p| (p, head.distance_squared(p)))
            .filter(|(_, d2)| *d2 < range * range)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(p, _)| p)
    }

    fn wander<R: Rng>(&mut self, dt: f32, rng: &mut R) -> f32 {
        self.wander_timer -= dt;
        if self.wander_timer <= 0.0 {
            self.wander_angle =
                normalize_angle(self.angle + rng.random_range(-WANDER_SPREAD..=WANDER_SPREAD));
            self.wander_timer = rng.random_range(1.0..3.0);
        }
        self.wander_angle
    }
}

impl Body for EnemySnake {
    fn head(&self) -> Vec2 {
        debug_assert!(!self.body.is_empty(), "enemy body never rebuilt");
        self.body.first().copied().unwrap_or_default()
    }

    fn collision_radius(&self) -> f32 {
        self.collision_radius
    }

    fn segment_radius(&self) -> f32 {
        self.segment_radius
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn body_len(&self) -> usize {
        self.body.len()
    }

    fn body_point(&self, index: usize) -> Vec2 {
        self.body[index]
    }
}
