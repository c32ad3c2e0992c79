//! Death debris
//!
//! A dead snake bursts into particles that drift, slow down and expire. The
//! system only tracks them; whoever collects a particle awards its points.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::DebrisConfig;
use crate::consts::{
    DEBRIS_MAX_LIFETIME, DEBRIS_MIN_LIFETIME, DEBRIS_POINTS, HEAD_DEBRIS_GROWTH,
    HEAD_DEBRIS_LIFETIME, HEAD_DEBRIS_POINTS, REFERENCE_FPS,
};
use crate::polar_to_cartesian;

const SEGMENT_SIZE: f32 = 5.0;
const HEAD_SIZE: f32 = 9.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debris {
    pub pos: Vec2,
    /// Pixels per reference frame
    pub vel: Vec2,
    pub size: f32,
    /// Seconds alive
    pub age: f32,
    pub max_lifetime: f32,
    /// Segments granted on pickup
    pub growth: usize,
    pub points: u64,
    /// Skin of the snake it came from
    pub skin: u8,
    pub from_head: bool,
}

impl Debris {
    pub fn is_expired(&self) -> bool {
        self.age >= self.max_lifetime
    }

    /// Remaining life as 1.0 (fresh) .. 0.0 (gone), used for fading
    pub fn life_fraction(&self) -> f32 {
        (1.0 - self.age / self.max_lifetime).clamp(0.0, 1.0)
    }
}

/// Owns every live particle
#[derive(Debug, Clone)]
pub struct DebrisSystem {
    particles: Vec<Debris>,
    friction: f32,
    max_particles: usize,
    explosion_speed: f32,
}

impl DebrisSystem {
    pub fn new(config: &DebrisConfig) -> Self {
        Self {
            particles: Vec::new(),
            friction: config.friction,
            max_particles: config.max_particles,
            explosion_speed: config.explosion_speed,
        }
    }

    pub fn particles(&self) -> &[Debris] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    fn burst_velocity<R: Rng>(&self, rng: &mut R) -> Vec2 {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let speed = self.explosion_speed * rng.random_range(0.3..=1.0);
        polar_to_cartesian(speed, angle)
    }

    /// Explode a body (head first) into particles
    pub fn spawn_burst<R: Rng>(&mut self, body: &[Vec2], skin: u8, rng: &mut R) {
        let Some((&head, rest)) = body.split_first() else {
            return;
        };

        for &pos in rest {
            let vel = self.burst_velocity(rng);
            self.particles.push(Debris {
                pos,
                vel,
                size: SEGMENT_SIZE,
                age: 0.0,
                max_lifetime: rng.random_range(DEBRIS_MIN_LIFETIME..=DEBRIS_MAX_LIFETIME),
                growth: 1,
                points: DEBRIS_POINTS,
                skin,
                from_head: false,
            });
        }

        let vel = self.burst_velocity(rng) * 0.5;
        self.particles.push(Debris {
            pos: head,
            vel,
            size: HEAD_SIZE,
            age: 0.0,
            max_lifetime: HEAD_DEBRIS_LIFETIME,
            growth: HEAD_DEBRIS_GROWTH,
            points: HEAD_DEBRIS_POINTS,
            skin,
            from_head: true,
        });

        if self.particles.len() > self.max_particles {
            let excess = self.particles.len() - self.max_particles;
            self.particles.drain(..excess);
            log::debug!("Debris cap reached, dropped {} oldest", excess);
        }
    }

    /// Drift, drag and expire
    pub fn update(&mut self, dt: f32) {
        let frames = dt * REFERENCE_FPS;
        let drag = self.friction.powf(frames);
        for p in &mut self.particles {
            p.pos += p.vel * frames;
            p.vel *= drag;
            p.age += dt;
        }
        self.particles.retain(|p| !p.is_expired());
    }

    /// Remove and return every particle within `radius` of `point`
    pub fn collect(&mut self, point: Vec2, radius: f32) -> Vec<Debris> {
        let r2 = radius * radius;
        let mut taken = Vec::new();
        self.particles.retain(|p| {
            let hit = p.pos.distance_squared(point) < r2;
            if hit {
                taken.push(p.clone());
            }
            !hit
        });
        taken
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.particles.iter().map(|p| p.pos)
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
