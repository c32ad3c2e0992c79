//! Enemy population
//!
//! Owns every enemy snake: spawn timing and placement, per-tick AI and
//! movement, enemy-vs-enemy outcomes, feeding and removal.

use glam::Vec2;
use rand::Rng;

use super::collision::{EnemyCollision, enemy_pairs};
use super::debris::DebrisSystem;
use super::difficulty::DifficultyLevel;
use super::enemy::{Behavior, EnemySnake, EnemyTemplate, SteerContext};
use super::pickups::PickupField;
use super::snake::Body;
use crate::config::EnemyConfig;
use crate::consts::{REFERENCE_FPS, WALL_AVOID_MARGIN};
use crate::error::ConfigError;
use crate::{Rect, angle_of, normalize_angle, polar_to_cartesian};

/// Placement attempts before accepting a spawn closer than the band allows
const SPAWN_ATTEMPTS: usize = 8;

#[derive(Debug, Clone)]
pub struct EnemyManager {
    enemies: Vec<EnemySnake>,
    template: EnemyTemplate,
    spawn_delay: f32,
    min_spawn_distance: f32,
    max_spawn_distance: f32,
    despawn_distance: f32,
    skins: u8,
    /// Seconds until the next spawn attempt
    spawn_timer: f32,
    growth_multiplier: f32,
    next_id: u32,
}

impl EnemyManager {
    pub fn new(config: &EnemyConfig) -> Result<Self, ConfigError> {
        if !(config.min_spawn_distance > 0.0 && config.min_spawn_distance <= config.max_spawn_distance)
        {
            return Err(ConfigError::InvalidSpawnBand {
                min: config.min_spawn_distance,
                max: config.max_spawn_distance,
            });
        }
        Ok(Self {
            enemies: Vec::new(),
            template: EnemyTemplate::new(config)?,
            spawn_delay: config.spawn_delay,
            min_spawn_distance: config.min_spawn_distance,
            max_spawn_distance: config.max_spawn_distance,
            despawn_distance: config.despawn_distance,
            skins: config.skins,
            spawn_timer: config.spawn_delay,
            growth_multiplier: 1.0,
            next_id: 1,
        })
    }

    pub fn enemies(&self) -> &[EnemySnake] {
        &self.enemies
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.active).count()
    }

    pub fn get(&self, id: u32) -> Option<&EnemySnake> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Applies to future meals of every enemy, current ones included
    pub fn set_growth_multiplier(&mut self, multiplier: f32) {
        self.growth_multiplier = multiplier;
        for enemy in &mut self.enemies {
            enemy.growth_multiplier = multiplier;
        }
    }

    /// Count down and spawn when due; returns the new enemy's id
    pub fn update_spawning<R: Rng>(
        &mut self,
        dt: f32,
        level: &DifficultyLevel,
        player: Vec2,
        world: Rect,
        rng: &mut R,
    ) -> Option<u32> {
        self.spawn_timer -= dt;
        if self.spawn_timer > 0.0 {
            return None;
        }
        self.spawn_timer = level.spawn_interval;
        if self.active_count() >= level.max_enemies {
            return None;
        }
        self.spawn(level, player, world, rng)
    }

    /// Spawn one enemy in the band around the player. Points that would
    /// need clamping into the world are rejected; when no random try fits,
    /// the enemy goes toward the world center instead. None if even that
    /// point lies outside the world.
    pub fn spawn<R: Rng>(
        &mut self,
        level: &DifficultyLevel,
        player: Vec2,
        world: Rect,
        rng: &mut R,
    ) -> Option<u32> {
        let inset = WALL_AVOID_MARGIN * 1.5;
        let mut spot = None;
        for _ in 0..SPAWN_ATTEMPTS {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let dist = rng.random_range(self.min_spawn_distance..=self.max_spawn_distance);
            let candidate = player + polar_to_cartesian(dist, angle);
            if world.contains(candidate, -inset) {
                spot = Some(candidate);
                break;
            }
        }
        let spot = spot.or_else(|| {
            let toward = (world.center() - player).try_normalize().unwrap_or(Vec2::X);
            let dist = rng.random_range(self.min_spawn_distance..=self.max_spawn_distance);
            let candidate = player + toward * dist;
            world.contains(candidate, -inset).then_some(candidate)
        });
        let Some(pos) = spot else {
            log::debug!("No room to spawn an enemy around ({:.0}, {:.0})", player.x, player.y);
            return None;
        };

        let (min_len, max_len) = level.segment_range;
        let segments = rng.random_range(min_len..=max_len.max(min_len));
        let behavior = Behavior::pick(level.aggressiveness, rng);
        let skin = rng.random_range(0..self.skins.max(1));
        // Start roughly toward open ground
        let angle = angle_of(world.center() - pos) + rng.random_range(-1.0..=1.0);

        let id = self.next_id;
        self.next_id += 1;
        self.enemies.push(EnemySnake::spawn(
            id,
            &self.template,
            pos,
            angle,
            segments,
            level.enemy_speed_multiplier,
            behavior,
            self.growth_multiplier,
            skin,
        ));
        log::debug!(
            "Spawned enemy {} ({:?}, {} segments) at ({:.0}, {:.0})",
            id,
            behavior,
            segments,
            pos.x,
            pos.y
        );
        Some(id)
    }

    /// AI, turning, movement and self-bites for every live enemy
    pub fn update<R: Rng>(&mut self, dt: f32, ctx: &SteerContext, speed_multiplier: f32, rng: &mut R) {
        let frames = dt * REFERENCE_FPS;
        for enemy in self.enemies.iter_mut().filter(|e| e.active) {
            let target = match enemy.think(ctx, dt, rng) {
                Some(angle) => angle,
                None => enemy.evade_heading(ctx.world, rng),
            };
            enemy.turn_towards(target, frames);
            enemy.advance(frames, speed_multiplier);

            if let Some(index) = enemy.self_collision() {
                let lost = enemy.truncate_at(index);
                log::debug!("Enemy {} bit itself, lost {} segments", enemy.id, lost.len());
            }
        }
    }

    /// Apply enemy-vs-enemy outcomes; returns what happened
    pub fn resolve_collisions(&mut self) -> Vec<EnemyCollision> {
        let hits = enemy_pairs(&self.enemies);
        for hit in &hits {
            match *hit {
                EnemyCollision::HeadToHead { a, b } => {
                    let away = self.enemies[a].head() - self.enemies[b].head();
                    let angle = if away.length_squared() > 0.0 {
                        angle_of(away)
                    } else {
                        self.enemies[a].angle + std::f32::consts::FRAC_PI_2
                    };
                    self.enemies[a].trim_tail(1);
                    self.enemies[b].trim_tail(1);
                    self.enemies[a].angle = normalize_angle(angle);
                    self.enemies[b].angle = normalize_angle(angle + std::f32::consts::PI);
                }
                EnemyCollision::HeadIntoBody { struck, index, .. } => {
                    self.enemies[struck].truncate_at(index);
                }
            }
        }
        hits
    }

    /// Let enemies eat the debris and bonuses their heads touch
    pub fn feed(&mut self, debris: &mut DebrisSystem, pickups: &mut PickupField) -> usize {
        let mut meals = 0;
        for enemy in self.enemies.iter_mut().filter(|e| e.active) {
            let head = enemy.head();
            let reach = enemy.segment_radius();
            let eaten =
                debris.collect(head, reach * 2.0).len() + pickups.take_bonuses_touching(head, reach).len();
            for _ in 0..eaten {
                enemy.eat();
            }
            meals += eaten;
        }
        meals
    }

    /// Mark enemies too far from the player as gone
    pub fn despawn_far(&mut self, player: Vec2) -> usize {
        let limit = self.despawn_distance;
        let mut count = 0;
        for enemy in self.enemies.iter_mut().filter(|e| e.active) {
            if enemy.head().distance_squared(player) > limit * limit {
                enemy.active = false;
                count += 1;
                log::debug!("Despawned enemy {} (too far)", enemy.id);
            }
        }
        count
    }

    /// Kill an enemy; returns its body (head first) and skin for the debris burst
    pub fn kill(&mut self, id: u32) -> Option<(Vec<Vec2>, u8)> {
        let enemy = self.enemies.iter_mut().find(|e| e.id == id && e.active)?;
        enemy.active = false;
        log::debug!("Enemy {} killed", id);
        Some((enemy.body().to_vec(), enemy.skin))
    }

    pub fn remove_inactive(&mut self) {
        self.enemies.retain(|e| e.active);
    }

    /// Drop every enemy and restart the first-spawn delay
    pub fn clear(&mut self) {
        self.enemies.clear();
        self.spawn_timer = self.spawn_delay;
        self.growth_multiplier = 1.0;
    }

    #[cfg(test)]
    pub(crate) fn push(&mut self, enemy: EnemySnake) {
        self.enemies.push(enemy);
    }

    #[cfg(test)]
    pub(crate) fn template(&self) -> &EnemyTemplate {
        &self.template
    }
}
