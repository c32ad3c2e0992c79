//! Simulation tick
//!
//! Advances a running game by one frame of wall-clock time. Step order is
//! fixed so life loss always wins over a pickup in the same tick.

use glam::Vec2;
use rand::Rng;

use super::collision::{EnemyContact, check_player, player_vs_enemies};
use super::effects::EffectKind;
use super::enemy::SteerContext;
use super::pickups::PickupKind;
use super::snake::Body;
use super::state::{DeathCause, GameEvent, GamePhase, GameState};
use crate::angle_of;
use crate::consts::{REFERENCE_FPS, SPEED_STEP};

/// Points for an enemy that runs its head into the player
pub const ENEMY_KILL_POINTS: u64 = 100;
/// Seconds between new random-turn impulses
const DRIFT_INTERVAL: f32 = 0.4;

/// Held controls for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// -1 = left, +1 = right
    pub turn: f32,
    pub speed_up: bool,
    pub speed_down: bool,
}

/// Advance the game state by `dt` seconds (clamped)
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.phase != GamePhase::Running {
        return;
    }
    if !(dt > 0.0) {
        return;
    }
    let dt = dt.min(state.config().max_frame_delta);
    let frames = dt * REFERENCE_FPS;
    state.elapsed += dt;
    state.time_ticks += 1;
    let now = state.elapsed;

    // Effects
    for ended in state.effects.purge_expired(now) {
        state.events.push(GameEvent::EffectEnded(ended));
    }

    // Player
    let frozen = state.effects.is_active(EffectKind::Freeze);
    if !frozen {
        let turn = steering(state, input, dt);
        state.player.turn(turn, frames);

        let mut speed_dir = match (input.speed_up, input.speed_down) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        };
        if state.effects.is_active(EffectKind::ReversedControls) {
            speed_dir = -speed_dir;
        }
        if speed_dir != 0.0 {
            state.player.change_speed(speed_dir * SPEED_STEP * frames);
        }

        let speed_mult = state.effects.value_or(EffectKind::SpeedBoost, 1.0)
            * state.effects.value_or(EffectKind::GlobalSlow, 1.0);
        state.player.advance(frames, speed_mult);
    }

    // Collisions
    let bonus_blocked = state.effects.is_active(EffectKind::BonusBlock);
    let hit = check_player(&state.player, state.world, state.pickups.items(), bonus_blocked);
    let mut lost_life = false;
    if hit.is_fatal() {
        if state.is_invincible() {
            if hit.wall {
                bounce_off_walls(state);
            }
        } else {
            let cause = if hit.wall {
                DeathCause::Wall
            } else {
                DeathCause::SelfBite
            };
            state.lose_life(cause);
            lost_life = true;
        }
    } else if let Some(id) = hit.pickup {
        collect_pickup(state, id);
    }

    if !lost_life {
        resolve_enemy_contacts(state);
    }
    if state.phase == GamePhase::GameOver {
        return;
    }

    // Enemies
    let food: Vec<Vec2> = state
        .debris
        .positions()
        .chain(state.pickups.positions(true))
        .collect();
    let player_speed = state.player.speed;
    let ctx = SteerContext {
        player_head: state.player.head(),
        player_angle: state.player.angle,
        player_speed: if frozen { 0.0 } else { player_speed },
        world: state.world,
        food: &food,
        attraction: state.effects.is_active(EffectKind::EnemyAttraction),
        reveal: state.effects.is_active(EffectKind::PositionReveal),
    };
    let enemy_mult = state.effects.value_or(EffectKind::EnemySlow, 1.0)
        * state.effects.value_or(EffectKind::GlobalSlow, 1.0);
    state.enemies.update(dt, &ctx, enemy_mult, &mut state.rng);
    state.enemies.resolve_collisions();
    state.enemies.feed(&mut state.debris, &mut state.pickups);
    state.enemies.despawn_far(state.player.head());
    state.enemies.remove_inactive();

    // Debris
    state.debris.update(dt);
    let reach = state.config().debris.pickup_radius;
    let collected = state.debris.collect(state.player.head(), reach);
    if !collected.is_empty() {
        let raw: u64 = collected.iter().map(|d| d.points).sum();
        let growth: usize = collected.iter().map(|d| d.growth).sum();
        let points = state.award(raw);
        state.player.grow(growth);
        state.events.push(GameEvent::DebrisCollected {
            count: collected.len(),
            points,
        });
    }

    // Bleed
    match state.effects.get(EffectKind::Bleed) {
        Some(interval) if interval > 0.0 => {
            state.controls.bleed_timer += dt;
            while state.controls.bleed_timer >= interval {
                state.controls.bleed_timer -= interval;
                state.player.trim_tail(1);
            }
        }
        _ => state.controls.bleed_timer = 0.0,
    }

    // Difficulty
    if let Some(change) = state.difficulty.update(dt) {
        let level = &state.difficulty.levels()[change.current];
        let (number, name, growth) = (level.level, level.name.clone(), level.growth_multiplier());
        state.enemies.set_growth_multiplier(growth);
        state.events.push(GameEvent::LevelUp {
            level: number,
            name,
        });
    }

    // Spawning
    let level = state.difficulty.current().clone();
    let head = state.player.head();
    state
        .pickups
        .update(dt, &level, head, state.world, &mut state.rng);
    state
        .enemies
        .update_spawning(dt, &level, head, state.world, &mut state.rng);
}

/// Turn input after every control-distorting effect
fn steering(state: &mut GameState, input: &TickInput, dt: f32) -> f32 {
    let now = state.elapsed;
    let mut turn = input.turn.clamp(-1.0, 1.0);

    if state.effects.is_active(EffectKind::InvertedControls) {
        turn = -turn;
    }

    match state.effects.get(EffectKind::InputDelay) {
        Some(delay) => {
            let buffer = &mut state.controls.delayed_turns;
            buffer.push_back((now, turn));
            while let Some(&(at, value)) = buffer.front() {
                if at > now - delay {
                    break;
                }
                state.controls.delayed_turn = value;
                buffer.pop_front();
            }
            turn = state.controls.delayed_turn;
        }
        None => {
            state.controls.delayed_turns.clear();
            state.controls.delayed_turn = 0.0;
        }
    }

    // Input drops out on every other window
    let stutter = state.effects.value_or(EffectKind::ControlStutter, 0.0);
    if stutter > 0.0 && ((now / stutter) as u64) % 2 == 1 {
        turn = 0.0;
    }

    match state.effects.get(EffectKind::RandomTurning) {
        Some(strength) => {
            state.controls.drift_timer -= dt;
            if state.controls.drift_timer <= 0.0 {
                state.controls.drift = state.rng.random_range(-1.0..=1.0) * strength;
                state.controls.drift_timer = DRIFT_INTERVAL;
            }
            turn = (turn + state.controls.drift).clamp(-1.0, 1.0);
        }
        None => {
            state.controls.drift = 0.0;
            state.controls.drift_timer = 0.0;
        }
    }

    turn
}

/// Invincible player touching a wall: pull the head back in and face inward
fn bounce_off_walls(state: &mut GameState) {
    let inset = state.player.collision_radius() + 1.0;
    let head = state.world.clamp_inside(state.player.head(), inset);
    if let Some(first) = state.player.segments.first_mut() {
        first.pos = head;
    }
    state.player.angle = angle_of(state.world.center() - head);
}

fn collect_pickup(state: &mut GameState, id: u32) {
    let Some(pickup) = state.pickups.take(id) else {
        return;
    };
    let now = state.elapsed;

    let points = state.award(pickup.points);
    if let PickupKind::Bonus(_) = pickup.kind {
        let extra = state.effects.value_or(EffectKind::GrowthBonus, 0.0).max(0.0) as usize;
        let growth = state.config().player.growth_per_bonus + extra;
        state.player.grow(growth);
        let head = state.player.head();
        state.pickups.spawn_bonus(head, state.world, &mut state.rng);
    }
    if let Some(effect) = pickup.kind.effect() {
        state
            .effects
            .apply(effect.kind, effect.magnitude, now, effect.duration);
    }

    log::debug!("Picked up {:?} for {} points", pickup.kind, points);
    state.events.push(GameEvent::PickupCollected {
        kind: pickup.kind,
        points,
    });
}

fn resolve_enemy_contacts(state: &mut GameState) {
    for contact in player_vs_enemies(&state.player, state.enemies.enemies()) {
        match contact {
            EnemyContact::PlayerHitEnemy { .. } => {
                if !state.is_invincible() {
                    state.lose_life(DeathCause::Enemy);
                    // One life per tick at most
                    return;
                }
            }
            EnemyContact::EnemyHitPlayer { enemy, .. } => {
                let id = state.enemies.enemies()[enemy].id;
                if let Some((body, skin)) = state.enemies.kill(id) {
                    state.debris.spawn_burst(&body, skin, &mut state.rng);
                    state.award(ENEMY_KILL_POINTS);
                    state.events.push(GameEvent::EnemyKilled { id });
                }
            }
        }
    }
}
