//! Game state
//!
//! A single owner for every simulation system. Systems never reach each
//! other directly; the tick hands them what they need.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::debris::DebrisSystem;
use super::difficulty::DifficultySystem;
use super::effects::{ActiveEffects, EffectKind};
use super::enemy_manager::EnemyManager;
use super::pickups::{PickupField, PickupKind};
use super::snake::{Body, PlayerSnake};
use crate::config::GameConfig;
use crate::consts::WALL_AVOID_MARGIN;
use crate::error::ConfigError;
use crate::{Rect, angle_of};

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Built or reset, waiting for start
    Idle,
    /// Active gameplay
    Running,
    /// Game is paused; no time passes
    Paused,
    /// Out of lives
    GameOver,
}

/// Why a life was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Wall,
    SelfBite,
    Enemy,
}

/// Things that happened during a tick, drained by the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    LifeLost { cause: DeathCause, lives_left: u8 },
    PickupCollected { kind: PickupKind, points: u64 },
    DebrisCollected { count: usize, points: u64 },
    EnemyKilled { id: u32 },
    EffectEnded(EffectKind),
    LevelUp { level: u32, name: String },
    GameOver { score: u64 },
}

/// Per-run state behind the control-distorting effects
#[derive(Debug, Clone, Default)]
pub struct ControlState {
    /// (time, turn) samples replayed under input delay
    pub delayed_turns: VecDeque<(f32, f32)>,
    /// Last turn released from the delay buffer
    pub delayed_turn: f32,
    /// Current forced steering under random turning
    pub drift: f32,
    pub drift_timer: f32,
    /// Seconds accumulated toward the next bleed loss
    pub bleed_timer: f32,
}

impl ControlState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Complete simulation state
#[derive(Debug)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u8,
    /// Seconds of running simulation (drives effect deadlines)
    pub elapsed: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: PlayerSnake,
    pub enemies: EnemyManager,
    pub pickups: PickupField,
    pub debris: DebrisSystem,
    pub difficulty: DifficultySystem,
    pub effects: ActiveEffects,
    pub controls: ControlState,
    /// Playable area; leaving it costs a life
    pub world: Rect,
    pub events: Vec<GameEvent>,
    config: GameConfig,
}

impl GameState {
    /// Validate the config and build every system
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let world = Rect::from_size(Vec2::ZERO, Vec2::new(config.world.width, config.world.height));
        let difficulty = match &config.difficulty {
            Some(levels) => DifficultySystem::new(levels.clone())?,
            None => DifficultySystem::standard(),
        };
        let player = PlayerSnake::new(world.center(), 0.0, &config.player)?;

        let mut state = Self {
            seed: config.seed,
            rng: Pcg32::seed_from_u64(config.seed),
            phase: GamePhase::Idle,
            score: 0,
            lives: config.lives,
            elapsed: 0.0,
            time_ticks: 0,
            player,
            enemies: EnemyManager::new(&config.enemies)?,
            pickups: PickupField::new(&config.pickups, config.seed),
            debris: DebrisSystem::new(&config.debris),
            difficulty,
            effects: ActiveEffects::new(),
            controls: ControlState::default(),
            world,
            events: Vec::new(),
            config,
        };
        state.reset();
        Ok(state)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Back to a fresh Idle run with the same seed
    pub fn reset(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.phase = GamePhase::Idle;
        self.score = 0;
        self.lives = self.config.lives;
        self.elapsed = 0.0;
        self.time_ticks = 0;
        self.player.reset_segments(self.world.center(), 0.0);
        self.enemies.clear();
        self.pickups.clear();
        self.debris.clear();
        self.difficulty.reset();
        self.effects.clear();
        self.controls.clear();
        self.events.clear();

        let head = self.player.head();
        self.pickups.populate(head, self.world, &mut self.rng);
    }

    /// Start a new run with another seed
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.config.seed = seed;
        self.pickups = PickupField::new(&self.config.pickups, seed);
        self.reset();
    }

    pub fn survival_time(&self) -> f32 {
        self.difficulty.survival_time()
    }

    pub fn is_invincible(&self) -> bool {
        self.effects.is_active(EffectKind::Invincibility)
    }

    /// Add points, doubled while DoublePoints is active
    pub fn award(&mut self, points: u64) -> u64 {
        let factor = self.effects.value_or(EffectKind::DoublePoints, 1.0).max(1.0);
        let gained = (points as f32 * factor).round() as u64;
        self.score += gained;
        gained
    }

    /// Take a life; the body bursts into debris, then the snake respawns in
    /// place (pulled off the walls) or the run ends
    pub fn lose_life(&mut self, cause: DeathCause) {
        self.debris
            .spawn_burst(&self.player.body_points(), self.player.skin, &mut self.rng);
        self.lives = self.lives.saturating_sub(1);
        self.events.push(GameEvent::LifeLost {
            cause,
            lives_left: self.lives,
        });
        log::info!("Life lost ({:?}), {} left", cause, self.lives);

        if self.lives == 0 {
            self.phase = GamePhase::GameOver;
            self.events.push(GameEvent::GameOver { score: self.score });
            log::info!(
                "Game over: score {} after {:.1}s",
                self.score,
                self.survival_time()
            );
            return;
        }

        let head = self
            .world
            .clamp_inside(self.player.head(), WALL_AVOID_MARGIN * 2.0);
        let angle = angle_of(self.world.center() - head);
        self.player.reset_segments(head, angle);
        self.controls.clear();
        self.effects.apply(
            EffectKind::Invincibility,
            1.0,
            self.elapsed,
            self.config.respawn_invincibility,
        );
    }

    /// Drain events produced since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_idle_and_centered() {
        let state = GameState::new(GameConfig::default()).unwrap();
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.lives, 3);
        assert_eq!(state.player.head(), Vec2::new(1500.0, 1500.0));
        assert_eq!(state.pickups.bonus_count(), state.config().pickups.bonus_target);
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let mut config = GameConfig::default();
        config.player.segment_spacing = -1.0;
        assert!(GameState::new(config).is_err());

        let mut config = GameConfig::default();
        config.difficulty = Some(Vec::new());
        assert!(matches!(
            GameState::new(config),
            Err(ConfigError::EmptyDifficultyTable)
        ));
    }

    #[test]
    fn test_life_loss_respawns_with_protection() {
        let mut state = GameState::new(GameConfig::default()).unwrap();
        state.phase = GamePhase::Running;
        state.player.grow(10);
        state.player.segments[0].pos = Vec2::new(3.0, 1500.0);

        state.lose_life(DeathCause::Wall);
        assert_eq!(state.lives, 2);
        assert_eq!(state.player.len(), state.player.initial_length());
        assert!(state.player.head().x >= WALL_AVOID_MARGIN * 2.0);
        assert!(state.is_invincible());
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_life_loss_leaves_remains() {
        let mut state = GameState::new(GameConfig::default()).unwrap();
        state.phase = GamePhase::Running;
        state.player.grow(10);
        let body = state.player.body_points();
        assert!(state.debris.is_empty());

        state.lose_life(DeathCause::SelfBite);
        assert_eq!(state.debris.len(), body.len());
        let heads: Vec<Vec2> = state
            .debris
            .particles()
            .iter()
            .filter(|d| d.from_head)
            .map(|d| d.pos)
            .collect();
        assert_eq!(heads, vec![body[0]]);

        state.lives = 1;
        let before = state.debris.len();
        state.lose_life(DeathCause::Wall);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.debris.len() > before);
    }

    #[test]
    fn test_last_life_ends_the_run() {
        let mut state = GameState::new(GameConfig::default()).unwrap();
        state.phase = GamePhase::Running;
        state.lives = 1;
        state.score = 40;
        state.lose_life(DeathCause::Enemy);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.take_events().contains(&GameEvent::GameOver { score: 40 }));
    }

    #[test]
    fn test_double_points() {
        let mut state = GameState::new(GameConfig::default()).unwrap();
        assert_eq!(state.award(10), 10);
        state.effects.apply(EffectKind::DoublePoints, 2.0, 0.0, 5.0);
        assert_eq!(state.award(10), 20);
        assert_eq!(state.score, 30);
    }

    #[test]
    fn test_reset_is_reproducible() {
        let mut state = GameState::new(GameConfig::with_seed(77)).unwrap();
        let first: Vec<Vec2> = state.pickups.positions(false).collect();
        state.score = 500;
        state.reset();
        let second: Vec<Vec2> = state.pickups.positions(false).collect();
        assert_eq!(first, second);
        assert_eq!(state.score, 0);
    }
}
