//! Simulation module
//!
//! All gameplay logic lives here:
//! - Seeded RNG only (`Pcg32` from the run seed)
//! - Stable iteration order (spawn order, ids increasing)
//! - No rendering or platform dependencies

pub mod camera;
pub mod collision;
pub mod debris;
pub mod difficulty;
pub mod effects;
pub mod enemy;
pub mod enemy_manager;
pub mod noise;
pub mod pickups;
pub mod snake;
pub mod state;
pub mod tick;
pub mod tiles;

pub use camera::Camera;
pub use collision::{
    EnemyCollision, EnemyContact, PlayerCollision, check_player, circles_overlap, enemy_pairs,
    player_vs_enemies, point_in_radius,
};
pub use debris::{Debris, DebrisSystem};
pub use difficulty::{DifficultyLevel, DifficultySystem, LevelChange};
pub use effects::{ActiveEffects, EffectKind, EffectSlot};
pub use enemy::{Behavior, EnemySnake, EnemyTemplate, SteerContext};
pub use enemy_manager::EnemyManager;
pub use noise::{hash_cell, noise, noise_channel};
pub use pickups::{BonusKind, MalusKind, Pickup, PickupField, PickupKind, TimedEffect};
pub use snake::{Body, PlayerSnake, Segment};
pub use state::{DeathCause, GameEvent, GamePhase, GameState};
pub use tick::{ENEMY_KILL_POINTS, TickInput, tick};
pub use tiles::{TileData, TileRotation, TileWorld};
