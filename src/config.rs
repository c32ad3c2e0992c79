//! Game configuration
//!
//! Balance values for every system. Loaded from JSON (or LocalStorage on the
//! web) and validated before a game is built.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_FRAME_DELTA, START_LIVES};
use crate::error::ConfigError;
use crate::sim::difficulty::{DifficultyLevel, DifficultySystem};

/// World bounds and procedural ground
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    /// Edge length of one ground tile (world pixels)
    pub tile_size: f32,
    /// Tiles kept in the generator cache before pruning
    pub tile_cache_max: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 3000.0,
            height: 3000.0,
            tile_size: 256.0,
            tile_cache_max: 512,
        }
    }
}

/// Player snake tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub initial_segments: usize,
    pub segment_spacing: f32,
    pub segment_radius: f32,
    /// Pixels per reference frame
    pub base_speed: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Radians per reference frame
    pub turn_rate: f32,
    /// Segments gained per bonus
    pub growth_per_bonus: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_segments: 10,
            segment_spacing: 10.0,
            segment_radius: 8.0,
            base_speed: 2.0,
            min_speed: 1.0,
            max_speed: 4.0,
            turn_rate: 0.07,
            growth_per_bonus: 1,
        }
    }
}

/// Enemy snake tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyConfig {
    /// Seconds before the first enemy appears
    pub spawn_delay: f32,
    pub min_spawn_distance: f32,
    pub max_spawn_distance: f32,
    /// Enemies farther than this from the player are removed
    pub despawn_distance: f32,
    /// Head-to-head / head-to-body contact radius
    pub collision_radius: f32,
    pub segment_spacing: f32,
    pub segment_radius: f32,
    pub base_speed: f32,
    pub turn_rate: f32,
    /// Passive enemies flee when the player is closer than this
    pub flee_radius: f32,
    /// Aggressive enemies hunt the player inside this radius
    pub hunt_radius: f32,
    /// Food farther than this is ignored
    pub sight_radius: f32,
    /// Distinct enemy skins
    pub skins: u8,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            spawn_delay: 3.0,
            min_spawn_distance: 450.0,
            max_spawn_distance: 900.0,
            despawn_distance: 2000.0,
            collision_radius: 20.0,
            segment_spacing: 12.0,
            segment_radius: 9.0,
            base_speed: 1.6,
            turn_rate: 0.05,
            flee_radius: 250.0,
            hunt_radius: 600.0,
            sight_radius: 500.0,
            skins: 6,
        }
    }
}

/// Bonus / malus population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupConfig {
    /// Bonuses kept alive around the player
    pub bonus_target: usize,
    /// Malus kept alive around the player (once enabled by difficulty)
    pub malus_target: usize,
    /// Base seconds between bonus spawns (divided by the level's bonus rate)
    pub bonus_interval: f32,
    /// Base seconds between malus spawns (divided by the level's malus rate)
    pub malus_interval: f32,
    pub radius: f32,
    pub spawn_min_distance: f32,
    pub spawn_max_distance: f32,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            bonus_target: 14,
            malus_target: 5,
            bonus_interval: 2.0,
            malus_interval: 6.0,
            radius: 12.0,
            spawn_min_distance: 150.0,
            spawn_max_distance: 900.0,
        }
    }
}

/// Death debris physics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebrisConfig {
    /// Velocity multiplier per reference frame
    pub friction: f32,
    pub pickup_radius: f32,
    pub max_particles: usize,
    /// Peak explosion speed (pixels per reference frame)
    pub explosion_speed: f32,
}

impl Default for DebrisConfig {
    fn default() -> Self {
        Self {
            friction: 0.98,
            pickup_radius: 20.0,
            max_particles: 600,
            explosion_speed: 3.0,
        }
    }
}

/// Camera viewport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Fraction of the remaining distance closed per reference frame
    pub smoothing: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            viewport_height: 600.0,
            smoothing: 0.1,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Run seed (world tiles, spawns, AI)
    pub seed: u64,
    pub lives: u8,
    /// Clamp on a single frame's delta (seconds)
    pub max_frame_delta: f32,
    /// Invincibility granted after losing a life (seconds)
    pub respawn_invincibility: f32,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub enemies: EnemyConfig,
    #[serde(default)]
    pub pickups: PickupConfig,
    #[serde(default)]
    pub debris: DebrisConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    /// Custom difficulty table (standard 20 tiers when absent)
    #[serde(default)]
    pub difficulty: Option<Vec<DifficultyLevel>>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed_50a1,
            lives: START_LIVES,
            max_frame_delta: MAX_FRAME_DELTA,
            respawn_invincibility: 2.0,
            world: WorldConfig::default(),
            player: PlayerConfig::default(),
            enemies: EnemyConfig::default(),
            pickups: PickupConfig::default(),
            debris: DebrisConfig::default(),
            camera: CameraConfig::default(),
            difficulty: None,
        }
    }
}

impl GameConfig {
    /// Default config with a specific seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would make the simulation degenerate
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lives == 0 {
            return Err(ConfigError::NoLives);
        }
        if !(self.max_frame_delta > 0.0) {
            return Err(ConfigError::InvalidFrameDelta(self.max_frame_delta));
        }

        let w = &self.world;
        if !(w.width > 0.0 && w.height > 0.0) {
            return Err(ConfigError::InvalidWorldSize {
                width: w.width,
                height: w.height,
            });
        }
        if !(w.tile_size > 0.0) {
            return Err(ConfigError::InvalidTileSize(w.tile_size));
        }
        if w.tile_cache_max == 0 {
            return Err(ConfigError::ZeroCacheSize);
        }

        let p = &self.player;
        if p.initial_segments == 0 {
            return Err(ConfigError::NoStartingSegments);
        }
        if !(p.segment_spacing > 0.0) {
            return Err(ConfigError::NonPositiveSpacing(p.segment_spacing));
        }
        if !(p.segment_radius > 0.0) {
            return Err(ConfigError::NonPositiveRadius {
                what: "player segment",
                value: p.segment_radius,
            });
        }
        if !(p.min_speed > 0.0 && p.min_speed <= p.base_speed && p.base_speed <= p.max_speed) {
            return Err(ConfigError::InvalidSpeedRange {
                min: p.min_speed,
                base: p.base_speed,
                max: p.max_speed,
            });
        }
        if !(p.turn_rate > 0.0) {
            return Err(ConfigError::NonPositiveTurnRate(p.turn_rate));
        }

        let e = &self.enemies;
        if !(e.segment_spacing > 0.0) {
            return Err(ConfigError::NonPositiveSpacing(e.segment_spacing));
        }
        if !(e.segment_radius > 0.0) {
            return Err(ConfigError::NonPositiveRadius {
                what: "enemy segment",
                value: e.segment_radius,
            });
        }
        if !(e.collision_radius > 0.0) {
            return Err(ConfigError::NonPositiveRadius {
                what: "enemy collision",
                value: e.collision_radius,
            });
        }
        if !(e.base_speed > 0.0) {
            return Err(ConfigError::InvalidSpeedRange {
                min: e.base_speed,
                base: e.base_speed,
                max: e.base_speed,
            });
        }
        if !(e.turn_rate > 0.0) {
            return Err(ConfigError::NonPositiveTurnRate(e.turn_rate));
        }
        if !(e.min_spawn_distance > 0.0 && e.min_spawn_distance <= e.max_spawn_distance) {
            return Err(ConfigError::InvalidSpawnBand {
                min: e.min_spawn_distance,
                max: e.max_spawn_distance,
            });
        }

        let k = &self.pickups;
        if !(k.radius > 0.0) {
            return Err(ConfigError::NonPositiveRadius {
                what: "pickup",
                value: k.radius,
            });
        }
        if !(k.spawn_min_distance >= 0.0 && k.spawn_min_distance <= k.spawn_max_distance) {
            return Err(ConfigError::InvalidSpawnBand {
                min: k.spawn_min_distance,
                max: k.spawn_max_distance,
            });
        }

        let d = &self.debris;
        if !(d.friction > 0.0 && d.friction <= 1.0) {
            return Err(ConfigError::InvalidFriction(d.friction));
        }
        if !(d.pickup_radius > 0.0) {
            return Err(ConfigError::NonPositiveRadius {
                what: "debris pickup",
                value: d.pickup_radius,
            });
        }

        let c = &self.camera;
        if !(c.viewport_width > 0.0 && c.viewport_height > 0.0) {
            return Err(ConfigError::InvalidViewport {
                width: c.viewport_width,
                height: c.viewport_height,
            });
        }
        if !(c.smoothing > 0.0 && c.smoothing <= 1.0) {
            return Err(ConfigError::InvalidSmoothing(c.smoothing));
        }

        if let Some(levels) = &self.difficulty {
            DifficultySystem::validate(levels)?;
        }

        Ok(())
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "snake_souls_config";

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded config from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored config: {}", e),
                }
            }
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
