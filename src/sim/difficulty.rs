//! Time-based difficulty progression
//!
//! Twenty ordered windows `[min_time, max_time)` over survival time, the last
//! one unbounded. Escalation depends on elapsed time only.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One difficulty tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyLevel {
    /// 1-based tier number
    pub level: u32,
    pub name: String,
    /// Seconds of survival at which this tier starts
    pub min_time: f32,
    /// End of the window (exclusive); `None` for the last tier
    pub max_time: Option<f32>,
    pub max_enemies: usize,
    /// Seconds between enemy spawns
    pub spawn_interval: f32,
    /// Inclusive range of segments for new enemies
    pub segment_range: (usize, usize),
    pub malus_enabled: bool,
    pub malus_spawn_rate: f32,
    pub bonus_spawn_rate: f32,
    pub enemy_speed_multiplier: f32,
    /// Probability that a new enemy is aggressive
    pub aggressiveness: f32,
}

impl DifficultyLevel {
    /// Enemy growth per food item at this tier
    pub fn growth_multiplier(&self) -> f32 {
        1.0 + self.level.saturating_sub(1) as f32 * 0.15
    }

    /// Whether `time` falls inside this tier's window
    pub fn contains(&self, time: f32) -> bool {
        time >= self.min_time && self.max_time.is_none_or(|end| time < end)
    }
}

/// Report of a tier transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelChange {
    pub previous: usize,
    pub current: usize,
}

type LevelCallback = Box<dyn FnMut(&DifficultyLevel, &DifficultyLevel)>;

/// Tracks survival time and the active tier
pub struct DifficultySystem {
    levels: Vec<DifficultyLevel>,
    current: usize,
    survival_time: f32,
    on_change: Option<LevelCallback>,
}

impl fmt::Debug for DifficultySystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DifficultySystem")
            .field("levels", &self.levels.len())
            .field("current", &self.current)
            .field("survival_time", &self.survival_time)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl DifficultySystem {
    pub fn new(levels: Vec<DifficultyLevel>) -> Result<Self, ConfigError> {
        Self::validate(&levels)?;
        Ok(Self {
            levels,
            current: 0,
            survival_time: 0.0,
            on_change: None,
        })
    }

    /// Parse a table from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let levels: Vec<DifficultyLevel> = serde_json::from_str(json)?;
        Self::new(levels)
    }

    /// Check a table: non-empty, anchored at 0, contiguous, non-empty windows
    pub fn validate(levels: &[DifficultyLevel]) -> Result<(), ConfigError> {
        let first = levels.first().ok_or(ConfigError::EmptyDifficultyTable)?;
        if first.min_time != 0.0 {
            return Err(ConfigError::DifficultyNotAnchored {
                level: first.level,
                min_time: first.min_time,
            });
        }

        let mut previous_end: Option<f32> = Some(0.0);
        for level in levels {
            if previous_end != Some(level.min_time) {
                return Err(ConfigError::DifficultyGap {
                    level: level.level,
                    min_time: level.min_time,
                    previous_end,
                });
            }
            if let Some(end) = level.max_time.filter(|end| !(*end > level.min_time)) {
                return Err(ConfigError::EmptyDifficultyWindow {
                    level: level.level,
                    min_time: level.min_time,
                    max_time: end,
                });
            }
            let (min, max) = level.segment_range;
            if min == 0 || min > max {
                return Err(ConfigError::InvalidSegmentRange {
                    level: level.level,
                    min,
                    max,
                });
            }
            if !(level.spawn_interval > 0.0) {
                return Err(ConfigError::InvalidSpawnInterval {
                    level: level.level,
                    interval: level.spawn_interval,
                });
            }
            previous_end = level.max_time;
        }

        // Only the last tier may be open-ended
        if let Some(end) = previous_end {
            let last = &levels[levels.len() - 1];
            return Err(ConfigError::DifficultyGap {
                level: last.level,
                min_time: end,
                previous_end: None,
            });
        }
        Ok(())
    }

    /// The standard twenty-tier table
    pub fn standard() -> Self {
        Self {
            levels: standard_levels(),
            current: 0,
            survival_time: 0.0,
            on_change: None,
        }
    }

    /// Register the transition callback `(new, previous)`
    pub fn on_level_change<F>(&mut self, callback: F)
    where
        F: FnMut(&DifficultyLevel, &DifficultyLevel) + 'static,
    {
        self.on_change = Some(Box::new(callback));
    }

    /// Advance survival time; fires the callback once per crossed boundary
    pub fn update(&mut self, dt: f32) -> Option<LevelChange> {
        if dt > 0.0 {
            self.survival_time += dt;
        }

        let target = self.level_index_for(self.survival_time);
        if target <= self.current {
            return None;
        }

        let previous = self.current;
        while self.current < target {
            let from = self.current;
            self.current += 1;
            if let Some(callback) = self.on_change.as_mut() {
                callback(&self.levels[self.current], &self.levels[from]);
            }
        }

        let level = &self.levels[self.current];
        log::info!(
            "Difficulty {} \"{}\" at {:.1}s",
            level.level,
            level.name,
            self.survival_time
        );
        Some(LevelChange {
            previous,
            current: self.current,
        })
    }

    /// Greatest index whose window has started; negative time maps to the first
    pub fn level_index_for(&self, time: f32) -> usize {
        self.levels
            .partition_point(|l| l.min_time <= time)
            .saturating_sub(1)
    }

    pub fn level_for_time(&self, time: f32) -> &DifficultyLevel {
        &self.levels[self.level_index_for(time)]
    }

    pub fn current(&self) -> &DifficultyLevel {
        &self.levels[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn survival_time(&self) -> f32 {
        self.survival_time
    }

    pub fn levels(&self) -> &[DifficultyLevel] {
        &self.levels
    }

    /// Back to tier 1 at time 0 (the callback stays registered)
    pub fn reset(&mut self) {
        self.current = 0;
        self.survival_time = 0.0;
    }
}

#[allow(clippy::type_complexity)]
fn standard_levels() -> Vec<DifficultyLevel> {
    // name, start, max enemies, spawn interval, segments, malus rate, bonus rate, speed, aggression
    const TABLE: [(&str, f32, usize, f32, (usize, usize), f32, f32, f32, f32); 20] = [
        ("Tutoriel", 0.0, 2, 8.0, (4, 6), 0.0, 1.0, 0.80, 0.00),
        ("Facile", 30.0, 3, 7.0, (4, 7), 0.0, 1.0, 0.85, 0.05),
        ("Normal", 60.0, 4, 6.5, (5, 8), 0.0, 1.0, 0.90, 0.10),
        ("Modéré", 90.0, 5, 6.0, (5, 9), 0.5, 1.0, 0.95, 0.15),
        ("Soutenu", 120.0, 6, 5.5, (6, 10), 0.6, 0.95, 1.00, 0.20),
        ("Difficile", 150.0, 7, 5.0, (6, 11), 0.7, 0.95, 1.05, 0.25),
        ("Ardu", 180.0, 8, 4.6, (7, 12), 0.8, 0.9, 1.08, 0.30),
        ("Intense", 240.0, 9, 4.2, (7, 13), 0.9, 0.9, 1.12, 0.35),
        ("Redoutable", 300.0, 10, 3.9, (8, 14), 1.0, 0.85, 1.15, 0.40),
        ("Périlleux", 360.0, 11, 3.6, (8, 15), 1.1, 0.85, 1.18, 0.45),
        ("Brutal", 420.0, 12, 3.3, (9, 16), 1.2, 0.8, 1.21, 0.50),
        ("Impitoyable", 480.0, 13, 3.0, (9, 17), 1.3, 0.8, 1.24, 0.55),
        ("Sauvage", 540.0, 14, 2.8, (10, 18), 1.4, 0.75, 1.27, 0.60),
        ("Infernal", 600.0, 15, 2.6, (10, 20), 1.5, 0.75, 1.30, 0.65),
        ("Cauchemar", 720.0, 16, 2.4, (11, 22), 1.6, 0.7, 1.33, 0.70),
        ("Démoniaque", 840.0, 17, 2.2, (12, 24), 1.7, 0.7, 1.36, 0.74),
        ("Apocalyptique", 960.0, 18, 2.0, (13, 26), 1.8, 0.65, 1.40, 0.78),
        ("Légendaire", 1080.0, 19, 1.8, (14, 28), 1.9, 0.65, 1.44, 0.82),
        ("Mythique", 1200.0, 20, 1.6, (15, 30), 2.0, 0.6, 1.48, 0.86),
        ("Âme Damnée", 1500.0, 22, 1.4, (16, 34), 2.2, 0.6, 1.55, 0.90),
    ];

    TABLE
        .iter()
        .enumerate()
        .map(|(i, &(name, start, max_enemies, interval, segments, malus, bonus, speed, aggro))| {
            DifficultyLevel {
                level: i as u32 + 1,
                name: name.to_string(),
                min_time: start,
                max_time: TABLE.get(i + 1).map(|next| next.1),
                max_enemies,
                spawn_interval: interval,
                segment_range: segments,
                malus_enabled: malus > 0.0,
                malus_spawn_rate: malus,
                bonus_spawn_rate: bonus,
                enemy_speed_multiplier: speed,
                aggressiveness: aggro,
            }
        })
        .collect()
}
