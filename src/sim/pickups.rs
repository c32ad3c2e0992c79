//! Bonus and malus pickups
//!
//! Pickups are kept populated around the player. Spawn cadence comes from
//! the config's base interval divided by the current difficulty rate.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyLevel;
use super::effects::EffectKind;
use super::noise::{fold_seed, noise};
use crate::config::PickupConfig;
use crate::consts::PICKUP_VARIANTS;
use crate::{Rect, polar_to_cartesian};

/// A timed effect granted on pickup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedEffect {
    pub kind: EffectKind,
    pub magnitude: f32,
    /// Seconds
    pub duration: f32,
}

impl TimedEffect {
    const fn new(kind: EffectKind, magnitude: f32, duration: f32) -> Self {
        Self {
            kind,
            magnitude,
            duration,
        }
    }
}

/// Beneficial pickups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusKind {
    Food,
    Speed,
    Shield,
    DoublePoints,
    Growth,
    EnemySlow,
}

impl BonusKind {
    pub const ALL: [BonusKind; 6] = [
        BonusKind::Food,
        BonusKind::Speed,
        BonusKind::Shield,
        BonusKind::DoublePoints,
        BonusKind::Growth,
        BonusKind::EnemySlow,
    ];

    pub fn points(self) -> u64 {
        match self {
            BonusKind::Food => 10,
            BonusKind::Speed => 15,
            BonusKind::Shield => 25,
            BonusKind::DoublePoints | BonusKind::Growth | BonusKind::EnemySlow => 20,
        }
    }

    pub fn effect(self) -> Option<TimedEffect> {
        match self {
            BonusKind::Food => None,
            BonusKind::Speed => Some(TimedEffect::new(EffectKind::SpeedBoost, 1.5, 5.0)),
            BonusKind::Shield => Some(TimedEffect::new(EffectKind::Invincibility, 1.0, 6.0)),
            BonusKind::DoublePoints => Some(TimedEffect::new(EffectKind::DoublePoints, 2.0, 10.0)),
            // Extra segments per pickup while active
            BonusKind::Growth => Some(TimedEffect::new(EffectKind::GrowthBonus, 2.0, 10.0)),
            BonusKind::EnemySlow => Some(TimedEffect::new(EffectKind::EnemySlow, 0.5, 8.0)),
        }
    }

    /// Weighted roll: food is by far the most common
    fn roll<R: Rng>(rng: &mut R) -> Self {
        match rng.random_range(0..100) {
            0..60 => BonusKind::Food,
            60..68 => BonusKind::Speed,
            68..76 => BonusKind::Shield,
            76..84 => BonusKind::DoublePoints,
            84..92 => BonusKind::Growth,
            _ => BonusKind::EnemySlow,
        }
    }

    pub fn asset_id(self) -> &'static str {
        match self {
            BonusKind::Food => "bonus_food",
            BonusKind::Speed => "bonus_speed",
            BonusKind::Shield => "bonus_shield",
            BonusKind::DoublePoints => "bonus_double",
            BonusKind::Growth => "bonus_growth",
            BonusKind::EnemySlow => "bonus_enemy_slow",
        }
    }
}

/// Harmful pickups, one per harmful effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MalusKind {
    InvertedControls,
    FogOfWar,
    InputDelay,
    RandomTurning,
    BonusBlock,
    GlobalSlow,
    Freeze,
    InvisibleWalls,
    ControlStutter,
    ReversedControls,
    EnemyAttraction,
    PositionReveal,
    Bleed,
}

impl MalusKind {
    pub const ALL: [MalusKind; 13] = [
        MalusKind::InvertedControls,
        MalusKind::FogOfWar,
        MalusKind::InputDelay,
        MalusKind::RandomTurning,
        MalusKind::BonusBlock,
        MalusKind::GlobalSlow,
        MalusKind::Freeze,
        MalusKind::InvisibleWalls,
        MalusKind::ControlStutter,
        MalusKind::ReversedControls,
        MalusKind::EnemyAttraction,
        MalusKind::PositionReveal,
        MalusKind::Bleed,
    ];

    /// Magnitudes: slows are multipliers, fog is a visibility radius, delay and
    /// stutter are seconds, random turning is a steering strength, bleed is the
    /// seconds between lost segments.
    pub fn effect(self) -> TimedEffect {
        match self {
            MalusKind::InvertedControls => TimedEffect::new(EffectKind::InvertedControls, 1.0, 5.0),
            MalusKind::FogOfWar => TimedEffect::new(EffectKind::FogOfWar, 220.0, 8.0),
            MalusKind::InputDelay => TimedEffect::new(EffectKind::InputDelay, 0.35, 6.0),
            MalusKind::RandomTurning => TimedEffect::new(EffectKind::RandomTurning, 0.6, 5.0),
            MalusKind::BonusBlock => TimedEffect::new(EffectKind::BonusBlock, 1.0, 6.0),
            MalusKind::GlobalSlow => TimedEffect::new(EffectKind::GlobalSlow, 0.6, 6.0),
            MalusKind::Freeze => TimedEffect::new(EffectKind::Freeze, 1.0, 1.5),
            MalusKind::InvisibleWalls => TimedEffect::new(EffectKind::InvisibleWalls, 1.0, 10.0),
            MalusKind::ControlStutter => TimedEffect::new(EffectKind::ControlStutter, 0.25, 6.0),
            MalusKind::ReversedControls => TimedEffect::new(EffectKind::ReversedControls, 1.0, 6.0),
            MalusKind::EnemyAttraction => TimedEffect::new(EffectKind::EnemyAttraction, 1.0, 8.0),
            MalusKind::PositionReveal => TimedEffect::new(EffectKind::PositionReveal, 1.0, 8.0),
            MalusKind::Bleed => TimedEffect::new(EffectKind::Bleed, 1.5, 9.0),
        }
    }

    fn roll<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn asset_id(self) -> &'static str {
        match self {
            MalusKind::InvertedControls => "malus_inverted",
            MalusKind::FogOfWar => "malus_fog",
            MalusKind::InputDelay => "malus_delay",
            MalusKind::RandomTurning => "malus_drunk",
            MalusKind::BonusBlock => "malus_block",
            MalusKind::GlobalSlow => "malus_slow",
            MalusKind::Freeze => "malus_freeze",
            MalusKind::InvisibleWalls => "malus_walls",
            MalusKind::ControlStutter => "malus_stutter",
            MalusKind::ReversedControls => "malus_reversed",
            MalusKind::EnemyAttraction => "malus_bait",
            MalusKind::PositionReveal => "malus_reveal",
            MalusKind::Bleed => "malus_bleed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Bonus(BonusKind),
    Malus(MalusKind),
}

impl PickupKind {
    pub fn is_malus(&self) -> bool {
        matches!(self, PickupKind::Malus(_))
    }

    pub fn points(&self) -> u64 {
        match self {
            PickupKind::Bonus(b) => b.points(),
            PickupKind::Malus(_) => 0,
        }
    }

    pub fn effect(&self) -> Option<TimedEffect> {
        match self {
            PickupKind::Bonus(b) => b.effect(),
            PickupKind::Malus(m) => Some(m.effect()),
        }
    }

    pub fn asset_id(&self) -> &'static str {
        match self {
            PickupKind::Bonus(b) => b.asset_id(),
            PickupKind::Malus(m) => m.asset_id(),
        }
    }
}

/// A pickup lying in the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    pub pos: Vec2,
    pub radius: f32,
    pub points: u64,
    /// Visual variant in `0..PICKUP_VARIANTS`, derived from position noise
    pub variant: u8,
}

/// All live pickups plus their spawn timers
#[derive(Debug, Clone)]
pub struct PickupField {
    items: Vec<Pickup>,
    config: PickupConfig,
    noise_seed: u32,
    bonus_timer: f32,
    malus_timer: f32,
    next_id: u32,
}

impl PickupField {
    pub fn new(config: &PickupConfig, seed: u64) -> Self {
        Self {
            items: Vec::new(),
            config: config.clone(),
            noise_seed: fold_seed(seed),
            bonus_timer: 0.0,
            malus_timer: config.malus_interval,
            next_id: 1,
        }
    }

    pub fn items(&self) -> &[Pickup] {
        &self.items
    }

    pub fn bonus_count(&self) -> usize {
        self.items.iter().filter(|p| !p.kind.is_malus()).count()
    }

    pub fn malus_count(&self) -> usize {
        self.items.iter().filter(|p| p.kind.is_malus()).count()
    }

    /// Fill the field right away (game start)
    pub fn populate<R: Rng>(&mut self, player: Vec2, world: Rect, rng: &mut R) {
        while self.bonus_count() < self.config.bonus_target {
            self.spawn_bonus(player, world, rng);
        }
    }

    /// Tick spawn timers; bonuses always, malus only once the level allows them
    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        level: &DifficultyLevel,
        player: Vec2,
        world: Rect,
        rng: &mut R,
    ) {
        self.despawn_far(player);

        if level.bonus_spawn_rate > 0.0 {
            self.bonus_timer -= dt;
            if self.bonus_timer <= 0.0 {
                if self.bonus_count() < self.config.bonus_target {
                    self.spawn_bonus(player, world, rng);
                }
                self.bonus_timer = self.config.bonus_interval / level.bonus_spawn_rate;
            }
        }

        if level.malus_enabled && level.malus_spawn_rate > 0.0 {
            self.malus_timer -= dt;
            if self.malus_timer <= 0.0 {
                if self.malus_count() < self.config.malus_target {
                    self.spawn_malus(player, world, rng);
                }
                self.malus_timer = self.config.malus_interval / level.malus_spawn_rate;
            }
        }
    }

    pub fn spawn_bonus<R: Rng>(&mut self, player: Vec2, world: Rect, rng: &mut R) -> u32 {
        let kind = PickupKind::Bonus(BonusKind::roll(rng));
        self.spawn(kind, player, world, rng)
    }

    pub fn spawn_malus<R: Rng>(&mut self, player: Vec2, world: Rect, rng: &mut R) -> u32 {
        let kind = PickupKind::Malus(MalusKind::roll(rng));
        self.spawn(kind, player, world, rng)
    }

    /// Place a pickup at a random spot in the band around the player
    pub fn spawn<R: Rng>(&mut self, kind: PickupKind, player: Vec2, world: Rect, rng: &mut R) -> u32 {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let dist = rng.random_range(self.config.spawn_min_distance..=self.config.spawn_max_distance);
        let pos = world.clamp_inside(player + polar_to_cartesian(dist, angle), self.config.radius * 2.0);
        self.insert(kind, pos)
    }

    /// Place a pickup at an exact spot
    pub fn insert(&mut self, kind: PickupKind, pos: Vec2) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        let variant = ((noise(pos.x, pos.y, self.noise_seed) * PICKUP_VARIANTS as f32) as u8)
            .min(PICKUP_VARIANTS - 1);
        self.items.push(Pickup {
            id,
            kind,
            pos,
            radius: self.config.radius,
            points: kind.points(),
            variant,
        });
        id
    }

    /// Remove a pickup by id
    pub fn take(&mut self, id: u32) -> Option<Pickup> {
        let index = self.items.iter().position(|p| p.id == id)?;
        Some(self.items.swap_remove(index))
    }

    /// Remove every bonus a circle touches (enemies grazing)
    pub fn take_bonuses_touching(&mut self, center: Vec2, radius: f32) -> Vec<Pickup> {
        let mut taken = Vec::new();
        self.items.retain(|p| {
            let touching = !p.kind.is_malus() && center.distance(p.pos) < radius + p.radius;
            if touching {
                taken.push(p.clone());
            }
            !touching
        });
        taken
    }

    pub fn positions(&self, bonuses_only: bool) -> impl Iterator<Item = Vec2> + '_ {
        self.items
            .iter()
            .filter(move |p| !bonuses_only || !p.kind.is_malus())
            .map(|p| p.pos)
    }

    /// Drop pickups left far behind so the field follows the player
    fn despawn_far(&mut self, player: Vec2) {
        let limit = self.config.spawn_max_distance * 2.0;
        self.items.retain(|p| p.pos.distance_squared(player) <= limit * limit);
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.bonus_timer = 0.0;
        self.malus_timer = self.config.malus_interval;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::difficulty::DifficultySystem;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn world() -> Rect {
        Rect::new(Vec2::ZERO, Vec2::splat(3000.0))
    }

    #[test]
    fn test_every_malus_maps_to_a_harmful_effect() {
        for malus in MalusKind::ALL {
            assert!(malus.effect().kind.is_harmful(), "{malus:?}");
        }
    }

    #[test]
    fn test_populate_reaches_target() {
        let mut rng = Pcg32::seed_from_u64(1);
        let config = PickupConfig::default();
        let mut field = PickupField::new(&config, 1);
        field.populate(Vec2::splat(1500.0), world(), &mut rng);
        assert_eq!(field.bonus_count(), config.bonus_target);
        assert_eq!(field.malus_count(), 0);
    }

    #[test]
    fn test_spawn_stays_in_band_and_world() {
        let mut rng = Pcg32::seed_from_u64(2);
        let config = PickupConfig::default();
        let mut field = PickupField::new(&config, 2);
        let player = Vec2::splat(1500.0);
        for _ in 0..200 {
            field.spawn_bonus(player, world(), &mut rng);
        }
        for p in field.items() {
            let d = p.pos.distance(player);
            assert!(d >= config.spawn_min_distance - 1e-2 && d <= config.spawn_max_distance + 1e-2);
            assert!(world().contains(p.pos, 0.0));
            assert!(p.variant < PICKUP_VARIANTS);
        }
    }

    #[test]
    fn test_spawn_near_corner_is_clamped() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut field = PickupField::new(&PickupConfig::default(), 3);
        for _ in 0..100 {
            field.spawn_bonus(Vec2::new(10.0, 10.0), world(), &mut rng);
        }
        assert!(field.items().iter().all(|p| p.pos.x >= 24.0 && p.pos.y >= 24.0));
    }

    #[test]
    fn test_malus_waits_for_level() {
        let mut rng = Pcg32::seed_from_u64(4);
        let difficulty = DifficultySystem::standard();
        let early = difficulty.level_for_time(0.0).clone();
        let late = difficulty.level_for_time(100.0).clone();
        let mut field = PickupField::new(&PickupConfig::default(), 4);
        let player = Vec2::splat(1500.0);

        for _ in 0..600 {
            field.update(0.1, &early, player, world(), &mut rng);
        }
        assert_eq!(field.malus_count(), 0);
        assert!(field.bonus_count() > 0);

        for _ in 0..600 {
            field.update(0.1, &late, player, world(), &mut rng);
        }
        assert!(field.malus_count() > 0);
    }

    #[test]
    fn test_take_and_touching() {
        let mut field = PickupField::new(&PickupConfig::default(), 5);
        let food = field.insert(PickupKind::Bonus(BonusKind::Food), Vec2::new(100.0, 100.0));
        let _fog = field.insert(PickupKind::Malus(MalusKind::FogOfWar), Vec2::new(105.0, 100.0));
        let far = field.insert(PickupKind::Bonus(BonusKind::Speed), Vec2::new(900.0, 900.0));

        let eaten = field.take_bonuses_touching(Vec2::new(100.0, 100.0), 10.0);
        assert_eq!(eaten.len(), 1);
        assert_eq!(eaten[0].id, food);
        assert_eq!(field.malus_count(), 1);

        assert_eq!(field.take(far).map(|p| p.points), Some(15));
        assert!(field.take(far).is_none());
    }

    #[test]
    fn test_variant_is_position_deterministic() {
        let mut a = PickupField::new(&PickupConfig::default(), 9);
        let mut b = PickupField::new(&PickupConfig::default(), 9);
        let pos = Vec2::new(321.5, 654.25);
        a.insert(PickupKind::Bonus(BonusKind::Food), pos);
        b.insert(PickupKind::Bonus(BonusKind::Growth), pos);
        assert_eq!(a.items()[0].variant, b.items()[0].variant);
    }

    #[test]
    fn test_far_pickups_are_dropped() {
        let mut rng = Pcg32::seed_from_u64(6);
        let difficulty = DifficultySystem::standard();
        let level = difficulty.current().clone();
        let mut field = PickupField::new(&PickupConfig::default(), 6);
        field.insert(PickupKind::Bonus(BonusKind::Food), Vec2::new(0.0, 0.0));
        field.update(0.01, &level, Vec2::new(2900.0, 2900.0), world(), &mut rng);
        assert!(field.items().iter().all(|p| p.pos != Vec2::ZERO));
    }
}
