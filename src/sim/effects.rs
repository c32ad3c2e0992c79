//! Timed effects ledger
//!
//! Only schedules: which effects are live, their magnitude and deadline. The
//! system that cares about an effect reads it and applies the consequence.

use serde::{Deserialize, Serialize};

/// Every timed effect a pickup can grant or inflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    SpeedBoost,
    Invincibility,
    DoublePoints,
    GrowthBonus,
    EnemySlow,
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

impl EffectKind {
    pub const COUNT: usize = 18;

    pub const ALL: [EffectKind; Self::COUNT] = [
        EffectKind::SpeedBoost,
        EffectKind::Invincibility,
        EffectKind::DoublePoints,
        EffectKind::GrowthBonus,
        EffectKind::EnemySlow,
        EffectKind::InvertedControls,
        EffectKind::FogOfWar,
        EffectKind::InputDelay,
        EffectKind::RandomTurning,
        EffectKind::BonusBlock,
        EffectKind::GlobalSlow,
        EffectKind::Freeze,
        EffectKind::InvisibleWalls,
        EffectKind::ControlStutter,
        EffectKind::ReversedControls,
        EffectKind::EnemyAttraction,
        EffectKind::PositionReveal,
        EffectKind::Bleed,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Effects that hurt the player
    pub fn is_harmful(self) -> bool {
        !matches!(
            self,
            EffectKind::SpeedBoost
                | EffectKind::Invincibility
                | EffectKind::DoublePoints
                | EffectKind::GrowthBonus
                | EffectKind::EnemySlow
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            EffectKind::SpeedBoost => "Speed",
            EffectKind::Invincibility => "Shield",
            EffectKind::DoublePoints => "x2",
            EffectKind::GrowthBonus => "Growth",
            EffectKind::EnemySlow => "Enemy slow",
            EffectKind::InvertedControls => "Inverted",
            EffectKind::FogOfWar => "Fog",
            EffectKind::InputDelay => "Lag",
            EffectKind::RandomTurning => "Drunk",
            EffectKind::BonusBlock => "Blocked",
            EffectKind::GlobalSlow => "Slow",
            EffectKind::Freeze => "Frozen",
            EffectKind::InvisibleWalls => "No walls",
            EffectKind::ControlStutter => "Stutter",
            EffectKind::ReversedControls => "Reversed",
            EffectKind::EnemyAttraction => "Bait",
            EffectKind::PositionReveal => "Revealed",
            EffectKind::Bleed => "Bleed",
        }
    }
}

/// One effect's schedule entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectSlot {
    pub active: bool,
    pub value: f32,
    /// Survival time (seconds) at which the effect ends
    pub expires_at: f32,
}

/// Fixed table of effect slots, one per kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    slots: [EffectSlot; EffectKind::COUNT],
}

impl ActiveEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start or refresh an effect. A refresh keeps the later deadline.
    pub fn apply(&mut self, kind: EffectKind, value: f32, now: f32, duration: f32) {
        let slot = &mut self.slots[kind.index()];
        let expires_at = now + duration.max(0.0);
        slot.expires_at = if slot.active {
            slot.expires_at.max(expires_at)
        } else {
            expires_at
        };
        slot.value = value;
        slot.active = true;
    }

    pub fn remove(&mut self, kind: EffectKind) {
        self.slots[kind.index()] = EffectSlot::default();
    }

    #[inline]
    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.slots[kind.index()].active
    }

    pub fn get(&self, kind: EffectKind) -> Option<f32> {
        let slot = &self.slots[kind.index()];
        slot.active.then_some(slot.value)
    }

    pub fn value_or(&self, kind: EffectKind, default: f32) -> f32 {
        self.get(kind).unwrap_or(default)
    }

    /// Seconds left, 0 when inactive
    pub fn remaining(&self, kind: EffectKind, now: f32) -> f32 {
        let slot = &self.slots[kind.index()];
        if slot.active {
            (slot.expires_at - now).max(0.0)
        } else {
            0.0
        }
    }

    /// Deactivate everything past its deadline; returns what ended
    pub fn purge_expired(&mut self, now: f32) -> Vec<EffectKind> {
        let mut ended = Vec::new();
        for kind in EffectKind::ALL {
            let slot = &mut self.slots[kind.index()];
            if slot.active && now >= slot.expires_at {
                *slot = EffectSlot::default();
                ended.push(kind);
            }
        }
        ended
    }

    pub fn clear(&mut self) {
        self.slots = [EffectSlot::default(); EffectKind::COUNT];
    }

    /// Currently active effects with their slots
    pub fn iter_active(&self) -> impl Iterator<Item = (EffectKind, &EffectSlot)> {
        EffectKind::ALL
            .into_iter()
            .map(|kind| (kind, &self.slots[kind.index()]))
            .filter(|(_, slot)| slot.active)
    }
}
