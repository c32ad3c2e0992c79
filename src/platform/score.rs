//! Score reporting
//!
//! The orchestrator pushes a snapshot to an injected sink whenever score,
//! lives or phase flags change. Storage of scores is the sink's concern.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub score: u64,
    pub lives: u8,
    pub game_over: bool,
    pub paused: bool,
}

pub trait ScoreSink {
    fn on_change(&mut self, snapshot: &ScoreSnapshot);
}

impl<F> ScoreSink for F
where
    F: FnMut(&ScoreSnapshot),
{
    fn on_change(&mut self, snapshot: &ScoreSnapshot) {
        self(snapshot)
    }
}

/// Discards every snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ScoreSink for NullSink {
    fn on_change(&mut self, _snapshot: &ScoreSnapshot) {}
}
