//! High score leaderboard
//!
//! In-memory top 10. Plugs into the orchestrator as a `ScoreSink` and records
//! the final score once per run when the snapshot reports game over.

use serde::{Deserialize, Serialize};

use crate::platform::{ScoreSink, ScoreSnapshot};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// 1-based index of the run that produced it
    pub run: u32,
}

/// High score leaderboard, sorted by descending score
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
    /// Runs finished so far
    runs: u32,
    /// Set while the current run's game over has been recorded
    #[serde(skip)]
    recorded: bool,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed), None if it doesn't qualify
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Count a finished run and insert its score if it qualifies.
    /// Returns the rank achieved (1-indexed).
    pub fn add_score(&mut self, score: u64) -> Option<usize> {
        self.runs += 1;
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                run: self.runs,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn runs(&self) -> u32 {
        self.runs
    }
}

impl ScoreSink for HighScores {
    fn on_change(&mut self, snapshot: &ScoreSnapshot) {
        if !snapshot.game_over {
            // A fresh run re-arms recording
            self.recorded = false;
            return;
        }
        if self.recorded {
            return;
        }
        self.recorded = true;
        match self.add_score(snapshot.score) {
            Some(rank) => log::info!("New high score #{rank}: {}", snapshot.score),
            None => log::debug!("Score {} did not make the board", snapshot.score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn over(score: u64) -> ScoreSnapshot {
        ScoreSnapshot {
            score,
            lives: 0,
            game_over: true,
            paused: false,
        }
    }

    #[test]
    fn test_sorted_descending() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(100), Some(1));
        assert_eq!(scores.add_score(300), Some(1));
        assert_eq!(scores.add_score(200), Some(2));
        let order: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(order, vec![300, 200, 100]);
        assert_eq!(scores.entries[0].run, 2);
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(0), None);
        assert!(scores.is_empty());
        assert_eq!(scores.runs(), 1);
    }

    #[test]
    fn test_board_is_capped() {
        let mut scores = HighScores::new();
        for s in 1..=12 {
            scores.add_score(s * 10);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(120));
        assert!(!scores.qualifies(30));
        assert_eq!(scores.potential_rank(35), Some(10));
    }

    #[test]
    fn test_sink_records_once_per_run() {
        let mut scores = HighScores::new();
        scores.on_change(&ScoreSnapshot {
            score: 50,
            lives: 1,
            game_over: false,
            paused: false,
        });
        assert!(scores.is_empty());

        scores.on_change(&over(500));
        scores.on_change(&over(500));
        assert_eq!(scores.entries.len(), 1);

        // Reset, then a second run ends
        scores.on_change(&ScoreSnapshot {
            score: 0,
            lives: 3,
            game_over: false,
            paused: false,
        });
        scores.on_change(&over(700));
        assert_eq!(scores.top_score(), Some(700));
        assert_eq!(scores.runs(), 2);
    }
}
