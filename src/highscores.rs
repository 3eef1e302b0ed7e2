//! Session leaderboard
//!
//! Keeps the best runs of the current session in memory. Nothing is written
//! to storage; closing the game forgets them.

use serde::{Deserialize, Serialize};

/// Maximum number of runs to keep
pub const MAX_SESSION_SCORES: usize = 10;

/// One finished run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunEntry {
    pub score: u32,
    /// Game speed reached by the end of the run
    pub game_speed: f32,
    /// Run number within the session, starting at 1
    pub run: u32,
}

/// Best runs of this session, highest score first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionScores {
    pub entries: Vec<RunEntry>,
    runs: u32,
}

impl SessionScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_SESSION_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Record a finished run. Returns the rank achieved (1-indexed), if any.
    pub fn add_score(&mut self, score: u32, game_speed: f32) -> Option<usize> {
        self.runs += 1;
        if !self.qualifies(score) {
            return None;
        }

        let entry = RunEntry {
            score,
            game_speed,
            run: self.runs,
        };
        // Ties keep the earlier run ahead
        let rank = match self.entries.iter().position(|e| score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_SESSION_SCORES);
        log::info!("Run {} scored {} (rank {})", self.runs, score, rank);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Runs finished this session, qualifying or not
    pub fn runs(&self) -> u32 {
        self.runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_never_qualifies() {
        let mut scores = SessionScores::new();
        assert_eq!(scores.add_score(0, 10.0), None);
        assert!(scores.is_empty());
        assert_eq!(scores.runs(), 1);
    }

    #[test]
    fn test_sorted_descending_with_ranks() {
        let mut scores = SessionScores::new();
        assert_eq!(scores.add_score(30, 10.0), Some(1));
        assert_eq!(scores.add_score(50, 11.0), Some(1));
        assert_eq!(scores.add_score(40, 10.5), Some(2));
        assert_eq!(scores.top_score(), Some(50));
        let ordered: Vec<u32> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(ordered, vec![50, 40, 30]);
        assert_eq!(scores.entries[0].run, 2);
    }

    #[test]
    fn test_board_is_capped() {
        let mut scores = SessionScores::new();
        for s in 1..=MAX_SESSION_SCORES as u32 {
            scores.add_score(s * 10, 10.0);
        }
        assert!(!scores.qualifies(5));
        assert_eq!(scores.add_score(5, 10.0), None);
        assert_eq!(scores.add_score(15, 10.0), Some(MAX_SESSION_SCORES));
        assert_eq!(scores.entries.len(), MAX_SESSION_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(15));
    }
}
