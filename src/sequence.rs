// Action GBA: Level Sequence Generator

use std::time::Duration;

use rand::Rng;

use crate::config::{ConfigError, DifficultyProfile, GameConfig};
use crate::events::{Difficulty, Move};

/// One level's worth of moves and the time allowed for each.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSpec {
    pub sequence: Vec<Move>,
    pub per_move_time: Duration,
}

/// Level 1 has `base_moves`; each later level adds one.
pub fn sequence_length(profile: &DifficultyProfile, level: u32) -> u32 {
    profile.base_moves + level.saturating_sub(1)
}

pub struct SequenceGenerator<'c, R> {
    config: &'c GameConfig,
    rng: R,
}

impl<'c, R: Rng> SequenceGenerator<'c, R> {
    pub fn new(config: &'c GameConfig, rng: R) -> Self {
        Self { config, rng }
    }

    /// Build the move list for `level` (1-based) at `difficulty`.
    ///
    /// Moves are drawn independently and uniformly; repeats are allowed.
    /// Only an unvalidated profile with zero base moves can fail here.
    pub fn build(&mut self, difficulty: Difficulty, level: u32) -> Result<LevelSpec, ConfigError> {
        let config = self.config;
        let profile = config.profile(difficulty);
        let len = sequence_length(profile, level);
        if len == 0 {
            return Err(ConfigError::EmptySequence(difficulty));
        }

        let sequence = (0..len).map(|_| self.rng.random::<Move>()).collect();
        Ok(LevelSpec {
            sequence,
            per_move_time: profile.level_time / len,
        })
    }
}
