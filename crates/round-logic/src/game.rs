//! Game length: finite or stochastic ending

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;

/// Probabilistic ending parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StochasticEnding {
    /// No ending draw before this round has been played
    pub min_rounds: u32,
    /// Chance the game ends after each eligible round
    pub end_probability: f64,
}

impl Default for StochasticEnding {
    fn default() -> Self {
        Self { min_rounds: 3, end_probability: 0.05 }
    }
}

/// How the game decides it is over
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GameMode {
    /// Ends after a fixed number of rounds
    Finite { max_rounds: u32 },
    /// May end after any round once the minimum is reached
    Stochastic(StochasticEnding),
}

impl Default for GameMode {
    fn default() -> Self {
        GameMode::Finite { max_rounds: 10 }
    }
}

impl GameMode {
    pub fn stochastic() -> Self {
        GameMode::Stochastic(StochasticEnding::default())
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, GameMode::Finite { .. })
    }

    /// Within the endgame window of a finite game: the last three rounds.
    ///
    /// `round >= max_rounds - 2`, so a 10-round game's endgame is rounds 8, 9
    /// and 10. Agents that defect near a known end start one round earlier
    /// than "last two" would suggest.
    pub fn is_near_end(&self, round: u32) -> bool {
        match self {
            GameMode::Finite { max_rounds } => round + 2 >= *max_rounds,
            GameMode::Stochastic(_) => false,
        }
    }

    /// Whether the game is over once `round` has been played.
    ///
    /// Draws only when a stochastic game is past its minimum length.
    pub fn ends_after<R: RandomSource + ?Sized>(&self, round: u32, rng: &mut R) -> bool {
        match self {
            GameMode::Finite { max_rounds } => round >= *max_rounds,
            GameMode::Stochastic(ending) => {
                round >= ending.min_rounds && rng.chance(ending.end_probability)
            }
        }
    }

    /// Expected number of rounds played
    ///
    /// Geometric tail after the minimum for stochastic games.
    pub fn expected_rounds(&self) -> f64 {
        match self {
            GameMode::Finite { max_rounds } => *max_rounds as f64,
            GameMode::Stochastic(ending) => {
                if ending.end_probability <= 0.0 {
                    return f64::INFINITY;
                }
                let p = ending.end_probability.min(1.0);
                ending.min_rounds.max(1) as f64 + (1.0 - p) / p
            }
        }
    }
}
