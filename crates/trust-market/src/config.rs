//! Game configuration
//!
//! Produced by the setup form and validated before any session exists.

use round_logic::{AgentProfile, GameMode, SeededRng, Strategy};
use serde::{Deserialize, Serialize};

use crate::error::{require, ConfigError};

/// Largest table: one seat per built-in profile, capped by the strategy pool
pub const MAX_AGENTS: usize = if AgentProfile::BUILTIN.len() < Strategy::ALL.len() {
    AgentProfile::BUILTIN.len()
} else {
    Strategy::ALL.len()
};

/// Settings chosen before a game starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of AI opponents (1 to `MAX_AGENTS`)
    pub agent_count: u8,
    /// Discussion length per round
    pub discussion_seconds: u32,
    /// Finite or stochastic ending
    pub mode: GameMode,
    /// Show insights and reflection prompts downstream. No effect on play.
    pub educational_mode: bool,
    /// Fixed seed for reproducible games. Drawn from entropy when absent.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            agent_count: 3,
            discussion_seconds: 60,
            mode: GameMode::default(),
            educational_mode: false,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Parses and validates configuration from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require!(
            (1..=MAX_AGENTS).contains(&(self.agent_count as usize)),
            ConfigError::AgentCount { count: self.agent_count, max: MAX_AGENTS }
        );
        require!(self.discussion_seconds > 0, ConfigError::DiscussionSeconds);

        match self.mode {
            GameMode::Finite { max_rounds } => {
                require!(max_rounds > 0, ConfigError::MaxRounds);
            }
            GameMode::Stochastic(ending) => {
                let p = ending.end_probability;
                require!(p > 0.0 && p <= 1.0, ConfigError::EndProbability(p));
            }
        }

        Ok(())
    }

    /// The session's random source: seeded if configured, otherwise from entropy.
    pub(crate) fn rng(&self) -> SeededRng {
        SeededRng::from_u64(self.seed.unwrap_or_else(entropy_seed))
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn entropy_seed() -> u64 {
    rand::random()
}

#[cfg(target_arch = "wasm32")]
fn entropy_seed() -> u64 {
    // Math.random carries 53 bits
    (js_sys::Math::random() * (1u64 << 53) as f64) as u64
}
