//! Trust Market
//!
//! Game session for the Iterated Prisoner's Dilemma: one human against a
//! table of AI agents, round after round of discussion, decision and results.
//! This crate is compiled to:
//! - Native, with a tokio driver for the discussion clock (`runtime`)
//! - WASM, with the page driving the clock (`wasm`)
//!
//! The session itself is a plain value. Every transition borrows it and
//! returns the next session or a [`SessionError`]:
//!
//! ```
//! use trust_market::{GameConfig, GameSession, Move, Phase};
//!
//! let topics = ["Can a promise bind a rational player?"];
//! let config = GameConfig { agent_count: 2, seed: Some(7), ..Default::default() };
//!
//! let session = GameSession::start_game(config, &topics).unwrap();
//! let session = session.skip_discussion().unwrap();
//! let session = session.submit_choice(Move::Cooperate).unwrap();
//! assert_eq!(session.phase(), Phase::Results);
//! assert_eq!(session.rounds().len(), 1);
//! ```

mod config;
mod content;
mod debrief;
mod error;
mod state;
mod transitions;

#[cfg(feature = "runtime")]
mod timers;

#[cfg(feature = "wasm")]
mod wasm;

pub use config::{GameConfig, MAX_AGENTS};
pub use content::{BanterProvider, TopicProvider};
pub use debrief::{commentary, DebriefSummary, Grade, StrategyReveal};
pub use error::{ConfigError, SessionError};
pub use state::{DiscussionStamp, GameSession, Phase, SessionView};
pub use transitions::discussion::HUMAN_SENDER;
pub use transitions::SessionEvent;

#[cfg(feature = "runtime")]
pub use timers::{SessionDriver, SharedBanter, SharedTopics};

pub use round_logic::{
    payoff, Agent, ChatMessage, GameMode, Move, Payoff, Round, RoundEvent, StochasticEnding,
    Strategy,
};
