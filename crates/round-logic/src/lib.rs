//! Round Logic for Trust Market
//!
//! Core game logic for the Iterated Prisoner's Dilemma played by one human
//! against a table of AI agents. Everything here is deterministic given a
//! random source, so the session layer and tests can replay any game.

mod agent;
mod game;
mod random;
mod round;
mod strategy;
mod trust;

use serde::{Deserialize, Serialize};

pub use agent::{assign_roster, Agent, AgentProfile, INITIAL_TRUST};
pub use game::{GameMode, StochasticEnding};
pub use random::{RandomSource, ScriptedDraws, SeededRng};
pub use round::{human_history, resolve_round, ChatMessage, ResolvedRound, Round, RoundEvent, RoundInput};
pub use strategy::{cooperation_rate, decide, describe_strategy, DecisionContext, Move, Strategy};
pub use trust::update_trust;

/// Points for one pairing: the human against one agent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Payoff {
    pub human: u8,
    pub ai: u8,
}

/// Payoff matrix for the Prisoner's Dilemma
pub fn payoff(human: Move, ai: Move) -> Payoff {
    let (human, ai) = match (human, ai) {
        (Move::Cooperate, Move::Cooperate) => (3, 3),
        (Move::Cooperate, Move::Defect) => (0, 5),
        (Move::Defect, Move::Cooperate) => (5, 0),
        (Move::Defect, Move::Defect) => (1, 1),
    };
    Payoff { human, ai }
}
