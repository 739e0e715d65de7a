//! Strategy definitions and execution

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::game::GameMode;
use crate::random::RandomSource;
use crate::round::Round;

/// A move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Cooperate,
    Defect,
}

impl Move {
    /// The other move.
    pub fn opposite(self) -> Self {
        match self {
            Move::Cooperate => Move::Defect,
            Move::Defect => Move::Cooperate,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Move::Cooperate => "cooperate",
            Move::Defect => "defect",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Move {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cooperate" => Ok(Move::Cooperate),
            "defect" => Ok(Move::Defect),
            other => Err(format!("unknown move: {}", other)),
        }
    }
}

/// Strategy an AI agent plays. Serialized by its display label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Cooperate first, then copy the human's last move.
    #[serde(rename = "Tit-for-Tat")]
    TitForTat,
    /// Cooperate until the human defects once, then always defect.
    #[serde(rename = "Grim Trigger")]
    GrimTrigger,
    /// Follow the human's overall cooperation rate.
    #[serde(rename = "Nash Equilibrium Mimic")]
    NashMimic,
    /// Build reputation early, defect near a known end.
    #[serde(rename = "Subgame Perfect Equilibrium")]
    SubgamePerfect,
    /// Weighted coin flip biased by trust.
    #[serde(rename = "Stochastic Strategy")]
    Stochastic,
    /// Generous above a trust threshold, wary below it.
    #[serde(rename = "Trust & Reputation-Based")]
    TrustBased,
    /// Keep what pays, flip what doesn't.
    #[serde(rename = "Evolutionary Strategy")]
    Evolutionary,
    /// Label with no known algorithm. Plays cooperate.
    #[serde(other)]
    Unrecognized,
}

impl Strategy {
    /// The assignable strategy pool.
    pub const ALL: [Strategy; 7] = [
        Strategy::TitForTat,
        Strategy::GrimTrigger,
        Strategy::NashMimic,
        Strategy::SubgamePerfect,
        Strategy::Stochastic,
        Strategy::TrustBased,
        Strategy::Evolutionary,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Strategy::TitForTat => "Tit-for-Tat",
            Strategy::GrimTrigger => "Grim Trigger",
            Strategy::NashMimic => "Nash Equilibrium Mimic",
            Strategy::SubgamePerfect => "Subgame Perfect Equilibrium",
            Strategy::Stochastic => "Stochastic Strategy",
            Strategy::TrustBased => "Trust & Reputation-Based",
            Strategy::Evolutionary => "Evolutionary Strategy",
            Strategy::Unrecognized => "Unrecognized",
        }
    }

    /// Map a label to a strategy. Unknown labels become `Unrecognized`.
    pub fn from_label(label: &str) -> Self {
        Strategy::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label.trim()))
            .unwrap_or(Strategy::Unrecognized)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything an agent can observe when choosing its move.
#[derive(Clone, Copy, Debug)]
pub struct DecisionContext<'a> {
    pub agent: &'a Agent,
    /// Round being decided (1-based)
    pub round: u32,
    /// Human's moves in rounds `1..round`
    pub human_history: &'a [Move],
    /// Resolved rounds `1..round`
    pub rounds: &'a [Round],
    pub mode: &'a GameMode,
}

/// Execute the agent's strategy for one round
pub fn decide<R: RandomSource + ?Sized>(ctx: &DecisionContext<'_>, rng: &mut R) -> Move {
    let last_human = ctx.human_history.last().copied();

    match ctx.agent.strategy {
        Strategy::TitForTat => execute_tit_for_tat(ctx.round, last_human),
        Strategy::GrimTrigger => execute_grim_trigger(ctx.human_history),
        Strategy::NashMimic => execute_nash_mimic(ctx.human_history, rng),
        Strategy::SubgamePerfect => {
            execute_subgame_perfect(ctx.round, ctx.mode, last_human, rng)
        }
        Strategy::Stochastic => execute_stochastic(ctx.agent.trust_level, rng),
        Strategy::TrustBased => execute_trust_based(ctx.agent.trust_level, rng),
        Strategy::Evolutionary => {
            execute_evolutionary(&ctx.agent.id, ctx.rounds, last_human, rng)
        }
        Strategy::Unrecognized => {
            tracing::warn!(agent = %ctx.agent.id, "unrecognized strategy, cooperating");
            Move::Cooperate
        }
    }
}

fn cooperate_with<R: RandomSource + ?Sized>(p: f64, rng: &mut R) -> Move {
    if rng.chance(p) {
        Move::Cooperate
    } else {
        Move::Defect
    }
}

/// Tit-for-Tat: cooperate in round 1, then mirror
fn execute_tit_for_tat(round: u32, last_human: Option<Move>) -> Move {
    if round <= 1 {
        return Move::Cooperate;
    }
    last_human.unwrap_or(Move::Cooperate)
}

/// Grim Trigger: one defection anywhere in history is enough
fn execute_grim_trigger(human_history: &[Move]) -> Move {
    if human_history.contains(&Move::Defect) {
        Move::Defect
    } else {
        Move::Cooperate
    }
}

/// Nash Equilibrium Mimic: follow a clear cooperation rate, hedge otherwise
fn execute_nash_mimic<R: RandomSource + ?Sized>(human_history: &[Move], rng: &mut R) -> Move {
    if let Some(rate) = cooperation_rate(human_history.iter().copied()) {
        if rate > 0.7 {
            return Move::Cooperate;
        }
        if rate < 0.3 {
            return Move::Defect;
        }
    }
    cooperate_with(0.6, rng)
}

/// Subgame Perfect: endgame defection, early reputation, mid-game mirroring
fn execute_subgame_perfect<R: RandomSource + ?Sized>(
    round: u32,
    mode: &GameMode,
    last_human: Option<Move>,
    rng: &mut R,
) -> Move {
    if mode.is_near_end(round) {
        return if rng.chance(0.7) {
            Move::Defect
        } else {
            Move::Cooperate
        };
    }
    if round <= 3 {
        return Move::Cooperate;
    }
    last_human.unwrap_or(Move::Cooperate)
}

/// Stochastic: base 60% cooperation shifted by trust
fn execute_stochastic<R: RandomSource + ?Sized>(trust_level: u8, rng: &mut R) -> Move {
    let p = (0.6 + (trust_level as f64 - 50.0) / 100.0).clamp(0.1, 0.9);
    cooperate_with(p, rng)
}

/// Trust & Reputation: threshold at 60
fn execute_trust_based<R: RandomSource + ?Sized>(trust_level: u8, rng: &mut R) -> Move {
    if trust_level > 60 {
        cooperate_with(0.8, rng)
    } else {
        cooperate_with(0.3, rng)
    }
}

/// Evolutionary: look at the last three rounds of this agent's own payoffs
fn execute_evolutionary<R: RandomSource + ?Sized>(
    agent_id: &str,
    rounds: &[Round],
    last_human: Option<Move>,
    rng: &mut R,
) -> Move {
    if rounds.is_empty() {
        return Move::Cooperate;
    }

    let recent = &rounds[rounds.len().saturating_sub(3)..];
    let total: u32 = recent
        .iter()
        .map(|r| r.agent_payoffs.get(agent_id).copied().unwrap_or(0) as u32)
        .sum();
    let average = total as f64 / recent.len() as f64;

    if average > 2.5 {
        let cooperations = recent
            .iter()
            .filter(|r| r.agent_choices.get(agent_id) == Some(&Move::Cooperate))
            .count();
        cooperate_with(cooperations as f64 / recent.len() as f64, rng)
    } else {
        match last_human {
            Some(Move::Cooperate) => Move::Defect,
            _ => Move::Cooperate,
        }
    }
}

/// Share of `Cooperate` in `moves`, `None` when empty.
pub fn cooperation_rate<I: IntoIterator<Item = Move>>(moves: I) -> Option<f64> {
    let (coop, total) = moves.into_iter().fold((0usize, 0usize), |(c, t), m| {
        (c + (m == Move::Cooperate) as usize, t + 1)
    });
    if total == 0 {
        None
    } else {
        Some(coop as f64 / total as f64)
    }
}

/// Get a human-readable description of a strategy
pub fn describe_strategy(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::TitForTat => "Cooperates first, then copies your previous move.",
        Strategy::GrimTrigger => "Cooperates until you defect once, then defects forever.",
        Strategy::NashMimic => {
            "Cooperates if you mostly cooperate, defects if you mostly defect, hedges otherwise."
        }
        Strategy::SubgamePerfect => {
            "Builds reputation early, mirrors you mid-game, and turns on you near a known end."
        }
        Strategy::Stochastic => "Flips a weighted coin that leans toward cooperation as trust grows.",
        Strategy::TrustBased => "Usually cooperates while trust is above 60, usually defects below.",
        Strategy::Evolutionary => {
            "Keeps doing what has paid off recently, and reverses course when it hasn't."
        }
        Strategy::Unrecognized => "Unknown strategy. Always cooperates.",
    }
}
