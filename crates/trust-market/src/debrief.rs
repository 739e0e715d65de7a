//! End-of-game summary: score, grade and strategy reveal

use std::fmt;

use round_logic::{
    cooperation_rate, describe_strategy, human_history, GameMode, Move, RoundEvent, Strategy,
};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::state::{GameSession, Phase};

/// Letter grade from the average score per round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn from_average(average: f64) -> Self {
        match average {
            a if a >= 4.0 => Grade::S,
            a if a >= 3.0 => Grade::A,
            a if a >= 2.0 => Grade::B,
            a if a >= 1.5 => Grade::C,
            _ => Grade::D,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        };
        f.write_str(s)
    }
}

/// What an agent was really doing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyReveal {
    pub agent_id: String,
    pub name: String,
    pub avatar: String,
    pub strategy: Strategy,
    pub description: String,
    pub final_trust: u8,
    /// Trust ended above 50
    pub would_play_again: bool,
    /// Share of rounds this agent cooperated, if any were played
    pub cooperation_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebriefSummary {
    pub total_score: u32,
    pub rounds_played: u32,
    pub cooperations: u32,
    pub defections: u32,
    /// Human's cooperation share, 0 when no rounds were played
    pub cooperation_rate: f64,
    /// Human score per round, summed over the table
    pub average_per_round: f64,
    pub grade: Grade,
    pub reveals: Vec<StrategyReveal>,
    pub concepts: Vec<RoundEvent>,
    /// Short remarks on how the human played
    pub commentary: Vec<String>,
}

/// Remarks on cooperation share, score per round and game mode.
pub fn commentary(cooperation_rate: f64, average_per_round: f64, mode: &GameMode) -> Vec<String> {
    let mut remarks = Vec::new();

    let style = if cooperation_rate > 0.7 {
        "Your high cooperation rate built strong trust with most AI agents."
    } else if cooperation_rate < 0.3 {
        "Your frequent defections triggered defensive strategies from AI agents."
    } else {
        "You showed a balanced approach between cooperation and self-interest."
    };
    remarks.push(style.to_string());

    if average_per_round > 3.0 {
        remarks.push("Your strategic decisions resulted in above-average payoffs.".to_string());
    } else if average_per_round < 2.0 {
        remarks.push("Consider the long-term implications of repeated interactions.".to_string());
    }

    if !mode.is_finite() {
        remarks.push("The stochastic ending added uncertainty to your strategic planning.".to_string());
    }

    remarks
}

impl DebriefSummary {
    /// Summarize any session, finished or not.
    pub fn from_session(session: &GameSession) -> Self {
        let rounds = session.rounds();
        let history = human_history(rounds);
        let cooperations = history.iter().filter(|m| **m == Move::Cooperate).count() as u32;
        let rounds_played = rounds.len() as u32;
        let total_score = session.total_payoff();

        let average_per_round = if rounds_played == 0 {
            0.0
        } else {
            total_score as f64 / rounds_played as f64
        };

        let reveals = session
            .agents()
            .iter()
            .map(|agent| StrategyReveal {
                agent_id: agent.id.clone(),
                name: agent.name.clone(),
                avatar: agent.avatar.clone(),
                strategy: agent.strategy,
                description: describe_strategy(agent.strategy).to_string(),
                final_trust: agent.trust_level,
                would_play_again: agent.trust_level > 50,
                cooperation_rate: cooperation_rate(
                    rounds.iter().filter_map(|r| r.agent_choices.get(&agent.id).copied()),
                ),
            })
            .collect();

        let cooperation_share = cooperation_rate(history).unwrap_or(0.0);

        DebriefSummary {
            total_score,
            rounds_played,
            cooperations,
            defections: rounds_played - cooperations,
            cooperation_rate: cooperation_share,
            average_per_round,
            grade: Grade::from_average(average_per_round),
            reveals,
            concepts: session.concepts_encountered().to_vec(),
            commentary: commentary(cooperation_share, average_per_round, session.mode()),
        }
    }
}

impl GameSession {
    /// Final summary. Only available once the game is over.
    pub fn debrief(&self) -> Result<DebriefSummary, SessionError> {
        self.require_phase("debrief", Phase::Debrief)?;
        Ok(DebriefSummary::from_session(self))
    }
}
