//! Session state definitions

use std::fmt;

use round_logic::{Agent, ChatMessage, GameMode, Round, RoundEvent, SeededRng};
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

/// Session state machine
///
/// `Setup -> Discussion -> Decision -> Results -> (Discussion | Debrief)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Setup,
    Discussion,
    Decision,
    Results,
    Debrief,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Discussion => "discussion",
            Phase::Decision => "decision",
            Phase::Results => "results",
            Phase::Debrief => "debrief",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One game, from setup to debrief
///
/// A value: every transition returns a new session and leaves the old one
/// intact, so a rejected transition can never leave half-applied state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub(crate) phase: Phase,
    /// 1-based
    pub(crate) current_round: u32,
    /// Append-only
    pub(crate) rounds: Vec<Round>,
    pub(crate) agents: Vec<Agent>,
    pub(crate) discussion_topic: String,
    /// Seconds left in the current discussion
    pub(crate) time_remaining: u32,
    pub(crate) config: GameConfig,
    pub(crate) ended: bool,
    /// Chat for the discussion in progress
    pub(crate) discussion: Vec<ChatMessage>,
    /// Distinct events seen this game, in order of first appearance
    pub(crate) concepts_encountered: Vec<RoundEvent>,
    /// Bumped for every new game so stale timers can tell they are stale
    pub(crate) generation: u64,
    pub(crate) rng: SeededRng,
}

impl GameSession {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn last_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn discussion_topic(&self) -> &str {
        &self.discussion_topic
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn mode(&self) -> &GameMode {
        &self.config.mode
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn discussion(&self) -> &[ChatMessage] {
        &self.discussion
    }

    pub fn concepts_encountered(&self) -> &[RoundEvent] {
        &self.concepts_encountered
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Human's running total
    pub fn total_payoff(&self) -> u32 {
        self.rounds.last().map_or(0, |r| r.cumulative_payoff)
    }

    /// Seconds elapsed in the current discussion
    pub fn discussion_elapsed(&self) -> u32 {
        self.config.discussion_seconds.saturating_sub(self.time_remaining)
    }

    /// Identifies the discussion a timer was started for.
    pub fn stamp(&self) -> DiscussionStamp {
        DiscussionStamp {
            generation: self.generation,
            round: self.current_round,
        }
    }
}

/// Everything a front end renders, without the random generator state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView<'a> {
    pub phase: Phase,
    pub current_round: u32,
    pub rounds: &'a [Round],
    pub agents: &'a [Agent],
    pub discussion_topic: &'a str,
    pub time_remaining: u32,
    pub config: &'a GameConfig,
    pub ended: bool,
    pub discussion: &'a [ChatMessage],
    pub concepts_encountered: &'a [RoundEvent],
    pub generation: u64,
    pub total_payoff: u32,
}

impl GameSession {
    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            phase: self.phase,
            current_round: self.current_round,
            rounds: &self.rounds,
            agents: &self.agents,
            discussion_topic: &self.discussion_topic,
            time_remaining: self.time_remaining,
            config: &self.config,
            ended: self.ended,
            discussion: &self.discussion,
            concepts_encountered: &self.concepts_encountered,
            generation: self.generation,
            total_payoff: self.total_payoff(),
        }
    }
}

/// Which game and round a discussion belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiscussionStamp {
    pub generation: u64,
    pub round: u32,
}

impl DiscussionStamp {
    /// True while `session` is still in the discussion this stamp was taken from.
    pub fn is_current(&self, session: &GameSession) -> bool {
        session.phase == Phase::Discussion && session.stamp() == *self
    }
}
