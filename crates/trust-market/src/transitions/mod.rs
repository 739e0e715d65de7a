//! Phase transition handlers
//!
//! Each handler takes the current session by reference and returns the next
//! one. Handlers validate the phase first and never touch `self`.

pub mod discussion;
pub mod round;
pub mod setup;

use round_logic::{Move, RandomSource};

use crate::content::TopicProvider;
use crate::error::SessionError;
use crate::state::{GameSession, Phase};

/// Anything the host can ask the session to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Leave setup and open round 1
    Begin,
    /// One second of discussion elapsed
    Tick,
    /// End discussion early
    SkipDiscussion,
    /// Human chat line
    Chat(String),
    /// Agent chat line
    AgentChat { agent_id: String, text: String },
    /// Human's move for the current round
    Choose(Move),
    /// Leave the results screen
    Continue,
    /// Start over from debrief
    PlayAgain,
}

impl GameSession {
    /// Dispatch an event to its transition handler.
    pub fn apply(
        &self,
        event: SessionEvent,
        topics: &dyn TopicProvider,
    ) -> Result<GameSession, SessionError> {
        match event {
            SessionEvent::Begin => self.begin(topics),
            SessionEvent::Tick => self.tick_discussion_timer(),
            SessionEvent::SkipDiscussion => self.skip_discussion(),
            SessionEvent::Chat(text) => self.post_message(&text),
            SessionEvent::AgentChat { agent_id, text } => self.post_agent_message(&agent_id, &text),
            SessionEvent::Choose(choice) => self.submit_choice(choice),
            SessionEvent::Continue => self.continue_to_next_round(topics),
            SessionEvent::PlayAgain => self.reset_for_new_game(topics),
        }
    }

    pub(crate) fn require_phase(
        &self,
        action: &'static str,
        expected: Phase,
    ) -> Result<(), SessionError> {
        if self.phase != expected {
            tracing::warn!(action, expected = %expected, found = %self.phase, "rejected transition");
            return Err(SessionError::InvalidPhase { action, expected, found: self.phase });
        }
        Ok(())
    }

    /// Open the discussion for `round` on this (already cloned) session.
    pub(crate) fn enter_discussion(&mut self, round: u32, topics: &dyn TopicProvider) {
        self.phase = Phase::Discussion;
        self.current_round = round;
        self.time_remaining = self.config.discussion_seconds;
        self.discussion.clear();
        self.discussion_topic = topics.topic(round, self.rng.next_unit());

        tracing::debug!(round, topic = %self.discussion_topic, "discussion opened");
    }
}
