//! Discussion phase: countdown and chat

use round_logic::ChatMessage;

use crate::error::{require, SessionError};
use crate::state::{GameSession, Phase};

/// Sender name on the human's chat lines
pub const HUMAN_SENDER: &str = "You";

impl GameSession {
    /// One second passes. At zero the table moves to the decision.
    pub fn tick_discussion_timer(&self) -> Result<GameSession, SessionError> {
        self.require_phase("tick the discussion timer", Phase::Discussion)?;

        let mut next = self.clone();
        next.time_remaining = next.time_remaining.saturating_sub(1);
        if next.time_remaining == 0 {
            next.phase = Phase::Decision;
            tracing::debug!(round = next.current_round, "discussion timed out");
        }
        Ok(next)
    }

    /// End the discussion now.
    pub fn skip_discussion(&self) -> Result<GameSession, SessionError> {
        self.require_phase("skip the discussion", Phase::Discussion)?;

        let mut next = self.clone();
        next.phase = Phase::Decision;
        tracing::debug!(round = next.current_round, remaining = next.time_remaining, "discussion skipped");
        Ok(next)
    }

    /// Add a human chat line. Has no effect on play.
    pub fn post_message(&self, text: &str) -> Result<GameSession, SessionError> {
        self.require_phase("chat", Phase::Discussion)?;
        let text = text.trim();
        require!(!text.is_empty(), SessionError::EmptyMessage);

        let mut next = self.clone();
        next.discussion.push(ChatMessage {
            sender: HUMAN_SENDER.to_string(),
            agent_id: None,
            text: text.to_string(),
            elapsed: self.discussion_elapsed(),
        });
        Ok(next)
    }

    /// Add an agent chat line. Has no effect on play.
    pub fn post_agent_message(&self, agent_id: &str, text: &str) -> Result<GameSession, SessionError> {
        self.require_phase("chat", Phase::Discussion)?;
        let text = text.trim();
        require!(!text.is_empty(), SessionError::EmptyMessage);

        let mut next = self.clone();
        let elapsed = next.discussion_elapsed();
        let agent = next
            .agents
            .iter_mut()
            .find(|a| a.id == agent_id)
            .ok_or_else(|| SessionError::UnknownAgent(agent_id.to_string()))?;
        agent.messages_sent += 1;

        let message = ChatMessage {
            sender: agent.name.clone(),
            agent_id: Some(agent.id.clone()),
            text: text.to_string(),
            elapsed,
        };
        next.discussion.push(message);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn session(seconds: u32) -> GameSession {
        let config = GameConfig { discussion_seconds: seconds, seed: Some(1), ..Default::default() };
        GameSession::start_game(config, &["topic"]).unwrap()
    }

    #[test]
    fn test_tick_counts_down_then_decides() {
        let mut s = session(3);
        s = s.tick_discussion_timer().unwrap();
        assert_eq!(s.time_remaining(), 2);
        assert_eq!(s.phase(), Phase::Discussion);
        s = s.tick_discussion_timer().unwrap().tick_discussion_timer().unwrap();
        assert_eq!(s.time_remaining(), 0);
        assert_eq!(s.phase(), Phase::Decision);
        assert!(s.tick_discussion_timer().is_err());
    }

    #[test]
    fn test_skip_keeps_remaining_time() {
        let s = session(30).tick_discussion_timer().unwrap().skip_discussion().unwrap();
        assert_eq!(s.phase(), Phase::Decision);
        assert_eq!(s.time_remaining(), 29);
    }

    #[test]
    fn test_chat_is_logged_with_elapsed_time() {
        let s = session(30)
            .tick_discussion_timer()
            .unwrap()
            .tick_discussion_timer()
            .unwrap()
            .post_message("  I will cooperate  ")
            .unwrap();
        let line = &s.discussion()[0];
        assert_eq!(line.sender, HUMAN_SENDER);
        assert_eq!(line.text, "I will cooperate");
        assert_eq!(line.elapsed, 2);
        assert!(!line.is_ai());
    }

    #[test]
    fn test_chat_does_not_touch_game_state() {
        let before = session(30);
        let after = before.post_message("hello").unwrap();
        assert_eq!(after.agents(), before.agents());
        assert_eq!(after.rounds(), before.rounds());
        assert_eq!(after.time_remaining(), before.time_remaining());
        assert_eq!(after.rng, before.rng);
    }

    #[test]
    fn test_agent_chat_counts_messages() {
        let s = session(30);
        let id = s.agents()[0].id.clone();
        let s = s.post_agent_message(&id, "Trust me.").unwrap();
        assert_eq!(s.agent(&id).unwrap().messages_sent, 1);
        assert!(s.discussion()[0].is_ai());
        assert_eq!(s.discussion()[0].sender, s.agents()[0].name);
    }

    #[test]
    fn test_chat_rejections() {
        let s = session(30);
        assert!(matches!(s.post_message("   "), Err(SessionError::EmptyMessage)));
        assert!(matches!(
            s.post_agent_message("agent_99", "hi"),
            Err(SessionError::UnknownAgent(_))
        ));
        let decided = s.skip_discussion().unwrap();
        assert!(matches!(decided.post_message("late"), Err(SessionError::InvalidPhase { .. })));
    }
}
