//! Decision and results phases

use round_logic::{resolve_round, Move, RoundInput};

use crate::content::TopicProvider;
use crate::error::{require, SessionError};
use crate::state::{GameSession, Phase};

impl GameSession {
    /// Lock in the human's move and resolve the round against every agent.
    pub fn submit_choice(&self, choice: Move) -> Result<GameSession, SessionError> {
        self.require_phase("submit a choice", Phase::Decision)?;
        require!(
            self.rounds.len() as u32 + 1 == self.current_round,
            SessionError::RoundAlreadyResolved(self.current_round)
        );

        let mut next = self.clone();
        let discussion = std::mem::take(&mut next.discussion);
        let input = RoundInput {
            round: self.current_round,
            agents: &self.agents,
            history: &self.rounds,
            mode: &self.config.mode,
        };
        let resolved = resolve_round(&input, choice, discussion, &mut next.rng);

        if let Some(event) = resolved.round.event {
            if !next.concepts_encountered.contains(&event) {
                next.concepts_encountered.push(event);
            }
        }
        next.agents = resolved.agents;
        next.rounds.push(resolved.round);
        next.phase = Phase::Results;

        Ok(next)
    }

    /// Leave the results screen: either open the next round or end the game.
    pub fn continue_to_next_round(
        &self,
        topics: &dyn TopicProvider,
    ) -> Result<GameSession, SessionError> {
        self.require_phase("continue", Phase::Results)?;

        let mut next = self.clone();
        let mode = next.config.mode;
        if mode.ends_after(next.current_round, &mut next.rng) {
            next.phase = Phase::Debrief;
            next.ended = true;
            tracing::info!(
                rounds = next.rounds.len(),
                total = next.total_payoff(),
                "game over"
            );
            return Ok(next);
        }

        let round = next.current_round + 1;
        next.enter_discussion(round, topics);
        Ok(next)
    }
}
