//! Game lifecycle: setup, start and play-again

use round_logic::assign_roster;

use crate::config::GameConfig;
use crate::content::TopicProvider;
use crate::error::SessionError;
use crate::state::{GameSession, Phase};

impl GameSession {
    /// Validate `config` and create a session waiting in setup.
    pub fn configure(config: GameConfig) -> Result<GameSession, SessionError> {
        config.validate()?;
        let rng = config.rng();

        Ok(GameSession {
            phase: Phase::Setup,
            current_round: 1,
            rounds: Vec::new(),
            agents: Vec::new(),
            discussion_topic: String::new(),
            time_remaining: config.discussion_seconds,
            config,
            ended: false,
            discussion: Vec::new(),
            concepts_encountered: Vec::new(),
            generation: 0,
            rng,
        })
    }

    /// Seat the agents and open the first discussion.
    pub fn begin(&self, topics: &dyn TopicProvider) -> Result<GameSession, SessionError> {
        self.require_phase("begin the game", Phase::Setup)?;

        let mut next = self.clone();
        next.agents = assign_roster(next.config.agent_count as usize, &mut next.rng);
        next.enter_discussion(1, topics);

        tracing::info!(
            agents = next.agents.len(),
            mode = ?next.config.mode,
            generation = next.generation,
            "game started"
        );
        Ok(next)
    }

    /// `configure` followed by `begin`.
    pub fn start_game(
        config: GameConfig,
        topics: &dyn TopicProvider,
    ) -> Result<GameSession, SessionError> {
        GameSession::configure(config)?.begin(topics)
    }

    /// Play again with the same settings: new table, new strategies, empty history.
    pub fn reset_for_new_game(
        &self,
        topics: &dyn TopicProvider,
    ) -> Result<GameSession, SessionError> {
        self.require_phase("play again", Phase::Debrief)?;

        let mut next = self.clone();
        next.generation += 1;
        next.rounds.clear();
        next.concepts_encountered.clear();
        next.ended = false;
        next.agents = assign_roster(next.config.agent_count as usize, &mut next.rng);
        next.enter_discussion(1, topics);

        tracing::info!(generation = next.generation, "game reset");
        Ok(next)
    }
}
