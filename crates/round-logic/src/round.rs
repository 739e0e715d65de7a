//! Round resolution engine

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::game::GameMode;
use crate::random::RandomSource;
use crate::strategy::{decide, DecisionContext, Move};
use crate::trust::update_trust;
use crate::{payoff, Payoff};

/// Named game-theory pattern spotted in a round
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundEvent {
    /// Everyone cooperated
    #[serde(rename = "Nash Equilibrium")]
    NashEquilibrium,
    /// Everyone defected
    #[serde(rename = "Mutual Defection")]
    MutualDefection,
    /// The human defected for the first time
    #[serde(rename = "Grim Trigger")]
    GrimTrigger,
}

impl RoundEvent {
    pub fn label(self) -> &'static str {
        match self {
            RoundEvent::NashEquilibrium => "Nash Equilibrium",
            RoundEvent::MutualDefection => "Mutual Defection",
            RoundEvent::GrimTrigger => "Grim Trigger",
        }
    }

    /// One-sentence explanation shown alongside the result
    pub fn insight(self) -> &'static str {
        match self {
            RoundEvent::NashEquilibrium => {
                "This round demonstrates a Nash Equilibrium - a stable state where no player can improve by changing strategy alone."
            }
            RoundEvent::MutualDefection => {
                "Trust has eroded, leading to mutual defection and lower payoffs for everyone."
            }
            RoundEvent::GrimTrigger => {
                "A Grim Trigger strategy has been activated - permanent retaliation after the first betrayal."
            }
        }
    }
}

impl fmt::Display for RoundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A line of discussion chat. Never influences the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    /// Set for AI lines
    pub agent_id: Option<String>,
    pub text: String,
    /// Seconds into the discussion when it was posted
    pub elapsed: u32,
}

impl ChatMessage {
    pub fn is_ai(&self) -> bool {
        self.agent_id.is_some()
    }
}

/// A resolved round. Immutable once appended to history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// 1-based
    pub round: u32,
    pub human_choice: Move,
    pub agent_choices: BTreeMap<String, Move>,
    /// Each agent's own (ai-side) payoff
    pub agent_payoffs: BTreeMap<String, u8>,
    /// Sum of the human's pairwise payoffs this round
    pub human_payoff: u32,
    pub cumulative_payoff: u32,
    pub event: Option<RoundEvent>,
    pub pairwise: BTreeMap<String, Payoff>,
    /// Chat transcript from this round's discussion
    #[serde(default)]
    pub discussion: Vec<ChatMessage>,
}

/// Human's moves, in round order
pub fn human_history(rounds: &[Round]) -> Vec<Move> {
    rounds.iter().map(|r| r.human_choice).collect()
}

/// Inputs to a round resolution
#[derive(Clone, Copy, Debug)]
pub struct RoundInput<'a> {
    /// Round being resolved (1-based)
    pub round: u32,
    pub agents: &'a [Agent],
    pub history: &'a [Round],
    pub mode: &'a GameMode,
}

/// Output of a round resolution
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRound {
    pub round: Round,
    /// Agents with trust and defection flag updated
    pub agents: Vec<Agent>,
}

/// Resolve one round of the human against every agent
///
/// Agents decide simultaneously from the history before this round. The
/// inputs are not modified; the updated agents come back in the result.
pub fn resolve_round<R: RandomSource + ?Sized>(
    input: &RoundInput<'_>,
    human_choice: Move,
    discussion: Vec<ChatMessage>,
    rng: &mut R,
) -> ResolvedRound {
    let history = human_history(input.history);

    let mut agent_choices = BTreeMap::new();
    let mut agent_payoffs = BTreeMap::new();
    let mut pairwise = BTreeMap::new();
    let mut human_payoff = 0u32;

    for agent in input.agents {
        let ctx = DecisionContext {
            agent,
            round: input.round,
            human_history: &history,
            rounds: input.history,
            mode: input.mode,
        };
        let choice = decide(&ctx, &mut *rng);
        let p = payoff(human_choice, choice);

        human_payoff += p.human as u32;
        agent_choices.insert(agent.id.clone(), choice);
        agent_payoffs.insert(agent.id.clone(), p.ai);
        pairwise.insert(agent.id.clone(), p);
    }

    let event = detect_event(human_choice, &agent_choices, &history);

    let agents = input
        .agents
        .iter()
        .map(|agent| Agent {
            trust_level: update_trust(agent.trust_level, human_choice),
            has_defected_before: agent.has_defected_before || human_choice == Move::Defect,
            ..agent.clone()
        })
        .collect();

    let previous = input.history.last().map_or(0, |r| r.cumulative_payoff);

    tracing::debug!(
        round = input.round,
        human = %human_choice,
        human_payoff,
        event = ?event,
        "round resolved"
    );

    ResolvedRound {
        round: Round {
            round: input.round,
            human_choice,
            agent_choices,
            agent_payoffs,
            human_payoff,
            cumulative_payoff: previous + human_payoff,
            event,
            pairwise,
            discussion,
        },
        agents,
    }
}

/// Checked in priority order: all cooperate, all defect, first betrayal.
fn detect_event(
    human_choice: Move,
    agent_choices: &BTreeMap<String, Move>,
    prior_history: &[Move],
) -> Option<RoundEvent> {
    let everyone = |m: Move| human_choice == m && agent_choices.values().all(|c| *c == m);

    if everyone(Move::Cooperate) {
        Some(RoundEvent::NashEquilibrium)
    } else if everyone(Move::Defect) {
        Some(RoundEvent::MutualDefection)
    } else if human_choice == Move::Defect && !prior_history.contains(&Move::Defect) {
        Some(RoundEvent::GrimTrigger)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentProfile;
    use crate::random::ScriptedDraws;
    use crate::random::SeededRng;
    use crate::strategy::Strategy;
    use proptest::prelude::*;

    use Move::{Cooperate as C, Defect as D};

    fn roster(strategies: &[Strategy]) -> Vec<Agent> {
        strategies
            .iter()
            .enumerate()
            .map(|(i, s)| Agent::new(format!("agent_{}", i + 1), &AgentProfile::BUILTIN[i], *s))
            .collect()
    }

    /// Play `moves` through the resolver, threading agents and history.
    fn play(agents: Vec<Agent>, mode: GameMode, moves: &[Move], rng: &mut dyn RandomSource) -> (Vec<Agent>, Vec<Round>) {
        let mut agents = agents;
        let mut history: Vec<Round> = Vec::new();
        for (i, m) in moves.iter().enumerate() {
            let input = RoundInput {
                round: i as u32 + 1,
                agents: &agents,
                history: &history,
                mode: &mode,
            };
            let resolved = resolve_round(&input, *m, Vec::new(), &mut *rng);
            agents = resolved.agents;
            history.push(resolved.round);
        }
        (agents, history)
    }

    #[test]
    fn test_pairwise_payoffs_and_totals() {
        // GrimTrigger cooperates, TitForTat cooperates in round 1
        let agents = roster(&[Strategy::GrimTrigger, Strategy::TitForTat]);
        let mode = GameMode::default();
        let input = RoundInput { round: 1, agents: &agents, history: &[], mode: &mode };
        let resolved = resolve_round(&input, D, Vec::new(), &mut ScriptedDraws::always(0.0));

        let round = &resolved.round;
        assert_eq!(round.round, 1);
        assert_eq!(round.human_payoff, 10);
        assert_eq!(round.cumulative_payoff, 10);
        assert_eq!(round.agent_payoffs["agent_1"], 0);
        assert_eq!(round.pairwise["agent_2"], Payoff { human: 5, ai: 0 });
        assert_eq!(round.event, Some(RoundEvent::GrimTrigger));
    }

    #[test]
    fn test_inputs_untouched_and_agents_updated() {
        let agents = roster(&[Strategy::TitForTat]);
        let before = agents.clone();
        let mode = GameMode::default();
        let input = RoundInput { round: 1, agents: &agents, history: &[], mode: &mode };
        let resolved = resolve_round(&input, D, Vec::new(), &mut ScriptedDraws::always(0.0));

        assert_eq!(agents, before);
        assert_eq!(resolved.agents[0].trust_level, 54);
        assert!(resolved.agents[0].has_defected_before);
    }

    #[test]
    fn test_nash_equilibrium_event() {
        let agents = roster(&[Strategy::TitForTat, Strategy::GrimTrigger]);
        let (_, history) = play(agents, GameMode::default(), &[C], &mut ScriptedDraws::always(0.0));
        assert_eq!(history[0].event, Some(RoundEvent::NashEquilibrium));
        assert_eq!(history[0].human_payoff, 6);
    }

    #[test]
    fn test_mutual_defection_outranks_grim_trigger() {
        // First-ever human defection, but the agent defected as well
        let agents = roster(&[Strategy::TrustBased]);
        let (_, history) = play(agents, GameMode::default(), &[D], &mut ScriptedDraws::always(0.95));
        assert_eq!(history[0].agent_choices["agent_1"], D);
        assert_eq!(history[0].event, Some(RoundEvent::MutualDefection));
    }

    #[test]
    fn test_grim_trigger_event_only_once() {
        let agents = roster(&[Strategy::TitForTat]);
        let (_, history) = play(agents, GameMode::default(), &[C, D, C, D], &mut ScriptedDraws::always(0.0));
        assert_eq!(history[1].event, Some(RoundEvent::GrimTrigger));
        // round 3: TFT defects (mirrors round 2), human cooperates -> nothing
        assert_eq!(history[2].event, None);
        // round 4: TFT cooperates (mirrors round 3), human defects again -> nothing
        assert_eq!(history[3].agent_choices["agent_1"], C);
        assert_eq!(history[3].event, None);
    }

    #[test]
    fn test_has_defected_before_is_sticky() {
        let agents = roster(&[Strategy::Stochastic, Strategy::Evolutionary]);
        let (agents, _) = play(agents, GameMode::default(), &[C, D, C, C, C], &mut SeededRng::from_u64(4));
        assert!(agents.iter().all(|a| a.has_defected_before));
    }

    #[test]
    fn test_grim_trigger_scenario() {
        let agents = roster(&[Strategy::GrimTrigger]);
        let mode = GameMode::Finite { max_rounds: 5 };
        let (_, history) = play(agents, mode, &[C, C, D, C, C], &mut SeededRng::from_u64(1));
        let choices: Vec<Move> = history.iter().map(|r| r.agent_choices["agent_1"]).collect();
        assert_eq!(choices, [C, C, C, D, D]);
    }

    #[test]
    fn test_human_history_projection() {
        let agents = roster(&[Strategy::TitForTat]);
        let (_, history) = play(agents, GameMode::default(), &[C, D, D], &mut ScriptedDraws::always(0.0));
        assert_eq!(human_history(&history), [C, D, D]);
    }

    fn any_strategy() -> impl proptest::strategy::Strategy<Value = Strategy> {
        prop::sample::select(Strategy::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn cumulative_payoff_accumulates(
            seed in any::<u64>(),
            strategies in prop::collection::vec(any_strategy(), 1..=5),
            moves in prop::collection::vec(any::<bool>(), 1..30),
        ) {
            let moves: Vec<Move> = moves.into_iter().map(|c| if c { C } else { D }).collect();
            let mut rng = SeededRng::from_u64(seed);
            let (agents, history) = play(roster(&strategies), GameMode::stochastic(), &moves, &mut rng);

            let mut previous = 0;
            for (i, r) in history.iter().enumerate() {
                prop_assert_eq!(r.round, i as u32 + 1);
                prop_assert_eq!(r.cumulative_payoff, previous + r.human_payoff);
                let pairwise_sum: u32 = r.pairwise.values().map(|p| p.human as u32).sum();
                prop_assert_eq!(r.human_payoff, pairwise_sum);
                previous = r.cumulative_payoff;
            }
            for a in &agents {
                prop_assert!(a.trust_level <= 100);
            }
        }
    }
}
