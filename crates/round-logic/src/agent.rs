//! AI opponents and roster assignment

use serde::{Deserialize, Serialize};

use crate::random::SeededRng;
use crate::strategy::Strategy;

/// Trust every agent starts a game with
pub const INITIAL_TRUST: u8 = 70;

/// Cosmetic identity of an agent
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentProfile {
    pub name: &'static str,
    pub avatar: &'static str,
    pub personality: &'static str,
}

impl AgentProfile {
    /// Profiles handed out in order; one per seat at the table.
    pub const BUILTIN: [AgentProfile; 5] = [
        AgentProfile {
            name: "The Loyalist",
            avatar: "🤝",
            personality: "Trusting and forgiving, believes in cooperation",
        },
        AgentProfile {
            name: "The Cynic",
            avatar: "🔒",
            personality: "Suspicious and unforgiving, expects betrayal",
        },
        AgentProfile {
            name: "The Opportunist",
            avatar: "⚖️",
            personality: "Adaptive and calculating, seeks maximum gain",
        },
        AgentProfile {
            name: "The Strategist",
            avatar: "🧠",
            personality: "Analytical and patient, plays the long game",
        },
        AgentProfile {
            name: "The Mirror",
            avatar: "🪞",
            personality: "Reactive and adaptive, learns from patterns",
        },
    ];
}

/// An AI opponent
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub personality: String,
    pub strategy: Strategy,
    /// 0-100
    pub trust_level: u8,
    /// Whether the human has ever defected. Never reset within a game.
    pub has_defected_before: bool,
    /// Chat lines posted so far (cosmetic)
    #[serde(default)]
    pub messages_sent: u32,
}

impl Agent {
    pub fn new(id: impl Into<String>, profile: &AgentProfile, strategy: Strategy) -> Self {
        Self {
            id: id.into(),
            name: profile.name.to_string(),
            avatar: profile.avatar.to_string(),
            personality: profile.personality.to_string(),
            strategy,
            trust_level: INITIAL_TRUST,
            has_defected_before: false,
            messages_sent: 0,
        }
    }
}

/// Build `count` agents, drawing strategies without replacement.
///
/// The pool is refilled only once every strategy has been dealt, so
/// duplicates appear only when `count` exceeds the pool size.
pub fn assign_roster(count: usize, rng: &mut SeededRng) -> Vec<Agent> {
    let mut pool: Vec<Strategy> = Vec::with_capacity(Strategy::ALL.len());
    let mut agents = Vec::with_capacity(count);

    for i in 0..count {
        if pool.is_empty() {
            pool.extend_from_slice(&Strategy::ALL);
        }
        let pick = rng.next_range(pool.len() as u32) as usize;
        let strategy = pool.swap_remove(pick);
        let profile = &AgentProfile::BUILTIN[i % AgentProfile::BUILTIN.len()];

        let agent = Agent::new(format!("agent_{}", i + 1), profile, strategy);
        tracing::debug!(id = %agent.id, name = %agent.name, strategy = %strategy, "agent created");
        agents.push(agent);
    }

    agents
}
