//! Content hooks: discussion topics and agent chat lines.
//!
//! The engine only asks for text. Where it comes from (static tables, a
//! language model, a translation layer) is up to the host.

use round_logic::Agent;

/// Supplies the discussion prompt for a round.
pub trait TopicProvider {
    /// `draw` is uniform in `[0, 1)` from the session's random source.
    fn topic(&self, round: u32, draw: f64) -> String;
}

/// Supplies flavor chat for an agent during discussion.
pub trait BanterProvider {
    /// `defensive` is set when the agent distrusts the human.
    fn line(&self, agent: &Agent, topic: &str, defensive: bool, draw: f64) -> String;
}

fn pick<S: AsRef<str>>(topics: &[S], draw: f64) -> String {
    if topics.is_empty() {
        return String::new();
    }
    let index = ((draw * topics.len() as f64) as usize).min(topics.len() - 1);
    topics[index].as_ref().to_string()
}

impl<S: AsRef<str>> TopicProvider for Vec<S> {
    fn topic(&self, _round: u32, draw: f64) -> String {
        pick(self, draw)
    }
}

impl<S: AsRef<str>, const N: usize> TopicProvider for [S; N] {
    fn topic(&self, _round: u32, draw: f64) -> String {
        pick(self, draw)
    }
}

impl<F> BanterProvider for F
where
    F: Fn(&Agent, &str, bool, f64) -> String,
{
    fn line(&self, agent: &Agent, topic: &str, defensive: bool, draw: f64) -> String {
        self(agent, topic, defensive, draw)
    }
}
