//! Async driver: discussion countdown and agent chat on a tokio runtime
//!
//! The driver owns the session behind a mutex. Every discussion phase gets a
//! child of the root cancellation token; leaving the phase cancels it, and
//! every task re-checks its [`DiscussionStamp`] under the lock before it
//! mutates anything, so a late wake-up from an old round is a no-op.

use std::sync::Arc;
use std::time::Duration;

use round_logic::{Agent, Move, RandomSource, SeededRng};
use tokio::sync::{watch, Mutex};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::GameConfig;
use crate::content::{BanterProvider, TopicProvider};
use crate::error::SessionError;
use crate::state::{DiscussionStamp, GameSession, Phase};
use crate::transitions::SessionEvent;

const CLOCK_PERIOD: Duration = Duration::from_secs(1);
const BANTER_STAGGER: Duration = Duration::from_secs(3);
const BANTER_PERIOD: Duration = Duration::from_secs(12);
/// First line is dropped unless more than this many seconds remain
const FIRST_LINE_MIN_REMAINING: u32 = 5;
/// Follow-up lines need more than this many seconds left
const FOLLOW_UP_MIN_REMAINING: u32 = 10;
const FOLLOW_UP_CHANCE: f64 = 0.8;
const DEFENSIVE_CHANCE: f64 = 0.3;
const DEFENSIVE_TRUST: u8 = 50;

pub type SharedTopics = Arc<dyn TopicProvider + Send + Sync>;
pub type SharedBanter = Arc<dyn BanterProvider + Send + Sync>;

struct Inner {
    session: GameSession,
    /// Token for the discussion currently being timed
    discussion: Option<(DiscussionStamp, CancellationToken)>,
    updates: watch::Sender<GameSession>,
}

impl Inner {
    fn replace(&mut self, next: GameSession) {
        self.session = next;
        self.updates.send_replace(self.session.clone());
    }

    /// Cancel the running discussion's tasks, if any.
    fn end_discussion(&mut self) {
        if let Some((stamp, token)) = self.discussion.take() {
            tracing::debug!(round = stamp.round, generation = stamp.generation, "discussion timers cancelled");
            token.cancel();
        }
    }
}

/// Runs a [`GameSession`] in real time.
pub struct SessionDriver {
    inner: Arc<Mutex<Inner>>,
    topics: SharedTopics,
    banter: Option<SharedBanter>,
    root: CancellationToken,
    tracker: TaskTracker,
}

impl SessionDriver {
    /// Start a game and its first discussion clock. Must run inside a tokio runtime.
    pub async fn start(
        config: GameConfig,
        topics: SharedTopics,
        banter: Option<SharedBanter>,
    ) -> Result<Self, SessionError> {
        let session = GameSession::start_game(config, &*topics)?;
        let (updates, _) = watch::channel(session.clone());

        let driver = SessionDriver {
            inner: Arc::new(Mutex::new(Inner { session, discussion: None, updates })),
            topics,
            banter,
            root: CancellationToken::new(),
            tracker: TaskTracker::new(),
        };
        {
            let mut inner = driver.inner.lock().await;
            driver.sync_timers(&mut inner);
        }
        Ok(driver)
    }

    /// Current state
    pub async fn snapshot(&self) -> GameSession {
        self.inner.lock().await.session.clone()
    }

    /// Receives every state change, including clock ticks and agent chat.
    pub async fn subscribe(&self) -> watch::Receiver<GameSession> {
        self.inner.lock().await.updates.subscribe()
    }

    /// Apply a host event and restart or stop timers to match the new phase.
    pub async fn apply(&self, event: SessionEvent) -> Result<GameSession, SessionError> {
        let mut inner = self.inner.lock().await;
        let next = inner.session.apply(event, &*self.topics)?;
        inner.replace(next);
        self.sync_timers(&mut inner);
        Ok(inner.session.clone())
    }

    pub async fn skip_discussion(&self) -> Result<GameSession, SessionError> {
        self.apply(SessionEvent::SkipDiscussion).await
    }

    pub async fn post_message(&self, text: impl Into<String>) -> Result<GameSession, SessionError> {
        self.apply(SessionEvent::Chat(text.into())).await
    }

    pub async fn submit_choice(&self, choice: Move) -> Result<GameSession, SessionError> {
        self.apply(SessionEvent::Choose(choice)).await
    }

    pub async fn continue_to_next_round(&self) -> Result<GameSession, SessionError> {
        self.apply(SessionEvent::Continue).await
    }

    pub async fn reset_for_new_game(&self) -> Result<GameSession, SessionError> {
        self.apply(SessionEvent::PlayAgain).await
    }

    /// Stop every timer and wait for the tasks to finish. Idempotent.
    pub async fn shutdown(&self) {
        self.root.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        self.inner.lock().await.discussion = None;
    }

    /// Start timers for a newly opened discussion, stop them when it closes.
    fn sync_timers(&self, inner: &mut Inner) {
        if self.root.is_cancelled() || inner.session.phase() != Phase::Discussion {
            inner.end_discussion();
            return;
        }

        let stamp = inner.session.stamp();
        if matches!(&inner.discussion, Some((running, _)) if *running == stamp) {
            return;
        }
        inner.end_discussion();

        let token = self.root.child_token();
        self.tracker.spawn(run_clock(self.inner.clone(), stamp, token.clone()));

        if let Some(banter) = &self.banter {
            for (index, agent) in inner.session.agents().iter().enumerate() {
                let rng = inner.session.rng.fork(banter_stream(stamp, index));
                self.tracker.spawn(run_banter(
                    self.inner.clone(),
                    banter.clone(),
                    agent.id.clone(),
                    index as u32,
                    stamp,
                    token.clone(),
                    rng,
                ));
            }
        }

        tracing::debug!(round = stamp.round, generation = stamp.generation, "discussion timers started");
        inner.discussion = Some((stamp, token));
    }
}

impl Drop for SessionDriver {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

/// Distinct stream per agent and round
fn banter_stream(stamp: DiscussionStamp, index: usize) -> u32 {
    (stamp.round << 8) | (index as u32 & 0xff)
}

async fn run_clock(inner: Arc<Mutex<Inner>>, stamp: DiscussionStamp, token: CancellationToken) {
    let mut ticker = time::interval_at(Instant::now() + CLOCK_PERIOD, CLOCK_PERIOD);
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                let mut guard = inner.lock().await;
                if !stamp.is_current(&guard.session) {
                    break;
                }
                match guard.session.tick_discussion_timer() {
                    Ok(next) => guard.replace(next),
                    Err(err) => {
                        tracing::warn!(%err, "clock tick rejected");
                        break;
                    }
                }
                if !stamp.is_current(&guard.session) {
                    guard.end_discussion();
                    break;
                }
            }
        }
    }
}

async fn run_banter(
    inner: Arc<Mutex<Inner>>,
    banter: SharedBanter,
    agent_id: String,
    index: u32,
    stamp: DiscussionStamp,
    token: CancellationToken,
    mut rng: SeededRng,
) {
    let first = time::sleep(BANTER_STAGGER * (index + 1));
    tokio::pin!(first);
    let mut follow_ups = time::interval_at(Instant::now() + BANTER_PERIOD, BANTER_PERIOD);
    let mut first_done = false;

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = &mut first, if !first_done => {
                first_done = true;
                let speaker = Speaker { banter: &*banter, agent_id: &agent_id, stamp };
                if !speaker.speak(&inner, FIRST_LINE_MIN_REMAINING, |_, _| false, &mut rng).await {
                    break;
                }
            }
            _ = follow_ups.tick() => {
                let speaker = Speaker { banter: &*banter, agent_id: &agent_id, stamp };
                let defensive = |agent: &Agent, rng: &mut SeededRng| {
                    agent.trust_level < DEFENSIVE_TRUST || rng.chance(DEFENSIVE_CHANCE)
                };
                if !speaker.speak_maybe(&inner, defensive, &mut rng).await {
                    break;
                }
            }
        }
    }
}

struct Speaker<'a> {
    banter: &'a (dyn BanterProvider + Send + Sync),
    agent_id: &'a str,
    stamp: DiscussionStamp,
}

impl Speaker<'_> {
    /// Follow-up line, sent with `FOLLOW_UP_CHANCE`.
    async fn speak_maybe<F>(&self, inner: &Mutex<Inner>, defensive: F, rng: &mut SeededRng) -> bool
    where
        F: FnOnce(&Agent, &mut SeededRng) -> bool,
    {
        {
            let guard = inner.lock().await;
            if !self.stamp.is_current(&guard.session) {
                return false;
            }
            if guard.session.time_remaining() <= FOLLOW_UP_MIN_REMAINING {
                return true;
            }
        }
        if !rng.chance(FOLLOW_UP_CHANCE) {
            return true;
        }
        self.speak(inner, FOLLOW_UP_MIN_REMAINING, defensive, rng).await
    }

    /// Post one line if this discussion is still running and enough time is
    /// left. Returns false once the discussion is gone.
    async fn speak<F>(&self, inner: &Mutex<Inner>, min_remaining: u32, defensive: F, rng: &mut SeededRng) -> bool
    where
        F: FnOnce(&Agent, &mut SeededRng) -> bool,
    {
        let mut guard = inner.lock().await;
        if !self.stamp.is_current(&guard.session) {
            return false;
        }
        if guard.session.time_remaining() <= min_remaining {
            return true;
        }
        let Some(agent) = guard.session.agent(self.agent_id) else {
            return false;
        };

        let defensive = defensive(agent, rng);
        let text = self.banter.line(agent, guard.session.discussion_topic(), defensive, rng.next_unit());
        match guard.session.post_agent_message(self.agent_id, &text) {
            Ok(next) => guard.replace(next),
            Err(err) => tracing::debug!(agent = self.agent_id, %err, "banter dropped"),
        }
        true
    }
}
