//! Active wizard sessions, one per user.
//!
//! Backed by `DashMap`. Each operation completes under a single shard guard
//! and never awaits while holding it. Sessions are cloned on read.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::wizard::{CatalogSession, Transition, WizardInput};

/// Shortest interval between idle sweeps.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct SessionRegistry {
    sessions: DashMap<i64, CatalogSession>,
    idle_timeout: Duration,
    media_limit: usize,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration, media_limit: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout,
            media_limit,
        }
    }

    /// Start a wizard for `user` in `chat`, discarding any existing session.
    ///
    /// Returns `true` when an earlier session was replaced.
    pub fn begin(&self, user: i64, chat: i64) -> bool {
        let replaced = self
            .sessions
            .insert(user, CatalogSession::new(chat, self.media_limit))
            .is_some();
        if replaced {
            tracing::debug!(user_id = user, "previous wizard session discarded");
        }
        replaced
    }

    /// A copy of the session `user` has open in `chat`.
    pub fn get(&self, user: i64, chat: i64) -> Option<CatalogSession> {
        self.sessions
            .get(&user)
            .filter(|s| s.chat_id == chat)
            .map(|s| s.value().clone())
    }

    /// Whether `user` has a session in `chat`.
    pub fn contains(&self, user: i64, chat: i64) -> bool {
        self.sessions
            .get(&user)
            .is_some_and(|s| s.chat_id == chat)
    }

    /// Drop the session for `user`, if any.
    pub fn end(&self, user: i64) -> bool {
        self.sessions.remove(&user).is_some()
    }

    /// Feed one input to the session `user` has open in `chat`.
    ///
    /// Terminal transitions remove the session under the same guard, so a
    /// finalized draft can never be applied twice. `None` when there is no
    /// matching session.
    pub fn apply(&self, user: i64, chat: i64, input: WizardInput) -> Option<Transition> {
        match self.sessions.entry(user) {
            Entry::Occupied(mut entry) => {
                if entry.get().chat_id != chat {
                    return None;
                }
                let transition = entry.get_mut().apply(input);
                if transition.is_terminal() {
                    entry.remove();
                }
                Some(transition)
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Remove sessions idle for longer than the timeout. Returns how many.
    pub fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions
            .retain(|_, s| now.duration_since(s.last_activity) < self.idle_timeout);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::info!(evicted, "evicted idle wizard sessions");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }
}

/// Periodically evict idle sessions until `cancel` fires.
pub fn spawn_idle_sweeper(
    registry: Arc<SessionRegistry>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let every = (registry.idle_timeout() / 4).max(MIN_SWEEP_INTERVAL);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("idle session sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    registry.evict_idle();
                }
            }
        }
    })
}
