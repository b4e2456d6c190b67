use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use muse_config::QuotaConfig;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinHandle, JoinSet};

use crate::{UsageSink, UsageStore};

/// Retry behaviour for usage increments
#[derive(Debug, Clone, Copy)]
pub struct CommitSettings {
    /// Total attempts per increment, including the first
    pub attempts: u32,
    /// Delay before the first retry; doubled on each further retry
    pub backoff: Duration,
    /// Users whose increments may be in flight at once
    pub concurrency: usize,
}

impl From<&QuotaConfig> for CommitSettings {
    fn from(config: &QuotaConfig) -> Self {
        Self {
            attempts: config.commit_attempts,
            backoff: config.commit_backoff(),
            concurrency: config.commit_concurrency,
        }
    }
}

impl Default for CommitSettings {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(200),
            concurrency: 16,
        }
    }
}

#[derive(Debug)]
struct Increment {
    user_id: String,
    observed: u64,
}

/// Observed usage values still waiting to be committed, per user
///
/// A user has an entry exactly while one of their increments is in flight.
type Lanes = Arc<DashMap<String, VecDeque<u64>>>;

/// Settles usage increments on background tasks
///
/// Each user's increments are applied one at a time in arrival order, while
/// different users settle concurrently. A user whose store calls stall or
/// fail only delays their own later increments.
#[derive(Clone)]
pub struct UsageCommitter {
    tx: mpsc::UnboundedSender<Increment>,
}

impl UsageCommitter {
    /// Create a committer and spawn its background task
    ///
    /// The task exits once every committer clone has been dropped and all
    /// queued increments are settled. Await the handle to wait for them.
    pub fn spawn(store: Arc<dyn UsageStore>, settings: CommitSettings) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(process_increments(rx, store, settings));
        (Self { tx }, handle)
    }
}

impl UsageSink for UsageCommitter {
    fn record_increment(&self, user_id: &str, observed: u64) {
        let increment = Increment {
            user_id: user_id.to_owned(),
            observed,
        };

        if let Err(e) = self.tx.send(increment) {
            tracing::error!(
                error = %e,
                user_id,
                "failed to enqueue usage increment, committer stopped"
            );
        }
    }
}

impl std::fmt::Debug for UsageCommitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageCommitter").finish_non_exhaustive()
    }
}

async fn process_increments(
    mut rx: mpsc::UnboundedReceiver<Increment>,
    store: Arc<dyn UsageStore>,
    settings: CommitSettings,
) {
    let lanes: Lanes = Arc::default();
    let permits = Arc::new(Semaphore::new(settings.concurrency.max(1)));
    let mut workers = JoinSet::new();

    loop {
        tokio::select! {
            increment = rx.recv() => {
                let Some(Increment { user_id, observed }) = increment else {
                    break;
                };

                match lanes.entry(user_id) {
                    Entry::Occupied(mut lane) => lane.get_mut().push_back(observed),
                    Entry::Vacant(lane) => {
                        let user_id = lane.key().clone();
                        lane.insert(VecDeque::new());
                        workers.spawn(settle_user(
                            Arc::clone(&lanes),
                            Arc::clone(&permits),
                            Arc::clone(&store),
                            settings,
                            user_id,
                            observed,
                        ));
                    }
                }
            }
            Some(finished) = workers.join_next() => log_worker_exit(finished),
        }
    }

    while let Some(finished) = workers.join_next().await {
        log_worker_exit(finished);
    }

    tracing::debug!("usage committer shutting down");
}

fn log_worker_exit(finished: Result<(), tokio::task::JoinError>) {
    if let Err(e) = finished {
        tracing::error!(error = %e, "usage commit task failed");
    }
}

/// Commit one user's increments until their lane is empty
async fn settle_user(
    lanes: Lanes,
    permits: Arc<Semaphore>,
    store: Arc<dyn UsageStore>,
    settings: CommitSettings,
    user_id: String,
    mut observed: u64,
) {
    let mut lane = LaneGuard {
        lanes: &lanes,
        user_id: &user_id,
        settled: false,
    };

    loop {
        {
            let Ok(_permit) = permits.acquire().await else {
                return;
            };
            commit(store.as_ref(), settings, &user_id, observed).await;
        }

        let next = match lanes.entry(user_id.clone()) {
            Entry::Occupied(mut entry) => {
                let next = entry.get_mut().pop_front();
                if next.is_none() {
                    entry.remove();
                }
                next
            }
            Entry::Vacant(_) => None,
        };

        match next {
            Some(value) => observed = value,
            None => {
                lane.settled = true;
                return;
            }
        }
    }
}

/// Clears a user's lane if its worker ends before the lane is drained
struct LaneGuard<'a> {
    lanes: &'a DashMap<String, VecDeque<u64>>,
    user_id: &'a str,
    settled: bool,
}

impl Drop for LaneGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        if let Some((_, pending)) = self.lanes.remove(self.user_id) {
            tracing::error!(
                user_id = self.user_id,
                lost = pending.len(),
                "usage worker stopped with increments pending"
            );
        }
    }
}

async fn commit(store: &dyn UsageStore, settings: CommitSettings, user_id: &str, observed: u64) {
    let attempts = settings.attempts.max(1);
    let mut delay = settings.backoff;

    for attempt in 1..=attempts {
        match store.increment(user_id, observed).await {
            Ok(usage) => {
                tracing::debug!(user_id, usage, store = store.name(), "usage committed");
                return;
            }
            Err(e) if attempt < attempts => {
                tracing::warn!(
                    error = %e,
                    user_id,
                    attempt,
                    "usage increment failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    user_id,
                    observed,
                    attempts,
                    store = store.name(),
                    "usage increment lost"
                );
            }
        }
    }
}
