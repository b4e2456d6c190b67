use async_trait::async_trait;
use dashmap::DashMap;

use crate::QuotaError;

/// Per-user usage counter held by an external identity store
///
/// `increment` receives the usage the caller observed when the request
/// started. Stores without an atomic increment write `observed + 1`, which
/// lets two concurrent requests both land on the same value; stores that
/// can increment atomically should do so and may ignore `observed` beyond
/// using it as a floor.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Current usage for a user; unknown users have zero usage
    async fn current(&self, user_id: &str) -> Result<u64, QuotaError>;

    /// Record one more generation and return the stored value
    async fn increment(&self, user_id: &str, observed: u64) -> Result<u64, QuotaError>;

    /// Store name for logging
    fn name(&self) -> &'static str;
}

/// Process-local usage counters with atomic increments
#[derive(Debug, Default)]
pub struct MemoryUsageStore {
    counters: DashMap<String, u64>,
}

impl MemoryUsageStore {
    /// Overwrite a user's usage, e.g. to seed development data
    pub fn set(&self, user_id: &str, usage: u64) {
        self.counters.insert(user_id.to_owned(), usage);
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn current(&self, user_id: &str) -> Result<u64, QuotaError> {
        Ok(self.counters.get(user_id).map_or(0, |usage| *usage))
    }

    async fn increment(&self, user_id: &str, observed: u64) -> Result<u64, QuotaError> {
        let mut entry = self.counters.entry(user_id.to_owned()).or_insert(0);
        *entry = (*entry).max(observed) + 1;
        Ok(*entry)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
