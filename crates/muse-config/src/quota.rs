use std::time::Duration;

use serde::Deserialize;

/// Free-tier quota enforcement
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuotaConfig {
    /// Generations a free user may make before being asked to upgrade
    #[serde(default = "default_free_limit")]
    pub free_limit: u64,
    /// Where usage counters are read from and written to
    #[serde(default)]
    pub store: UsageStoreKind,
    /// Attempts made to record a usage increment before giving up
    #[serde(default = "default_commit_attempts")]
    pub commit_attempts: u32,
    /// Delay before the first retry; doubled on every further attempt
    #[serde(default = "default_commit_backoff_ms")]
    pub commit_backoff_ms: u64,
    /// Users whose increments may be committed at the same time
    #[serde(default = "default_commit_concurrency")]
    pub commit_concurrency: usize,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            free_limit: default_free_limit(),
            store: UsageStoreKind::default(),
            commit_attempts: default_commit_attempts(),
            commit_backoff_ms: default_commit_backoff_ms(),
            commit_concurrency: default_commit_concurrency(),
        }
    }
}

impl QuotaConfig {
    pub const fn commit_backoff(&self) -> Duration {
        Duration::from_millis(self.commit_backoff_ms)
    }
}

/// Backing store for per-user usage counters
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UsageStoreKind {
    /// User private metadata in the identity provider
    #[default]
    Clerk,
    /// Process-local counters; lost on restart
    Memory,
}

const fn default_free_limit() -> u64 {
    10
}

const fn default_commit_attempts() -> u32 {
    3
}

const fn default_commit_backoff_ms() -> u64 {
    200
}

const fn default_commit_concurrency() -> usize {
    16
}
