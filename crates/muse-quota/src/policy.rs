use std::sync::Arc;

use muse_core::{GenerationKind, Requester};

/// Outcome of a quota check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenialReason),
}

impl Decision {
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Why a request was turned away before reaching a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// Free usage is exhausted
    LimitReached,
    /// The kind is reserved for premium subscribers
    PremiumRequired,
}

impl DenialReason {
    /// Message shown to the user
    pub const fn message(self) -> &'static str {
        match self {
            Self::LimitReached => "Limit reached. Upgrade to continue.",
            Self::PremiumRequired => "This feature is only available for premium subscription.",
        }
    }

    /// Machine-readable code
    pub const fn code(self) -> &'static str {
        match self {
            Self::LimitReached => "limit_reached",
            Self::PremiumRequired => "premium_required",
        }
    }
}

/// Decides whether a requester may run another generation
#[derive(Debug, Clone, Copy)]
pub struct QuotaPolicy {
    free_limit: u64,
}

impl QuotaPolicy {
    pub const fn new(free_limit: u64) -> Self {
        Self { free_limit }
    }

    pub const fn free_limit(&self) -> u64 {
        self.free_limit
    }

    /// Check a request against the premium-only flag and the free limit
    ///
    /// Premium requesters are always allowed. The premium-only flag is
    /// checked before usage so a free user with spare quota still gets the
    /// premium denial for premium-only kinds.
    pub const fn check(&self, kind: GenerationKind, requester: &Requester) -> Decision {
        if requester.tier.is_premium() {
            return Decision::Allow;
        }

        if kind.premium_only() {
            return Decision::Deny(DenialReason::PremiumRequired);
        }

        if requester.usage >= self.free_limit {
            return Decision::Deny(DenialReason::LimitReached);
        }

        Decision::Allow
    }
}

/// Destination for usage increments after a successful generation
///
/// Implementations must not block: the increment is settled after the
/// response is decided and its failure is never shown to the user.
pub trait UsageSink: Send + Sync {
    fn record_increment(&self, user_id: &str, observed: u64);
}

/// Quota policy bound to the sink that settles usage
#[derive(Clone)]
pub struct Quota {
    policy: QuotaPolicy,
    sink: Arc<dyn UsageSink>,
}

impl Quota {
    pub fn new(policy: QuotaPolicy, sink: Arc<dyn UsageSink>) -> Self {
        Self { policy, sink }
    }

    pub const fn check(&self, kind: GenerationKind, requester: &Requester) -> Decision {
        self.policy.check(kind, requester)
    }

    /// Settle one quota unit for a successful generation
    ///
    /// Premium requesters are never metered. Returns whether an increment
    /// was handed to the sink.
    pub fn commit(&self, requester: &Requester) -> bool {
        if requester.tier.is_premium() {
            return false;
        }

        self.sink.record_increment(&requester.user_id, requester.usage);
        true
    }
}

impl std::fmt::Debug for Quota {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Quota")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use muse_core::SubscriptionTier;
    use strum::IntoEnumIterator;

    use super::*;

    fn free(usage: u64) -> Requester {
        Requester::new("user_free", SubscriptionTier::Free, usage)
    }

    fn premium(usage: u64) -> Requester {
        Requester::new("user_premium", SubscriptionTier::Premium, usage)
    }

    #[test]
    fn premium_is_always_allowed() {
        let policy = QuotaPolicy::new(10);
        for kind in GenerationKind::iter() {
            for usage in [0, 9, 10, 11, u64::MAX] {
                assert_eq!(policy.check(kind, &premium(usage)), Decision::Allow, "{kind} at {usage}");
            }
        }
    }

    #[test]
    fn free_users_are_limited_at_threshold() {
        let policy = QuotaPolicy::new(10);
        for kind in GenerationKind::iter().filter(|k| !k.premium_only()) {
            assert_eq!(policy.check(kind, &free(0)), Decision::Allow);
            assert_eq!(policy.check(kind, &free(9)), Decision::Allow);
            assert_eq!(
                policy.check(kind, &free(10)),
                Decision::Deny(DenialReason::LimitReached)
            );
            assert_eq!(
                policy.check(kind, &free(500)),
                Decision::Deny(DenialReason::LimitReached)
            );
        }
    }

    #[test]
    fn premium_only_kinds_deny_free_users_regardless_of_usage() {
        let policy = QuotaPolicy::new(10);
        for kind in GenerationKind::iter().filter(|k| k.premium_only()) {
            for usage in [0, 5, 10, 50] {
                assert_eq!(
                    policy.check(kind, &free(usage)),
                    Decision::Deny(DenialReason::PremiumRequired)
                );
            }
        }
    }

    #[test]
    fn denial_messages() {
        assert_eq!(DenialReason::LimitReached.message(), "Limit reached. Upgrade to continue.");
        assert_eq!(
            DenialReason::PremiumRequired.message(),
            "This feature is only available for premium subscription."
        );
    }

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<(String, u64)>>);

    impl UsageSink for RecordingSink {
        fn record_increment(&self, user_id: &str, observed: u64) {
            self.0.lock().unwrap().push((user_id.to_owned(), observed));
        }
    }

    #[test]
    fn commit_skips_premium() {
        let sink = Arc::new(RecordingSink::default());
        let quota = Quota::new(QuotaPolicy::new(10), Arc::clone(&sink) as Arc<dyn UsageSink>);

        assert!(!quota.commit(&premium(3)));
        assert!(quota.commit(&free(9)));

        assert_eq!(*sink.0.lock().unwrap(), vec![("user_free".to_owned(), 9)]);
    }
}
