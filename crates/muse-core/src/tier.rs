use serde::{Deserialize, Serialize};

/// Subscription level gating feature access and quota
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Premium,
}

impl SubscriptionTier {
    /// Resolve a tier from a plan name as reported by the session provider
    ///
    /// Only an exact (case-insensitive) `premium` grants the premium tier;
    /// missing or unrecognized plans fall back to free.
    pub fn from_plan(plan: Option<&str>) -> Self {
        match plan {
            Some(plan) if plan.trim().eq_ignore_ascii_case("premium") => Self::Premium,
            _ => Self::Free,
        }
    }

    pub const fn is_premium(self) -> bool {
        matches!(self, Self::Premium)
    }
}
