use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::SubscriptionTier;

/// The resolved caller of a generation request
///
/// Built once per request by the session layer and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    /// Opaque user identifier from the session provider
    pub user_id: String,
    /// Subscription tier for this request
    pub tier: SubscriptionTier,
    /// Free-tier generations consumed before this request
    pub usage: u64,
}

impl Requester {
    pub fn new(user_id: impl Into<String>, tier: SubscriptionTier, usage: u64) -> Self {
        Self {
            user_id: user_id.into(),
            tier,
            usage,
        }
    }
}

/// Session token claims
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    #[serde(default, rename = "sub")]
    pub subject: Option<String>,
    /// Additional claims for flexible access to custom fields
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Claims {
    /// Extract a claim value by path, supporting nested claims
    ///
    /// Paths can be simple (e.g. "plan") or nested (e.g. "metadata.plan").
    #[must_use]
    pub fn get_claim(&self, path: &str) -> Option<String> {
        if path == "sub" {
            return self.subject.clone();
        }

        let mut parts = path.split('.');
        let first = parts.next()?;
        let current = parts.fold(self.additional.get(first).unwrap_or(&Value::Null), |current, part| {
            current.get(part).unwrap_or(&Value::Null)
        });

        match current {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(json: serde_json::Value) -> Claims {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn subject_claim() {
        let c = claims(serde_json::json!({ "sub": "user_1" }));
        assert_eq!(c.get_claim("sub").as_deref(), Some("user_1"));
    }

    #[test]
    fn nested_claim() {
        let c = claims(serde_json::json!({ "sub": "u", "metadata": { "plan": "premium" } }));
        assert_eq!(c.get_claim("metadata.plan").as_deref(), Some("premium"));
        assert_eq!(c.get_claim("metadata.missing"), None);
    }

    #[test]
    fn non_string_claims_are_stringified() {
        let c = claims(serde_json::json!({ "n": 3, "b": true, "o": {} }));
        assert_eq!(c.get_claim("n").as_deref(), Some("3"));
        assert_eq!(c.get_claim("b").as_deref(), Some("true"));
        assert_eq!(c.get_claim("o"), None);
    }
}
