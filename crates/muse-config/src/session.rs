use secrecy::SecretString;
use serde::Deserialize;

/// Session token verification
///
/// Session tokens are HS256 JWTs minted by the identity provider. The
/// `sub` claim names the user and `plan_claim` names the subscription plan.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Shared HMAC secret used to verify session tokens
    pub jwt_secret: SecretString,
    /// Claim path holding the plan name (dotted paths reach nested claims)
    #[serde(default = "default_plan_claim")]
    pub plan_claim: String,
    /// Clock skew tolerated when checking `exp`/`nbf`
    #[serde(default = "default_leeway_seconds")]
    pub leeway_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::from(""),
            plan_claim: default_plan_claim(),
            leeway_seconds: default_leeway_seconds(),
        }
    }
}

fn default_plan_claim() -> String {
    "plan".to_owned()
}

const fn default_leeway_seconds() -> u64 {
    60
}
