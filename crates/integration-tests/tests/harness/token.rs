//! Session token minting

use jwt_compact::alg::{Hs256, Hs256Key};
use jwt_compact::{AlgorithmExt, Claims as JwtClaims, Header, TimeOptions};
use muse_core::Claims;

/// Secret shared between the test config and minted tokens
pub const SESSION_SECRET: &str = "integration-session-secret";

/// Mint a session token for a free-tier user
pub fn free_user(user_id: &str) -> String {
    mint(serde_json::json!({ "sub": user_id }))
}

/// Mint a session token for a premium subscriber
pub fn premium_user(user_id: &str) -> String {
    mint(serde_json::json!({ "sub": user_id, "plan": "premium" }))
}

/// Mint a token valid for five minutes with arbitrary claims
pub fn mint(custom: serde_json::Value) -> String {
    let claims: Claims = serde_json::from_value(custom).expect("valid claims");
    let claims = JwtClaims::new(claims).set_duration(&TimeOptions::default(), chrono::Duration::minutes(5));

    Hs256
        .token(&Header::empty(), &claims, &Hs256Key::new(SESSION_SECRET.as_bytes()))
        .expect("token signs")
}
