use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jwt_compact::alg::{Hs256, Hs256Key};
use jwt_compact::{AlgorithmExt, TimeOptions, UntrustedToken};
use muse_config::SessionConfig;
use muse_core::{Claims, Requester, SubscriptionTier};
use muse_quota::UsageStore;
use secrecy::ExposeSecret;

use crate::ServerError;

/// Authenticated caller, inserted into request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub tier: SubscriptionTier,
}

/// Verifies HS256 session tokens and reads the plan claim
#[derive(Clone)]
pub struct SessionVerifier {
    key: Arc<Hs256Key>,
    plan_claim: String,
    leeway: chrono::Duration,
}

impl SessionVerifier {
    pub fn new(config: &SessionConfig) -> Self {
        let leeway_seconds = i64::try_from(config.leeway_seconds).unwrap_or(i64::MAX);

        Self {
            key: Arc::new(Hs256Key::new(config.jwt_secret.expose_secret().as_bytes())),
            plan_claim: config.plan_claim.clone(),
            leeway: chrono::Duration::try_seconds(leeway_seconds).unwrap_or_else(chrono::Duration::zero),
        }
    }

    /// Verify a raw token and resolve the caller
    pub fn verify(&self, raw: &str) -> Result<Session, ServerError> {
        let untrusted = UntrustedToken::new(raw)
            .map_err(|e| ServerError::Unauthorized(format!("Malformed session token: {e}")))?;

        let token = Hs256
            .validator::<Claims>(&self.key)
            .validate(&untrusted)
            .map_err(|e| ServerError::Unauthorized(format!("Invalid session token: {e}")))?;

        let time_options = TimeOptions::from_leeway(self.leeway);
        let claims = token.claims();
        claims
            .validate_expiration(&time_options)
            .map_err(|e| ServerError::Unauthorized(format!("Invalid session token: {e}")))?;
        if claims.not_before.is_some() {
            claims
                .validate_maturity(&time_options)
                .map_err(|e| ServerError::Unauthorized(format!("Invalid session token: {e}")))?;
        }

        let user_id = claims
            .custom
            .subject
            .clone()
            .filter(|sub| !sub.is_empty())
            .ok_or_else(|| ServerError::Unauthorized("Session token has no subject".to_owned()))?;

        let plan = claims.custom.get_claim(&self.plan_claim);
        let tier = SubscriptionTier::from_plan(plan.as_deref());

        Ok(Session { user_id, tier })
    }
}

impl std::fmt::Debug for SessionVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionVerifier")
            .field("plan_claim", &self.plan_claim)
            .finish_non_exhaustive()
    }
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Reject requests without a valid session and attach [`Session`]
pub async fn authenticate(verifier: SessionVerifier, mut request: Request, next: Next) -> Response {
    let Some(token) = bearer_token(&request) else {
        return ServerError::Unauthorized("Missing session token".to_owned()).into_response();
    };

    match verifier.verify(token) {
        Ok(session) => {
            tracing::debug!(user_id = %session.user_id, tier = %session.tier, "session verified");
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "session rejected");
            e.into_response()
        }
    }
}

/// Attach a [`Requester`] carrying the caller's current free usage
///
/// Premium callers are never metered, so their usage is not read.
pub async fn resolve_usage(store: Arc<dyn UsageStore>, mut request: Request, next: Next) -> Response {
    let Some(session) = request.extensions().get::<Session>().cloned() else {
        return ServerError::Unauthorized("Missing session".to_owned()).into_response();
    };

    let usage = if session.tier.is_premium() {
        0
    } else {
        match store.current(&session.user_id).await {
            Ok(usage) => usage,
            Err(e) => return ServerError::Usage(e).into_response(),
        }
    };

    request
        .extensions_mut()
        .insert(Requester::new(session.user_id, session.tier, usage));
    next.run(request).await
}
