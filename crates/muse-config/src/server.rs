use std::net::SocketAddr;

use serde::Deserialize;

use crate::cors::CorsConfig;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_address: Option<SocketAddr>,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub cors: Option<CorsConfig>,
    /// Maximum accepted request body, uploads included
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: None,
            health: HealthConfig::default(),
            cors: None,
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// Unauthenticated liveness endpoint
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    #[serde(default = "default_health_path")]
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            path: default_health_path(),
        }
    }
}

const fn default_body_limit() -> usize {
    16 << 20
}

const fn default_health_enabled() -> bool {
    true
}

fn default_health_path() -> String {
    "/health".to_owned()
}
