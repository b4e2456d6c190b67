#![allow(clippy::must_use_candidate)]

pub mod cors;
pub mod database;
mod env;
pub mod identity;
mod loader;
pub mod providers;
pub mod quota;
pub mod server;
pub mod session;
pub mod telemetry;

use serde::Deserialize;

pub use cors::*;
pub use database::*;
pub use identity::*;
pub use providers::*;
pub use quota::*;
pub use server::*;
pub use session::*;
pub use telemetry::{ExportProtocol, ExporterConfig, LogFormat, TelemetryConfig};

/// Top-level Muse configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Session token verification
    #[serde(default)]
    pub session: SessionConfig,
    /// Free-tier quota enforcement
    #[serde(default)]
    pub quota: QuotaConfig,
    /// Identity metadata store (where usage counters live)
    #[serde(default)]
    pub identity: Option<IdentityConfig>,
    /// Upstream generation vendors
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Creation record storage
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
