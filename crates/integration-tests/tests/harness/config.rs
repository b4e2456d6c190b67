//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use muse_config::{
    Config, CorsConfig, DatabaseConfig, HealthConfig, HostingConfig, IdentityConfig, ImageProviderConfig,
    ProvidersConfig, QuotaConfig, ServerConfig, SessionConfig, TextProviderConfig, UsageStoreKind,
};
use secrecy::SecretString;

use super::mock_vendors::MockVendors;
use super::token::SESSION_SECRET;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with in-memory usage and storage
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig {
                        enabled: true,
                        ..HealthConfig::default()
                    },
                    ..ServerConfig::default()
                },
                session: SessionConfig {
                    jwt_secret: SecretString::from(SESSION_SECRET),
                    ..SessionConfig::default()
                },
                quota: QuotaConfig {
                    store: UsageStoreKind::Memory,
                    commit_backoff_ms: 10,
                    ..QuotaConfig::default()
                },
                identity: None,
                providers: ProvidersConfig::default(),
                database: DatabaseConfig::default(),
                telemetry: None,
            },
        }
    }

    /// Point every vendor, the identity store included, at a mock backend
    pub fn with_vendors(self, vendors: &MockVendors) -> Self {
        self.with_identity(vendors).with_providers(vendors)
    }

    /// Keep usage counters in the mock identity provider
    pub fn with_identity(mut self, vendors: &MockVendors) -> Self {
        self.config.quota.store = UsageStoreKind::Clerk;
        self.config.identity = Some(IdentityConfig {
            api_url: vendors.url("/clerk/v1/"),
            secret_key: SecretString::from("sk_test_mock"),
            usage_field: "free_usage".to_owned(),
            timeout_secs: 5,
        });
        self
    }

    /// Configure text, image and hosting vendors against the mock backend
    pub fn with_providers(mut self, vendors: &MockVendors) -> Self {
        self.config.providers = ProvidersConfig {
            text: Some(TextProviderConfig {
                base_url: vendors.url("/openai/v1"),
                api_key: SecretString::from("gsk_test"),
                model: "llama-3.3-70b-versatile".to_owned(),
                resume_model: None,
            }),
            image: Some(ImageProviderConfig {
                base_url: vendors.url("/clipdrop"),
                api_key: SecretString::from("clipdrop_test"),
            }),
            hosting: Some(HostingConfig {
                cloud_name: "demo".to_owned(),
                api_key: "123456".to_owned(),
                api_secret: SecretString::from("cloud_secret"),
                api_url: vendors.url("/cloudinary/v1_1"),
                delivery_url: vendors.url("/delivery"),
            }),
            timeout_secs: 5,
        };
        self
    }

    /// Set the free-tier limit
    pub fn with_free_limit(mut self, free_limit: u64) -> Self {
        self.config.quota.free_limit = free_limit;
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = Some(config);
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
