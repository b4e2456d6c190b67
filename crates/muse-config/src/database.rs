use secrecy::SecretString;
use serde::Deserialize;

/// Creation record storage
///
/// Without a `url` creations are kept in memory, which is only suitable for
/// development and tests.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Postgres connection string
    #[serde(default)]
    pub url: Option<SecretString>,
    /// Maximum pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

const fn default_max_connections() -> u32 {
    5
}
