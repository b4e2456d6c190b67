/// Errors raised while reading or updating usage counters
#[derive(Debug, thiserror::Error)]
pub enum QuotaError {
    /// HTTP transport or connection error
    #[error("identity request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The identity provider returned a non-success status
    #[error("identity API error ({status}): {message}")]
    Api {
        /// HTTP status from the identity provider
        status: u16,
        /// Error message from the response body
        message: String,
    },

    /// Stored usage could not be interpreted
    #[error("malformed usage metadata for user {user_id}: {message}")]
    Malformed {
        /// User whose metadata was unreadable
        user_id: String,
        /// What was wrong with it
        message: String,
    },

    /// Usage store is misconfigured
    #[error("usage store configuration error: {0}")]
    Config(String),
}
