use http::StatusCode;

/// Trait for domain errors that can be converted to HTTP responses
///
/// Implemented by each feature crate's error type. The server layer turns
/// these into the uniform `{success, message, code}` body, keeping domain
/// errors decoupled from axum.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error code (e.g. `provider_error`)
    fn code(&self) -> &'static str;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String {
        self.to_string()
    }
}
