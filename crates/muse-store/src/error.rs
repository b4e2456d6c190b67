/// Errors raised by creation repositories
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Query or connection failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped to a record
    #[error("invalid creation row {id}: {message}")]
    InvalidRow { id: uuid::Uuid, message: String },
}
