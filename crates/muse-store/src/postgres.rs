use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use muse_core::CreationType;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use uuid::Uuid;

use crate::{CreationRecord, CreationRepository, NewCreation, StoreError};

const CREATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS creations (
    id          UUID PRIMARY KEY,
    user_id     TEXT NOT NULL,
    prompt      TEXT NOT NULL,
    content     TEXT NOT NULL,
    type        TEXT NOT NULL,
    publish     BOOLEAN NOT NULL DEFAULT FALSE,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)";

const CREATIONS_USER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS creations_user_id_created_at_idx ON creations (user_id, created_at DESC)";

const RECORD_COLUMNS: &str = "id, user_id, prompt, content, type, publish, created_at";

/// Postgres-backed creation repository
#[derive(Debug, Clone)]
pub struct PgCreationRepository {
    pool: PgPool,
}

impl PgCreationRepository {
    /// Connect a pool and make sure the `creations` table exists
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new().max_connections(max_connections).connect(url).await?;
        let repository = Self::from_pool(pool);
        repository.ensure_schema().await?;
        Ok(repository)
    }

    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the table and index if missing
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATIONS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATIONS_USER_INDEX).execute(&self.pool).await?;
        Ok(())
    }
}

fn record_from_row(row: &PgRow) -> Result<CreationRecord, StoreError> {
    let id: Uuid = row.try_get("id")?;
    let type_tag: String = row.try_get("type")?;
    let creation_type = CreationType::from_str(&type_tag).map_err(|_| StoreError::InvalidRow {
        id,
        message: format!("unknown type tag {type_tag:?}"),
    })?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(CreationRecord {
        id,
        user_id: row.try_get("user_id")?,
        prompt: row.try_get("prompt")?,
        content: row.try_get("content")?,
        creation_type,
        publish: row.try_get("publish")?,
        created_at,
    })
}

#[async_trait]
impl CreationRepository for PgCreationRepository {
    async fn insert(&self, creation: NewCreation) -> Result<CreationRecord, StoreError> {
        let row = sqlx::query(&format!(
            "INSERT INTO creations (id, user_id, prompt, content, type, publish)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {RECORD_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&creation.user_id)
        .bind(&creation.prompt)
        .bind(&creation.content)
        .bind(creation.creation_type.as_ref())
        .bind(creation.publish)
        .fetch_one(&self.pool)
        .await?;

        record_from_row(&row)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<CreationRecord>, StoreError> {
        sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM creations WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(record_from_row)
        .collect()
    }

    async fn list_published(&self) -> Result<Vec<CreationRecord>, StoreError> {
        sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM creations WHERE publish = TRUE ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(record_from_row)
        .collect()
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
