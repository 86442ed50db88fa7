//! Document storage
//!
//! The API handlers only need two operations from storage: an upsert keyed
//! on the user id and a point lookup. Implementations must make the upsert a
//! single atomic write so concurrent saves for one user never produce two rows.

mod memory;
mod sqlite;

use async_trait::async_trait;

pub use memory::MemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;

/// One stored document, at most one per user
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Document {
    pub user_id: String,
    pub content: String,
    /// RFC 3339 timestamp assigned by the server on every write
    pub updated_at: String,
}

/// Storage collaborator errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Backend(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert or replace the user's document, returning the affected row count
    async fn upsert(&self, user_id: &str, content: &str) -> Result<u64, StoreError>;

    /// Fetch the user's document if one was ever saved
    async fn find(&self, user_id: &str) -> Result<Option<Document>, StoreError>;
}

/// Current time in the format stored in `updated_at`
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
