use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::{timestamp_now, Document, DocumentStore, StoreError};
use crate::config::DatabaseConfig;

const CREATE_DOCUMENTS: &str = r"
    CREATE TABLE IF NOT EXISTS documents (
        user_id    TEXT PRIMARY KEY,
        content    TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )";

const UPSERT_DOCUMENT: &str = r"
    INSERT INTO documents (user_id, content, updated_at)
    VALUES (?, ?, ?)
    ON CONFLICT(user_id)
    DO UPDATE SET
        content = excluded.content,
        updated_at = excluded.updated_at";

const SELECT_DOCUMENT: &str = r"
    SELECT user_id, content, updated_at
    FROM documents
    WHERE user_id = ?";

/// SQLite-backed document store
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    /// Connect and make sure the `documents` table exists
    pub async fn connect(config: &DatabaseConfig, url: &str) -> Result<Self, StoreError> {
        if !url.starts_with("sqlite:") {
            return Err(StoreError::Backend(format!(
                "unsupported database url '{url}' (expected sqlite:<path> or \"memory\")"
            )));
        }
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // An in-memory database lives and dies with its connection
        let in_memory = url.contains(":memory:");
        let max_connections = if in_memory { 1 } else { config.max_connections.max(1) };

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5));
        if in_memory {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_DOCUMENTS).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn upsert(&self, user_id: &str, content: &str) -> Result<u64, StoreError> {
        let result = sqlx::query(UPSERT_DOCUMENT)
            .bind(user_id)
            .bind(content)
            .bind(timestamp_now())
            .execute(&self.pool)
            .await?;

        tracing::debug!(user_id, rows = result.rows_affected(), "document upserted");
        Ok(result.rows_affected())
    }

    async fn find(&self, user_id: &str) -> Result<Option<Document>, StoreError> {
        let document = sqlx::query_as::<_, Document>(SELECT_DOCUMENT)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> SqliteDocumentStore {
        SqliteDocumentStore::connect(&DatabaseConfig::default(), "sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_find_missing() {
        let store = memory_store().await;
        assert!(store.find("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_overwrites_single_row() {
        let store = memory_store().await;

        assert_eq!(store.upsert("u1", "hello").await.unwrap(), 1);
        let first = store.find("u1").await.unwrap().unwrap();

        assert_eq!(store.upsert("u1", "world").await.unwrap(), 1);
        let second = store.find("u1").await.unwrap().unwrap();

        assert_eq!(second.content, "world");
        assert!(second.updated_at >= first.updated_at);

        let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents WHERE user_id = ?")
            .bind("u1")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = memory_store().await;
        store.upsert("a", "alpha").await.unwrap();
        store.upsert("b", "beta").await.unwrap();

        assert_eq!(store.find("a").await.unwrap().unwrap().content, "alpha");
        assert_eq!(store.find("b").await.unwrap().unwrap().content, "beta");
    }

    #[tokio::test]
    async fn test_rejects_other_schemes() {
        let err = SqliteDocumentStore::connect(&DatabaseConfig::default(), "postgres://db/app")
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("unsupported database url"));
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("docs.db").display());

        let store = SqliteDocumentStore::connect(&DatabaseConfig::default(), &url)
            .await
            .unwrap();
        store.upsert("u1", "kept").await.unwrap();
        store.close().await;

        let reopened = SqliteDocumentStore::connect(&DatabaseConfig::default(), &url)
            .await
            .unwrap();
        assert_eq!(reopened.find("u1").await.unwrap().unwrap().content, "kept");
    }

    #[tokio::test]
    async fn test_closed_pool_reports_error() {
        let store = memory_store().await;
        store.close().await;
        assert!(store.upsert("u1", "x").await.is_err());
    }
}
