use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{timestamp_now, Document, DocumentStore, StoreError};

/// Process-local document store, selected with `database.url = "memory"`
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<String, Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn upsert(&self, user_id: &str, content: &str) -> Result<u64, StoreError> {
        let document = Document {
            user_id: user_id.to_string(),
            content: content.to_string(),
            updated_at: timestamp_now(),
        };
        self.documents
            .write()
            .await
            .insert(user_id.to_string(), document);
        Ok(1)
    }

    async fn find(&self, user_id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.documents.read().await.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_and_find() {
        let store = MemoryDocumentStore::new();
        assert!(store.find("u1").await.unwrap().is_none());

        store.upsert("u1", "hello").await.unwrap();
        store.upsert("u1", "world").await.unwrap();

        let doc = store.find("u1").await.unwrap().unwrap();
        assert_eq!(doc.content, "world");
        assert_eq!(store.documents.read().await.len(), 1);
    }
}
