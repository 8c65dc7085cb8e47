use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::document_store::{DocumentFields, DocumentStore};
use crate::errors::Result;

type Collections = HashMap<String, HashMap<String, DocumentFields>>;

/// A thread-safe in-memory document store.
///
/// Used when no `DATABASE_URL` is configured and as the store behind the tests.
/// Contents are lost on restart.
#[derive(Default, Clone)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents held in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map_or(0, HashMap::len)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn upsert_merge(
        &self,
        collection: &str,
        key: &str,
        fields: DocumentFields,
        stamp_field: &str,
    ) -> Result<()> {
        let mut collections = self.collections.write().await;
        let document = collections
            .entry(collection.to_string())
            .or_default()
            .entry(key.to_string())
            .or_default();

        for (field, value) in fields {
            document.insert(field, value);
        }
        document.insert(stamp_field.to_string(), Value::String(Utc::now().to_rfc3339()));
        Ok(())
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<DocumentFields>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.get(key))
            .cloned())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
