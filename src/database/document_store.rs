use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::Result;

/// Top-level fields of one stored document.
pub type DocumentFields = Map<String, Value>;

/// Key-value document persistence used by the callback writer.
///
/// Implementations must give `upsert_merge` per-key atomicity: concurrent writes to the
/// same key resolve last-write-wins per field, and fields a write does not mention are
/// left untouched.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates `key` in `collection` or overlays `fields` onto the existing document.
    /// `stamp_field` is set to the store's own clock on every write.
    async fn upsert_merge(
        &self,
        collection: &str,
        key: &str,
        fields: DocumentFields,
        stamp_field: &str,
    ) -> Result<()>;

    async fn get(&self, collection: &str, key: &str) -> Result<Option<DocumentFields>>;

    /// Cheap connectivity round-trip for health reporting.
    async fn ping(&self) -> Result<()>;

    fn backend(&self) -> &'static str;
}
