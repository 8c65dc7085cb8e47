use std::sync::Arc;
use tracing::{info, warn};

use super::document_store::DocumentStore;
use super::in_memory::InMemoryDocumentStore;
use super::mongo::MongoDocumentStore;
use crate::config::AppConfig;
use crate::errors::Result;

/// Builds the store named by the configuration.
///
/// Without a `DATABASE_URL` the service still starts, backed by an in-memory store.
pub async fn connect(config: &AppConfig) -> Result<Arc<dyn DocumentStore>> {
    match &config.database_url {
        Some(url) => {
            let store = MongoDocumentStore::connect(url, &config.database_name).await?;
            info!("✅ MongoDB client ready for database: {}", config.database_name);
            Ok(Arc::new(store))
        }
        None => {
            warn!("⚠️ DATABASE_URL not set, falling back to in-memory storage. Records will not survive a restart.");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
    }
}
