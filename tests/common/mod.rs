#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use payhero_callback::build_router;
use payhero_callback::config::AppConfig;
use payhero_callback::database::{DocumentFields, DocumentStore, InMemoryDocumentStore};
use payhero_callback::errors::{AppError, Result};
use payhero_callback::state::AppState;

/// In-memory store that can be switched into an outage.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryDocumentStore,
    pub down: AtomicBool,
    pub writes: AtomicUsize,
}

impl FlakyStore {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(AppError::persistence("simulated store outage"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn upsert_merge(
        &self,
        collection: &str,
        key: &str,
        fields: DocumentFields,
        stamp_field: &str,
    ) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.upsert_merge(collection, key, fields, stamp_field).await
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<DocumentFields>> {
        self.check()?;
        self.inner.get(collection, key).await
    }

    async fn ping(&self) -> Result<()> {
        self.check()
    }

    fn backend(&self) -> &'static str {
        "flaky"
    }
}

pub fn app_with(store: Arc<dyn DocumentStore>) -> Router {
    build_router(AppState::new(store, &AppConfig::default()))
}

pub async fn send(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub async fn post_callback(app: &Router, body: &str) -> (StatusCode, Value) {
    send(app, "POST", "/callback", body).await
}
