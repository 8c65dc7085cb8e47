// handlers/payhero_handlers.rs
use axum::{
    body::Bytes,
    extract::{Json, State},
    http::StatusCode,
};
use tracing::{info, warn};

use crate::errors::Result;
use crate::models::{CallbackAck, InboundCallback};
use crate::state::AppState;

/// Receives a PayHero STK-push result.
///
/// The status code reports whether the record was stored, not whether the payment
/// went through: a failed payment that was recorded is still a 200.
pub async fn payhero_callback(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<CallbackAck>)> {
    info!("📥 Received PayHero callback ({} bytes)", body.len());

    let callback = InboundCallback::from_slice(&body).map_err(|e| {
        warn!("Rejecting callback: {}", e);
        e
    })?;

    let record = state.callbacks.record(callback).await?;

    Ok((StatusCode::OK, Json(CallbackAck::from(&record))))
}
