use axum::{routing::post, Router};

use crate::handlers::payhero_handlers;
use crate::state::AppState;

pub fn payhero_routes() -> Router<AppState> {
    Router::new()
        // POST /callback and POST /payhero/callback - STK push result from PayHero
        .route("/callback", post(payhero_handlers::payhero_callback))
}
