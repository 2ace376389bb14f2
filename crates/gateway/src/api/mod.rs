pub mod health;
pub mod interactions;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the HTTP router.
///
/// `/interactions` authenticates each request by its Ed25519 signature;
/// `/health` is public.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/interactions", post(interactions::interactions))
        .route("/health", get(health::health))
}
