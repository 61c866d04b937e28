use axum::routing::{get, post};
use axum::Router;
use psgb_hub_core::Hub;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Builds the hub's router. `Hub` is the shared state: cheap to clone (an
/// `Arc` around the engine), so every handler just reads it out of
/// `State`.
pub fn build(hub: Hub) -> Router {
    Router::new()
        .route("/publish", post(handlers::publish))
        .route("/subscribe", post(handlers::subscribe))
        .route("/healthz", get(handlers::healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(hub)
}
