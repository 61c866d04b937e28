use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/subscribeTo", post(handlers::subscribe_to))
        .route("/subscribeCallback", get(handlers::handle_verification).post(handlers::handle_new_item))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
