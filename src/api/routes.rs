use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Gated routes -- consult the license state (and, where metered, the
    // remote counters) on every request
    let gated_routes = Router::new()
        .route("/feat1", get(handlers::feat1))
        .route("/feat2", get(handlers::feat2))
        .route("/feat-mix", get(handlers::feat_mix))
        .route("/feat-mix-usage", get(handlers::feat_mix_usage))
        .route("/feat-mix-upfront", get(handlers::feat_mix_upfront));

    // Internal routes -- liveness, never gated
    let internal_routes = Router::new().route("/_internal/health", get(handlers::health));

    Router::new()
        .route("/", get(handlers::root))
        .merge(gated_routes)
        .merge(internal_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
