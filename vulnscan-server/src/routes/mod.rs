pub mod v1;

use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

use crate::{
    handlers::{healthy_handler, metrics_handler, ready_handler},
    infra::{
        app_state::AppState,
        middleware::{count_requests, log_request},
    },
};

/// Create the main API router with all versions
pub fn create_api_router() -> Router<AppState> {
    Router::new().nest("/api/v1", v1::create_v1_router())
}

/// Build the complete application: API, probes and, when enabled, metrics.
///
/// Layers, outer to inner: tracing span, request log, request counting.
pub fn create_app(state: AppState) -> Router {
    let mut app = create_api_router()
        .route("/probe/healthy", get(healthy_handler))
        .route("/probe/ready", get(ready_handler));

    if let Some(metrics) = state.metrics.clone() {
        let exposed = metrics.clone();
        app = app
            .route(
                "/metrics",
                get(move || metrics_handler(exposed.clone())),
            )
            .layer(middleware::from_fn_with_state(metrics, count_requests));
    }

    app.layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
