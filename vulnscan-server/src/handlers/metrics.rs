use std::sync::Arc;

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::infra::metrics::RequestMetrics;

const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// `GET /metrics`, routed only when metrics are enabled.
pub async fn metrics_handler(metrics: Arc<RequestMetrics>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, PROMETHEUS_TEXT)],
        metrics.render(),
    )
        .into_response()
}
