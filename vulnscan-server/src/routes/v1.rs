use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    handlers::{get_metadata_handler, get_scan_report_handler, submit_scan_handler},
    infra::app_state::AppState,
};

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/scan", post(submit_scan_handler))
        .route("/scan/{scan_request_id}/report", get(get_scan_report_handler))
        .route("/metadata", get(get_metadata_handler))
}
