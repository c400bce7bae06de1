use axum::http::StatusCode;

/// `GET /probe/healthy`
pub async fn healthy_handler() -> StatusCode {
    StatusCode::OK
}

/// `GET /probe/ready`
pub async fn ready_handler() -> StatusCode {
    StatusCode::OK
}
