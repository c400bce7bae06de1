use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Log every inbound request at debug level. Never alters the response.
///
/// The peer address is only known when the server was started with
/// `into_make_service_with_connect_info`; otherwise it is logged as `-`.
pub async fn log_request(req: Request, next: Next) -> Response {
    let addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());

    debug!(
        addr = %addr,
        proto = ?req.version(),
        method = %req.method(),
        uri = %req.uri(),
        "request"
    );

    next.run(req).await
}
