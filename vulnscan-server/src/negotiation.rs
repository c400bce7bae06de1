use axum::http::{HeaderMap, header};

use vulnscan_model::{MimeType, ModelError};

use crate::errors::{AppError, AppResult};

/// Pick the report media type named by the request's `Accept` header.
///
/// A missing header is treated like an empty one; neither defaults to
/// anything.
pub fn negotiate_report_type(headers: &HeaderMap) -> AppResult<MimeType> {
    let raw = match headers.get(header::ACCEPT) {
        None => "",
        Some(value) => value.to_str().map_err(|_| {
            unsupported(ModelError::UnsupportedMediaType(
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            ))
        })?,
    };

    MimeType::from_accept_header(raw).map_err(unsupported)
}

fn unsupported(err: ModelError) -> AppError {
    AppError::unsupported_media_type(err.to_string())
}
