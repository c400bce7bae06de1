use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use vulnscan_model::MimeType;

use crate::errors::AppError;

/// JSON body written under one of the adapter's vendor media types.
///
/// Every successful body goes through here so the status line, the
/// `Content-Type` and the serialization failure path stay uniform.
#[derive(Debug)]
pub struct VendorJson<'a, T> {
    pub status: StatusCode,
    pub media_type: &'a MimeType,
    pub body: T,
}

impl<'a, T> VendorJson<'a, T> {
    pub fn new(status: StatusCode, media_type: &'a MimeType, body: T) -> Self {
        Self {
            status,
            media_type,
            body,
        }
    }
}

impl<T: Serialize> IntoResponse for VendorJson<'_, T> {
    fn into_response(self) -> Response {
        let payload = match serde_json::to_vec(&self.body) {
            Ok(payload) => payload,
            Err(err) => {
                error!(error = %err, "failed to serialize response body");
                return AppError::internal(format!(
                    "serializing response: {err}"
                ))
                .into_response();
            }
        };

        let content_type = match HeaderValue::from_str(
            &self.media_type.to_string(),
        ) {
            Ok(value) => value,
            Err(err) => {
                error!(error = %err, media_type = %self.media_type, "invalid media type header");
                return AppError::internal("invalid response media type")
                    .into_response();
            }
        };

        (self.status, [(header::CONTENT_TYPE, content_type)], payload)
            .into_response()
    }
}
