use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, info};
use url::Url;

use vulnscan_model::{ScanRequest, ScanResponse, mime};

use crate::{
    errors::{AppError, AppResult},
    infra::app_state::AppState,
    responses::VendorJson,
};

/// `POST /api/v1/scan`
///
/// Decodes and validates the request, hands it to the enqueuer and answers
/// `202 Accepted` with the new job id. The job store is never touched here.
pub async fn submit_scan_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Response> {
    let request: ScanRequest = serde_json::from_slice(&body).map_err(|err| {
        AppError::bad_request(format!("unmarshalling scan request: {err}"))
    })?;

    validate_scan_request(&request)?;

    let job = state.enqueuer.enqueue(request).await.map_err(|err| {
        error!(error = %err, "failed to enqueue scan job");
        AppError::internal(format!("enqueuing scan job: {err}"))
    })?;

    info!(scan_job_id = %job.id, "scan job accepted");

    Ok(VendorJson::new(
        StatusCode::ACCEPTED,
        &mime::SCAN_RESPONSE,
        ScanResponse { id: job.id },
    )
    .into_response())
}

/// Checks run in a fixed order and stop at the first violation.
pub fn validate_scan_request(request: &ScanRequest) -> AppResult<()> {
    if request.registry.url.is_empty() {
        return Err(AppError::unprocessable("missing registry.url"));
    }

    if Url::parse(&request.registry.url).is_err() {
        return Err(AppError::unprocessable("invalid registry.url"));
    }

    if request.artifact.repository.is_empty() {
        return Err(AppError::unprocessable("missing artifact.repository"));
    }

    if request.artifact.digest.is_empty() {
        return Err(AppError::unprocessable("missing artifact.digest"));
    }

    Ok(())
}
