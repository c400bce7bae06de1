use axum::{
    extract::{OriginalUri, RawPathParams, State, rejection::RawPathParamsRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use vulnscan_model::{JobStatus, ScanJobId};

use crate::{
    errors::{AppError, AppResult},
    infra::app_state::AppState,
    negotiation::negotiate_report_type,
    responses::VendorJson,
};

const SCAN_REQUEST_ID: &str = "scan_request_id";

/// `GET /api/v1/scan/{scan_request_id}/report`
///
/// Performs one read of the job and returns immediately. Unfinished jobs
/// answer `302 Found` pointing back at the request URL; the client polls
/// again at its own pace.
pub async fn get_scan_report_handler(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    headers: HeaderMap,
    params: Result<RawPathParams, RawPathParamsRejection>,
) -> AppResult<Response> {
    // Negotiation comes before the lookup: a bad Accept header is a 415 even
    // for a job that does not exist.
    let report_type = negotiate_report_type(&headers)?;

    let id = params
        .ok()
        .and_then(|params| {
            params
                .iter()
                .find(|(name, _)| *name == SCAN_REQUEST_ID)
                .map(|(_, value)| value.to_string())
        })
        .filter(|value| !value.is_empty())
        .map(ScanJobId::from)
        .ok_or_else(|| AppError::bad_request("missing scan_request_id"))?;

    let job = state
        .store
        .get(&id)
        .await
        .map_err(|err| {
            error!(scan_job_id = %id, error = %err, "failed to load scan job");
            AppError::internal(format!("getting scan job {id}: {err}"))
        })?
        .ok_or_else(|| AppError::not_found(format!("cannot find scan job: {id}")))?;

    match &job.status {
        JobStatus::Queued | JobStatus::Pending => {
            debug!(scan_job_id = %id, scan_job_status = %job.status, "scan job not finished yet");
            let location = HeaderValue::from_str(&original_uri.to_string())
                .map_err(|err| {
                    AppError::internal(format!("building Location header: {err}"))
                })?;
            Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
        }
        JobStatus::Failed => {
            let message = job.error.ok_or_else(|| {
                error!(scan_job_id = %id, "failed scan job has no error message");
                AppError::internal(format!(
                    "scan job {id} failed without an error message"
                ))
            })?;
            debug!(scan_job_id = %id, error = %message, "scan job failed");
            Err(AppError::internal(message))
        }
        JobStatus::Finished => {
            let report = job.report.ok_or_else(|| {
                error!(scan_job_id = %id, "finished scan job has no report");
                AppError::internal(format!(
                    "scan job {id} finished without a report"
                ))
            })?;
            Ok(VendorJson::new(StatusCode::OK, &report_type, report).into_response())
        }
        JobStatus::Unknown(raw) => {
            error!(scan_job_id = %id, scan_job_status = %raw, "unexpected scan job status");
            Err(AppError::internal(format!(
                "unexpected status {raw} of scan job {id}"
            )))
        }
    }
}
