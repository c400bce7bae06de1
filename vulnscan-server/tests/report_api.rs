mod support;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    routing::get,
};
use serde_json::json;
use tower::ServiceExt;

use vulnscan_server::handlers::get_scan_report_handler;

use vulnscan_model::{JobStatus, ScanJob, ScanJobId};

use support::{
    REPORT_MIME, StubStore, body_bytes, body_json, build_app, content_type,
    report_request,
};

fn report() -> serde_json::Value {
    json!({
        "generated_at": "2024-03-02T10:00:00Z",
        "artifact": {"repository": "library/x", "digest": "sha256:abc123"},
        "scanner": {"name": "Trivy", "vendor": "Aqua Security", "version": "0.50.1"},
        "severity": "High",
        "vulnerabilities": [
            {"id": "CVE-2024-0001", "package": "openssl", "version": "3.0.1", "severity": "High"}
        ]
    })
}

fn store_with_all_statuses() -> StubStore {
    let unknown: ScanJob =
        serde_json::from_value(json!({"id": "job-odd", "status": "Cancelled"})).unwrap();

    StubStore::with_jobs(vec![
        ScanJob::queued(ScanJobId::new("job-queued")),
        ScanJob::pending(ScanJobId::new("job-pending")),
        ScanJob::finished(ScanJobId::new("job-done"), report()),
        ScanJob::failed(ScanJobId::new("job-failed"), "failed to pull image: manifest unknown"),
        ScanJob {
            id: ScanJobId::new("job-empty"),
            status: JobStatus::Finished,
            report: None,
            error: None,
        },
        ScanJob {
            id: ScanJobId::new("job-silent"),
            status: JobStatus::Failed,
            report: None,
            error: None,
        },
        unknown,
    ])
}

#[tokio::test]
async fn unfinished_jobs_redirect_to_the_same_url() {
    let app = build_app().store(store_with_all_statuses()).build();

    for id in ["job-queued", "job-pending"] {
        let response = app
            .router
            .clone()
            .oneshot(report_request(id, Some(REPORT_MIME)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            format!("/api/v1/scan/{id}/report").as_str()
        );
        assert!(body_bytes(response).await.is_empty());
    }
}

#[tokio::test]
async fn redirect_location_keeps_the_query_string() {
    let app = build_app().store(store_with_all_statuses()).build();

    let request = Request::builder()
        .uri("/api/v1/scan/job-pending/report?attempt=3")
        .header(header::ACCEPT, REPORT_MIME)
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/api/v1/scan/job-pending/report?attempt=3"
    );
}

#[tokio::test]
async fn finished_job_returns_the_stored_report() {
    let app = build_app().store(store_with_all_statuses()).build();

    let response = app
        .router
        .clone()
        .oneshot(report_request("job-done", Some(REPORT_MIME)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), REPORT_MIME);
    assert_eq!(
        body_bytes(response).await,
        serde_json::to_vec(&report()).unwrap()
    );
}

#[tokio::test]
async fn failed_job_returns_its_error_text() {
    let app = build_app().store(store_with_all_statuses()).build();

    let response = app
        .router
        .clone()
        .oneshot(report_request("job-failed", Some(REPORT_MIME)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({"message": "failed to pull image: manifest unknown"})
    );
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let app = build_app().store(store_with_all_statuses()).build();

    let response = app
        .router
        .clone()
        .oneshot(report_request("does-not-exist", Some(REPORT_MIME)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        json!({"message": "cannot find scan job: does-not-exist"})
    );
}

#[tokio::test]
async fn negotiation_precedes_lookup() {
    let app = build_app().store(store_with_all_statuses()).build();

    for accept in [None, Some(""), Some("*/*"), Some("application/json")] {
        for id in ["job-done", "does-not-exist"] {
            let response = app
                .router
                .clone()
                .oneshot(report_request(id, accept))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
            assert_eq!(
                body_json(response).await,
                json!({"message": format!("unsupported media type {}", accept.unwrap_or(""))})
            );
        }
    }

    assert_eq!(app.store.reads(), 0);
}

#[tokio::test]
async fn store_failure_is_an_internal_error() {
    let app = build_app().store(StubStore::failing("connection refused")).build();

    let response = app
        .router
        .clone()
        .oneshot(report_request("job-1", Some(REPORT_MIME)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({"message": "getting scan job job-1: connection refused"})
    );
}

#[tokio::test]
async fn inconsistent_jobs_are_internal_errors() {
    let app = build_app().store(store_with_all_statuses()).build();

    let response = app
        .router
        .clone()
        .oneshot(report_request("job-odd", Some(REPORT_MIME)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({"message": "unexpected status Cancelled of scan job job-odd"})
    );

    let response = app
        .router
        .clone()
        .oneshot(report_request("job-empty", Some(REPORT_MIME)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({"message": "scan job job-empty finished without a report"})
    );

    let response = app
        .router
        .clone()
        .oneshot(report_request("job-silent", Some(REPORT_MIME)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({"message": "scan job job-silent failed without an error message"})
    );
}

#[tokio::test]
async fn route_without_an_id_is_a_bad_request() {
    let app = build_app().store(store_with_all_statuses()).build();
    let router = Router::new()
        .route("/x", get(get_scan_report_handler))
        .with_state(app.state.clone());

    let request = Request::builder()
        .uri("/x")
        .header(header::ACCEPT, REPORT_MIME)
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"message": "missing scan_request_id"})
    );
    assert_eq!(app.store.reads(), 0);
}

#[tokio::test]
async fn polling_does_not_change_the_answer() {
    let app = build_app().store(store_with_all_statuses()).build();

    for _ in 0..3 {
        let response = app
            .router
            .clone()
            .oneshot(report_request("job-pending", Some(REPORT_MIME)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
    }
    assert_eq!(app.store.reads(), 3);
}
