#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use chrono::{TimeZone, Utc};
use serde_json::Value;

use vulnscan_contracts::{
    ContractError, Enqueuer, Result, ScanJobStore, VersionProvider,
};
use vulnscan_model::{
    ScanJob, ScanJobId, ScanRequest, VersionInfo, VulnerabilityDbMetadata,
};
use vulnscan_server::{
    AppState, create_app,
    infra::{build_info::BuildInfo, config::Config},
};

pub const REPORT_MIME: &str =
    "application/vnd.security.vulnerability.report; version=1.1";

/// Enqueuer that records requests and hands out predictable ids.
#[derive(Debug, Default)]
pub struct StubEnqueuer {
    pub received: Mutex<Vec<ScanRequest>>,
    pub failure: Option<String>,
}

impl StubEnqueuer {
    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn received(&self) -> Vec<ScanRequest> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl Enqueuer for StubEnqueuer {
    async fn enqueue(&self, request: ScanRequest) -> Result<ScanJob> {
        if let Some(reason) = &self.failure {
            return Err(ContractError::Unavailable(reason.clone()));
        }
        let mut received = self.received.lock().unwrap();
        received.push(request);
        Ok(ScanJob::queued(ScanJobId::new(format!(
            "job-{}",
            received.len()
        ))))
    }
}

/// Store serving a fixed set of jobs, or failing every read.
#[derive(Debug, Default)]
pub struct StubStore {
    pub jobs: Vec<ScanJob>,
    pub failure: Option<String>,
    pub reads: Mutex<usize>,
}

impl StubStore {
    pub fn with_jobs(jobs: Vec<ScanJob>) -> Self {
        Self {
            jobs,
            ..Self::default()
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn reads(&self) -> usize {
        *self.reads.lock().unwrap()
    }
}

#[async_trait]
impl ScanJobStore for StubStore {
    async fn get(&self, id: &ScanJobId) -> Result<Option<ScanJob>> {
        *self.reads.lock().unwrap() += 1;
        if let Some(reason) = &self.failure {
            return Err(ContractError::Backend(reason.clone()));
        }
        Ok(self.jobs.iter().find(|job| job.id == *id).cloned())
    }
}

#[derive(Debug)]
pub struct StubVersionProvider {
    pub result: std::result::Result<VersionInfo, String>,
}

impl StubVersionProvider {
    pub fn ok(info: VersionInfo) -> Self {
        Self { result: Ok(info) }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(reason.to_string()),
        }
    }
}

#[async_trait]
impl VersionProvider for StubVersionProvider {
    async fn version(&self) -> Result<VersionInfo> {
        self.result.clone().map_err(|reason| ContractError::Command {
            command: "trivy version --format json".into(),
            reason,
        })
    }
}

/// Engine version with both databases populated.
pub fn engine_version() -> VersionInfo {
    VersionInfo {
        version: "0.50.1".into(),
        vulnerability_db: Some(VulnerabilityDbMetadata {
            version: 2,
            next_update: Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap(),
            downloaded_at: None,
        }),
        java_db: Some(VulnerabilityDbMetadata {
            version: 1,
            next_update: Utc.with_ymd_and_hms(2024, 3, 5, 8, 30, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap(),
            downloaded_at: None,
        }),
    }
}

pub fn test_build_info() -> BuildInfo {
    BuildInfo {
        version: "0.1.0".into(),
        commit: "0123abc".into(),
        date: "2024-03-01T00:00:00Z".into(),
    }
}

pub struct TestApp {
    pub router: Router,
    /// State behind `router`, for mounting handlers on ad hoc routes.
    pub state: AppState,
    pub enqueuer: Arc<StubEnqueuer>,
    pub store: Arc<StubStore>,
}

pub struct TestAppBuilder {
    config: Config,
    enqueuer: StubEnqueuer,
    store: StubStore,
    version: StubVersionProvider,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            config: Config::default(),
            enqueuer: StubEnqueuer::default(),
            store: StubStore::default(),
            version: StubVersionProvider::ok(engine_version()),
        }
    }
}

impl TestAppBuilder {
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn enqueuer(mut self, enqueuer: StubEnqueuer) -> Self {
        self.enqueuer = enqueuer;
        self
    }

    pub fn store(mut self, store: StubStore) -> Self {
        self.store = store;
        self
    }

    pub fn version(mut self, version: StubVersionProvider) -> Self {
        self.version = version;
        self
    }

    pub fn build(self) -> TestApp {
        let enqueuer = Arc::new(self.enqueuer);
        let store = Arc::new(self.store);
        let state = AppState::new(
            self.config,
            enqueuer.clone(),
            store.clone(),
            Arc::new(self.version),
        )
        .with_build_info(test_build_info());

        TestApp {
            router: create_app(state.clone()),
            state,
            enqueuer,
            store,
        }
    }
}

pub fn build_app() -> TestAppBuilder {
    TestAppBuilder::default()
}

pub fn report_request(id: &str, accept: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("GET")
        .uri(format!("/api/v1/scan/{id}/report"));
    if let Some(accept) = accept {
        builder = builder.header(header::ACCEPT, accept);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn scan_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/scan")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn content_type(response: &Response<Body>) -> &str {
    response.headers()[header::CONTENT_TYPE].to_str().unwrap()
}
