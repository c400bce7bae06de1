use async_trait::async_trait;
use vulnscan_model::{ScanJob, ScanJobId};

use crate::error::Result;

/// Read access to scan job records.
///
/// Implementations are shared by every in-flight request and must allow
/// concurrent readers alongside the worker that advances job status.
#[async_trait]
pub trait ScanJobStore: Send + Sync {
    /// Look up a job. A missing job is `Ok(None)`, not an error.
    async fn get(&self, id: &ScanJobId) -> Result<Option<ScanJob>>;
}
