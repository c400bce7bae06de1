use async_trait::async_trait;
use vulnscan_model::{ScanJob, ScanRequest};

use crate::error::Result;

/// Admits validated scan requests for asynchronous processing.
#[async_trait]
pub trait Enqueuer: Send + Sync {
    /// Create a job record for `request` and hand it to the worker side.
    ///
    /// The returned job carries the identifier clients poll with. The
    /// request is forwarded as received, including any fields the adapter
    /// does not interpret.
    async fn enqueue(&self, request: ScanRequest) -> Result<ScanJob>;
}
