use async_trait::async_trait;
use vulnscan_model::VersionInfo;

use crate::error::Result;

/// Live version and database freshness of the scanning engine.
#[async_trait]
pub trait VersionProvider: Send + Sync {
    /// Query the engine. Failures surface to clients as `500`.
    async fn version(&self) -> Result<VersionInfo>;
}
