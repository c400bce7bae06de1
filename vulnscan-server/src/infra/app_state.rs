use std::{fmt, sync::Arc};

use vulnscan_contracts::{Enqueuer, ScanJobStore, VersionProvider};

use crate::infra::{build_info::BuildInfo, config::Config, metrics::RequestMetrics};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub build_info: Arc<BuildInfo>,
    pub enqueuer: Arc<dyn Enqueuer>,
    pub store: Arc<dyn ScanJobStore>,
    pub version_provider: Arc<dyn VersionProvider>,
    /// Present only when metrics are enabled in configuration
    pub metrics: Option<Arc<RequestMetrics>>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("metrics_enabled", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        config: Config,
        enqueuer: Arc<dyn Enqueuer>,
        store: Arc<dyn ScanJobStore>,
        version_provider: Arc<dyn VersionProvider>,
    ) -> Self {
        let metrics = config
            .api
            .metrics_enabled
            .then(|| Arc::new(RequestMetrics::new()));

        Self {
            config: Arc::new(config),
            build_info: Arc::new(BuildInfo::current()),
            enqueuer,
            store,
            version_provider,
            metrics,
        }
    }

    pub fn with_build_info(mut self, build_info: BuildInfo) -> Self {
        self.build_info = Arc::new(build_info);
        self
    }
}
