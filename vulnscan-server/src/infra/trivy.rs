use std::{path::PathBuf, process::Stdio, time::Duration};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use vulnscan_contracts::{ContractError, Result, VersionProvider};
use vulnscan_model::VersionInfo;

use super::config::TrivyConfig;

const VERSION_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Asks the local trivy binary for its version and database freshness.
#[derive(Debug, Clone)]
pub struct TrivyVersionProvider {
    path: PathBuf,
    cache_dir: PathBuf,
    timeout: Duration,
}

impl TrivyVersionProvider {
    pub fn new(path: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache_dir: cache_dir.into(),
            timeout: VERSION_QUERY_TIMEOUT,
        }
    }

    pub fn from_config(config: &TrivyConfig) -> Self {
        Self::new(&config.path, &config.cache_dir)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command_line(&self) -> String {
        format!(
            "{} --cache-dir {} version --format json",
            self.path.display(),
            self.cache_dir.display()
        )
    }

    fn command_error(&self, reason: impl Into<String>) -> ContractError {
        ContractError::Command {
            command: self.command_line(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl VersionProvider for TrivyVersionProvider {
    async fn version(&self) -> Result<VersionInfo> {
        let mut command = Command::new(&self.path);
        command
            .arg("--cache-dir")
            .arg(&self.cache_dir)
            .args(["version", "--format", "json"])
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!(command = %self.command_line(), "querying trivy version");

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| self.command_error("timed out"))?
            .map_err(|err| self.command_error(err.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.command_error(format!(
                "{}: {}",
                output.status,
                stderr.trim()
            )));
        }

        parse_version_output(&output.stdout)
    }
}

/// Decode `trivy version --format json` output.
pub fn parse_version_output(stdout: &[u8]) -> Result<VersionInfo> {
    serde_json::from_slice(stdout).map_err(|err| ContractError::Decode {
        what: "trivy version output",
        reason: err.to_string(),
    })
}
