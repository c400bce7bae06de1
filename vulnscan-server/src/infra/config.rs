use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::{ArgAction, Args, Parser};
use thiserror::Error;

pub const DEFAULT_API_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_TRIVY_PATH: &str = "trivy";
pub const DEFAULT_TRIVY_CACHE_DIR: &str = "/home/scanner/.cache/trivy";
pub const DEFAULT_VULN_TYPE: &str = "os,library";
pub const DEFAULT_SECURITY_CHECKS: &str = "vuln";
pub const DEFAULT_SEVERITY: &str = "UNKNOWN,LOW,MEDIUM,HIGH,CRITICAL";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_SCANNER_VERSION: &str = "unknown";
pub const DEFAULT_JOB_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

const KNOWN_SEVERITIES: [&str; 5] =
    ["UNKNOWN", "LOW", "MEDIUM", "HIGH", "CRITICAL"];

/// Runtime configuration for the scanner adapter.
///
/// Every option can be given as a flag or through its environment variable;
/// a `.env` file in the working directory is loaded first by the binary.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "vulnscan-server")]
#[command(
    about = "Registry scanner adapter serving the asynchronous scan job API"
)]
pub struct Config {
    #[command(flatten)]
    pub api: ApiConfig,

    #[command(flatten)]
    pub trivy: TrivyConfig,

    #[command(flatten)]
    pub store: StoreConfig,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "SCANNER_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Address the HTTP API listens on
    #[arg(long = "addr", env = "SCANNER_API_SERVER_ADDR", default_value = DEFAULT_API_ADDR)]
    pub addr: SocketAddr,

    /// Serve request counters on /metrics
    #[arg(
        long = "metrics-enabled",
        env = "SCANNER_API_SERVER_METRICS_ENABLED",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub metrics_enabled: bool,
}

/// Options forwarded to the scanning engine and echoed in the metadata.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TrivyConfig {
    /// Path to the trivy executable
    #[arg(long = "trivy-path", env = "SCANNER_TRIVY_PATH", default_value = DEFAULT_TRIVY_PATH)]
    pub path: PathBuf,

    #[arg(long = "trivy-cache-dir", env = "SCANNER_TRIVY_CACHE_DIR", default_value = DEFAULT_TRIVY_CACHE_DIR)]
    pub cache_dir: PathBuf,

    /// Comma-separated vulnerability types, e.g. `os,library`
    #[arg(long = "trivy-vuln-type", env = "SCANNER_TRIVY_VULN_TYPE", default_value = DEFAULT_VULN_TYPE)]
    pub vuln_type: String,

    #[arg(long = "trivy-security-checks", env = "SCANNER_TRIVY_SECURITY_CHECKS", default_value = DEFAULT_SECURITY_CHECKS)]
    pub security_checks: String,

    /// Comma-separated severities to report
    #[arg(long = "trivy-severity", env = "SCANNER_TRIVY_SEVERITY", default_value = DEFAULT_SEVERITY)]
    pub severity: String,

    #[arg(
        long = "trivy-ignore-unfixed",
        env = "SCANNER_TRIVY_IGNORE_UNFIXED",
        default_value_t = false,
        action = ArgAction::Set
    )]
    pub ignore_unfixed: bool,

    /// Never update the vulnerability database
    #[arg(
        long = "trivy-skip-update",
        env = "SCANNER_TRIVY_SKIP_UPDATE",
        default_value_t = false,
        action = ArgAction::Set
    )]
    pub skip_update: bool,

    /// Never update the Java index database
    #[arg(
        long = "trivy-skip-java-db-update",
        env = "SCANNER_TRIVY_SKIP_JAVA_DB_UPDATE",
        default_value_t = false,
        action = ArgAction::Set
    )]
    pub skip_java_db_update: bool,

    #[arg(
        long = "trivy-offline-scan",
        env = "SCANNER_TRIVY_OFFLINE_SCAN",
        default_value_t = false,
        action = ArgAction::Set
    )]
    pub offline_scan: bool,

    #[arg(
        long = "trivy-debug-mode",
        env = "SCANNER_TRIVY_DEBUG_MODE",
        default_value_t = false,
        action = ArgAction::Set
    )]
    pub debug_mode: bool,

    /// Skip TLS verification when pulling from registries
    #[arg(
        long = "trivy-insecure",
        env = "SCANNER_TRIVY_INSECURE",
        default_value_t = false,
        action = ArgAction::Set
    )]
    pub insecure: bool,

    /// Upper bound for a single engine invocation, e.g. `5m` or `90s`
    #[arg(
        long = "trivy-timeout",
        env = "SCANNER_TRIVY_TIMEOUT",
        default_value = "5m",
        value_parser = humantime::parse_duration
    )]
    pub timeout: Duration,

    /// Engine version advertised in the scanner identity
    #[arg(long = "trivy-version", env = "TRIVY_VERSION", default_value = DEFAULT_SCANNER_VERSION)]
    pub version: String,
}

/// Retention of finished and failed jobs in the in-process store.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// How long a terminal job stays readable, e.g. `1h` or `15m`
    #[arg(
        long = "store-job-ttl",
        env = "SCANNER_STORE_JOB_TTL",
        default_value = "1h",
        value_parser = humantime::parse_duration
    )]
    pub job_ttl: Duration,

    /// How often expired jobs are swept
    #[arg(
        long = "store-sweep-interval",
        env = "SCANNER_STORE_SWEEP_INTERVAL",
        default_value = "1m",
        value_parser = humantime::parse_duration
    )]
    pub sweep_interval: Duration,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SCANNER_TRIVY_SEVERITY must list at least one severity")]
    EmptySeverity,

    #[error("unknown severity `{0}` in SCANNER_TRIVY_SEVERITY")]
    UnknownSeverity(String),

    #[error("SCANNER_TRIVY_VULN_TYPE must not be empty")]
    EmptyVulnType,

    #[error("SCANNER_TRIVY_TIMEOUT must be greater than zero")]
    ZeroTimeout,

    #[error("SCANNER_STORE_SWEEP_INTERVAL must be greater than zero")]
    ZeroSweepInterval,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.trivy.validate()?;
        if self.store.sweep_interval.is_zero() {
            return Err(ConfigError::ZeroSweepInterval);
        }
        Ok(())
    }
}

impl TrivyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let severities: Vec<&str> = split_list(&self.severity).collect();
        if severities.is_empty() {
            return Err(ConfigError::EmptySeverity);
        }
        if let Some(unknown) = severities
            .iter()
            .find(|severity| !KNOWN_SEVERITIES.contains(severity))
        {
            return Err(ConfigError::UnknownSeverity((*unknown).to_string()));
        }

        if split_list(&self.vuln_type).next().is_none() {
            return Err(ConfigError::EmptyVulnType);
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }

    /// Timeout as it is written in configuration, e.g. `5m`.
    pub fn timeout_display(&self) -> String {
        humantime::format_duration(self.timeout).to_string()
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            trivy: TrivyConfig::default(),
            store: StoreConfig::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            metrics_enabled: true,
        }
    }
}

impl Default for TrivyConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_TRIVY_PATH),
            cache_dir: PathBuf::from(DEFAULT_TRIVY_CACHE_DIR),
            vuln_type: DEFAULT_VULN_TYPE.to_string(),
            security_checks: DEFAULT_SECURITY_CHECKS.to_string(),
            severity: DEFAULT_SEVERITY.to_string(),
            ignore_unfixed: false,
            skip_update: false,
            skip_java_db_update: false,
            offline_scan: false,
            debug_mode: false,
            insecure: false,
            timeout: DEFAULT_TIMEOUT,
            version: DEFAULT_SCANNER_VERSION.to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            job_ttl: DEFAULT_JOB_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}
