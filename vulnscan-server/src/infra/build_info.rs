/// Build facts advertised through the metadata endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: String,
    pub commit: String,
    pub date: String,
}

pub const SOURCE_URL: &str = "https://github.com/aquasecurity/harbor-scanner-trivy";

const UNKNOWN: &str = "unknown";

impl BuildInfo {
    /// Build info stamped into this binary.
    ///
    /// Commit and date come from `VULNSCAN_BUILD_COMMIT` and
    /// `VULNSCAN_BUILD_DATE` at compile time when set.
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: option_env!("VULNSCAN_BUILD_COMMIT")
                .unwrap_or(UNKNOWN)
                .to_string(),
            date: option_env!("VULNSCAN_BUILD_DATE")
                .unwrap_or(UNKNOWN)
                .to_string(),
        }
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::current()
    }
}
