//! Version information reported by the scanning engine.
//!
//! Field names follow the engine's `version --format json` output.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionInfo {
    #[serde(default)]
    pub version: String,
    #[serde(
        rename = "VulnerabilityDB",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub vulnerability_db: Option<VulnerabilityDbMetadata>,
    #[serde(rename = "JavaDB", default, skip_serializing_if = "Option::is_none")]
    pub java_db: Option<VulnerabilityDbMetadata>,
}

/// Freshness of one of the engine's vulnerability databases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VulnerabilityDbMetadata {
    #[serde(default)]
    pub version: u32,
    pub next_update: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloaded_at: Option<DateTime<Utc>>,
}

/// RFC 3339 in UTC with whole seconds, e.g. `2024-01-02T03:04:05Z`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}
