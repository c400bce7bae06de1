use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::job::ScanJobId;

/// A registry's request to scan one artifact.
///
/// Absent or `null` sections decode to their empty defaults so that a
/// structurally valid body with missing fields reaches validation instead of
/// failing to decode. Unknown top-level fields are kept in `extra` and handed
/// to the enqueuer untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub registry: Registry,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artifact: Artifact,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    /// Credentials the scanner presents to the registry, e.g. `Basic ...`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<String>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("url", &self.url)
            .field(
                "authorization",
                &self.authorization.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(default, deserialize_with = "null_as_default")]
    pub repository: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub digest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Body of the `202 Accepted` response to a scan submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResponse {
    pub id: ScanJobId,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
