use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Opaque identifier assigned to a scan job at enqueue time.
///
/// Identifiers arrive from URL paths as arbitrary strings, so no format is
/// enforced here; lookups of malformed ids simply miss.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanJobId(String);

impl ScanJobId {
    pub fn new(id: impl Into<String>) -> Self {
        ScanJobId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for ScanJobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for ScanJobId {
    fn from(value: String) -> Self {
        ScanJobId(value)
    }
}

impl From<&str> for ScanJobId {
    fn from(value: &str) -> Self {
        ScanJobId(value.to_string())
    }
}

impl fmt::Display for ScanJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a scan job.
///
/// Jobs only move forward: `Queued -> Pending -> {Finished | Failed}`.
/// `Unknown` never originates here; it keeps the raw status written by a
/// worker this build does not understand so that readers can report it
/// instead of failing to decode the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Queued,
    Pending,
    Finished,
    Failed,
    Unknown(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "Queued",
            JobStatus::Pending => "Pending",
            JobStatus::Finished => "Finished",
            JobStatus::Failed => "Failed",
            JobStatus::Unknown(raw) => raw,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Failed)
    }

    fn rank(&self) -> Option<u8> {
        match self {
            JobStatus::Queued => Some(0),
            JobStatus::Pending => Some(1),
            JobStatus::Finished | JobStatus::Failed => Some(2),
            JobStatus::Unknown(_) => None,
        }
    }

    /// Whether a job may move from `self` to `next`.
    ///
    /// Moves must be strictly forward; skipping `Pending` is allowed, leaving
    /// a terminal state is not.
    pub fn can_transition_to(&self, next: &JobStatus) -> bool {
        match (self.rank(), next.rank()) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }
}

impl From<&str> for JobStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "Queued" => JobStatus::Queued,
            "Pending" => JobStatus::Pending,
            "Finished" => JobStatus::Finished,
            "Failed" => JobStatus::Failed,
            other => JobStatus::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(JobStatus::from(raw.as_str()))
    }
}

/// A scan job record as written by the queue and worker.
///
/// `report` is present only once the job is `Finished` and `error` only once
/// it is `Failed`. The report is an opaque, already-structured payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanJob {
    pub id: ScanJobId,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanJob {
    pub fn queued(id: ScanJobId) -> Self {
        Self {
            id,
            status: JobStatus::Queued,
            report: None,
            error: None,
        }
    }

    pub fn pending(id: ScanJobId) -> Self {
        Self {
            status: JobStatus::Pending,
            ..Self::queued(id)
        }
    }

    pub fn finished(id: ScanJobId, report: Value) -> Self {
        Self {
            id,
            status: JobStatus::Finished,
            report: Some(report),
            error: None,
        }
    }

    pub fn failed(id: ScanJobId, error: impl Into<String>) -> Self {
        Self {
            id,
            status: JobStatus::Failed,
            report: None,
            error: Some(error.into()),
        }
    }
}
