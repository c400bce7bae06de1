use thiserror::Error;
use vulnscan_model::{JobStatus, ScanJobId};

/// Failures reported by collaborators.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The collaborator cannot accept work right now, e.g. a full queue.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure, carried as its message.
    #[error("{0}")]
    Backend(String),

    /// An external command exited unsuccessfully.
    #[error("command `{command}` failed: {reason}")]
    Command {
        /// Command line as it was run.
        command: String,
        /// Exit status or captured stderr.
        reason: String,
    },

    /// Output from a backend could not be parsed.
    #[error("decoding {what}: {reason}")]
    Decode {
        /// What was being decoded.
        what: &'static str,
        /// Parser error.
        reason: String,
    },

    /// No job exists under the id.
    #[error("scan job {0} not found")]
    NotFound(ScanJobId),

    /// A job with the id was already created.
    #[error("scan job {0} already exists")]
    AlreadyExists(ScanJobId),

    /// The status machine forbids the requested move.
    #[error("scan job {id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Job being changed.
        id: ScanJobId,
        /// Status the job currently holds.
        from: JobStatus,
        /// Status that was requested.
        to: JobStatus,
    },
}

/// Result alias used by every collaborator trait.
pub type Result<T> = std::result::Result<T, ContractError>;
