//! Core data model definitions shared across the scanner adapter crates.
//!
//! Everything here is plain data: the scan request submitted by a registry,
//! the job record tracked by the queue and store, the media types the API
//! negotiates, and the metadata document advertised to registries.
#![allow(missing_docs)]

pub mod error;
pub mod job;
pub mod metadata;
pub mod mime;
pub mod scan;
pub mod version;

pub use error::{ModelError, Result as ModelResult};
pub use job::{JobStatus, ScanJob, ScanJobId};
pub use metadata::{Capability, Properties, Scanner, ScannerAdapterMetadata};
pub use mime::MimeType;
pub use scan::{Artifact, Registry, ScanRequest, ScanResponse};
pub use version::{VersionInfo, VulnerabilityDbMetadata};
