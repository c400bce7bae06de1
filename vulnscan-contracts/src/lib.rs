//! Trait surfaces for the collaborators the scanner adapter API drives.
//!
//! The HTTP layer never owns job state. It admits requests through an
//! [`Enqueuer`], reads job records through a [`ScanJobStore`] and asks a
//! [`VersionProvider`] about the scanning engine. Each trait is deliberately
//! narrow so the server can be wired against in-process, networked or test
//! implementations alike.
//!
//! Futures returned by these traits are dropped when the originating HTTP
//! request goes away, so implementations must tolerate cancellation at any
//! await point.

/// Admission of scan requests.
pub mod enqueuer;
/// Error type shared by every collaborator.
pub mod error;
/// Read access to job records.
pub mod store;
/// Scanning engine version lookup.
pub mod version;

pub use enqueuer::Enqueuer;
pub use error::{ContractError, Result};
pub use store::ScanJobStore;
pub use version::VersionProvider;
