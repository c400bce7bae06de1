//! # vulnscan-server
//!
//! HTTP surface of a registry scanner adapter. Registries submit scan
//! requests, receive an opaque job id and poll for the vulnerability
//! report while the scan runs elsewhere.
//!
//! The server owns no job state. It talks to three collaborators from
//! `vulnscan-contracts`: an enqueuer that admits requests, a store that
//! serves job records and a version provider that reports on the scanning
//! engine. [`infra`] carries in-process implementations of all three.

pub mod errors;
pub mod handlers;
pub mod infra;
pub mod negotiation;
pub mod responses;
pub mod routes;

pub use infra::app_state::AppState;
pub use routes::create_app;
