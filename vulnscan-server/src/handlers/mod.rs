//! HTTP request handlers organized by functionality

pub mod metadata;
pub mod metrics;
pub mod probe;
pub mod scan;

pub use metadata::get_metadata_handler;
pub use metrics::metrics_handler;
pub use probe::{healthy_handler, ready_handler};
pub use scan::{get_scan_report_handler, submit_scan_handler};
