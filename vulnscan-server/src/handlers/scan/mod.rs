pub mod handle_report;
pub mod handle_submit;

pub use handle_report::get_scan_report_handler;
pub use handle_submit::{submit_scan_handler, validate_scan_request};
