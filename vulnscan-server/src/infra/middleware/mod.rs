pub mod metrics;
pub mod request_log;

pub use metrics::count_requests;
pub use request_log::log_request;
