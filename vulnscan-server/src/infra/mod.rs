pub mod app_state;
pub mod build_info;
pub mod config;
pub mod metrics;
pub mod middleware;
pub mod queue;
pub mod store;
pub mod trivy;
