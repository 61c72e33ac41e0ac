//! Logging, metrics and audit output for swapscope.

pub mod metrics;
pub mod logging;
pub mod audit;

pub use metrics::Metrics;
pub use logging::{init_logging, LogFormat};
