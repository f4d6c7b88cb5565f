//! Telemetry: structured logging, load spans and metrics.

mod logging;
mod metrics;
mod spans;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use metrics::{record_cancellation, record_load_failure, record_load_success, record_queue_depth};
pub use spans::{LoadSpan, SpanExt};
