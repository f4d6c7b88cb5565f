//! Load metrics recorded through the `metrics` facade.
//!
//! Without an installed recorder every call is a no-op.

use crate::scheduler::ResourcePriority;

pub fn record_load_success(priority: ResourcePriority, latency_ms: u64, size_bytes: usize) {
    metrics::counter!("preload_images_loaded_total", "priority" => priority.as_str()).increment(1);
    metrics::histogram!("preload_image_latency_ms", "priority" => priority.as_str())
        .record(latency_ms as f64);
    metrics::histogram!("preload_image_size_bytes").record(size_bytes as f64);
}

pub fn record_load_failure(priority: ResourcePriority, reason: &str) {
    metrics::counter!("preload_images_failed_total", "priority" => priority.as_str()).increment(1);
    tracing::trace!(%priority, reason, "load failure recorded");
}

pub fn record_cancellation(count: usize) {
    metrics::counter!("preload_images_cancelled_total").increment(count as u64);
}

pub fn record_queue_depth(pending: usize, loading: usize) {
    metrics::gauge!("preload_queue_pending").set(pending as f64);
    metrics::gauge!("preload_queue_loading").set(loading as f64);
}
