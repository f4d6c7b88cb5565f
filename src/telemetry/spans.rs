//! Span utilities and extension traits for image load tracing.

use tracing::{info_span, Span};

use crate::scheduler::ResourcePriority;

/// Extension trait for adding context to spans.
pub trait SpanExt {
    /// Record the result of an operation into the span.
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for per-image fetch spans.
pub struct LoadSpan;

impl LoadSpan {
    /// `queue_wait_ms` is recorded when the fetch starts. `status`,
    /// `error.message`, `latency_ms` and `size_bytes` are filled in once the
    /// fetch resolves.
    pub fn new(image_id: &str, url: &str, priority: ResourcePriority) -> Span {
        info_span!(
            "image_load",
            image_id = %image_id,
            url = %url,
            priority = %priority,
            queue_wait_ms = tracing::field::Empty,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
            size_bytes = tracing::field::Empty,
        )
    }
}
