//! Background task scheduling for low-priority queue drains.

use std::time::Duration;

/// A unit of deferred work.
pub type BackgroundTask = Box<dyn FnOnce() + Send + 'static>;

/// Runs low-priority work at some later point.
pub trait BackgroundScheduler: Send + Sync {
    fn schedule(&self, task: BackgroundTask);
}

/// Runs every task inline, on the caller's stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl BackgroundScheduler for ImmediateScheduler {
    fn schedule(&self, task: BackgroundTask) {
        task();
    }
}

/// Runs tasks on the tokio runtime after a fixed delay.
#[derive(Debug, Clone)]
pub struct DeferredScheduler {
    delay: Duration,
    handle: tokio::runtime::Handle,
}

impl DeferredScheduler {
    /// Must be called from within a tokio runtime.
    pub fn new(delay: Duration) -> Self {
        Self::with_handle(delay, tokio::runtime::Handle::current())
    }

    pub fn with_handle(delay: Duration, handle: tokio::runtime::Handle) -> Self {
        Self { delay, handle }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl BackgroundScheduler for DeferredScheduler {
    fn schedule(&self, task: BackgroundTask) {
        let delay = self.delay;
        let deadline = tokio::time::Instant::now() + delay;
        self.handle.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep_until(deadline).await;
            } else {
                tokio::task::yield_now().await;
            }
            task();
        });
    }
}

/// Which scheduler the runtime should build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerMode {
    Immediate,
    #[default]
    Deferred,
}

impl std::str::FromStr for SchedulerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "immediate" => Ok(Self::Immediate),
            "deferred" | "idle" => Ok(Self::Deferred),
            other => Err(format!("unknown scheduler mode: {other}")),
        }
    }
}
