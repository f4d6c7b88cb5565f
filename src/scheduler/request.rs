//! Load request type with optional callbacks and completion channel.

use std::time::Duration;

use tokio::time::Instant;

use super::error::LoadError;
use super::priority::ResourcePriority;

/// Completion channel type for delivering results back to callers.
pub type CompletionTx = tokio::sync::oneshot::Sender<Result<LoadedImage, LoadError>>;
/// Receiver half for awaiting a load. Resolves with `RecvError` when the
/// request never runs (skipped or cancelled).
pub type CompletionRx = tokio::sync::oneshot::Receiver<Result<LoadedImage, LoadError>>;

/// Callback invoked after a successful load.
pub type OnLoad = Box<dyn FnOnce(&LoadedImage) + Send + 'static>;
/// Callback invoked after a failed load.
pub type OnError = Box<dyn FnOnce(&LoadError) + Send + 'static>;

/// Kind of resource behind a request. Only images are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourceKind {
    #[default]
    Image,
}

/// A successfully fetched image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub id: String,
    pub url: String,
    pub size_bytes: usize,
    pub elapsed: Duration,
}

/// A queued image load.
pub struct LoadRequest {
    pub id: String,
    pub url: String,
    pub priority: ResourcePriority,
    pub kind: ResourceKind,
    /// Advisory: carried through the queue and reported, not enforced.
    pub cancellable: bool,
    pub enqueued_at: Instant,
    on_load: Option<OnLoad>,
    on_error: Option<OnError>,
    completion_tx: Option<CompletionTx>,
}

impl std::fmt::Debug for LoadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadRequest")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("priority", &self.priority)
            .field("cancellable", &self.cancellable)
            .finish()
    }
}

impl LoadRequest {
    pub fn new(id: impl Into<String>, url: impl Into<String>, priority: ResourcePriority) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            priority,
            kind: ResourceKind::Image,
            cancellable: true,
            enqueued_at: Instant::now(),
            on_load: None,
            on_error: None,
            completion_tx: None,
        }
    }

    pub fn on_load(mut self, f: impl FnOnce(&LoadedImage) + Send + 'static) -> Self {
        self.on_load = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnOnce(&LoadError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn cancellable(mut self, cancellable: bool) -> Self {
        self.cancellable = cancellable;
        self
    }

    /// Time spent in the queue so far.
    pub fn queue_wait(&self) -> Duration {
        self.enqueued_at.elapsed()
    }

    pub(crate) fn with_callbacks(mut self, on_load: Option<OnLoad>, on_error: Option<OnError>) -> Self {
        self.on_load = on_load;
        self.on_error = on_error;
        self
    }

    /// Attach a completion channel and return its receiver.
    pub fn with_completion(mut self) -> (Self, CompletionRx) {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.completion_tx = Some(tx);
        (self, rx)
    }

    /// Split off the parts needed once the fetch resolves.
    pub(crate) fn into_completion(self) -> Completion {
        Completion {
            on_load: self.on_load,
            on_error: self.on_error,
            completion_tx: self.completion_tx,
        }
    }
}

/// Callbacks and channel detached from a request while its fetch runs.
pub(crate) struct Completion {
    on_load: Option<OnLoad>,
    on_error: Option<OnError>,
    completion_tx: Option<CompletionTx>,
}

impl Completion {
    pub(crate) fn resolve(self, result: Result<LoadedImage, LoadError>) {
        match &result {
            Ok(image) => {
                if let Some(f) = self.on_load {
                    f(image);
                }
            }
            Err(error) => {
                if let Some(f) = self.on_error {
                    f(error);
                }
            }
        }
        if let Some(tx) = self.completion_tx {
            let _ = tx.send(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn defaults_to_cancellable_image() {
        let req = LoadRequest::new("a", "/a.png", ResourcePriority::Low);
        assert!(req.cancellable);
        assert_eq!(req.kind, ResourceKind::Image);
    }

    #[test]
    fn resolve_runs_matching_callback_only() {
        let loaded = Arc::new(AtomicBool::new(false));
        let errored = Arc::new(AtomicBool::new(false));
        let (l, e) = (loaded.clone(), errored.clone());
        let req = LoadRequest::new("a", "/a.png", ResourcePriority::Low)
            .on_load(move |_| l.store(true, Ordering::SeqCst))
            .on_error(move |_| e.store(true, Ordering::SeqCst));

        req.into_completion()
            .resolve(Err(LoadError::fetch("/a.png", "not found")));

        assert!(!loaded.load(Ordering::SeqCst));
        assert!(errored.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn completion_channel_receives_result() {
        let (req, rx) = LoadRequest::new("a", "/a.png", ResourcePriority::High).with_completion();
        let image = LoadedImage {
            id: "a".into(),
            url: "/a.png".into(),
            size_bytes: 12,
            elapsed: Duration::from_millis(3),
        };
        req.into_completion().resolve(Ok(image.clone()));
        assert_eq!(rx.await.unwrap(), Ok(image));
    }

    #[tokio::test(start_paused = true)]
    async fn queue_wait_counts_from_enqueue() {
        let req = LoadRequest::new("a", "/a.png", ResourcePriority::Lazy);
        tokio::time::advance(Duration::from_millis(250)).await;
        assert_eq!(req.queue_wait(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn dropped_request_closes_channel() {
        let (req, rx) = LoadRequest::new("a", "/a.png", ResourcePriority::High).with_completion();
        drop(req);
        assert!(rx.await.is_err());
    }
}
