//! Image loader: drains the resource queue into async fetches.
//!
//! Every drain step starts at most one fetch. Completions take another step,
//! so the pipe stays full up to the concurrency cap. Urgent tiers drain on
//! the caller's stack; the rest go through the background scheduler, and a
//! periodic safety net picks up anything left behind.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{watch, Notify};
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::background::BackgroundScheduler;
use super::error::LoadError;
use super::fetch::ImageFetcher;
use super::priority::ResourcePriority;
use super::queue::{ResourceQueue, ResourceQueueConfig, DEFAULT_MAX_CONCURRENT};
use super::request::{Completion, CompletionRx, LoadRequest, LoadedImage, OnError, OnLoad};
use crate::telemetry::{self, LoadSpan, SpanExt};

/// Id prefix of the above-the-fold agent thumbnails.
pub const AGENT_THUMBNAIL_PREFIX: &str = "agent-thumbnail-";

/// Default safety-net drain interval.
pub const DEFAULT_SAFETY_NET_INTERVAL: Duration = Duration::from_millis(500);

/// Id of the thumbnail for the named agent.
pub fn agent_thumbnail_id(name: &str) -> String {
    format!("{AGENT_THUMBNAIL_PREFIX}{name}")
}

/// Configuration for the image loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub max_concurrent: usize,
    pub safety_net_interval: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            safety_net_interval: DEFAULT_SAFETY_NET_INTERVAL,
        }
    }
}

/// Optional per-request settings for [`ImageLoader::load_image`].
#[derive(Default)]
pub struct LoadOptions {
    pub on_load: Option<OnLoad>,
    pub on_error: Option<OnError>,
    pub cancellable: Option<bool>,
}

impl LoadOptions {
    pub fn on_load(mut self, f: impl FnOnce(&LoadedImage) + Send + 'static) -> Self {
        self.on_load = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnOnce(&LoadError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn cancellable(mut self, cancellable: bool) -> Self {
        self.cancellable = Some(cancellable);
        self
    }
}

/// Point-in-time view of the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoaderStats {
    pub pending: usize,
    pub loading: usize,
    pub loaded: usize,
    pub failed: usize,
    pub cancelled: usize,
}

struct InFlight {
    generation: u64,
    abort: AbortHandle,
    /// Later requests for the same id, resolved with this fetch's result.
    waiters: Vec<Completion>,
}

struct LoaderState {
    queue: ResourceQueue,
    in_flight: HashMap<String, InFlight>,
    next_generation: u64,
}

struct Inner {
    state: Mutex<LoaderState>,
    fetcher: Arc<dyn ImageFetcher>,
    background: Arc<dyn BackgroundScheduler>,
    runtime: tokio::runtime::Handle,
    idle: Notify,
    safety_net_interval: Duration,
}

/// Cheaply cloneable handle to one loader and its queue.
#[derive(Clone)]
pub struct ImageLoader {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLoader").field("stats", &self.stats()).finish()
    }
}

impl ImageLoader {
    /// Create a loader. Must be called from within a tokio runtime.
    pub fn new(
        config: LoaderConfig,
        fetcher: Arc<dyn ImageFetcher>,
        background: Arc<dyn BackgroundScheduler>,
    ) -> Self {
        let queue = ResourceQueue::new(ResourceQueueConfig {
            max_concurrent: config.max_concurrent,
        });
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(LoaderState {
                    queue,
                    in_flight: HashMap::new(),
                    next_generation: 0,
                }),
                fetcher,
                background,
                runtime: tokio::runtime::Handle::current(),
                idle: Notify::new(),
                safety_net_interval: config.safety_net_interval,
            }),
        }
    }

    /// Request an image. Already resolved or cancelled ids are ignored; an
    /// id that is loading shares the running fetch.
    pub fn load_image(
        &self,
        id: impl Into<String>,
        url: impl Into<String>,
        priority: ResourcePriority,
        options: LoadOptions,
    ) {
        let request = LoadRequest::new(id, url, priority)
            .cancellable(options.cancellable.unwrap_or(true))
            .with_callbacks(options.on_load, options.on_error);
        self.submit(request);
    }

    /// Request an image and get a receiver for its result.
    pub fn load_image_tracked(
        &self,
        id: impl Into<String>,
        url: impl Into<String>,
        priority: ResourcePriority,
    ) -> CompletionRx {
        let (request, rx) = LoadRequest::new(id, url, priority).with_completion();
        self.submit(request);
        rx
    }

    /// Queue a prepared request and trigger a drain.
    pub fn submit(&self, request: LoadRequest) {
        let priority = request.priority;
        let id = request.id.clone();
        let (queued, pending, loading) = {
            let mut state = self.inner.state.lock();
            if let Some(flight) = state.in_flight.get_mut(&id) {
                flight.waiters.push(request.into_completion());
                tracing::debug!(image_id = %id, "image already loading, joined running fetch");
                return;
            }
            let queued = state.queue.add(request);
            (queued, state.queue.queue_size(), state.queue.loading_count())
        };
        if queued {
            tracing::debug!(image_id = %id, %priority, pending, "image queued");
            telemetry::record_queue_depth(pending, loading);
        } else {
            tracing::trace!(image_id = %id, "image already resolved, skipping");
        }

        if priority.is_urgent() {
            self.process_queue();
        } else {
            let loader = self.clone();
            self.inner
                .background
                .schedule(Box::new(move || loader.process_queue()));
        }
    }

    /// One drain step: start the next fetch if capacity allows.
    pub fn process_queue(&self) {
        let mut state = self.inner.state.lock();
        loop {
            let Some(request) = state.queue.get_next() else {
                return;
            };
            if let Some(flight) = state.in_flight.get_mut(&request.id) {
                // The loading mark belongs to the running fetch.
                tracing::trace!(image_id = %request.id, "already in flight, joining running fetch");
                flight.waiters.push(request.into_completion());
                continue;
            }
            if state.queue.is_loaded(&request.id) || state.queue.is_cancelled(&request.id) {
                state.queue.release(&request.id);
                continue;
            }
            self.start_fetch(&mut state, request);
            return;
        }
    }

    fn start_fetch(&self, state: &mut LoaderState, request: LoadRequest) {
        state.next_generation += 1;
        let generation = state.next_generation;
        let id = request.id.clone();
        let url = request.url.clone();
        let priority = request.priority;
        let queue_wait = request.queue_wait();
        let completion = request.into_completion();

        let span = LoadSpan::new(&id, &url, priority);
        span.record("queue_wait_ms", queue_wait.as_millis() as u64);
        let fetcher = Arc::clone(&self.inner.fetcher);
        let loader = self.clone();
        let task_id = id.clone();

        let handle = self.inner.runtime.spawn(async move {
            let started = Instant::now();
            let result = fetcher
                .fetch(&url, priority.fetch_priority())
                .instrument(span.clone())
                .await
                .map(|bytes| LoadedImage {
                    id: task_id.clone(),
                    url: url.clone(),
                    size_bytes: bytes.len(),
                    elapsed: started.elapsed(),
                });
            span.record_result(&result);
            if let Ok(image) = &result {
                span.record("latency_ms", image.elapsed.as_millis() as u64);
                span.record("size_bytes", image.size_bytes as u64);
            }
            loader.finish(&task_id, generation, priority, result, completion);
        });

        tracing::debug!(image_id = %id, %priority, "image fetch started");
        state.in_flight.insert(
            id,
            InFlight {
                generation,
                abort: handle.abort_handle(),
                waiters: Vec::new(),
            },
        );
    }

    fn finish(
        &self,
        id: &str,
        generation: u64,
        priority: ResourcePriority,
        result: Result<LoadedImage, LoadError>,
        completion: Completion,
    ) {
        let waiters = {
            let mut state = self.inner.state.lock();
            let current = state
                .in_flight
                .get(id)
                .is_some_and(|flight| flight.generation == generation);
            if !current {
                tracing::trace!(image_id = %id, "late completion for detached fetch");
                return;
            }
            let waiters = state
                .in_flight
                .remove(id)
                .map(|flight| flight.waiters)
                .unwrap_or_default();
            match &result {
                Ok(_) => state.queue.mark_loaded(id),
                Err(_) => state.queue.mark_failed(id),
            }
            waiters
        };

        match &result {
            Ok(image) => {
                tracing::debug!(image_id = %id, size_bytes = image.size_bytes, "image loaded");
                telemetry::record_load_success(
                    priority,
                    image.elapsed.as_millis() as u64,
                    image.size_bytes,
                );
            }
            Err(e) => {
                tracing::warn!(image_id = %id, error = %e, "image failed");
                telemetry::record_load_failure(priority, &e.to_string());
            }
        }

        for waiter in waiters {
            waiter.resolve(result.clone());
        }
        completion.resolve(result);
        self.inner.idle.notify_waiters();
        self.process_queue();
    }

    /// Cancel one image, aborting its fetch if it already started.
    pub fn cancel_image(&self, id: &str) {
        {
            let mut state = self.inner.state.lock();
            if let Some(flight) = state.in_flight.remove(id) {
                flight.abort.abort();
            }
            state.queue.cancel(id);
        }
        tracing::debug!(image_id = %id, "image cancelled");
        telemetry::record_cancellation(1);
        self.inner.idle.notify_waiters();
    }

    /// Cancel every pending or in-flight image whose id matches `filter`.
    /// Returns the number of cancelled requests.
    pub fn cancel_all_images(&self, filter: impl Fn(&str) -> bool) -> usize {
        let cancelled = {
            let mut state = self.inner.state.lock();
            let mut cancelled = state.queue.cancel_all(|r| filter(&r.id));

            let aborted: Vec<String> = state
                .in_flight
                .keys()
                .filter(|id| filter(id))
                .cloned()
                .collect();
            for id in aborted {
                if let Some(flight) = state.in_flight.remove(&id) {
                    flight.abort.abort();
                }
                state.queue.cancel(&id);
                cancelled.push(id);
            }
            cancelled.len()
        };
        if cancelled > 0 {
            tracing::debug!(count = cancelled, "images cancelled");
            telemetry::record_cancellation(cancelled);
            self.inner.idle.notify_waiters();
        }
        cancelled
    }

    /// Apply the scroll policy: a hidden hero cancels agent thumbnails.
    pub fn on_hero_visibility_changed(&self, is_hero_visible: bool) {
        if is_hero_visible {
            return;
        }
        let count = self.cancel_all_images(|id| id.starts_with(AGENT_THUMBNAIL_PREFIX));
        tracing::info!(count, "hero left viewport, agent thumbnails cancelled");
    }

    /// Follow a hero visibility signal until it closes or `shutdown` fires.
    pub fn spawn_hero_watch(
        &self,
        mut hero_visible: watch::Receiver<bool>,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        let loader = self.clone();
        self.inner.runtime.spawn(async move {
            let initial = *hero_visible.borrow_and_update();
            loader.on_hero_visibility_changed(initial);
            loop {
                tokio::select! {
                    biased;
                    () = shutdown.cancelled() => break,
                    changed = hero_visible.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let visible = *hero_visible.borrow_and_update();
                        loader.on_hero_visibility_changed(visible);
                    }
                }
            }
        })
    }

    /// Spawn the periodic drain that covers under-firing background work.
    pub fn spawn_safety_net(&self, shutdown: CancellationToken) -> JoinHandle<()> {
        let loader = self.clone();
        let period = self.inner.safety_net_interval;
        self.inner.runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = shutdown.cancelled() => {
                        tracing::debug!("safety net: shutdown signal received");
                        break;
                    }
                    _ = ticker.tick() => loader.safety_net_tick(),
                }
            }
        })
    }

    fn safety_net_tick(&self) {
        let should_drain = {
            let state = self.inner.state.lock();
            state.queue.queue_size() > 0 && state.queue.has_capacity()
        };
        if should_drain {
            self.process_queue();
        }
    }

    /// Runtime the loader spawns fetches on.
    pub fn runtime(&self) -> &tokio::runtime::Handle {
        &self.inner.runtime
    }

    /// Wait until nothing is pending or loading. Returns false on timeout.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_idle() {
                return true;
            }
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return false;
            }
            tokio::select! {
                _ = &mut notified => continue,
                _ = tokio::time::sleep(remaining) => return self.is_idle(),
            }
        }
    }

    pub fn is_idle(&self) -> bool {
        let state = self.inner.state.lock();
        state.queue.queue_size() == 0 && state.queue.loading_count() == 0
    }

    pub fn is_image_loaded(&self, id: &str) -> bool {
        self.inner.state.lock().queue.is_loaded(id)
    }

    pub fn is_image_loading(&self, id: &str) -> bool {
        self.inner.state.lock().queue.is_loading(id)
    }

    pub fn has_image_failed(&self, id: &str) -> bool {
        self.inner.state.lock().queue.has_failed(id)
    }

    pub fn is_image_cancelled(&self, id: &str) -> bool {
        self.inner.state.lock().queue.is_cancelled(id)
    }

    pub fn is_image_pending(&self, id: &str) -> bool {
        self.inner.state.lock().queue.is_pending(id)
    }

    pub fn stats(&self) -> LoaderStats {
        let state = self.inner.state.lock();
        LoaderStats {
            pending: state.queue.queue_size(),
            loading: state.queue.loading_count(),
            loaded: state.queue.loaded_count(),
            failed: state.queue.failed_count(),
            cancelled: state.queue.cancelled_count(),
        }
    }

    /// Abort everything in flight and forget all state.
    pub fn reset(&self) {
        let mut state = self.inner.state.lock();
        for (_, flight) in state.in_flight.drain() {
            flight.abort.abort();
        }
        state.queue.reset();
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
