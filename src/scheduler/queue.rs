//! Resource queue: pending work ordered by priority plus status sets.
//!
//! An id lives in at most one of `pending` and `loading`. Once it reaches
//! `loaded`, `failed` or `cancelled` it is terminal and `add` ignores it.

use std::collections::HashSet;

use super::priority::PriorityQueue;
use super::request::LoadRequest;

/// Default cap on simultaneous in-flight loads.
pub const DEFAULT_MAX_CONCURRENT: usize = 3;

/// Configuration for the resource queue.
#[derive(Debug, Clone)]
pub struct ResourceQueueConfig {
    pub max_concurrent: usize,
}

impl Default for ResourceQueueConfig {
    fn default() -> Self {
        Self { max_concurrent: DEFAULT_MAX_CONCURRENT }
    }
}

/// Priority-ordered queue of image loads with a concurrency cap.
pub struct ResourceQueue {
    pending: PriorityQueue<LoadRequest>,
    loading: HashSet<String>,
    loaded: HashSet<String>,
    failed: HashSet<String>,
    cancelled: HashSet<String>,
    max_concurrent: usize,
}

impl std::fmt::Debug for ResourceQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceQueue")
            .field("pending", &self.pending.len())
            .field("loading", &self.loading.len())
            .field("loaded", &self.loaded.len())
            .field("failed", &self.failed.len())
            .field("cancelled", &self.cancelled.len())
            .field("max_concurrent", &self.max_concurrent)
            .finish()
    }
}

impl ResourceQueue {
    pub fn new(config: ResourceQueueConfig) -> Self {
        Self {
            pending: PriorityQueue::new(),
            loading: HashSet::new(),
            loaded: HashSet::new(),
            failed: HashSet::new(),
            cancelled: HashSet::new(),
            max_concurrent: config.max_concurrent.max(1),
        }
    }

    /// Queue a request. Returns false when the id is already terminal.
    ///
    /// A pending request with the same id is replaced and the replacement
    /// queues behind existing requests of its tier.
    pub fn add(&mut self, request: LoadRequest) -> bool {
        if self.is_terminal(&request.id) {
            return false;
        }
        let id = request.id.clone();
        self.pending.retain(|r| r.id != id);
        let priority = request.priority;
        self.pending.push(request, priority);
        true
    }

    /// Drop `id` from pending and loading and mark it cancelled. Idempotent.
    pub fn cancel(&mut self, id: &str) {
        self.pending.retain(|r| r.id != id);
        self.loading.remove(id);
        self.cancelled.insert(id.to_string());
    }

    /// Cancel every pending request matching `filter`. Loading entries are
    /// left to the caller. Returns the cancelled ids.
    pub fn cancel_all(&mut self, filter: impl Fn(&LoadRequest) -> bool) -> Vec<String> {
        let ids: Vec<String> = self
            .pending
            .iter()
            .filter(|r| filter(r))
            .map(|r| r.id.clone())
            .collect();
        for id in &ids {
            self.cancel(id);
        }
        ids
    }

    /// Pop the highest priority request and mark it loading.
    /// Returns None when nothing is pending or the cap is reached.
    pub fn get_next(&mut self) -> Option<LoadRequest> {
        if !self.has_capacity() {
            return None;
        }
        let request = self.pending.pop()?;
        self.loading.insert(request.id.clone());
        Some(request)
    }

    pub fn mark_loaded(&mut self, id: &str) {
        self.loading.remove(id);
        self.loaded.insert(id.to_string());
    }

    pub fn mark_failed(&mut self, id: &str) {
        self.loading.remove(id);
        self.failed.insert(id.to_string());
    }

    /// Drop `id` from loading without a terminal transition.
    pub fn release(&mut self, id: &str) {
        self.loading.remove(id);
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.loaded.contains(id)
    }

    pub fn is_loading(&self, id: &str) -> bool {
        self.loading.contains(id)
    }

    pub fn has_failed(&self, id: &str) -> bool {
        self.failed.contains(id)
    }

    pub fn is_cancelled(&self, id: &str) -> bool {
        self.cancelled.contains(id)
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.iter().any(|r| r.id == id)
    }

    fn is_terminal(&self, id: &str) -> bool {
        self.is_loaded(id) || self.has_failed(id) || self.is_cancelled(id)
    }

    /// Number of pending requests.
    pub fn queue_size(&self) -> usize {
        self.pending.len()
    }

    /// Number of in-flight requests.
    pub fn loading_count(&self) -> usize {
        self.loading.len()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn has_capacity(&self) -> bool {
        self.loading.len() < self.max_concurrent
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn cancelled_count(&self) -> usize {
        self.cancelled.len()
    }

    /// Empty the pending list. Status sets are untouched.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Forget everything, including terminal sets.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.loading.clear();
        self.loaded.clear();
        self.failed.clear();
        self.cancelled.clear();
    }
}

impl Default for ResourceQueue {
    fn default() -> Self {
        Self::new(ResourceQueueConfig::default())
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
