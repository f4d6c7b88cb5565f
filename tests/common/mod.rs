//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use landing_preload::scheduler::{
    FetchPriority, ImageFetcher, ImageLoader, ImmediateScheduler, LoadError, LoaderConfig,
};

/// Fetcher that blocks every fetch until a permit is released.
/// Urls containing "broken" fail once admitted.
pub struct GateFetcher {
    started: Mutex<Vec<String>>,
    gate: Semaphore,
}

impl GateFetcher {
    /// All fetches wait for [`GateFetcher::release`].
    pub fn closed() -> Arc<Self> {
        Arc::new(Self {
            started: Mutex::new(Vec::new()),
            gate: Semaphore::new(0),
        })
    }

    /// Fetches complete as soon as they run.
    pub fn open() -> Arc<Self> {
        let fetcher = Self::closed();
        fetcher.open_gate();
        fetcher
    }

    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn open_gate(&self) {
        self.gate.add_permits(Semaphore::MAX_PERMITS / 2);
    }

    /// Urls in the order their fetches began.
    pub fn started(&self) -> Vec<String> {
        self.started.lock().clone()
    }

    pub fn started_count(&self) -> usize {
        self.started.lock().len()
    }
}

#[async_trait]
impl ImageFetcher for GateFetcher {
    async fn fetch(&self, url: &str, _hint: FetchPriority) -> Result<Vec<u8>, LoadError> {
        self.started.lock().push(url.to_string());
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| LoadError::fetch(url, e))?;
        permit.forget();
        if url.contains("broken") {
            return Err(LoadError::fetch(url, "404 Not Found"));
        }
        Ok(vec![0u8; 128])
    }
}

/// Loader with the immediate background scheduler.
pub fn immediate_loader(fetcher: Arc<GateFetcher>, max_concurrent: usize) -> ImageLoader {
    let config = LoaderConfig {
        max_concurrent,
        safety_net_interval: Duration::from_millis(500),
    };
    ImageLoader::new(config, fetcher, Arc::new(ImmediateScheduler))
}

/// Let spawned fetch tasks run without advancing time.
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}
