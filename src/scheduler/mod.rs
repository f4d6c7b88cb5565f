//! Image scheduling module.
//!
//! Manages the prioritized resource queue, the loader that drains it into
//! fetches, background draining, and wave-based preloading.

mod background;
mod error;
mod fetch;
mod loader;
mod priority;
mod queue;
mod request;
pub mod waves;

pub use background::{
    BackgroundScheduler, BackgroundTask, DeferredScheduler, ImmediateScheduler, SchedulerMode,
};
pub use error::LoadError;
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::{FileFetcher, ImageFetcher};
pub use loader::{
    agent_thumbnail_id, ImageLoader, LoadOptions, LoaderConfig, LoaderStats,
    AGENT_THUMBNAIL_PREFIX, DEFAULT_SAFETY_NET_INTERVAL,
};
pub use priority::{FetchPriority, PrioritizedItem, PriorityQueue, ResourcePriority};
pub use queue::{ResourceQueue, ResourceQueueConfig, DEFAULT_MAX_CONCURRENT};
pub use request::{CompletionRx, LoadRequest, LoadedImage, ResourceKind};
pub use waves::{reason_image_id, ImageSource, WaveConfig, WaveScheduler};
