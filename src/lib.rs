//! Landing page image preloading.
//!
//! A small in-memory scheduler that orders image fetches by priority tier,
//! caps concurrency, supports cancellation and reacts to scroll position.
//!
//! # Components
//!
//! - [`scheduler`]: resource queue, image loader, wave-based preloading
//! - [`viewport`]: hero, section and header observers fed by element geometry
//! - [`animation`]: auto-advancing breakdown reveal that drives wave preloads
//! - [`manifest`]: TOML description of the page's images
//!
//! The rendering layer stays outside this crate. It reports element rects
//! and user input; the crate decides what to fetch and when.

pub mod animation;
pub mod cli;
pub mod config;
pub mod manifest;
pub mod scheduler;
pub mod telemetry;
pub mod viewport;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use animation::{BreakdownSection, BreakdownTiming};
use config::EnvConfig;
use manifest::{AssetManifest, ManifestError, ThumbnailRequest};
use scheduler::{
    BackgroundScheduler, CompletionRx, DeferredScheduler, FileFetcher, ImageFetcher, ImageLoader,
    ImageSource, ImmediateScheduler, LoaderConfig, SchedulerMode, WaveConfig, WaveScheduler,
};
use viewport::{HeroViewport, IntersectionOptions, RootMargin, HERO_ROOT_MARGIN};

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub loader: LoaderConfig,
    pub scheduler: SchedulerMode,
    pub idle_delay: Duration,
    pub breakdown: BreakdownTiming,
    pub preload_lead: Duration,
    pub hero_threshold: f64,
    pub asset_root: PathBuf,
    pub cdn_url: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::from(&EnvConfig::default())
    }
}

impl From<&EnvConfig> for RuntimeConfig {
    fn from(env: &EnvConfig) -> Self {
        Self {
            loader: env.loader.clone(),
            scheduler: env.scheduler,
            idle_delay: env.idle_delay,
            breakdown: env.breakdown,
            preload_lead: env.preload_lead,
            hero_threshold: env.hero_threshold,
            asset_root: env.asset_root.clone(),
            cdn_url: env.cdn_url.clone(),
        }
    }
}

/// One page's preloading machinery: loader, hero observer and their tasks.
pub struct PreloadRuntime {
    config: RuntimeConfig,
    loader: ImageLoader,
    hero: HeroViewport,
    shutdown: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl PreloadRuntime {
    /// Build a runtime over `fetcher`. Must be called inside a tokio runtime.
    pub fn new(config: RuntimeConfig, fetcher: Arc<dyn ImageFetcher>) -> Self {
        let background: Arc<dyn BackgroundScheduler> = match config.scheduler {
            SchedulerMode::Immediate => Arc::new(ImmediateScheduler),
            SchedulerMode::Deferred => Arc::new(DeferredScheduler::new(config.idle_delay)),
        };
        let loader = ImageLoader::new(config.loader.clone(), fetcher, background);

        let root_margin: RootMargin = HERO_ROOT_MARGIN.parse().unwrap_or_default();
        let hero = HeroViewport::with_options(IntersectionOptions::new(
            config.hero_threshold,
            root_margin,
        ));

        Self {
            config,
            loader,
            hero,
            shutdown: CancellationToken::new(),
            tasks: Vec::new(),
        }
    }

    /// Build a runtime that reads assets from `config.asset_root`.
    pub fn with_file_fetcher(config: RuntimeConfig) -> Self {
        let fetcher = FileFetcher::new(config.asset_root.clone()).with_cdn_url(config.cdn_url.clone());
        Self::new(config, Arc::new(fetcher))
    }

    /// Start the safety-net drain and the hero-exit cancellation watch.
    pub fn start(&mut self) {
        if !self.tasks.is_empty() {
            return;
        }
        self.tasks.push(self.loader.spawn_safety_net(self.shutdown.child_token()));
        self.tasks.push(
            self.loader
                .spawn_hero_watch(self.hero.subscribe(), self.shutdown.child_token()),
        );
        tracing::info!(
            max_concurrent = self.config.loader.max_concurrent,
            scheduler = ?self.config.scheduler,
            "preload runtime started"
        );
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn loader(&self) -> &ImageLoader {
        &self.loader
    }

    pub fn hero(&self) -> &HeroViewport {
        &self.hero
    }

    /// Hero observer; feed it the hero's rect on scroll.
    pub fn hero_mut(&mut self) -> &mut HeroViewport {
        &mut self.hero
    }

    /// Queue the hero thumbnails. Returns each planned request with its receiver.
    pub fn preload_thumbnails(
        &self,
        manifest: &AssetManifest,
        selected: Option<&str>,
    ) -> Result<Vec<(ThumbnailRequest, CompletionRx)>, ManifestError> {
        let plan = manifest.thumbnail_requests(selected)?;
        Ok(plan
            .into_iter()
            .map(|request| {
                let rx = self.loader.load_image_tracked(
                    request.id.clone(),
                    request.url.clone(),
                    request.priority,
                );
                (request, rx)
            })
            .collect())
    }

    /// Wave scheduler over an arbitrary image grid.
    pub fn wave_scheduler(
        &self,
        source: Arc<dyn ImageSource>,
        tracks: usize,
        items_per_track: usize,
    ) -> WaveScheduler {
        let config = WaveConfig {
            tracks,
            items_per_track,
            dwell: self.config.breakdown.dwell,
            preload_lead: self.config.preload_lead,
        };
        WaveScheduler::new(self.loader.clone(), source, config)
    }

    /// Breakdown section for the manifest's reason tracks.
    pub fn breakdown_section(&self, manifest: Arc<AssetManifest>) -> BreakdownSection {
        let lengths = manifest.track_lengths();
        let scheduler = self.wave_scheduler(manifest.clone(), lengths.len(), manifest.max_track_len());
        BreakdownSection::new(scheduler, &lengths, self.config.breakdown)
    }

    /// Stop background tasks and abort in-flight fetches.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "preload task ended abnormally");
            }
        }
        self.loader.reset();
        tracing::info!("preload runtime stopped");
    }
}

impl Drop for PreloadRuntime {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
