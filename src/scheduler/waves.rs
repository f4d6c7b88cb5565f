//! Wave-based preloading for the auto-advancing reason tracks.
//!
//! Images form a grid of tracks x items. Item `n` of every track is wave
//! `n`. Wave 0 loads when the section enters view; later waves load once any
//! track's active item reaches them. Independently, each track preloads its
//! next item shortly before its current step is due to advance.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::AbortHandle;

use super::loader::{ImageLoader, LoadOptions};
use super::priority::ResourcePriority;

/// Default time a track stays on one item.
pub const DEFAULT_DWELL: Duration = Duration::from_millis(5000);
/// Default head start of a preload before the step advances.
pub const DEFAULT_PRELOAD_LEAD: Duration = Duration::from_millis(2000);

/// Highest wave released by the active indices (waves 1 and 2).
const LAST_GATED_WAVE: usize = 2;

/// Id of the image for item `item` of track `track`.
pub fn reason_image_id(track: usize, item: usize) -> String {
    format!("reason-{track}-breakdown-{item}")
}

/// Resolves the url of one grid cell; `None` means no image.
pub trait ImageSource: Send + Sync {
    fn image_url(&self, track: usize, item: usize) -> Option<String>;
}

impl<F> ImageSource for F
where
    F: Fn(usize, usize) -> Option<String> + Send + Sync,
{
    fn image_url(&self, track: usize, item: usize) -> Option<String> {
        self(track, item)
    }
}

#[derive(Debug, Clone)]
pub struct WaveConfig {
    pub tracks: usize,
    pub items_per_track: usize,
    pub dwell: Duration,
    pub preload_lead: Duration,
}

impl WaveConfig {
    pub fn new(tracks: usize, items_per_track: usize) -> Self {
        Self {
            tracks,
            items_per_track,
            dwell: DEFAULT_DWELL,
            preload_lead: DEFAULT_PRELOAD_LEAD,
        }
    }

    /// Delay between an item becoming active and the preload of the next one.
    pub fn preload_delay(&self) -> Duration {
        self.dwell.saturating_sub(self.preload_lead)
    }
}

type PreloadTimers = Arc<Mutex<HashMap<String, AbortHandle>>>;

/// Schedules reason images in waves on top of an [`ImageLoader`].
pub struct WaveScheduler {
    loader: ImageLoader,
    source: Arc<dyn ImageSource>,
    config: WaveConfig,
    in_viewport: bool,
    track_visibility: Vec<bool>,
    active: Vec<Option<usize>>,
    loaded_waves: BTreeSet<usize>,
    timers: PreloadTimers,
}

impl std::fmt::Debug for WaveScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaveScheduler")
            .field("config", &self.config)
            .field("in_viewport", &self.in_viewport)
            .field("active", &self.active)
            .field("loaded_waves", &self.loaded_waves)
            .finish()
    }
}

impl WaveScheduler {
    pub fn new(loader: ImageLoader, source: Arc<dyn ImageSource>, config: WaveConfig) -> Self {
        Self {
            loader,
            source,
            track_visibility: vec![false; config.tracks],
            active: vec![None; config.tracks],
            config,
            in_viewport: false,
            loaded_waves: BTreeSet::new(),
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Section-level visibility. Entering loads wave 0 and resumes preloads;
    /// leaving drops pending preloads.
    pub fn set_in_viewport(&mut self, in_viewport: bool) {
        if self.in_viewport == in_viewport {
            return;
        }
        self.in_viewport = in_viewport;
        tracing::debug!(in_viewport, "reason section visibility changed");
        if in_viewport {
            self.load_wave(0, ResourcePriority::High);
            self.release_gated_waves();
            self.schedule_preloads();
        } else {
            self.clear_timers();
        }
    }

    /// Per-track visibility; the section is in view while any track is.
    pub fn set_track_visible(&mut self, track: usize, visible: bool) {
        if let Some(slot) = self.track_visibility.get_mut(track) {
            *slot = visible;
        }
        let any = self.track_visibility.iter().any(|v| *v);
        self.set_in_viewport(any);
    }

    /// Replace all active indices at once.
    pub fn set_active_indices(&mut self, indices: &[Option<usize>]) {
        let mut next = vec![None; self.config.tracks];
        for (slot, index) in next.iter_mut().zip(indices) {
            *slot = *index;
        }
        if next == self.active {
            return;
        }
        self.active = next;
        self.on_active_changed();
    }

    /// Update one track's active index.
    pub fn update_track(&mut self, track: usize, index: Option<usize>) {
        match self.active.get_mut(track) {
            Some(slot) if *slot != index => *slot = index,
            _ => return,
        }
        self.on_active_changed();
    }

    fn on_active_changed(&mut self) {
        if !self.in_viewport {
            return;
        }
        self.release_gated_waves();
        self.schedule_preloads();
    }

    fn release_gated_waves(&mut self) {
        let Some(max_active) = self.active.iter().flatten().max().copied() else {
            return;
        };
        for wave in 1..=LAST_GATED_WAVE.min(max_active) {
            self.load_wave(wave, ResourcePriority::for_wave(wave));
        }
    }

    fn load_wave(&mut self, wave: usize, priority: ResourcePriority) {
        if !self.in_viewport || self.loaded_waves.contains(&wave) {
            return;
        }
        let mut queued = 0usize;
        for track in 0..self.config.tracks {
            let Some(url) = self.source.image_url(track, wave) else {
                continue;
            };
            let id = reason_image_id(track, wave);
            if self.loader.is_image_loaded(&id) {
                continue;
            }
            self.loader.load_image(id, url, priority, LoadOptions::default());
            queued += 1;
        }
        self.loaded_waves.insert(wave);
        tracing::debug!(wave, %priority, queued, "reason wave released");
    }

    fn schedule_preloads(&mut self) {
        self.clear_timers();
        if self.config.items_per_track == 0 {
            return;
        }
        let runtime = self.loader.runtime().clone();
        let _entered = runtime.enter();
        let deadline = tokio::time::Instant::now() + self.config.preload_delay();
        let mut timers = self.timers.lock();

        for (track, active) in self.active.iter().enumerate() {
            let Some(active) = active else { continue };
            let next = (active + 1) % self.config.items_per_track;
            let Some(url) = self.source.image_url(track, next) else {
                continue;
            };
            let id = reason_image_id(track, next);
            if self.loader.is_image_loaded(&id) {
                continue;
            }

            let loader = self.loader.clone();
            let registry = Arc::clone(&self.timers);
            let timer_id = id.clone();
            let handle = runtime.spawn(async move {
                tokio::time::sleep_until(deadline).await;
                registry.lock().remove(&timer_id);
                tracing::trace!(image_id = %timer_id, "preloading next reason image");
                loader.load_image(timer_id, url, ResourcePriority::for_wave(next), LoadOptions::default());
            });
            if let Some(previous) = timers.insert(id, handle.abort_handle()) {
                previous.abort();
            }
        }
    }

    fn clear_timers(&self) {
        for (_, timer) in self.timers.lock().drain() {
            timer.abort();
        }
    }

    /// Hint priority for an image element, by item index only.
    pub fn image_priority(&self, _track: usize, item: usize) -> ResourcePriority {
        ResourcePriority::for_wave(item)
    }

    /// Whether the image element should be marked as priority content.
    pub fn should_prioritize_image(&self, _track: usize, item: usize) -> bool {
        item == 0
    }

    pub fn is_in_viewport(&self) -> bool {
        self.in_viewport
    }

    /// Waves already released, ascending.
    pub fn loaded_waves(&self) -> Vec<usize> {
        self.loaded_waves.iter().copied().collect()
    }

    pub fn pending_preloads(&self) -> usize {
        self.timers.lock().len()
    }

    /// Ids with a preload timer still waiting.
    pub fn pending_preload_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.timers.lock().keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Drop for WaveScheduler {
    fn drop(&mut self) {
        self.clear_timers();
    }
}
