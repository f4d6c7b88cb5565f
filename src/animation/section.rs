//! One breakdown animation per reason track, wired to the wave scheduler.

use std::time::Instant;

use super::breakdown::{BreakdownAnimation, BreakdownTiming};
use crate::scheduler::WaveScheduler;

#[derive(Debug)]
pub struct BreakdownSection {
    tracks: Vec<BreakdownAnimation>,
    scheduler: WaveScheduler,
}

impl BreakdownSection {
    /// `track_lengths[i]` is the number of items in track `i`.
    pub fn new(scheduler: WaveScheduler, track_lengths: &[usize], timing: BreakdownTiming) -> Self {
        let tracks = track_lengths
            .iter()
            .map(|&total| BreakdownAnimation::new(total, timing))
            .collect();
        Self { tracks, scheduler }
    }

    pub fn track(&self, track: usize) -> Option<&BreakdownAnimation> {
        self.tracks.get(track)
    }

    pub fn scheduler(&self) -> &WaveScheduler {
        &self.scheduler
    }

    pub fn active_indices(&self) -> Vec<Option<usize>> {
        self.tracks.iter().map(|t| t.active_index()).collect()
    }

    /// Earliest pending step across all tracks.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tracks.iter().filter_map(|t| t.next_deadline()).min()
    }

    pub fn set_track_visible(&mut self, track: usize, visible: bool, now: Instant) {
        let Some(animation) = self.tracks.get_mut(track) else {
            return;
        };
        animation.set_in_view(visible, now);
        let active = animation.active_index();
        self.scheduler.set_track_visible(track, visible);
        self.scheduler.update_track(track, active);
    }

    pub fn toggle(&mut self, track: usize, index: usize, now: Instant) -> Option<usize> {
        let animation = self.tracks.get_mut(track)?;
        let active = animation.toggle(index, now);
        self.scheduler.update_track(track, active);
        active
    }

    /// Advances every track; returns `(track, new_index)` for each change.
    pub fn tick(&mut self, now: Instant) -> Vec<(usize, usize)> {
        let changes: Vec<(usize, usize)> = self
            .tracks
            .iter_mut()
            .enumerate()
            .filter_map(|(track, animation)| animation.tick(now).map(|index| (track, index)))
            .collect();
        if !changes.is_empty() {
            self.scheduler.set_active_indices(&self.active_indices());
        }
        changes
    }
}
