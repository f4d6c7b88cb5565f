//! Auto-advancing reveal sequence for one reason track.
//!
//! The animation is time-stepped: callers pass `now` into every method and
//! call [`BreakdownAnimation::tick`] whenever [`next_deadline`] passes.
//!
//! [`next_deadline`]: BreakdownAnimation::next_deadline

use std::time::{Duration, Instant};

use serde::Serialize;

/// Default time an item stays expanded with its loader bar running.
pub const DEFAULT_DWELL: Duration = Duration::from_millis(5000);
/// Default gap between collapsing one item and expanding the next.
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakdownTiming {
    pub dwell: Duration,
    pub transition: Duration,
}

impl Default for BreakdownTiming {
    fn default() -> Self {
        Self {
            dwell: DEFAULT_DWELL,
            transition: DEFAULT_TRANSITION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Loader bar of the active item finished.
    LoaderComplete,
    /// Expand `index` and restart the loader bar.
    Advance(usize),
    /// Manual pause is over; continue from `index`.
    Resume(usize),
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    at: Instant,
    step: Step,
}

#[derive(Debug, Clone)]
pub struct BreakdownAnimation {
    total: usize,
    timing: BreakdownTiming,
    in_view: bool,
    active: Option<usize>,
    loader_active: bool,
    paused: bool,
    scheduled: Option<Scheduled>,
}

impl BreakdownAnimation {
    pub fn new(total: usize, timing: BreakdownTiming) -> Self {
        Self {
            total,
            timing,
            in_view: false,
            active: None,
            loader_active: false,
            paused: false,
            scheduled: None,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn is_loader_active(&self) -> bool {
        self.loader_active
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_in_view(&self) -> bool {
        self.in_view
    }

    /// When the next step is due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduled.map(|s| s.at)
    }

    /// Entering view starts the sequence at item 0; leaving resets it.
    pub fn set_in_view(&mut self, in_view: bool, now: Instant) -> Option<usize> {
        if self.in_view == in_view {
            return None;
        }
        self.in_view = in_view;

        if !in_view {
            self.active = None;
            self.loader_active = false;
            self.paused = false;
            self.scheduled = None;
            return None;
        }
        if self.total == 0 || self.active.is_some() || self.scheduled.is_some() {
            return None;
        }
        self.expand(0, now);
        self.active
    }

    /// User click on `index`. Returns the active index afterwards.
    pub fn toggle(&mut self, index: usize, now: Instant) -> Option<usize> {
        if index >= self.total {
            return self.active;
        }
        let next = (index + 1) % self.total;

        if self.active == Some(index) {
            self.active = None;
            self.loader_active = false;
            self.paused = false;
            self.schedule(now + self.timing.transition, Step::Advance(next));
        } else {
            self.active = Some(index);
            self.loader_active = false;
            self.paused = true;
            self.schedule(now + self.timing.dwell, Step::Resume(next));
        }
        self.active
    }

    /// Runs every step due at or before `now`. Returns the new active index
    /// when an automatic advance changed it.
    pub fn tick(&mut self, now: Instant) -> Option<usize> {
        let before = self.active;

        while let Some(due) = self.scheduled.filter(|s| s.at <= now) {
            self.scheduled = None;
            match due.step {
                Step::LoaderComplete => {
                    self.loader_active = false;
                    if let Some(active) = self.active {
                        let next = (active + 1) % self.total;
                        self.schedule(due.at + self.timing.transition, Step::Advance(next));
                    }
                }
                Step::Advance(index) => self.expand(index, due.at),
                Step::Resume(index) => {
                    self.paused = false;
                    self.expand(index, due.at);
                }
            }
        }

        match self.active {
            Some(index) if self.active != before => Some(index),
            _ => None,
        }
    }

    fn expand(&mut self, index: usize, at: Instant) {
        self.active = Some(index);
        self.loader_active = true;
        self.schedule(at + self.timing.dwell, Step::LoaderComplete);
    }

    fn schedule(&mut self, at: Instant, step: Step) {
        self.scheduled = Some(Scheduled { at, step });
    }
}
