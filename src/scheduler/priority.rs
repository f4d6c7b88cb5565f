//! Resource prioritization.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::str::FromStr;

/// Priority tier for resource loading. Lower rank is served first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourcePriority {
    /// Above the fold: the selected agent thumbnail, the first reason image.
    Critical = 0,
    /// First image of every reason track.
    High = 1,
    /// Next agent thumbnail, second reason images.
    Medium = 2,
    /// Third reason images.
    Low = 3,
    /// Remaining thumbnails and anything off screen.
    Lazy = 4,
}

impl ResourcePriority {
    pub const ALL: [ResourcePriority; 5] = [
        Self::Critical,
        Self::High,
        Self::Medium,
        Self::Low,
        Self::Lazy,
    ];

    /// Numeric rank used for queue ordering.
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Tiers that drain the queue synchronously instead of in the background.
    pub fn is_urgent(self) -> bool {
        matches!(self, Self::Critical | Self::High)
    }

    /// Fetch hint handed to the transport.
    pub fn fetch_priority(self) -> FetchPriority {
        match self {
            Self::Critical | Self::High => FetchPriority::High,
            Self::Medium => FetchPriority::Auto,
            Self::Low | Self::Lazy => FetchPriority::Low,
        }
    }

    /// Priority of the n-th image of a reveal track (0 HIGH, 1 MEDIUM, else LOW).
    pub fn for_wave(wave: usize) -> Self {
        match wave {
            0 => Self::High,
            1 => Self::Medium,
            _ => Self::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Lazy => "LAZY",
        }
    }
}

impl Default for ResourcePriority {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for ResourcePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourcePriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" => Ok(Self::Critical),
            "HIGH" => Ok(Self::High),
            "MEDIUM" => Ok(Self::Medium),
            "LOW" => Ok(Self::Low),
            "LAZY" => Ok(Self::Lazy),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// Transport-level fetch priority hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchPriority {
    High,
    Auto,
    Low,
}

impl fmt::Display for FetchPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "high",
            Self::Auto => "auto",
            Self::Low => "low",
        })
    }
}

/// Item with associated priority for queue ordering.
#[derive(Debug)]
pub struct PrioritizedItem<T> {
    pub priority: ResourcePriority,
    pub sequence: u64,
    pub item: T,
}

impl<T> PartialEq for PrioritizedItem<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl<T> Eq for PrioritizedItem<T> {}

impl<T> PartialOrd for PrioritizedItem<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for PrioritizedItem<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: the lowest rank, then the lowest sequence, must compare greatest.
        match other.priority.rank().cmp(&self.priority.rank()) {
            Ordering::Equal => other.sequence.cmp(&self.sequence),
            ord => ord,
        }
    }
}

/// Stable priority queue: rank order, FIFO within a rank.
pub struct PriorityQueue<T> {
    heap: BinaryHeap<PrioritizedItem<T>>,
    next_sequence: u64,
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }

    pub fn push(&mut self, item: T, priority: ResourcePriority) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(PrioritizedItem { priority, sequence, item });
    }

    pub fn pop(&mut self) -> Option<T> {
        self.heap.pop().map(|p| p.item)
    }

    /// Keep only the items matching `keep`. Order of the rest is preserved.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.heap.retain(|p| keep(&p.item));
    }

    /// Iterate in arbitrary (heap) order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.heap.iter().map(|p| &p.item)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_follow_declaration_order() {
        let ranks: Vec<u8> = ResourcePriority::ALL.iter().map(|p| p.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4]);
        assert!(ResourcePriority::Critical < ResourcePriority::Lazy);
    }

    #[test]
    fn fetch_hint_mapping() {
        assert_eq!(ResourcePriority::Critical.fetch_priority(), FetchPriority::High);
        assert_eq!(ResourcePriority::High.fetch_priority(), FetchPriority::High);
        assert_eq!(ResourcePriority::Medium.fetch_priority(), FetchPriority::Auto);
        assert_eq!(ResourcePriority::Low.fetch_priority(), FetchPriority::Low);
        assert_eq!(ResourcePriority::Lazy.fetch_priority(), FetchPriority::Low);
    }

    #[test]
    fn wave_mapping() {
        assert_eq!(ResourcePriority::for_wave(0), ResourcePriority::High);
        assert_eq!(ResourcePriority::for_wave(1), ResourcePriority::Medium);
        assert_eq!(ResourcePriority::for_wave(2), ResourcePriority::Low);
        assert_eq!(ResourcePriority::for_wave(7), ResourcePriority::Low);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("lazy".parse::<ResourcePriority>(), Ok(ResourcePriority::Lazy));
        assert_eq!(" High ".parse::<ResourcePriority>(), Ok(ResourcePriority::High));
        assert!("urgent".parse::<ResourcePriority>().is_err());
    }

    #[test]
    fn retain_keeps_fifo_order() {
        let mut queue = PriorityQueue::new();
        queue.push("a", ResourcePriority::Low);
        queue.push("b", ResourcePriority::Low);
        queue.push("c", ResourcePriority::Low);
        queue.retain(|item| *item != "b");

        assert_eq!(queue.pop(), Some("a"));
        assert_eq!(queue.pop(), Some("c"));
        assert!(queue.is_empty());
    }
}
