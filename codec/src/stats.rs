//! Per-stream coding statistics.

use wire::{EventKind, EVENT_KIND_COUNT};

use crate::float_cache::FloatPath;

/// How many floats took each coding path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FloatPathCounts {
    pub exact: u64,
    pub delta: u64,
    pub literal: u64,
}

impl FloatPathCounts {
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.exact + self.delta + self.literal
    }
}

/// Counters collected while a stream is encoded or decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamStats {
    events: [u64; EVENT_KIND_COUNT],
    /// Events coded with the one-bit repeat shortcut.
    pub repeats: u64,
    pub floats: FloatPathCounts,
    /// Payload size in bits, header excluded.
    pub payload_bits: u64,
}

impl Default for StreamStats {
    fn default() -> Self {
        Self {
            events: [0; EVENT_KIND_COUNT],
            repeats: 0,
            floats: FloatPathCounts::default(),
            payload_bits: 0,
        }
    }
}

impl StreamStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn event_count(&self, kind: EventKind) -> u64 {
        self.events[kind.index()]
    }

    #[must_use]
    pub fn total_events(&self) -> u64 {
        self.events.iter().sum()
    }

    /// Kinds that occurred at least once, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (EventKind, u64)> + '_ {
        EventKind::ALL
            .into_iter()
            .map(|kind| (kind, self.events[kind.index()]))
            .filter(|&(_, count)| count > 0)
    }

    pub(crate) fn record_event(&mut self, kind: EventKind, repeat: bool) {
        self.events[kind.index()] += 1;
        if repeat {
            self.repeats += 1;
        }
    }

    pub(crate) fn record_float(&mut self, path: FloatPath) {
        match path {
            FloatPath::Exact { .. } => self.floats.exact += 1,
            FloatPath::Delta { .. } => self.floats.delta += 1,
            FloatPath::Literal => self.floats.literal += 1,
        }
    }
}
