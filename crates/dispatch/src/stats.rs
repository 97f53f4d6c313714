use std::collections::VecDeque;

use snrr_transport::Layer;
use uuid::Uuid;

const STATS_RING_CAPACITY: usize = 512;

/// The outcome of a single layer's sub-request, independent of whether it
/// ultimately won the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Error,
    Timeout,
    /// Cancelled before completion because another layer already won.
    Incomplete,
}

/// One instrumented sub-request, retained for diagnostics (spec §4.7).
#[derive(Debug, Clone)]
pub struct DispatchStat {
    pub layer: Layer,
    pub request_id: Uuid,
    pub start_unix_ns: i128,
    pub end_unix_ns: i128,
    pub outcome: Outcome,
}

/// A bounded ring of recent dispatch stats; oldest entries are dropped once
/// capacity is reached.
pub struct StatsRing {
    entries: VecDeque<DispatchStat>,
}

impl Default for StatsRing {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsRing {
    pub fn new() -> Self {
        Self { entries: VecDeque::with_capacity(STATS_RING_CAPACITY) }
    }

    pub fn push(&mut self, stat: DispatchStat) {
        if self.entries.len() == STATS_RING_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(stat);
    }

    pub fn snapshot(&self) -> Vec<DispatchStat> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(n: i128) -> DispatchStat {
        DispatchStat {
            layer: Layer::Direct,
            request_id: Uuid::nil(),
            start_unix_ns: n,
            end_unix_ns: n + 1,
            outcome: Outcome::Success,
        }
    }

    #[test]
    fn ring_drops_oldest_once_full() {
        let mut ring = StatsRing::new();
        for i in 0..(STATS_RING_CAPACITY + 10) {
            ring.push(stat(i as i128));
        }
        let snapshot = ring.snapshot();
        assert_eq!(snapshot.len(), STATS_RING_CAPACITY);
        assert_eq!(snapshot.first().unwrap().start_unix_ns, 10);
    }
}
