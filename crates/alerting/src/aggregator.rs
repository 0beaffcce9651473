//! Event log and counters

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::events::{EventKind, FatigueEvent};

/// Cumulative count per fatigue event kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub blinks: u64,
    pub yawns: u64,
    pub microsleeps: u64,
    pub head_tilts: u64,
}

impl Counters {
    fn increment(&mut self, kind: EventKind) {
        match kind {
            EventKind::Blink => self.blinks += 1,
            EventKind::Yawn => self.yawns += 1,
            EventKind::Microsleep => self.microsleeps += 1,
            EventKind::Tilt => self.head_tilts += 1,
            EventKind::Info => {}
        }
    }

    pub fn total(&self) -> u64 {
        self.blinks + self.yawns + self.microsleeps + self.head_tilts
    }
}

/// Events retained when no limit is configured
pub const DEFAULT_HISTORY_LIMIT: usize = 10_000;

/// Append-only event log with per-kind counters.
///
/// The log keeps the most recent `history_limit` events. Evicted events keep
/// their counter contributions and sequence numbers are never reused.
#[derive(Debug)]
pub struct EventAggregator {
    events: Vec<FatigueEvent>,
    counters: Counters,
    next_seq: u64,
    history_limit: usize,
}

impl Default for EventAggregator {
    fn default() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl EventAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log that keeps at most `limit` events (minimum 1)
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            events: Vec::new(),
            counters: Counters::default(),
            next_seq: 0,
            history_limit: limit.max(1),
        }
    }

    /// Append an event and bump its counter. Returns the assigned sequence number.
    pub fn emit(&mut self, mut event: FatigueEvent) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        event.seq = seq;

        self.counters.increment(event.kind);
        metrics::counter!("fatigue_events_total", "kind" => event.kind.as_str()).increment(1);

        info!(
            "Event #{}: {} ({:?}) - {}",
            seq,
            event.kind.as_str(),
            event.severity,
            event.description
        );
        self.events.push(event);

        if self.events.len() > self.history_limit {
            let excess = self.events.len() - self.history_limit;
            self.events.drain(..excess);
            debug!("Evicted {} old events from history", excess);
        }
        seq
    }

    /// Zero every counter and log a single informational event.
    ///
    /// Channel cooldowns and microsleep episodes live elsewhere and are not
    /// affected.
    pub fn reset(&mut self) {
        self.counters = Counters::default();
        self.emit(FatigueEvent::info("Counters reset"));
    }

    /// Snapshot of the counters
    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// The retained event log in emission order
    pub fn events(&self) -> &[FatigueEvent] {
        &self.events
    }

    /// Events with a sequence number greater than `seq`
    pub fn events_since(&self, seq: Option<u64>) -> &[FatigueEvent] {
        match seq {
            None => &self.events,
            Some(seq) => {
                let start = self.events.partition_point(|e| e.seq <= seq);
                &self.events[start..]
            }
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_counts_by_kind() {
        let mut log = EventAggregator::new();
        log.emit(FatigueEvent::blink());
        log.emit(FatigueEvent::blink());
        log.emit(FatigueEvent::yawn());
        log.emit(FatigueEvent::microsleep(3000));

        let counters = log.counters();
        assert_eq!(counters.blinks, 2);
        assert_eq!(counters.yawns, 1);
        assert_eq!(counters.microsleeps, 1);
        assert_eq!(counters.head_tilts, 0);
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn test_info_not_counted() {
        let mut log = EventAggregator::new();
        log.emit(FatigueEvent::info("Fatigue detection started"));
        assert_eq!(log.counters().total(), 0);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_reset_zeroes_and_logs_once() {
        let mut log = EventAggregator::new();
        log.emit(FatigueEvent::tilt());
        log.emit(FatigueEvent::yawn());
        log.reset();

        assert_eq!(log.counters(), Counters::default());
        assert_eq!(log.len(), 3);
        let last = log.events().last().unwrap();
        assert_eq!(last.kind, EventKind::Info);
        assert_eq!(last.description, "Counters reset");
    }

    #[test]
    fn test_sequence_numbers_and_paging() {
        let mut log = EventAggregator::new();
        for _ in 0..5 {
            log.emit(FatigueEvent::blink());
        }
        let seqs: Vec<u64> = log.events().iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2, 3, 4]);

        assert_eq!(log.events_since(None).len(), 5);
        let tail = log.events_since(Some(2));
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].seq, 3);
        assert!(log.events_since(Some(4)).is_empty());
    }

    #[test]
    fn test_history_limit_evicts_oldest() {
        let mut log = EventAggregator::with_history_limit(3);
        for _ in 0..5 {
            log.emit(FatigueEvent::blink());
        }

        let seqs: Vec<u64> = log.events().iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![2, 3, 4]);
        assert_eq!(log.counters().blinks, 5);

        // paging from an evicted cursor resumes at the oldest retained event
        assert_eq!(log.events_since(Some(0)).len(), 3);
        assert_eq!(log.events_since(Some(3)).len(), 1);
        assert_eq!(log.emit(FatigueEvent::yawn()), 5);
    }
}
