//! Per-channel cooldown debouncing

use std::time::{Duration, Instant};
use tracing::debug;

/// Cooldown gate for one edge-triggered channel (blink, yawn or tilt).
///
/// The condition is sampled once per tick. While it stays true the channel
/// fires again every time the cooldown has strictly elapsed.
#[derive(Debug, Clone)]
pub struct ChannelDebouncer {
    name: &'static str,
    cooldown: Duration,
    last_fired: Option<Instant>,
    fire_count: u64,
}

impl ChannelDebouncer {
    /// Create a debouncer that has never fired
    pub fn new(name: &'static str, cooldown: Duration) -> Self {
        Self {
            name,
            cooldown,
            last_fired: None,
            fire_count: 0,
        }
    }

    /// Check whether a firing at `now` would pass the cooldown gate
    pub fn should_fire(&self, now: Instant) -> bool {
        match self.last_fired {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.cooldown,
        }
    }

    /// Record a firing at `now`
    pub fn record_fire(&mut self, now: Instant) {
        self.last_fired = Some(now);
        self.fire_count += 1;
    }

    /// Sample the channel. Returns `true` and records the firing when the
    /// condition holds and the channel is out of cooldown.
    pub fn try_fire(&mut self, condition: bool, now: Instant) -> bool {
        if !condition {
            return false;
        }
        if !self.should_fire(now) {
            debug!("{} suppressed: in cooldown period", self.name);
            return false;
        }
        self.record_fire(now);
        true
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn last_fired(&self) -> Option<Instant> {
        self.last_fired
    }

    /// Total firings since creation; unaffected by counter resets
    pub fn fire_count(&self) -> u64 {
        self.fire_count
    }
}
