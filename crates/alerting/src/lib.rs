//! Fatigue Alerting
//!
//! Turns per-tick channel conditions into discrete fatigue events:
//! - Cooldown debouncing per edge-triggered channel (blink, yawn, tilt)
//! - Ordered, append-only event log with bounded history
//! - Per-type counters with reset

mod aggregator;
mod debounce;
mod events;

pub use aggregator::{Counters, EventAggregator, DEFAULT_HISTORY_LIMIT};
pub use debounce::ChannelDebouncer;
pub use events::{EventKind, FatigueEvent, Severity};
