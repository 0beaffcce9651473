//! Fatigue Detection Scheduler
//!
//! Drives the fatigue engine at a fixed cadence from a landmark source,
//! one inference at a time, skipping ticks while an inference is pending.

mod scheduler;

pub use scheduler::{DetectionLoop, SchedulerError};
