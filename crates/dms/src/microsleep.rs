//! Microsleep episode tracking

use std::time::{Duration, Instant};
use tracing::debug;

/// Eye-closure state of the tracked face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosureState {
    /// Eyes open, or no face
    Open,
    /// Eyes continuously closed since `start`
    Closing { start: Instant, fired: bool },
}

/// Fires once per continuous eye-closure episode that reaches the threshold.
///
/// A tick is eligible when the closure has lasted `[threshold, threshold +
/// window)`. Only the first eligible tick of an episode fires. This relies on
/// the poll interval being shorter than the window: a tick that steps over
/// the whole window leaves the episode without an event.
#[derive(Debug, Clone)]
pub struct MicrosleepTracker {
    threshold: Duration,
    window: Duration,
    state: ClosureState,
}

impl MicrosleepTracker {
    pub fn new(threshold: Duration, window: Duration) -> Self {
        Self {
            threshold,
            window,
            state: ClosureState::Open,
        }
    }

    /// Feed one tick. Returns the closure duration when a microsleep fires.
    pub fn update(&mut self, eyes_closed: bool, now: Instant) -> Option<Duration> {
        if !eyes_closed {
            self.clear();
            return None;
        }

        let (start, fired) = match self.state {
            ClosureState::Open => {
                debug!("Eye closure episode started");
                self.state = ClosureState::Closing { start: now, fired: false };
                (now, false)
            }
            ClosureState::Closing { start, fired } => (start, fired),
        };

        let elapsed = now.saturating_duration_since(start);
        let in_window = elapsed >= self.threshold && elapsed < self.threshold + self.window;
        if in_window && !fired {
            self.state = ClosureState::Closing { start, fired: true };
            return Some(elapsed);
        }
        None
    }

    /// End any episode in progress
    pub fn clear(&mut self) {
        if matches!(self.state, ClosureState::Closing { .. }) {
            debug!("Eye closure episode ended");
        }
        self.state = ClosureState::Open;
    }

    pub fn state(&self) -> ClosureState {
        self.state
    }

    /// Start of the current episode, if the eyes are closed
    pub fn closure_start(&self) -> Option<Instant> {
        match self.state {
            ClosureState::Open => None,
            ClosureState::Closing { start, .. } => Some(start),
        }
    }
}
