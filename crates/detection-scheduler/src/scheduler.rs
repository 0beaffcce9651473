//! Detection Loop Implementation

use std::sync::Arc;
use std::time::Duration;

use alerting::{Counters, FatigueEvent};
use dms::{ClosureState, DmsAnalysis, DmsConfig, DmsError, FatigueEngine};
use landmark_capture::LandmarkSource;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Errors surfaced to callers of the detection loop
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The landmark model failed to load; detection cannot start
    #[error("Landmark model unavailable: {0}")]
    ModelUnavailable(String),

    #[error(transparent)]
    Engine(#[from] DmsError),
}

type SharedSource = Arc<Mutex<Box<dyn LandmarkSource>>>;

/// Fixed-interval driver for the fatigue engine.
///
/// The engine sits behind a single mutex owned by the loop; callers only
/// reach it through the methods below. At most one inference is outstanding:
/// ticks that come due while `detect` is still running are skipped.
pub struct DetectionLoop {
    engine: Arc<Mutex<FatigueEngine>>,
    source: SharedSource,
    poll_interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl DetectionLoop {
    /// Create a stopped loop around a new engine
    pub fn new(config: DmsConfig, source: Box<dyn LandmarkSource>) -> Result<Self, SchedulerError> {
        let poll_interval = config.poll_interval();
        let engine = FatigueEngine::new(config)?;
        info!("Detection loop created with {:?} poll interval", poll_interval);

        Ok(Self {
            engine: Arc::new(Mutex::new(engine)),
            source: Arc::new(Mutex::new(source)),
            poll_interval,
            task: None,
        })
    }

    /// Start detection, loading the landmark model first if needed.
    ///
    /// Starting a running loop is a no-op.
    pub async fn start(&mut self) -> Result<(), SchedulerError> {
        if self.is_running() {
            debug!("Detection loop already running");
            return Ok(());
        }

        {
            let mut source = self.source.lock().await;
            if !source.is_loaded() {
                source.load().await.map_err(|e| {
                    error!("Cannot start detection: {}", e);
                    SchedulerError::ModelUnavailable(e.to_string())
                })?;
            }
        }

        self.engine.lock().await.start_detection();
        info!("Starting fatigue detection");

        self.task = Some(tokio::spawn(run_loop(
            Arc::clone(&self.engine),
            Arc::clone(&self.source),
            self.poll_interval,
        )));
        Ok(())
    }

    /// Stop detection. Cancels the pending tick and any in-flight inference,
    /// then drops the eye closure in progress. Counters and cooldowns are kept.
    ///
    /// Returns `false` when the loop was not running.
    pub async fn stop(&mut self) -> bool {
        let Some(task) = self.task.take() else {
            self.engine.lock().await.cancel_closure();
            return false;
        };

        task.abort();
        if let Err(e) = task.await {
            if e.is_panic() {
                error!("Detection task panicked: {}", e);
            }
        }

        self.engine.lock().await.stop_detection();
        info!("Fatigue detection stopped");
        true
    }

    /// Check if the loop is running
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Zero the counters and log the reset
    pub async fn reset(&self) -> Counters {
        let mut engine = self.engine.lock().await;
        engine.reset_counters();
        engine.counters()
    }

    pub async fn counters(&self) -> Counters {
        self.engine.lock().await.counters()
    }

    /// Up to `limit` events logged after sequence number `after`
    pub async fn events(&self, after: Option<u64>, limit: usize) -> Vec<FatigueEvent> {
        let engine = self.engine.lock().await;
        engine.events_since(after).iter().take(limit).cloned().collect()
    }

    pub async fn last_analysis(&self) -> Option<DmsAnalysis> {
        self.engine.lock().await.last_analysis().cloned()
    }

    pub async fn closure_state(&self) -> ClosureState {
        self.engine.lock().await.closure_state()
    }

    pub async fn tick_count(&self) -> u64 {
        self.engine.lock().await.tick_count()
    }
}

impl Drop for DetectionLoop {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_loop(engine: Arc<Mutex<FatigueEngine>>, source: SharedSource, poll_interval: Duration) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut busy_until: Option<Instant> = None;

    loop {
        let scheduled = ticker.tick().await;

        // A tick that came due while the previous inference was running is
        // dropped; `Skip` then aligns the next tick to the interval grid.
        if busy_until.is_some_and(|done| scheduled < done) {
            debug!("Skipping tick scheduled during a pending inference");
            continue;
        }

        let detected = {
            let mut source = source.lock().await;
            source.detect().await
        };
        let frame = match detected {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Landmark detection failed, treating tick as no face: {}", e);
                None
            }
        };

        let now = Instant::now();
        let latency = now.duration_since(scheduled);
        if latency > poll_interval {
            warn!("Inference took {:?}, longer than the {:?} poll interval", latency, poll_interval);
        }
        busy_until = Some(now);

        engine.lock().await.tick(now.into_std(), frame.as_ref());
    }
}
