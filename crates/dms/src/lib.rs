//! Driver Monitoring System (DMS)
//!
//! Real-time fatigue event detection from facial landmarks:
//! - Eye / mouth aspect ratios and heuristic head pose
//! - Threshold classification (eyes closed, yawning, head tilted)
//! - Cooldown-gated blink, yawn and tilt events
//! - Once-per-episode microsleep events

pub mod analysis;
pub mod classifier;
pub mod config;
pub mod features;
pub mod microsleep;

pub use analysis::DmsAnalysis;
pub use classifier::{FaceState, ThresholdClassifier};
pub use config::DmsConfig;
pub use features::{FeatureExtractor, FeatureVector, HeadPose};
pub use microsleep::{ClosureState, MicrosleepTracker};

use std::time::Instant;

use alerting::{ChannelDebouncer, Counters, EventAggregator, EventKind, FatigueEvent};
use landmark_capture::LandmarkFrame;
use thiserror::Error;
use tracing::{info, warn};

/// DMS error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DmsError {
    #[error("Landmark {index} missing for {feature}")]
    FeatureAnomaly { feature: &'static str, index: usize },

    #[error("Feature {0} is not a finite number")]
    NonFiniteFeature(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Fatigue detection engine.
///
/// Owns every piece of per-session state (channel cooldowns, the microsleep
/// episode, the event log and counters) and advances it one tick at a time.
pub struct FatigueEngine {
    extractor: FeatureExtractor,
    classifier: ThresholdClassifier,
    blink: ChannelDebouncer,
    yawn: ChannelDebouncer,
    tilt: ChannelDebouncer,
    microsleep: MicrosleepTracker,
    events: EventAggregator,
    last_analysis: Option<DmsAnalysis>,
    ticks: u64,
    failed_ticks: u64,
}

impl FatigueEngine {
    /// Create a new engine with configuration
    pub fn new(config: DmsConfig) -> Result<Self, DmsError> {
        config.validate()?;
        if !config.cadence_covers_window() {
            warn!(
                "Poll interval {}ms is not shorter than the microsleep window {}ms; microsleeps may be missed",
                config.poll_interval_ms, config.microsleep_window_ms
            );
        }

        Ok(Self {
            extractor: FeatureExtractor::new(),
            classifier: ThresholdClassifier::new(&config),
            blink: ChannelDebouncer::new("blink", config.blink_cooldown()),
            yawn: ChannelDebouncer::new("yawn", config.yawn_cooldown()),
            tilt: ChannelDebouncer::new("tilt", config.tilt_cooldown()),
            microsleep: MicrosleepTracker::new(
                config.microsleep_threshold(),
                config.microsleep_window(),
            ),
            events: EventAggregator::with_history_limit(config.event_history_limit),
            last_analysis: None,
            ticks: 0,
            failed_ticks: 0,
        })
    }

    /// Run one detection cycle for the frame sampled at `now`.
    ///
    /// `None` means no face was tracked. A tick whose features cannot be
    /// computed is dropped without touching any state; `None` is returned.
    pub fn tick(&mut self, now: Instant, frame: Option<&LandmarkFrame>) -> Option<DmsAnalysis> {
        self.ticks += 1;
        match self.process(now, frame) {
            Ok(analysis) => {
                self.last_analysis = Some(analysis.clone());
                Some(analysis)
            }
            Err(e) => {
                self.failed_ticks += 1;
                warn!("Tick {} skipped: {}", self.ticks, e);
                None
            }
        }
    }

    fn process(&mut self, now: Instant, frame: Option<&LandmarkFrame>) -> Result<DmsAnalysis, DmsError> {
        let Some(frame) = frame else {
            self.microsleep.clear();
            return Ok(DmsAnalysis::no_face());
        };

        let features = self.extractor.extract(frame)?;
        let state = self.classifier.classify(&features);

        let mut fired = Vec::new();
        if self.blink.try_fire(state.eyes_closed, now) {
            fired.push(FatigueEvent::blink());
        }
        if self.yawn.try_fire(state.yawning, now) {
            fired.push(FatigueEvent::yawn());
        }
        if self.tilt.try_fire(state.head_tilted, now) {
            fired.push(FatigueEvent::tilt());
        }
        if let Some(closed) = self.microsleep.update(state.eyes_closed, now) {
            fired.push(FatigueEvent::microsleep(closed.as_millis() as u64));
        }

        let emitted = fired.iter().map(|e| e.kind).collect();
        for event in fired {
            self.events.emit(event);
        }

        Ok(DmsAnalysis {
            face_detected: true,
            features,
            state,
            emitted,
            closure_ms: self
                .microsleep
                .closure_start()
                .map(|start| now.saturating_duration_since(start).as_millis() as u64),
        })
    }

    /// Zero the counters and log the reset.
    ///
    /// Cooldowns and any eye closure in progress are kept.
    pub fn reset_counters(&mut self) {
        info!("Resetting fatigue counters");
        self.events.reset();
    }

    /// Log the start of a detection session
    pub fn start_detection(&mut self) {
        self.events.emit(FatigueEvent::info("Fatigue detection started"));
    }

    /// Log the end of a detection session and drop any eye closure in progress.
    ///
    /// Counters and cooldowns are kept.
    pub fn stop_detection(&mut self) {
        self.microsleep.clear();
        self.events.emit(FatigueEvent::info("Detection stopped"));
    }

    /// Drop any eye closure in progress
    pub fn cancel_closure(&mut self) {
        self.microsleep.clear();
    }

    pub fn counters(&self) -> Counters {
        self.events.counters()
    }

    pub fn events(&self) -> &[FatigueEvent] {
        self.events.events()
    }

    /// Events logged after sequence number `seq`
    pub fn events_since(&self, seq: Option<u64>) -> &[FatigueEvent] {
        self.events.events_since(seq)
    }

    pub fn last_analysis(&self) -> Option<&DmsAnalysis> {
        self.last_analysis.as_ref()
    }

    /// Debouncer for an edge-triggered channel
    pub fn channel(&self, kind: EventKind) -> Option<&ChannelDebouncer> {
        match kind {
            EventKind::Blink => Some(&self.blink),
            EventKind::Yawn => Some(&self.yawn),
            EventKind::Tilt => Some(&self.tilt),
            EventKind::Microsleep | EventKind::Info => None,
        }
    }

    pub fn closure_state(&self) -> ClosureState {
        self.microsleep.state()
    }

    /// Ticks processed, including dropped ones
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Ticks dropped because features could not be computed
    pub fn failed_tick_count(&self) -> u64 {
        self.failed_ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landmark_capture::{Landmark, SyntheticFace};
    use std::time::Duration;

    fn engine() -> FatigueEngine {
        FatigueEngine::new(DmsConfig::default()).unwrap()
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = DmsConfig {
            microsleep_window_ms: 0,
            ..Default::default()
        };
        assert!(matches!(FatigueEngine::new(config), Err(DmsError::Config(_))));
    }

    #[test]
    fn test_alert_face_emits_nothing() {
        let mut engine = engine();
        let t0 = Instant::now();
        let frame = SyntheticFace::alert().build();
        for i in 0..50 {
            let analysis = engine.tick(t0 + ms(i * 100), Some(&frame)).unwrap();
            assert!(analysis.face_detected);
            assert!(!analysis.has_events());
        }
        assert!(engine.events().is_empty());
        assert_eq!(engine.tick_count(), 50);
    }

    #[test]
    fn test_closed_eyes_blink_then_microsleep() {
        let mut engine = engine();
        let t0 = Instant::now();
        let frame = SyntheticFace::eyes_closed().build();
        for i in 0..=35 {
            engine.tick(t0 + ms(i * 100), Some(&frame));
        }
        let counters = engine.counters();
        // blinks at 0, 400, 800, ..., 3200
        assert_eq!(counters.blinks, 9);
        assert_eq!(counters.microsleeps, 1);
        let microsleep = engine
            .events()
            .iter()
            .find(|e| e.kind == EventKind::Microsleep)
            .unwrap();
        assert_eq!(microsleep.severity, alerting::Severity::Critical);
    }

    #[test]
    fn test_yawn_and_tilt_same_tick() {
        let mut engine = engine();
        let frame = SyntheticFace::alert()
            .with_mouth_opening(0.8)
            .with_roll(30.0)
            .build();
        let analysis = engine.tick(Instant::now(), Some(&frame)).unwrap();
        assert_eq!(analysis.emitted, vec![EventKind::Yawn, EventKind::Tilt]);
        assert_eq!(analysis.highest_severity(), Some(alerting::Severity::High));
    }

    #[test]
    fn test_no_face_cancels_closure_and_skips_channels() {
        let mut engine = engine();
        let t0 = Instant::now();
        let closed = SyntheticFace::eyes_closed().build();
        for i in 0..25 {
            engine.tick(t0 + ms(i * 100), Some(&closed));
        }
        assert!(matches!(engine.closure_state(), ClosureState::Closing { .. }));
        let before = engine.events().len();

        let analysis = engine.tick(t0 + ms(2500), None).unwrap();
        assert!(!analysis.face_detected);
        assert!(!analysis.has_events());
        assert_eq!(engine.closure_state(), ClosureState::Open);
        assert_eq!(engine.events().len(), before);

        // closure restarts from scratch: 2600..5500 stays under threshold
        for i in 26..56 {
            engine.tick(t0 + ms(i * 100), Some(&closed));
        }
        assert_eq!(engine.counters().microsleeps, 0);
    }

    #[test]
    fn test_failed_tick_is_noop() {
        let mut engine = engine();
        let t0 = Instant::now();
        let closed = SyntheticFace::eyes_closed().build();
        engine.tick(t0, Some(&closed));
        let start = engine.closure_state();

        let collapsed = LandmarkFrame::new(vec![Landmark::new(5.0, 5.0); 478]);
        assert!(engine.tick(t0 + ms(100), Some(&collapsed)).is_none());
        assert_eq!(engine.closure_state(), start);
        assert_eq!(engine.failed_tick_count(), 1);
        assert_eq!(engine.counters().blinks, 1);
    }

    #[test]
    fn test_reset_keeps_cooldowns_and_closure() {
        let mut engine = engine();
        let t0 = Instant::now();
        let closed = SyntheticFace::eyes_closed().build();
        engine.tick(t0, Some(&closed));
        engine.tick(t0 + ms(100), Some(&closed));
        let last_blink = engine.channel(EventKind::Blink).unwrap().last_fired();

        engine.reset_counters();
        assert_eq!(engine.counters(), Counters::default());
        assert_eq!(engine.channel(EventKind::Blink).unwrap().last_fired(), last_blink);
        assert!(matches!(engine.closure_state(), ClosureState::Closing { .. }));

        // still in blink cooldown right after the reset
        let analysis = engine.tick(t0 + ms(200), Some(&closed)).unwrap();
        assert!(!analysis.emitted.contains(&EventKind::Blink));
    }

    #[test]
    fn test_stop_clears_closure_only() {
        let mut engine = engine();
        let t0 = Instant::now();
        let closed = SyntheticFace::eyes_closed().build();
        engine.tick(t0, Some(&closed));
        engine.stop_detection();

        assert_eq!(engine.closure_state(), ClosureState::Open);
        assert_eq!(engine.counters().blinks, 1);
        assert!(engine.channel(EventKind::Blink).unwrap().last_fired().is_some());
        assert_eq!(engine.events().last().unwrap().kind, EventKind::Info);
    }

    #[test]
    fn test_closure_ms_reported() {
        let mut engine = engine();
        let t0 = Instant::now();
        let closed = SyntheticFace::eyes_closed().build();
        engine.tick(t0, Some(&closed));
        let analysis = engine.tick(t0 + ms(700), Some(&closed)).unwrap();
        assert_eq!(analysis.closure_ms, Some(700));
        assert_eq!(engine.last_analysis(), Some(&analysis));
    }

    #[test]
    fn test_event_history_is_bounded() {
        let config = DmsConfig {
            event_history_limit: 4,
            ..Default::default()
        };
        let mut engine = FatigueEngine::new(config).unwrap();
        let t0 = Instant::now();
        let frame = SyntheticFace::eyes_closed().build();
        for i in 0..=35 {
            engine.tick(t0 + ms(i * 100), Some(&frame));
        }

        assert_eq!(engine.counters().blinks, 9);
        assert_eq!(engine.events().len(), 4);
        assert_eq!(engine.events().last().unwrap().kind, EventKind::Blink);
        assert!(engine.events().iter().any(|e| e.kind == EventKind::Microsleep));
    }
}
