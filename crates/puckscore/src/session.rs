//! Caller-side scoring session.
//!
//! Detection and scoring are stateless; the session only owns the current
//! configuration, the drift offset, reusable working buffers, and the last
//! report. A live preview can call [`ScoringSession::score_frame`] on every
//! frame and will get the cached report back until the refresh interval has
//! passed.

use std::time::{Duration, Instant};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::BoardConfig;
use crate::core::{DriftOffset, RgbaImageView};
use crate::detect::{DetectScratch, DetectionResult, PuckDetector};
use crate::score::{score, RoundScore, ScoringParams};

/// Default minimum time between two fresh scoring passes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(300);

/// Detection output plus the round score when the court is calibrated.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub detection: DetectionResult,
    pub round: Option<RoundScore>,
}

#[derive(Clone, Debug)]
struct CachedReport {
    at: Instant,
    report: FrameReport,
}

pub struct ScoringSession {
    config: BoardConfig,
    detector: PuckDetector,
    scoring: ScoringParams,
    drift: DriftOffset,
    interval: Duration,
    scratch: DetectScratch,
    last: Option<CachedReport>,
}

impl ScoringSession {
    pub fn new(config: BoardConfig) -> Self {
        Self::with_interval(config, DEFAULT_REFRESH_INTERVAL)
    }

    pub fn with_interval(config: BoardConfig, interval: Duration) -> Self {
        Self {
            detector: PuckDetector::new(config.detector_params()),
            scoring: config.scoring_params(),
            config,
            drift: DriftOffset::ZERO,
            interval,
            scratch: DetectScratch::default(),
            last: None,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Replace the configuration and drop the cached report.
    pub fn set_config(&mut self, config: BoardConfig) {
        self.detector = PuckDetector::new(config.detector_params());
        self.scoring = config.scoring_params();
        self.config = config;
        self.invalidate();
    }

    pub fn drift(&self) -> DriftOffset {
        self.drift
    }

    /// Update the geometry offset; a changed offset drops the cached report.
    pub fn set_drift(&mut self, drift: DriftOffset) {
        if drift != self.drift {
            self.drift = drift;
            self.invalidate();
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Last computed report, if any.
    pub fn last_report(&self) -> Option<&FrameReport> {
        self.last.as_ref().map(|c| &c.report)
    }

    /// Report for `frame` at time `now`, reusing the cached one while it is
    /// younger than the refresh interval.
    pub fn score_frame(&mut self, frame: &RgbaImageView<'_>, now: Instant) -> &FrameReport {
        let cached = match self.last.take() {
            Some(c) if now.saturating_duration_since(c.at) < self.interval => c,
            _ => CachedReport {
                at: now,
                report: self.compute(frame),
            },
        };
        &self.last.insert(cached).report
    }

    /// Fresh report regardless of the cache; the cache is updated.
    pub fn rescore(&mut self, frame: &RgbaImageView<'_>, now: Instant) -> &FrameReport {
        self.invalidate();
        self.score_frame(frame, now)
    }

    fn compute(&mut self, frame: &RgbaImageView<'_>) -> FrameReport {
        let geometry = self.config.geometry.as_ref();
        let detection = self
            .detector
            .detect_with_scratch(frame, geometry, self.drift, &mut self.scratch);
        let round = geometry.map(|g| {
            let shifted = g.shifted(self.drift);
            score(&detection.pucks, &shifted, &self.scoring)
        });
        debug!(
            "fresh report: {} pucks, round {:?}",
            detection.pucks.len(),
            round.as_ref().map(|r| (r.red, r.blue))
        );
        FrameReport { detection, round }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RgbaImage;

    fn frame_with_red_puck(cx: f32, cy: f32) -> RgbaImage {
        let mut img = RgbaImage::filled(640, 480, [90, 90, 90, 255]);
        for y in 0..480 {
            for x in 0..640 {
                let (dx, dy) = (x as f32 - cx, y as f32 - cy);
                if dx * dx + dy * dy <= 144.0 {
                    img.put_pixel(x, y, [210, 30, 35, 255]);
                }
            }
        }
        img
    }

    #[test]
    fn report_is_cached_within_interval() {
        let mut session = ScoringSession::new(BoardConfig::default());
        let t0 = Instant::now();
        let a = frame_with_red_puck(458.0, 300.0);
        let b = frame_with_red_puck(300.0, 300.0);

        let first = session.score_frame(&a.view(), t0).clone();
        assert_eq!(first.detection.pucks.len(), 1);

        // new frame, but too soon: same report
        let cached = session
            .score_frame(&b.view(), t0 + Duration::from_millis(100))
            .clone();
        assert_eq!(cached, first);

        let fresh = session
            .score_frame(&b.view(), t0 + Duration::from_millis(400))
            .clone();
        assert_ne!(fresh, first);
    }

    #[test]
    fn drift_change_invalidates_cache() {
        let mut session = ScoringSession::new(BoardConfig::default());
        let t0 = Instant::now();
        let img = frame_with_red_puck(458.0, 300.0);
        session.score_frame(&img.view(), t0);
        session.set_drift(DriftOffset::new(400.0, 0.0));
        assert!(session.last_report().is_none());
        let report = session.score_frame(&img.view(), t0);
        assert!(report.detection.pucks.is_empty());
    }

    #[test]
    fn config_change_invalidates_cache() {
        let mut session = ScoringSession::new(BoardConfig::default());
        let t0 = Instant::now();
        let img = frame_with_red_puck(458.0, 300.0);
        assert!(session.score_frame(&img.view(), t0).round.is_some());

        session.set_config(BoardConfig {
            geometry: None,
            ..BoardConfig::default()
        });
        assert!(session.last_report().is_none());
        let report = session.score_frame(&img.view(), t0);
        assert_eq!(report.detection.pucks.len(), 1);
        assert!(report.round.is_none());
    }

    #[test]
    fn rescore_bypasses_the_interval() {
        let mut session = ScoringSession::new(BoardConfig::default());
        let t0 = Instant::now();
        let a = frame_with_red_puck(458.0, 300.0);
        let b = frame_with_red_puck(300.0, 300.0);

        let first = session.score_frame(&a.view(), t0).clone();
        let fresh = session
            .rescore(&b.view(), t0 + Duration::from_millis(10))
            .clone();
        assert_ne!(fresh, first);
        assert_eq!(session.last_report(), Some(&fresh));
    }

    #[test]
    fn uncalibrated_session_detects_without_scoring() {
        let cfg = BoardConfig {
            geometry: None,
            ..BoardConfig::default()
        };
        let mut session = ScoringSession::new(cfg);
        let img = frame_with_red_puck(50.0, 50.0);
        let report = session.score_frame(&img.view(), Instant::now());
        assert_eq!(report.detection.pucks.len(), 1);
        assert!(report.round.is_none());
    }

    #[test]
    fn calibrated_session_scores_round() {
        let mut session = ScoringSession::new(BoardConfig::default());
        let img = frame_with_red_puck(458.0, 300.0);
        let report = session.score_frame(&img.view(), Instant::now());
        let round = report.round.as_ref().expect("round");
        assert_eq!(round.results.len(), 1);
        assert_eq!(round.red, 10);
    }
}
