//! Distance-adaptive exponential smoothing.

use crate::{Detection, Track, TrackerConfig};

/// Blends matched detections into a track estimate.
///
/// The blend factor grows linearly with how far the detection landed from the
/// current estimate: a nominally still hand is smoothed hard (low jitter), a
/// fast-moving one barely at all (low latency).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveSmoother {
    /// Blend factor for a detection exactly on the estimate.
    pub min_smoothing: f64,
    /// Blend factor at or beyond `range`.
    pub max_smoothing: f64,
    /// Movement distance at which the factor saturates.
    pub range: f64,
}

impl AdaptiveSmoother {
    pub fn new(min_smoothing: f64, max_smoothing: f64, range: f64) -> Self {
        Self {
            min_smoothing,
            max_smoothing,
            range,
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.min_smoothing, config.max_smoothing, config.smoothing_range)
    }

    /// Blend factor for a detection `move_dist` away from the estimate.
    #[inline]
    pub fn factor(&self, move_dist: f64) -> f64 {
        let t = move_dist.clamp(0.0, self.range) / self.range;
        self.min_smoothing + t * (self.max_smoothing - self.min_smoothing)
    }

    /// Pull the track toward the detection and refresh velocity and side.
    ///
    /// Velocity becomes the raw displacement of this update; it is not
    /// averaged with earlier ticks. Counters are left to the lifecycle step.
    pub fn apply(&self, track: &mut Track, detection: &Detection) {
        let old = track.position;
        let target = detection.position();
        let alpha = self.factor((target - old).norm());

        track.position = old + (target - old) * alpha;
        track.velocity = track.position - old;
        track.side = detection.side();
    }
}

impl Default for AdaptiveSmoother {
    fn default() -> Self {
        Self::from_config(&TrackerConfig::default())
    }
}
