//! Damped constant-velocity prediction.
//!
//! Velocity here is the raw per-tick displacement from the last update, so
//! both operations work in ticks rather than wall-clock time and tolerate
//! uneven frame spacing.

use nalgebra::Point2;

use crate::Track;

/// Project a track one tick ahead: `position + velocity * damping`.
///
/// The result only steers association. It is never written back to the track.
#[inline]
pub fn predict_position(track: &Track, damping: f64) -> Point2<f64> {
    track.position + track.velocity * damping
}

/// Advance an unmatched track on inertia alone.
///
/// Velocity is damped first, then applied, so a lost hand drifts to a stop
/// instead of flying off at its last speed.
#[inline]
pub fn coast(track: &mut Track, damping: f64) {
    track.velocity *= damping;
    track.position += track.velocity;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Detection, Side, TrackId};
    use approx::assert_relative_eq;
    use nalgebra::Vector2;

    fn moving_track(vx: f64, vy: f64) -> Track {
        let det = Detection::new(100.0, 100.0, Side::Left).unwrap();
        let mut track = Track::from_detection(TrackId(0), &det);
        track.velocity = Vector2::new(vx, vy);
        track
    }

    #[test]
    fn test_predict_stationary() {
        let track = moving_track(0.0, 0.0);
        assert_eq!(predict_position(&track, 0.8), Point2::new(100.0, 100.0));
    }

    #[test]
    fn test_predict_applies_damping() {
        let track = moving_track(10.0, -5.0);
        let predicted = predict_position(&track, 0.8);

        assert_relative_eq!(predicted.x, 108.0, epsilon = 1e-10);
        assert_relative_eq!(predicted.y, 96.0, epsilon = 1e-10);
    }

    #[test]
    fn test_predict_does_not_mutate() {
        let track = moving_track(10.0, 10.0);
        let before = track.clone();
        let _ = predict_position(&track, 0.8);
        assert_eq!(track, before);
    }

    #[test]
    fn test_coast_damps_then_moves() {
        let mut track = moving_track(10.0, 0.0);

        coast(&mut track, 0.9);
        assert_relative_eq!(track.velocity.x, 9.0, epsilon = 1e-10);
        assert_relative_eq!(track.x(), 109.0, epsilon = 1e-10);

        coast(&mut track, 0.9);
        assert_relative_eq!(track.velocity.x, 8.1, epsilon = 1e-10);
        assert_relative_eq!(track.x(), 117.1, epsilon = 1e-10);
    }

    #[test]
    fn test_coast_total_drift_is_bounded() {
        // Geometric series: total drift < v * d / (1 - d)
        let mut track = moving_track(10.0, 0.0);
        for _ in 0..1000 {
            coast(&mut track, 0.9);
        }
        assert!(track.x() < 100.0 + 90.0 + 1e-9);
        assert_relative_eq!(track.x(), 190.0, epsilon = 1e-6);
    }
}
