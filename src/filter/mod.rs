//! Motion filtering for tracked hands.
//!
//! This module provides the two halves of the per-tick motion model:
//! - `prediction` - Damped constant-velocity projection and inertial coasting
//! - `smoothing` - Distance-adaptive blending of detections into the estimate

mod prediction;
mod smoothing;

pub use prediction::{coast, predict_position};
pub use smoothing::AdaptiveSmoother;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Detection, Side, Track, TrackId, TrackerConfig};
    use approx::assert_relative_eq;

    // ===== Predict/Update Interplay =====

    #[test]
    fn test_constant_motion_converges_to_detection_velocity() {
        // A hand moving 10 units per tick: the smoothed velocity approaches 10
        let config = TrackerConfig::default();
        let smoother = AdaptiveSmoother::from_config(&config);

        let start = Detection::new(0.0, 0.0, Side::Left).unwrap();
        let mut track = Track::from_detection(TrackId(0), &start);

        for tick in 1..=200 {
            let det = Detection::new(10.0 * tick as f64, 0.0, Side::Left).unwrap();
            smoother.apply(&mut track, &det);
        }

        assert_relative_eq!(track.velocity.x, 10.0, epsilon = 1e-6);
        assert_relative_eq!(track.velocity.y, 0.0, epsilon = 1e-12);

        // Steady-state lag: lag = v * (1 - a) / a for the factor a at distance lag + v
        let lag = 2000.0 - track.x();
        assert!(lag > 0.0 && lag < 60.0, "unexpected lag {}", lag);

        // Prediction leads the estimate along the direction of motion
        let predicted = predict_position(&track, config.prediction_damping);
        assert_relative_eq!(predicted.x, track.x() + 8.0, epsilon = 1e-6);
    }

    #[test]
    fn test_velocity_stays_bounded_under_noise() {
        // Alternating +/-40 jitter around a fixed point must not diverge
        let config = TrackerConfig::default();
        let smoother = AdaptiveSmoother::from_config(&config);

        let start = Detection::new(300.0, 300.0, Side::Right).unwrap();
        let mut track = Track::from_detection(TrackId(0), &start);

        for tick in 0..500 {
            let offset = if tick % 2 == 0 { 40.0 } else { -40.0 };
            let det = Detection::new(300.0 + offset, 300.0 - offset, Side::Right).unwrap();
            smoother.apply(&mut track, &det);
            assert!(track.velocity.norm() <= 80.0 * std::f64::consts::SQRT_2);
            assert!((track.x() - 300.0).abs() <= 40.0 + 1e-9);
        }

        // Once the detections stop, coasting bleeds the velocity off
        for _ in 0..100 {
            coast(&mut track, config.missing_damping);
        }
        assert!(track.velocity.norm() < 1e-2);
    }
}
