//! Euclidean distance to the predicted position, discounted for same-side candidates.

use nalgebra::{DMatrix, Point2};

use super::traits::Distance;
use crate::filter::predict_position;
use crate::{Detection, Side, Track, TrackerConfig};

/// Side-aware distance between a track's predicted position and a detection.
///
/// `|detection - predicted| * factor`, where `factor` is `same_side_factor`
/// when the detection carries the track's current side label and 1 otherwise.
/// A same-side candidate therefore wins against an equally distant
/// other-side one, and can still win when somewhat farther away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideWeightedDistance {
    /// Damping applied to velocity when predicting.
    pub prediction_damping: f64,
    /// Multiplier for candidates on the same side as the track.
    pub same_side_factor: f64,
}

impl SideWeightedDistance {
    pub fn new(prediction_damping: f64, same_side_factor: f64) -> Self {
        Self {
            prediction_damping,
            same_side_factor,
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.prediction_damping, config.same_side_factor)
    }

    /// Multiplier for a candidate of `detection_side` against a track on `track_side`.
    #[inline]
    pub fn side_factor(&self, track_side: Side, detection_side: Side) -> f64 {
        if track_side == detection_side {
            self.same_side_factor
        } else {
            1.0
        }
    }

    /// Weighted distance from an already predicted position.
    #[inline]
    pub fn weighted(&self, predicted: &Point2<f64>, track_side: Side, detection: &Detection) -> f64 {
        (detection.position() - predicted).norm() * self.side_factor(track_side, detection.side())
    }
}

impl Default for SideWeightedDistance {
    fn default() -> Self {
        Self::from_config(&TrackerConfig::default())
    }
}

impl Distance for SideWeightedDistance {
    fn get_distances(&self, tracks: &[Track], candidates: &[Detection]) -> DMatrix<f64> {
        let mut matrix = DMatrix::zeros(candidates.len(), tracks.len());

        for (j, track) in tracks.iter().enumerate() {
            let predicted = predict_position(track, self.prediction_damping);
            for (i, det) in candidates.iter().enumerate() {
                matrix[(i, j)] = self.weighted(&predicted, track.side, det);
            }
        }

        matrix
    }
}
