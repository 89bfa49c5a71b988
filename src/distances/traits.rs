//! Distance trait definition.

use nalgebra::DMatrix;
use crate::{Detection, Track};

/// Trait for distance functions used in track association.
///
/// Distance functions compute a matrix of distances between candidate
/// detections and tracks. Lower distances indicate better matches.
pub trait Distance: Send + Sync {
    /// Compute distances between tracks and candidate detections.
    ///
    /// # Arguments
    /// * `tracks` - Tracks in store order
    /// * `candidates` - Detections for the current tick
    ///
    /// # Returns
    /// Distance matrix of shape (n_candidates, n_tracks).
    /// Entry (i, j) is the distance between candidate i and track j.
    fn get_distances(&self, tracks: &[Track], candidates: &[Detection]) -> DMatrix<f64>;
}
