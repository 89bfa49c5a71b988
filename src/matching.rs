//! Detection-to-track matching algorithms.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::internal::optimize::linear_sum_assignment;

/// How contention between tracks for the same detection is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentStrategy {
    /// Each track, oldest first, takes its nearest unused detection.
    ///
    /// Two tracks competing for one detection are resolved purely by store
    /// order: the older track wins even if the younger one is closer.
    #[default]
    Greedy,

    /// Gated minimum-cost bipartite assignment (Hungarian algorithm).
    ///
    /// Changes observable behavior under contention compared to `Greedy`,
    /// so it is opt-in.
    Optimal,
}

/// Match detections to tracks with the given strategy.
///
/// # Arguments
/// * `distance_matrix` - Distance matrix (n_detections x n_tracks), tracks in store order
/// * `threshold` - Exclusive upper bound on an accepted distance
/// * `strategy` - Contention resolution
///
/// # Returns
/// Tuple of (matched_det_indices, matched_track_indices) where entry i indicates
/// the matched pair, ordered by track index. Unmatched detections/tracks are not included.
pub fn match_detections_and_tracks(
    distance_matrix: &DMatrix<f64>,
    threshold: f64,
    strategy: AssignmentStrategy,
) -> (Vec<usize>, Vec<usize>) {
    match strategy {
        AssignmentStrategy::Greedy => match_greedy_in_track_order(distance_matrix, threshold),
        AssignmentStrategy::Optimal => match_optimal(distance_matrix, threshold),
    }
}

/// Greedy per-track matching in track (column) order.
///
/// Each track picks the unused detection with the smallest distance and keeps
/// it only if that distance is strictly below `threshold`; otherwise the track
/// stays unmatched. Equal distances go to the lower detection index.
pub fn match_greedy_in_track_order(
    distance_matrix: &DMatrix<f64>,
    threshold: f64,
) -> (Vec<usize>, Vec<usize>) {
    let n_detections = distance_matrix.nrows();
    let n_tracks = distance_matrix.ncols();

    if n_detections == 0 || n_tracks == 0 {
        return (Vec::new(), Vec::new());
    }

    let mut used_dets = vec![false; n_detections];

    let mut matched_dets = Vec::new();
    let mut matched_tracks = Vec::new();

    for track_idx in 0..n_tracks {
        let mut best: Option<(usize, f64)> = None;
        for det_idx in 0..n_detections {
            if used_dets[det_idx] {
                continue;
            }
            let dist = distance_matrix[(det_idx, track_idx)];
            if best.map_or(true, |(_, best_dist)| dist < best_dist) {
                best = Some((det_idx, dist));
            }
        }

        if let Some((det_idx, dist)) = best {
            if dist < threshold {
                used_dets[det_idx] = true;
                matched_dets.push(det_idx);
                matched_tracks.push(track_idx);
            }
        }
    }

    (matched_dets, matched_tracks)
}

/// Gated minimum-cost matching over the whole matrix.
pub fn match_optimal(distance_matrix: &DMatrix<f64>, threshold: f64) -> (Vec<usize>, Vec<usize>) {
    if distance_matrix.nrows() == 0 || distance_matrix.ncols() == 0 {
        return (Vec::new(), Vec::new());
    }

    // Rows are tracks in the solver so results come back in track order
    linear_sum_assignment(&distance_matrix.transpose(), threshold)
        .into_iter()
        .map(|a| (a.col_idx, a.row_idx))
        .unzip()
}

/// Get unmatched indices from a match result.
pub fn get_unmatched(total: usize, matched: &[usize]) -> Vec<usize> {
    let mut is_matched = vec![false; total];
    for &idx in matched {
        is_matched[idx] = true;
    }
    (0..total).filter(|&i| !is_matched[i]).collect()
}
