//! Track struct for hands maintained by the tracker.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Detection, Side};

/// Opaque track identifier, unique among the tracks of one store lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Factory for issuing track ids.
///
/// The counter is part of the store snapshot rather than global state, so a
/// replay of the same detections from the same snapshot yields the same ids.
/// Ids are never reused, which keeps evicted identities dead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackIdFactory {
    next_id: u64,
}

impl TrackIdFactory {
    /// Create a factory whose first id is 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a factory starting at `first`, for hosts that inject their own id space.
    pub fn starting_at(first: u64) -> Self {
        Self { next_id: first }
    }

    /// Issue the next id.
    #[inline]
    pub fn next_id(&mut self) -> TrackId {
        let id = TrackId(self.next_id);
        self.next_id += 1;
        id
    }

    /// True if `id` was already handed out (or skipped) by this factory.
    #[inline]
    pub fn is_issued(&self, id: TrackId) -> bool {
        id.0 < self.next_id
    }

    /// Number of ids issued so far (for a factory started at 0).
    pub fn issued_count(&self) -> u64 {
        self.next_id
    }
}

/// A tracked hand.
///
/// Contains the smoothed position estimate, the instantaneous velocity, and
/// the counters driving persistence and visibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Identifier, stable for the lifetime of the track.
    pub id: TrackId,

    /// Smoothed position estimate.
    pub position: Point2<f64>,

    /// Per-tick displacement from the last update (not averaged).
    pub velocity: Vector2<f64>,

    /// Handedness from the most recent matched detection.
    pub side: Side,

    /// Visibility in [0, 1]; fades while the track coasts past the grace period.
    pub alpha: f64,

    /// Consecutive ticks without a match; 0 while matched.
    pub frames_missing: u32,

    /// Matched ticks so far. Frozen while missing, never decremented.
    pub frames_detected: u32,
}

impl Track {
    /// Create a fresh track from an unmatched detection.
    pub fn from_detection(id: TrackId, detection: &Detection) -> Self {
        Self {
            id,
            position: detection.position(),
            velocity: Vector2::zeros(),
            side: detection.side(),
            alpha: 1.0,
            frames_missing: 0,
            frames_detected: 1,
        }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.position.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.position.y
    }

    /// True while the track is running on inertia instead of detections.
    /// Renderers use this to pick a degraded style.
    #[inline]
    pub fn is_coasting(&self) -> bool {
        self.frames_missing > 0
    }

    /// True once the track has been matched at least `threshold` times.
    #[inline]
    pub fn is_stable(&self, threshold: u32) -> bool {
        self.frames_detected >= threshold
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Track(id={}, side={}, pos=({:.1}, {:.1}), alpha={:.2}, detected={}, missing={})",
            self.id,
            self.side,
            self.position.x,
            self.position.y,
            self.alpha,
            self.frames_detected,
            self.frames_missing
        )
    }
}
