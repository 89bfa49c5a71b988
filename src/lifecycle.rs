//! Track lifecycle: creation, persistence on miss, visibility fade, eviction.
//!
//! Per-track state machine, evaluated once per tick:
//!
//! - matched: `frames_missing = 0`, `alpha = 1`, `frames_detected += 1`
//! - missed with `frames_missing < persistence_frames`: coast on damped
//!   velocity, `frames_missing += 1`, fade `alpha` once past the grace period
//! - missed with `frames_missing == persistence_frames`: evicted for good
//!
//! Position, velocity and side of matched tracks are set by the smoother
//! before [`mark_matched`] runs.

use crate::filter::coast;
use crate::{Detection, Track, TrackIdFactory, TrackerConfig};

/// What happened to a track that went unmatched this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissOutcome {
    /// Still in the store, running on inertia.
    Coasting,
    /// Miss streak exceeded the persistence window; drop the track.
    Evicted,
}

/// Create a track for a detection nobody claimed.
pub fn spawn(ids: &mut TrackIdFactory, detection: &Detection) -> Track {
    Track::from_detection(ids.next_id(), detection)
}

/// Update counters for a track matched this tick.
#[inline]
pub fn mark_matched(track: &mut Track) {
    track.frames_missing = 0;
    track.alpha = 1.0;
    track.frames_detected = track.frames_detected.saturating_add(1);
}

/// Apply one missed tick to a track.
///
/// `frames_detected` is left untouched so a brief dropout does not erase the
/// trust the track has built up. An evicted track is returned unmodified; the
/// caller removes it.
pub fn mark_missed(track: &mut Track, config: &TrackerConfig) -> MissOutcome {
    if track.frames_missing >= config.persistence_frames {
        return MissOutcome::Evicted;
    }

    coast(track, config.missing_damping);
    track.frames_missing += 1;

    if track.frames_missing > config.grace_period {
        track.alpha = (track.alpha - config.alpha_decay).max(0.0);
    }

    MissOutcome::Coasting
}
