//! Main tracker implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Deref;
use tracing::{debug, trace};

use crate::distances::{Distance, SideWeightedDistance};
use crate::filter::AdaptiveSmoother;
use crate::lifecycle::{self, MissOutcome};
use crate::matching::{get_unmatched, match_detections_and_tracks, AssignmentStrategy};
use crate::{Detection, Error, Result, Track, TrackId, TrackIdFactory};

/// Configuration for the tracker.
///
/// All fields are public and every one has a default, so partial
/// configurations deserialize cleanly (`#[serde(default)]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Consecutive missed ticks a track survives; the next miss evicts it.
    pub persistence_frames: u32,

    /// Exclusive upper bound on the side-weighted match distance.
    pub max_match_distance: f64,

    /// Missed ticks before visibility starts to fade.
    pub grace_period: u32,

    /// Smoothing factor for a detection right on the estimate.
    pub min_smoothing: f64,

    /// Smoothing factor for a detection `smoothing_range` or more away.
    pub max_smoothing: f64,

    /// Movement distance at which the smoothing factor saturates.
    pub smoothing_range: f64,

    /// Matched ticks before a track may take part in hit-testing.
    pub stability_threshold: u32,

    /// Velocity damping when predicting for association.
    pub prediction_damping: f64,

    /// Velocity damping applied on every missed tick.
    pub missing_damping: f64,

    /// Visibility lost per missed tick past the grace period.
    pub alpha_decay: f64,

    /// Distance multiplier for detections on the track's side.
    pub same_side_factor: f64,

    /// Extra capture radius added to hit-test targets.
    pub hit_padding: f64,

    /// How contention for one detection is resolved.
    pub assignment: AssignmentStrategy,
}

impl TrackerConfig {
    /// Validate and wrap this configuration for use with [`TrackStore::tick`].
    pub fn validated(self) -> Result<ValidConfig> {
        ValidConfig::new(self)
    }

    /// Check every field, returning the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("max_match_distance", self.max_match_distance),
            ("min_smoothing", self.min_smoothing),
            ("max_smoothing", self.max_smoothing),
            ("smoothing_range", self.smoothing_range),
            ("prediction_damping", self.prediction_damping),
            ("missing_damping", self.missing_damping),
            ("alpha_decay", self.alpha_decay),
            ("same_side_factor", self.same_side_factor),
            ("hit_padding", self.hit_padding),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::InvalidConfig(format!("{} must be finite, got {}", name, value)));
        }

        if self.max_match_distance <= 0.0 {
            return Err(Error::InvalidConfig(
                "max_match_distance must be positive".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.min_smoothing)
            || !(0.0..=1.0).contains(&self.max_smoothing)
            || self.min_smoothing > self.max_smoothing
        {
            return Err(Error::InvalidConfig(format!(
                "smoothing factors must satisfy 0 <= min <= max <= 1, got min={} max={}",
                self.min_smoothing, self.max_smoothing
            )));
        }

        if self.smoothing_range <= 0.0 {
            return Err(Error::InvalidConfig("smoothing_range must be positive".to_string()));
        }

        if self.prediction_damping <= 0.0 || self.prediction_damping > 1.0 {
            return Err(Error::InvalidConfig(
                "prediction_damping must be in (0, 1]".to_string(),
            ));
        }

        // Must stay below 1 so a coasting track slows to a stop
        if !(0.0..1.0).contains(&self.missing_damping) {
            return Err(Error::InvalidConfig("missing_damping must be in [0, 1)".to_string()));
        }

        if self.alpha_decay <= 0.0 || self.alpha_decay > 1.0 {
            return Err(Error::InvalidConfig("alpha_decay must be in (0, 1]".to_string()));
        }

        if self.same_side_factor <= 0.0 || self.same_side_factor > 1.0 {
            return Err(Error::InvalidConfig(
                "same_side_factor must be in (0, 1]".to_string(),
            ));
        }

        if self.hit_padding < 0.0 {
            return Err(Error::InvalidConfig("hit_padding must be non-negative".to_string()));
        }

        if self.grace_period > self.persistence_frames {
            return Err(Error::InvalidConfig(
                "grace_period must not exceed persistence_frames".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            persistence_frames: 20,
            max_match_distance: 350.0,
            grace_period: 5,
            min_smoothing: 0.15,
            max_smoothing: 0.8,
            smoothing_range: 150.0,
            stability_threshold: 3,
            prediction_damping: 0.8,
            missing_damping: 0.9,
            alpha_decay: 0.1,
            same_side_factor: 0.6,
            hit_padding: 60.0,
            assignment: AssignmentStrategy::Greedy,
        }
    }
}

/// A [`TrackerConfig`] that passed [`TrackerConfig::validate`].
///
/// The snapshot API only accepts this type, so a tick never runs with a
/// configuration that could produce non-finite positions. Deserializing
/// validates as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TrackerConfig", into = "TrackerConfig")]
pub struct ValidConfig(TrackerConfig);

impl ValidConfig {
    /// Validate `config`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] naming the first violated constraint.
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self(config))
    }

    /// Unwrap back into a plain, editable configuration.
    pub fn into_inner(self) -> TrackerConfig {
        self.0
    }
}

impl Default for ValidConfig {
    fn default() -> Self {
        Self(TrackerConfig::default())
    }
}

impl Deref for ValidConfig {
    type Target = TrackerConfig;

    fn deref(&self) -> &TrackerConfig {
        &self.0
    }
}

impl TryFrom<TrackerConfig> for ValidConfig {
    type Error = Error;

    fn try_from(config: TrackerConfig) -> Result<Self> {
        Self::new(config)
    }
}

impl From<ValidConfig> for TrackerConfig {
    fn from(config: ValidConfig) -> Self {
        config.0
    }
}

/// What a single tick did, by track id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Tracks matched to a detection this tick.
    pub matched: Vec<TrackId>,
    /// Tracks that missed and are coasting.
    pub coasting: Vec<TrackId>,
    /// Tracks created from unclaimed detections.
    pub created: Vec<TrackId>,
    /// Tracks dropped after exceeding the persistence window.
    pub evicted: Vec<TrackId>,
}

/// Immutable snapshot of all live tracks.
///
/// Tracks are kept in creation order, which is also the order in which they
/// pick detections during greedy association (oldest first). The id factory
/// travels with the snapshot, so ticking the same snapshot with the same
/// detections always produces the same result.
///
/// Every way of building a store, including deserialization, checks that
/// ids are unique and already issued by its id factory, and that visibility
/// lies in [0, 1].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStore")]
pub struct TrackStore {
    tracks: Vec<Track>,
    ids: TrackIdFactory,
}

#[derive(Deserialize)]
struct RawStore {
    tracks: Vec<Track>,
    ids: TrackIdFactory,
}

impl TryFrom<RawStore> for TrackStore {
    type Error = Error;

    fn try_from(raw: RawStore) -> Result<Self> {
        Self::from_parts(raw.tracks, raw.ids)
    }
}

impl TrackStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing tracks, kept in the given order.
    ///
    /// New ids continue after the largest id present.
    ///
    /// # Errors
    /// Returns [`Error::InvalidStore`] on duplicate ids, non-finite state,
    /// out-of-range visibility, or an id too large to continue after.
    pub fn from_tracks(tracks: Vec<Track>) -> Result<Self> {
        let next = match tracks.iter().map(|t| t.id.0).max() {
            Some(max) => max.checked_add(1).ok_or_else(|| {
                Error::InvalidStore(format!("track id {} leaves no room for new ids", max))
            })?,
            None => 0,
        };
        Self::from_parts(tracks, TrackIdFactory::starting_at(next))
    }

    /// Build a store from tracks and the id factory that issued them.
    ///
    /// # Errors
    /// Same as [`TrackStore::from_tracks`], plus any track whose id the
    /// factory would still hand out.
    pub fn from_parts(tracks: Vec<Track>, ids: TrackIdFactory) -> Result<Self> {
        let mut seen = HashSet::with_capacity(tracks.len());
        for track in &tracks {
            if !seen.insert(track.id) {
                return Err(Error::InvalidStore(format!("duplicate track id {}", track.id)));
            }
            if !ids.is_issued(track.id) {
                return Err(Error::InvalidStore(format!(
                    "track id {} not yet issued by id factory at {}",
                    track.id,
                    ids.issued_count()
                )));
            }
            if !(0.0..=1.0).contains(&track.alpha) {
                return Err(Error::InvalidStore(format!(
                    "track {} has alpha {} outside [0, 1]",
                    track.id, track.alpha
                )));
            }
            let finite = track.position.iter().chain(track.velocity.iter()).all(|v| v.is_finite());
            if !finite {
                return Err(Error::InvalidStore(format!("track {} has non-finite state", track.id)));
            }
        }

        Ok(Self { tracks, ids })
    }

    /// All live tracks, oldest first.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Look up a live track by id.
    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Tracks matched at least `threshold` times.
    pub fn stable_tracks(&self, threshold: u32) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(move |t| t.is_stable(threshold))
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Number of ids issued by this store lineage.
    pub fn issued_ids(&self) -> u64 {
        self.ids.issued_count()
    }

    /// Advance one tick: `next = tick(previous, detections)`.
    pub fn tick(&self, detections: &[Detection], config: &ValidConfig) -> TrackStore {
        self.tick_with_report(detections, config).0
    }

    /// Advance one tick and report what happened to each track.
    ///
    /// Order of operations: predict and associate every track against the
    /// detections, smooth matched tracks, coast or evict unmatched ones, then
    /// create tracks for detections nobody claimed. Surviving tracks keep their
    /// order and new tracks are appended in detection order.
    pub fn tick_with_report(
        &self,
        detections: &[Detection],
        config: &ValidConfig,
    ) -> (TrackStore, TickReport) {
        let distance = SideWeightedDistance::from_config(config);
        let smoother = AdaptiveSmoother::from_config(config);

        let distance_matrix = distance.get_distances(&self.tracks, detections);
        let (matched_dets, matched_tracks) =
            match_detections_and_tracks(&distance_matrix, config.max_match_distance, config.assignment);

        // Detection index matched to each track, if any
        let mut match_for_track: Vec<Option<usize>> = vec![None; self.tracks.len()];
        for (&det_idx, &track_idx) in matched_dets.iter().zip(matched_tracks.iter()) {
            match_for_track[track_idx] = Some(det_idx);
        }

        let mut report = TickReport::default();
        let mut ids = self.ids;
        let mut tracks = Vec::with_capacity(self.tracks.len() + detections.len());

        for (track, matched) in self.tracks.iter().zip(match_for_track) {
            let mut track = track.clone();
            match matched {
                Some(det_idx) => {
                    smoother.apply(&mut track, &detections[det_idx]);
                    lifecycle::mark_matched(&mut track);
                    report.matched.push(track.id);
                    tracks.push(track);
                }
                None => match lifecycle::mark_missed(&mut track, config) {
                    MissOutcome::Coasting => {
                        report.coasting.push(track.id);
                        tracks.push(track);
                    }
                    MissOutcome::Evicted => {
                        debug!(track_id = %track.id, side = %track.side, "evicted track");
                        report.evicted.push(track.id);
                    }
                },
            }
        }

        for det_idx in get_unmatched(detections.len(), &matched_dets) {
            let track = lifecycle::spawn(&mut ids, &detections[det_idx]);
            debug!(
                track_id = %track.id,
                side = %track.side,
                x = track.x(),
                y = track.y(),
                "created track"
            );
            report.created.push(track.id);
            tracks.push(track);
        }

        trace!(
            detections = detections.len(),
            matched = report.matched.len(),
            coasting = report.coasting.len(),
            created = report.created.len(),
            evicted = report.evicted.len(),
            "tick"
        );

        (TrackStore { tracks, ids }, report)
    }
}

/// Stateful tracker.
///
/// Owns a validated configuration and the current [`TrackStore`], replacing
/// the store with the next snapshot on every update.
#[derive(Debug, Clone)]
pub struct Tracker {
    config: ValidConfig,
    store: TrackStore,
}

impl Tracker {
    /// Create a new tracker with the given configuration.
    pub fn new(config: TrackerConfig) -> Result<Self> {
        Self::with_store(config, TrackStore::new())
    }

    /// Create a tracker resuming from an existing snapshot.
    pub fn with_store(config: TrackerConfig, store: TrackStore) -> Result<Self> {
        Ok(Self {
            config: config.validated()?,
            store,
        })
    }

    /// Update the tracker with the detections of a new frame.
    ///
    /// Call exactly once per rendered frame; pass an empty slice when the
    /// perception model produced nothing.
    ///
    /// # Returns
    /// All live tracks, oldest first, including coasting and not yet stable ones
    pub fn update(&mut self, detections: &[Detection]) -> &[Track] {
        self.store = self.store.tick(detections, &self.config);
        self.store.tracks()
    }

    /// Like [`Tracker::update`], also returning the tick report.
    pub fn update_with_report(&mut self, detections: &[Detection]) -> TickReport {
        let (next, report) = self.store.tick_with_report(detections, &self.config);
        self.store = next;
        report
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Current snapshot.
    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    /// All live tracks, oldest first.
    pub fn tracks(&self) -> &[Track] {
        self.store.tracks()
    }

    /// Live tracks trusted for interaction (`frames_detected >= stability_threshold`).
    pub fn stable_tracks(&self) -> impl Iterator<Item = &Track> {
        self.store.stable_tracks(self.config.stability_threshold)
    }

    /// Get the total number of tracks ever created.
    pub fn total_track_count(&self) -> u64 {
        self.store.issued_ids()
    }

    /// Get the current number of live tracks.
    pub fn current_track_count(&self) -> usize {
        self.store.len()
    }

    /// Drop all tracks and restart ids from 0.
    pub fn reset(&mut self) {
        self.store = TrackStore::new();
    }
}
