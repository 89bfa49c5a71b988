//! # handtrack-rs - Real-time hand tracking and stabilization
//!
//! Turns a stream of noisy, identity-less per-frame hand detections into a
//! small set of persistent, uniquely identified, motion-smoothed tracks that
//! are safe to drive hit-testing and rendering with.
//!
//! ## Features
//!
//! - Damped constant-velocity prediction to steer association
//! - Greedy, side-aware association with a hard distance gate
//!   (optimal Hungarian assignment available as an opt-in strategy)
//! - Distance-adaptive smoothing: heavy on a still hand, light on fast motion
//! - Occlusion tolerance: inertial coasting, grace period, visibility fade
//! - Stability gating and padded capture radius for hit-testing
//!
//! ## Example
//!
//! ```rust,ignore
//! use handtrack_rs::{Detection, Side, Tracker, TrackerConfig};
//!
//! let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
//!
//! // Once per rendered frame, with whatever the perception model produced
//! let detections = vec![Detection::new(320.0, 240.0, Side::Right).unwrap()];
//! for track in tracker.update(&detections) {
//!     println!("hand {} at ({:.1}, {:.1})", track.id, track.x(), track.y());
//! }
//! ```

// Internal modules (assignment solver)
pub(crate) mod internal;

// Public modules
pub mod filter;
pub mod distances;
pub mod matching;
pub mod lifecycle;
pub mod tracker;
pub mod detection;
pub mod track;

// Re-exports for convenience
pub use detection::{Detection, Side};
pub use track::{Track, TrackId, TrackIdFactory};
pub use tracker::{TickReport, TrackStore, Tracker, TrackerConfig, ValidConfig};
pub use matching::AssignmentStrategy;
pub use hit_test::Target;

// Error types
pub use crate::error::{Error, Result};

mod error {
    use thiserror::Error;

    /// Errors that can occur in the handtrack library
    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum Error {
        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        #[error("Invalid detection: {0}")]
        InvalidDetection(String),

        #[error("Invalid track store: {0}")]
        InvalidStore(String),
    }

    /// Result type for handtrack operations
    pub type Result<T> = std::result::Result<T, Error>;
}
