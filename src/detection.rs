//! Detection struct for input to the tracker.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Coarse handedness label attached to every detection and track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// A single hand observation for one frame.
///
/// Detections carry no identity across frames. Coordinates are validated on
/// construction, so every `Detection` that reaches the tracker is finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    position: Point2<f64>,
    side: Side,
}

impl Detection {
    /// Create a new detection at `(x, y)`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDetection`] if either coordinate is NaN or infinite.
    pub fn new(x: f64, y: f64, side: Side) -> Result<Self> {
        if !x.is_finite() || !y.is_finite() {
            return Err(Error::InvalidDetection(format!(
                "coordinates must be finite, got ({}, {})",
                x, y
            )));
        }

        Ok(Self {
            position: Point2::new(x, y),
            side,
        })
    }

    /// Create a detection from a point.
    pub fn from_point(position: Point2<f64>, side: Side) -> Result<Self> {
        Self::new(position.x, position.y, side)
    }

    /// Position in the shared coordinate space.
    #[inline]
    pub fn position(&self) -> Point2<f64> {
        self.position
    }

    /// Handedness label.
    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.position.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.position.y
    }
}

// Route deserialization through `new` so finite coordinates hold for decoded input too.
impl<'de> Deserialize<'de> for Detection {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            position: Point2<f64>,
            side: Side,
        }

        let raw = Raw::deserialize(deserializer)?;
        Detection::from_point(raw.position, raw.side).map_err(serde::de::Error::custom)
    }
}
