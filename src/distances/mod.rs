//! Distance functions for associating detections with tracks.
//!
//! This module provides:
//! - `Distance` trait for all distance implementations
//! - `SideWeightedDistance` - prediction-aware Euclidean distance with a
//!   same-handedness discount

mod traits;
mod side_weighted;

pub use traits::Distance;
pub use side_weighted::SideWeightedDistance;
