//! Spatial interpolation of sparse observations onto a dense grid
//!
//! - Observation sets: the known samples, taken from an observed field's
//!   support or from explicit coordinate lists
//! - KNN: k-nearest-neighbor estimates with inverse-exponential-distance
//!   weights

mod knn;
mod observation;

pub use knn::{knn_interpolation, KnnInterpolator, KnnParams, Neighbor};
pub use observation::{Observation, ObservationSet, Support};
