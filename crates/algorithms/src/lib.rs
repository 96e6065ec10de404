//! # fieldrecon algorithms
//!
//! Reconstruction of dense scalar fields from sparse observations.
//!
//! ## Modules
//!
//! - **interpolation**: observation sets and k-nearest-neighbor reconstruction
//!   with inverse-exponential-distance weights
//! - **evaluation**: accuracy metrics between a reconstruction and ground truth

pub mod evaluation;
pub mod interpolation;
pub(crate) mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::evaluation::{absolute_error, compare_fields, mean_absolute_error, ErrorStats};
    pub use crate::interpolation::{
        knn_interpolation, KnnInterpolator, KnnParams, Neighbor, Observation, ObservationSet,
        Support,
    };
    pub use fieldrecon_core::prelude::*;
}
