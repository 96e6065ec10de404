//! # fieldrecon core
//!
//! Core types and I/O for the fieldrecon field-reconstruction tools.
//!
//! This crate provides:
//! - `Field<T>`: dense 2D grid of scalar values with an optional no-data marker
//! - `FieldElement`: the numeric types a field can hold
//! - `Error` / `Result`: the error taxonomy shared by every fieldrecon crate
//! - TIFF reading and writing for single-band fields

pub mod error;
pub mod field;
pub mod io;

pub use error::{Error, Result};
pub use field::{Field, FieldElement, FieldStatistics};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::field::{Field, FieldElement};
}
