//! Dense field data structures

mod element;
mod grid;

pub use element::FieldElement;
pub use grid::{Field, FieldStatistics};
