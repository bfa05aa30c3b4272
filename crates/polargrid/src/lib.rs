//! Polar gas grid seen by the gravitational coupling
//!
//! Geometry of a radially decomposed polar mesh, row-major cell fields, the
//! bundle of gas fields the coupling reads and writes, and the rank
//! collective used for cross-rank sums.

pub mod comm;
pub mod error;
pub mod field;
pub mod gas;
pub mod geometry;

#[cfg(test)]
mod gas_test;

pub use comm::{Communicator, LocalGroup, LocalRank, SingleProcess};
pub use error::{GridError, GridResult};
pub use field::PolarField;
pub use gas::GasFields;
pub use geometry::{PolarGrid, RadialSpacing};
