use thiserror::Error;

pub type GridResult<T> = Result<T, GridError>;

/// Errors raised while building grids, decompositions and fields
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("invalid radial extent [{r_min}, {r_max}]: need 0 < r_min < r_max")]
    InvalidRadii { r_min: f64, r_max: f64 },

    #[error("grid needs at least one ring and one sector, got {n_radial}x{n_azimuthal}")]
    EmptyGrid { n_radial: usize, n_azimuthal: usize },

    #[error("cannot split {n_radial} rings into {n_ranks} ranks (rank {rank})")]
    InvalidDecomposition {
        rank: usize,
        n_ranks: usize,
        n_radial: usize,
    },

    #[error("field {name} has shape {found:?}, grid expects {expected:?}")]
    ShapeMismatch {
        name: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },
}
