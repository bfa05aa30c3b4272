//! Error types for the coupling layer
//!
//! Everything here is fatal to a run. Configuration problems surface once at
//! setup; integration failures surface from the substep that hit them.

use nbody::{IntegrationError, SystemError};
use polargrid::GridError;
use thiserror::Error;

pub type CouplingResult<T> = Result<T, CouplingError>;

/// Invalid or unreadable configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("smoothing factor {name} must be positive and finite, got {value}")]
    InvalidSmoothing { name: &'static str, value: f64 },

    #[error("aspect ratio must be positive, got {0}")]
    InvalidAspectRatio(f64),

    #[error("accretion threshold must be non-negative, got {0}")]
    InvalidAccretionThreshold(f64),

    #[error("accretion zones need 0 < inner ({inner}) < outer ({outer})")]
    InvalidAccretionZones { outer: f64, inner: f64 },

    #[error("integrator {method}: {reason}")]
    InvalidIntegrator {
        method: &'static str,
        reason: &'static str,
    },

    #[error("body {index}: {reason}")]
    InvalidBody { index: usize, reason: &'static str },

    #[error("configuration lists no bodies")]
    NoBodies,

    #[error("failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Any failure of the coupling layer
#[derive(Error, Debug)]
pub enum CouplingError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    System(#[from] SystemError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("orbital integration failed: {0}")]
    Integration(#[from] IntegrationError),
}
