//! Error types for the point-mass subsystem

use thiserror::Error;

pub type SystemResult<T> = Result<T, SystemError>;

/// Setup errors of a [`crate::system::PlanetarySystem`]
///
/// These are configuration errors: they are raised once while building the
/// system and never during a substep.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SystemError {
    #[error("frame center must be defined by at least one body")]
    EmptyFrameCenter,

    #[error("frame center uses {requested} bodies but only {available} exist")]
    FrameCenterTooLarge { requested: usize, available: usize },

    #[error("total mass of the {bodies} frame-center bodies is {mass:e}, must be positive")]
    NonPositiveCenterMass { bodies: usize, mass: f64 },

    #[error("body id {0} is used twice")]
    DuplicateBodyId(u32),
}

/// Failures of an orbital integrator
///
/// Any of these is fatal for the run: the coupling layer has no retry path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegrationError {
    #[error("target time {target} lies before integrator time {current}")]
    TargetInPast { current: f64, target: f64 },

    #[error("step size {dt:e} underflowed at t = {time}")]
    StepSizeUnderflow { time: f64, dt: f64 },

    #[error("no convergence after {steps} steps at t = {time}")]
    StepBudgetExhausted { time: f64, steps: usize },

    #[error("non-finite particle state at t = {time}")]
    NonFinite { time: f64 },
}
