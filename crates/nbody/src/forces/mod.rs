//! Gravitational forces between point masses
//!
//! This module provides the `ForceModel` trait used by the orbital
//! integrators, and the direct pairwise accelerator that fills the bodies'
//! cached N-body accelerations.

use nalgebra::Vector2;

use crate::integrator::MirrorParticle;

pub mod gravity;


pub use gravity::{DirectGravity, compute_nbody_accelerations, hill_radius, pairwise_accelerations};

/// Gravitational constant in code units
pub const G: f64 = 1.0;

/// A source of acceleration on the particles an integrator advances
///
/// # Examples
///
/// ```
/// use nalgebra::Vector2;
/// use nbody::forces::{DirectGravity, ForceModel};
/// use nbody::integrator::MirrorParticle;
///
/// let particles = [
///     MirrorParticle::new(1.0, [0.0, 0.0], [0.0, 0.0]),
///     MirrorParticle::new(1.0e-3, [1.0, 0.0], [0.0, 1.0]),
/// ];
/// let mut accel = vec![Vector2::zeros(); 2];
/// DirectGravity.accelerations(&particles, &mut accel);
///
/// assert!(accel[1].x < 0.0);
/// ```
pub trait ForceModel: Send + Sync {
    /// Overwrite `out[i]` with the acceleration of particle `i`
    fn accelerations(&self, particles: &[MirrorParticle], out: &mut [Vector2<f64>]);

    /// Potential energy of the configuration (optional)
    fn potential_energy(&self, _particles: &[MirrorParticle]) -> f64 {
        0.0
    }
}
