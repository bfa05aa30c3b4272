//! Direct N-body gravity (O(N²) implementation)

use nalgebra::Vector2;

use crate::body::Body;
use crate::forces::{ForceModel, G};
use crate::integrator::MirrorParticle;

/// Unsoftened pairwise accelerations of every body due to all others.
///
/// `a_i = Σ_{j≠i} -G m_j (x_i - x_j) / |x_i - x_j|³`
///
/// Coincident bodies are a caller error and produce non-finite values.
///
/// # Examples
///
/// ```
/// use nbody::body::{Body, BodyId};
/// use nbody::forces::pairwise_accelerations;
///
/// let bodies = [Body::new(BodyId(0), 1.0, [0.0, 0.0], [0.0, 0.0])];
/// let accel = pairwise_accelerations(&bodies);
/// assert_eq!(accel[0].magnitude(), 0.0);
/// ```
pub fn pairwise_accelerations(bodies: &[Body]) -> Vec<Vector2<f64>> {
    bodies
        .iter()
        .enumerate()
        .map(|(i, body)| {
            bodies
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, other)| {
                    let dr = body.position - other.position;
                    let dist = dr.magnitude();
                    -dr * (G * other.mass / (dist * dist * dist))
                })
                .fold(Vector2::zeros(), |acc, a| acc + a)
        })
        .collect()
}

/// Refresh every body's cached N-body acceleration.
pub fn compute_nbody_accelerations(bodies: &mut [Body]) {
    let accelerations = pairwise_accelerations(bodies);
    bodies
        .iter_mut()
        .zip(accelerations)
        .for_each(|(body, accel)| body.nbody_acceleration = accel);
}

/// Direct O(N²) gravity between mirrored particles
///
/// A particle that does not feel the others is only attracted by the
/// primary (particle 0).
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectGravity;

impl ForceModel for DirectGravity {
    fn accelerations(&self, particles: &[MirrorParticle], out: &mut [Vector2<f64>]) {
        for (i, (p, a)) in particles.iter().zip(out.iter_mut()).enumerate() {
            *a = particles
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i && (p.feels_others || *j == 0))
                .map(|(_, other)| {
                    let dr = other.position - p.position;
                    let r2 = dr.magnitude_squared();
                    let r = r2.sqrt();
                    dr * (G * other.mass / (r2 * r))
                })
                .fold(Vector2::zeros(), |acc, x| acc + x);
        }
    }

    fn potential_energy(&self, particles: &[MirrorParticle]) -> f64 {
        particles
            .iter()
            .enumerate()
            .flat_map(|(i, a)| {
                particles[i + 1..].iter().map(move |b| {
                    let r = (a.position - b.position).magnitude();
                    -G * a.mass * b.mass / r
                })
            })
            .sum()
    }
}

/// Compute Hill radius of a body orbiting a central mass
///
/// `R_H = (m / (3 (M + m)))^(1/3) · a`
///
/// # Examples
///
/// ```
/// use nbody::forces::hill_radius;
///
/// // Jupiter-mass planet at a = 1
/// let r_hill = hill_radius(1.0e-3, 1.0, 1.0);
/// assert!((r_hill - 0.0693).abs() < 1e-3);
/// ```
pub fn hill_radius(mass: f64, semi_major_axis: f64, center_mass: f64) -> f64 {
    semi_major_axis * (mass / (3.0 * (center_mass + mass))).cbrt()
}
