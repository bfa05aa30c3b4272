//! Softened gravitational accelerations at arbitrary points
//!
//! [`point_mass_acceleration`] gives the pull of the bodies alone. The pull of
//! the gas on a body comes from a [`DiskForce`]; [`GasGravity`] sums it
//! directly over the grid cells.

use nalgebra::{Point2, Vector2};
use nbody::Body;
use nbody::forces::G;
use nbody::system::PlanetarySystem;
use polargrid::{Communicator, GasFields, PolarGrid};

use crate::smoothing::{Softening, VerticalStructure};

/// Net softened acceleration at `point` due to every body.
///
/// The softening of body `k` is the one the potential builder would use for
/// a cell at the radius of `point`. A body with zero softening sitting
/// exactly on `point` contributes nothing.
///
/// # Examples
///
/// ```
/// use disk_coupling::force::point_mass_acceleration;
/// use disk_coupling::smoothing::{FlaredDisk, Softening, SmoothingPolicy};
/// use nalgebra::Point2;
/// use nbody::{Body, BodyId, FrameCenter};
///
/// let star = Body::new(BodyId(0), 1.0, [0.0, 0.0], [0.0, 0.0]);
/// let disk = FlaredDisk::default();
/// let policy = SmoothingPolicy::Roche { factor: 0.5 };
/// let softening = Softening::prepare(policy, &[star], FrameCenter::Primary, &disk);
///
/// let a = point_mass_acceleration(Point2::new(2.0, 0.0), &[star], &softening);
/// assert!((a.x + 0.25).abs() < 1e-15);
/// ```
pub fn point_mass_acceleration<V: VerticalStructure + ?Sized>(
    point: Point2<f64>,
    bodies: &[Body],
    softening: &Softening<'_, V>,
) -> Vector2<f64> {
    let r = point.coords.magnitude();
    bodies
        .iter()
        .enumerate()
        .map(|(k, body)| {
            let d = body.position - point;
            let distance2 = d.norm_squared() + softening.at_radius(k, r);
            if distance2 == 0.0 {
                return Vector2::zeros();
            }
            d * (G * body.mass / (distance2 * distance2.sqrt()))
        })
        .fold(Vector2::zeros(), |acc, a| acc + a)
}

/// Source of the gas pull on a body
pub trait DiskForce {
    /// Acceleration from the gas held by this rank, before any reduction.
    ///
    /// `eps2` is the squared softening of the body.
    fn local_acceleration(
        &self,
        grid: &PolarGrid,
        gas: &GasFields,
        position: Point2<f64>,
        eps2: f64,
    ) -> Vector2<f64>;
}

/// Direct summation of the softened pull of every active gas cell
#[derive(Debug, Clone, Copy, Default)]
pub struct GasGravity;

impl DiskForce for GasGravity {
    fn local_acceleration(
        &self,
        grid: &PolarGrid,
        gas: &GasFields,
        position: Point2<f64>,
        eps2: f64,
    ) -> Vector2<f64> {
        let mut accel = Vector2::zeros();
        for i in grid.active_range() {
            let surface = grid.surface(i);
            for (j, sigma) in gas.density.row(i).iter().enumerate() {
                let d = grid.cell_center(i, j) - position;
                let distance2 = d.norm_squared() + eps2;
                if distance2 == 0.0 {
                    continue;
                }
                accel += d * (G * sigma * surface / (distance2 * distance2.sqrt()));
            }
        }
        accel
    }
}

/// Refresh the cached disk acceleration of every body.
///
/// Bodies that feel the disk get the reduced pull of the whole disk, the
/// others are reset to zero. Every rank must call this together.
pub fn compute_disk_on_body_accel<F, V, C>(
    system: &mut PlanetarySystem,
    grid: &PolarGrid,
    gas: &GasFields,
    force: &F,
    softening: &Softening<'_, V>,
    comm: &C,
) where
    F: DiskForce + ?Sized,
    V: VerticalStructure + ?Sized,
    C: Communicator + ?Sized,
{
    let mut buffer: Vec<f64> = system
        .bodies()
        .iter()
        .enumerate()
        .flat_map(|(k, body)| {
            let accel = if body.feels_disk {
                let eps2 = softening.at_radius(k, body.orbital_radius());
                force.local_acceleration(grid, gas, body.position, eps2)
            } else {
                Vector2::zeros()
            };
            [accel.x, accel.y]
        })
        .collect();

    comm.all_reduce_sum(&mut buffer);

    for (body, accel) in system.bodies_mut().iter_mut().zip(buffer.chunks_exact(2)) {
        body.disk_acceleration = Vector2::new(accel[0], accel[1]);
    }
}
