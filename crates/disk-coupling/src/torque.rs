use nbody::forces::G;
use nbody::system::PlanetarySystem;
use polargrid::{Communicator, GasFields, PolarGrid};

use crate::smoothing::VerticalStructure;

/// Fraction of the Hill radius inside which the gas pull is tapered off
const TAPER_FRACTION: f64 = 0.8;

/// Fermi-type taper that suppresses the gas bound to the body itself.
///
/// Only applied inside `4 r_t`; beyond that the weight is 1.
pub(crate) fn taper(distance: f64, r_taper: f64) -> f64 {
    if distance < 4.0 * r_taper {
        1.0 / ((-(distance - r_taper) / (0.1 * r_taper)).exp() + 1.0)
    } else {
        1.0
    }
}

/// Torque of the gas on every body, about the frame origin.
///
/// The gas pull is softened with `thickness_factor` times the scale height
/// at the body's distance and tapered inside `0.8 R_Hill`. Only active cells
/// contribute; the result is summed over all ranks.
pub fn disk_torques<V, C>(
    system: &PlanetarySystem,
    grid: &PolarGrid,
    gas: &GasFields,
    vertical: &V,
    thickness_factor: f64,
    comm: &C,
) -> Vec<f64>
where
    V: VerticalStructure + ?Sized,
    C: Communicator + ?Sized,
{
    let frame = system.frame();

    let mut torques: Vec<f64> = system
        .bodies()
        .iter()
        .enumerate()
        .map(|(k, body)| {
            let smoothing = thickness_factor * vertical.scale_height(body.orbital_radius());
            let r_taper = TAPER_FRACTION * body.hill_radius(frame.hill_center_mass(system.bodies(), k));

            let mut torque = 0.0;
            for i in grid.active_range() {
                let surface = grid.surface(i);
                for (j, sigma) in gas.density.row(i).iter().enumerate() {
                    let d = body.position - grid.cell_center(i, j);
                    let distance = d.magnitude();
                    let distance2 = distance * distance + smoothing * smoothing;
                    if distance2 == 0.0 {
                        continue;
                    }
                    let weight = if r_taper > 0.0 { taper(distance, r_taper) } else { 1.0 };

                    let force = -d * (G * sigma * surface * body.mass * weight)
                        / (distance2 * distance2.sqrt());
                    torque += body.position.x * force.y - body.position.y * force.x;
                }
            }
            torque
        })
        .collect();

    comm.all_reduce_sum(&mut torques);
    torques
}
