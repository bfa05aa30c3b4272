//! Gravitational potential of the bodies felt by the gas
//!
//! `Φ(cell) = Σ_k -G m_k / sqrt(d_k² + ε_k²) - (I_x x + I_y y)`
//!
//! The grid is overwritten on every call. Rings are independent and are
//! filled in parallel; within a cell the bodies are summed in list order, so
//! two calls on the same state give bit-identical results.

use nalgebra::Point2;
use nbody::Body;
use nbody::IndirectTerm;
use nbody::forces::G;
use polargrid::{GridResult, PolarField, PolarGrid};
use rayon::prelude::*;

use crate::smoothing::{Softening, VerticalStructure};

/// Fill `potential` from the bodies and the indirect term.
///
/// # Arguments
/// * `grid` - Local grid geometry
/// * `potential` - Output field, same shape as the grid
/// * `bodies` - Current body list in the frame
/// * `indirect` - Indirect term of the current substep
/// * `softening` - Resolved softening for these bodies
/// * `time` - Physical time, used for mass ramp-up
///
/// # Errors
///
/// Returns [`polargrid::GridError::ShapeMismatch`] if `potential` does not
/// match `grid`.
pub fn compute_potential<V: VerticalStructure + ?Sized>(
    grid: &PolarGrid,
    potential: &mut PolarField,
    bodies: &[Body],
    indirect: &IndirectTerm,
    softening: &Softening<'_, V>,
    time: f64,
) -> GridResult<()> {
    potential.check_shape("potential", (grid.n_radial(), grid.n_azimuthal()))?;

    let sources: Vec<(Point2<f64>, f64)> = bodies
        .iter()
        .map(|b| (b.position, b.ramped_mass(time)))
        .collect();
    let frame = indirect.total;

    potential
        .as_mut_slice()
        .par_chunks_mut(grid.n_azimuthal())
        .enumerate()
        .for_each(|(i, row)| {
            let ring = softening.ring(grid, i);
            for (j, value) in row.iter_mut().enumerate() {
                let cell = grid.cell_center(i, j);
                let shared = softening.cell(grid, i, j, ring);

                let mut phi = 0.0;
                for (k, (position, mass)) in sources.iter().enumerate() {
                    let eps2 = shared.unwrap_or_else(|| softening.body(k));
                    let distance2 = (cell - position).norm_squared() + eps2;
                    // Massless or unsoftened coincident sources add nothing
                    if *mass == 0.0 || distance2 == 0.0 {
                        continue;
                    }
                    phi += -G * mass / distance2.sqrt();
                }
                phi += -(frame.x * cell.x + frame.y * cell.y);

                *value = phi;
            }
        });

    Ok(())
}
