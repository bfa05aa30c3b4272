//! Kley accretion of gas onto bodies
//!
//! Each accreting body removes, per free-fall time at its Hill radius, a
//! fraction of the gas inside two concentric zones: `facc/3` inside
//! `outer_fraction · R_Hill` and a further `2 facc/3` inside
//! `inner_fraction · R_Hill`. A cell in the inner zone lies in both and is
//! depleted twice. The removed mass and momentum are summed over all ranks
//! before the body is updated, so every rank applies the same change.

use std::f64::consts::PI;

use log::{debug, warn};
use nalgebra::Vector2;
use nbody::BodyId;
use nbody::system::PlanetarySystem;
use polargrid::{Communicator, GasFields, PolarGrid};

/// Parameters of the two accretion zones
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccretionParams {
    /// Efficiencies at or below this value disable accretion
    pub threshold: f64,
    pub outer_fraction: f64,
    pub inner_fraction: f64,
}

impl Default for AccretionParams {
    fn default() -> Self {
        Self {
            threshold: 1e-10,
            outer_fraction: 0.75,
            inner_fraction: 0.45,
        }
    }
}

/// What one body took from the disk in one call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyAccretion {
    pub id: BodyId,
    /// Mass removed from this rank's active cells, before the reduction
    pub local_mass: f64,
    /// Mass gained, summed over all ranks
    pub delta_mass: f64,
    /// Momentum gained, summed over all ranks
    pub delta_momentum: Vector2<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccretionReport {
    pub bodies: Vec<BodyAccretion>,
    /// Whether any body mass was updated (and the frame-center mass with it)
    pub masses_changed: bool,
}

impl AccretionReport {
    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.delta_mass).sum()
    }
}

/// Removal fraction per substep: `dt · acc · Ω · sqrt(12) / 2π`
fn removal_fraction(dt: f64, efficiency: f64, omega: f64) -> f64 {
    dt * efficiency * omega * 12.0_f64.sqrt() / (2.0 * PI)
}

/// Remove gas around every accreting body and hand it to the body.
///
/// Ghost rings inside a zone are depleted like active rings but do not count
/// towards the body's gain; their owning rank counts them. Every rank must
/// call this together.
///
/// # Arguments
/// * `system` - Bodies; masses, velocities and the frame-center mass are updated
/// * `grid` - Local grid geometry
/// * `gas` - Gas fields; density is reduced in place
/// * `dt` - Substep length
/// * `omega_frame` - Frame rotation rate, added to the gas azimuthal velocity
/// * `params` - Zone parameters
/// * `comm` - Rank collective for the reduction
pub fn accrete_onto_bodies<C: Communicator + ?Sized>(
    system: &mut PlanetarySystem,
    grid: &PolarGrid,
    gas: &mut GasFields,
    dt: f64,
    omega_frame: f64,
    params: &AccretionParams,
    comm: &C,
) -> AccretionReport {
    let frame = system.frame();
    let n_phi = grid.n_azimuthal();

    // [dM, dPx, dPy] per accreting body
    let mut accreting: Vec<usize> = Vec::new();
    let mut totals: Vec<f64> = Vec::new();
    let mut local_masses: Vec<f64> = Vec::new();

    for (k, body) in system.bodies().iter().enumerate() {
        if body.accretion_efficiency <= params.threshold {
            continue;
        }
        let r_body = body.orbital_radius();
        if r_body == 0.0 {
            warn!("body {} sits on the frame center, skipping accretion", body.id.0);
            continue;
        }

        let facc = removal_fraction(dt, body.accretion_efficiency, body.omega);
        let zones = [
            (params.outer_fraction, facc / 3.0),
            (params.inner_fraction, 2.0 * facc / 3.0),
        ];
        let r_hill = body.hill_radius(frame.hill_center_mass(system.bodies(), k));

        // Rings whose faces bracket [r - R_H, r + R_H]
        let i_min = (0..grid.n_radial())
            .find(|&i| grid.r_sup(i) >= r_body - r_hill)
            .unwrap_or(grid.n_radial());
        let i_max = (0..grid.n_radial())
            .rev()
            .find(|&i| grid.r_inf(i) <= r_body + r_hill);

        // Truncated toward zero, not floored
        let angle = body.position.y.atan2(body.position.x);
        let half_width = 2.0 * r_hill / r_body;
        let sectors = n_phi as f64 / (2.0 * PI);
        let j_min = (sectors * (angle - half_width)) as i64;
        let j_max = (sectors * (angle + half_width)) as i64;

        let mut dm = 0.0;
        let mut dp = Vector2::zeros();

        for i in i_max.map_or(0..0, |i_max| i_min..i_max + 1) {
            let r_med = grid.r_med(i);
            let surface = grid.surface(i);
            let active = grid.is_active(i);

            for j in j_min..=j_max {
                let jf = grid.wrap_azimuthal(j);
                let jp = (jf + 1) % n_phi;
                let cell = grid.cell_center(i, jf);
                let distance = (body.position - cell).magnitude();

                let vt = 0.5 * (gas.v_azimuthal[(i, jf)] + gas.v_azimuthal[(i, jp)])
                    + r_med * omega_frame;
                let vr = 0.5 * (gas.v_radial[(i, jf)] + gas.v_radial[(i + 1, jf)]);
                let v_cell = Vector2::new(
                    (vr * cell.x - vt * cell.y) / r_med,
                    (vr * cell.y + vt * cell.x) / r_med,
                );

                for &(fraction, removal) in &zones {
                    if distance < fraction * r_hill {
                        let density = &mut gas.density[(i, jf)];
                        let delta = if active { removal * *density * surface } else { 0.0 };
                        *density *= 1.0 - removal;
                        dm += delta;
                        dp += v_cell * delta;
                    }
                }
            }
        }

        accreting.push(k);
        local_masses.push(dm);
        totals.extend_from_slice(&[dm, dp.x, dp.y]);
    }

    comm.all_reduce_sum(&mut totals);

    let mut report = AccretionReport::default();
    let bodies = system.bodies_mut();
    for ((&k, local_mass), delta) in accreting
        .iter()
        .zip(local_masses)
        .zip(totals.chunks_exact(3))
    {
        let body = &mut bodies[k];
        let delta_mass = delta[0];
        let delta_momentum = Vector2::new(delta[1], delta[2]);

        let momentum = body.momentum() + delta_momentum;
        let mass = body.mass + delta_mass;
        if body.feels_disk && mass > 0.0 {
            body.velocity = momentum / mass;
        }
        body.mass = mass;

        if comm.is_master() {
            debug!(
                "body {} accreted {delta_mass:e} (now {mass:e}), momentum {:?}",
                body.id.0, delta_momentum
            );
        }
        report.bodies.push(BodyAccretion {
            id: body.id,
            local_mass,
            delta_mass,
            delta_momentum,
        });
    }

    if !accreting.is_empty() {
        report.masses_changed = true;
        system.update_frame_center_mass();
    }
    report
}
