//! Substep orchestration
//!
//! A hydro substep is bracketed by two calls:
//!
//! 1. [`GravityCoupling::prepare_substep`] refreshes the N-body and disk
//!    accelerations, the indirect term and the gas potential.
//! 2. The external hydro solver advances the gas.
//! 3. [`GravityCoupling::finish_substep`] kicks the bodies with the disk pull,
//!    runs accretion and propagates the bodies to the end of the substep.

use log::info;
use nalgebra::Vector2;
use nbody::frame::{IndirectTerm, ReferenceCenter};
use nbody::integrator::OrbitalIntegrator;
use nbody::system::PlanetarySystem;
use polargrid::{Communicator, GasFields, PolarGrid};

use crate::accretion::{AccretionParams, AccretionReport, accrete_onto_bodies};
use crate::advance::{OrbitalAdvancer, apply_disk_kick};
use crate::config::CouplingConfig;
use crate::error::CouplingResult;
use crate::force::{GasGravity, compute_disk_on_body_accel};
use crate::potential::compute_potential;
use crate::smoothing::{FlaredDisk, Softening, SmoothingPolicy};
use crate::torque::disk_torques;

/// Outcome of [`GravityCoupling::finish_substep`]
#[derive(Debug, Clone, PartialEq)]
pub struct SubstepReport {
    /// Indirect term used during the substep
    pub indirect: IndirectTerm,
    pub accretion: AccretionReport,
    /// Whether the orbital integrator ran
    pub propagated: bool,
}

/// Couples one rank's gas grid to the replicated planetary system
pub struct GravityCoupling<C: Communicator> {
    disk_feedback: bool,
    omega_frame: f64,
    smoothing: SmoothingPolicy,
    thickness_factor: f64,
    vertical: FlaredDisk,
    accretion: AccretionParams,
    advancer: Option<OrbitalAdvancer>,
    disk_force: GasGravity,
    reference_center: ReferenceCenter,
    indirect: IndirectTerm,
    comm: C,
}

impl<C: Communicator> GravityCoupling<C> {
    /// Set up the coupling for `system` on the local `grid`.
    ///
    /// # Errors
    ///
    /// Returns the configuration error if `config` does not validate.
    pub fn new(
        config: &CouplingConfig,
        system: &PlanetarySystem,
        grid: &PolarGrid,
        comm: C,
    ) -> CouplingResult<Self> {
        config.validate()?;

        let advancer = config
            .integrate_bodies
            .then(|| OrbitalAdvancer::new(config.integrator.build()));
        let reference_center =
            ReferenceCenter::resolve(system.frame(), system.bodies(), grid.outer_radius());

        if comm.is_master() {
            info!(
                "gravity coupling on {} ranks: disk feedback {}, smoothing {:?}, integrator {}",
                comm.size(),
                config.disk_feedback,
                config.smoothing.policy(),
                advancer.as_ref().map_or("off", |a| a.integrator_name())
            );
            info!("disk eccentricity is computed relative to {reference_center:?}");
        }

        Ok(Self {
            disk_feedback: config.disk_feedback,
            omega_frame: config.omega_frame,
            smoothing: config.smoothing.policy(),
            thickness_factor: config.smoothing.thickness_factor,
            vertical: config.vertical,
            accretion: config.accretion.params(),
            advancer,
            disk_force: GasGravity,
            reference_center,
            indirect: IndirectTerm::zero(),
            comm,
        })
    }

    /// Propagate with `integrator` instead of the configured one
    pub fn with_integrator(mut self, integrator: Box<dyn OrbitalIntegrator>) -> Self {
        self.advancer = Some(OrbitalAdvancer::new(integrator));
        self
    }

    pub fn comm(&self) -> &C {
        &self.comm
    }

    /// Indirect term of the current substep
    pub fn indirect_term(&self) -> IndirectTerm {
        self.indirect
    }

    /// Center used by eccentricity and periastron diagnostics
    pub fn reference_center(&self) -> ReferenceCenter {
        self.reference_center
    }

    /// Refresh accelerations, the indirect term and the gas potential.
    ///
    /// # Errors
    ///
    /// Fails if the gas fields do not match the grid.
    pub fn prepare_substep(
        &mut self,
        system: &mut PlanetarySystem,
        grid: &PolarGrid,
        gas: &mut GasFields,
        time: f64,
    ) -> CouplingResult<IndirectTerm> {
        gas.check_shape(grid)?;
        system.compute_nbody_accelerations();

        let softening = Softening::prepare(
            self.smoothing,
            system.bodies(),
            system.frame(),
            &self.vertical,
        );

        if self.disk_feedback {
            compute_disk_on_body_accel(
                system,
                grid,
                gas,
                &self.disk_force,
                &softening,
                &self.comm,
            );
        } else {
            for body in system.bodies_mut() {
                body.disk_acceleration = Vector2::zeros();
            }
        }

        self.indirect = system.indirect_term(self.disk_feedback);
        compute_potential(
            grid,
            &mut gas.potential,
            system.bodies(),
            &self.indirect,
            &softening,
            time,
        )?;
        Ok(self.indirect)
    }

    /// Apply the disk kick, accretion and full propagation over `dt`.
    ///
    /// # Errors
    ///
    /// Gas fields that do not match `grid` are rejected before anything is
    /// touched. Integrator failures are fatal and returned as-is; the bodies
    /// then keep their pre-propagation state.
    pub fn finish_substep(
        &mut self,
        system: &mut PlanetarySystem,
        grid: &PolarGrid,
        gas: &mut GasFields,
        time: f64,
        dt: f64,
    ) -> CouplingResult<SubstepReport> {
        gas.check_shape(grid)?;

        if self.disk_feedback {
            apply_disk_kick(system, &self.indirect, dt);
        }

        let accretion = accrete_onto_bodies(
            system,
            grid,
            gas,
            dt,
            self.omega_frame,
            &self.accretion,
            &self.comm,
        );

        let propagated = match self.advancer.as_mut() {
            Some(advancer) => {
                advancer.propagate(system, time, dt)?;
                true
            }
            None => {
                // Propagation refreshes a and Ω itself
                if accretion.masses_changed {
                    system.update_orbital_elements();
                }
                false
            }
        };

        Ok(SubstepReport {
            indirect: self.indirect,
            accretion,
            propagated,
        })
    }

    /// Gas torque on every body, reduced over all ranks
    pub fn disk_torques(
        &self,
        system: &PlanetarySystem,
        grid: &PolarGrid,
        gas: &GasFields,
    ) -> Vec<f64> {
        disk_torques(
            system,
            grid,
            gas,
            &self.vertical,
            self.thickness_factor,
            &self.comm,
        )
    }

    /// Gas mass of the whole disk
    pub fn gas_total_mass(&self, grid: &PolarGrid, gas: &GasFields) -> f64 {
        gas.total_mass(grid, &self.comm)
    }
}
