use log::error;
use nbody::integrator::OrbitalIntegrator;
use nbody::system::PlanetarySystem;
use nbody::{IndirectTerm, IntegrationError};

/// Kick every disk-feeling body with the disk pull and the disk part of the
/// indirect term: `v += dt · (a_disk + I_disk)`.
pub fn apply_disk_kick(system: &mut PlanetarySystem, indirect: &IndirectTerm, dt: f64) {
    for body in system.bodies_mut().iter_mut().filter(|b| b.feels_disk) {
        body.velocity += (body.disk_acceleration + indirect.disk) * dt;
    }
}

/// Full propagation of the bodies through an external orbital integrator
pub struct OrbitalAdvancer {
    integrator: Box<dyn OrbitalIntegrator>,
}

impl OrbitalAdvancer {
    pub fn new(integrator: Box<dyn OrbitalIntegrator>) -> Self {
        Self { integrator }
    }

    pub fn integrator_name(&self) -> &'static str {
        self.integrator.name()
    }

    /// Advance the system from `time` to `time + dt`.
    ///
    /// The bodies are mirrored into the integrator state, propagated, copied
    /// back and re-expressed relative to the new frame center. Orbital
    /// elements are refreshed afterwards.
    ///
    /// # Errors
    ///
    /// Integrator failures are returned unchanged and leave the bodies as
    /// they were before the call.
    pub fn propagate(
        &mut self,
        system: &mut PlanetarySystem,
        time: f64,
        dt: f64,
    ) -> Result<(), IntegrationError> {
        system.sync_mirror(time);
        if let Err(err) = self.integrator.advance(system.mirror_mut(), time + dt) {
            error!(
                "{} failed to reach t = {}: {err}",
                self.integrator.name(),
                time + dt
            );
            return Err(err);
        }

        system.restore_from_mirror();
        system.move_to_frame_center();
        system.update_orbital_elements();
        Ok(())
    }
}
