use log::info;
use nalgebra::{Point2, Vector2};

use crate::body::{Body, BodyId};
use crate::error::{SystemError, SystemResult};
use crate::forces::compute_nbody_accelerations;
use crate::frame::{FrameCenter, IndirectTerm, ReferenceCenter, compute_indirect_term};
use crate::integrator::{IntegratorState, MirrorParticle};

/// The star(s) and planets coupled to the disk
///
/// Owns the body list, the frame-center policy and the integrator mirror.
/// Every rank holds an identical copy.
#[derive(Debug, Clone)]
pub struct PlanetarySystem {
    bodies: Vec<Body>,
    frame: FrameCenter,
    /// Mass of the frame-center bodies, read by boundary and profile code
    frame_center_mass: f64,
    mirror: IntegratorState,
}

impl PlanetarySystem {
    /// Build a validated system.
    ///
    /// # Errors
    ///
    /// Fails when the frame center needs more bodies than given, when the
    /// frame-center bodies have no mass, or when ids repeat.
    ///
    /// # Examples
    ///
    /// ```
    /// use nbody::body::{Body, BodyId};
    /// use nbody::frame::FrameCenter;
    /// use nbody::system::PlanetarySystem;
    ///
    /// let star = Body::new(BodyId(0), 1.0, [0.0, 0.0], [0.0, 0.0]);
    /// let planet = Body::new(BodyId(1), 1.0e-3, [1.0, 0.0], [0.0, 1.0]);
    /// let system = PlanetarySystem::new(FrameCenter::Primary, vec![star, planet]).unwrap();
    ///
    /// assert_eq!(system.body_count(), 2);
    /// assert_eq!(system.frame_center_mass(), 1.0);
    /// ```
    pub fn new(frame: FrameCenter, bodies: Vec<Body>) -> SystemResult<Self> {
        let n_center = frame.n_bodies();
        if n_center == 0 {
            return Err(SystemError::EmptyFrameCenter);
        }
        if n_center > bodies.len() {
            return Err(SystemError::FrameCenterTooLarge {
                requested: n_center,
                available: bodies.len(),
            });
        }
        for (i, body) in bodies.iter().enumerate() {
            if bodies[..i].iter().any(|b| b.id == body.id) {
                return Err(SystemError::DuplicateBodyId(body.id.0));
            }
        }

        let mass: f64 = bodies[..n_center].iter().map(|b| b.mass).sum();
        if mass <= 0.0 || !mass.is_finite() {
            return Err(SystemError::NonPositiveCenterMass {
                bodies: n_center,
                mass,
            });
        }

        info!(
            "planetary system with {} bodies, frame center {:?} (mass {mass})",
            bodies.len(),
            frame
        );

        let mut system = Self {
            bodies,
            frame,
            frame_center_mass: mass,
            mirror: IntegratorState::default(),
        };
        system.sync_mirror(0.0);
        Ok(system)
    }

    /// Appends a body and returns its id
    pub fn add_body(&mut self, mut body: Body) -> BodyId {
        let next = self.bodies.iter().map(|b| b.id.0 + 1).max().unwrap_or(0);
        if self.get_body(body.id).is_some() {
            body.id = BodyId(next);
        }
        let id = body.id;
        self.bodies.push(body);
        let time = self.mirror.time;
        self.sync_mirror(time);
        id
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub fn body(&self, idx: usize) -> &Body {
        &self.bodies[idx]
    }

    pub fn get_body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn get_body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.id == id)
    }

    pub fn frame(&self) -> FrameCenter {
        self.frame
    }

    /// Cached mass of the frame-center bodies
    pub fn frame_center_mass(&self) -> f64 {
        self.frame_center_mass
    }

    /// Recompute the cached frame-center mass after masses changed
    pub fn update_frame_center_mass(&mut self) {
        self.frame_center_mass = self.bodies[..self.frame.n_bodies()]
            .iter()
            .map(|b| b.mass)
            .sum();
    }

    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.mass).sum()
    }

    pub fn total_momentum(&self) -> Vector2<f64> {
        self.bodies
            .iter()
            .map(|b| b.momentum())
            .fold(Vector2::zeros(), |acc, p| acc + p)
    }

    // =========================================================================
    // Centers
    // =========================================================================

    /// Barycenter of the first `n` bodies
    pub fn center_of_mass(&self, n: usize) -> Point2<f64> {
        let bodies = &self.bodies[..n.min(self.bodies.len())];
        let mass: f64 = bodies.iter().map(|b| b.mass).sum();
        let weighted = bodies
            .iter()
            .map(|b| b.position.coords * b.mass)
            .fold(Vector2::zeros(), |acc, x| acc + x);
        Point2::from(weighted / mass)
    }

    /// Barycentric velocity of the first `n` bodies
    pub fn center_of_mass_velocity(&self, n: usize) -> Vector2<f64> {
        let bodies = &self.bodies[..n.min(self.bodies.len())];
        let mass: f64 = bodies.iter().map(|b| b.mass).sum();
        bodies
            .iter()
            .map(|b| b.momentum())
            .fold(Vector2::zeros(), |acc, p| acc + p)
            / mass
    }

    pub fn frame_center_position(&self) -> Point2<f64> {
        self.center_of_mass(self.frame.n_bodies())
    }

    pub fn frame_center_velocity(&self) -> Vector2<f64> {
        self.center_of_mass_velocity(self.frame.n_bodies())
    }

    /// Position and velocity of a diagnostic reference center
    pub fn reference_center(&self, center: ReferenceCenter) -> (Point2<f64>, Vector2<f64>) {
        match center {
            ReferenceCenter::FrameCenter => {
                (self.frame_center_position(), self.frame_center_velocity())
            }
            ReferenceCenter::NbodyBarycenter => {
                let n = self.bodies.len();
                (self.center_of_mass(n), self.center_of_mass_velocity(n))
            }
        }
    }

    /// Re-express every body relative to the current frame center
    pub fn move_to_frame_center(&mut self) {
        let position = self.frame_center_position().coords;
        let velocity = self.frame_center_velocity();
        for body in &mut self.bodies {
            body.position -= position;
            body.velocity -= velocity;
        }
    }

    /// Refresh semi-major axes, eccentricities and mean motions relative to
    /// the frame center.
    pub fn update_orbital_elements(&mut self) {
        let mass = self.frame_center_mass;
        let position = self.frame_center_position();
        let velocity = self.frame_center_velocity();
        for body in &mut self.bodies {
            body.update_orbit(mass, position, velocity);
        }
    }

    // =========================================================================
    // Forces
    // =========================================================================

    /// Refresh the cached body-on-body accelerations
    pub fn compute_nbody_accelerations(&mut self) {
        compute_nbody_accelerations(&mut self.bodies);
    }

    /// Indirect term of the current cached accelerations
    pub fn indirect_term(&self, disk_feedback: bool) -> IndirectTerm {
        compute_indirect_term(&self.bodies, self.frame, disk_feedback)
    }

    // =========================================================================
    // Integrator mirror
    // =========================================================================

    pub fn mirror(&self) -> &IntegratorState {
        &self.mirror
    }

    pub fn mirror_mut(&mut self) -> &mut IntegratorState {
        &mut self.mirror
    }

    /// Copy the body state into the integrator mirror and set its clock
    pub fn sync_mirror(&mut self, time: f64) {
        self.mirror.time = time;
        self.mirror.particles.clear();
        self.mirror
            .particles
            .extend(self.bodies.iter().map(|b| MirrorParticle {
                mass: b.mass,
                position: b.position,
                velocity: b.velocity,
                feels_others: b.feels_others,
            }));
    }

    /// Copy positions and velocities back from the integrator mirror
    pub fn restore_from_mirror(&mut self) {
        for (body, p) in self.bodies.iter_mut().zip(self.mirror.particles.iter()) {
            body.position = p.position;
            body.velocity = p.velocity;
        }
    }
}
