use std::f64::consts::PI;

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::forces::{G, hill_radius};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// A point mass (star or planet) coupled to the gas disk.
///
/// Positions and velocities are expressed in the hydro frame, i.e. relative
/// to the current frame center. The two cached accelerations are refreshed
/// every substep before anything reads them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub id: BodyId,
    pub mass: f64,
    pub position: Point2<f64>,
    pub velocity: Vector2<f64>,

    /// Osculating semi-major axis relative to the frame center
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    /// Orbital angular frequency (Keplerian mean motion)
    pub omega: f64,

    /// Kley accretion efficiency, fraction of the Hill sphere mass removed
    /// per free-fall time. Zero disables accretion.
    pub accretion_efficiency: f64,
    /// Mass is tapered in over this time in the gas potential (0 = off)
    pub ramp_up_time: f64,

    pub feels_disk: bool,
    pub feels_others: bool,

    pub disk_acceleration: Vector2<f64>,
    pub nbody_acceleration: Vector2<f64>,
}

impl Body {
    /// Creates a body that feels both the disk and the other bodies, with
    /// accretion switched off.
    ///
    /// # Examples
    ///
    /// ```
    /// use nbody::body::{Body, BodyId};
    ///
    /// let planet = Body::new(BodyId(1), 1.0e-3, [1.0, 0.0], [0.0, 1.0]);
    /// assert!(planet.feels_disk);
    /// assert_eq!(planet.accretion_efficiency, 0.0);
    /// ```
    pub fn new(id: BodyId, mass: f64, position: [f64; 2], velocity: [f64; 2]) -> Self {
        Body {
            id,
            mass,
            position: Point2::new(position[0], position[1]),
            velocity: Vector2::new(velocity[0], velocity[1]),
            semi_major_axis: 0.0,
            eccentricity: 0.0,
            omega: 0.0,
            accretion_efficiency: 0.0,
            ramp_up_time: 0.0,
            feels_disk: true,
            feels_others: true,
            disk_acceleration: Vector2::zeros(),
            nbody_acceleration: Vector2::zeros(),
        }
    }

    pub fn with_accretion(mut self, efficiency: f64) -> Self {
        self.accretion_efficiency = efficiency;
        self
    }

    pub fn with_feels_disk(mut self, feels_disk: bool) -> Self {
        self.feels_disk = feels_disk;
        self
    }

    pub fn with_feels_others(mut self, feels_others: bool) -> Self {
        self.feels_others = feels_others;
        self
    }

    pub fn with_ramp_up_time(mut self, ramp_up_time: f64) -> Self {
        self.ramp_up_time = ramp_up_time;
        self
    }

    /// Overrides the orbital elements, e.g. for bodies placed by hand.
    pub fn with_orbit(mut self, semi_major_axis: f64, omega: f64) -> Self {
        self.semi_major_axis = semi_major_axis;
        self.omega = omega;
        self
    }

    pub fn momentum(&self) -> Vector2<f64> {
        self.velocity * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.magnitude_squared()
    }

    pub fn distance_to(&self, other: &Body) -> f64 {
        (self.position - other.position).magnitude()
    }

    /// Distance from the frame origin
    pub fn orbital_radius(&self) -> f64 {
        self.position.coords.magnitude()
    }

    /// Angular momentum scalar (r × v, not multiplied by mass)
    pub fn specific_angular_momentum(&self) -> f64 {
        self.position.x * self.velocity.y - self.position.y * self.velocity.x
    }

    /// Hill radius around this body given the mass of the frame center.
    ///
    /// `R_H = (m / (3 (M_c + m)))^(1/3) · a`
    pub fn hill_radius(&self, center_mass: f64) -> f64 {
        hill_radius(self.mass, self.semi_major_axis, center_mass)
    }

    /// Mass seen by the gas at `time`, tapered in over `ramp_up_time`.
    ///
    /// ```
    /// use nbody::body::{Body, BodyId};
    ///
    /// let planet = Body::new(BodyId(1), 1.0e-3, [1.0, 0.0], [0.0, 1.0]).with_ramp_up_time(10.0);
    /// assert_eq!(planet.ramped_mass(0.0), 0.0);
    /// assert_eq!(planet.ramped_mass(10.0), 1.0e-3);
    /// ```
    pub fn ramped_mass(&self, time: f64) -> f64 {
        if self.ramp_up_time > 0.0 && time < self.ramp_up_time {
            let s = (0.5 * PI * time / self.ramp_up_time).sin();
            self.mass * s * s
        } else {
            self.mass
        }
    }

    /// Recomputes semi-major axis, eccentricity and mean motion of this body
    /// around a center of mass `center_mass` located at `center_position`
    /// moving with `center_velocity`.
    ///
    /// A body sitting on the center keeps zeroed elements.
    pub fn update_orbit(
        &mut self,
        center_mass: f64,
        center_position: Point2<f64>,
        center_velocity: Vector2<f64>,
    ) {
        let r = self.position - center_position;
        let v = self.velocity - center_velocity;
        let distance = r.magnitude();
        if distance <= 0.0 {
            self.semi_major_axis = 0.0;
            self.eccentricity = 0.0;
            self.omega = 0.0;
            return;
        }

        let mu = G * (center_mass + self.mass);
        let energy = 0.5 * v.magnitude_squared() - mu / distance;
        let h = r.x * v.y - r.y * v.x;

        // Runge-Lenz vector
        let e_x = v.y * h / mu - r.x / distance;
        let e_y = -v.x * h / mu - r.y / distance;
        self.eccentricity = (e_x * e_x + e_y * e_y).sqrt();

        if energy < 0.0 {
            self.semi_major_axis = -mu / (2.0 * energy);
            self.omega = (mu / self.semi_major_axis.powi(3)).sqrt();
        } else {
            // Unbound: keep the instantaneous distance as length scale
            self.semi_major_axis = distance;
            self.omega = (mu / distance.powi(3)).sqrt();
        }
    }
}
