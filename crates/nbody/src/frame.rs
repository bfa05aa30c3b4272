//! Reference-frame bookkeeping
//!
//! The hydro frame is centered on the barycenter of the first `n` bodies.
//! Because that point accelerates, every equation of motion written in the
//! frame needs the indirect term: the negative mass-weighted mean acceleration
//! of the frame-center bodies.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::error::{SystemError, SystemResult};

/// Which bodies define the frame origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameCenter {
    /// Centered on body 0
    Primary,
    /// Centered on the barycenter of the first `n` bodies (`n >= 2`)
    Barycentric(usize),
}

impl FrameCenter {
    /// Resolve a body count into a policy.
    ///
    /// ```
    /// use nbody::frame::FrameCenter;
    ///
    /// assert_eq!(FrameCenter::from_count(1).unwrap(), FrameCenter::Primary);
    /// assert_eq!(FrameCenter::from_count(2).unwrap(), FrameCenter::Barycentric(2));
    /// assert!(FrameCenter::from_count(0).is_err());
    /// ```
    pub fn from_count(n_bodies: usize) -> SystemResult<Self> {
        match n_bodies {
            0 => Err(SystemError::EmptyFrameCenter),
            1 => Ok(FrameCenter::Primary),
            n => Ok(FrameCenter::Barycentric(n)),
        }
    }

    /// Number of bodies that define the frame center
    pub fn n_bodies(&self) -> usize {
        match self {
            FrameCenter::Primary => 1,
            FrameCenter::Barycentric(n) => *n,
        }
    }

    /// Central mass entering the Hill radius of body `k`: the frame-center
    /// bodies other than `k` itself.
    ///
    /// ```
    /// use nbody::body::{Body, BodyId};
    /// use nbody::frame::FrameCenter;
    ///
    /// let bodies = [
    ///     Body::new(BodyId(0), 0.6, [-0.4, 0.0], [0.0, 0.0]),
    ///     Body::new(BodyId(1), 0.4, [0.6, 0.0], [0.0, 0.0]),
    ///     Body::new(BodyId(2), 1.0e-3, [3.0, 0.0], [0.0, 0.6]),
    /// ];
    /// let frame = FrameCenter::Barycentric(2);
    /// assert_eq!(frame.hill_center_mass(&bodies, 1), 0.6);
    /// assert_eq!(frame.hill_center_mass(&bodies, 2), 1.0);
    /// ```
    pub fn hill_center_mass(&self, bodies: &[Body], k: usize) -> f64 {
        bodies
            .iter()
            .take(self.n_bodies())
            .enumerate()
            .filter(|&(idx, _)| idx != k)
            .map(|(_, b)| b.mass)
            .sum()
    }
}

/// Frame correction acceleration and its decomposition
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IndirectTerm {
    /// Contribution of the disk's pull on the frame-center bodies
    pub disk: Vector2<f64>,
    /// Contribution of the mutual pull between bodies
    pub nbody: Vector2<f64>,
    pub total: Vector2<f64>,
}

impl IndirectTerm {
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Compute the indirect term from the bodies' cached accelerations.
///
/// `disk = -Σ m_i a_disk,i / Σ m_i` (zero unless `disk_feedback`),
/// `nbody = -Σ m_i a_nbody,i / Σ m_i`, summed over the frame-center bodies.
/// The frame-center mass is validated when the system is built, so it is not
/// checked here.
pub fn compute_indirect_term(
    bodies: &[Body],
    frame: FrameCenter,
    disk_feedback: bool,
) -> IndirectTerm {
    let center = &bodies[..frame.n_bodies().min(bodies.len())];
    let mass_center: f64 = center.iter().map(|b| b.mass).sum();

    let weighted = |accel: fn(&Body) -> Vector2<f64>| {
        -center
            .iter()
            .map(|b| accel(b) * b.mass)
            .fold(Vector2::zeros(), |acc, a| acc + a)
            / mass_center
    };

    let disk = if disk_feedback {
        weighted(|b| b.disk_acceleration)
    } else {
        Vector2::zeros()
    };
    let nbody = weighted(|b| b.nbody_acceleration);

    IndirectTerm {
        disk,
        nbody,
        total: disk + nbody,
    }
}

/// Reference point for disk eccentricity / periastron diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceCenter {
    /// The hydro frame center
    FrameCenter,
    /// Barycenter of all bodies
    NbodyBarycenter,
}

impl ReferenceCenter {
    /// Pick the diagnostic center once at setup.
    ///
    /// With several frame-center bodies, or a lone body, the frame center is
    /// used. For a primary-centered frame with companions the barycenter is
    /// used, unless the companion orbits well inside the domain
    /// (`a_1 < 0.1 r_max`), in which case its effect is local and the primary
    /// remains the better reference.
    pub fn resolve(frame: FrameCenter, bodies: &[Body], r_max: f64) -> Self {
        match (frame, bodies.get(1)) {
            (FrameCenter::Barycentric(_), _) | (FrameCenter::Primary, None) => {
                ReferenceCenter::FrameCenter
            }
            (FrameCenter::Primary, Some(companion)) => {
                if companion.semi_major_axis < 0.1 * r_max {
                    ReferenceCenter::FrameCenter
                } else {
                    ReferenceCenter::NbodyBarycenter
                }
            }
        }
    }
}
