//! Softening lengths for body-gas interactions
//!
//! Two policies are supported. Roche smoothing uses a fixed fraction of each
//! body's Hill radius. Thickness smoothing uses a fraction of the disk scale
//! height, either at the body or at the gas cell; in the latter case the value
//! is computed once per ring when the vertical structure depends on radius
//! alone, and cell by cell otherwise.

use nbody::{Body, FrameCenter};
use polargrid::PolarGrid;
use serde::{Deserialize, Serialize};

/// Scale height provider for thickness smoothing
pub trait VerticalStructure: Sync {
    /// Scale height at cylindrical radius `r`
    fn scale_height(&self, r: f64) -> f64;

    /// Scale height at cell `(i, j)`
    fn scale_height_at_cell(&self, grid: &PolarGrid, i: usize, _j: usize) -> f64 {
        self.scale_height(grid.r_med(i))
    }

    /// True for locally isothermal disks, where one value per ring suffices
    fn depends_only_on_radius(&self) -> bool {
        true
    }
}

/// Power-law disk with `H = h · r^(1 + f)`
///
/// ```
/// use disk_coupling::smoothing::{FlaredDisk, VerticalStructure};
///
/// let disk = FlaredDisk { aspect_ratio: 0.05, flaring_index: 0.0 };
/// assert!((disk.scale_height(2.0) - 0.1).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlaredDisk {
    pub aspect_ratio: f64,
    pub flaring_index: f64,
}

impl Default for FlaredDisk {
    fn default() -> Self {
        Self {
            aspect_ratio: 0.05,
            flaring_index: 0.0,
        }
    }
}

impl VerticalStructure for FlaredDisk {
    fn scale_height(&self, r: f64) -> f64 {
        self.aspect_ratio * r.powf(1.0 + self.flaring_index)
    }
}

/// Softening policy, fixed at setup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmoothingPolicy {
    /// `ε = factor · R_Hill` of each body
    Roche { factor: f64 },
    /// `ε = factor · H`, with `H` at the body or at the gas cell
    Thickness { factor: f64, at_cell: bool },
}

impl SmoothingPolicy {
    pub fn factor(&self) -> f64 {
        match *self {
            SmoothingPolicy::Roche { factor } | SmoothingPolicy::Thickness { factor, .. } => factor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Evaluation {
    PerBody,
    PerRing,
    PerCell,
}

/// Squared softening lengths resolved for the current body state
///
/// Rebuilt on every evaluation, since masses, semi-major axes and positions
/// change from one substep to the next.
pub struct Softening<'a, V: VerticalStructure + ?Sized> {
    factor: f64,
    evaluation: Evaluation,
    per_body: Vec<f64>,
    vertical: &'a V,
}

impl<'a, V: VerticalStructure + ?Sized> Softening<'a, V> {
    /// Resolve `policy` for `bodies`.
    ///
    /// # Arguments
    /// * `policy` - Softening policy from the configuration
    /// * `bodies` - Current body list
    /// * `frame` - Frame-center policy; the other frame-center bodies form the
    ///   central mass of each Hill radius
    /// * `vertical` - Disk vertical structure for thickness smoothing
    pub fn prepare(
        policy: SmoothingPolicy,
        bodies: &[Body],
        frame: FrameCenter,
        vertical: &'a V,
    ) -> Self {
        let factor = policy.factor();
        let per_body = bodies
            .iter()
            .enumerate()
            .map(|(k, body)| {
                let length = match policy {
                    SmoothingPolicy::Roche { .. } => {
                        factor * body.hill_radius(frame.hill_center_mass(bodies, k))
                    }
                    SmoothingPolicy::Thickness { .. } => {
                        factor * vertical.scale_height(body.orbital_radius())
                    }
                };
                length * length
            })
            .collect();

        let evaluation = match policy {
            SmoothingPolicy::Thickness { at_cell: true, .. } => {
                if vertical.depends_only_on_radius() {
                    Evaluation::PerRing
                } else {
                    Evaluation::PerCell
                }
            }
            _ => Evaluation::PerBody,
        };

        Self {
            factor,
            evaluation,
            per_body,
            vertical,
        }
    }

    /// Squared softening of body `k` when it does not depend on the cell
    pub fn body(&self, k: usize) -> f64 {
        self.per_body[k]
    }

    /// Softening shared by a whole ring, if the policy computes it per ring
    pub fn ring(&self, grid: &PolarGrid, i: usize) -> Option<f64> {
        match self.evaluation {
            Evaluation::PerRing => Some(self.squared(self.vertical.scale_height(grid.r_med(i)))),
            _ => None,
        }
    }

    /// Softening shared by every body at cell `(i, j)`; `None` means per body.
    ///
    /// `ring` is the value returned by [`Softening::ring`] for ring `i`.
    pub fn cell(&self, grid: &PolarGrid, i: usize, j: usize, ring: Option<f64>) -> Option<f64> {
        match self.evaluation {
            Evaluation::PerBody => None,
            Evaluation::PerRing => ring,
            Evaluation::PerCell => {
                Some(self.squared(self.vertical.scale_height_at_cell(grid, i, j)))
            }
        }
    }

    /// Squared softening of body `k` seen from a point at radius `r`
    pub fn at_radius(&self, k: usize, r: f64) -> f64 {
        match self.evaluation {
            Evaluation::PerBody => self.per_body[k],
            _ => self.squared(self.vertical.scale_height(r)),
        }
    }

    fn squared(&self, scale_height: f64) -> f64 {
        let length = self.factor * scale_height;
        length * length
    }
}
