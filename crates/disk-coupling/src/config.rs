//! Coupling configuration, loadable from YAML
//!
//! Every field has a default, so a scenario only needs to list what it
//! changes:
//!
//! ```yaml
//! disk_feedback: true
//! frame_center_bodies: 1
//! integrate_bodies: true
//! smoothing:
//!   policy: thickness
//!   thickness_factor: 0.6
//!   at_cell: true
//! vertical:
//!   aspect_ratio: 0.05
//!   flaring_index: 0.0
//! integrator:
//!   method: cash-karp
//!   tolerance: 1.0e-12
//! bodies:
//!   - mass: 1.0
//!     position: [0.0, 0.0]
//!     velocity: [0.0, 0.0]
//!   - mass: 1.0e-3
//!     position: [1.0, 0.0]
//!     velocity: [0.0, 1.0005]
//!     accretion_efficiency: 1.0
//! ```

use nbody::body::{Body, BodyId};
use nbody::frame::FrameCenter;
use nbody::integrator::{CashKarp, Leapfrog, OrbitalIntegrator};
use nbody::system::PlanetarySystem;
use polargrid::{GridResult, PolarGrid, RadialSpacing};
use serde::{Deserialize, Serialize};

use crate::accretion::AccretionParams;
use crate::error::{ConfigError, CouplingResult};
use crate::smoothing::{FlaredDisk, SmoothingPolicy};

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingKind {
    #[default]
    Roche,
    Thickness,
}

/// Softening policy selector and its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub policy: SmoothingKind,
    /// Fraction of the Hill radius (Roche policy)
    pub roche_factor: f64,
    /// Fraction of the scale height (thickness policy and torques)
    pub thickness_factor: f64,
    /// Evaluate the scale height at the gas cell instead of at the body
    pub at_cell: bool,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            policy: SmoothingKind::Roche,
            roche_factor: 0.5,
            thickness_factor: 0.6,
            at_cell: false,
        }
    }
}

impl SmoothingConfig {
    pub fn policy(&self) -> SmoothingPolicy {
        match self.policy {
            SmoothingKind::Roche => SmoothingPolicy::Roche {
                factor: self.roche_factor,
            },
            SmoothingKind::Thickness => SmoothingPolicy::Thickness {
                factor: self.thickness_factor,
                at_cell: self.at_cell,
            },
        }
    }
}

/// Kley accretion parameters shared by all bodies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccretionConfig {
    /// Efficiencies at or below this value disable accretion
    pub threshold: f64,
    /// Outer zone radius in Hill radii
    pub outer_fraction: f64,
    /// Inner zone radius in Hill radii
    pub inner_fraction: f64,
}

impl Default for AccretionConfig {
    fn default() -> Self {
        Self {
            threshold: 1e-10,
            outer_fraction: 0.75,
            inner_fraction: 0.45,
        }
    }
}

impl AccretionConfig {
    pub fn params(&self) -> AccretionParams {
        AccretionParams {
            threshold: self.threshold,
            outer_fraction: self.outer_fraction,
            inner_fraction: self.inner_fraction,
        }
    }
}

/// Orbital integrator used for full propagation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum IntegratorConfig {
    Leapfrog {
        max_dt: f64,
    },
    CashKarp {
        tolerance: f64,
        #[serde(default = "default_max_steps")]
        max_steps: usize,
    },
}

fn positive_finite(value: f64) -> bool {
    value > 0.0 && value.is_finite()
}

fn default_max_steps() -> usize {
    1_000_000
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        IntegratorConfig::CashKarp {
            tolerance: 1e-12,
            max_steps: default_max_steps(),
        }
    }
}

impl IntegratorConfig {
    pub fn name(&self) -> &'static str {
        match self {
            IntegratorConfig::Leapfrog { .. } => "leapfrog",
            IntegratorConfig::CashKarp { .. } => "cash-karp",
        }
    }

    pub fn build(&self) -> Box<dyn OrbitalIntegrator> {
        match *self {
            IntegratorConfig::Leapfrog { max_dt } => Box::new(Leapfrog::new(max_dt)),
            IntegratorConfig::CashKarp {
                tolerance,
                max_steps,
            } => Box::new(CashKarp::new(tolerance).with_max_steps(max_steps)),
        }
    }
}

/// Initial state of one body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    pub mass: f64,
    pub position: [f64; 2],
    pub velocity: [f64; 2],
    #[serde(default)]
    pub accretion_efficiency: f64,
    #[serde(default)]
    pub ramp_up_time: f64,
    #[serde(default = "default_true")]
    pub feels_disk: bool,
    #[serde(default = "default_true")]
    pub feels_others: bool,
}

fn default_true() -> bool {
    true
}

/// Polar grid layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub r_min: f64,
    pub r_max: f64,
    pub n_radial: usize,
    pub n_azimuthal: usize,
    pub spacing: RadialSpacing,
    /// Ghost rings borrowed from each neighbouring rank
    pub overlap: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            r_min: 0.4,
            r_max: 2.5,
            n_radial: 128,
            n_azimuthal: 384,
            spacing: RadialSpacing::Arithmetic,
            overlap: 2,
        }
    }
}

impl GridConfig {
    /// Local grid of `rank` among `n_ranks`
    pub fn build(&self, rank: usize, n_ranks: usize) -> GridResult<PolarGrid> {
        let full = PolarGrid::new(
            self.r_min,
            self.r_max,
            self.n_radial,
            self.n_azimuthal,
            self.spacing,
        )?;
        if n_ranks == 1 {
            return Ok(full);
        }
        full.decompose(rank, n_ranks, self.overlap)
    }
}

// =============================================================================
// Top level
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CouplingConfig {
    /// Let the disk act back on the bodies (and on the frame)
    pub disk_feedback: bool,
    /// Number of leading bodies whose barycenter is the frame origin
    pub frame_center_bodies: usize,
    /// Propagate the bodies with the orbital integrator
    pub integrate_bodies: bool,
    /// Rotation rate of the frame
    pub omega_frame: f64,
    pub smoothing: SmoothingConfig,
    pub vertical: FlaredDisk,
    pub accretion: AccretionConfig,
    pub integrator: IntegratorConfig,
    pub grid: GridConfig,
    pub bodies: Vec<BodyConfig>,
}

impl Default for CouplingConfig {
    fn default() -> Self {
        Self {
            disk_feedback: true,
            frame_center_bodies: 1,
            integrate_bodies: true,
            omega_frame: 0.0,
            smoothing: SmoothingConfig::default(),
            vertical: FlaredDisk::default(),
            accretion: AccretionConfig::default(),
            integrator: IntegratorConfig::default(),
            grid: GridConfig::default(),
            bodies: Vec::new(),
        }
    }
}

impl CouplingConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: CouplingConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter that would otherwise fail mid-run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &'static str, value: f64| {
            if positive_finite(value) {
                Ok(())
            } else {
                Err(ConfigError::InvalidSmoothing { name, value })
            }
        };
        match self.smoothing.policy {
            SmoothingKind::Roche => positive("roche_factor", self.smoothing.roche_factor)?,
            SmoothingKind::Thickness => {
                positive("thickness_factor", self.smoothing.thickness_factor)?
            }
        }
        if !positive_finite(self.vertical.aspect_ratio) {
            return Err(ConfigError::InvalidAspectRatio(self.vertical.aspect_ratio));
        }

        let acc = &self.accretion;
        if acc.threshold.is_nan() || acc.threshold < 0.0 {
            return Err(ConfigError::InvalidAccretionThreshold(acc.threshold));
        }
        if !(positive_finite(acc.inner_fraction) && acc.inner_fraction < acc.outer_fraction) {
            return Err(ConfigError::InvalidAccretionZones {
                outer: acc.outer_fraction,
                inner: acc.inner_fraction,
            });
        }

        match self.integrator {
            IntegratorConfig::Leapfrog { max_dt } if !positive_finite(max_dt) => {
                return Err(ConfigError::InvalidIntegrator {
                    method: "leapfrog",
                    reason: "max_dt must be positive",
                });
            }
            IntegratorConfig::CashKarp { tolerance, .. } if !positive_finite(tolerance) => {
                return Err(ConfigError::InvalidIntegrator {
                    method: "cash-karp",
                    reason: "tolerance must be positive",
                });
            }
            IntegratorConfig::CashKarp { max_steps: 0, .. } => {
                return Err(ConfigError::InvalidIntegrator {
                    method: "cash-karp",
                    reason: "max_steps must be at least 1",
                });
            }
            _ => {}
        }

        if self.bodies.is_empty() {
            return Err(ConfigError::NoBodies);
        }
        for (index, body) in self.bodies.iter().enumerate() {
            if !(body.mass >= 0.0 && body.mass.is_finite()) {
                return Err(ConfigError::InvalidBody {
                    index,
                    reason: "mass must be finite and non-negative",
                });
            }
            if body.accretion_efficiency < 0.0 || body.ramp_up_time < 0.0 {
                return Err(ConfigError::InvalidBody {
                    index,
                    reason: "accretion efficiency and ramp-up time must be non-negative",
                });
            }
        }
        Ok(())
    }

    /// Build the planetary system, expressed relative to its frame center
    /// with fresh orbital elements and N-body accelerations.
    pub fn build_system(&self) -> CouplingResult<PlanetarySystem> {
        let bodies = self
            .bodies
            .iter()
            .enumerate()
            .map(|(index, cfg)| {
                Body::new(BodyId(index as u32), cfg.mass, cfg.position, cfg.velocity)
                    .with_accretion(cfg.accretion_efficiency)
                    .with_ramp_up_time(cfg.ramp_up_time)
                    .with_feels_disk(cfg.feels_disk)
                    .with_feels_others(cfg.feels_others)
            })
            .collect();

        let frame = FrameCenter::from_count(self.frame_center_bodies)?;
        let mut system = PlanetarySystem::new(frame, bodies)?;
        system.move_to_frame_center();
        system.update_orbital_elements();
        system.compute_nbody_accelerations();
        Ok(system)
    }
}
