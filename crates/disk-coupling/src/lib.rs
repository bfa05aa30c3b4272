//! Gravitational coupling between a polar gas disk and embedded point masses
//!
//! Each substep the bodies' potential is written onto the gas grid, the gas
//! pulls back on the bodies, gas inside the Hill spheres of accreting bodies
//! is handed over to them, and the bodies are propagated by an orbital
//! integrator. Everything is expressed in a frame centered on one or more
//! bodies, corrected by the indirect term.
//!
//! # Example
//!
//! ```
//! use disk_coupling::{CouplingConfig, GravityCoupling};
//! use polargrid::{GasFields, SingleProcess};
//!
//! let yaml = r#"
//! disk_feedback: false
//! grid:
//!   r_min: 0.5
//!   r_max: 2.0
//!   n_radial: 16
//!   n_azimuthal: 32
//! bodies:
//!   - mass: 1.0
//!     position: [0.0, 0.0]
//!     velocity: [0.0, 0.0]
//!   - mass: 1.0e-3
//!     position: [1.0, 0.0]
//!     velocity: [0.0, 1.0005]
//! "#;
//!
//! let config = CouplingConfig::from_yaml_str(yaml).unwrap();
//! let mut system = config.build_system().unwrap();
//! let grid = config.grid.build(0, 1).unwrap();
//! let mut gas = GasFields::uniform(&grid, 1.0e-4);
//!
//! let mut coupling = GravityCoupling::new(&config, &system, &grid, SingleProcess).unwrap();
//! coupling.prepare_substep(&mut system, &grid, &mut gas, 0.0).unwrap();
//! let report = coupling.finish_substep(&mut system, &grid, &mut gas, 0.0, 0.01).unwrap();
//! assert!(report.propagated);
//! ```

pub mod accretion;
pub mod advance;
pub mod config;
pub mod engine;
pub mod error;
pub mod force;
pub mod potential;
pub mod smoothing;
pub mod torque;

#[cfg(test)]
mod config_test;
#[cfg(test)]
mod smoothing_test;

pub use accretion::{AccretionParams, AccretionReport, BodyAccretion, accrete_onto_bodies};
pub use advance::{OrbitalAdvancer, apply_disk_kick};
pub use config::CouplingConfig;
pub use engine::{GravityCoupling, SubstepReport};
pub use error::{ConfigError, CouplingError, CouplingResult};
pub use force::{DiskForce, GasGravity, compute_disk_on_body_accel, point_mass_acceleration};
pub use potential::compute_potential;
pub use smoothing::{FlaredDisk, Softening, SmoothingPolicy, VerticalStructure};
pub use torque::disk_torques;
