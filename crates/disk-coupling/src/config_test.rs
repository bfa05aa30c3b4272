use approx::assert_relative_eq;
use nbody::{FrameCenter, SystemError};
use polargrid::RadialSpacing;

use crate::config::{BodyConfig, CouplingConfig, GridConfig, IntegratorConfig, SmoothingKind};
use crate::error::{ConfigError, CouplingError};
use crate::smoothing::SmoothingPolicy;

const SCENARIO: &str = r#"
disk_feedback: true
frame_center_bodies: 1
smoothing:
  policy: thickness
  thickness_factor: 0.6
  at_cell: true
vertical:
  aspect_ratio: 0.05
  flaring_index: 0.25
integrator:
  method: cash-karp
  tolerance: 1.0e-10
grid:
  r_min: 0.5
  r_max: 3.0
  n_radial: 64
  n_azimuthal: 128
  spacing: logarithmic
bodies:
  - mass: 1.0
    position: [0.0, 0.0]
    velocity: [0.0, 0.0]
  - mass: 1.0e-3
    position: [1.0, 0.0]
    velocity: [0.0, 1.0005]
    accretion_efficiency: 1.0
    feels_others: false
"#;

fn body(mass: f64, x: f64, vy: f64) -> BodyConfig {
    BodyConfig {
        mass,
        position: [x, 0.0],
        velocity: [0.0, vy],
        accretion_efficiency: 0.0,
        ramp_up_time: 0.0,
        feels_disk: true,
        feels_others: true,
    }
}

fn valid() -> CouplingConfig {
    CouplingConfig {
        bodies: vec![body(1.0, 0.0, 0.0), body(1.0e-3, 1.0, 1.0005)],
        ..CouplingConfig::default()
    }
}

#[test]
fn test_defaults() {
    let config = CouplingConfig::default();

    assert!(config.disk_feedback);
    assert_eq!(config.frame_center_bodies, 1);
    assert_eq!(config.smoothing.policy(), SmoothingPolicy::Roche { factor: 0.5 });
    assert_eq!(config.accretion.params().outer_fraction, 0.75);
    assert_eq!(config.accretion.params().inner_fraction, 0.45);
    assert_eq!(config.integrator.name(), "cash-karp");
    assert_eq!(config.grid.spacing, RadialSpacing::Arithmetic);
}

#[test]
fn test_parse_scenario() {
    let config = CouplingConfig::from_yaml_str(SCENARIO).unwrap();

    assert_eq!(config.smoothing.policy, SmoothingKind::Thickness);
    assert_eq!(
        config.smoothing.policy(),
        SmoothingPolicy::Thickness {
            factor: 0.6,
            at_cell: true
        }
    );
    assert_eq!(config.vertical.flaring_index, 0.25);
    assert_eq!(
        config.integrator,
        IntegratorConfig::CashKarp {
            tolerance: 1.0e-10,
            max_steps: 1_000_000
        }
    );
    assert_eq!(config.grid.spacing, RadialSpacing::Logarithmic);
    assert_eq!(config.grid.overlap, 2);

    assert_eq!(config.bodies.len(), 2);
    assert_eq!(config.bodies[1].accretion_efficiency, 1.0);
    assert!(config.bodies[1].feels_disk);
    assert!(!config.bodies[1].feels_others);
}

#[test]
fn test_parse_leapfrog() {
    let yaml = r#"
integrator:
  method: leapfrog
  max_dt: 0.001
bodies:
  - mass: 1.0
    position: [0.0, 0.0]
    velocity: [0.0, 0.0]
"#;
    let config = CouplingConfig::from_yaml_str(yaml).unwrap();

    assert_eq!(config.integrator, IntegratorConfig::Leapfrog { max_dt: 0.001 });
    assert_eq!(config.integrator.build().name(), "leapfrog");
}

#[test]
fn test_unknown_integrator_is_a_parse_error() {
    let yaml = r#"
integrator:
  method: euler
bodies: []
"#;
    let result = CouplingConfig::from_yaml_str(yaml);

    assert!(matches!(result, Err(ConfigError::Yaml(_))));
}

#[test]
fn test_validation_errors() {
    assert!(matches!(CouplingConfig::default().validate(), Err(ConfigError::NoBodies)));

    let mut config = valid();
    config.smoothing.roche_factor = 0.0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidSmoothing {
            name: "roche_factor",
            ..
        })
    ));

    let mut config = valid();
    config.vertical.aspect_ratio = -0.05;
    assert!(matches!(config.validate(), Err(ConfigError::InvalidAspectRatio(_))));

    let mut config = valid();
    config.accretion.inner_fraction = 0.8;
    assert!(matches!(config.validate(), Err(ConfigError::InvalidAccretionZones { .. })));

    let mut config = valid();
    config.accretion.threshold = f64::NAN;
    assert!(matches!(config.validate(), Err(ConfigError::InvalidAccretionThreshold(_))));

    let mut config = valid();
    config.integrator = IntegratorConfig::Leapfrog { max_dt: 0.0 };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidIntegrator {
            method: "leapfrog",
            ..
        })
    ));

    let mut config = valid();
    config.integrator = IntegratorConfig::CashKarp {
        tolerance: 1e-10,
        max_steps: 0,
    };
    assert!(matches!(config.validate(), Err(ConfigError::InvalidIntegrator { .. })));

    let mut config = valid();
    config.bodies[1].mass = -1.0;
    assert!(matches!(config.validate(), Err(ConfigError::InvalidBody { index: 1, .. })));

    assert!(valid().validate().is_ok());
}

#[test]
fn test_thickness_factor_ignored_under_roche() {
    let mut config = valid();
    config.smoothing.thickness_factor = 0.0;

    assert!(config.validate().is_ok());
}

#[test]
fn test_build_system_in_barycentric_frame() {
    let mut config = valid();
    config.bodies = vec![body(1.0, -0.5, -0.5), body(1.0, 0.5, 0.5), body(1.0e-3, 3.0, 0.9)];
    config.frame_center_bodies = 2;

    let system = config.build_system().unwrap();

    assert_eq!(system.frame(), FrameCenter::Barycentric(2));
    assert_eq!(system.frame_center_mass(), 2.0);
    let center = system.frame_center_position();
    assert_relative_eq!(center.x, 0.0, epsilon = 1e-15);
    assert!(system.body(2).semi_major_axis > 0.0);
    assert!(system.body(2).nbody_acceleration.x < 0.0);
}

#[test]
fn test_build_system_moves_star_to_origin() {
    let mut config = valid();
    config.bodies[0].position = [0.2, -0.1];
    config.bodies[1].position = [1.2, -0.1];

    let system = config.build_system().unwrap();

    assert_eq!(system.body(0).position.coords.magnitude(), 0.0);
    assert_relative_eq!(system.body(1).position.x, 1.0, max_relative = 1e-15);
    assert_relative_eq!(system.body(1).semi_major_axis, 1.0, max_relative = 1e-3);
}

#[test]
fn test_build_system_rejects_oversized_frame_center() {
    let mut config = valid();
    config.frame_center_bodies = 3;

    let result = config.build_system();

    assert!(matches!(
        result,
        Err(CouplingError::System(SystemError::FrameCenterTooLarge {
            requested: 3,
            available: 2
        }))
    ));
}

#[test]
fn test_grid_config_builds_local_grid() {
    let grid_config = GridConfig {
        n_radial: 30,
        ..GridConfig::default()
    };

    let full = grid_config.build(0, 1).unwrap();
    assert_eq!(full.n_radial(), 30);
    assert_eq!(full.active_range(), 0..30);

    let middle = grid_config.build(1, 3).unwrap();
    assert_eq!(middle.radial_offset(), 8);
    assert_eq!(middle.n_radial(), 14);
    assert_eq!(middle.active_range(), 2..12);
    assert_eq!(middle.inner_radius(), grid_config.r_min);
}
