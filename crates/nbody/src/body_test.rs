use approx::assert_relative_eq;
use nalgebra::{Point2, Vector2};

use crate::body::{Body, BodyId};
use crate::forces::G;

fn planet(mass: f64, position: [f64; 2], velocity: [f64; 2]) -> Body {
    Body::new(BodyId(1), mass, position, velocity)
}

#[test]
fn test_new_defaults() {
    let body = planet(1.0e-3, [1.0, 0.0], [0.0, 1.0]);

    assert_eq!(body.position, Point2::new(1.0, 0.0));
    assert_eq!(body.velocity, Vector2::new(0.0, 1.0));
    assert!(body.feels_disk);
    assert!(body.feels_others);
    assert_eq!(body.disk_acceleration, Vector2::zeros());
    assert_eq!(body.nbody_acceleration, Vector2::zeros());
}

#[test]
fn test_momentum() {
    let body = planet(2.0, [1.0, 0.0], [3.0, 4.0]);
    assert_eq!(body.momentum(), Vector2::new(6.0, 8.0));
}

#[test]
fn test_kinetic_energy() {
    // KE = 0.5 * 2 * (3² + 4²) = 25
    let body = planet(2.0, [0.0, 0.0], [3.0, 4.0]);
    assert_eq!(body.kinetic_energy(), 25.0);
}

#[test]
fn test_distance_to() {
    let a = planet(1.0, [0.0, 0.0], [0.0, 0.0]);
    let b = planet(1.0, [3.0, 4.0], [0.0, 0.0]);
    assert_eq!(a.distance_to(&b), 5.0);
}

#[test]
fn test_specific_angular_momentum() {
    // L = r × v = 1 * 2 - 0 * 0 = 2
    let body = planet(1.0, [1.0, 0.0], [0.0, 2.0]);
    assert_eq!(body.specific_angular_momentum(), 2.0);
}

#[test]
fn test_hill_radius_uses_center_mass() {
    let body = planet(1.0e-3, [1.0, 0.0], [0.0, 1.0]).with_orbit(2.0, 0.0);
    let expected = 2.0 * (1.0e-3 / (3.0 * 1.001_f64)).cbrt();
    assert_relative_eq!(body.hill_radius(1.0), expected, max_relative = 1e-14);
}

#[test]
fn test_ramped_mass_tapers_in() {
    let body = planet(1.0e-3, [1.0, 0.0], [0.0, 1.0]).with_ramp_up_time(4.0);

    assert_eq!(body.ramped_mass(0.0), 0.0);
    assert_relative_eq!(body.ramped_mass(2.0), 0.5e-3, max_relative = 1e-12);
    assert_eq!(body.ramped_mass(4.0), 1.0e-3);
    assert_eq!(body.ramped_mass(100.0), 1.0e-3);
}

#[test]
fn test_ramped_mass_without_ramp() {
    let body = planet(1.0e-3, [1.0, 0.0], [0.0, 1.0]);
    assert_eq!(body.ramped_mass(0.0), 1.0e-3);
}

#[test]
fn test_update_orbit_circular() {
    let mu = G * (1.0 + 1.0e-3);
    let v = (mu / 2.0_f64).sqrt();
    let mut body = planet(1.0e-3, [2.0, 0.0], [0.0, v]);

    body.update_orbit(1.0, Point2::origin(), Vector2::zeros());

    assert_relative_eq!(body.semi_major_axis, 2.0, max_relative = 1e-12);
    assert!(body.eccentricity < 1e-12);
    assert_relative_eq!(body.omega, (mu / 8.0).sqrt(), max_relative = 1e-12);
}

#[test]
fn test_update_orbit_eccentric() {
    // Periapsis of an e = 0.5 orbit with a = 1: r_p = 0.5, v_p = sqrt(mu (1+e)/r_p)
    let mu = G * 1.0;
    let v_p = (mu * 1.5 / 0.5_f64).sqrt();
    let mut body = planet(0.0, [0.5, 0.0], [0.0, v_p]);

    body.update_orbit(1.0, Point2::origin(), Vector2::zeros());

    assert_relative_eq!(body.semi_major_axis, 1.0, max_relative = 1e-12);
    assert_relative_eq!(body.eccentricity, 0.5, max_relative = 1e-12);
}

#[test]
fn test_update_orbit_at_center_is_zero() {
    let mut body = planet(1.0, [0.0, 0.0], [0.0, 0.0]).with_orbit(3.0, 1.0);
    body.update_orbit(1.0, Point2::origin(), Vector2::zeros());

    assert_eq!(body.semi_major_axis, 0.0);
    assert_eq!(body.omega, 0.0);
}
