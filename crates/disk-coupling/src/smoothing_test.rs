use approx::assert_relative_eq;
use nbody::{Body, BodyId, FrameCenter};
use polargrid::{PolarGrid, RadialSpacing};

use crate::smoothing::{FlaredDisk, Softening, SmoothingPolicy, VerticalStructure};

fn star_and_planet() -> [Body; 2] {
    [
        Body::new(BodyId(0), 1.0, [0.0, 0.0], [0.0, 0.0]),
        Body::new(BodyId(1), 1.0e-3, [1.5, 0.0], [0.0, 0.8]).with_orbit(1.5, 1.5_f64.powf(-1.5)),
    ]
}

fn grid() -> PolarGrid {
    PolarGrid::new(0.5, 2.0, 8, 16, RadialSpacing::Arithmetic).unwrap()
}

/// Scale height that varies with azimuth, as in a non-isothermal disk
struct Lumpy;

impl VerticalStructure for Lumpy {
    fn scale_height(&self, r: f64) -> f64 {
        0.05 * r
    }

    fn scale_height_at_cell(&self, grid: &PolarGrid, i: usize, j: usize) -> f64 {
        0.05 * grid.r_med(i) * (1.0 + 0.1 * j as f64)
    }

    fn depends_only_on_radius(&self) -> bool {
        false
    }
}

#[test]
fn test_flared_disk_scale_height() {
    let disk = FlaredDisk {
        aspect_ratio: 0.05,
        flaring_index: 0.25,
    };
    assert_relative_eq!(disk.scale_height(1.0), 0.05);
    assert_relative_eq!(disk.scale_height(16.0), 0.05 * 32.0, max_relative = 1e-14);
}

#[test]
fn test_roche_softening_scales_with_hill_radius() {
    let bodies = star_and_planet();
    let disk = FlaredDisk::default();
    let softening = Softening::prepare(SmoothingPolicy::Roche { factor: 0.5 }, &bodies, FrameCenter::Primary, &disk);

    let r_hill = bodies[1].hill_radius(1.0);
    assert!(r_hill > 0.0);
    assert_relative_eq!(softening.body(1), (0.5 * r_hill).powi(2), max_relative = 1e-14);

    // The star sits on the frame center with no orbit
    assert_eq!(softening.body(0), 0.0);
}

#[test]
fn test_roche_softening_in_binary_frame_excludes_own_mass() {
    let bodies = [
        Body::new(BodyId(0), 0.7, [-0.3, 0.0], [0.0, -0.3]),
        Body::new(BodyId(1), 0.3, [0.7, 0.0], [0.0, 0.7]).with_orbit(1.0, 1.0),
        Body::new(BodyId(2), 1.0e-3, [3.0, 0.0], [0.0, 0.58]).with_orbit(3.0, 0.19),
    ];
    let disk = FlaredDisk::default();
    let policy = SmoothingPolicy::Roche { factor: 0.5 };
    let softening = Softening::prepare(policy, &bodies, FrameCenter::Barycentric(2), &disk);

    // The secondary's Hill sphere is set by the primary alone
    assert_relative_eq!(softening.body(1), (0.5 * bodies[1].hill_radius(0.7)).powi(2), max_relative = 1e-14);
    assert_relative_eq!(softening.body(2), (0.5 * bodies[2].hill_radius(1.0)).powi(2), max_relative = 1e-14);
}

#[test]
fn test_thickness_softening_at_body() {
    let bodies = star_and_planet();
    let disk = FlaredDisk::default();
    let policy = SmoothingPolicy::Thickness {
        factor: 0.6,
        at_cell: false,
    };
    let softening = Softening::prepare(policy, &bodies, FrameCenter::Primary, &disk);

    assert_relative_eq!(softening.body(1), (0.6 * 0.05 * 1.5_f64).powi(2), max_relative = 1e-14);
    assert!(softening.ring(&grid(), 3).is_none());
    assert!(softening.cell(&grid(), 3, 2, None).is_none());

    // Independent of where it is seen from
    assert_eq!(softening.at_radius(1, 0.7), softening.body(1));
}

#[test]
fn test_thickness_softening_per_ring() {
    let bodies = star_and_planet();
    let disk = FlaredDisk::default();
    let grid = grid();
    let policy = SmoothingPolicy::Thickness {
        factor: 0.6,
        at_cell: true,
    };
    let softening = Softening::prepare(policy, &bodies, FrameCenter::Primary, &disk);

    for i in 0..grid.n_radial() {
        let ring = softening.ring(&grid, i);
        let expected = (0.6 * disk.scale_height(grid.r_med(i))).powi(2);
        assert_relative_eq!(ring.unwrap(), expected, max_relative = 1e-14);
        for j in 0..grid.n_azimuthal() {
            assert_eq!(softening.cell(&grid, i, j, ring), ring);
        }
    }

    assert_relative_eq!(
        softening.at_radius(1, 0.9),
        (0.6 * 0.05 * 0.9_f64).powi(2),
        max_relative = 1e-14
    );
}

#[test]
fn test_thickness_softening_per_cell() {
    let bodies = star_and_planet();
    let grid = grid();
    let policy = SmoothingPolicy::Thickness {
        factor: 0.6,
        at_cell: true,
    };
    let softening = Softening::prepare(policy, &bodies, FrameCenter::Primary, &Lumpy);

    assert!(softening.ring(&grid, 2).is_none());

    let first = softening.cell(&grid, 2, 0, None).unwrap();
    let later = softening.cell(&grid, 2, 5, None).unwrap();
    assert_relative_eq!(first, (0.6 * 0.05 * grid.r_med(2)).powi(2), max_relative = 1e-14);
    assert_relative_eq!(later, first * 1.5 * 1.5, max_relative = 1e-14);
}

#[test]
fn test_policy_factor() {
    assert_eq!(SmoothingPolicy::Roche { factor: 0.4 }.factor(), 0.4);
    let thickness = SmoothingPolicy::Thickness {
        factor: 0.7,
        at_cell: true,
    };
    assert_eq!(thickness.factor(), 0.7);
}
