use std::f64::consts::PI;

use approx::assert_relative_eq;

use crate::comm::SingleProcess;
use crate::error::GridError;
use crate::field::PolarField;
use crate::gas::GasFields;
use crate::geometry::{PolarGrid, RadialSpacing};

fn grid() -> PolarGrid {
    PolarGrid::new(1.0, 2.0, 10, 16, RadialSpacing::Arithmetic).unwrap()
}

#[test]
fn test_field_indexing_is_row_major() {
    let mut field = PolarField::new(3, 4);
    field[(1, 2)] = 5.0;

    assert_eq!(field.as_slice()[6], 5.0);
    assert_eq!(field.row(1), &[0.0, 0.0, 5.0, 0.0]);

    field.row_mut(2).fill(1.0);
    assert_eq!(field[(2, 3)], 1.0);
}

#[test]
fn test_radial_velocity_lives_on_faces() {
    let g = grid();
    let gas = GasFields::new(&g);

    assert_eq!(gas.density.shape(), (10, 16));
    assert_eq!(gas.v_radial.shape(), (11, 16));
    assert!(gas.check_shape(&g).is_ok());
}

#[test]
fn test_shape_mismatch_is_reported() {
    let g = grid();
    let mut gas = GasFields::new(&g);
    gas.potential = PolarField::new(9, 16);

    assert_eq!(
        gas.check_shape(&g).unwrap_err(),
        GridError::ShapeMismatch {
            name: "potential",
            expected: (10, 16),
            found: (9, 16)
        }
    );
}

#[test]
fn test_uniform_disk_mass() {
    let g = grid();
    let gas = GasFields::uniform(&g, 2.0e-4);

    let expected = 2.0e-4 * PI * (4.0 - 1.0);
    assert_relative_eq!(gas.total_mass(&g, &SingleProcess), expected, max_relative = 1e-12);
}

#[test]
fn test_ghost_rings_are_not_counted() {
    let full = grid();
    let local = full.decompose(0, 2, 2).unwrap();
    let gas = GasFields::uniform(&local, 1.0);

    let active: f64 = (0..5).map(|i| full.surface(i) * 16.0).sum();
    assert_relative_eq!(gas.local_mass(&local), active, max_relative = 1e-12);
}
