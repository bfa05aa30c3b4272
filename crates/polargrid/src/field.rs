use std::ops::{Index, IndexMut};

use crate::error::{GridError, GridResult};
use crate::geometry::PolarGrid;

/// Row-major scalar field on a polar grid, ring by ring
#[derive(Debug, Clone, PartialEq)]
pub struct PolarField {
    n_radial: usize,
    n_azimuthal: usize,
    data: Vec<f64>,
}

impl PolarField {
    pub fn new(n_radial: usize, n_azimuthal: usize) -> Self {
        Self::filled(n_radial, n_azimuthal, 0.0)
    }

    pub fn filled(n_radial: usize, n_azimuthal: usize, value: f64) -> Self {
        Self {
            n_radial,
            n_azimuthal,
            data: vec![value; n_radial * n_azimuthal],
        }
    }

    /// Cell-centered field matching `grid`
    pub fn for_grid(grid: &PolarGrid) -> Self {
        Self::new(grid.n_radial(), grid.n_azimuthal())
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_radial, self.n_azimuthal)
    }

    pub fn n_radial(&self) -> usize {
        self.n_radial
    }

    pub fn n_azimuthal(&self) -> usize {
        self.n_azimuthal
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n_azimuthal..(i + 1) * self.n_azimuthal]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i * self.n_azimuthal..(i + 1) * self.n_azimuthal]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Check the field against an expected shape
    pub fn check_shape(&self, name: &'static str, expected: (usize, usize)) -> GridResult<()> {
        if self.shape() != expected {
            return Err(GridError::ShapeMismatch {
                name,
                expected,
                found: self.shape(),
            });
        }
        Ok(())
    }
}

impl Index<(usize, usize)> for PolarField {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.n_azimuthal + j]
    }
}

impl IndexMut<(usize, usize)> for PolarField {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.n_azimuthal + j]
    }
}
