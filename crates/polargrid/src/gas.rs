use crate::comm::Communicator;
use crate::error::GridResult;
use crate::field::PolarField;
use crate::geometry::PolarGrid;

/// Gas fields read and written by the coupling layer
///
/// `v_radial` lives on the radial faces and so has one more ring than the
/// cell-centered fields. `v_azimuthal` is stored at the sector's lower edge.
#[derive(Debug, Clone, PartialEq)]
pub struct GasFields {
    pub density: PolarField,
    pub v_radial: PolarField,
    pub v_azimuthal: PolarField,
    pub potential: PolarField,
}

impl GasFields {
    pub fn new(grid: &PolarGrid) -> Self {
        Self::uniform(grid, 0.0)
    }

    /// Gas at rest with constant surface density
    pub fn uniform(grid: &PolarGrid, density: f64) -> Self {
        let (n_r, n_phi) = (grid.n_radial(), grid.n_azimuthal());
        Self {
            density: PolarField::filled(n_r, n_phi, density),
            v_radial: PolarField::new(n_r + 1, n_phi),
            v_azimuthal: PolarField::new(n_r, n_phi),
            potential: PolarField::new(n_r, n_phi),
        }
    }

    /// Verify every field matches `grid`
    pub fn check_shape(&self, grid: &PolarGrid) -> GridResult<()> {
        let cells = (grid.n_radial(), grid.n_azimuthal());
        self.density.check_shape("density", cells)?;
        self.v_radial
            .check_shape("v_radial", (cells.0 + 1, cells.1))?;
        self.v_azimuthal.check_shape("v_azimuthal", cells)?;
        self.potential.check_shape("potential", cells)
    }

    /// Gas mass in the rank's active rings
    pub fn local_mass(&self, grid: &PolarGrid) -> f64 {
        grid.active_range()
            .map(|i| grid.surface(i) * self.density.row(i).iter().sum::<f64>())
            .sum()
    }

    /// Total gas mass of the disk, summed over all ranks.
    ///
    /// Ghost rings are skipped so every ring is counted once.
    pub fn total_mass<C: Communicator + ?Sized>(&self, grid: &PolarGrid, comm: &C) -> f64 {
        let mut mass = [self.local_mass(grid)];
        comm.all_reduce_sum(&mut mass);
        mass[0]
    }
}
