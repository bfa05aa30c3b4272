//! Polar mesh geometry and radial domain decomposition
//!
//! Ring `i` spans `[r_inf(i), r_sup(i)]` and is cut into `n_azimuthal` equal
//! sectors. Each rank holds a contiguous block of active rings plus up to
//! `overlap` ghost rings copied from each neighbour. Indices on a
//! [`PolarGrid`] are always local to the rank.

use std::f64::consts::PI;
use std::ops::Range;

use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// Placement of the radial cell faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadialSpacing {
    #[default]
    Arithmetic,
    Logarithmic,
}

/// Radial face positions for `n` rings between `r_min` and `r_max`.
fn radial_faces(r_min: f64, r_max: f64, n: usize, spacing: RadialSpacing) -> Vec<f64> {
    (0..=n)
        .map(|i| {
            let frac = i as f64 / n as f64;
            match spacing {
                RadialSpacing::Arithmetic => r_min + frac * (r_max - r_min),
                RadialSpacing::Logarithmic => r_min * (r_max / r_min).powf(frac),
            }
        })
        .collect()
}

/// Local view of the polar mesh owned by one rank
#[derive(Debug, Clone, PartialEq)]
pub struct PolarGrid {
    /// Face radii of the local rings, `n_radial + 1` entries
    faces: Vec<f64>,
    /// Area-weighted ring centers
    r_med: Vec<f64>,
    /// Area of one cell in each ring
    surface: Vec<f64>,
    cos_phi: Vec<f64>,
    sin_phi: Vec<f64>,
    n_azimuthal: usize,
    global_n_radial: usize,
    /// Inner and outer edge of the whole domain
    domain: (f64, f64),
    /// Global index of local ring 0
    radial_offset: usize,
    active: Range<usize>,
}

impl PolarGrid {
    /// Build the full (undecomposed) grid.
    ///
    /// # Arguments
    /// * `r_min`, `r_max` - Inner and outer edge of the domain
    /// * `n_radial` - Number of rings
    /// * `n_azimuthal` - Number of sectors per ring
    /// * `spacing` - Face placement
    ///
    /// # Examples
    ///
    /// ```
    /// use polargrid::geometry::{PolarGrid, RadialSpacing};
    ///
    /// let grid = PolarGrid::new(0.5, 2.5, 20, 64, RadialSpacing::Arithmetic).unwrap();
    /// assert_eq!(grid.n_radial(), 20);
    /// assert_eq!(grid.active_range(), 0..20);
    /// assert!((grid.r_inf(0) - 0.5).abs() < 1e-15);
    /// ```
    pub fn new(
        r_min: f64,
        r_max: f64,
        n_radial: usize,
        n_azimuthal: usize,
        spacing: RadialSpacing,
    ) -> GridResult<Self> {
        if !(r_min > 0.0 && r_max > r_min && r_max.is_finite()) {
            return Err(GridError::InvalidRadii { r_min, r_max });
        }
        if n_radial == 0 || n_azimuthal == 0 {
            return Err(GridError::EmptyGrid {
                n_radial,
                n_azimuthal,
            });
        }

        let faces = radial_faces(r_min, r_max, n_radial, spacing);
        Ok(Self::from_faces(
            faces,
            n_azimuthal,
            n_radial,
            (r_min, r_max),
            0,
            0..n_radial,
        ))
    }

    fn from_faces(
        faces: Vec<f64>,
        n_azimuthal: usize,
        global_n_radial: usize,
        domain: (f64, f64),
        radial_offset: usize,
        active: Range<usize>,
    ) -> Self {
        let (r_med, surface) = faces
            .windows(2)
            .map(|w| {
                let (inf, sup) = (w[0], w[1]);
                let r_med =
                    2.0 / 3.0 * (sup.powi(3) - inf.powi(3)) / (sup.powi(2) - inf.powi(2));
                let surface = PI * (sup * sup - inf * inf) / n_azimuthal as f64;
                (r_med, surface)
            })
            .unzip();

        let dphi = 2.0 * PI / n_azimuthal as f64;
        let (cos_phi, sin_phi) = (0..n_azimuthal)
            .map(|j| {
                let phi = j as f64 * dphi;
                (phi.cos(), phi.sin())
            })
            .unzip();

        Self {
            faces,
            r_med,
            surface,
            cos_phi,
            sin_phi,
            n_azimuthal,
            global_n_radial,
            domain,
            radial_offset,
            active,
        }
    }

    /// Carve out the local grid of `rank` among `n_ranks`.
    ///
    /// Active rings are split into contiguous blocks as evenly as possible,
    /// the first `n_radial % n_ranks` ranks taking one extra ring. Each block
    /// is padded with up to `overlap` ghost rings on either side; the physical
    /// domain edges get none.
    pub fn decompose(&self, rank: usize, n_ranks: usize, overlap: usize) -> GridResult<Self> {
        let n = self.global_n_radial;
        if n_ranks == 0 || rank >= n_ranks || n < n_ranks || self.n_radial() != n {
            return Err(GridError::InvalidDecomposition {
                rank,
                n_ranks,
                n_radial: n,
            });
        }

        let base = n / n_ranks;
        let extra = n % n_ranks;
        let start = rank * base + rank.min(extra);
        let end = start + base + usize::from(rank < extra);

        let lo = start.saturating_sub(overlap);
        let hi = (end + overlap).min(n);
        debug!("rank {rank}/{n_ranks}: active rings {start}..{end}, local rings {lo}..{hi}");

        Ok(Self::from_faces(
            self.faces[lo..=hi].to_vec(),
            self.n_azimuthal,
            n,
            self.domain,
            lo,
            (start - lo)..(end - lo),
        ))
    }

    // =========================================================================
    // Shape
    // =========================================================================

    /// Number of local rings, ghosts included
    pub fn n_radial(&self) -> usize {
        self.r_med.len()
    }

    pub fn n_azimuthal(&self) -> usize {
        self.n_azimuthal
    }

    pub fn global_n_radial(&self) -> usize {
        self.global_n_radial
    }

    /// Inner edge of the whole domain
    pub fn inner_radius(&self) -> f64 {
        self.domain.0
    }

    /// Outer edge of the whole domain
    pub fn outer_radius(&self) -> f64 {
        self.domain.1
    }

    /// Global index of the first local ring
    pub fn radial_offset(&self) -> usize {
        self.radial_offset
    }

    /// Local rings owned by this rank (ghosts excluded)
    pub fn active_range(&self) -> Range<usize> {
        self.active.clone()
    }

    pub fn is_active(&self, i: usize) -> bool {
        self.active.contains(&i)
    }

    pub fn cell_count(&self) -> usize {
        self.n_radial() * self.n_azimuthal
    }

    // =========================================================================
    // Ring geometry
    // =========================================================================

    pub fn r_inf(&self, i: usize) -> f64 {
        self.faces[i]
    }

    pub fn r_sup(&self, i: usize) -> f64 {
        self.faces[i + 1]
    }

    pub fn r_med(&self, i: usize) -> f64 {
        self.r_med[i]
    }

    pub fn surface(&self, i: usize) -> f64 {
        self.surface[i]
    }

    // =========================================================================
    // Cells
    // =========================================================================

    pub fn dphi(&self) -> f64 {
        2.0 * PI / self.n_azimuthal as f64
    }

    /// Azimuth of the center of sector `j`
    pub fn azimuth(&self, j: usize) -> f64 {
        j as f64 * self.dphi()
    }

    /// Cartesian center of cell `(i, j)`
    pub fn cell_center(&self, i: usize, j: usize) -> Point2<f64> {
        let r = self.r_med[i];
        Point2::new(r * self.cos_phi[j], r * self.sin_phi[j])
    }

    /// Wrap a possibly negative or overflowing sector index onto `0..n_azimuthal`
    pub fn wrap_azimuthal(&self, j: i64) -> usize {
        j.rem_euclid(self.n_azimuthal as i64) as usize
    }
}
