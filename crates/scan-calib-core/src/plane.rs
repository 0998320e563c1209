//! Best-fit plane from a point set via PCA of the scatter matrix.
//!
//! The normal is the eigenvector of the smallest eigenvalue of
//! `C = Σ (p − c)(p − c)ᵀ`. Eigenvalues are visited in solver order and the
//! first-seen extremum wins ties, so for isotropic input the selected axis
//! depends on the solver and is deterministic rather than canonical. Such
//! input is rejected as degenerate anyway.

use crate::GeometryError;
use log::debug;
use nalgebra::{Matrix3, Matrix3xX, Point3, SymmetricEigen, Vector3};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

const MIN_PLANE_POINTS: usize = 3;

/// Tolerances for rejecting point sets that do not define a plane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneFitParams {
    /// Reject when `min ≥ isotropy_ratio · mid`: the out-of-plane spread is
    /// comparable to the in-plane one (ball, cube, thick slab).
    pub isotropy_ratio: f64,
    /// Reject when the middle eigenvalue is `≤ collinear_rel_tol · max` (rank ≤ 1).
    pub collinear_rel_tol: f64,
}

impl Default for PlaneFitParams {
    fn default() -> Self {
        Self {
            isotropy_ratio: 0.5,
            collinear_rel_tol: 1e-9,
        }
    }
}

/// Plane `n · x = offset` through `centroid`, with `|n| = 1`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub centroid: Vector3<f64>,
    pub offset: f64,
}

impl Plane {
    /// Build a plane through `centroid`. `normal` is normalized here.
    pub fn new(normal: Vector3<f64>, centroid: Vector3<f64>) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            centroid,
            offset: normal.dot(&centroid),
        }
    }

    #[inline]
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        self.normal.dot(&p.coords) - self.offset
    }
}

/// Plane plus the PCA diagnostics that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaneFit {
    pub plane: Plane,
    /// Eigenvector of the largest eigenvalue (dominant in-plane direction).
    pub major_axis: Vector3<f64>,
    pub min_eigenvalue: f64,
    pub max_eigenvalue: f64,
}

/// Stateless plane estimator carrying its tolerances.
#[derive(Clone, Debug, Default)]
pub struct PlaneFitter {
    params: PlaneFitParams,
}

impl PlaneFitter {
    pub fn new(params: PlaneFitParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &PlaneFitParams {
        &self.params
    }

    pub fn fit(&self, points: &[Point3<f64>]) -> Result<PlaneFit, GeometryError> {
        fit_plane(points, &self.params)
    }

    pub fn fit_matrix(&self, points: &Matrix3xX<f64>) -> Result<PlaneFit, GeometryError> {
        fit_plane_matrix(points, &self.params)
    }
}

/// Fit a plane to a slice of points.
pub fn fit_plane(
    points: &[Point3<f64>],
    params: &PlaneFitParams,
) -> Result<PlaneFit, GeometryError> {
    let mat = Matrix3xX::from_iterator(
        points.len(),
        points.iter().flat_map(|p| [p.x, p.y, p.z]),
    );
    fit_plane_matrix(&mat, params)
}

/// Fit a plane to points stored as the columns of a 3×N matrix.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(points, params), fields(points = points.ncols()))
)]
pub fn fit_plane_matrix(
    points: &Matrix3xX<f64>,
    params: &PlaneFitParams,
) -> Result<PlaneFit, GeometryError> {
    let n = points.ncols();
    if n < MIN_PLANE_POINTS {
        return Err(GeometryError::InsufficientPoints {
            got: n,
            required: MIN_PLANE_POINTS,
        });
    }

    let centroid: Vector3<f64> = points.column_sum() / n as f64;

    let mut cov = Matrix3::<f64>::zeros();
    for col in points.column_iter() {
        let d = col - centroid;
        cov += d * d.transpose();
    }

    let eigen = SymmetricEigen::new(cov);
    let evals = eigen.eigenvalues;

    let mut i_min = 0;
    let mut i_max = 0;
    for i in 1..3 {
        if evals[i] < evals[i_min] {
            i_min = i;
        }
        if evals[i] > evals[i_max] {
            i_max = i;
        }
    }
    let min_lambda = evals[i_min];
    let max_lambda = evals[i_max];
    let mid_lambda = evals.sum() - min_lambda - max_lambda;
    debug!(
        "plane fit over {n} points: eigenvalues min={min_lambda:.3e} (#{i_min}) \
         mid={mid_lambda:.3e} max={max_lambda:.3e} (#{i_max})"
    );

    // false for all-zero (coincident) and NaN eigenvalues
    let thin = min_lambda < params.isotropy_ratio * mid_lambda;
    if !thin || mid_lambda <= params.collinear_rel_tol * max_lambda {
        return Err(GeometryError::DegenerateGeometry {
            min_eigenvalue: min_lambda,
            mid_eigenvalue: mid_lambda,
            max_eigenvalue: max_lambda,
        });
    }

    let normal: Vector3<f64> = eigen.eigenvectors.column(i_min).into_owned();
    let major_axis: Vector3<f64> = eigen.eigenvectors.column(i_max).into_owned().normalize();

    Ok(PlaneFit {
        plane: Plane::new(normal, centroid),
        major_axis,
        min_eigenvalue: min_lambda,
        max_eigenvalue: max_lambda,
    })
}
