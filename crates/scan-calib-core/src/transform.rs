//! Rigid-body frame transforms for point clouds.

use crate::{GeometryError, PointCloud, Positioned};
use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

#[cfg(feature = "tracing")]
use tracing::instrument;

const ORTHONORMAL_TOL: f64 = 1e-6;

/// `p_out = rotation · p_in + translation`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    pub rotation: Rotation3<f64>,
    pub translation: Vector3<f64>,
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransform {
    pub fn new(rotation: Rotation3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Rotation3::identity(), Vector3::zeros())
    }

    /// Build from a raw 3×3 matrix, checking that it is a proper rotation.
    pub fn from_matrix(
        rotation: Matrix3<f64>,
        translation: Vector3<f64>,
    ) -> Result<Self, GeometryError> {
        let det = rotation.determinant();
        let gram = rotation.transpose() * rotation;
        let off_identity = (gram - Matrix3::identity()).amax();
        if (det - 1.0).abs() > ORTHONORMAL_TOL || off_identity > ORTHONORMAL_TOL {
            return Err(GeometryError::NonRigidTransform { det });
        }
        Ok(Self::new(
            Rotation3::from_matrix_unchecked(rotation),
            translation,
        ))
    }

    /// Adapt an externally tracked pose given as an origin plus a basis
    /// matrix in row-major order (`basis[i][j]` is row `i`, column `j`).
    pub fn from_external_pose(
        origin: [f64; 3],
        basis: [[f64; 3]; 3],
    ) -> Result<Self, GeometryError> {
        let rotation = Matrix3::from_fn(|i, j| basis[i][j]);
        Self::from_matrix(rotation, Vector3::from(origin))
    }

    /// 4×4 homogeneous matrix; the last row is `[0, 0, 0, 1]`.
    pub fn to_homogeneous(&self) -> Matrix4<f64> {
        let mut m = self.rotation.to_homogeneous();
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        m
    }

    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        Self::new(rotation, -(rotation * self.translation))
    }

    #[inline]
    pub fn apply_point(&self, p: &Point3<f64>) -> Point3<f64> {
        self.rotation.transform_point(p) + self.translation
    }

    /// Transform every point; order, frame tag and payload are preserved.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(points = cloud.len()))
    )]
    pub fn apply<P: Positioned>(&self, cloud: &PointCloud<P>) -> PointCloud<P> {
        log::debug!("transforming {} points", cloud.len());
        PointCloud {
            frame_id: cloud.frame_id.clone(),
            points: cloud
                .iter()
                .map(|p| p.with_position(self.apply_point(&p.position())))
                .collect(),
        }
    }
}

impl Mul for RigidTransform {
    type Output = RigidTransform;

    /// `(a * b)` applies `b` first, then `a`.
    fn mul(self, rhs: RigidTransform) -> RigidTransform {
        RigidTransform::new(
            self.rotation * rhs.rotation,
            self.rotation * rhs.translation + self.translation,
        )
    }
}
