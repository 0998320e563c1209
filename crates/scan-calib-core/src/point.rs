//! Point and point-cloud containers.
//!
//! Clouds carry no logic beyond access and selection; geometric operations
//! live in their own modules and are generic over [`Positioned`].

use crate::GeometryError;
use nalgebra::{Matrix3xX, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// 8-bit RGB color of a scan point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as a float vector in RGB space.
    #[inline]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.r as f64, self.g as f64, self.b as f64)
    }

    #[inline]
    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

/// A position with a color attached.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColoredPoint {
    pub position: Point3<f64>,
    pub color: Rgb,
}

impl ColoredPoint {
    pub fn new(position: Point3<f64>, color: Rgb) -> Self {
        Self { position, color }
    }
}

/// Anything that has a 3-D position which geometric operations may read and
/// replace. Non-positional payload (color) is carried through `with_position`.
pub trait Positioned: Clone {
    fn position(&self) -> Point3<f64>;

    fn with_position(&self, position: Point3<f64>) -> Self;
}

impl Positioned for Point3<f64> {
    #[inline]
    fn position(&self) -> Point3<f64> {
        *self
    }

    #[inline]
    fn with_position(&self, position: Point3<f64>) -> Self {
        position
    }
}

impl Positioned for ColoredPoint {
    #[inline]
    fn position(&self) -> Point3<f64> {
        self.position
    }

    #[inline]
    fn with_position(&self, position: Point3<f64>) -> Self {
        Self {
            position,
            color: self.color,
        }
    }
}

/// Ordered point collection tagged with the frame its coordinates live in.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloud<P> {
    pub frame_id: String,
    pub points: Vec<P>,
}

/// Positions only.
pub type PointSet = PointCloud<Point3<f64>>;
/// Positions with per-point color.
pub type ColoredPointSet = PointCloud<ColoredPoint>;

impl<P> PointCloud<P> {
    pub fn new(frame_id: impl Into<String>) -> Self {
        Self {
            frame_id: frame_id.into(),
            points: Vec::new(),
        }
    }

    pub fn from_points(frame_id: impl Into<String>, points: Vec<P>) -> Self {
        Self {
            frame_id: frame_id.into(),
            points,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&P> {
        self.points.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, P> {
        self.points.iter()
    }

    /// Re-tag the cloud with another frame id without touching coordinates.
    pub fn with_frame(mut self, frame_id: impl Into<String>) -> Self {
        self.frame_id = frame_id.into();
        self
    }
}

impl<P: Positioned> PointCloud<P> {
    /// Copy of the indexed points, in index order. Out-of-range indices are skipped.
    pub fn select(&self, indices: &[usize]) -> Self {
        let points = indices
            .iter()
            .filter_map(|&i| self.points.get(i).cloned())
            .collect();
        Self {
            frame_id: self.frame_id.clone(),
            points,
        }
    }

    /// Position-only view of this cloud.
    pub fn positions(&self) -> PointSet {
        PointCloud {
            frame_id: self.frame_id.clone(),
            points: self.points.iter().map(Positioned::position).collect(),
        }
    }

    /// Arithmetic mean of all positions.
    pub fn centroid(&self) -> Result<Vector3<f64>, GeometryError> {
        centroid_of(self.points.iter().map(Positioned::position))
    }

    /// Pack positions as columns of a 3×N matrix.
    pub fn to_matrix(&self) -> Matrix3xX<f64> {
        Matrix3xX::from_iterator(
            self.points.len(),
            self.points.iter().flat_map(|p| {
                let q = p.position();
                [q.x, q.y, q.z]
            }),
        )
    }
}

impl<P> FromIterator<P> for PointCloud<P> {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self {
            frame_id: String::new(),
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a, P> IntoIterator for &'a PointCloud<P> {
    type Item = &'a P;
    type IntoIter = std::slice::Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

pub(crate) fn centroid_of(
    positions: impl Iterator<Item = Point3<f64>>,
) -> Result<Vector3<f64>, GeometryError> {
    let mut sum = Vector3::zeros();
    let mut n = 0usize;
    for p in positions {
        sum += p.coords;
        n += 1;
    }
    if n == 0 {
        return Err(GeometryError::NoMatchFound {
            context: "centroid of empty point set",
        });
    }
    Ok(sum / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn colored(x: f64, y: f64, z: f64, c: [u8; 3]) -> ColoredPoint {
        ColoredPoint::new(Point3::new(x, y, z), Rgb::from(c))
    }

    #[test]
    fn centroid_is_mean_of_positions() {
        let cloud = PointSet::from_points(
            "base",
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 4.0, 6.0),
                Point3::new(0.0, 4.0, 6.0),
            ],
        );
        assert_relative_eq!(cloud.centroid().unwrap(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn empty_centroid_is_reported() {
        let cloud = PointSet::new("base");
        assert!(matches!(
            cloud.centroid(),
            Err(GeometryError::NoMatchFound { .. })
        ));
    }

    #[test]
    fn select_keeps_index_order_and_skips_out_of_range() {
        let cloud = ColoredPointSet::from_points(
            "kinect",
            vec![
                colored(0.0, 0.0, 0.0, [1, 1, 1]),
                colored(1.0, 0.0, 0.0, [2, 2, 2]),
                colored(2.0, 0.0, 0.0, [3, 3, 3]),
            ],
        );
        let sub = cloud.select(&[2, 7, 0]);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.frame_id, "kinect");
        assert_eq!(sub.points[0].color, Rgb::new(3, 3, 3));
        assert_eq!(sub.points[1].color, Rgb::new(1, 1, 1));
    }

    #[test]
    fn matrix_columns_follow_point_order() {
        let cloud = ColoredPointSet::from_points(
            "kinect",
            vec![colored(1.0, 2.0, 3.0, [0, 0, 0]), colored(4.0, 5.0, 6.0, [0, 0, 0])],
        );
        let m = cloud.to_matrix();
        assert_eq!(m.ncols(), 2);
        assert_eq!(m[(2, 0)], 3.0);
        assert_eq!(m[(0, 1)], 4.0);
        assert_eq!(cloud.positions().points[1], Point3::new(4.0, 5.0, 6.0));
    }
}
