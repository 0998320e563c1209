//! Edge direction of a block from its extreme points.
//!
//! Only two outcomes are considered: an axis-aligned block (use the y extent)
//! or a rotated block whose top corner touches the short and long edges (use
//! the shorter of the two edges meeting at the +y extreme). Blocks rotated so
//! that the +y extreme is not a corner shared with the ±x extremes are not
//! handled specially.

use nalgebra::Point3;
use nalgebra::Vector3;
use scan_calib_core::{PointCloud, Positioned};

/// Extreme points of a point set; the first point reaching an extreme wins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockExtremes {
    /// Largest y.
    pub left: Point3<f64>,
    /// Smallest y.
    pub right: Point3<f64>,
    /// Largest x.
    pub far: Point3<f64>,
    /// Smallest x.
    pub near: Point3<f64>,
}

impl BlockExtremes {
    pub fn of<P: Positioned>(points: &PointCloud<P>) -> Option<Self> {
        let mut iter = points.iter().map(Positioned::position);
        let first = iter.next()?;
        let mut ext = Self {
            left: first,
            right: first,
            far: first,
            near: first,
        };
        for p in iter {
            if p.y > ext.left.y {
                ext.left = p;
            }
            if p.y < ext.right.y {
                ext.right = p;
            }
            if p.x > ext.far.x {
                ext.far = p;
            }
            if p.x < ext.near.x {
                ext.near = p;
            }
        }
        Some(ext)
    }
}

/// Unnormalized edge vector of the block; `None` for an empty set.
pub fn edge_orientation<P: Positioned>(
    points: &PointCloud<P>,
    tolerance: f64,
) -> Option<Vector3<f64>> {
    let ext = BlockExtremes::of(points)?;
    if (ext.far.y - ext.near.y).abs() <= tolerance {
        return Some(ext.left - ext.right);
    }
    let side1 = ext.left - ext.far;
    let side2 = ext.left - ext.near;
    if side1.norm() < side2.norm() {
        Some(side1)
    } else {
        Some(side2)
    }
}
