//! Height-band and radius membership tests.
//!
//! All filters return indices into the input cloud in ascending order and
//! never fail; empty input gives an empty result. Comparisons are strict.

use crate::{PointCloud, Positioned};
use log::debug;
use nalgebra::Point3;

/// Indices with `|z − z_nominal| < epsilon`.
pub fn filter_by_height<P: Positioned>(
    points: &PointCloud<P>,
    z_nominal: f64,
    epsilon: f64,
) -> Vec<usize> {
    let indices = collect_indices(points, |p| (p.z - z_nominal).abs() < epsilon);
    debug!(
        "{} of {} points within {epsilon} of z={z_nominal}",
        indices.len(),
        points.len()
    );
    indices
}

/// Indices in the height band that are also within `radius` of `center`.
///
/// The radius test uses the full 3-D distance, not the in-plane distance;
/// for a horizontal plane the two differ only by the band thickness.
pub fn filter_by_height_and_radius<P: Positioned>(
    points: &PointCloud<P>,
    z_nominal: f64,
    epsilon: f64,
    radius: f64,
    center: &Point3<f64>,
) -> Vec<usize> {
    let indices = collect_indices(points, |p| {
        (p.z - z_nominal).abs() < epsilon && (p - center).norm() < radius
    });
    debug!(
        "{} of {} points within {epsilon} of z={z_nominal} and {radius} of center",
        indices.len(),
        points.len()
    );
    indices
}

/// Indices with `min_z < z < max_z`.
pub fn filter_by_height_range<P: Positioned>(
    points: &PointCloud<P>,
    min_z: f64,
    max_z: f64,
) -> Vec<usize> {
    collect_indices(points, |p| p.z > min_z && p.z < max_z)
}

/// Lowest and highest z in the cloud, `None` when empty.
pub fn height_extent<P: Positioned>(points: &PointCloud<P>) -> Option<(f64, f64)> {
    points.iter().map(|p| p.position().z).fold(None, |acc, z| match acc {
        None => Some((z, z)),
        Some((lo, hi)) => Some((lo.min(z), hi.max(z))),
    })
}

fn collect_indices<P: Positioned>(
    points: &PointCloud<P>,
    keep: impl Fn(&Point3<f64>) -> bool,
) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| keep(&p.position()))
        .map(|(i, _)| i)
        .collect()
}
