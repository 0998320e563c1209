use super::{
    edge_orientation, BlockDetection, BlockLocateError, BlockLocatorParams, BlockSet,
    HeightEstimate,
};
use log::{debug, info};
use scan_calib_core::{mean_color_all, ColoredPointSet};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Height-then-color block locator.
#[derive(Clone, Debug, Default)]
pub struct BlockLocator {
    params: BlockLocatorParams,
}

impl BlockLocator {
    pub fn new(params: BlockLocatorParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &BlockLocatorParams {
        &self.params
    }

    /// Run every stage on a scan in the working frame.
    pub fn locate(&self, scan: &ColoredPointSet) -> Result<BlockDetection, BlockLocateError> {
        let estimate = self.estimate_height(scan)?;
        let set = self.extract(scan, &estimate)?;
        self.summarize(&set)
    }

    /// Highest band-matching point above the start height (and below the
    /// ceiling, when one is configured).
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(points = scan.len()))
    )]
    pub fn estimate_height(
        &self,
        scan: &ColoredPointSet,
    ) -> Result<HeightEstimate, BlockLocateError> {
        let p = &self.params;
        let mut best: Option<f64> = None;
        let mut support = 0usize;
        for pt in scan.iter() {
            let z = pt.position.z;
            if z <= p.start_height || p.max_height.is_some_and(|max| z >= max) {
                continue;
            }
            if !p.band.accepts(pt.color) {
                continue;
            }
            support += 1;
            if best.is_none_or(|b| z > b) {
                best = Some(z);
            }
        }

        let height = best.ok_or(BlockLocateError::NoCandidateAboveStart {
            start_height: p.start_height,
        })?;
        info!("block top height {height:.4} ({support} candidates)");
        Ok(HeightEstimate { height, support })
    }

    /// Band-matching points within the inclusive height band around `estimate`.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(height = estimate.height))
    )]
    pub fn extract(
        &self,
        scan: &ColoredPointSet,
        estimate: &HeightEstimate,
    ) -> Result<BlockSet, BlockLocateError> {
        let tol = self.params.height_tolerance;
        let (lo, hi) = (estimate.height - tol, estimate.height + tol);
        let indices: Vec<usize> = scan
            .iter()
            .enumerate()
            .filter(|(_, pt)| {
                let z = pt.position.z;
                z >= lo && z <= hi && self.params.band.accepts(pt.color)
            })
            .map(|(i, _)| i)
            .collect();

        if indices.is_empty() {
            return Err(BlockLocateError::EmptyBlockSet {
                height: estimate.height,
                tolerance: tol,
            });
        }
        debug!("extracted {} block points in [{lo:.4}, {hi:.4}]", indices.len());
        let points = scan.select(&indices);
        Ok(BlockSet {
            estimate: *estimate,
            indices,
            points,
        })
    }

    /// Centroid, edge orientation and mean color of an extracted block.
    pub fn summarize(&self, set: &BlockSet) -> Result<BlockDetection, BlockLocateError> {
        let points = set.points();
        let empty = || BlockLocateError::EmptyBlockSet {
            height: set.estimate().height,
            tolerance: self.params.height_tolerance,
        };
        let centroid = points.centroid().map_err(|_| empty())?;
        let orientation =
            edge_orientation(points, self.params.orientation_tolerance).ok_or_else(empty)?;
        let average_color = mean_color_all(points).map_err(|_| empty())?;
        info!(
            "block at ({:.4}, {:.4}, {:.4}) from {} points",
            centroid.x,
            centroid.y,
            centroid.z,
            points.len()
        );
        Ok(BlockDetection {
            centroid,
            orientation,
            average_color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocateStage;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};
    use scan_calib_core::{ColoredPoint, Rgb};

    const BLOCK: Rgb = Rgb::new(200, 180, 170);
    const TABLE: Rgb = Rgb::new(100, 100, 100);

    fn pt(x: f64, y: f64, z: f64, color: Rgb) -> ColoredPoint {
        ColoredPoint::new(Point3::new(x, y, z), color)
    }

    /// Table at z = -0.24 with a 0.1 × 0.06 block top at z = -0.19.
    fn table_scene() -> ColoredPointSet {
        let mut pts = Vec::new();
        for i in 0..20 {
            for j in 0..20 {
                pts.push(pt(i as f64 * 0.02, j as f64 * 0.02, -0.24, TABLE));
            }
        }
        for i in 0..6 {
            for j in 0..4 {
                let (x, y) = (0.1 + i as f64 * 0.02, 0.1 + j as f64 * 0.02);
                pts.push(pt(x, y, -0.19, BLOCK));
            }
        }
        // bright clutter below the start height must not be picked up
        pts.push(pt(0.3, 0.3, -0.23, BLOCK));
        ColoredPointSet::from_points("torso", pts)
    }

    #[test]
    fn locates_block_top_on_table() {
        let locator = BlockLocator::default();
        let scan = table_scene();

        let estimate = locator.estimate_height(&scan).expect("estimate");
        assert_relative_eq!(estimate.height, -0.19);
        assert_eq!(estimate.support, 24);

        let set = locator.extract(&scan, &estimate).expect("block set");
        assert_eq!(set.len(), 24);
        assert_eq!(set.indices()[0], 400);

        let det = locator.summarize(&set).expect("summary");
        let centroid = Vector3::new(0.15, 0.13, -0.19);
        assert_relative_eq!(det.centroid, centroid, epsilon = 1e-9);
        assert_relative_eq!(det.average_color, Vector3::new(200.0, 180.0, 170.0));
        let edge = Vector3::new(0.0, 0.06, 0.0);
        assert_relative_eq!(det.orientation, edge, epsilon = 1e-9);
        assert_eq!(locator.locate(&scan).unwrap(), det);
    }

    #[test]
    fn scan_without_block_color_is_not_found() {
        let scan: ColoredPointSet = (0..10).map(|i| pt(i as f64, 0.0, 0.5, TABLE)).collect();
        let err = BlockLocator::default().locate(&scan).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.reached_from(), LocateStage::HasScan);
    }

    #[test]
    fn ceiling_excludes_points_at_or_above_max_height() {
        let mut scan = table_scene();
        scan.points.push(pt(0.0, 0.0, 0.4, BLOCK));
        let unbounded = BlockLocator::default().estimate_height(&scan).unwrap();
        assert_relative_eq!(unbounded.height, 0.4);

        let locator = BlockLocator::new(BlockLocatorParams {
            max_height: Some(0.0),
            ..BlockLocatorParams::default()
        });
        assert_relative_eq!(locator.estimate_height(&scan).unwrap().height, -0.19);
    }

    #[test]
    fn stale_estimate_yields_empty_block_set() {
        let scan = table_scene();
        let locator = BlockLocator::default();
        let stale = HeightEstimate {
            height: 1.0,
            support: 1,
        };
        let err = locator.extract(&scan, &stale).unwrap_err();
        assert_eq!(err.reached_from(), LocateStage::HasHeightEstimate);
    }

    #[test]
    fn params_round_trip_through_json_with_defaults() {
        let params: BlockLocatorParams =
            serde_json::from_str(r#"{"start_height": 0.05, "band": {"margin": [10, 10, 10]}}"#)
                .expect("json");
        assert_eq!(params.start_height, 0.05);
        assert_eq!(params.height_tolerance, 0.015);
        assert_eq!(params.band.baseline, Rgb::new(166, 155, 155));
        assert_eq!(params.band.margin, [10, 10, 10]);
    }
}
