use nalgebra::Vector3;
use scan_calib_core::ColoredPointSet;
use serde::{Deserialize, Serialize};

/// Where the block is, which way its short edge points and what color it is.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockDetection {
    pub centroid: Vector3<f64>,
    /// Unnormalized edge vector; see [`crate::edge_orientation`].
    pub orientation: Vector3<f64>,
    pub average_color: Vector3<f64>,
}

/// Output of the height-estimate stage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightEstimate {
    /// Highest band-matching z above the start height.
    pub height: f64,
    /// Number of band-matching candidates above the start height.
    pub support: usize,
}

/// Output of the extraction stage. Only the locator builds these, and never empty.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockSet {
    pub(crate) estimate: HeightEstimate,
    pub(crate) indices: Vec<usize>,
    pub(crate) points: ColoredPointSet,
}

impl BlockSet {
    #[inline]
    pub fn estimate(&self) -> &HeightEstimate {
        &self.estimate
    }

    /// Indices of the block points in the scanned cloud.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    #[inline]
    pub fn points(&self) -> &ColoredPointSet {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Named states of a block search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocateStage {
    Idle,
    HasScan,
    HasHeightEstimate,
    HasBlockSet,
    Located,
    NotFound,
}
