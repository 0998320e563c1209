//! Serializable records handed to whatever transport publishes results.

use crate::block::{BlockDetection, BlockLocateError};
use crate::core::Plane;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Fitted plane of a selected patch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchParams {
    pub normal: [f64; 3],
    pub centroid: [f64; 3],
    pub offset: f64,
    pub frame_id: String,
}

impl PatchParams {
    pub fn from_plane(plane: &Plane, frame_id: impl Into<String>) -> Self {
        Self {
            normal: plane.normal.into(),
            centroid: plane.centroid.into(),
            offset: plane.offset,
            frame_id: frame_id.into(),
        }
    }
}

/// A target position for consumers that only need a location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetPose {
    pub frame_id: String,
    pub position: [f64; 3],
}

impl TargetPose {
    pub fn new(position: Vector3<f64>, frame_id: impl Into<String>) -> Self {
        Self {
            frame_id: frame_id.into(),
            position: position.into(),
        }
    }
}

/// Outcome of one locate request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BlockReport {
    Found {
        frame_id: String,
        centroid: [f64; 3],
        orientation: [f64; 3],
        average_color: [f64; 3],
    },
    NotFound {
        reason: String,
    },
}

impl BlockReport {
    pub fn from_outcome(
        outcome: &Result<BlockDetection, BlockLocateError>,
        frame_id: impl Into<String>,
    ) -> Self {
        match outcome {
            Ok(det) => Self::Found {
                frame_id: frame_id.into(),
                centroid: det.centroid.into(),
                orientation: det.orientation.into(),
                average_color: det.average_color.into(),
            },
            Err(err) => Self::NotFound {
                reason: err.to_string(),
            },
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// Pretty JSON for any record.
pub fn to_json<T: Serialize>(record: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(record)
}
