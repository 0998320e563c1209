//! Point-set geometry for scan-based sensor-to-robot calibration.
//!
//! This crate is purely geometric and stateless: every operation borrows its
//! input and returns a fresh cloud, index list or summary. It knows nothing
//! about sensors, topics or the capture session.
//!
//! - [`fit_plane`]: PCA plane estimation.
//! - [`RigidTransform`]: frame changes for plain and colored clouds.
//! - [`filter_by_height`], [`filter_by_height_and_radius`]: spatial selection.
//! - [`average_interesting_color`], [`classify_by_color`]: color selection.

mod color;
mod error;
mod filter;
mod logger;
mod plane;
mod point;
mod transform;

pub use color::{
    average_interesting_color, classify_by_color, mean_color, mean_color_all, AcceptanceBand,
    InterestingColor, InterestingColorParams,
};
pub use error::GeometryError;
pub use filter::{
    filter_by_height, filter_by_height_and_radius, filter_by_height_range, height_extent,
};
pub use plane::{fit_plane, fit_plane_matrix, Plane, PlaneFit, PlaneFitParams, PlaneFitter};
pub use point::{ColoredPoint, ColoredPointSet, PointCloud, PointSet, Positioned, Rgb};
pub use transform::RigidTransform;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
