//! Block location pipeline.
//!
//! Stages run in order: height estimate → extraction → summary. Each stage
//! consumes the previous stage's output type, so a later stage cannot run
//! without an earlier one having succeeded.

mod error;
mod orientation;
mod params;
mod pipeline;
mod result;

pub use error::BlockLocateError;
pub use orientation::{edge_orientation, BlockExtremes};
pub use params::BlockLocatorParams;
pub use pipeline::BlockLocator;
pub use result::{BlockDetection, BlockSet, HeightEstimate, LocateStage};
