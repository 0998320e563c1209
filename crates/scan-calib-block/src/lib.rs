//! Colored-block locator for scan-based calibration.
//!
//! Given a colored scan expressed in the working frame (z up), the locator
//! finds the top face of a block whose color passes an [`AcceptanceBand`],
//! then reports its centroid, an edge direction and its average color.
//!
//! ```
//! use scan_calib_block::{BlockLocator, BlockLocatorParams};
//! use scan_calib_core::ColoredPointSet;
//!
//! let locator = BlockLocator::new(BlockLocatorParams::default());
//! let scan = ColoredPointSet::new("torso");
//! let outcome = locator.locate(&scan);
//! assert!(outcome.unwrap_err().is_not_found());
//! ```
//!
//! [`AcceptanceBand`]: scan_calib_core::AcceptanceBand

mod locator;

pub use locator::*;
