//! High-level facade for the `scan-calib-*` workspace.
//!
//! This crate provides:
//! - re-exports of the geometry kernel (`scan_calib::core`) and the block
//!   locator (`scan_calib::block`),
//! - [`CalibrationSession`], which owns the latched scan and the current
//!   selection and runs the calibration steps on them,
//! - serializable output records and a JSON session configuration.
//!
//! ## Quickstart
//!
//! ```
//! use scan_calib::core::{RigidTransform, Rgb};
//! use scan_calib::{CalibrationSession, CaptureOutcome, ScanSnapshot, SessionConfig};
//! use nalgebra::Point3;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = CalibrationSession::new(SessionConfig::default());
//! let snapshot = ScanSnapshot::new("kinect", vec![Point3::new(0.0, 0.0, -0.19)])
//!     .with_colors(vec![Rgb::new(200, 180, 170)]);
//! assert_eq!(session.offer_scan(snapshot)?, CaptureOutcome::Captured);
//!
//! session.transform_scan(&RigidTransform::identity())?;
//! let block = session.locate_block()?;
//! println!("block at {:?}", block.centroid);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `scan_calib::core`: point clouds, plane fitting, transforms, filters, colors.
//! - `scan_calib::block`: staged block locator.
//! - `scan_calib::session`: capture latch, selection, block-search state.
//! - `scan_calib::records`: plane, pose and block records for publishers.

pub use scan_calib_block as block;
pub use scan_calib_core as core;

pub mod config;
pub mod records;
pub mod session;

pub use config::{ConfigIoError, SessionConfig};
pub use records::{BlockReport, PatchParams, TargetPose};
pub use scan_calib_block::{BlockDetection, LocateStage};
pub use session::{
    CalibrationSession, CaptureOutcome, CapturedScan, ScanSnapshot, SessionError, SharedSession,
    Slot,
};
