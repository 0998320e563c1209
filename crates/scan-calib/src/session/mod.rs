//! Capture session: latched scan, user selection and derived results.
//!
//! The scan slot follows a capture-once policy: the first offered scan is
//! kept and later ones are dropped until [`CalibrationSession::clear_scan`].
//! Selections are never latched; each new one replaces the previous.
//!
//! Block search progress is an explicit state ([`LocateStage`]) advanced one
//! stage at a time by [`CalibrationSession::advance_block`] or all the way by
//! [`CalibrationSession::locate_block`].

mod error;
mod shared;
mod snapshot;

pub use error::{SessionError, Slot};
pub use shared::SharedSession;
pub use snapshot::{CaptureOutcome, ScanSnapshot};

use crate::block::{
    BlockDetection, BlockLocateError, BlockLocator, BlockSet, HeightEstimate, LocateStage,
};
use crate::config::SessionConfig;
use crate::core::{
    average_interesting_color, filter_by_height, filter_by_height_and_radius,
    filter_by_height_range, height_extent, ColoredPointSet, GeometryError, InterestingColor,
    PlaneFit, PlaneFitter, PointSet, RigidTransform,
};
use crate::records::{BlockReport, PatchParams, TargetPose};
use log::{debug, info, warn};
use nalgebra::Point3;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A latched scan and what has been derived from it.
#[derive(Clone, Debug, PartialEq)]
pub struct CapturedScan {
    raw: ColoredPointSet,
    working: Option<ColoredPointSet>,
    interesting: Option<InterestingColor>,
}

impl CapturedScan {
    /// The scan as captured, in the sensor frame.
    #[inline]
    pub fn raw(&self) -> &ColoredPointSet {
        &self.raw
    }

    /// The scan in the working frame, once transformed.
    #[inline]
    pub fn working(&self) -> Option<&ColoredPointSet> {
        self.working.as_ref()
    }

    /// Average color of points that differ from the configured reference.
    #[inline]
    pub fn interesting_color(&self) -> Option<&InterestingColor> {
        self.interesting.as_ref()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
enum BlockProgress {
    #[default]
    Pending,
    HeightEstimate(HeightEstimate),
    BlockSet(BlockSet),
    Located(BlockSet, BlockDetection),
    NotFound(BlockLocateError),
}

/// Owns every cloud of one calibration run.
#[derive(Clone, Debug, Default)]
pub struct CalibrationSession {
    config: SessionConfig,
    fitter: PlaneFitter,
    locator: BlockLocator,
    scan: Option<CapturedScan>,
    selection: Option<PointSet>,
    working_selection: Option<PointSet>,
    last_plane: Option<PlaneFit>,
    block: BlockProgress,
}

impl CalibrationSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            fitter: PlaneFitter::new(config.plane_fit.clone()),
            locator: BlockLocator::new(config.block.clone()),
            config,
            ..Self::default()
        }
    }

    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Where the session stands; `Idle` until a scan is latched.
    pub fn state(&self) -> LocateStage {
        if self.scan.is_none() {
            return LocateStage::Idle;
        }
        match self.block {
            BlockProgress::Pending => LocateStage::HasScan,
            BlockProgress::HeightEstimate(_) => LocateStage::HasHeightEstimate,
            BlockProgress::BlockSet(_) => LocateStage::HasBlockSet,
            BlockProgress::Located(..) => LocateStage::Located,
            BlockProgress::NotFound(_) => LocateStage::NotFound,
        }
    }

    // ---- ingestion -------------------------------------------------------

    /// Latch `snapshot` if the scan slot is free, otherwise drop it.
    pub fn offer_scan(&mut self, snapshot: ScanSnapshot) -> Result<CaptureOutcome, SessionError> {
        if self.scan.is_some() {
            debug!("scan slot busy, dropping snapshot from {}", snapshot.frame_id);
            return Ok(CaptureOutcome::Dropped);
        }
        let raw = snapshot.into_cloud()?;
        info!("captured scan of {} points in {}", raw.len(), raw.frame_id);

        let params = &self.config.interesting_color;
        let interesting =
            match average_interesting_color(&raw, params.reference, params.min_distance) {
                Ok(summary) => Some(summary),
                Err(err) => {
                    debug!("captured scan has no interesting color: {err}");
                    None
                }
            };

        self.scan = Some(CapturedScan {
            raw,
            working: None,
            interesting,
        });
        self.block = BlockProgress::Pending;
        Ok(CaptureOutcome::Captured)
    }

    /// Replace the current selection unconditionally.
    pub fn set_selection(&mut self, selection: PointSet) {
        info!(
            "new selection of {} points in {}",
            selection.len(),
            selection.frame_id
        );
        self.selection = Some(selection);
        self.working_selection = None;
        self.last_plane = None;
    }

    /// Release the scan latch so the next offered scan is captured.
    pub fn clear_scan(&mut self) {
        self.scan = None;
        self.block = BlockProgress::Pending;
    }

    /// Drop every slot and cache; configuration is kept.
    pub fn reset(&mut self) {
        self.clear_scan();
        self.selection = None;
        self.working_selection = None;
        self.last_plane = None;
    }

    pub fn scan(&self) -> Result<&CapturedScan, SessionError> {
        self.scan.as_ref().ok_or(SessionError::NoCaptureAvailable { slot: Slot::Scan })
    }

    pub fn selection(&self) -> Result<&PointSet, SessionError> {
        self.selection.as_ref().ok_or(SessionError::NoCaptureAvailable {
            slot: Slot::Selection,
        })
    }

    /// The latched scan in the working frame.
    pub fn working_scan(&self) -> Result<&ColoredPointSet, SessionError> {
        working_scan(&self.scan)
    }

    /// The selection in the working frame.
    pub fn working_selection(&self) -> Result<&PointSet, SessionError> {
        self.working_selection
            .as_ref()
            .ok_or(SessionError::NoCaptureAvailable {
                slot: Slot::TransformedSelection,
            })
    }

    // ---- frames ----------------------------------------------------------

    /// Express the latched scan in the working frame. Restarts the block search.
    pub fn transform_scan(
        &mut self,
        sensor_to_working: &RigidTransform,
    ) -> Result<(), SessionError> {
        let frame = self.config.working_frame.clone();
        let scan = self
            .scan
            .as_mut()
            .ok_or(SessionError::NoCaptureAvailable { slot: Slot::Scan })?;
        scan.working = Some(sensor_to_working.apply(&scan.raw).with_frame(frame));
        self.block = BlockProgress::Pending;
        Ok(())
    }

    /// Express the current selection in the working frame.
    pub fn transform_selection(
        &mut self,
        sensor_to_working: &RigidTransform,
    ) -> Result<(), SessionError> {
        let selection = self.selection()?;
        let working = sensor_to_working
            .apply(selection)
            .with_frame(self.config.working_frame.clone());
        self.working_selection = Some(working);
        self.last_plane = None;
        Ok(())
    }

    // ---- selection geometry ---------------------------------------------

    /// Fit a plane to the transformed selection and cache it.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self)))]
    pub fn fit_selection_plane(&mut self) -> Result<PatchParams, SessionError> {
        let selection = self.working_selection()?;
        let fit = self.fitter.fit(&selection.points)?;
        info!(
            "selection plane normal ({:.4}, {:.4}, {:.4}) offset {:.4}",
            fit.plane.normal.x, fit.plane.normal.y, fit.plane.normal.z, fit.plane.offset
        );
        self.last_plane = Some(fit);
        Ok(PatchParams::from_plane(
            &fit.plane,
            &self.config.working_frame,
        ))
    }

    #[inline]
    pub fn last_plane(&self) -> Option<&PlaneFit> {
        self.last_plane.as_ref()
    }

    /// Centroid of the transformed selection as a target position.
    pub fn selection_centroid(&self) -> Result<TargetPose, SessionError> {
        let centroid = self.working_selection()?.centroid()?;
        info!(
            "selection centroid ({:.4}, {:.4}, {:.4})",
            centroid.x, centroid.y, centroid.z
        );
        Ok(TargetPose::new(centroid, &self.config.working_frame))
    }

    /// Scan points strictly inside the selection's height extent, widened by
    /// `coplanar_tolerance` on both sides.
    pub fn find_coplanar_points(&self) -> Result<Vec<usize>, SessionError> {
        let selection = self.working_selection()?;
        let scan = self.working_scan()?;
        let (min_z, max_z) = height_extent(selection).ok_or(GeometryError::NoMatchFound {
            context: "height extent of empty selection",
        })?;
        let tol = self.config.coplanar_tolerance;
        let indices = filter_by_height_range(scan, min_z - tol, max_z + tol);
        info!(
            "{} coplanar points for selection z in [{min_z:.4}, {max_z:.4}] ± {tol}",
            indices.len()
        );
        Ok(indices)
    }

    /// Transformed-scan points within `epsilon` of `plane_height`.
    pub fn coplanar_points_at_height(
        &self,
        plane_height: f64,
        epsilon: f64,
    ) -> Result<Vec<usize>, SessionError> {
        let scan = self.working_scan()?;
        Ok(filter_by_height(scan, plane_height, epsilon))
    }

    /// Transformed-scan points in the height band and within `radius` of `center`.
    pub fn filter_scan(
        &self,
        z_nominal: f64,
        epsilon: f64,
        radius: f64,
        center: &Point3<f64>,
    ) -> Result<Vec<usize>, SessionError> {
        Ok(filter_by_height_and_radius(
            self.working_scan()?,
            z_nominal,
            epsilon,
            radius,
            center,
        ))
    }

    // ---- block search ----------------------------------------------------

    /// Run the next block-search stage and return the stage reached.
    ///
    /// `Located` and `NotFound` are terminal; advancing from them is a no-op
    /// until a new scan or transform restarts the search.
    pub fn advance_block(&mut self) -> Result<LocateStage, SessionError> {
        let scan = working_scan(&self.scan)?;
        let next = match std::mem::take(&mut self.block) {
            BlockProgress::Pending => match self.locator.estimate_height(scan) {
                Ok(estimate) => BlockProgress::HeightEstimate(estimate),
                Err(err) => BlockProgress::NotFound(err),
            },
            BlockProgress::HeightEstimate(estimate) => match self.locator.extract(scan, &estimate) {
                Ok(set) => BlockProgress::BlockSet(set),
                Err(err) => BlockProgress::NotFound(err),
            },
            BlockProgress::BlockSet(set) => match self.locator.summarize(&set) {
                Ok(det) => BlockProgress::Located(set, det),
                Err(err) => BlockProgress::NotFound(err),
            },
            done @ (BlockProgress::Located(..) | BlockProgress::NotFound(_)) => done,
        };
        if let BlockProgress::NotFound(err) = &next {
            warn!("{err}");
        }
        self.block = next;
        Ok(self.state())
    }

    /// Advance the block search to a terminal state.
    pub fn locate_block(&mut self) -> Result<BlockDetection, SessionError> {
        loop {
            self.advance_block()?;
            match &self.block {
                BlockProgress::Located(_, det) => return Ok(*det),
                BlockProgress::NotFound(err) => return Err(err.clone().into()),
                _ => {}
            }
        }
    }

    /// Locate the block and package the outcome as a record. Only a missing
    /// capture is an error here; not finding the block is a normal report.
    pub fn block_report(&mut self) -> Result<BlockReport, SessionError> {
        let outcome = match self.locate_block() {
            Ok(det) => Ok(det),
            Err(SessionError::BlockNotFound(err)) => Err(err),
            Err(other) => return Err(other),
        };
        Ok(BlockReport::from_outcome(
            &outcome,
            &self.config.working_frame,
        ))
    }

    pub fn block_estimate(&self) -> Option<&HeightEstimate> {
        match &self.block {
            BlockProgress::HeightEstimate(est) => Some(est),
            BlockProgress::BlockSet(set) | BlockProgress::Located(set, _) => Some(set.estimate()),
            _ => None,
        }
    }

    /// Extracted block points, once the search got that far.
    pub fn block_points(&self) -> Option<&ColoredPointSet> {
        match &self.block {
            BlockProgress::BlockSet(set) | BlockProgress::Located(set, _) => Some(set.points()),
            _ => None,
        }
    }

    pub fn block_detection(&self) -> Option<&BlockDetection> {
        match &self.block {
            BlockProgress::Located(_, det) => Some(det),
            _ => None,
        }
    }
}

fn working_scan(scan: &Option<CapturedScan>) -> Result<&ColoredPointSet, SessionError> {
    let scan = scan
        .as_ref()
        .ok_or(SessionError::NoCaptureAvailable { slot: Slot::Scan })?;
    scan.working().ok_or(SessionError::NoCaptureAvailable {
        slot: Slot::TransformedScan,
    })
}
