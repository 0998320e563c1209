use scan_calib_core::AcceptanceBand;
use serde::{Deserialize, Serialize};

/// Configuration for the block locator.
///
/// Heights are in the working (calibration) frame, z up. The defaults match a
/// light block on a table roughly 0.24 below the working-frame origin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockLocatorParams {
    /// Only points strictly above this height are block-top candidates.
    pub start_height: f64,
    /// Optional ceiling; candidates must be strictly below it.
    pub max_height: Option<f64>,
    /// Half-width of the inclusive band around the estimated top height.
    pub height_tolerance: f64,
    /// Color gate used both for the height estimate and for extraction.
    pub band: AcceptanceBand,
    /// Maximum `|far.y − near.y|` for the block to count as axis-aligned.
    pub orientation_tolerance: f64,
}

impl Default for BlockLocatorParams {
    fn default() -> Self {
        Self {
            start_height: -0.2,
            max_height: None,
            height_tolerance: 0.015,
            band: AcceptanceBand::default(),
            orientation_tolerance: 0.005,
        }
    }
}
