use super::LocateStage;

/// Ways the block locator ends in its `NotFound` state.
///
/// These are ordinary outcomes, not faults: the scan simply contains no block
/// matching the configured band.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BlockLocateError {
    #[error("block not found: no band-matching point above start height {start_height:.3}")]
    NoCandidateAboveStart { start_height: f64 },
    #[error("block not found: no band-matching point within {tolerance:.3} of height {height:.3}")]
    EmptyBlockSet { height: f64, tolerance: f64 },
}

impl BlockLocateError {
    /// Every variant is a not-found outcome; wrappers forward this to callers.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        true
    }

    /// Stage the search was in when it gave up.
    pub fn reached_from(&self) -> LocateStage {
        match self {
            Self::NoCandidateAboveStart { .. } => LocateStage::HasScan,
            Self::EmptyBlockSet { .. } => LocateStage::HasHeightEstimate,
        }
    }
}
