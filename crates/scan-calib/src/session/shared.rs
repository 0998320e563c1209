use super::{CalibrationSession, CaptureOutcome, ScanSnapshot, SessionError};
use crate::core::PointSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Session handle for ingestion running on another thread than consumption.
///
/// Every access goes through one mutex, so a scan is latched as a whole or
/// not at all.
#[derive(Clone, Debug, Default)]
pub struct SharedSession {
    inner: Arc<Mutex<CalibrationSession>>,
}

impl SharedSession {
    pub fn new(session: CalibrationSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn offer_scan(&self, snapshot: ScanSnapshot) -> Result<CaptureOutcome, SessionError> {
        self.lock().offer_scan(snapshot)
    }

    pub fn set_selection(&self, selection: PointSet) {
        self.lock().set_selection(selection);
    }

    /// Run `f` with exclusive access to the session.
    pub fn with<R>(&self, f: impl FnOnce(&mut CalibrationSession) -> R) -> R {
        f(&mut self.lock())
    }

    // a panic in another holder leaves the slots in a consistent state: every
    // mutation is a single assignment
    fn lock(&self) -> MutexGuard<'_, CalibrationSession> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
