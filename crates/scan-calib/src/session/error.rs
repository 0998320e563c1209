use crate::block::BlockLocateError;
use crate::core::GeometryError;
use std::fmt;

/// Session slots an operation may find empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    Scan,
    TransformedScan,
    Selection,
    TransformedSelection,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Slot::Scan => "scan",
            Slot::TransformedScan => "transformed scan",
            Slot::Selection => "selection",
            Slot::TransformedSelection => "transformed selection",
        };
        f.write_str(name)
    }
}

/// Errors returned by [`crate::CalibrationSession`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("no capture available: {slot} slot is empty")]
    NoCaptureAvailable { slot: Slot },
    #[error("malformed snapshot: {points} points but {colors} colors")]
    MalformedSnapshot { points: usize, colors: usize },
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    BlockNotFound(#[from] BlockLocateError),
}
