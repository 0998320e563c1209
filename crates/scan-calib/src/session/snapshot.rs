use super::SessionError;
use crate::core::{ColoredPoint, ColoredPointSet, Rgb};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// One scan as delivered by the ingestion boundary: parallel positions and
/// optional colors, tagged with the sensor frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanSnapshot {
    pub frame_id: String,
    pub points: Vec<Point3<f64>>,
    #[serde(default)]
    pub colors: Option<Vec<Rgb>>,
}

impl ScanSnapshot {
    pub fn new(frame_id: impl Into<String>, points: Vec<Point3<f64>>) -> Self {
        Self {
            frame_id: frame_id.into(),
            points,
            colors: None,
        }
    }

    pub fn with_colors(mut self, colors: Vec<Rgb>) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Zip positions and colors. A missing color channel becomes black.
    pub fn into_cloud(self) -> Result<ColoredPointSet, SessionError> {
        let colors = match self.colors {
            Some(c) if c.len() != self.points.len() => {
                return Err(SessionError::MalformedSnapshot {
                    points: self.points.len(),
                    colors: c.len(),
                })
            }
            Some(c) => c,
            None => vec![Rgb::BLACK; self.points.len()],
        };
        let points = self
            .points
            .into_iter()
            .zip(colors)
            .map(|(p, c)| ColoredPoint::new(p, c))
            .collect();
        Ok(ColoredPointSet::from_points(self.frame_id, points))
    }
}

/// Whether an offered scan was latched or discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    Captured,
    /// A scan was already held; the offered one was discarded.
    Dropped,
}
