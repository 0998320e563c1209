//! Color-space classification of scan points.
//!
//! Two distance notions are used: raw RGB distance to a reference color
//! (interesting-point detection) and distance between unit-normalized colors
//! (brightness-independent matching).

use crate::{ColoredPointSet, GeometryError, Rgb};
use log::{debug, warn};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Reference color and distance used to flag interesting points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterestingColorParams {
    pub reference: Rgb,
    /// Points strictly farther than this (RGB units) from `reference` are interesting.
    pub min_distance: f64,
}

impl Default for InterestingColorParams {
    fn default() -> Self {
        Self {
            reference: Rgb::new(147, 147, 147),
            min_distance: 1.0,
        }
    }
}

/// Average color of the interesting points and where they are.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InterestingColor {
    pub average: Vector3<f64>,
    pub indices: Vec<usize>,
}

/// Per-channel gate: every channel must exceed `baseline` by more than `margin`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceptanceBand {
    pub baseline: Rgb,
    pub margin: [i16; 3],
}

impl Default for AcceptanceBand {
    fn default() -> Self {
        Self {
            baseline: Rgb::new(166, 155, 155),
            margin: [1, 2, 2],
        }
    }
}

impl AcceptanceBand {
    pub fn new(baseline: Rgb, margin: [i16; 3]) -> Self {
        Self { baseline, margin }
    }

    #[inline]
    pub fn accepts(&self, color: Rgb) -> bool {
        color
            .channels()
            .iter()
            .zip(self.baseline.channels())
            .zip(self.margin)
            .all(|((&c, base), margin)| c as i16 - base as i16 > margin)
    }
}

/// Average the colors of all points farther than `min_distance` from `reference`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(points), fields(points = points.len()))
)]
pub fn average_interesting_color(
    points: &ColoredPointSet,
    reference: Rgb,
    min_distance: f64,
) -> Result<InterestingColor, GeometryError> {
    let ref_color = reference.to_vector();
    let mut sum = Vector3::zeros();
    let mut indices = Vec::new();
    for (i, p) in points.iter().enumerate() {
        let c = p.color.to_vector();
        if (c - ref_color).norm() > min_distance {
            sum += c;
            indices.push(i);
        }
    }
    debug!("found {} points with interesting color", indices.len());
    if indices.is_empty() {
        return Err(GeometryError::NoMatchFound {
            context: "no point differs from the reference color",
        });
    }
    Ok(InterestingColor {
        average: sum / indices.len() as f64,
        indices,
    })
}

/// Keep the indices whose normalized color lies within `threshold` of
/// `target_normalized`. Black points and out-of-range indices are dropped.
pub fn classify_by_color(
    indices: &[usize],
    points: &ColoredPointSet,
    target_normalized: &Vector3<f64>,
    threshold: f64,
) -> Vec<usize> {
    let mut out = Vec::new();
    for &i in indices {
        let Some(p) = points.get(i) else {
            warn!("color match: index {i} out of range ({} points)", points.len());
            continue;
        };
        let Some(normalized) = p.color.to_vector().try_normalize(0.0) else {
            continue;
        };
        if (target_normalized - normalized).norm() < threshold {
            out.push(i);
        }
    }
    debug!("found {} color-match points from {} indexed", out.len(), indices.len());
    out
}

/// Plain average color over an index subset.
pub fn mean_color(
    points: &ColoredPointSet,
    indices: &[usize],
) -> Result<Vector3<f64>, GeometryError> {
    let mut sum = Vector3::zeros();
    let mut n = 0usize;
    for p in indices.iter().filter_map(|&i| points.get(i)) {
        sum += p.color.to_vector();
        n += 1;
    }
    if n == 0 {
        return Err(GeometryError::NoMatchFound {
            context: "mean color of empty index set",
        });
    }
    Ok(sum / n as f64)
}

/// Plain average color over every point.
pub fn mean_color_all(points: &ColoredPointSet) -> Result<Vector3<f64>, GeometryError> {
    let all: Vec<usize> = (0..points.len()).collect();
    mean_color(points, &all)
}
