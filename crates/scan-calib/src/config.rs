//! JSON configuration for a calibration session.

use crate::block::BlockLocatorParams;
use crate::core::{InterestingColorParams, PlaneFitParams};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_working_frame() -> String {
    "torso".to_string()
}

/// Tunables for [`crate::CalibrationSession`]. Every field has a default, so
/// a config file only needs to list what it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Frame id given to transformed clouds and emitted records.
    #[serde(default = "default_working_frame")]
    pub working_frame: String,
    #[serde(default)]
    pub plane_fit: PlaneFitParams,
    /// Reference used to summarize the colors of each captured scan.
    #[serde(default)]
    pub interesting_color: InterestingColorParams,
    #[serde(default)]
    pub block: BlockLocatorParams,
    /// Widening applied to the selection's height extent when searching for
    /// coplanar scan points.
    #[serde(default)]
    pub coplanar_tolerance: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            working_frame: default_working_frame(),
            plane_fit: PlaneFitParams::default(),
            interesting_color: InterestingColorParams::default(),
            block: BlockLocatorParams::default(),
            coplanar_tolerance: 0.0,
        }
    }
}

impl SessionConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let raw = r#"{"working_frame": "base_link", "block": {"start_height": 0.05}}"#;
        let cfg: SessionConfig = serde_json::from_str(raw).expect("json");
        assert_eq!(cfg.working_frame, "base_link");
        assert_eq!(cfg.block.start_height, 0.05);
        assert_eq!(cfg.block.height_tolerance, 0.015);
        assert_eq!(cfg.plane_fit, PlaneFitParams::default());
        assert_eq!(cfg.interesting_color.min_distance, 1.0);
    }

    #[test]
    fn config_survives_disk_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        let mut cfg = SessionConfig::default();
        cfg.coplanar_tolerance = 0.01;
        cfg.block.max_height = Some(0.0);
        cfg.write_json(&path).expect("write");
        assert_eq!(SessionConfig::load_json(&path).expect("load"), cfg);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = SessionConfig::load_json(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigIoError::Io(_)));
    }
}
