use serde::{Deserialize, Serialize};

use crate::error::{ChoreoError, ChoreoResult};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectConfig {
    pub default_fps: f64,
    pub output_dir: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            default_fps: 30.0,
            output_dir: "out".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraConfig {
    pub sensor_height_mm: f64,
    pub default_focal_length: f64,
    pub min_focal_length: f64,
    pub max_focal_length: f64,
    pub default_occupancy: f64,
    pub default_height_pct: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            sensor_height_mm: 24.0,
            default_focal_length: 35.0,
            min_focal_length: 12.0,
            max_focal_length: 300.0,
            default_occupancy: 0.7,
            default_height_pct: 0.7,
        }
    }
}

/// Where a lateral corridor shift steers the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CorridorAnchor {
    /// Drift to the middle of the new corridor.
    #[default]
    Midpoint,
    /// Drift only as far as needed to fit inside the new corridor.
    NearestEdge,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CorridorConfig {
    pub anchor: CorridorAnchor,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SplineConfig {
    pub samples_per_segment: usize,
}

impl Default for SplineConfig {
    fn default() -> Self {
        Self {
            samples_per_segment: 32,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String, // "error" | "warn" | "info" | "debug" | "trace"
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Contents of `choreo.toml`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ChoreoConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub corridor: CorridorConfig,
    #[serde(default)]
    pub spline: SplineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ChoreoConfig {
    pub fn from_toml_str(contents: &str) -> ChoreoResult<Self> {
        toml::from_str(contents).map_err(|e| ChoreoError::Config(e.to_string()))
    }

    pub fn load_from_file(path: &std::path::Path) -> ChoreoResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> ChoreoResult<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ChoreoError::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
