use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_MAX_RASTER_HEIGHT, DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE, DEFAULT_RASTER_WIDTH,
    PIVOT_EPSILON,
};
use crate::error::Result;
use crate::grid::GridSpec;

/// Tunables for the rectification and measurement engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub raster: RasterConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub grid: GridSpec,
    #[serde(default)]
    pub solver: SolverConfig,
}

impl EngineConfig {
    /// Parse a TOML document. Missing sections fall back to their defaults.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Fixed width of the rectified raster in pixels.
    pub target_width: u32,
    /// Height cap for the rectified raster.
    pub max_height: u32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_RASTER_WIDTH,
            max_height: DEFAULT_MAX_RASTER_HEIGHT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Pivot magnitude under which the homography system is singular.
    pub pivot_epsilon: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            pivot_epsilon: PIVOT_EPSILON,
        }
    }
}
