use serde::{Deserialize, Serialize};

use crate::consts::SESSION_FORMAT_VERSION;
use crate::error::{KasuriError, Result};
use crate::geometry::CalibrationQuad;
use crate::grid::GridSpec;
use crate::markers::Marker;

/// Everything a measurement session persists. Encoding is up to the caller;
/// see [`crate::io::session_file`] for the JSON file form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub version: u32,
    /// Path or URI of the source photo.
    pub image: String,
    pub quad: CalibrationQuad,
    pub grid: GridSpec,
    #[serde(default)]
    pub markers: Vec<Marker>,
}

impl Session {
    /// Fresh session for `image` with the default quad and no markers.
    pub fn new(image: impl Into<String>, grid: GridSpec) -> Self {
        Self {
            version: SESSION_FORMAT_VERSION,
            image: image.into(),
            quad: CalibrationQuad::default(),
            grid,
            markers: Vec::new(),
        }
    }

    /// Reject sessions written by a newer format and markers with
    /// coordinates outside [0, 1].
    pub fn validate(&self) -> Result<()> {
        if self.version > SESSION_FORMAT_VERSION {
            return Err(KasuriError::UnsupportedSessionVersion {
                found: self.version,
                supported: SESSION_FORMAT_VERSION,
            });
        }
        for (i, m) in self.markers.iter().enumerate() {
            let in_range = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
            if !in_range(m.normalized_x) || !in_range(m.normalized_y) {
                return Err(KasuriError::InvalidSession(format!(
                    "marker {i} lies outside the unit square"
                )));
            }
        }
        Ok(())
    }
}
