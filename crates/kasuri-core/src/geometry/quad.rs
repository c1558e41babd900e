use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{COINCIDENT_EPSILON, COLLINEAR_EPSILON, DEFAULT_QUAD_INSET};
use crate::error::{KasuriError, Result};

use super::point::Point2;

/// Fixed slot of a calibration corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::TopLeft => 0,
            Self::TopRight => 1,
            Self::BottomRight => 2,
            Self::BottomLeft => 3,
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopLeft => write!(f, "top-left"),
            Self::TopRight => write!(f, "top-right"),
            Self::BottomRight => write!(f, "bottom-right"),
            Self::BottomLeft => write!(f, "bottom-left"),
        }
    }
}

/// The four user-marked corners of the artifact, normalized to the source
/// image. Slot order never changes: editing moves a slot in place.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[Point2; 4]", into = "[Point2; 4]")]
pub struct CalibrationQuad {
    points: [Point2; 4],
}

impl CalibrationQuad {
    /// Build a quad from corners in TL, TR, BR, BL order. Coordinates must be
    /// finite; they are clamped into the unit square.
    pub fn new(points: [Point2; 4]) -> Result<Self> {
        if let Some(p) = points.iter().find(|p| !p.is_finite()) {
            return Err(KasuriError::InvalidQuad(format!(
                "non-finite corner ({}, {})",
                p.x, p.y
            )));
        }
        Ok(Self {
            points: points.map(|p| p.clamp_unit()),
        })
    }

    /// Centered quad inset `inset` from each image edge.
    pub fn centered(inset: f64) -> Self {
        let lo = inset.clamp(0.0, 0.5);
        let hi = 1.0 - lo;
        Self {
            points: [
                Point2::new(lo, lo),
                Point2::new(hi, lo),
                Point2::new(hi, hi),
                Point2::new(lo, hi),
            ],
        }
    }

    pub fn points(&self) -> &[Point2; 4] {
        &self.points
    }

    pub fn corner(&self, corner: Corner) -> Point2 {
        self.points[corner.index()]
    }

    /// Move one slot to `p` (clamped into the unit square).
    pub fn set_corner(&mut self, corner: Corner, p: Point2) {
        if p.is_finite() {
            self.points[corner.index()] = p.clamp_unit();
        }
    }

    /// Slot whose point is closest to `p`. Ties resolve to the earlier slot.
    pub fn nearest_corner(&self, p: Point2) -> Corner {
        let mut best = Corner::TopLeft;
        let mut best_dist = f64::INFINITY;
        for corner in Corner::ALL {
            let d = self.points[corner.index()].distance(&p);
            if d < best_dist {
                best = corner;
                best_dist = d;
            }
        }
        best
    }

    /// Relocate the nearest existing corner to `p` without re-sorting slots.
    pub fn drag_nearest(&mut self, p: Point2) -> Corner {
        let corner = self.nearest_corner(p);
        self.set_corner(corner, p);
        corner
    }

    /// Average of the top and bottom edges over the average of the left and
    /// right edges, in normalized units. `None` if the vertical edges vanish.
    pub fn aspect_ratio(&self) -> Option<f64> {
        let [tl, tr, br, bl] = self.points;
        let width = (tl.distance(&tr) + bl.distance(&br)) / 2.0;
        let height = (tl.distance(&bl) + tr.distance(&br)) / 2.0;
        if height <= COINCIDENT_EPSILON || width <= COINCIDENT_EPSILON {
            return None;
        }
        Some(width / height)
    }

    /// Check that no two corners coincide and no three are collinear.
    pub fn validate(&self) -> Result<()> {
        for i in 0..4 {
            for j in i + 1..4 {
                if self.points[i].distance(&self.points[j]) <= COINCIDENT_EPSILON {
                    return Err(KasuriError::DegenerateGeometry(format!(
                        "{} and {} corners coincide",
                        Corner::ALL[i],
                        Corner::ALL[j]
                    )));
                }
            }
        }

        const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
        for [a, b, c] in TRIPLES {
            let (pa, pb, pc) = (self.points[a], self.points[b], self.points[c]);
            let cross = (pb.x - pa.x) * (pc.y - pa.y) - (pb.y - pa.y) * (pc.x - pa.x);
            if cross.abs() <= COLLINEAR_EPSILON {
                return Err(KasuriError::DegenerateGeometry(format!(
                    "{}, {} and {} corners are collinear",
                    Corner::ALL[a],
                    Corner::ALL[b],
                    Corner::ALL[c]
                )));
            }
        }
        Ok(())
    }
}

impl Default for CalibrationQuad {
    fn default() -> Self {
        Self::centered(DEFAULT_QUAD_INSET)
    }
}

impl TryFrom<[Point2; 4]> for CalibrationQuad {
    type Error = KasuriError;

    fn try_from(points: [Point2; 4]) -> Result<Self> {
        Self::new(points)
    }
}

impl From<CalibrationQuad> for [Point2; 4] {
    fn from(quad: CalibrationQuad) -> Self {
        quad.points
    }
}
