use ndarray::Array2;
use tracing::debug;

use crate::consts::{PIVOT_EPSILON, PROJECTIVE_W_EPSILON};
use crate::error::{KasuriError, Result};

use super::linalg::solve_augmented;
use super::point::Point2;
use super::quad::CalibrationQuad;

/// Corners of the unit square in quad slot order (TL, TR, BR, BL).
pub const UNIT_SQUARE: [Point2; 4] = [
    Point2::new(0.0, 0.0),
    Point2::new(1.0, 0.0),
    Point2::new(1.0, 1.0),
    Point2::new(0.0, 1.0),
];

/// A 3x3 projective transform stored row-major. Estimated transforms have `h33 == 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    coeffs: [f64; 9],
}

impl Homography {
    pub const IDENTITY: Homography = Homography {
        coeffs: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    };

    /// Wrap raw row-major coefficients.
    pub fn from_coefficients(coeffs: [f64; 9]) -> Self {
        Self { coeffs }
    }

    pub fn coefficients(&self) -> &[f64; 9] {
        &self.coeffs
    }

    /// Estimate the transform mapping each `src[i]` onto `dst[i]`.
    pub fn estimate(src: &[Point2; 4], dst: &[Point2; 4]) -> Result<Self> {
        Self::estimate_with_epsilon(src, dst, PIVOT_EPSILON)
    }

    /// Direct linear transform over four correspondences: two equations per
    /// pair in the eight unknowns h11..h32, solved with `h33` fixed at 1.
    pub fn estimate_with_epsilon(
        src: &[Point2; 4],
        dst: &[Point2; 4],
        pivot_epsilon: f64,
    ) -> Result<Self> {
        let mut system = Array2::<f64>::zeros((8, 9));
        for (i, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
            let r = 2 * i;
            let row_x = [s.x, s.y, 1.0, 0.0, 0.0, 0.0, -s.x * d.x, -s.y * d.x, d.x];
            let row_y = [0.0, 0.0, 0.0, s.x, s.y, 1.0, -s.x * d.y, -s.y * d.y, d.y];
            for k in 0..9 {
                system[[r, k]] = row_x[k];
                system[[r + 1, k]] = row_y[k];
            }
        }

        let h = solve_augmented(system, pivot_epsilon).ok_or_else(|| {
            debug!("Homography system is singular");
            KasuriError::DegenerateGeometry(
                "corner points are collinear, coincident or ill-conditioned".into(),
            )
        })?;

        let mut coeffs = [0.0; 9];
        for (c, v) in coeffs.iter_mut().zip(h.iter()) {
            *c = *v;
        }
        coeffs[8] = 1.0;

        if coeffs.iter().any(|c| !c.is_finite()) {
            return Err(KasuriError::DegenerateGeometry(
                "homography has non-finite coefficients".into(),
            ));
        }

        Ok(Self { coeffs })
    }

    /// Forward transform: calibration quad -> unit square.
    pub fn quad_to_unit(quad: &CalibrationQuad) -> Result<Self> {
        Self::estimate(quad.points(), &UNIT_SQUARE)
    }

    /// Inverse transform: unit square -> calibration quad (source image space).
    pub fn unit_to_quad(quad: &CalibrationQuad) -> Result<Self> {
        Self::estimate(&UNIT_SQUARE, quad.points())
    }

    /// Apply the transform with homogeneous division.
    ///
    /// When `w` is near zero the point maps to infinity and the result is
    /// non-finite; callers clamp or bounds-check downstream.
    pub fn transform(&self, p: Point2) -> Point2 {
        let h = &self.coeffs;
        let w = h[6] * p.x + h[7] * p.y + h[8];
        Point2::new(
            (h[0] * p.x + h[1] * p.y + h[2]) / w,
            (h[3] * p.x + h[4] * p.y + h[5]) / w,
        )
    }

    /// Like [`transform`](Self::transform) but returns `None` for points at infinity.
    pub fn try_transform(&self, p: Point2) -> Option<Point2> {
        let h = &self.coeffs;
        let w = h[6] * p.x + h[7] * p.y + h[8];
        if !w.is_finite() || w.abs() <= PROJECTIVE_W_EPSILON {
            return None;
        }
        let out = self.transform(p);
        out.is_finite().then_some(out)
    }

    /// Composition `self ∘ other` (apply `other` first).
    pub fn compose(&self, other: &Homography) -> Homography {
        let a = &self.coeffs;
        let b = &other.coeffs;
        let mut c = [0.0; 9];
        for row in 0..3 {
            for col in 0..3 {
                c[row * 3 + col] = (0..3).map(|k| a[row * 3 + k] * b[k * 3 + col]).sum();
            }
        }
        Homography { coeffs: c }
    }
}

impl Default for Homography {
    fn default() -> Self {
        Self::IDENTITY
    }
}
