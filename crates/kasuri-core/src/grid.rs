use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS};
use crate::error::{KasuriError, Result};
use crate::geometry::point::clamp_unit;

/// Logical granularity of the artifact: total rows (thread passes) and total
/// columns (thread lanes). Both are always > 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGridSpec", into = "RawGridSpec")]
pub struct GridSpec {
    rows: u32,
    cols: u32,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGridSpec {
    total_rows: u32,
    total_cols: u32,
}

impl GridSpec {
    pub fn new(rows: u32, cols: u32) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(KasuriError::InvalidGridSpec { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Map a normalized rectified coordinate to a grid cell.
    pub fn cell_at(&self, normalized_x: f64, normalized_y: f64) -> GridCell {
        map_to_cell(normalized_x, normalized_y, self)
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            rows: DEFAULT_GRID_ROWS,
            cols: DEFAULT_GRID_COLS,
        }
    }
}

impl fmt::Display for GridSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rows x {} cols", self.rows, self.cols)
    }
}

impl TryFrom<RawGridSpec> for GridSpec {
    type Error = KasuriError;

    fn try_from(raw: RawGridSpec) -> Result<Self> {
        Self::new(raw.total_rows, raw.total_cols)
    }
}

impl From<GridSpec> for RawGridSpec {
    fn from(spec: GridSpec) -> Self {
        Self {
            total_rows: spec.rows,
            total_cols: spec.cols,
        }
    }
}

/// Discrete row/column position on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub row: u32,
    pub col: u32,
}

/// `row = round(clamp(y) * rows)`, `col = round(clamp(x) * cols)`.
///
/// Ties round half up: the inputs are clamped to [0, 1] first, and on
/// non-negative values `f64::round` (half away from zero) is half-up, so
/// 0.5 * 5 = 2.5 maps to 3.
pub fn map_to_cell(normalized_x: f64, normalized_y: f64, spec: &GridSpec) -> GridCell {
    let row = (clamp_unit(normalized_y) * spec.rows as f64).round() as u32;
    let col = (clamp_unit(normalized_x) * spec.cols as f64).round() as u32;
    GridCell { row, col }
}

/// Which GridSpec field a raw text edit targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridField {
    Rows,
    Cols,
}

/// Input boundary for user-edited grid dimensions.
///
/// Holds the last valid GridSpec; text that is not a positive integer is
/// rejected and leaves the current value untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridSpecInput {
    current: GridSpec,
}

impl GridSpecInput {
    pub fn new(current: GridSpec) -> Self {
        Self { current }
    }

    pub fn current(&self) -> GridSpec {
        self.current
    }

    pub fn set(&mut self, spec: GridSpec) {
        self.current = spec;
    }

    pub fn set_rows_text(&mut self, text: &str) -> Result<GridSpec> {
        self.apply_text(GridField::Rows, text)
    }

    pub fn set_cols_text(&mut self, text: &str) -> Result<GridSpec> {
        self.apply_text(GridField::Cols, text)
    }

    pub fn apply_text(&mut self, field: GridField, text: &str) -> Result<GridSpec> {
        let value = parse_positive(text)?;
        let next = match field {
            GridField::Rows => GridSpec::new(value, self.current.cols)?,
            GridField::Cols => GridSpec::new(self.current.rows, value)?,
        };
        self.current = next;
        Ok(next)
    }
}

fn parse_positive(text: &str) -> Result<u32> {
    match text.trim().parse::<u32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(KasuriError::InvalidGridInput(text.to_string())),
    }
}
