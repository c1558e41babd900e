/// Minimum pixel count (w*h) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Pivot magnitude below which a linear system is declared singular.
pub const PIVOT_EPSILON: f64 = 1e-10;

/// Homogeneous `w` magnitude below which a transformed point is at infinity.
pub const PROJECTIVE_W_EPSILON: f64 = 1e-12;

/// Twice-area threshold (normalized units) under which three corners count
/// as collinear.
pub const COLLINEAR_EPSILON: f64 = 1e-9;

/// Distance (normalized units) under which two corners count as coincident.
pub const COINCIDENT_EPSILON: f64 = 1e-6;

/// Default width of the rectified raster in pixels.
pub const DEFAULT_RASTER_WIDTH: u32 = 800;

/// Upper bound on the rectified raster height, reached only by very thin quads.
pub const DEFAULT_MAX_RASTER_HEIGHT: u32 = 8192;

/// Inset of the default calibration quad from each image edge.
pub const DEFAULT_QUAD_INSET: f64 = 0.2;

/// Default total row count (thread passes) of a layout sheet.
pub const DEFAULT_GRID_ROWS: u32 = 32;

/// Default total column count (thread lanes) of a layout sheet.
pub const DEFAULT_GRID_COLS: u32 = 80;

/// Default lower zoom bound. The raster is never shown smaller than its fit.
pub const DEFAULT_MIN_SCALE: f64 = 1.0;

/// Default upper zoom bound.
pub const DEFAULT_MAX_SCALE: f64 = 8.0;

/// Current session file format version.
pub const SESSION_FORMAT_VERSION: u32 = 1;

/// Marker dot radius as a fraction of the raster width in exported images.
pub const MARKER_RADIUS_FRACTION: f64 = 1.0 / 250.0;
