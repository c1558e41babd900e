use thiserror::Error;

#[derive(Error, Debug)]
pub enum KasuriError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Session format error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Rectification unavailable: {0}")]
    DegenerateGeometry(String),

    #[error("Invalid grid dimensions: {rows} rows x {cols} columns")]
    InvalidGridSpec { rows: u32, cols: u32 },

    #[error("Invalid grid input: {0:?}")]
    InvalidGridInput(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Marker index {index} out of range (total: {total})")]
    MarkerIndexOutOfRange { index: usize, total: usize },

    #[error("Unsupported session version {found} (supported: {supported})")]
    UnsupportedSessionVersion { found: u32, supported: u32 },

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Invalid calibration quad: {0}")]
    InvalidQuad(String),

    #[error("No source image loaded")]
    NoSourceImage,

    #[error("Image decode stopped before producing a result")]
    DecodeAbandoned,
}

pub type Result<T> = std::result::Result<T, KasuriError>;
