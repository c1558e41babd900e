pub mod calibration;
pub mod config;
pub mod consts;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod io;
pub mod markers;
pub mod raster;
pub mod rectify;
pub mod session;
pub mod viewport;
pub mod workspace;
