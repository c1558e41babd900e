pub mod image_io;
pub mod session_file;
