//! # rasterstat core
//!
//! Core types and image loading for the rasterstat statistics tool.
//!
//! This crate provides:
//! - `SampleBuffer`: decoded multi-band samples with per-band encoding
//! - `SampleType`: bit depth and signedness of a band
//! - `Error`: typed failure conditions shared by every rasterstat crate
//! - I/O for TIFF images and headerless raw files

pub mod error;
pub mod io;
pub mod raster;

pub use error::{Error, Result};
pub use raster::{SampleBuffer, SampleType};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::io::{load_image, ByteOrder, RawGeometry};
    pub use crate::raster::{SampleBuffer, SampleType};
}
