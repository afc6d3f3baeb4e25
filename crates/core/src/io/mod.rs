//! I/O operations for loading images into sample buffers

mod native;
mod raw;

use crate::error::{Error, Result};
use crate::raster::SampleBuffer;
use std::path::Path;

pub use native::{read_tiff, read_tiff_from_buffer};
pub use raw::{read_raw, read_raw_from_buffer, ByteOrder, RawGeometry};

/// Whether a path names a headerless raw file (`.raw` or `.img`)
pub fn is_raw<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("raw") || ext.eq_ignore_ascii_case("img"))
        .unwrap_or(false)
}

/// Load an image, dispatching on the file extension
///
/// Raw files need a geometry; any other file is decoded as TIFF and the
/// geometry, if given, is ignored.
pub fn load_image<P: AsRef<Path>>(path: P, geometry: Option<&RawGeometry>) -> Result<SampleBuffer> {
    let path = path.as_ref();
    if is_raw(path) {
        let geometry = geometry.ok_or_else(|| Error::InvalidParameter {
            name: "geometry",
            value: path.display().to_string(),
            reason: "raw image files need an explicit geometry".into(),
        })?;
        read_raw(path, geometry)
    } else {
        read_tiff(path)
    }
}
