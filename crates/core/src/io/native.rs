//! TIFF reading
//!
//! Uses the `tiff` crate. Interleaved (chunky) pixels are split into one band
//! per sample; the decoded sample format decides each band's sample type.

use crate::error::{Error, Result};
use crate::raster::{SampleBuffer, SampleType};
use num_traits::ToPrimitive;
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};

/// Read a TIFF file into a SampleBuffer
///
/// Only the first image of a multi-page file is read.
pub fn read_tiff<P: AsRef<Path>>(path: P) -> Result<SampleBuffer> {
    let file = File::open(path.as_ref())?;
    decode_tiff(BufReader::new(file))
}

/// Read a TIFF from an in-memory buffer into a SampleBuffer
pub fn read_tiff_from_buffer(data: &[u8]) -> Result<SampleBuffer> {
    decode_tiff(Cursor::new(data))
}

/// Internal: decode a TIFF from any `Read + Seek` source
fn decode_tiff<R>(reader: R) -> Result<SampleBuffer>
where
    R: std::io::Read + std::io::Seek,
{
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let (samples, sample_type) = match result {
        DecodingResult::U8(buf) => (widen(&buf), SampleType::U8),
        DecodingResult::U16(buf) => (widen(&buf), SampleType::U16),
        DecodingResult::U32(buf) => (widen(&buf), SampleType::U32),
        DecodingResult::U64(buf) => (widen(&buf), SampleType::U64),
        DecodingResult::I8(buf) => (widen(&buf), SampleType::I8),
        DecodingResult::I16(buf) => (widen(&buf), SampleType::I16),
        DecodingResult::I32(buf) => (widen(&buf), SampleType::I32),
        DecodingResult::I64(buf) => (widen(&buf), SampleType::I64),
        DecodingResult::F32(buf) => (widen(&buf), SampleType::F32),
        DecodingResult::F64(buf) => (widen(&buf), SampleType::F64),
        #[allow(unreachable_patterns)]
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF sample format".to_string(),
            ));
        }
    };

    let pixels = rows * cols;
    if pixels == 0 || samples.len() % pixels != 0 {
        return Err(Error::SizeMismatch {
            expected: pixels,
            actual: samples.len(),
        });
    }
    let bands = samples.len() / pixels;

    SampleBuffer::from_vec(deinterleave(&samples, bands), (bands, rows, cols), sample_type)
}

fn widen<V: ToPrimitive>(buf: &[V]) -> Vec<f64> {
    buf.iter().map(|v| v.to_f64().unwrap_or(f64::NAN)).collect()
}

/// Reorder pixel-interleaved samples into band-sequential order
fn deinterleave(samples: &[f64], bands: usize) -> Vec<f64> {
    if bands == 1 {
        return samples.to_vec();
    }

    let pixels = samples.len() / bands;
    let mut out = vec![0.0; samples.len()];
    for (i, pixel) in samples.chunks_exact(bands).enumerate() {
        for (z, &v) in pixel.iter().enumerate() {
            out[z * pixels + i] = v;
        }
    }
    out
}
