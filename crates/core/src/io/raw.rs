//! Headerless raw image reading
//!
//! Raw files carry no metadata: the caller supplies the geometry. Samples are
//! stored band-sequentially (every row of band 0, then band 1, ...).

use crate::error::{Error, Result};
use crate::raster::{SampleBuffer, SampleType};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

/// Byte order of multi-byte samples in a raw file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    BigEndian,
    LittleEndian,
}

impl ByteOrder {
    /// Parse a byte order code: 0 big endian, 1 little endian
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::BigEndian),
            1 => Ok(Self::LittleEndian),
            _ => Err(Error::InvalidParameter {
                name: "byte_order",
                value: code.to_string(),
                reason: "must be 0 (big endian) or 1 (little endian)".into(),
            }),
        }
    }
}

/// Geometry of a raw image file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawGeometry {
    pub bands: usize,
    pub rows: usize,
    pub cols: usize,
    pub sample_type: SampleType,
    pub byte_order: ByteOrder,
}

impl RawGeometry {
    /// Build a geometry from the five numeric codes
    /// `bands rows cols sample_type byte_order`
    pub fn from_codes(codes: [u64; 5]) -> Result<Self> {
        let [bands, rows, cols, sample_type, byte_order] = codes;
        let geometry = Self {
            bands: dimension("bands", bands)?,
            rows: dimension("rows", rows)?,
            cols: dimension("cols", cols)?,
            sample_type: SampleType::from_code(code_u8("sample_type", sample_type)?)?,
            byte_order: ByteOrder::from_code(code_u8("byte_order", byte_order)?)?,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Check that all dimensions are positive and the file size fits `usize`
    pub fn validate(&self) -> Result<()> {
        if self.bands == 0 || self.rows == 0 || self.cols == 0 {
            return Err(self.invalid());
        }
        self.byte_len().map(|_| ())
    }

    /// Number of samples described by this geometry
    pub fn sample_count(&self) -> Result<usize> {
        self.bands
            .checked_mul(self.rows)
            .and_then(|n| n.checked_mul(self.cols))
            .ok_or_else(|| self.invalid())
    }

    /// Number of bytes a file with this geometry must hold
    pub fn byte_len(&self) -> Result<usize> {
        self.sample_count()?
            .checked_mul(self.sample_type.bytes_per_sample())
            .ok_or_else(|| self.invalid())
    }

    fn invalid(&self) -> Error {
        Error::InvalidDimensions {
            bands: self.bands,
            rows: self.rows,
            cols: self.cols,
        }
    }
}

fn dimension(name: &'static str, value: u64) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::InvalidParameter {
        name,
        value: value.to_string(),
        reason: "dimension does not fit in memory".into(),
    })
}

fn code_u8(name: &'static str, code: u64) -> Result<u8> {
    u8::try_from(code).map_err(|_| Error::InvalidParameter {
        name,
        value: code.to_string(),
        reason: "code out of range".into(),
    })
}

/// Read a raw image file into a SampleBuffer
pub fn read_raw<P: AsRef<Path>>(path: P, geometry: &RawGeometry) -> Result<SampleBuffer> {
    let bytes = fs::read(path.as_ref())?;
    read_raw_from_buffer(&bytes, geometry)
}

/// Decode raw image bytes into a SampleBuffer
///
/// Trailing bytes beyond the geometry are ignored.
pub fn read_raw_from_buffer(data: &[u8], geometry: &RawGeometry) -> Result<SampleBuffer> {
    geometry.validate()?;

    let expected = geometry.byte_len()?;
    if data.len() < expected {
        return Err(Error::SizeMismatch {
            expected,
            actual: data.len(),
        });
    }

    let samples = match geometry.byte_order {
        ByteOrder::BigEndian => decode_samples::<BigEndian>(data, geometry)?,
        ByteOrder::LittleEndian => decode_samples::<LittleEndian>(data, geometry)?,
    };

    SampleBuffer::from_vec(
        samples,
        (geometry.bands, geometry.rows, geometry.cols),
        geometry.sample_type,
    )
}

fn decode_samples<B: byteorder::ByteOrder>(
    data: &[u8],
    geometry: &RawGeometry,
) -> Result<Vec<f64>> {
    let count = geometry.sample_count()?;
    let mut cursor = Cursor::new(data);
    let mut samples = Vec::with_capacity(count);

    for _ in 0..count {
        let value = read_sample::<B, _>(&mut cursor, geometry.sample_type)?;
        samples.push(value);
    }

    Ok(samples)
}

fn read_sample<B: byteorder::ByteOrder, R: Read>(reader: &mut R, ty: SampleType) -> Result<f64> {
    let value = match ty {
        SampleType::Boolean => {
            if reader.read_u8()? == 0 {
                0.0
            } else {
                1.0
            }
        }
        SampleType::U8 => reader.read_u8()? as f64,
        SampleType::I8 => reader.read_i8()? as f64,
        SampleType::U16 => reader.read_u16::<B>()? as f64,
        SampleType::I16 => reader.read_i16::<B>()? as f64,
        SampleType::U32 => reader.read_u32::<B>()? as f64,
        SampleType::I32 => reader.read_i32::<B>()? as f64,
        SampleType::U64 => reader.read_u64::<B>()? as f64,
        SampleType::I64 => reader.read_i64::<B>()? as f64,
        SampleType::F32 => reader.read_f32::<B>()? as f64,
        SampleType::F64 => reader.read_f64::<B>()?,
    };
    Ok(value)
}
