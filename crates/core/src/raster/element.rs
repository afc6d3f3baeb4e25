//! Sample encodings of decoded image components

use crate::error::{Error, Result};

/// How one sample of a component was encoded in the source image.
///
/// Types with a numeric code are the ones headerless raw files can carry;
/// the remaining ones only come out of self-describing formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    /// One byte on disk, interpreted as 0 or 1
    Boolean,
    U8,
    U16,
    I16,
    I32,
    I64,
    F32,
    F64,
    I8,
    U32,
    U64,
}

impl SampleType {
    /// Parse a raw data-type code (0-7)
    pub fn from_code(code: u8) -> Result<Self> {
        let ty = match code {
            0 => Self::Boolean,
            1 => Self::U8,
            2 => Self::U16,
            3 => Self::I16,
            4 => Self::I32,
            5 => Self::I64,
            6 => Self::F32,
            7 => Self::F64,
            _ => {
                return Err(Error::InvalidParameter {
                    name: "sample_type",
                    value: code.to_string(),
                    reason: "must be between 0 and 7".into(),
                });
            }
        };
        Ok(ty)
    }

    /// Raw data-type code of this sample type, if raw files can hold it
    pub fn code(self) -> Option<u8> {
        let code = match self {
            Self::Boolean => 0,
            Self::U8 => 1,
            Self::U16 => 2,
            Self::I16 => 3,
            Self::I32 => 4,
            Self::I64 => 5,
            Self::F32 => 6,
            Self::F64 => 7,
            Self::I8 | Self::U32 | Self::U64 => return None,
        };
        Some(code)
    }

    /// Number of significant bits of one sample
    pub fn bit_depth(self) -> u32 {
        match self {
            Self::Boolean => 1,
            Self::U8 | Self::I8 => 8,
            Self::U16 | Self::I16 => 16,
            Self::I32 | Self::U32 | Self::F32 => 32,
            Self::I64 | Self::U64 | Self::F64 => 64,
        }
    }

    /// Bytes one sample occupies in a raw file
    pub fn bytes_per_sample(self) -> usize {
        match self {
            Self::Boolean | Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }

    /// Whether negative values are representable
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::F32 | Self::F64
        )
    }

    /// Whether samples fit the fixed 0..=255 histogram domain
    pub fn is_byte(self) -> bool {
        self == Self::U8
    }
}

impl std::fmt::Display for SampleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Boolean => "boolean",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::I8 => "i8",
            Self::U32 => "u32",
            Self::U64 => "u64",
        };
        f.write_str(name)
    }
}
