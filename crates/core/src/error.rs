//! Error types for rasterstat

use thiserror::Error;

/// Main error type for rasterstat operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid image dimensions: {bands}x{rows}x{cols}")]
    InvalidDimensions {
        bands: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Band {band} out of range (image has {bands} bands)")]
    BandOutOfRange { band: usize, bands: usize },

    #[error("Index out of bounds: ({band}, {row}, {col}) in image of size {shape:?}")]
    IndexOutOfBounds {
        band: usize,
        row: usize,
        col: usize,
        shape: (usize, usize, usize),
    },

    #[error("Sample buffer size mismatch: expected {expected} samples, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error(
        "Band {band} has {bit_depth}-bit {} samples; only 8-bit unsigned samples are supported",
        signedness(.signed)
    )]
    UnsupportedBitDepth {
        band: usize,
        bit_depth: u32,
        signed: bool,
    },

    #[error(
        "Sample bit depth differs between bands ({first} bits in band 0, {other} bits in band {band})"
    )]
    HeterogeneousBitDepth { first: u32, other: u32, band: usize },

    #[error("Unrecognized rate kind: {0}")]
    UnrecognizedRateKind(i64),

    #[error("At least one value must be selected")]
    EmptyValueSelection,

    #[error("Value {0} out of range (must be between 0 and 255)")]
    ValueOutOfRange(i64),

    #[error("Sample {value} in band {band} is outside the 0..=255 domain")]
    SampleOutOfDomain { band: usize, value: f64 },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

fn signedness(signed: &bool) -> &'static str {
    if *signed { "signed" } else { "unsigned" }
}

/// Result type alias for rasterstat operations
pub type Result<T> = std::result::Result<T, Error>;
