//! Descriptive statistics of multi-band sample buffers
//!
//! - **engine**: per-band and pooled statistics over a sample buffer
//! - **moments**: single-pass min/max/sum/energy accumulation
//! - **histogram**: 8-bit value-occurrence counts
//! - **entropy**: Shannon entropy of observed value distributions

pub mod engine;
pub mod entropy;
pub mod histogram;
pub mod moments;

pub use engine::{BandStatistics, ImageStatistics};
pub use entropy::ValueDistribution;
pub use histogram::{validate_values, Histogram, HistogramPooling, BYTE_BINS};
pub use moments::Moments;
