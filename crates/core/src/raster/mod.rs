//! Decoded sample storage

mod buffer;
mod element;

pub use buffer::SampleBuffer;
pub use element::SampleType;
