//! # rasterstat algorithms
//!
//! Statistics of multi-band images.
//!
//! ## Modules
//!
//! - **statistics**: min/max, mean, center range, histograms, energy,
//!   variance and entropy, per band and pooled over all bands
//! - **rate**: compressed size estimates from compression factors, ratios or
//!   bits per sample
//! - **format**: exact decimal rendering of statistic values

pub mod format;
mod maybe_rayon;
pub mod rate;
pub mod statistics;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::format::{format_decimal, DecimalFormat, DEFAULT_FRACTION_DIGITS};
    pub use crate::rate::{RateDescriptor, RateEstimator, RateKind};
    pub use crate::statistics::{
        BandStatistics, Histogram, HistogramPooling, ImageStatistics, ValueDistribution,
    };
    pub use rasterstat_core::prelude::*;
}
