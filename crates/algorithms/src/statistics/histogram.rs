//! Value-occurrence histograms over the 8-bit unsigned domain

use ndarray::ArrayView2;
use rasterstat_core::{Error, Result, SampleBuffer};

/// Number of bins of a byte histogram
pub const BYTE_BINS: usize = 256;

/// How the whole-image histogram is assembled for multi-band images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistogramPooling {
    /// Sum the counts of every band
    #[default]
    Sum,
    /// Report band 0's counts as the total (legacy reports)
    FirstBand,
}

/// Occurrence counts of the values 0..=255
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: [u64; BYTE_BINS],
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            counts: [0; BYTE_BINS],
        }
    }
}

impl Histogram {
    /// Count the samples of one band
    ///
    /// Samples are rounded to the nearest integer. `band_index` only labels
    /// the error for samples outside 0..=255.
    pub fn from_band(band: ArrayView2<'_, f64>, band_index: usize) -> Result<Self> {
        let mut hist = Self::default();
        for &v in band.iter() {
            let bin = v.round();
            if !(0.0..=255.0).contains(&bin) {
                return Err(Error::SampleOutOfDomain {
                    band: band_index,
                    value: v,
                });
            }
            hist.counts[bin as usize] += 1;
        }
        Ok(hist)
    }

    /// Add another histogram's counts to this one
    pub fn merge(&mut self, other: &Histogram) {
        for (a, b) in self.counts.iter_mut().zip(other.counts.iter()) {
            *a += b;
        }
    }

    /// Occurrences of `value`
    pub fn count(&self, value: u8) -> u64 {
        self.counts[value as usize]
    }

    /// All 256 counts, indexed by value
    pub fn counts(&self) -> &[u64; BYTE_BINS] {
        &self.counts
    }

    /// Total number of counted samples
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// `(value, count)` pairs for values that occur at least once
    pub fn occupied(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(|(v, &c)| (v as u8, c))
    }

    /// Share of samples equal to `value`, in percent of `population`
    pub fn percentage(&self, value: u8, population: u64) -> f64 {
        if population == 0 {
            return 0.0;
        }
        self.count(value) as f64 * 100.0 / population as f64
    }
}

/// Fail unless `band` of `buffer` holds 8-bit unsigned samples
pub fn require_byte_band(buffer: &SampleBuffer, band: usize) -> Result<()> {
    let ty = buffer.sample_type(band)?;
    if !ty.is_byte() {
        return Err(Error::UnsupportedBitDepth {
            band,
            bit_depth: ty.bit_depth(),
            signed: ty.is_signed(),
        });
    }
    Ok(())
}

/// Fail unless every band of `buffer` holds 8-bit unsigned samples
pub fn require_byte_image(buffer: &SampleBuffer) -> Result<()> {
    (0..buffer.bands()).try_for_each(|z| require_byte_band(buffer, z))
}

/// Validate a selection of values for value-count statistics
///
/// The selection must be non-empty and every value must lie in 0..=255.
/// Order and duplicates are preserved.
pub fn validate_values(values: &[i64]) -> Result<Vec<u8>> {
    if values.is_empty() {
        return Err(Error::EmptyValueSelection);
    }
    values
        .iter()
        .map(|&v| u8::try_from(v).map_err(|_| Error::ValueOutOfRange(v)))
        .collect()
}
