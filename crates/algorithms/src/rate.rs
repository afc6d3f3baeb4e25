//! Compressed size estimation
//!
//! Estimates how many bytes an image would occupy when compressed to a given
//! compression factor, compression ratio or bits-per-sample figure. Only the
//! image geometry and sample bit depth are used, never the sample values.

use rasterstat_core::{Error, Result, SampleBuffer};

/// How a target compression level is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateKind {
    /// Original size / compressed size
    CompressionFactor,
    /// Compressed size / original size
    CompressionRatio,
    /// Bits spent on each sample of the compressed image
    BitsPerSample,
}

impl RateKind {
    /// Parse a rate kind code
    ///
    /// `0` disables estimation and yields `None`; `1`, `2` and `3` select
    /// factor, ratio and bits per sample.
    pub fn from_code(code: i64) -> Result<Option<Self>> {
        match code {
            0 => Ok(None),
            1 => Ok(Some(Self::CompressionFactor)),
            2 => Ok(Some(Self::CompressionRatio)),
            3 => Ok(Some(Self::BitsPerSample)),
            _ => Err(Error::UnrecognizedRateKind(code)),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::CompressionFactor => 1,
            Self::CompressionRatio => 2,
            Self::BitsPerSample => 3,
        }
    }
}

/// A target compression level
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateDescriptor {
    CompressionFactor(f64),
    CompressionRatio(f64),
    BitsPerSample(f64),
}

impl RateDescriptor {
    pub fn new(kind: RateKind, value: f64) -> Self {
        match kind {
            RateKind::CompressionFactor => Self::CompressionFactor(value),
            RateKind::CompressionRatio => Self::CompressionRatio(value),
            RateKind::BitsPerSample => Self::BitsPerSample(value),
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            Self::CompressionFactor(v) | Self::CompressionRatio(v) | Self::BitsPerSample(v) => v,
        }
    }
}

/// Size estimator for one image geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateEstimator {
    bit_depth: u32,
    samples: u64,
}

impl RateEstimator {
    /// Build an estimator from per-band bit depths and the band dimensions
    ///
    /// Every band must share one bit depth.
    pub fn new(bit_depths: &[u32], rows: usize, cols: usize) -> Result<Self> {
        let Some(&first) = bit_depths.first() else {
            return Err(Error::InvalidDimensions {
                bands: 0,
                rows,
                cols,
            });
        };

        if let Some((band, &other)) = bit_depths
            .iter()
            .enumerate()
            .find(|(_, d)| **d != first)
        {
            return Err(Error::HeterogeneousBitDepth { first, other, band });
        }

        Ok(Self {
            bit_depth: first,
            samples: (bit_depths.len() * rows * cols) as u64,
        })
    }

    /// Build an estimator for a sample buffer's geometry
    pub fn for_buffer(buffer: &SampleBuffer) -> Result<Self> {
        Self::new(&buffer.bit_depths(), buffer.rows(), buffer.cols())
    }

    /// Size of the uncompressed image in bytes (rounded down)
    pub fn original_bytes(&self) -> u64 {
        self.bit_depth as u64 * self.samples / 8
    }

    /// Estimated compressed size in bytes (rounded down)
    pub fn estimate(&self, descriptor: RateDescriptor) -> Result<u64> {
        let value = descriptor.value();
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidParameter {
                name: "rate",
                value: value.to_string(),
                reason: "must be a finite, non-negative number".into(),
            });
        }

        let original = self.original_bytes() as f64;
        let bytes = match descriptor {
            RateDescriptor::CompressionFactor(f) => {
                if f == 0.0 {
                    return Err(Error::InvalidParameter {
                        name: "rate",
                        value: f.to_string(),
                        reason: "compression factor must be positive".into(),
                    });
                }
                original / f
            }
            RateDescriptor::CompressionRatio(f) => original * f,
            RateDescriptor::BitsPerSample(b) => b * self.samples as f64 / 8.0,
        };

        Ok(bytes.floor() as u64)
    }

    /// Estimate every value of one kind, preserving order
    pub fn estimate_all(&self, kind: RateKind, values: &[f64]) -> Result<Vec<u64>> {
        if values.is_empty() {
            return Err(Error::InvalidParameter {
                name: "rate",
                value: String::new(),
                reason: "at least one compression value is required".into(),
            });
        }
        values
            .iter()
            .map(|&v| self.estimate(RateDescriptor::new(kind, v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterstat_core::SampleType;

    #[test]
    fn test_bits_per_sample() {
        let est = RateEstimator::new(&[8], 10, 10).unwrap();
        assert_eq!(est.original_bytes(), 100);
        assert_eq!(est.estimate(RateDescriptor::BitsPerSample(4.0)).unwrap(), 50);
        assert_eq!(est.estimate(RateDescriptor::BitsPerSample(0.3)).unwrap(), 3);
    }

    #[test]
    fn test_factor_and_ratio() {
        let est = RateEstimator::new(&[16, 16, 16], 10, 10).unwrap();
        assert_eq!(est.original_bytes(), 600);
        assert_eq!(
            est.estimate_all(RateKind::CompressionFactor, &[2.0, 7.0]).unwrap(),
            vec![300, 85]
        );
        assert_eq!(
            est.estimate_all(RateKind::CompressionRatio, &[0.5, 0.001]).unwrap(),
            vec![300, 0]
        );
    }

    #[test]
    fn test_factor_roundtrip() {
        let est = RateEstimator::new(&[8, 8, 8], 512, 512).unwrap();
        for f in [1.5, 3.0, 8.0, 20.0] {
            let compressed = est.estimate(RateDescriptor::CompressionFactor(f)).unwrap();
            let reconstructed = est.original_bytes() as f64 / compressed as f64;
            assert!((reconstructed - f).abs() / f < 1e-4, "f={f}, got {reconstructed}");
        }
    }

    #[test]
    fn test_heterogeneous_bit_depth() {
        assert!(matches!(
            RateEstimator::new(&[8, 16], 4, 4),
            Err(Error::HeterogeneousBitDepth {
                first: 8,
                other: 16,
                band: 1
            })
        ));
    }

    #[test]
    fn test_for_buffer() {
        let buffer = SampleBuffer::new(2, 4, 4, SampleType::Boolean).unwrap();
        let est = RateEstimator::for_buffer(&buffer).unwrap();
        assert_eq!(est.original_bytes(), 4);
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(RateKind::from_code(0).unwrap(), None);
        assert_eq!(
            RateKind::from_code(3).unwrap(),
            Some(RateKind::BitsPerSample)
        );
        assert!(matches!(
            RateKind::from_code(4),
            Err(Error::UnrecognizedRateKind(4))
        ));
        assert!(matches!(
            RateKind::from_code(256),
            Err(Error::UnrecognizedRateKind(256))
        ));
        assert!(matches!(
            RateKind::from_code(-1),
            Err(Error::UnrecognizedRateKind(-1))
        ));
    }

    #[test]
    fn test_invalid_values() {
        let est = RateEstimator::new(&[8], 2, 2).unwrap();
        assert!(est.estimate_all(RateKind::BitsPerSample, &[]).is_err());
        assert!(est.estimate(RateDescriptor::CompressionFactor(0.0)).is_err());
        assert!(est.estimate(RateDescriptor::CompressionRatio(-1.0)).is_err());
        assert!(est.estimate(RateDescriptor::BitsPerSample(f64::NAN)).is_err());
    }
}
