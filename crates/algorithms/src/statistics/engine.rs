//! Per-band and whole-image statistics of a sample buffer
//!
//! [`ImageStatistics`] borrows a [`SampleBuffer`] and answers independent,
//! side-effect free queries. Per-band min/max/sum/sum-of-squares are computed
//! once, on first use, in a single pass per band (in parallel across bands
//! when the `parallel` feature is enabled). Variance and entropy are computed
//! on request.
//!
//! Whole-image ("total") statistics pool the samples of every band: the total
//! variance uses the pooled mean and the total entropy the pooled value
//! distribution, rather than averaging per-band results.

use std::sync::OnceLock;

use crate::maybe_rayon::*;
use crate::statistics::entropy::ValueDistribution;
use crate::statistics::histogram::{
    require_byte_band, require_byte_image, validate_values, Histogram, HistogramPooling,
};
use crate::statistics::moments::{squared_deviation, Moments};
use ndarray::Axis;
use rasterstat_core::{Result, SampleBuffer};

/// Every statistic of one band, or of the pooled image
#[derive(Debug, Clone, PartialEq)]
pub struct BandStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Midpoint of `[min, max]`
    pub center_range: f64,
    /// Present only for 8-bit unsigned samples
    pub histogram: Option<Histogram>,
    /// Sum of squared samples
    pub energy: f64,
    /// Population variance
    pub variance: f64,
    /// Shannon entropy in bits
    pub entropy: f64,
}

/// Statistics engine over a borrowed sample buffer
///
/// # Example
///
/// ```ignore
/// let stats = ImageStatistics::new(&buffer);
/// let (min, max) = stats.min_max(0)?;
/// let pooled_variance = stats.total_variance();
/// ```
#[derive(Debug)]
pub struct ImageStatistics<'a> {
    buffer: &'a SampleBuffer,
    moments: OnceLock<Vec<Moments>>,
}

impl<'a> ImageStatistics<'a> {
    pub fn new(buffer: &'a SampleBuffer) -> Self {
        Self {
            buffer,
            moments: OnceLock::new(),
        }
    }

    /// The analysed buffer
    pub fn buffer(&self) -> &'a SampleBuffer {
        self.buffer
    }

    /// Number of bands
    pub fn bands(&self) -> usize {
        self.buffer.bands()
    }

    fn band_moments(&self) -> &[Moments] {
        self.moments.get_or_init(|| {
            let buffer = self.buffer;
            (0..buffer.bands())
                .into_par_iter()
                .map(|z| Moments::from_band(buffer.view().index_axis_move(Axis(0), z)))
                .collect()
        })
    }

    fn moments(&self, band: usize) -> Result<&Moments> {
        self.buffer.check_band(band)?;
        Ok(&self.band_moments()[band])
    }

    fn total_moments(&self) -> Moments {
        Moments::pooled(self.band_moments())
    }

    // Range

    /// `(min, max)` of one band
    pub fn min_max(&self, band: usize) -> Result<(f64, f64)> {
        let m = self.moments(band)?;
        Ok((m.min, m.max))
    }

    /// `(min, max)` over all bands
    pub fn total_min_max(&self) -> (f64, f64) {
        let m = self.total_moments();
        (m.min, m.max)
    }

    /// Midpoint of one band's observed range
    pub fn center_range(&self, band: usize) -> Result<f64> {
        Ok(self.moments(band)?.center_range())
    }

    /// Midpoint of the observed range over all bands
    pub fn total_center_range(&self) -> f64 {
        self.total_moments().center_range()
    }

    // Mean and energy

    /// Arithmetic mean of one band
    pub fn mean(&self, band: usize) -> Result<f64> {
        Ok(self.moments(band)?.mean())
    }

    /// Arithmetic mean of every sample in the image
    pub fn total_mean(&self) -> f64 {
        self.total_moments().mean()
    }

    /// Sum of squared samples of one band
    pub fn energy(&self, band: usize) -> Result<f64> {
        Ok(self.moments(band)?.energy())
    }

    /// Sum of the band energies
    pub fn total_energy(&self) -> f64 {
        self.total_moments().energy()
    }

    // Variance

    /// Population variance of one band (two-pass)
    pub fn variance(&self, band: usize) -> Result<f64> {
        let m = self.moments(band)?;
        let view = self.buffer.band(band)?;
        Ok(squared_deviation(view, m.mean()) / m.count as f64)
    }

    /// Population variance of all samples around the pooled mean
    pub fn total_variance(&self) -> f64 {
        let total = self.total_moments();
        let mean = total.mean();
        let buffer = self.buffer;

        let partials: Vec<f64> = (0..buffer.bands())
            .into_par_iter()
            .map(|z| squared_deviation(buffer.view().index_axis_move(Axis(0), z), mean))
            .collect();

        partials.iter().sum::<f64>() / total.count as f64
    }

    // Entropy

    /// Shannon entropy of one band's value distribution
    pub fn entropy(&self, band: usize) -> Result<f64> {
        Ok(ValueDistribution::from_band(self.buffer.band(band)?).entropy())
    }

    /// Shannon entropy of the pooled value distribution
    pub fn total_entropy(&self) -> f64 {
        self.pooled_distribution().entropy()
    }

    fn pooled_distribution(&self) -> ValueDistribution {
        let buffer = self.buffer;
        let parts: Vec<ValueDistribution> = (0..buffer.bands())
            .into_par_iter()
            .map(|z| ValueDistribution::from_band(buffer.view().index_axis_move(Axis(0), z)))
            .collect();

        let mut pooled = ValueDistribution::default();
        for part in &parts {
            pooled.merge(part);
        }
        pooled
    }

    // Histograms

    /// Occurrence counts of 0..=255 in one 8-bit unsigned band
    pub fn histogram(&self, band: usize) -> Result<Histogram> {
        require_byte_band(self.buffer, band)?;
        Histogram::from_band(self.buffer.band(band)?, band)
    }

    /// Whole-image histogram; every band must be 8-bit unsigned
    pub fn total_histogram(&self, pooling: HistogramPooling) -> Result<Histogram> {
        require_byte_image(self.buffer)?;
        match pooling {
            HistogramPooling::FirstBand => self.histogram(0),
            HistogramPooling::Sum => {
                let mut total = Histogram::default();
                for z in 0..self.bands() {
                    total.merge(&self.histogram(z)?);
                }
                Ok(total)
            }
        }
    }

    /// Occurrences of each selected value in one band
    pub fn value_counts(&self, band: usize, values: &[i64]) -> Result<Vec<(u8, u64)>> {
        let values = validate_values(values)?;
        let hist = self.histogram(band)?;
        Ok(values.into_iter().map(|v| (v, hist.count(v))).collect())
    }

    /// Whole-image occurrences of each selected value
    pub fn total_value_counts(
        &self,
        values: &[i64],
        pooling: HistogramPooling,
    ) -> Result<Vec<(u8, u64)>> {
        let values = validate_values(values)?;
        let hist = self.total_histogram(pooling)?;
        Ok(values.into_iter().map(|v| (v, hist.count(v))).collect())
    }

    /// Share of one band's samples equal to each selected value, in percent
    pub fn value_percentages(&self, band: usize, values: &[i64]) -> Result<Vec<(u8, f64)>> {
        let values = validate_values(values)?;
        let hist = self.histogram(band)?;
        let population = self.buffer.band_len() as u64;
        Ok(values
            .into_iter()
            .map(|v| (v, hist.percentage(v, population)))
            .collect())
    }

    /// Share of all samples equal to each selected value, in percent
    ///
    /// The population is always the whole image, also for
    /// [`HistogramPooling::FirstBand`].
    pub fn total_value_percentages(
        &self,
        values: &[i64],
        pooling: HistogramPooling,
    ) -> Result<Vec<(u8, f64)>> {
        let values = validate_values(values)?;
        let hist = self.total_histogram(pooling)?;
        let population = self.buffer.len() as u64;
        Ok(values
            .into_iter()
            .map(|v| (v, hist.percentage(v, population)))
            .collect())
    }

    // Records

    /// Every statistic of one band
    pub fn band_statistics(&self, band: usize) -> Result<BandStatistics> {
        let m = *self.moments(band)?;
        let histogram = if self.buffer.sample_type(band)?.is_byte() {
            Some(self.histogram(band)?)
        } else {
            None
        };

        Ok(BandStatistics {
            min: m.min,
            max: m.max,
            mean: m.mean(),
            center_range: m.center_range(),
            histogram,
            energy: m.energy(),
            variance: self.variance(band)?,
            entropy: self.entropy(band)?,
        })
    }

    /// Every statistic of each band, in band order
    pub fn all_band_statistics(&self) -> Result<Vec<BandStatistics>> {
        (0..self.bands()).map(|z| self.band_statistics(z)).collect()
    }

    /// Every statistic of the pooled image
    ///
    /// The histogram is present only when every band is 8-bit unsigned.
    pub fn total_statistics(&self, pooling: HistogramPooling) -> Result<BandStatistics> {
        let m = self.total_moments();
        let histogram = if self.buffer.is_byte_image() {
            Some(self.total_histogram(pooling)?)
        } else {
            None
        };

        Ok(BandStatistics {
            min: m.min,
            max: m.max,
            mean: m.mean(),
            center_range: m.center_range(),
            histogram,
            energy: m.energy(),
            variance: self.total_variance(),
            entropy: self.total_entropy(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterstat_core::{Error, SampleType};

    fn byte_buffer(data: Vec<f64>, shape: (usize, usize, usize)) -> SampleBuffer {
        SampleBuffer::from_vec(data, shape, SampleType::U8).unwrap()
    }

    #[test]
    fn test_single_band_scenario() {
        let buffer = byte_buffer(vec![1.0, 1.0, 2.0, 2.0], (1, 2, 2));
        let stats = ImageStatistics::new(&buffer);

        assert_eq!(stats.min_max(0).unwrap(), (1.0, 2.0));
        assert_eq!(stats.mean(0).unwrap(), 1.5);
        assert_eq!(stats.center_range(0).unwrap(), 1.5);
        assert_eq!(stats.energy(0).unwrap(), 10.0);
        assert_eq!(stats.variance(0).unwrap(), 0.25);
        assert_eq!(stats.entropy(0).unwrap(), 1.0);

        let hist = stats.histogram(0).unwrap();
        assert_eq!(hist.occupied().collect::<Vec<_>>(), vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn test_histogram_requires_byte_band() {
        let buffer = SampleBuffer::new(1, 2, 2, SampleType::U16).unwrap();
        let stats = ImageStatistics::new(&buffer);
        assert!(matches!(
            stats.histogram(0),
            Err(Error::UnsupportedBitDepth { bit_depth: 16, .. })
        ));
        assert!(stats.value_counts(0, &[1]).is_err());
        // non-histogram statistics still work
        assert_eq!(stats.entropy(0).unwrap(), 0.0);
    }

    #[test]
    fn test_band_out_of_range() {
        let buffer = byte_buffer(vec![0.0; 4], (1, 2, 2));
        let stats = ImageStatistics::new(&buffer);
        assert!(matches!(
            stats.mean(1),
            Err(Error::BandOutOfRange { band: 1, bands: 1 })
        ));
        assert!(stats.variance(3).is_err());
        assert!(stats.entropy(3).is_err());
    }

    #[test]
    fn test_totals_pool_samples() {
        // band 0: 0 0 0 0, band 1: 4 4 4 4
        let buffer = byte_buffer(vec![0.0, 0.0, 0.0, 0.0, 4.0, 4.0, 4.0, 4.0], (2, 2, 2));
        let stats = ImageStatistics::new(&buffer);

        assert_eq!(stats.total_min_max(), (0.0, 4.0));
        assert_eq!(stats.total_mean(), 2.0);
        assert_eq!(stats.total_center_range(), 2.0);
        assert_eq!(stats.total_energy(), 64.0);

        // per-band variances are 0, the pooled variance is not
        assert_eq!(stats.variance(0).unwrap(), 0.0);
        assert_eq!(stats.variance(1).unwrap(), 0.0);
        assert_eq!(stats.total_variance(), 4.0);

        assert_eq!(stats.entropy(0).unwrap(), 0.0);
        assert_eq!(stats.total_entropy(), 1.0);
    }

    #[test]
    fn test_total_histogram_pooling() {
        let buffer = byte_buffer(vec![1.0, 1.0, 2.0, 2.0, 2.0, 2.0, 3.0, 3.0], (2, 2, 2));
        let stats = ImageStatistics::new(&buffer);

        let summed = stats.total_histogram(HistogramPooling::Sum).unwrap();
        assert_eq!(summed.count(2), 4);
        assert_eq!(summed.total(), 8);

        let first = stats.total_histogram(HistogramPooling::FirstBand).unwrap();
        assert_eq!(first.count(2), 2);
        assert_eq!(first.count(3), 0);
    }

    #[test]
    fn test_value_counts_and_percentages() {
        let buffer = byte_buffer(vec![1.0, 1.0, 2.0, 2.0, 2.0, 2.0, 2.0, 9.0], (2, 2, 2));
        let stats = ImageStatistics::new(&buffer);

        assert_eq!(stats.value_counts(1, &[2, 9, 0]).unwrap(), vec![(2, 3), (9, 1), (0, 0)]);
        assert_eq!(stats.value_percentages(0, &[1]).unwrap(), vec![(1, 50.0)]);
        assert_eq!(
            stats.total_value_counts(&[2], HistogramPooling::Sum).unwrap(),
            vec![(2, 5)]
        );
        assert_eq!(
            stats.total_value_percentages(&[2], HistogramPooling::Sum).unwrap(),
            vec![(2, 62.5)]
        );

        assert!(matches!(stats.value_counts(0, &[]), Err(Error::EmptyValueSelection)));
        assert!(matches!(
            stats.value_counts(0, &[256]),
            Err(Error::ValueOutOfRange(256))
        ));
    }

    #[test]
    fn test_band_statistics_record() {
        let buffer = SampleBuffer::from_bands(vec![
            (ndarray::array![[1.0, 1.0], [2.0, 2.0]], SampleType::U8),
            (ndarray::array![[1000.0, 2000.0], [3000.0, 4000.0]], SampleType::U16),
        ])
        .unwrap();
        let stats = ImageStatistics::new(&buffer);

        let all = stats.all_band_statistics().unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].histogram.is_some());
        assert!(all[1].histogram.is_none());
        assert_eq!(all[1].entropy, 2.0);

        let total = stats.total_statistics(HistogramPooling::Sum).unwrap();
        assert!(total.histogram.is_none());
        assert_eq!(total.min, 1.0);
        assert_eq!(total.max, 4000.0);
    }

    #[test]
    fn test_repeated_calls_identical() {
        let data: Vec<f64> = (0..300).map(|i| ((i * 37) % 101) as f64 * 0.1).collect();
        let buffer = SampleBuffer::from_vec(data, (3, 10, 10), SampleType::F32).unwrap();
        let stats = ImageStatistics::new(&buffer);
        assert_eq!(stats.total_variance(), stats.total_variance());
        assert_eq!(stats.total_entropy(), stats.total_entropy());
        assert_eq!(stats.variance(2).unwrap(), stats.variance(2).unwrap());
    }
}
