//! Main SampleBuffer type

use crate::error::{Error, Result};
use crate::raster::SampleType;
use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis};

/// Decoded samples of a multi-band image.
///
/// Samples are stored as `f64` in a `(band, row, col)` grid. Every band
/// remembers how its samples were encoded in the source image, which decides
/// the value domain available to histogram statistics.
///
/// # Example
///
/// ```ignore
/// use rasterstat_core::{SampleBuffer, SampleType};
///
/// // One 2x2 byte band
/// let buffer = SampleBuffer::from_vec(vec![1.0, 1.0, 2.0, 2.0], (1, 2, 2), SampleType::U8)?;
/// assert_eq!(buffer.bit_depth(0)?, 8);
/// ```
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    /// Samples indexed (band, row, col)
    data: Array3<f64>,
    /// Source encoding of each band
    sample_types: Vec<SampleType>,
}

impl SampleBuffer {
    /// Create a buffer filled with zeros, every band sharing one sample type
    pub fn new(bands: usize, rows: usize, cols: usize, sample_type: SampleType) -> Result<Self> {
        check_dimensions(bands, rows, cols)?;
        Ok(Self {
            data: Array3::zeros((bands, rows, cols)),
            sample_types: vec![sample_type; bands],
        })
    }

    /// Create a buffer from band-sequential data
    pub fn from_vec(
        data: Vec<f64>,
        shape: (usize, usize, usize),
        sample_type: SampleType,
    ) -> Result<Self> {
        let (bands, rows, cols) = shape;
        let expected = check_dimensions(bands, rows, cols)?;
        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        let array =
            Array3::from_shape_vec(shape, data).map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self {
            data: array,
            sample_types: vec![sample_type; bands],
        })
    }

    /// Create a buffer from an ndarray with one sample type per band
    pub fn from_array(data: Array3<f64>, sample_types: Vec<SampleType>) -> Result<Self> {
        let (bands, rows, cols) = data.dim();
        check_dimensions(bands, rows, cols)?;

        if sample_types.len() != bands {
            return Err(Error::SizeMismatch {
                expected: bands,
                actual: sample_types.len(),
            });
        }

        Ok(Self { data, sample_types })
    }

    /// Stack equally sized 2D bands into one buffer
    pub fn from_bands(bands: Vec<(Array2<f64>, SampleType)>) -> Result<Self> {
        let Some((first, _)) = bands.first() else {
            return Err(Error::InvalidDimensions {
                bands: 0,
                rows: 0,
                cols: 0,
            });
        };
        let (rows, cols) = first.dim();

        let mut data = Array3::zeros((bands.len(), rows, cols));
        let mut sample_types = Vec::with_capacity(bands.len());

        for (z, (band, sample_type)) in bands.into_iter().enumerate() {
            if band.dim() != (rows, cols) {
                return Err(Error::SizeMismatch {
                    expected: rows * cols,
                    actual: band.len(),
                });
            }
            data.index_axis_mut(Axis(0), z).assign(&band);
            sample_types.push(sample_type);
        }

        Self::from_array(data, sample_types)
    }

    // Dimensions

    /// Number of bands (components)
    pub fn bands(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// Dimensions as (bands, rows, cols)
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Samples in one band
    pub fn band_len(&self) -> usize {
        self.rows() * self.cols()
    }

    /// Samples in the whole buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false: construction rejects zero-sized dimensions
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Get the sample at (band, row, col)
    pub fn get(&self, band: usize, row: usize, col: usize) -> Result<f64> {
        self.data
            .get((band, row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                band,
                row,
                col,
                shape: self.shape(),
            })
    }

    /// View of one band
    pub fn band(&self, band: usize) -> Result<ArrayView2<'_, f64>> {
        self.check_band(band)?;
        Ok(self.data.index_axis(Axis(0), band))
    }

    /// View of all samples
    pub fn view(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }

    /// Iterate over every sample, band by band
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().copied()
    }

    // Metadata

    /// Sample type of one band
    pub fn sample_type(&self, band: usize) -> Result<SampleType> {
        self.check_band(band)?;
        Ok(self.sample_types[band])
    }

    /// Sample types of all bands
    pub fn sample_types(&self) -> &[SampleType] {
        &self.sample_types
    }

    /// Bit depth of one band
    pub fn bit_depth(&self, band: usize) -> Result<u32> {
        Ok(self.sample_type(band)?.bit_depth())
    }

    /// Bit depths of all bands
    pub fn bit_depths(&self) -> Vec<u32> {
        self.sample_types.iter().map(|t| t.bit_depth()).collect()
    }

    /// Whether every band holds 8-bit unsigned samples
    pub fn is_byte_image(&self) -> bool {
        self.sample_types.iter().all(|t| t.is_byte())
    }

    /// Fail unless `band` indexes an existing band
    pub fn check_band(&self, band: usize) -> Result<()> {
        if band >= self.bands() {
            return Err(Error::BandOutOfRange {
                band,
                bands: self.bands(),
            });
        }
        Ok(())
    }
}

/// Reject empty shapes and shapes whose sample count overflows `usize`
///
/// Returns the sample count.
fn check_dimensions(bands: usize, rows: usize, cols: usize) -> Result<usize> {
    if bands == 0 || rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions { bands, rows, cols });
    }
    bands
        .checked_mul(rows)
        .and_then(|n| n.checked_mul(cols))
        .ok_or(Error::InvalidDimensions { bands, rows, cols })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_buffer_creation() {
        let buffer = SampleBuffer::new(3, 100, 200, SampleType::U8).unwrap();
        assert_eq!(buffer.bands(), 3);
        assert_eq!(buffer.rows(), 100);
        assert_eq!(buffer.cols(), 200);
        assert_eq!(buffer.shape(), (3, 100, 200));
        assert_eq!(buffer.band_len(), 20_000);
        assert_eq!(buffer.len(), 60_000);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            SampleBuffer::new(0, 10, 10, SampleType::U8),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(SampleBuffer::new(1, 0, 10, SampleType::U8).is_err());
    }

    #[test]
    fn test_from_vec_band_sequential() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 10.0, 20.0, 30.0, 40.0];
        let buffer = SampleBuffer::from_vec(data, (2, 2, 2), SampleType::U16).unwrap();
        assert_eq!(buffer.get(0, 1, 0).unwrap(), 3.0);
        assert_eq!(buffer.get(1, 0, 1).unwrap(), 20.0);
        assert_eq!(buffer.band(1).unwrap().sum(), 100.0);
        assert_eq!(buffer.bit_depths(), vec![16, 16]);
    }

    #[test]
    fn test_from_vec_size_mismatch() {
        let result = SampleBuffer::from_vec(vec![1.0; 5], (1, 2, 2), SampleType::U8);
        assert!(matches!(
            result,
            Err(Error::SizeMismatch {
                expected: 4,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_from_bands_mixed_types() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[500.0, 600.0], [700.0, 800.0]];
        let buffer =
            SampleBuffer::from_bands(vec![(a, SampleType::U8), (b, SampleType::U16)]).unwrap();
        assert_eq!(buffer.bit_depths(), vec![8, 16]);
        assert!(!buffer.is_byte_image());
        assert_eq!(buffer.get(1, 1, 1).unwrap(), 800.0);
    }

    #[test]
    fn test_from_bands_shape_mismatch() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[1.0, 2.0, 3.0]];
        assert!(
            SampleBuffer::from_bands(vec![(a, SampleType::U8), (b, SampleType::U8)]).is_err()
        );
    }

    #[test]
    fn test_band_out_of_range() {
        let buffer = SampleBuffer::new(2, 2, 2, SampleType::U8).unwrap();
        assert!(matches!(
            buffer.band(2),
            Err(Error::BandOutOfRange { band: 2, bands: 2 })
        ));
        assert!(buffer.sample_type(5).is_err());
    }

    #[test]
    fn test_overflowing_shape_rejected() {
        assert!(matches!(
            SampleBuffer::from_vec(vec![0.0; 4], (usize::MAX, 2, 2), SampleType::U8),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(matches!(
            SampleBuffer::new(2, usize::MAX, 2, SampleType::U8),
            Err(Error::InvalidDimensions { .. })
        ));
    }
}
