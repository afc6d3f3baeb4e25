//! Single-pass band moments
//!
//! Minimum, maximum, sum and sum of squares of a set of samples. Mean,
//! center range and energy derive from these; variance needs a second pass.

use ndarray::ArrayView2;

/// Accumulated moments of a set of samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub min: f64,
    pub max: f64,
    /// Sum of samples
    pub sum: f64,
    /// Sum of squared samples (energy)
    pub sum_sq: f64,
    pub count: usize,
}

impl Default for Moments {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
            sum_sq: 0.0,
            count: 0,
        }
    }
}

impl Moments {
    /// Accumulate the moments of every sample in a band
    pub fn from_band(band: ArrayView2<'_, f64>) -> Self {
        let mut m = Self::default();
        for &v in band.iter() {
            m.push(v);
        }
        m
    }

    /// Add one sample
    pub fn push(&mut self, v: f64) {
        if v < self.min {
            self.min = v;
        }
        if v > self.max {
            self.max = v;
        }
        self.sum += v;
        self.sum_sq += v * v;
        self.count += 1;
    }

    /// Pool several sets of moments, in order
    ///
    /// The pooled sums are the in-order sums of the parts, so the pooled
    /// energy equals the sum of the parts' energies exactly.
    pub fn pooled<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a Moments>,
    {
        let mut total = Self::default();
        for part in parts {
            total.min = total.min.min(part.min);
            total.max = total.max.max(part.max);
            total.sum += part.sum;
            total.sum_sq += part.sum_sq;
            total.count += part.count;
        }
        total
    }

    /// Arithmetic mean, clamped into `[min, max]`
    ///
    /// Rounding in the sum can push the quotient a hair outside the observed
    /// range for near-constant data.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        let mean = self.sum / self.count as f64;
        if self.min <= self.max {
            mean.clamp(self.min, self.max)
        } else {
            // every sample was NaN
            mean
        }
    }

    /// Midpoint of the observed value range
    pub fn center_range(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Sum of squared samples
    pub fn energy(&self) -> f64 {
        self.sum_sq
    }
}

/// Sum of squared deviations from `mean`
pub fn squared_deviation(band: ArrayView2<'_, f64>, mean: f64) -> f64 {
    band.iter().map(|&v| (v - mean) * (v - mean)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_band_moments() {
        let band = array![[1.0, 1.0], [2.0, 2.0]];
        let m = Moments::from_band(band.view());
        assert_eq!(m.min, 1.0);
        assert_eq!(m.max, 2.0);
        assert_eq!(m.count, 4);
        assert_eq!(m.mean(), 1.5);
        assert_eq!(m.center_range(), 1.5);
        assert_eq!(m.energy(), 10.0);
    }

    #[test]
    fn test_pooled() {
        let a = Moments::from_band(array![[1.0, 2.0]].view());
        let b = Moments::from_band(array![[-3.0, 8.0]].view());
        let total = Moments::pooled([&a, &b]);
        assert_eq!(total.min, -3.0);
        assert_eq!(total.max, 8.0);
        assert_eq!(total.count, 4);
        assert_eq!(total.mean(), 2.0);
        assert_eq!(total.energy(), a.energy() + b.energy());
    }

    #[test]
    fn test_constant_band_mean_in_range() {
        let band = ndarray::Array2::from_elem((7, 13), 0.1);
        let m = Moments::from_band(band.view());
        assert!(m.min <= m.mean() && m.mean() <= m.max);
    }

    #[test]
    fn test_squared_deviation() {
        let band = array![[1.0, 1.0], [2.0, 2.0]];
        assert_eq!(squared_deviation(band.view(), 1.5), 1.0);
    }
}
