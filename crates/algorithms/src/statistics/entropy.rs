//! Shannon entropy of observed sample values
//!
//! Unlike histograms, the distribution is built from whatever distinct values
//! occur, so any bit depth is supported.

use std::collections::HashMap;

use ndarray::ArrayView2;

/// Occurrence counts of the distinct sample values of a set of samples
#[derive(Debug, Clone, Default)]
pub struct ValueDistribution {
    counts: HashMap<u64, usize>,
    total: usize,
}

impl ValueDistribution {
    /// Count the distinct values of one band
    pub fn from_band(band: ArrayView2<'_, f64>) -> Self {
        let mut dist = Self::default();
        for &v in band.iter() {
            dist.push(v);
        }
        dist
    }

    /// Add one sample
    pub fn push(&mut self, v: f64) {
        *self.counts.entry(key(v)).or_default() += 1;
        self.total += 1;
    }

    /// Add another distribution's counts to this one
    pub fn merge(&mut self, other: &ValueDistribution) {
        for (&k, &c) in &other.counts {
            *self.counts.entry(k).or_default() += c;
        }
        self.total += other.total;
    }

    /// Number of distinct values
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Number of samples
    pub fn total(&self) -> usize {
        self.total
    }

    /// Shannon entropy in bits: `-sum(p * log2(p))`
    ///
    /// Zero exactly when a single distinct value is present.
    pub fn entropy(&self) -> f64 {
        if self.total == 0 || self.counts.len() <= 1 {
            return 0.0;
        }

        // fixed summation order, HashMap iteration order is not stable
        let mut counts: Vec<usize> = self.counts.values().copied().collect();
        counts.sort_unstable();

        let total_f = self.total as f64;
        let mut h = 0.0;
        for count in counts {
            let p = count as f64 / total_f;
            h -= p * p.log2();
        }
        h.max(0.0)
    }
}

/// Hash key of a sample; `-0.0` and `0.0` count as one value
fn key(v: f64) -> u64 {
    if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_two_equally_likely_values() {
        let dist = ValueDistribution::from_band(array![[1.0, 1.0], [2.0, 2.0]].view());
        assert_eq!(dist.distinct(), 2);
        assert_eq!(dist.entropy(), 1.0);
    }

    #[test]
    fn test_constant_band_zero_entropy() {
        let dist = ValueDistribution::from_band(ndarray::Array2::from_elem((3, 3), 42.5).view());
        assert_eq!(dist.entropy(), 0.0);
        assert!(dist.entropy().is_sign_positive());
    }

    #[test]
    fn test_four_uniform_values() {
        let dist = ValueDistribution::from_band(array![[0.0, 1000.0], [-7.5, 3.25]].view());
        assert!((dist.entropy() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_signed_zero_is_one_value() {
        let dist = ValueDistribution::from_band(array![[0.0, -0.0]].view());
        assert_eq!(dist.distinct(), 1);
    }

    #[test]
    fn test_merge() {
        let mut a = ValueDistribution::from_band(array![[1.0, 1.0]].view());
        let b = ValueDistribution::from_band(array![[2.0, 2.0]].view());
        a.merge(&b);
        assert_eq!(a.total(), 4);
        assert_eq!(a.entropy(), 1.0);
    }
}
