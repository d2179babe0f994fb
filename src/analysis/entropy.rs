// src/analysis/entropy.rs

//! Shannon entropy of byte streams, used for the compressibility report.

/// Byte frequency histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: [u64; 256],
    total: u64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    pub fn new() -> Self {
        Self {
            counts: [0; 256],
            total: 0,
        }
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hist = Self::new();
        hist.add(data);
        hist
    }

    /// Accumulates more samples into the same histogram.
    pub fn add(&mut self, data: &[u8]) {
        for &byte in data {
            self.counts[byte as usize] += 1;
        }
        self.total += data.len() as u64;
    }

    /// Folds another histogram into this one.
    pub fn merge(&mut self, other: &Histogram) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            *mine += theirs;
        }
        self.total += other.total;
    }

    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct symbols seen.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Shannon entropy in bits per symbol.
    pub fn entropy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let total = self.total as f64;
        self.counts
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| {
                let p = c as f64 / total;
                -p * p.log2()
            })
            .sum()
    }

    /// `log2(distinct symbols)`, or 1 when at most one symbol was seen.
    pub fn max_entropy(&self) -> f64 {
        match self.distinct() {
            0 | 1 => 1.0,
            n => (n as f64).log2(),
        }
    }

    /// Observed entropy over the maximum for the observed alphabet.
    pub fn entropy_ratio(&self) -> f64 {
        self.entropy() / self.max_entropy()
    }
}

/// Entropy ratio of a single stream.
pub fn entropy_ratio(data: &[u8]) -> f64 {
    Histogram::from_bytes(data).entropy_ratio()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_uniform_is_one() {
        let data: Vec<u8> = (0..=255).collect();
        let hist = Histogram::from_bytes(&data);
        assert!((hist.entropy() - 8.0).abs() < EPS);
        assert!((hist.entropy_ratio() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_constant_is_zero() {
        assert_eq!(entropy_ratio(&[7; 100]), 0.0);
        assert_eq!(Histogram::new().entropy(), 0.0);
        assert_eq!(entropy_ratio(&[]), 0.0);
    }

    #[test]
    fn test_skewed_distribution() {
        // p = 3/4, 1/4
        let hist = Histogram::from_bytes(&[0, 0, 0, 1]);
        let expected = -(0.75f64 * 0.75f64.log2() + 0.25 * 0.25f64.log2());
        assert!((hist.entropy() - expected).abs() < EPS);
        assert!((hist.max_entropy() - 1.0).abs() < EPS);
        assert!(hist.entropy_ratio() < 1.0);
    }

    #[test]
    fn test_accumulates_across_streams() {
        let mut hist = Histogram::from_bytes(&[1, 2]);
        hist.add(&[2, 3, 3]);
        assert_eq!(hist.total(), 5);
        assert_eq!(hist.count(3), 2);
        assert_eq!(hist.distinct(), 3);

        let mut merged = Histogram::from_bytes(&[1]);
        merged.merge(&Histogram::from_bytes(&[2, 2, 3, 3]));
        assert_eq!(merged, hist);
    }
}
