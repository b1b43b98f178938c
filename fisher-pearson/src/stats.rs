use crate::Seed;
use std::iter::FromIterator;

/// A running accumulator for the first three central moments.
///
/// This is Welford's online mean/variance algorithm, extended with the
/// third-moment recurrence, so the skewness of a stream can be updated
/// after every sample without buffering the stream.  The whole state is
/// four words; taking a snapshot is a copy.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Moments {
    /// the number of samples seen so far
    pub(crate) count: u64,
    /// the mean of the samples seen so far
    pub(crate) mean: f64,
    /// the sum of squared deviations from the running mean
    pub(crate) m2: f64,
    /// the sum of cubed deviations from the running mean
    pub(crate) m3: f64,
}

impl Moments {
    pub fn update(&mut self, x: f64) {
        // Welford's online algorithm.  The m3 update reads the m2 of the
        // *previous* step, so it has to happen before m2 is touched.
        self.count += 1;
        let n = self.count as f64;
        let delta = x - self.mean; // diff from the old mean
        let delta_n = delta / n;
        let term1 = delta * delta_n * (n - 1.);
        self.m3 += term1 * delta_n * (n - 2.) - 3. * delta_n * self.m2;
        self.m2 += term1;
        self.mean += delta_n;
    }

    pub fn count(self) -> u64 {
        self.count
    }

    /// The running mean.  This is the raw accumulator field: zero for an
    /// empty accumulator, so it can be fed straight back in as a seed.
    pub fn mean(self) -> f64 {
        self.mean
    }

    /// The running sum of squared deviations from the mean.
    pub fn m2(self) -> f64 {
        self.m2
    }

    /// The running sum of cubed deviations from the mean.
    pub fn m3(self) -> f64 {
        self.m3
    }

    pub fn sample_var(self) -> f64 {
        if self.count <= 1 {
            f64::NAN
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// The adjusted Fisher-Pearson sample skewness of the samples seen so
    /// far.
    ///
    /// Skewness is undefined for fewer than three samples, and for a
    /// sample with no variance; both cases yield NaN rather than an
    /// error, so low-volume streams don't need a separate code path.
    pub fn skewness(self) -> f64 {
        if self.count < 3 || self.m2 == 0. {
            return f64::NAN;
        }
        let n = self.count as f64;
        // Population (biased) skewness
        let g1 = n.sqrt() * self.m3 / self.m2.powf(1.5);
        // Bias correction for a finite sample
        (n * (n - 1.)).sqrt() * g1 / (n - 2.)
    }
}

impl Extend<f64> for Moments {
    fn extend<T: IntoIterator<Item = f64>>(&mut self, iter: T) {
        for x in iter {
            self.update(x);
        }
    }
}

impl FromIterator<f64> for Moments {
    fn from_iter<T: IntoIterator<Item = f64>>(iter: T) -> Moments {
        let mut acc = Moments::default();
        acc.extend(iter);
        acc
    }
}

impl From<Seed> for Moments {
    /// Freezes a seed into a live accumulator.  The seed is copied; later
    /// changes to it don't affect the accumulator.
    fn from(seed: Seed) -> Moments {
        let [m2, m3] = seed.moments();
        Moments {
            count: seed.count(),
            mean: seed.mean(),
            m2,
            m3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn fold(xs: &[f64]) -> Moments {
        xs.iter().copied().collect()
    }

    #[test]
    fn mean_and_variance() {
        let acc = fold(&[1., 2., 3.]);
        assert_eq!(acc.count(), 3);
        assert_eq!(acc.mean(), 2.);
        assert_eq!(acc.sample_var(), 1.);

        let acc = fold(&[0., -2., 2.]);
        assert_eq!(acc.mean(), 0.);
        assert_eq!(acc.sample_var(), 4.);

        let acc = (0..=100).map(f64::from).collect::<Moments>();
        assert_eq!(acc.count(), 101);
        assert_eq!(acc.mean(), 50.);
        assert_eq!(acc.sample_var(), 858.5);
    }

    #[test]
    fn known_dataset() {
        // Scores with frequencies, from the exam-score example commonly
        // used to illustrate negative skew.
        let scores = [61., 64., 67., 70., 73.];
        let freq = [5, 18, 42, 27, 8];
        let mut acc = Moments::default();
        for (&x, &n) in scores.iter().zip(&freq) {
            acc.extend(std::iter::repeat(x).take(n));
        }
        assert_eq!(acc.count(), 100);
        assert_abs_diff_eq!(acc.skewness(), -0.1098, epsilon = 0.001);
    }

    #[test]
    fn hand_computed() {
        let acc = fold(&[1., 2., 3., 10.]);
        assert_relative_eq!(acc.skewness(), 1.763632614803888, max_relative = 1e-12);
    }

    #[test]
    fn too_few_samples() {
        let mut acc = Moments::default();
        assert!(acc.skewness().is_nan());
        acc.update(1.);
        assert!(acc.skewness().is_nan());
        acc.update(2.);
        assert!(acc.skewness().is_nan());
        acc.update(3.);
        // Three samples is the first point at which skewness is defined
        assert!(!acc.skewness().is_nan());
    }

    #[test]
    fn zero_variance() {
        let mut acc = Moments::default();
        for _ in 0..5 {
            acc.update(42.);
            assert!(acc.skewness().is_nan());
        }
        assert_eq!(acc.m2(), 0.);
    }

    #[test]
    fn permutation_invariant() {
        let data = [1., 5., 2., 8., 7., 3., 3., 9.];
        let expected = fold(&data).skewness();
        let mut reversed = data;
        reversed.reverse();
        let mut sorted = data;
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_relative_eq!(fold(&reversed).skewness(), expected, max_relative = 1e-12);
        assert_relative_eq!(fold(&sorted).skewness(), expected, max_relative = 1e-12);
    }

    #[test]
    fn idempotent_finalization() {
        let acc = fold(&[1., 5., 2., 8., 7.]);
        assert_eq!(acc.skewness().to_bits(), acc.skewness().to_bits());
    }

    #[test]
    fn shifted_data() {
        // The naive sum-of-cubes formula loses all precision here; the
        // incremental recurrence must not.
        let base = (0..1000).map(f64::from).collect::<Moments>();
        let shifted = (0..1000).map(|i| 1e9 + f64::from(i)).collect::<Moments>();
        assert_abs_diff_eq!(base.skewness(), shifted.skewness(), epsilon = 1e-6);
        assert_abs_diff_eq!(base.skewness(), 0., epsilon = 1e-9);
    }
}
