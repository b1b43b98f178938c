/*! A crate for computing the sample skewness of a stream in a single pass.

The accumulator keeps only four numbers (count, mean, and the second and
third central moment sums), so the skewness of an unbounded stream can be
re-estimated after every sample without buffering any of it.  The estimate
is the adjusted Fisher-Pearson coefficient, i.e. the bias-corrected third
standardized moment.

## Example

```
use fisher_pearson::{running_skewness, Seed};

let data = vec![61., 64., 67., 70., 73.];
let estimates: Vec<f64> = running_skewness(Seed::default(), data).collect();

// Skewness is undefined until the third sample arrives...
assert!(estimates[0].is_nan());
assert!(estimates[1].is_nan());
// ...and this dataset is symmetric, so it settles at zero.
assert!(estimates[4].abs() < 1e-12);
```

If you don't need the intermediate estimates, fold the whole stream into
an accumulator and finalize once:

```
use fisher_pearson::Moments;

let acc: Moments = [1., 2., 3., 10.].into_iter().collect();
assert!(acc.skewness() > 1.7); // long right tail
```

An accumulator can be split across runs: read the moments back out of a
finished accumulator, persist them, and seed the next run with them (see
[`Seed`]).
*/

mod stats;

pub use stats::Moments;

/// The starting point for a skewness computation.
///
/// The default seed is the empty stream.  To resume a computation, load
/// the four fields of a previous accumulator back in:
///
/// ```
/// use fisher_pearson::{Moments, Seed};
///
/// let first_half: Moments = [2., 4., 4., 4.].into_iter().collect();
///
/// let seed = Seed::default()
///     .with_count(first_half.count())
///     .with_mean(first_half.mean())?
///     .with_moments(&[first_half.m2(), first_half.m3()])?;
/// let mut resumed = Moments::from(seed);
/// resumed.extend([5., 5., 7., 9.]);
///
/// let all_at_once: Moments = [2., 4., 4., 4., 5., 5., 7., 9.].into_iter().collect();
/// assert_eq!(resumed.skewness(), all_at_once.skewness());
/// # Ok::<(), fisher_pearson::SeedError>(())
/// ```
///
/// Building a pipeline copies the seed, so a `Seed` value can't reach
/// into a computation that's already running.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Seed {
    count: u64,
    mean: f64,
    m2: f64,
    m3: f64,
}

impl Seed {
    pub fn new() -> Seed {
        Seed::default()
    }

    /// Sets the pre-accumulated deviation sums, as the pair `[m2, m3]`.
    pub fn with_moments(self, values: &[f64]) -> Result<Seed, SeedError> {
        match *values {
            [m2, m3] => Ok(Seed { m2, m3, ..self }),
            _ => Err(SeedError::NotAPair(values.len())),
        }
    }

    /// Sets the pre-accumulated mean.
    pub fn with_mean(self, mean: f64) -> Result<Seed, SeedError> {
        if mean.is_finite() {
            Ok(Seed { mean, ..self })
        } else {
            Err(SeedError::NonFiniteMean(mean))
        }
    }

    /// Sets the number of samples the pre-accumulated values represent.
    pub fn with_count(self, count: u64) -> Seed {
        Seed { count, ..self }
    }

    pub fn moments(&self) -> [f64; 2] {
        [self.m2, self.m3]
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// A malformed seed.  These are configuration mistakes, caught before any
/// sample is processed; they never arise mid-stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeedError {
    /// Seed moments must be exactly the pair `[m2, m3]`.
    NotAPair(usize),
    /// The seed mean must be a finite number.
    NonFiniteMean(f64),
}

use std::fmt;
impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SeedError::NotAPair(n) => {
                write!(f, "Seed moments must be a 2-element slice [m2, m3], got {} elements", n)
            }
            SeedError::NonFiniteMean(x) => write!(f, "Seed mean must be finite, got {}", x),
        }
    }
}
impl std::error::Error for SeedError {}

/// Turns a stream of samples into a stream of skewness estimates.
///
/// The accumulator starts from `seed`, is folded over the input with
/// [`Iterator::scan`], and each intermediate snapshot is projected to an
/// estimate with [`Iterator::map`].  One output per input, in input
/// order: the k-th output reflects the seed plus the first k samples.
pub fn running_skewness<I>(seed: Seed, input: I) -> impl Iterator<Item = f64>
where
    I: IntoIterator<Item = f64>,
{
    input
        .into_iter()
        .scan(Moments::from(seed), |acc, x| {
            acc.update(x);
            Some(*acc)
        })
        .map(Moments::skewness)
}
