//! Weighted random sampling with Vose's alias method.
//!
//! The table layout and the two-draws-per-sample procedure are part of the
//! fountain wire contract: the degree of every mixed part is sampled here,
//! and a decoder has to arrive at the same degree from the same seed.

use crate::xoshiro::Xoshiro256;

/// Errors that can be returned when building a [`Weighted`] sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// No weights were given.
    Empty,
    /// One of the weights is negative.
    NegativeWeight,
    /// The weights sum to zero.
    NonPositiveSum,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => write!(f, "no probabilities given"),
            Self::NegativeWeight => write!(f, "negative probability encountered"),
            Self::NonPositiveSum => write!(f, "probabilities don't sum to a positive value"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[derive(Debug, Clone)]
pub struct Weighted {
    aliases: Vec<u32>,
    probs: Vec<f64>,
}

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
impl Weighted {
    /// Builds a sampler over `weights`, which need not be normalized.
    ///
    /// # Errors
    ///
    /// Fails if `weights` is empty, contains a negative value or sums to
    /// zero.
    pub fn new(weights: Vec<f64>) -> Result<Self, Error> {
        if weights.is_empty() {
            return Err(Error::Empty);
        }
        if weights.iter().any(|&p| p < 0.0) {
            return Err(Error::NegativeWeight);
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(Error::NonPositiveSum);
        }
        Ok(Self::build(weights))
    }

    /// The degree distribution of the fountain code: index `i` is weighted
    /// `1 / (i + 1)` for `i` in `0..count`.
    #[must_use]
    pub fn harmonic(count: usize) -> Self {
        Self::build((1..=count.max(1)).map(|x| 1.0 / x as f64).collect())
    }

    fn build(mut weights: Vec<f64>) -> Self {
        let summed = weights.iter().sum::<f64>();
        let count = weights.len();
        for w in &mut weights {
            *w *= count as f64 / summed;
        }

        // Both work lists are filled from the highest index down.
        let (mut small, mut large): (Vec<usize>, Vec<usize>) =
            (0..count).rev().partition(|&j| weights[j] < 1.0);

        let mut probs: Vec<f64> = vec![0.0; count];
        let mut aliases: Vec<u32> = vec![0; count];

        while !small.is_empty() && !large.is_empty() {
            let (Some(a), Some(g)) = (small.pop(), large.pop()) else {
                break;
            };
            probs[a] = weights[a];
            aliases[a] = g as u32;
            weights[g] += weights[a] - 1.0;
            if weights[g] < 1.0 {
                small.push(g);
            } else {
                large.push(g);
            }
        }

        for g in large {
            probs[g] = 1.0;
        }
        for a in small {
            probs[a] = 1.0;
        }

        Self { aliases, probs }
    }

    /// Number of outcomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.probs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    /// Draws an outcome in `0..self.len()`, consuming two doubles from
    /// `xoshiro`.
    #[allow(clippy::cast_sign_loss)]
    pub fn next(&self, xoshiro: &mut Xoshiro256) -> u32 {
        let r1 = xoshiro.next_double();
        let r2 = xoshiro.next_double();
        let n = self.probs.len();
        let i = ((n as f64 * r1) as usize).min(n.saturating_sub(1));
        match (self.probs.get(i), self.aliases.get(i)) {
            (Some(&prob), _) if r2 < prob => i as u32,
            (_, Some(&alias)) => alias,
            _ => 0,
        }
    }
}
