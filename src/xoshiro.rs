//! Deterministic pseudo-random generator shared by encoder and decoder.
//!
//! Both sides of a transmission must derive the same "random" choices from
//! the same seed, so the generator is fully specified: the seed is hashed
//! with SHA-256, the digest is read as four big-endian 64-bit words which
//! become the state of a `xoshiro256**` generator.

use bitcoin_hashes::Hash;
use rand_xoshiro::rand_core::RngCore;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

/// `2^64` as a double, the divisor used by [`Xoshiro256::next_double`].
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

#[allow(clippy::module_name_repetitions)]
pub struct Xoshiro256 {
    inner: Xoshiro256StarStar,
}

impl From<Xoshiro256StarStar> for Xoshiro256 {
    fn from(from: Xoshiro256StarStar) -> Self {
        Self { inner: from }
    }
}

impl From<&[u8]> for Xoshiro256 {
    fn from(from: &[u8]) -> Self {
        let hash = bitcoin_hashes::sha256::Hash::hash(from);
        Self::from(hash.to_byte_array())
    }
}

impl From<&str> for Xoshiro256 {
    fn from(value: &str) -> Self {
        Self::from(value.as_bytes())
    }
}

impl From<[u8; 32]> for Xoshiro256 {
    fn from(digest: [u8; 32]) -> Self {
        // The digest holds the state words big-endian, `from_seed` expects
        // them little-endian.
        let mut seed = [0_u8; 32];
        for (word, chunk) in seed.chunks_exact_mut(8).zip(digest.chunks_exact(8)) {
            let mut be = [0_u8; 8];
            be.copy_from_slice(chunk);
            word.copy_from_slice(&u64::from_be_bytes(be).to_le_bytes());
        }
        Xoshiro256StarStar::from_seed(seed).into()
    }
}

#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
impl Xoshiro256 {
    /// Raw 64-bit output of the generator.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// A fraction in `[0, 1]`.
    ///
    /// The `u64` draw is converted to `f64` with round-to-nearest and divided
    /// by `2^64`. Draws within 1024 of `u64::MAX` round up to exactly `1.0`.
    pub fn next_double(&mut self) -> f64 {
        self.next() as f64 / TWO_POW_64
    }

    /// An integer in `[low, high]`, inclusive.
    ///
    /// Computed as `floor(next_double() * (high - low + 1)) + low` and
    /// clamped to `high` for the rare draw where [`next_double`] is `1.0`.
    ///
    /// [`next_double`]: Xoshiro256::next_double
    pub fn next_int(&mut self, low: u64, high: u64) -> u64 {
        debug_assert!(low <= high);
        let value = (self.next_double() * ((high - low + 1) as f64)) as u64 + low;
        value.min(high)
    }

    pub fn next_byte(&mut self) -> u8 {
        self.next_int(0, 255) as u8
    }

    /// `n` independently drawn bytes.
    pub fn next_bytes(&mut self, n: usize) -> Vec<u8> {
        (0..n).map(|_| self.next_byte()).collect()
    }

    /// Shuffles `items` by repeatedly removing the element at a random
    /// position of what remains and appending it to the output.
    pub fn shuffled<T>(&mut self, mut items: Vec<T>) -> Vec<T> {
        let mut shuffled = Vec::<T>::with_capacity(items.len());
        while !items.is_empty() {
            let index = self.next_int(0, (items.len() - 1) as u64) as usize;
            shuffled.push(items.remove(index));
        }
        shuffled
    }

    /// Draws how many fragments are mixed into one part, in `[1, length]`.
    ///
    /// Degree `d` is weighted `1 / d`, so small degrees dominate.
    pub fn choose_degree(&mut self, length: usize) -> usize {
        let sampler = crate::sampler::Weighted::harmonic(length);
        sampler.next(self) as usize + 1
    }
}
