//! Fountain encoder.
//!
//! A message is split into equal-length fragments. The encoder first emits
//! every fragment on its own, one per part, and afterwards an unbounded
//! stream of parts that each carry the XOR of a pseudo-randomly chosen set
//! of fragments. Which fragments go into a part is derived from the part's
//! sequence number and the message checksum alone, so a receiver recomputes
//! the selection instead of having it transmitted.
//!
//! ```
//! use fountain_ur::fountain::{Encoder, Options};
//!
//! let message = b"a message that is long enough to be split up";
//! let options = Options::default().with_max_fragment_length(12).with_min_fragment_length(4);
//! let mut encoder = Encoder::with_options(message, &options).unwrap();
//! assert_eq!(encoder.fragment_length(), 11);
//! assert_eq!(encoder.fragment_count(), 4);
//!
//! let part = encoder.next_part();
//! assert_eq!(part.sequence, 1);
//! assert_eq!(part.data, &message[..11]);
//! ```

use crate::part::Part;
use crate::xoshiro::Xoshiro256;

/// Errors that can be returned when setting up an [`Encoder`] or joining
/// fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The message to encode is empty.
    EmptyMessage,
    /// The minimum fragment length is zero.
    ZeroFragmentLength,
    /// The maximum fragment length is smaller than the minimum.
    InvalidFragmentLengthBounds { min: usize, max: usize },
    /// The message would be split into more fragments than a part can
    /// describe.
    TooManyFragments(usize),
    /// The fragments hold fewer bytes than the declared message length.
    InsufficientData,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "expected non-empty message"),
            Self::ZeroFragmentLength => write!(f, "expected positive minimum fragment length"),
            Self::InvalidFragmentLengthBounds { min, max } => write!(
                f,
                "maximum fragment length {max} is smaller than minimum fragment length {min}"
            ),
            Self::TooManyFragments(count) => {
                write!(f, "{count} fragments exceed the maximum sequence length")
            }
            Self::InsufficientData => write!(f, "insufficient data"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Construction parameters of an [`Encoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Upper bound on the fragment length, usually dictated by how much a
    /// single frame of the transport can carry.
    ///
    /// Default: 100
    pub max_fragment_length: usize,
    /// Lower bound on the fragment length, keeps tiny messages from being
    /// shredded into many parts.
    ///
    /// Default: 10
    pub min_fragment_length: usize,
    /// Sequence number the encoder starts counting from. The first emitted
    /// part carries `first_sequence + 1`.
    ///
    /// Default: 0
    pub first_sequence: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_fragment_length: 100,
            min_fragment_length: 10,
            first_sequence: 0,
        }
    }
}

impl Options {
    #[must_use]
    pub const fn with_max_fragment_length(mut self, max_fragment_length: usize) -> Self {
        self.max_fragment_length = max_fragment_length;
        self
    }

    #[must_use]
    pub const fn with_min_fragment_length(mut self, min_fragment_length: usize) -> Self {
        self.min_fragment_length = min_fragment_length;
        self
    }

    #[must_use]
    pub const fn with_first_sequence(mut self, first_sequence: u32) -> Self {
        self.first_sequence = first_sequence;
        self
    }
}

/// Finds the fragment length that splits a message of `message_length`
/// bytes into as few fragments as possible without any fragment exceeding
/// `max_fragment_length`. At most `ceil(message_length / min_fragment_length)`
/// fragments are considered.
///
/// # Examples
///
/// ```
/// # use fountain_ur::fountain::fragment_length;
/// assert_eq!(fragment_length(256, 10, 100), Ok(86));
/// assert_eq!(fragment_length(5, 10, 100), Ok(5));
/// ```
///
/// # Errors
///
/// Fails if `message_length` or `min_fragment_length` is zero, or if
/// `max_fragment_length` is smaller than `min_fragment_length`.
pub fn fragment_length(
    message_length: usize,
    min_fragment_length: usize,
    max_fragment_length: usize,
) -> Result<usize, Error> {
    if message_length == 0 {
        return Err(Error::EmptyMessage);
    }
    if min_fragment_length == 0 {
        return Err(Error::ZeroFragmentLength);
    }
    if max_fragment_length < min_fragment_length {
        return Err(Error::InvalidFragmentLengthBounds {
            min: min_fragment_length,
            max: max_fragment_length,
        });
    }

    let max_fragment_count = message_length.div_ceil(min_fragment_length);
    Ok((1..=max_fragment_count)
        .map(|count| message_length.div_ceil(count))
        .find(|&length| length <= max_fragment_length)
        .unwrap_or_else(|| message_length.div_ceil(max_fragment_count)))
}

/// Splits `data` into `fragment_length`-sized fragments, padding the last
/// one with zeros.
#[must_use]
pub fn partition(data: &[u8], fragment_length: usize) -> Vec<Vec<u8>> {
    data.chunks(fragment_length)
        .map(|chunk| {
            let mut fragment = chunk.to_vec();
            fragment.resize(fragment_length, 0);
            fragment
        })
        .collect()
}

/// Concatenates `fragments` and strips the padding beyond `message_length`.
///
/// # Errors
///
/// Fails if the fragments hold fewer than `message_length` bytes.
pub fn join(fragments: &[Vec<u8>], message_length: usize) -> Result<Vec<u8>, Error> {
    if fragments.iter().map(Vec::len).sum::<usize>() < message_length {
        return Err(Error::InsufficientData);
    }
    let mut flattened: Vec<u8> = fragments.concat();
    flattened.truncate(message_length);
    Ok(flattened)
}

/// XORs `v2` into `v1`.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn xor_into(v1: &mut [u8], v2: &[u8]) {
    assert_eq!(v1.len(), v2.len());
    for (x1, &x2) in v1.iter_mut().zip(v2) {
        *x1 ^= x2;
    }
}

/// Indexes of the fragments mixed into the part with number `sequence`.
///
/// Parts `1..=fragment_count` carry fragment `sequence - 1` alone. Later
/// parts seed a [`Xoshiro256`] with the big-endian `sequence` followed by
/// the big-endian `checksum`, draw a degree from the harmonic distribution
/// and take that many indexes from a shuffle of `0..fragment_count`.
///
/// A `sequence` or `fragment_count` of zero selects nothing.
#[must_use]
pub fn choose_fragments(sequence: u32, fragment_count: u32, checksum: u32) -> Vec<usize> {
    if sequence == 0 || fragment_count == 0 {
        return Vec::new();
    }
    if sequence <= fragment_count {
        return vec![(sequence - 1) as usize];
    }

    let mut seed = [0_u8; 8];
    seed[..4].copy_from_slice(&sequence.to_be_bytes());
    seed[4..].copy_from_slice(&checksum.to_be_bytes());
    let mut xoshiro = Xoshiro256::from(&seed[..]);

    let degree = xoshiro.choose_degree(fragment_count as usize);
    let indexes = (0..fragment_count as usize).collect();
    let mut shuffled = xoshiro.shuffled(indexes);
    shuffled.truncate(degree);
    shuffled
}

/// An encoder emitting an unbounded stream of fountain-encoded [`Part`]s.
///
/// The fragments, lengths and checksum are fixed at construction; only the
/// sequence counter advances, through [`next_part`](Encoder::next_part).
#[derive(Debug, Clone)]
pub struct Encoder {
    fragments: Vec<Vec<u8>>,
    fragment_length: usize,
    message_length: usize,
    checksum: u32,
    sequence_count: u32,
    current_sequence: u32,
}

impl Encoder {
    /// Starts encoding `message` with the default [`Options`] and the given
    /// maximum fragment length.
    ///
    /// # Errors
    ///
    /// See [`Encoder::with_options`].
    pub fn new(message: &[u8], max_fragment_length: usize) -> Result<Self, Error> {
        let options = Options::default().with_max_fragment_length(max_fragment_length);
        Self::with_options(message, &options)
    }

    /// Starts encoding `message`.
    ///
    /// # Errors
    ///
    /// Fails if the message is empty, the fragment length bounds are
    /// invalid (see [`fragment_length`]) or the message would need more than
    /// `u32::MAX` fragments.
    pub fn with_options(message: &[u8], options: &Options) -> Result<Self, Error> {
        let fragment_length = fragment_length(
            message.len(),
            options.min_fragment_length,
            options.max_fragment_length,
        )?;
        let fragments = partition(message, fragment_length);
        let sequence_count = u32::try_from(fragments.len())
            .map_err(|_| Error::TooManyFragments(fragments.len()))?;
        let checksum = crate::checksum(message);

        log::debug!(
            "fountain encoder: {} bytes in {} fragments of {} bytes, checksum {:#010x}",
            message.len(),
            sequence_count,
            fragment_length,
            checksum
        );

        Ok(Self {
            fragments,
            fragment_length,
            message_length: message.len(),
            checksum,
            sequence_count,
            current_sequence: options.first_sequence,
        })
    }

    /// Sequence number of the most recently emitted part, or the configured
    /// first sequence if nothing has been emitted yet.
    #[must_use]
    pub const fn current_sequence(&self) -> u32 {
        self.current_sequence
    }

    /// Number of fragments the message has been split into.
    #[must_use]
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// The fragment count as carried in every part.
    #[must_use]
    pub const fn seq_length(&self) -> u32 {
        self.sequence_count
    }

    #[must_use]
    pub const fn fragment_length(&self) -> usize {
        self.fragment_length
    }

    #[must_use]
    pub const fn message_length(&self) -> usize {
        self.message_length
    }

    /// CRC32 checksum of the whole message.
    #[must_use]
    pub const fn checksum(&self) -> u32 {
        self.checksum
    }

    /// The zero-padded fragments, in message order.
    #[must_use]
    pub fn fragments(&self) -> &[Vec<u8>] {
        &self.fragments
    }

    /// Whether every fragment has been emitted on its own at least once.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.current_sequence >= self.sequence_count
    }

    /// Whether the message fits into a single fragment.
    #[must_use]
    pub fn is_single_part(&self) -> bool {
        self.fragments.len() == 1
    }

    /// XOR of the fragments at `indexes`, starting from zeros. Indexes out
    /// of range are skipped.
    #[must_use]
    pub fn mix(&self, indexes: &[usize]) -> Vec<u8> {
        let mut mixed = vec![0; self.fragment_length];
        for fragment in indexes.iter().filter_map(|&i| self.fragments.get(i)) {
            xor_into(&mut mixed, fragment);
        }
        mixed
    }

    /// Emits the next part.
    ///
    /// The counter wraps from `u32::MAX` to `1`, sequence zero is never
    /// emitted.
    pub fn next_part(&mut self) -> Part {
        self.current_sequence = self.current_sequence.checked_add(1).unwrap_or(1);
        let indexes = choose_fragments(self.current_sequence, self.sequence_count, self.checksum);
        log::trace!("part {}: mixing {:?}", self.current_sequence, indexes);

        Part {
            sequence: self.current_sequence,
            sequence_count: self.sequence_count,
            message_length: self.message_length,
            checksum: self.checksum,
            data: self.mix(&indexes),
        }
    }
}

impl Iterator for Encoder {
    type Item = Part;

    fn next(&mut self) -> Option<Part> {
        Some(self.next_part())
    }
}
