//! `fountain_ur` splits byte payloads into an unbounded stream of small,
//! checksummed parts for lossy one-way channels such as animated QR codes.
//!
//! # Split up a payload
//!
//! The first parts carry the message fragments one by one, so a receiver
//! that sees all of them in order never needs anything else.
//! ```
//! use fountain_ur::fountain::{join, Encoder};
//! let data = String::from("Some binary data").repeat(10);
//! let mut encoder = Encoder::new(data.as_bytes(), 30).unwrap();
//! let count = encoder.fragment_count();
//! let fragments: Vec<Vec<u8>> = encoder
//!     .by_ref()
//!     .take(count)
//!     .map(|part| part.data)
//!     .collect();
//! assert!(encoder.is_complete());
//! assert_eq!(join(&fragments, data.len()).unwrap(), data.as_bytes());
//! ```
//!
//! # Keep emitting
//!
//! After the first pass the encoder mixes fragments together. Every part
//! serializes to CBOR and names the fragments it mixes through its header
//! alone.
//! ```
//! use fountain_ur::{fountain::Encoder, part::Part};
//! let data = String::from("Some binary data").repeat(10);
//! let encoder = Encoder::new(data.as_bytes(), 30).unwrap();
//! for part in encoder.take(20) {
//!     let cbor = part.to_cbor().unwrap();
//!     let decoded = Part::from_cbor(&cbor).unwrap();
//!     assert_eq!(decoded.indexes(), part.indexes());
//!     assert_eq!(decoded, part);
//! }
//! ```

pub mod fountain;
pub mod part;
pub mod sampler;
pub mod ur;
pub mod xoshiro;

pub use self::fountain::Encoder;
pub use self::part::Part;
pub use self::ur::Ur;

/// CRC-32 (ISO-HDLC, as used by zip, PNG and Ethernet).
pub const CRC32: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC);

/// CRC32 checksum of `message`.
///
/// ```
/// assert_eq!(fountain_ur::checksum(b"Wolf"), 0x598c_84dc);
/// ```
#[must_use]
pub fn checksum(message: &[u8]) -> u32 {
    CRC32.checksum(message)
}
