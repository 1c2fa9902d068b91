//! Parts emitted by the fountain [`Encoder`](crate::fountain::Encoder) and
//! their canonical CBOR form.
//!
//! A part is encoded as a five element CBOR array:
//!
//! ```text
//! [sequence, sequence_count, message_length, checksum, bytes(data)]
//! ```

use core::convert::Infallible;
use core::fmt;

/// Errors that can be returned when converting a [`Part`] from or to CBOR.
#[derive(Debug)]
pub enum Error {
    /// The bytes are not a well-formed part.
    Decode(minicbor::decode::Error),
    /// The part could not be written as CBOR.
    Encode(minicbor::encode::Error<Infallible>),
    /// A part was decoded, but this many bytes were left over.
    TrailingBytes(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "invalid part: {e}"),
            Self::Encode(e) => write!(f, "failed to encode part: {e}"),
            Self::TrailingBytes(n) => write!(f, "{n} trailing bytes after part"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<minicbor::decode::Error> for Error {
    fn from(e: minicbor::decode::Error) -> Self {
        Self::Decode(e)
    }
}

impl From<minicbor::encode::Error<Infallible>> for Error {
    fn from(e: minicbor::encode::Error<Infallible>) -> Self {
        Self::Encode(e)
    }
}

/// One unit of a fountain-encoded transmission.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Part {
    /// The sequence number of this part, starting at 1. Can be higher than
    /// [`sequence_count`](Self::sequence_count).
    pub sequence: u32,
    /// The number of fragments the message was split into.
    pub sequence_count: u32,
    /// The message length in bytes, excluding padding.
    pub message_length: usize,
    /// The CRC32 checksum of the entire message.
    pub checksum: u32,
    /// A single fragment, or the XOR of several.
    pub data: Vec<u8>,
}

impl Part {
    /// Serializes this part to its canonical CBOR bytes.
    ///
    /// # Errors
    ///
    /// Only fails if the CBOR encoder rejects a value, which the part's
    /// field types rule out.
    pub fn to_cbor(&self) -> Result<Vec<u8>, Error> {
        let mut cbor = Vec::with_capacity(self.data.len() + Self::max_encoded_len());
        minicbor::encode(self, &mut cbor)?;
        Ok(cbor)
    }

    /// Parses a part from its canonical CBOR bytes.
    ///
    /// # Errors
    ///
    /// Fails if `cbor` is not exactly one array of four unsigned integers
    /// followed by a byte string.
    pub fn from_cbor(cbor: &[u8]) -> Result<Self, Error> {
        let mut decoder = minicbor::Decoder::new(cbor);
        let part = decoder.decode()?;
        match cbor.len() - decoder.position() {
            0 => Ok(part),
            n => Err(Error::TrailingBytes(n)),
        }
    }

    /// Upper bound on the encoded size of a part, excluding the `data`
    /// contents.
    #[must_use]
    pub const fn max_encoded_len() -> usize {
        #[rustfmt::skip]
        const MAX_CBOR: &[u8] = &[
            0x85,                                                     // array(5)
                0x1A, 0xFF, 0xFF, 0xFF, 0xFF,                         // unsigned(0xFFFFFFFF)
                0x1A, 0xFF, 0xFF, 0xFF, 0xFF,                         // unsigned(0xFFFFFFFF)
                0x1B, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // unsigned(0xFFFFFFFFFFFFFFFF)
                0x1A, 0xFF, 0xFF, 0xFF, 0xFF,                         // unsigned(0xFFFFFFFF)
                0x5B, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // bytes(0xFFFFFFFFFFFFFFFF)
        ];

        MAX_CBOR.len()
    }

    /// `"<sequence>-<sequence_count>"`, the position label used in
    /// multi-part URs.
    #[must_use]
    pub fn sequence_id(&self) -> String {
        format!("{}-{}", self.sequence, self.sequence_count)
    }

    /// Whether the header describes a plausible part: positive sequence
    /// numbers and message length, and some data.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.sequence > 0
            && self.sequence_count > 0
            && self.message_length > 0
            && !self.data.is_empty()
    }

    /// Indexes of the fragments mixed into this part, recomputed from the
    /// header the same way the encoder chose them.
    #[must_use]
    pub fn indexes(&self) -> Vec<usize> {
        crate::fountain::choose_fragments(self.sequence, self.sequence_count, self.checksum)
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "seqNum:{}, seqLen:{}, messageLen:{}, checksum:{}, data:",
            self.sequence, self.sequence_count, self.message_length, self.checksum
        )?;
        self.data.iter().try_for_each(|b| write!(f, "{b:02x}"))
    }
}

impl<C> minicbor::Encode<C> for Part {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.array(5)?
            .u32(self.sequence)?
            .u32(self.sequence_count)?
            .u64(self.message_length as u64)?
            .u32(self.checksum)?
            .bytes(&self.data)?;
        Ok(())
    }
}

impl<'b, C> minicbor::Decode<'b, C> for Part {
    fn decode(
        d: &mut minicbor::Decoder<'b>,
        _ctx: &mut C,
    ) -> Result<Self, minicbor::decode::Error> {
        if !matches!(d.array()?, Some(5)) {
            return Err(minicbor::decode::Error::message(
                "invalid CBOR array length",
            ));
        }

        Ok(Self {
            sequence: d.u32()?,
            sequence_count: d.u32()?,
            message_length: usize::try_from(d.u64()?)
                .map_err(|_| minicbor::decode::Error::message("message length overflows usize"))?,
            checksum: d.u32()?,
            data: d.bytes()?.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fountain::Encoder;
    use crate::xoshiro::test_utils::make_message;

    fn part(sequence: u32, checksum: u32, data: Vec<u8>) -> Part {
        Part {
            sequence,
            sequence_count: 8,
            message_length: 100,
            checksum,
            data,
        }
    }

    #[test]
    fn test_part_cbor_roundtrip() {
        let part = part(12, 0x1234_5678, vec![1, 5, 3, 3, 5]);
        let cbor = part.to_cbor().unwrap();
        let decoded = Part::from_cbor(&cbor).unwrap();
        assert_eq!(decoded, part);
        assert_eq!(decoded.to_cbor().unwrap(), cbor);
    }

    #[test]
    fn test_part_cbor_roundtrip_extremes() {
        for sequence in [0, 1, u32::MAX] {
            for checksum in [0, 1, u32::MAX] {
                for length in [0, 1, 1000] {
                    let data = make_message("Wolf", length);
                    let part = part(sequence, checksum, data);
                    assert_eq!(Part::from_cbor(&part.to_cbor().unwrap()).unwrap(), part);
                }
            }
        }
    }

    #[test]
    fn test_part_cbor_layout() {
        let part = part(1, 0x0167_aa07, vec![0xab, 0xcd]);
        assert_eq!(
            hex::encode(part.to_cbor().unwrap()),
            "85010818641a0167aa0742abcd"
        );
    }

    #[test]
    fn test_encoder_part_cbor() {
        let expected_parts_cbor = [
            "8501091901001a0167aa07581d916ec65cf77cadf55cd7f9cda1a1030026ddd42e905b77adc36e4f2d3c",
            "8502091901001a0167aa07581dcba44f7f04f2de44f42d84c374a0e149136f25b01852545961d55f7f7a",
            "8503091901001a0167aa07581d8cde6d0e2ec43f3b2dcb644a2209e8c9e34af5c4747984a5e873c9cf5f",
            "8504091901001a0167aa07581d965e25ee29039fdf8ca74f1c769fc07eb7ebaec46e0695aea6cbd60b3e",
            "8505091901001a0167aa07581dc4bbff1b9ffe8a9e7240129377b9d3711ed38d412fbb4442256f1e6f59",
            "8506091901001a0167aa07581d5e0fc57fed451fb0a0101fb76b1fb1e1b88cfdfdaa946294a47de8fff1",
            "8507091901001a0167aa07581d73f021c0e6f65b05c0a494e50791270a0050a73ae69b6725505a2ec8a5",
            "8508091901001a0167aa07581d791457c9876dd34aadd192a53aa0dc66b556c0c215c7ceb8248b717c22",
            "8509091901001a0167aa07581d951e65305b56a3706e3e86eb01c803bbf915d80edcd64d4d0000000000",
            "850a091901001a0167aa07581d330f0f33a05eead4f331df229871bee733b50de71afd2e5a79f196de09",
            "850b091901001a0167aa07581d3b205ce5e52d8c24a52cffa34c564fa1af3fdffcd349dc4258ee4ee828",
            "850c091901001a0167aa07581ddd7bf725ea6c16d531b5f03254783803048ca08b87148daacd1cd7a006",
            "850d091901001a0167aa07581d760be7ad1c6187902bbc04f539b9ee5eb8ea6833222edea36031306c01",
            "850e091901001a0167aa07581d5bf4031217d2c3254b088fa7553778b5003632f46e21db129416f65b55",
            "850f091901001a0167aa07581d73f021c0e6f65b05c0a494e50791270a0050a73ae69b6725505a2ec8a5",
            "8510091901001a0167aa07581db8546ebfe2048541348910267331c643133f828afec9337c318f71b7df",
            "8511091901001a0167aa07581d23dedeea74e3a0fb052befabefa13e2f80e4315c9dceed4c8630612e64",
            "8512091901001a0167aa07581dd01a8daee769ce34b6b35d3ca0005302724abddae405bdb419c0a6b208",
            "8513091901001a0167aa07581d3171c5dc365766eff25ae47c6f10e7de48cfb8474e050e5fe997a6dc24",
            "8514091901001a0167aa07581de055c2433562184fa71b4be94f262e200f01c6f74c284b0dc6fae6673f",
        ];

        let message = make_message("Wolf", 256);
        let mut encoder = Encoder::new(&message, 30).unwrap();
        for expected in expected_parts_cbor {
            let part = encoder.next_part();
            assert_eq!(hex::encode(part.to_cbor().unwrap()), expected);
        }
    }

    #[test]
    fn test_part_cbor_decode() {
        // 0x18 is the first byte value that doesn't directly encode a u8,
        // but implies a following value
        assert!(Part::from_cbor(&[0x18]).is_err());
        // the top-level item must be an array
        assert!(Part::from_cbor(&[0x1]).is_err());
        // the array must be of length five
        assert!(Part::from_cbor(&[0x84, 0x1, 0x2, 0x3, 0x4]).is_err());
        assert!(Part::from_cbor(&[0x86, 0x1, 0x2, 0x3, 0x4, 0x5, 0x6]).is_err());
        // indefinite length arrays are rejected
        assert!(Part::from_cbor(&[0x9f, 0x1, 0x2, 0x3, 0x4, 0x41, 0x5, 0xff]).is_err());
        // the first four items must be unsigned integers
        assert!(Part::from_cbor(&[0x85, 0x41, 0x1, 0x2, 0x3, 0x4, 0x41, 0x1]).is_err());
        assert!(Part::from_cbor(&[0x85, 0x1, 0x41, 0x2, 0x3, 0x4, 0x41, 0x1]).is_err());
        assert!(Part::from_cbor(&[0x85, 0x1, 0x2, 0x41, 0x3, 0x4, 0x41, 0x1]).is_err());
        assert!(Part::from_cbor(&[0x85, 0x1, 0x2, 0x3, 0x41, 0x4, 0x41, 0x1]).is_err());
        assert!(Part::from_cbor(&[0x85, 0x20, 0x2, 0x3, 0x4, 0x41, 0x5]).is_err());
        // the fifth item must be a byte string
        assert!(Part::from_cbor(&[0x85, 0x1, 0x2, 0x3, 0x4, 0x5]).is_err());
        assert!(Part::from_cbor(&[0x85, 0x1, 0x2, 0x3, 0x4, 0x61, 0x5]).is_err());

        let part = Part::from_cbor(&[0x85, 0x1, 0x2, 0x3, 0x4, 0x41, 0x5]).unwrap();
        assert_eq!(
            part,
            Part {
                sequence: 1,
                sequence_count: 2,
                message_length: 3,
                checksum: 4,
                data: vec![5],
            }
        );
    }

    #[test]
    fn test_part_cbor_decode_trailing_bytes() {
        let err = Part::from_cbor(&[0x85, 0x1, 0x2, 0x3, 0x4, 0x41, 0x5, 0x0, 0x0]).unwrap_err();
        assert!(matches!(err, Error::TrailingBytes(2)));
        assert_eq!(err.to_string(), "2 trailing bytes after part");
    }

    #[test]
    fn test_part_cbor_decode_unsigned_types() {
        // u16
        Part::from_cbor(&[
            0x85, 0x19, 0x1, 0x2, 0x19, 0x3, 0x4, 0x19, 0x5, 0x6, 0x19, 0x7, 0x8, 0x41, 0x5,
        ])
        .unwrap();
        // u32
        Part::from_cbor(&[
            0x85, 0x1a, 0x1, 0x2, 0x3, 0x4, 0x1a, 0x5, 0x6, 0x7, 0x8, 0x1a, 0x9, 0x10, 0x11, 0x12,
            0x1a, 0x13, 0x14, 0x15, 0x16, 0x41, 0x5,
        ])
        .unwrap();
        // u64 message length
        let part = Part::from_cbor(&[
            0x85, 0x1, 0x2, 0x1b, 0x0, 0x0, 0x0, 0x1, 0x0, 0x0, 0x0, 0x0, 0x4, 0x41, 0x5,
        ])
        .unwrap();
        assert_eq!(part.message_length, 1 << 32);
        // sequence numbers and checksum must fit a u32
        assert!(Part::from_cbor(&[
            0x85, 0x1b, 0x1, 0x2, 0x3, 0x4, 0xa, 0xb, 0xc, 0xd, 0x1a, 0x5, 0x6, 0x7, 0x8, 0x1a,
            0x9, 0x10, 0x11, 0x12, 0x1a, 0x13, 0x14, 0x15, 0x16, 0x41, 0x5,
        ])
        .is_err());
        assert!(Part::from_cbor(&[
            0x85, 0x1a, 0x1, 0x2, 0x3, 0x4, 0x1b, 0x5, 0x6, 0x7, 0x8, 0xa, 0xb, 0xc, 0xd, 0x1a,
            0x9, 0x10, 0x11, 0x12, 0x1a, 0x13, 0x14, 0x15, 0x16, 0x41, 0x5,
        ])
        .is_err());
        assert!(Part::from_cbor(&[
            0x85, 0x1a, 0x1, 0x2, 0x3, 0x4, 0x1a, 0x5, 0x6, 0x7, 0x8, 0x1a, 0x9, 0x10, 0x11, 0x12,
            0x1b, 0x13, 0x14, 0x15, 0x16, 0xa, 0xb, 0xc, 0xd, 0x41, 0x5,
        ])
        .is_err());
    }

    #[test]
    fn test_part_display() {
        let part = part(3, 42, vec![0x00, 0xff, 0x10]);
        assert_eq!(
            part.to_string(),
            "seqNum:3, seqLen:8, messageLen:100, checksum:42, data:00ff10"
        );
        assert_eq!(part.sequence_id(), "3-8");
    }

    #[test]
    fn test_part_is_valid() {
        assert!(part(1, 0, vec![1]).is_valid());
        assert!(!part(0, 0, vec![1]).is_valid());
        assert!(!part(1, 0, vec![]).is_valid());
    }

    #[test]
    fn test_part_indexes() {
        let message = make_message("Wolf", 1024);
        let reference = Encoder::new(&message, 100).unwrap();
        for part in reference.clone().take(30) {
            assert_eq!(reference.mix(&part.indexes()), part.data);
        }
    }
}
