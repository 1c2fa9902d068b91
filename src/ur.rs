//! Typed payloads.
//!
//! A [`Ur`] pairs a CBOR-encoded payload with a type tag from the registry
//! of recognized Uniform Resource types. The fountain encoder itself does
//! not care about the tag and works on the raw CBOR bytes.

use core::fmt;

use crate::fountain;

/// Recognized Uniform Resource types.
static REGISTRY: phf::Set<&'static str> = phf::phf_set! {
    "bytes",
    "crypto-account",
    "crypto-address",
    "crypto-bip39",
    "crypto-coin-info",
    "crypto-ec-key",
    "crypto-eckey",
    "crypto-hdkey",
    "crypto-keypath",
    "crypto-output",
    "crypto-psbt",
    "crypto-request",
    "crypto-response",
    "crypto-seed",
    "crypto-sskr",
};

/// Whether `ur_type` is a recognized Uniform Resource type.
#[must_use]
pub fn is_ur_type(ur_type: &str) -> bool {
    REGISTRY.contains(ur_type)
}

/// Errors that can be returned when constructing or unwrapping a [`Ur`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The type tag is not in the registry.
    UnrecognizedType(String),
    /// The payload is not a single CBOR byte string.
    NotBytes,
    /// The payload could not be written as CBOR.
    Encode(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedType(ur_type) => write!(f, "unrecognized UR type {ur_type:?}"),
            Self::NotBytes => write!(f, "payload is not a CBOR byte string"),
            Self::Encode(e) => write!(f, "failed to encode payload: {e}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// A typed, CBOR-encoded payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ur {
    ur_type: String,
    cbor: Vec<u8>,
}

impl Ur {
    /// Wraps `cbor` under `ur_type`.
    ///
    /// # Errors
    ///
    /// Fails if `ur_type` is not a recognized type.
    pub fn new(cbor: Vec<u8>, ur_type: &str) -> Result<Self, Error> {
        if !is_ur_type(ur_type) {
            return Err(Error::UnrecognizedType(ur_type.into()));
        }
        Ok(Self {
            ur_type: ur_type.into(),
            cbor,
        })
    }

    /// Wraps a raw message as a CBOR byte string of type `bytes`.
    ///
    /// ```
    /// # use fountain_ur::ur::Ur;
    /// let ur = Ur::bytes(b"hi").unwrap();
    /// assert_eq!(ur.ur_type(), "bytes");
    /// assert_eq!(ur.cbor(), &[0x42, b'h', b'i']);
    /// assert_eq!(ur.message().unwrap(), b"hi");
    /// ```
    ///
    /// # Errors
    ///
    /// Only fails if the CBOR encoder rejects the byte string.
    pub fn bytes(message: &[u8]) -> Result<Self, Error> {
        let mut encoder = minicbor::Encoder::new(Vec::with_capacity(message.len() + 9));
        encoder
            .bytes(message)
            .map_err(|e| Error::Encode(e.to_string()))?;
        Ok(Self {
            ur_type: "bytes".into(),
            cbor: encoder.into_writer(),
        })
    }

    #[must_use]
    pub fn ur_type(&self) -> &str {
        &self.ur_type
    }

    #[must_use]
    pub fn cbor(&self) -> &[u8] {
        &self.cbor
    }

    /// Unwraps a payload that is a single CBOR byte string.
    ///
    /// # Errors
    ///
    /// Fails if the payload is anything else.
    pub fn message(&self) -> Result<Vec<u8>, Error> {
        let mut decoder = minicbor::Decoder::new(&self.cbor);
        let message = decoder.bytes().map_err(|_| Error::NotBytes)?;
        if decoder.position() != self.cbor.len() {
            return Err(Error::NotBytes);
        }
        Ok(message.to_vec())
    }

    /// Starts a fountain encoder over the CBOR payload.
    ///
    /// # Errors
    ///
    /// See [`fountain::Encoder::with_options`].
    pub fn encoder(
        &self,
        options: &fountain::Options,
    ) -> Result<fountain::Encoder, fountain::Error> {
        fountain::Encoder::with_options(&self.cbor, options)
    }
}
