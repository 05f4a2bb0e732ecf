//! Binary Canonical Serialization (BCS).
//!
//! Every value sent to a validator is encoded with BCS, and the validator
//! re-encodes what it decodes before checking signatures, so the bytes produced
//! here must match its decoder exactly. The encoder is a [`serde::Serializer`]:
//! any type deriving [`serde::Serialize`] can be encoded with [`to_bytes`].
//!
//! # Format
//!
//! | Value | Encoding |
//! |-------|----------|
//! | `bool` | one byte, `0x00` or `0x01` |
//! | `u8`..`u128`, `i8`..`i128` | fixed width, little-endian (two's complement for signed) |
//! | length | ULEB128: 7 bits per byte, least significant group first, high bit set on every byte but the last |
//! | bytes, `str` | ULEB128 length, then the raw bytes (UTF-8 for strings) |
//! | sequence `Vec<T>` | ULEB128 element count, then each element in order |
//! | fixed-size array, tuple | each element in order, no length |
//! | struct, tuple struct | each field in declaration order, no tags or padding |
//! | newtype struct | the inner value |
//! | `Option<T>` | `0x00` for `None`, `0x01` followed by the value for `Some` |
//! | enum | ULEB128 variant index (declaration order, from zero), then the variant's fields |
//! | map | ULEB128 entry count, then key/value pairs sorted by the encoded key bytes |
//! | unit, unit struct | nothing |
//!
//! Lengths above [`MAX_SEQUENCE_LENGTH`] are rejected, as is nesting of
//! structs and enums deeper than [`MAX_CONTAINER_DEPTH`]. Floating point and
//! `char` values have no canonical form and are rejected with
//! [`Error::NotSupported`].
//!
//! ULEB128 is minimal by construction: the encoder never emits a trailing
//! `0x80` group, so each length has exactly one encoding.
//!
//! # Example
//!
//! ```rust
//! use aptos_txn_pipeline::bcs;
//!
//! assert_eq!(bcs::to_bytes(&717u64).unwrap(), vec![0xcd, 0x02, 0, 0, 0, 0, 0, 0]);
//! assert_eq!(bcs::to_bytes("abc").unwrap(), vec![3, b'a', b'b', b'c']);
//! assert_eq!(bcs::to_bytes(&vec![1u16, 2]).unwrap(), vec![2, 1, 0, 2, 0]);
//! ```

mod ser;

pub use ser::{
    serialize_into, serialized_size, to_bytes, uleb128_len, write_uleb128, MapSerializer,
    Serializer,
};

use thiserror::Error;

/// Maximum number of elements (or bytes) in an encoded sequence: 2^31 - 1.
pub const MAX_SEQUENCE_LENGTH: usize = (1 << 31) - 1;

/// Maximum nesting of structs and enums while encoding.
pub const MAX_CONTAINER_DEPTH: usize = 500;

/// A specialized Result type for encoding.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by the encoder. All of them indicate caller misuse: the value
/// handed to the encoder has no canonical representation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The value uses a serde data type that has no canonical encoding.
    #[error("{0} is not supported by the canonical encoding")]
    NotSupported(&'static str),

    /// A sequence, string or byte array is longer than 2^31 - 1.
    #[error("sequence length {0} exceeds the maximum of 2^31 - 1")]
    ExceededMaxLen(usize),

    /// Structs and enums are nested too deeply.
    #[error("exceeded the container depth limit of 500 at {0}")]
    ExceededContainerDepthLimit(&'static str),

    /// A sequence was serialized without an up-front length.
    #[error("sequences must report their length before their elements")]
    MissingLen,

    /// A map contained two keys with identical encodings.
    #[error("map contains duplicate keys")]
    NonCanonicalMap,

    /// The underlying writer failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// Error raised by a `Serialize` implementation.
    #[error("{0}")]
    Custom(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}
