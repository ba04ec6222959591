use thiserror::Error;

/// A code point sequence could not be encoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("nothing to encode: the code point sequence is empty")]
    Empty,
    #[error("surrogate value {value:#06X} at index {index} cannot be encoded")]
    Surrogate { value: u32, index: usize },
    #[error("value {value:#X} at index {index} is outside the representable range")]
    OutOfRange { value: u32, index: usize },
}

/// A byte sequence is not well-formed for the active encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodingError {
    #[error("nothing to decode: the byte sequence is empty")]
    Empty,
    #[error("invalid lead byte {byte:#04X} at offset {offset}")]
    InvalidLead { byte: u8, offset: usize },
    #[error("truncated sequence at offset {offset}: need {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// `position` is the index of the bad byte inside its sequence, starting at 1.
    #[error("invalid byte {byte:#04X} at position {position} of the sequence at offset {offset}")]
    InvalidTrail {
        byte: u8,
        offset: usize,
        position: usize,
    },
    #[error("decoded surrogate value {value:#06X} at offset {offset}")]
    Surrogate { value: u32, offset: usize },
    #[error("decoded value {value:#X} at offset {offset} is outside the representable range")]
    OutOfRange { value: u32, offset: usize },
    #[error("overlong {width}-byte encoding of {value:#X} at offset {offset}")]
    Overlong {
        value: u32,
        width: usize,
        offset: usize,
    },
}

/// An encoding label that names neither supported scheme.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown encoding {0:?}, expected one of: utf-8, gb18030")]
pub struct UnknownEncoding(pub String);

/// A command line value that is not a hexadecimal number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value {0:?}, expected hexadecimal such as 6211, U+6211 or 0xCED2")]
pub struct InvalidValue(pub String);
