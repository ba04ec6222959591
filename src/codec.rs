use std::fmt;
use std::str::FromStr;

use crate::error::{DecodingError, EncodingError, UnknownEncoding};
use crate::gb18030::Gb18030;
use crate::utf8::Utf8;

/// A stateless conversion between code point values and encoded bytes.
///
/// Both directions work on whole, fully materialized buffers. An empty input
/// is an error rather than an empty output, and the first violation aborts
/// the call without returning any partial result.
pub trait Codec {
    fn encode(&self, points: &[u32]) -> Result<Vec<u8>, EncodingError>;
    fn decode(&self, bytes: &[u8]) -> Result<Vec<u32>, DecodingError>;
}

pub(crate) const fn is_surrogate(value: u32) -> bool {
    matches!(value, 0xD800..=0xDFFF)
}

/// The code point sequence of `text`, in order.
pub fn points(text: &str) -> Vec<u32> {
    text.chars().map(u32::from).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Gb18030,
}

impl Encoding {
    pub const ALL: [Encoding; 2] = [Encoding::Utf8, Encoding::Gb18030];

    pub const fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Gb18030 => "GB18030",
        }
    }

    pub fn encode(&self, points: &[u32]) -> Result<Vec<u8>, EncodingError> {
        match self {
            Encoding::Utf8 => Utf8.encode(points),
            Encoding::Gb18030 => Gb18030.encode(points),
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Vec<u32>, DecodingError> {
        match self {
            Encoding::Utf8 => Utf8.decode(bytes),
            Encoding::Gb18030 => Gb18030.decode(bytes),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = UnknownEncoding;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let normalized = label.trim().to_ascii_lowercase().replace('-', "");
        match normalized.as_str() {
            "utf8" => Ok(Encoding::Utf8),
            "gb18030" => Ok(Encoding::Gb18030),
            _ => Err(UnknownEncoding(label.to_owned())),
        }
    }
}
