//! UTF-8 as laid out by RFC 3629.
//!
//! ```text
//! Char. number range  |        UTF-8 octet sequence
//! --------------------+---------------------------------------------
//! 0000 0000-0000 007F | 0xxxxxxx
//! 0000 0080-0000 07FF | 110xxxxx 10xxxxxx
//! 0000 0800-0000 FFFF | 1110xxxx 10xxxxxx 10xxxxxx
//! 0001 0000-0010 FFFF | 11110xxx 10xxxxxx 10xxxxxx 10xxxxxx
//! ```

use tracing::{debug, trace};

use crate::codec::{is_surrogate, points, Codec};
use crate::error::{DecodingError, EncodingError};

const MAX_CODEPOINT: u32 = 0x10FFFF;

/// Lead byte prefix, indexed by sequence width.
const LEAD_PREFIX: [u8; 5] = [0, 0, 0b1100_0000, 0b1110_0000, 0b1111_0000];

/// Smallest value each width may carry; anything below is overlong.
const MIN_VALUE: [u32; 5] = [0, 0, 0x80, 0x800, 0x10000];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utf8;

impl Codec for Utf8 {
    fn encode(&self, points: &[u32]) -> Result<Vec<u8>, EncodingError> {
        trace!(points = points.len(), "encoding UTF-8");
        encode_points(points).inspect_err(|error| debug!(%error, "UTF-8 encoding rejected"))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<u32>, DecodingError> {
        trace!(bytes = bytes.len(), "decoding UTF-8");
        decode_bytes(bytes).inspect_err(|error| debug!(%error, "UTF-8 decoding rejected"))
    }
}

impl Utf8 {
    pub fn encode_str(&self, text: &str) -> Result<Vec<u8>, EncodingError> {
        self.encode(&points(text))
    }

    pub fn decode_to_string(&self, bytes: &[u8]) -> Result<String, DecodingError> {
        Ok(self
            .decode(bytes)?
            .into_iter()
            .map(|value| char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect())
    }
}

const fn width(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x7FF => 2,
        0x800..=0xFFFF => 3,
        _ => 4,
    }
}

fn encode_points(points: &[u32]) -> Result<Vec<u8>, EncodingError> {
    if points.is_empty() {
        return Err(EncodingError::Empty);
    }
    let mut bytes = Vec::with_capacity(points.len());
    for (index, &value) in points.iter().enumerate() {
        if is_surrogate(value) {
            return Err(EncodingError::Surrogate { value, index });
        }
        if value > MAX_CODEPOINT {
            return Err(EncodingError::OutOfRange { value, index });
        }
        let width = width(value);
        if width == 1 {
            bytes.push(value as u8);
            continue;
        }
        bytes.push(LEAD_PREFIX[width] | (value >> (6 * (width - 1))) as u8);
        for shift in (0..width - 1).rev() {
            bytes.push(0b10_000000 | ((value >> (6 * shift)) & 0x3F) as u8);
        }
    }
    Ok(bytes)
}

fn decode_bytes(bytes: &[u8]) -> Result<Vec<u32>, DecodingError> {
    if bytes.is_empty() {
        return Err(DecodingError::Empty);
    }
    let mut points = Vec::with_capacity(bytes.len());
    let mut offset = 0;
    while offset < bytes.len() {
        let lead = bytes[offset];
        let mut sequence = Utf8Sequence::build(lead).ok_or(DecodingError::InvalidLead {
            byte: lead,
            offset,
        })?;
        let needed = sequence.full_len();
        let available = bytes.len() - offset;
        if available < needed {
            return Err(DecodingError::Truncated {
                offset,
                needed,
                available,
            });
        }
        for (position, &byte) in bytes[offset + 1..offset + needed].iter().enumerate() {
            if !sequence.add_point(byte) {
                return Err(DecodingError::InvalidTrail {
                    byte,
                    offset,
                    position: position + 1,
                });
            }
        }
        points.push(sequence.validate(offset)?);
        offset += needed;
    }
    Ok(points)
}

/// One encoded character, filled lead byte first.
struct Utf8Sequence {
    full_length: u8,
    current_length: u8,
    bytes: [u8; 4],
}

impl Utf8Sequence {
    const fn build(byte: u8) -> Option<Self> {
        let full_length = match byte.leading_ones() {
            0 => 1,
            n @ 2..=4 => n,
            _ => return None,
        } as u8;
        Some(Self {
            full_length,
            current_length: 1,
            bytes: [byte, 0, 0, 0],
        })
    }

    fn add_point(&mut self, point: u8) -> bool {
        if self.current_length >= self.full_length {
            return false;
        }
        if point & 0b1100_0000 != 0b1000_0000 {
            return false;
        }
        self.bytes[self.current_len()] = point;
        self.current_length += 1;
        true
    }

    fn get_codepoint(&self) -> u32 {
        if self.full_length == 1 {
            return self.bytes[0] as u32;
        }
        let mut codepoint = (self.bytes[0] & (0xFFu8 >> (self.full_length + 1))) as u32;
        for &byte in &self.bytes[1..self.full_len()] {
            codepoint = (codepoint << 6) | (byte & 0b0011_1111) as u32;
        }
        codepoint
    }

    fn validate(&self, offset: usize) -> Result<u32, DecodingError> {
        let value = self.get_codepoint();
        if is_surrogate(value) {
            return Err(DecodingError::Surrogate { value, offset });
        }
        if value > MAX_CODEPOINT {
            return Err(DecodingError::OutOfRange { value, offset });
        }
        if value < MIN_VALUE[self.full_len()] {
            return Err(DecodingError::Overlong {
                value,
                width: self.full_len(),
                offset,
            });
        }
        Ok(value)
    }

    const fn current_len(&self) -> usize {
        self.current_length as usize
    }

    const fn full_len(&self) -> usize {
        self.full_length as usize
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const TEXT: &str = "我是中国人";

    #[test]
    fn chinese_text_vector() {
        let bytes = TEXT.as_bytes();
        assert_eq!(bytes.len(), 15);
        let points = Utf8.decode(bytes).unwrap();
        assert_eq!(points, vec![0x6211, 0x662F, 0x4E2D, 0x56FD, 0x4EBA]);
        assert_eq!(Utf8.encode(&points).unwrap(), bytes);
        assert_eq!(Utf8.decode_to_string(bytes).unwrap(), TEXT);
        assert_eq!(Utf8.encode_str(TEXT).unwrap(), bytes);
    }

    #[test]
    fn width_boundaries() {
        let cases: [(u32, &[u8]); 8] = [
            (0x00, &[0x00]),
            (0x7F, &[0x7F]),
            (0x80, &[0xC2, 0x80]),
            (0x7FF, &[0xDF, 0xBF]),
            (0x800, &[0xE0, 0xA0, 0x80]),
            (0xFFFF, &[0xEF, 0xBF, 0xBF]),
            (0x10000, &[0xF0, 0x90, 0x80, 0x80]),
            (0x10FFFF, &[0xF4, 0x8F, 0xBF, 0xBF]),
        ];
        for (value, bytes) in cases {
            assert_eq!(Utf8.encode(&[value]).unwrap(), bytes, "{value:#X}");
            assert_eq!(Utf8.decode(bytes).unwrap(), vec![value], "{value:#X}");
        }
    }

    #[test]
    fn empty_input() {
        assert_eq!(Utf8.encode(&[]), Err(EncodingError::Empty));
        assert_eq!(Utf8.decode(&[]), Err(DecodingError::Empty));
        assert_eq!(Utf8.encode_str(""), Err(EncodingError::Empty));
    }

    #[test]
    fn encode_rejects_surrogates_and_large_values() {
        assert_eq!(
            Utf8.encode(&[0x41, 0xD800]),
            Err(EncodingError::Surrogate {
                value: 0xD800,
                index: 1
            })
        );
        assert_eq!(
            Utf8.encode(&[0xDFFF]),
            Err(EncodingError::Surrogate {
                value: 0xDFFF,
                index: 0
            })
        );
        assert_eq!(
            Utf8.encode(&[0x110000]),
            Err(EncodingError::OutOfRange {
                value: 0x110000,
                index: 0
            })
        );
        assert!(Utf8.encode(&[0xD7FF, 0xE000]).is_ok());
    }

    #[test]
    fn truncated() {
        assert_eq!(
            Utf8.decode(&[0xE4, 0xB8]),
            Err(DecodingError::Truncated {
                offset: 0,
                needed: 3,
                available: 2
            })
        );
        assert_eq!(
            Utf8.decode(&[0x41, 0xF0, 0x90, 0x80]),
            Err(DecodingError::Truncated {
                offset: 1,
                needed: 4,
                available: 3
            })
        );
    }

    #[test]
    fn overlong() {
        assert_eq!(
            Utf8.decode(&[0xC0, 0x80]),
            Err(DecodingError::Overlong {
                value: 0,
                width: 2,
                offset: 0
            })
        );
        assert_eq!(
            Utf8.decode(&[0xE0, 0x80, 0xAF]),
            Err(DecodingError::Overlong {
                value: 0x2F,
                width: 3,
                offset: 0
            })
        );
        assert_eq!(
            Utf8.decode(&[0xF0, 0x8F, 0xBF, 0xBF]),
            Err(DecodingError::Overlong {
                value: 0xFFFF,
                width: 4,
                offset: 0
            })
        );
    }

    #[test]
    fn invalid_lead() {
        assert_eq!(
            Utf8.decode(&[0x80]),
            Err(DecodingError::InvalidLead {
                byte: 0x80,
                offset: 0
            })
        );
        assert_eq!(
            Utf8.decode(&[0x61, 0xF8, 0x80, 0x80, 0x80, 0x80]),
            Err(DecodingError::InvalidLead {
                byte: 0xF8,
                offset: 1
            })
        );
        assert!(Utf8.decode(&[0xFF]).is_err());
    }

    #[test]
    fn invalid_continuation() {
        assert_eq!(
            Utf8.decode(&[0xC3, 0x28]),
            Err(DecodingError::InvalidTrail {
                byte: 0x28,
                offset: 0,
                position: 1
            })
        );
        assert_eq!(
            Utf8.decode(&[0xE4, 0xB8, 0xE4]),
            Err(DecodingError::InvalidTrail {
                byte: 0xE4,
                offset: 0,
                position: 2
            })
        );
    }

    #[test]
    fn decoded_range_checks() {
        assert_eq!(
            Utf8.decode(&[0xED, 0xA0, 0x80]),
            Err(DecodingError::Surrogate {
                value: 0xD800,
                offset: 0
            })
        );
        assert_eq!(
            Utf8.decode(&[0xF4, 0x90, 0x80, 0x80]),
            Err(DecodingError::OutOfRange {
                value: 0x110000,
                offset: 0
            })
        );
    }

    proptest! {
        #[test]
        fn round_trip(text in prop::collection::vec(any::<char>(), 1..64)) {
            let points: Vec<u32> = text.iter().map(|&c| c as u32).collect();
            let bytes = Utf8.encode(&points).unwrap();
            let expected: String = text.iter().collect();
            prop_assert_eq!(&bytes, expected.as_bytes());
            prop_assert_eq!(Utf8.decode(&bytes).unwrap(), points);
        }

        #[test]
        fn surrogates_never_encode(value in 0xD800u32..=0xDFFF, prefix in "[a-z]{0,4}") {
            let mut points = crate::codec::points(&prefix);
            points.push(value);
            let is_surrogate_error = matches!(
                Utf8.encode(&points),
                Err(EncodingError::Surrogate { .. })
            );
            prop_assert!(is_surrogate_error);
        }

        #[test]
        fn agrees_with_std(bytes in prop::collection::vec(any::<u8>(), 1..32)) {
            match std::str::from_utf8(&bytes) {
                Ok(text) => {
                    prop_assert_eq!(Utf8.decode(&bytes).unwrap(), crate::codec::points(text));
                    prop_assert_eq!(Utf8.encode_str(text).unwrap(), bytes.clone());
                }
                Err(_) => prop_assert!(Utf8.decode(&bytes).is_err()),
            }
        }
    }
}
