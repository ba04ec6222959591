use tracing::{debug, trace};

use crate::codec::{is_surrogate, Codec};
use crate::error::{DecodingError, EncodingError};

/// GB18030 with one, two or four bytes per character.
///
/// The values this codec works with are **GB18030 byte patterns**, not
/// Unicode scalar values: a character is represented by its encoded bytes
/// packed big-endian into a `u32`. `0x41` is the single byte `41`, `0xCED2`
/// is the two bytes `CE D2` and `0x81308130` is the four bytes `81 30 81 30`.
/// No mapping table to or from Unicode is involved, so the value `0x6211`
/// (U+6211 in Unicode) is *not* accepted by [`Codec::encode`] here.
///
/// A value is representable when its bytes form one of:
///
/// ```text
/// 00-80
/// 81-FE  40-7E | 80-FE
/// 81-FE  30-39  81-FE  30-39
/// ```
///
/// Values in the surrogate range `D800-DFFF` are refused in both directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gb18030;

impl Codec for Gb18030 {
    fn encode(&self, points: &[u32]) -> Result<Vec<u8>, EncodingError> {
        trace!(points = points.len(), "encoding GB18030");
        encode_points(points).inspect_err(|error| debug!(%error, "GB18030 encoding rejected"))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<u32>, DecodingError> {
        trace!(bytes = bytes.len(), "decoding GB18030");
        decode_bytes(bytes).inspect_err(|error| debug!(%error, "GB18030 decoding rejected"))
    }
}

fn encode_points(points: &[u32]) -> Result<Vec<u8>, EncodingError> {
    if points.is_empty() {
        return Err(EncodingError::Empty);
    }
    let mut bytes = Vec::with_capacity(points.len() * 2);
    for (index, &value) in points.iter().enumerate() {
        if is_surrogate(value) {
            return Err(EncodingError::Surrogate { value, index });
        }
        let packed = value.to_be_bytes();
        let encoded = match value {
            0x00..=0x80 => &packed[3..],
            0x8140..=0xFEFE => &packed[2..],
            0x81308130..=0xFE39FE39 => &packed[..],
            _ => return Err(EncodingError::OutOfRange { value, index }),
        };
        if !GbSequence::accepts(encoded) {
            return Err(EncodingError::OutOfRange { value, index });
        }
        bytes.extend_from_slice(encoded);
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
        let mut sequence = GbSequence::build(lead).ok_or(DecodingError::InvalidLead {
            byte: lead,
            offset,
        })?;
        let available = bytes.len() - offset;
        while !sequence.is_complete() {
            // The width can grow from 2 to 4 once the second byte is known.
            if available < sequence.full_len() {
                return Err(DecodingError::Truncated {
                    offset,
                    needed: sequence.full_len(),
                    available,
                });
            }
            let position = sequence.current_len();
            let byte = bytes[offset + position];
            if !sequence.add_point(byte) {
                return Err(DecodingError::InvalidTrail {
                    byte,
                    offset,
                    position,
                });
            }
        }
        let value = sequence.get_codepoint();
        if is_surrogate(value) {
            return Err(DecodingError::Surrogate { value, offset });
        }
        points.push(value);
        offset += sequence.current_len();
    }
    Ok(points)
}

struct GbSequence {
    data: [u8; 4],
    current_length: u8,
    full_length: u8,
}

impl GbSequence {
    const fn build(byte: u8) -> Option<Self> {
        if byte == 0xFF {
            return None;
        }
        // Multi-byte sequences are at least two bytes; the second one decides.
        let full_length = if byte <= 0x80 { 1 } else { 2 };
        Some(Self {
            data: [byte, 0, 0, 0],
            current_length: 1,
            full_length,
        })
    }

    /// Whether `bytes` is exactly one complete sequence.
    fn accepts(bytes: &[u8]) -> bool {
        let Some((&lead, rest)) = bytes.split_first() else {
            return false;
        };
        let Some(mut sequence) = Self::build(lead) else {
            return false;
        };
        for &byte in rest {
            if sequence.is_complete() || !sequence.add_point(byte) {
                return false;
            }
        }
        sequence.is_complete()
    }

    const fn is_complete(&self) -> bool {
        self.current_length == self.full_length
    }

    fn add_point(&mut self, point: u8) -> bool {
        let accepted = match self.current_length {
            1 => match point {
                0x7F => false,
                0x40..=0xFE => true,
                0x30..=0x39 => {
                    self.full_length = 4;
                    true
                }
                _ => false,
            },
            2 => (0x81..=0xFE).contains(&point),
            3 => (0x30..=0x39).contains(&point),
            _ => false,
        };
        if accepted {
            self.data[self.current_len()] = point;
            self.current_length += 1;
        }
        accepted
    }

    fn get_codepoint(&self) -> u32 {
        self.data[..self.current_len()]
            .iter()
            .fold(0, |value, &byte| (value << 8) | byte as u32)
    }

    const fn current_len(&self) -> usize {
        self.current_length as usize
    }

    const fn full_len(&self) -> usize {
        self.full_length as usize
    }
}
