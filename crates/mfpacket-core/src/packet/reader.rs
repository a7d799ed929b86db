use super::error::ParseError;
use super::layout;

/// Bounds-checked big-endian access to an untrusted packet buffer.
pub struct PacketReader<'a> {
    bytes: &'a [u8],
}

impl<'a> PacketReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), ParseError> {
        if self.bytes.len() < needed {
            return Err(ParseError::TooShort {
                needed,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, ParseError> {
        self.bytes
            .get(offset)
            .copied()
            .ok_or(ParseError::TooShort {
                needed: offset + 1,
                actual: self.bytes.len(),
            })
    }

    pub fn read_u16_be(&self, range: std::ops::Range<usize>) -> Result<u16, ParseError> {
        let bytes = self.read_slice(range)?;
        let bytes: [u8; 2] = bytes.try_into().map_err(|_| ParseError::TooShort {
            needed: 2,
            actual: bytes.len(),
        })?;
        Ok(u16::from_be_bytes(bytes))
    }

    pub fn read_u32_be(&self, range: std::ops::Range<usize>) -> Result<u32, ParseError> {
        let bytes = self.read_slice(range)?;
        let bytes: [u8; 4] = bytes.try_into().map_err(|_| ParseError::TooShort {
            needed: 4,
            actual: bytes.len(),
        })?;
        Ok(u32::from_be_bytes(bytes))
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], ParseError> {
        self.bytes.get(range.clone()).ok_or(ParseError::TooShort {
            needed: range.end,
            actual: self.bytes.len(),
        })
    }

    /// Read the payload declared by `data_offset`.
    pub fn read_payload(&self, data_offset: u8) -> Result<&'a [u8], ParseError> {
        let range = layout::payload_range(data_offset);
        self.bytes
            .get(range.clone())
            .ok_or(ParseError::TruncatedPayload {
                data_offset,
                needed: range.end,
                actual: self.bytes.len(),
            })
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}
