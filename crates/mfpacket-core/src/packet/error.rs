use thiserror::Error;

/// Errors returned when decoding an MF packet from untrusted bytes.
///
/// Every variant is terminal for the buffer that produced it.
///
/// # Examples
/// ```
/// use mfpacket_core::{Packet, ParseError};
///
/// let err = Packet::parse(&[0u8; 4]).unwrap_err();
/// assert!(matches!(err, ParseError::TooShort { needed: 20, actual: 4 }));
/// assert_eq!(err.kind(), "too_short");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("packet too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("checksum mismatch: header carries {expected:#06x}, computed {actual:#06x}")]
    ChecksumMismatch { expected: u16, actual: u16 },
    #[error(
        "truncated payload: data offset {data_offset} needs {needed} bytes, got {actual}"
    )]
    TruncatedPayload {
        data_offset: u8,
        needed: usize,
        actual: usize,
    },
}

impl ParseError {
    /// Stable identifier for logs and machine-readable output.
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::TooShort { .. } => "too_short",
            ParseError::ChecksumMismatch { .. } => "checksum_mismatch",
            ParseError::TruncatedPayload { .. } => "truncated_payload",
        }
    }
}

/// Errors returned when building a packet from logical field values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("frequency {value} does not fit in 5 bits (max 31)")]
    FrequencyOutOfRange { value: u8 },
    #[error("payload length {len} is not a multiple of 4 bytes")]
    UnalignedPayload { len: usize },
    #[error("payload length {len} exceeds maximum of {max} bytes")]
    PayloadTooLong { len: usize, max: usize },
}
