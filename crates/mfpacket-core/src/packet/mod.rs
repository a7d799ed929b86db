//! MF packet codec.
//!
//! An MF packet is a TCP-like segment: ports, sequence/acknowledgment
//! numbers, a 5-bit frequency, three control flags, a checksum, a window
//! size and a word-aligned payload. The codec builds packets from logical
//! fields, serializes them to the canonical big-endian layout and parses
//! untrusted bytes back with deterministic errors. It performs no I/O.
//!
//! ```text
//! Offset  Bytes  Field
//! 0       2      source_port
//! 2       2      destination_port
//! 4       4      sequence_number
//! 8       4      ack_number
//! 12      1      frequency(5 bits) | ack(1) | syn(1) | fin(1)
//! 13      1      data_offset (in 4-byte words)
//! 14      2      checksum
//! 16      4      window_size
//! 20      *      payload (data_offset * 4 bytes)
//! ```
//!
//! The checksum is the low 16 bits of the MD5 digest of the serialized
//! packet with the checksum field zeroed. Byte offsets live in `layout`,
//! bounds-checked reads in `reader`.

pub mod checksum;
pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
mod writer;

pub use error::{BuildError, ParseError};
pub use parser::parse_packet;

/// Control flags carried in the low three bits of byte 12.
///
/// # Examples
/// ```
/// use mfpacket_core::Flags;
///
/// let flags = Flags { ack: true, syn: false, fin: true };
/// assert_eq!(flags.to_bits(), 0b101);
/// assert_eq!(Flags::from_bits(0b101), flags);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags {
    pub ack: bool,
    pub syn: bool,
    pub fin: bool,
}

impl Flags {
    pub fn to_bits(self) -> u8 {
        let mut bits = 0;
        if self.ack {
            bits |= layout::ACK_BIT;
        }
        if self.syn {
            bits |= layout::SYN_BIT;
        }
        if self.fin {
            bits |= layout::FIN_BIT;
        }
        bits
    }

    /// Decode the flag bits; bits above `FIN | SYN | ACK` are ignored.
    pub fn from_bits(bits: u8) -> Self {
        Self {
            ack: bits & layout::ACK_BIT != 0,
            syn: bits & layout::SYN_BIT != 0,
            fin: bits & layout::FIN_BIT != 0,
        }
    }

    pub fn is_empty(self) -> bool {
        self.to_bits() == 0
    }
}

/// A validated MF packet.
///
/// `data_offset` is derived from the payload and `checksum` is computed,
/// so neither can be assigned directly. After changing any field, call
/// [`Packet::recalculate_checksum`] before serializing if the result has to
/// pass [`Packet::parse`].
///
/// # Examples
/// ```
/// use mfpacket_core::{Packet, PacketBuilder};
///
/// let packet = PacketBuilder::new(80, 443)
///     .sequence_number(1)
///     .syn(true)
///     .build()?;
/// let bytes = packet.to_bytes();
/// assert_eq!(bytes.len(), 20);
/// assert_eq!(Packet::parse(&bytes)?, packet);
/// assert!(!packet.is_terminator());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Packet {
    pub source_port: u16,
    pub destination_port: u16,
    pub sequence_number: u32,
    pub ack_number: u32,
    pub flags: Flags,
    pub window_size: u32,
    frequency: u8,
    data_offset: u8,
    checksum: u16,
    payload: Vec<u8>,
}

impl Packet {
    /// Build a packet with default header values (see [`PacketBuilder`]).
    pub fn new(
        source_port: u16,
        destination_port: u16,
        payload: Vec<u8>,
    ) -> Result<Self, BuildError> {
        PacketBuilder::new(source_port, destination_port)
            .payload(payload)
            .build()
    }

    /// Parse and validate untrusted bytes. See [`parse_packet`].
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        parse_packet(bytes)
    }

    pub fn frequency(&self) -> u8 {
        self.frequency
    }

    pub fn data_offset(&self) -> u8 {
        self.data_offset
    }

    pub fn checksum(&self) -> u16 {
        self.checksum
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn set_frequency(&mut self, frequency: u8) -> Result<(), BuildError> {
        self.frequency = validate_frequency(frequency)?;
        Ok(())
    }

    /// Replace the payload and re-derive `data_offset`.
    ///
    /// The stored checksum is left stale.
    pub fn set_payload(&mut self, payload: Vec<u8>) -> Result<(), BuildError> {
        self.data_offset = data_offset_for(&payload)?;
        self.payload = payload;
        Ok(())
    }

    /// Recompute the checksum over the current fields.
    pub fn recalculate_checksum(&mut self) {
        self.checksum = 0;
        self.checksum = checksum::calculate_checksum(&self.to_bytes());
    }

    /// True when no flag is set and the payload is empty.
    pub fn is_terminator(&self) -> bool {
        self.flags.is_empty() && self.payload.is_empty()
    }
}

/// Builder for [`Packet`] with the protocol's default header values:
/// sequence and ack numbers 0, frequency 1, no flags, window 1024 and an
/// empty payload.
#[derive(Debug, Clone)]
pub struct PacketBuilder {
    source_port: u16,
    destination_port: u16,
    sequence_number: u32,
    ack_number: u32,
    frequency: u8,
    flags: Flags,
    window_size: u32,
    payload: Vec<u8>,
}

impl PacketBuilder {
    pub fn new(source_port: u16, destination_port: u16) -> Self {
        Self {
            source_port,
            destination_port,
            sequence_number: 0,
            ack_number: 0,
            frequency: layout::DEFAULT_FREQUENCY,
            flags: Flags::default(),
            window_size: layout::DEFAULT_WINDOW_SIZE,
            payload: Vec::new(),
        }
    }

    pub fn sequence_number(mut self, sequence_number: u32) -> Self {
        self.sequence_number = sequence_number;
        self
    }

    pub fn ack_number(mut self, ack_number: u32) -> Self {
        self.ack_number = ack_number;
        self
    }

    pub fn frequency(mut self, frequency: u8) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn ack(mut self, ack: bool) -> Self {
        self.flags.ack = ack;
        self
    }

    pub fn syn(mut self, syn: bool) -> Self {
        self.flags.syn = syn;
        self
    }

    pub fn fin(mut self, fin: bool) -> Self {
        self.flags.fin = fin;
        self
    }

    pub fn window_size(mut self, window_size: u32) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    /// Validate the fields, derive `data_offset` and compute the checksum.
    ///
    /// # Errors
    /// Returns [`BuildError`] when the frequency does not fit in 5 bits or
    /// the payload is not word-aligned or longer than 255 words.
    pub fn build(self) -> Result<Packet, BuildError> {
        let frequency = validate_frequency(self.frequency)?;
        let data_offset = data_offset_for(&self.payload)?;
        Ok(self.assemble(frequency, data_offset))
    }

    /// Finish a packet whose frequency and data offset are already known to
    /// be consistent with the payload.
    pub(crate) fn assemble(self, frequency: u8, data_offset: u8) -> Packet {
        let mut packet = Packet {
            source_port: self.source_port,
            destination_port: self.destination_port,
            sequence_number: self.sequence_number,
            ack_number: self.ack_number,
            flags: self.flags,
            window_size: self.window_size,
            frequency,
            data_offset,
            checksum: 0,
            payload: self.payload,
        };
        packet.recalculate_checksum();
        packet
    }
}

fn validate_frequency(value: u8) -> Result<u8, BuildError> {
    if value > layout::MAX_FREQUENCY {
        return Err(BuildError::FrequencyOutOfRange { value });
    }
    Ok(value)
}

fn data_offset_for(payload: &[u8]) -> Result<u8, BuildError> {
    let len = payload.len();
    if len % layout::WORD_LEN != 0 {
        return Err(BuildError::UnalignedPayload { len });
    }
    if len > layout::MAX_PAYLOAD_LEN {
        return Err(BuildError::PayloadTooLong {
            len,
            max: layout::MAX_PAYLOAD_LEN,
        });
    }
    u8::try_from(len.div_ceil(layout::WORD_LEN)).map_err(|_| BuildError::PayloadTooLong {
        len,
        max: layout::MAX_PAYLOAD_LEN,
    })
}

#[cfg(test)]
mod tests {
    use super::{BuildError, Flags, Packet, PacketBuilder, checksum, layout};

    #[test]
    fn defaults_match_protocol() {
        let packet = Packet::new(1000, 2000, Vec::new()).unwrap();
        assert_eq!(packet.sequence_number, 0);
        assert_eq!(packet.ack_number, 0);
        assert_eq!(packet.frequency(), 1);
        assert_eq!(packet.flags, Flags::default());
        assert_eq!(packet.window_size, 1024);
        assert_eq!(packet.data_offset(), 0);
        assert!(packet.payload().is_empty());
    }

    #[test]
    fn data_offset_counts_words() {
        let packet = Packet::new(1, 2, vec![0u8; 12]).unwrap();
        assert_eq!(packet.data_offset(), 3);
    }

    #[test]
    fn checksum_covers_zeroed_serialization() {
        let packet = Packet::new(1, 2, b"ping".to_vec()).unwrap();
        let mut bytes = packet.to_bytes();
        bytes[layout::CHECKSUM_RANGE].fill(0);
        assert_eq!(packet.checksum(), checksum::calculate_checksum(&bytes));
    }

    #[test]
    fn rejects_frequency_above_five_bits() {
        let err = PacketBuilder::new(1, 2).frequency(32).build().unwrap_err();
        assert_eq!(err, BuildError::FrequencyOutOfRange { value: 32 });
        assert!(PacketBuilder::new(1, 2).frequency(31).build().is_ok());
    }

    #[test]
    fn rejects_unaligned_payload() {
        let err = Packet::new(1, 2, vec![0u8; 5]).unwrap_err();
        assert_eq!(err, BuildError::UnalignedPayload { len: 5 });
    }

    #[test]
    fn rejects_payload_beyond_data_offset_range() {
        assert!(Packet::new(1, 2, vec![0u8; layout::MAX_PAYLOAD_LEN]).is_ok());
        let err = Packet::new(1, 2, vec![0u8; layout::MAX_PAYLOAD_LEN + 4]).unwrap_err();
        assert_eq!(
            err,
            BuildError::PayloadTooLong {
                len: layout::MAX_PAYLOAD_LEN + 4,
                max: layout::MAX_PAYLOAD_LEN,
            }
        );
    }

    #[test]
    fn set_payload_rederives_offset_but_keeps_checksum() {
        let mut packet = Packet::new(1, 2, Vec::new()).unwrap();
        let stale = packet.checksum();
        packet.set_payload(vec![1u8; 8]).unwrap();
        assert_eq!(packet.data_offset(), 2);
        assert_eq!(packet.checksum(), stale);
        assert!(Packet::parse(&packet.to_bytes()).is_err());

        packet.recalculate_checksum();
        assert_eq!(Packet::parse(&packet.to_bytes()).unwrap(), packet);
    }

    #[test]
    fn set_payload_rejects_unaligned_and_leaves_packet_untouched() {
        let mut packet = Packet::new(1, 2, vec![7u8; 4]).unwrap();
        assert!(packet.set_payload(vec![0u8; 3]).is_err());
        assert_eq!(packet.payload(), &[7u8; 4]);
        assert_eq!(packet.data_offset(), 1);
    }

    #[test]
    fn set_frequency_validates() {
        let mut packet = Packet::new(1, 2, Vec::new()).unwrap();
        packet.set_frequency(17).unwrap();
        assert_eq!(packet.frequency(), 17);
        assert!(packet.set_frequency(40).is_err());
        assert_eq!(packet.frequency(), 17);
    }

    #[test]
    fn terminator_requires_no_flags_and_no_payload() {
        assert!(Packet::new(1, 2, Vec::new()).unwrap().is_terminator());
        assert!(!Packet::new(1, 2, vec![0u8; 4]).unwrap().is_terminator());
        for bits in 1..8u8 {
            let packet = PacketBuilder::new(1, 2)
                .flags(Flags::from_bits(bits))
                .build()
                .unwrap();
            assert!(!packet.is_terminator(), "flags {bits:03b}");
        }
    }

    #[test]
    fn flag_bits_ignore_frequency() {
        let flags = Flags::from_bits(0b1111_1010);
        assert_eq!(
            flags,
            Flags {
                ack: false,
                syn: true,
                fin: false
            }
        );
    }
}
