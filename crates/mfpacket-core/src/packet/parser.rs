use super::checksum::checksum_with_field_zeroed;
use super::error::ParseError;
use super::layout;
use super::reader::PacketReader;
use super::{Flags, Packet, PacketBuilder};

/// Parse an MF packet from untrusted bytes.
///
/// Checks run in a fixed order: minimum header length, then the checksum
/// over the whole buffer with the checksum field zeroed, then the payload
/// bound declared by `data_offset`. Bytes past the declared payload are
/// ignored.
///
/// # Errors
/// Returns [`ParseError::TooShort`], [`ParseError::ChecksumMismatch`] or
/// [`ParseError::TruncatedPayload`].
pub fn parse_packet(bytes: &[u8]) -> Result<Packet, ParseError> {
    let reader = PacketReader::new(bytes);
    reader.require_len(layout::HEADER_LEN)?;

    let expected = reader.read_u16_be(layout::CHECKSUM_RANGE)?;
    let actual = checksum_with_field_zeroed(reader.as_bytes());
    if expected != actual {
        return Err(ParseError::ChecksumMismatch { expected, actual });
    }

    let source_port = reader.read_u16_be(layout::SOURCE_PORT_RANGE)?;
    let destination_port = reader.read_u16_be(layout::DESTINATION_PORT_RANGE)?;
    let sequence_number = reader.read_u32_be(layout::SEQUENCE_NUMBER_RANGE)?;
    let ack_number = reader.read_u32_be(layout::ACK_NUMBER_RANGE)?;
    let control = reader.read_u8(layout::CONTROL_OFFSET)?;
    let data_offset = reader.read_u8(layout::DATA_OFFSET_OFFSET)?;
    let window_size = reader.read_u32_be(layout::WINDOW_SIZE_RANGE)?;
    let payload = reader.read_payload(data_offset)?;

    // The control byte shift leaves at most 5 bits and the payload slice is
    // exactly `data_offset` words, so the builder checks cannot fail here.
    Ok(PacketBuilder::new(source_port, destination_port)
        .sequence_number(sequence_number)
        .ack_number(ack_number)
        .flags(Flags::from_bits(control & layout::FLAG_BITS))
        .window_size(window_size)
        .payload(payload.to_vec())
        .assemble(control >> layout::FREQUENCY_SHIFT, data_offset))
}

#[cfg(test)]
mod tests {
    use super::parse_packet;
    use crate::packet::checksum::checksum_with_field_zeroed;
    use crate::packet::error::ParseError;
    use crate::packet::{Flags, Packet, PacketBuilder, layout};

    fn seal(bytes: &mut [u8]) {
        let checksum = checksum_with_field_zeroed(bytes);
        bytes[layout::CHECKSUM_RANGE].copy_from_slice(&checksum.to_be_bytes());
    }

    #[test]
    fn parse_valid_packet() {
        let packet = PacketBuilder::new(5000, 6000)
            .sequence_number(42)
            .ack_number(41)
            .frequency(9)
            .ack(true)
            .window_size(4096)
            .payload(b"data".to_vec())
            .build()
            .unwrap();

        let parsed = parse_packet(&packet.to_bytes()).unwrap();
        assert_eq!(parsed, packet);
        assert_eq!(parsed.frequency(), 9);
        assert_eq!(parsed.payload(), b"data");
    }

    #[test]
    fn parse_short_buffers() {
        for len in 0..layout::HEADER_LEN {
            let err = parse_packet(&vec![0u8; len]).unwrap_err();
            assert_eq!(
                err,
                ParseError::TooShort {
                    needed: layout::HEADER_LEN,
                    actual: len
                }
            );
        }
    }

    #[test]
    fn parse_checksum_mismatch() {
        let packet = Packet::new(1, 2, vec![0u8; 4]).unwrap();
        let mut bytes = packet.to_bytes();
        bytes[layout::HEADER_LEN] ^= 0x01;
        let err = parse_packet(&bytes).unwrap_err();
        assert!(matches!(
            err,
            ParseError::ChecksumMismatch { expected, .. } if expected == packet.checksum()
        ));
    }

    #[test]
    fn parse_truncated_payload() {
        let mut bytes = Packet::new(1, 2, vec![0xaa; 4]).unwrap().to_bytes();
        bytes[layout::DATA_OFFSET_OFFSET] = 2;
        seal(&mut bytes);

        let err = parse_packet(&bytes).unwrap_err();
        assert_eq!(
            err,
            ParseError::TruncatedPayload {
                data_offset: 2,
                needed: layout::HEADER_LEN + 8,
                actual: layout::HEADER_LEN + 4,
            }
        );
    }

    #[test]
    fn parse_ignores_trailing_bytes() {
        let packet = Packet::new(1, 2, vec![0x11; 4]).unwrap();
        let mut bytes = packet.to_bytes();
        bytes.extend_from_slice(&[0xee, 0xee]);
        seal(&mut bytes);

        let parsed = parse_packet(&bytes).unwrap();
        assert_eq!(parsed.payload(), &[0x11; 4]);
        assert_eq!(parsed.data_offset(), 1);
        assert_eq!(parsed.checksum(), packet.checksum());
    }

    #[test]
    fn parse_recovers_every_flag_combination() {
        for bits in 0..8u8 {
            let flags = Flags::from_bits(bits);
            let packet = PacketBuilder::new(7, 8).flags(flags).build().unwrap();
            let parsed = parse_packet(&packet.to_bytes()).unwrap();
            assert_eq!(parsed.flags, flags, "flags {bits:03b}");
        }
    }

    #[test]
    fn parse_does_not_mutate_input() {
        let bytes = Packet::new(1, 2, Vec::new()).unwrap().to_bytes();
        let copy = bytes.clone();
        parse_packet(&bytes).unwrap();
        assert_eq!(bytes, copy);
    }
}
