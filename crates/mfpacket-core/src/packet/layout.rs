pub const SOURCE_PORT_RANGE: std::ops::Range<usize> = 0..2;
pub const DESTINATION_PORT_RANGE: std::ops::Range<usize> = 2..4;
pub const SEQUENCE_NUMBER_RANGE: std::ops::Range<usize> = 4..8;
pub const ACK_NUMBER_RANGE: std::ops::Range<usize> = 8..12;
pub const CONTROL_OFFSET: usize = 12;
pub const DATA_OFFSET_OFFSET: usize = 13;
pub const CHECKSUM_RANGE: std::ops::Range<usize> = 14..16;
pub const WINDOW_SIZE_RANGE: std::ops::Range<usize> = 16..20;

pub const HEADER_LEN: usize = 20;
pub const WORD_LEN: usize = 4;

// Control byte: frequency(5) | ack(1) | syn(1) | fin(1).
pub const FREQUENCY_SHIFT: u8 = 3;
pub const ACK_BIT: u8 = 0x04;
pub const SYN_BIT: u8 = 0x02;
pub const FIN_BIT: u8 = 0x01;
pub const FLAG_BITS: u8 = ACK_BIT | SYN_BIT | FIN_BIT;

pub const MAX_FREQUENCY: u8 = 0x1f;
pub const MAX_DATA_OFFSET: usize = u8::MAX as usize;
pub const MAX_PAYLOAD_LEN: usize = MAX_DATA_OFFSET * WORD_LEN;

pub const DEFAULT_FREQUENCY: u8 = 1;
pub const DEFAULT_WINDOW_SIZE: u32 = 1024;

pub const fn payload_range(data_offset: u8) -> std::ops::Range<usize> {
    HEADER_LEN..HEADER_LEN + data_offset as usize * WORD_LEN
}
