use super::Packet;
use super::layout;

impl Packet {
    /// Serialize into the canonical wire form.
    ///
    /// Emits whatever checksum is currently stored; call
    /// [`Packet::recalculate_checksum`] first after mutating a field.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.wire_len());
        self.write_to(&mut buf);
        buf
    }

    /// Append the wire form to `buf`.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        for word in self.header_words() {
            buf.extend_from_slice(&word.to_be_bytes());
        }
        buf.extend_from_slice(&self.payload);
    }

    /// Number of bytes [`Packet::to_bytes`] produces.
    pub fn wire_len(&self) -> usize {
        layout::HEADER_LEN + self.payload.len()
    }

    fn header_words(&self) -> [u32; 5] {
        let control = (u32::from(self.frequency) << layout::FREQUENCY_SHIFT)
            | u32::from(self.flags.to_bits());
        [
            (u32::from(self.source_port) << 16) | u32::from(self.destination_port),
            self.sequence_number,
            self.ack_number,
            (control << 24) | (u32::from(self.data_offset) << 16) | u32::from(self.checksum),
            self.window_size,
        ]
    }
}
