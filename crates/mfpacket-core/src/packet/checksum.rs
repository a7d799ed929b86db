use md5::{Digest, Md5};

use super::layout;

/// Compute the 16-bit packet checksum over `bytes`.
///
/// The value is the low 16 bits of the MD5 digest read as a big-endian
/// integer, i.e. its last two bytes. This is a corruption check only.
///
/// # Examples
/// ```
/// use mfpacket_core::checksum::calculate_checksum;
///
/// assert_eq!(calculate_checksum(b""), 0x427e);
/// ```
pub fn calculate_checksum(bytes: &[u8]) -> u16 {
    let digest = Md5::digest(bytes);
    let len = digest.len();
    u16::from_be_bytes([digest[len - 2], digest[len - 1]])
}

/// Compute the checksum of a serialized packet as if its checksum field
/// were zero. `bytes` itself is left untouched.
///
/// Buffers shorter than the header are hashed as-is.
pub fn checksum_with_field_zeroed(bytes: &[u8]) -> u16 {
    if bytes.len() < layout::HEADER_LEN {
        return calculate_checksum(bytes);
    }
    let mut scratch = bytes.to_vec();
    scratch[layout::CHECKSUM_RANGE].fill(0);
    calculate_checksum(&scratch)
}
