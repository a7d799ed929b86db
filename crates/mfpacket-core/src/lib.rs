//! MF packet codec.
//!
//! The [`packet`] module is the codec: it builds MF packets from logical
//! fields, serializes them to the canonical 20-byte big-endian header plus
//! word-aligned payload, and parses untrusted bytes back with deterministic,
//! tagged errors. It is pure and holds no shared state, so independent
//! packets can be handled from any number of threads.
//!
//! Sockets, connection state and retransmission live outside this crate.
//!
//! Invariants:
//! - `data_offset` is always derived from the payload, never assigned.
//! - A packet's checksum is only trustworthy after construction or
//!   [`Packet::recalculate_checksum`].
//!
//! # Examples
//! ```
//! use mfpacket_core::{Packet, PacketBuilder, ParseError};
//!
//! let packet = PacketBuilder::new(80, 443).sequence_number(1).syn(true).build()?;
//! let mut bytes = packet.to_bytes();
//! assert_eq!(bytes[12], 0x0a);
//! assert_eq!(Packet::parse(&bytes)?, packet);
//!
//! bytes[0] ^= 0x80;
//! assert!(matches!(
//!     Packet::parse(&bytes),
//!     Err(ParseError::ChecksumMismatch { .. })
//! ));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod packet;

pub use packet::checksum;
pub use packet::{BuildError, Flags, Packet, PacketBuilder, ParseError};
