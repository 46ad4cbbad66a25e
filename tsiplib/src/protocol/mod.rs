/// Data link escape. Starts every two-byte control sequence.
pub const DLE: u8 = 0x10;

/// End of text. Closes a packet when preceded by [DLE].
pub const ETX: u8 = 0x03;

/// Packet identifier and sub-identifier.
pub const ID_LEN: usize = 2;

/// Big-endian CRC-32 at the end of every packet.
pub const TRAILER_LEN: usize = 4;

/// Smallest packet that can pass validation: identifier plus trailer.
pub const MIN_PACKET_LEN: usize = ID_LEN + TRAILER_LEN;

/// Largest decoded payload, not counting identifier or trailer.
pub const MAX_PAYLOAD: usize = 256;

/// Trimble receivers ship at 9600 8-O-1.
pub const BAUD_RATE: u32 = 9600;

pub mod crc;
pub use crc::{ChecksumDigest, ChecksumStyle, Crc32};

pub mod validate;
pub use validate::{PacketError, Validator};

#[cfg(feature = "alloc")]
pub mod destuff;
#[cfg(feature = "alloc")]
pub use destuff::{destuff, destuff_after_escape, destuff_into, Destuffed, Marker, MarkerKind};

pub mod serialize;
pub use serialize::{Serializer, StuffError};

/// The pair of byte values that frame a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Framing {
    pub escape: u8,
    pub terminator: u8,
}

impl Framing {
    /// DLE / ETX, as used by TSIP.
    pub const TSIP: Self = Self::new(DLE, ETX);

    pub const fn new(escape: u8, terminator: u8) -> Self {
        Self { escape, terminator }
    }

    /// Can this byte begin a packet identifier?
    ///
    /// An escape byte there would read back as a literal, and a
    /// terminator would read back as the end of a packet.
    pub const fn is_legal_id(&self, id: u8) -> bool {
        id != self.escape && id != self.terminator
    }
}

impl Default for Framing {
    fn default() -> Self {
        Self::TSIP
    }
}

/// Longest packet, identifier and trailer included, for a given
/// maximum payload.
pub const fn max_packet_len(max_payload: usize) -> usize {
    max_payload + MIN_PACKET_LEN
}
