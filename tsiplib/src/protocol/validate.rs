use super::crc::{read_be_u32, ChecksumStyle};
use super::{max_packet_len, Framing, MIN_PACKET_LEN, TRAILER_LEN};

/// Why a framed packet was rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// Packet is shorter than an identifier plus trailer, or longer
    /// than the largest payload allows.
    SizeMismatch { len: usize },
    /// Packet begins with an escape byte.
    IllegalId(u8),
    /// Trailer does not match the checksum of the packet.
    ChecksumMismatch { calculated: u32, provided: u32 },
}

#[cfg(feature = "std")]
impl std::error::Error for PacketError {}

impl core::fmt::Display for PacketError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::SizeMismatch { len } => write!(f, "size mismatch: {} byte packet", len),
            Self::IllegalId(id) => write!(f, "illegal packet id {:#04x}", id),
            Self::ChecksumMismatch {
                calculated,
                provided,
            } => write!(
                f,
                "checksum mismatch: calculated {:#010x}, provided {:#010x}",
                calculated, provided
            ),
        }
    }
}

/// Checks size, identifier and checksum of a destuffed packet.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Validator<C> {
    crc: C,
    escape: u8,
    max_len: usize,
}

impl<C> Validator<C>
where
    C: ChecksumStyle,
{
    pub fn new(crc: C, framing: Framing, max_payload: usize) -> Self {
        Self {
            crc,
            escape: framing.escape,
            max_len: max_packet_len(max_payload),
        }
    }

    pub fn crc(&self) -> &C {
        &self.crc
    }

    /// Longest packet this validator accepts, trailer included.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Validate a packet, identifier through trailer.
    ///
    /// Checks happen in order (size, identifier, checksum) and the
    /// first failure is returned.
    pub fn validate(&self, packet: &[u8]) -> Result<(), PacketError> {
        let len = packet.len();
        if len < MIN_PACKET_LEN || len > self.max_len {
            return Err(PacketError::SizeMismatch { len });
        }

        if packet[0] == self.escape {
            return Err(PacketError::IllegalId(packet[0]));
        }

        let (body, trailer) = packet.split_at(len - TRAILER_LEN);
        // always four bytes, length checked above
        let provided = read_be_u32(trailer).unwrap_or_default();
        let calculated = self.crc.checksum(body);
        if !self.crc.validate(calculated, provided) {
            return Err(PacketError::ChecksumMismatch {
                calculated,
                provided,
            });
        }

        Ok(())
    }
}
