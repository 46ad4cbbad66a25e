use crate::buffer::CapacityError;
use crate::protocol::PacketError;

/// Running counts kept by a [Dispatcher](crate::Dispatcher).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodeStats {
    /// Blocks handed to the dispatcher.
    pub blocks: u64,
    /// Destuffed bytes handed to the dispatcher.
    pub bytes: u64,
    /// Packets that passed validation and were interpreted.
    pub packets: u64,
    pub size_mismatch: u64,
    pub illegal_id: u64,
    pub checksum_mismatch: u64,
    /// Unfinished packets dropped because they outgrew the carry-over.
    pub overflows: u64,
}

impl DecodeStats {
    pub fn record_packet_error(&mut self, err: &PacketError) {
        match err {
            PacketError::SizeMismatch { .. } => self.size_mismatch += 1,
            PacketError::IllegalId(_) => self.illegal_id += 1,
            PacketError::ChecksumMismatch { .. } => self.checksum_mismatch += 1,
        }
    }

    pub fn record_overflow(&mut self, _err: &CapacityError) {
        self.overflows += 1;
    }

    /// Packets found but rejected by validation.
    pub fn rejected(&self) -> u64 {
        self.size_mismatch + self.illegal_id + self.checksum_mismatch
    }
}

/// Everything known once a byte source has been drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodeReport {
    /// Raw bytes read from the source.
    pub bytes_read: u64,
    pub stats: DecodeStats,
    /// The run was stopped before the source was exhausted.
    pub cancelled: bool,
}

impl DecodeReport {
    /// Packets that passed validation and were interpreted.
    pub fn packets(&self) -> u64 {
        self.stats.packets
    }
}

/// The byte source failed partway through.
///
/// Everything read before the failure has still been decoded, and is
/// counted in `report`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PipelineError<E> {
    Source { error: E, report: DecodeReport },
}

impl<E> PipelineError<E> {
    pub fn report(&self) -> &DecodeReport {
        match self {
            Self::Source { report, .. } => report,
        }
    }
}

#[cfg(feature = "std")]
impl<E> std::error::Error for PipelineError<E> where E: core::fmt::Debug {}

impl<E> core::fmt::Display for PipelineError<E>
where
    E: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Source { error, report } => write!(
                f,
                "byte source failed after {} bytes: {:?}",
                report.bytes_read, error
            ),
        }
    }
}
