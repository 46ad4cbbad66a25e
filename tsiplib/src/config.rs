use crate::protocol::{max_packet_len, Framing, MAX_PAYLOAD};

/// Number of concurrent decoding workers.
pub const DEFAULT_WORKERS: usize = 2;

/// Bytes gathered into one block before it is decoded.
pub const BLOCK_SIZE: usize = 2048;

/// Largest single read requested from the byte source.
pub const MAX_CHUNK_SIZE: usize = 512;

/// Largest payload a decoder can be configured for.
pub const PAYLOAD_LIMIT: usize = 0x10000;

/// Problems with a [DecoderConfig].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    NoWorkers,
    EmptyBlock,
    EmptyChunk,
    /// Maximum payload is over [PAYLOAD_LIMIT].
    PayloadTooLarge(usize),
    /// Escape and terminator are the same byte.
    FramingCollision(u8),
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::NoWorkers => write!(f, "at least one worker is required"),
            Self::EmptyBlock => write!(f, "block fill target must be at least 1 byte"),
            Self::EmptyChunk => write!(f, "read chunk size must be at least 1 byte"),
            Self::PayloadTooLarge(n) => write!(
                f,
                "max payload of {} bytes is over the limit of {}",
                n, PAYLOAD_LIMIT
            ),
            Self::FramingCollision(b) => write!(
                f,
                "escape and terminator must differ, both are {:#04x}",
                b
            ),
        }
    }
}

/// Sizes and framing bytes for a decoder.
///
/// These fix every buffer size up front, so decoding never allocates
/// once started.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecoderConfig {
    /// Concurrent workers in a [Pipeline](crate::Pipeline).
    pub workers: usize,
    /// Raw bytes gathered per block.
    pub fill_target: usize,
    /// Largest single read from the byte source.
    pub chunk_size: usize,
    /// Largest payload, not counting identifier or trailer.
    pub max_payload: usize,
    pub framing: Framing,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            fill_target: BLOCK_SIZE,
            chunk_size: MAX_CHUNK_SIZE,
            max_payload: MAX_PAYLOAD,
            framing: Framing::TSIP,
        }
    }
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_fill_target(mut self, fill_target: usize) -> Self {
        self.fill_target = fill_target;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_max_payload(mut self, max_payload: usize) -> Self {
        self.max_payload = max_payload;
        self
    }

    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.fill_target == 0 {
            return Err(ConfigError::EmptyBlock);
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::EmptyChunk);
        }
        if self.max_payload > PAYLOAD_LIMIT {
            return Err(ConfigError::PayloadTooLarge(self.max_payload));
        }
        if self.framing.escape == self.framing.terminator {
            return Err(ConfigError::FramingCollision(self.framing.escape));
        }
        Ok(())
    }

    /// Size of the buffer that carries an unfinished packet from one
    /// block to the next: the longest packet, and the first half of
    /// the escape pair that ends it.
    pub fn carry_capacity(&self) -> usize {
        max_packet_len(self.max_payload) + 1
    }
}
