use crate::buffer::BoundedBuffer;
use crate::ingest::Ingest;
use crate::protocol::{destuff_into, ChecksumStyle, Destuffed, Framing};
use crate::report::{DecodeReport, DecodeStats, PipelineError};
use crate::{ConfigError, DecoderConfig, Dispatcher, Interpreter};

/// A single-threaded stream decoder.
///
/// Either push raw bytes in with [Self::feed], or let it pull blocks
/// from a byte source with [Self::drain]. Storage for one block is
/// allocated up front.
#[derive(Debug, Clone)]
pub struct Decoder<C, I> {
    config: DecoderConfig,
    raw: BoundedBuffer,
    block: Destuffed,
    dispatcher: Dispatcher<C, I>,
}

impl<C, I> Decoder<C, I>
where
    C: ChecksumStyle,
    I: Interpreter,
{
    pub fn new(config: DecoderConfig, crc: C, interpreter: I) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            raw: BoundedBuffer::new(config.fill_target),
            block: Destuffed::with_capacity(config.fill_target),
            dispatcher: Dispatcher::new(&config, crc, interpreter),
            config,
        })
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn framing(&self) -> &Framing {
        &self.config.framing
    }

    pub fn stats(&self) -> &DecodeStats {
        self.dispatcher.stats()
    }

    pub fn dispatcher(&self) -> &Dispatcher<C, I> {
        &self.dispatcher
    }

    /// Release the interpreter and final counts.
    pub fn free(self) -> (I, DecodeStats) {
        self.dispatcher.free()
    }

    /// Decode the next raw block of the stream.
    ///
    /// Blocks may split packets anywhere; whatever is unfinished is
    /// carried over to the next call. Input longer than the fill
    /// target is decoded as several blocks.
    pub fn feed(&mut self, raw: &[u8]) {
        for chunk in raw.chunks(self.config.fill_target) {
            destuff_into(&self.config.framing, chunk, &mut self.block);
            self.dispatcher.dispatch_raw(chunk, &mut self.block);
        }
    }

    /// Read and decode blocks from `source` until it is exhausted.
    pub fn drain<R>(&mut self, source: R) -> Result<DecodeReport, PipelineError<R::Error>>
    where
        R: embedded_io::Read,
    {
        let mut ingest = Ingest::new(&self.config, source);
        while ingest.fill(&mut self.raw) > 0 {
            destuff_into(&self.config.framing, self.raw.data(), &mut self.block);
            self.dispatcher.dispatch_raw(self.raw.data(), &mut self.block);
        }

        let report = DecodeReport {
            bytes_read: ingest.bytes_read(),
            stats: *self.dispatcher.stats(),
            cancelled: false,
        };
        match ingest.free() {
            (_, Some(error)) => Err(PipelineError::Source { error, report }),
            (_, None) => Ok(report),
        }
    }
}
