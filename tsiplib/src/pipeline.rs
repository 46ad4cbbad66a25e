use log::{debug, trace};

use crate::buffer::BoundedBuffer;
use crate::ingest::Ingest;
use crate::protocol::{destuff_into, ChecksumStyle, Destuffed};
use crate::report::{DecodeReport, PipelineError};
use crate::turn::{CancelToken, Turnstile};
use crate::{ConfigError, DecoderConfig, Dispatcher, Interpreter};

/// Decodes a byte source on several worker threads.
///
/// Each worker reads a block, destuffs it, and hands it to the shared
/// dispatcher. Reading and dispatching both take turns in worker
/// order, so the dispatcher sees blocks in the order they were read,
/// while destuffing runs in parallel.
#[derive(Debug)]
pub struct Pipeline<C> {
    config: DecoderConfig,
    crc: C,
    cancel: CancelToken,
}

impl<C> Pipeline<C>
where
    C: ChecksumStyle + Sync,
{
    pub fn new(config: DecoderConfig, crc: C) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            crc,
            cancel: CancelToken::new(),
        })
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// A handle that stops [Self::run] early, from any thread.
    ///
    /// Workers finish the step they are in, and then retire. A
    /// cancelled pipeline stays cancelled.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Decode `source` until it is exhausted, passing every valid
    /// packet to `interpreter` in stream order.
    ///
    /// If the source fails, everything read before the failure is
    /// still decoded.
    pub fn run<R, I>(
        &self,
        source: R,
        interpreter: I,
    ) -> Result<DecodeReport, PipelineError<R::Error>>
    where
        R: embedded_io::Read + Send,
        R::Error: Send,
        I: Interpreter + Send,
    {
        let workers = self.config.workers;
        let ingest = Turnstile::new(workers, Ingest::new(&self.config, source));
        let dispatch = Turnstile::new(
            workers,
            Dispatcher::new(&self.config, &self.crc, interpreter),
        );

        debug!("starting {} workers", workers);
        std::thread::scope(|s| {
            for id in 0..workers {
                let ingest = &ingest;
                let dispatch = &dispatch;
                s.spawn(move || self.work(id, ingest, dispatch));
            }
        });

        let (_, stats) = dispatch.into_inner().free();
        let ingest = ingest.into_inner();
        let report = DecodeReport {
            bytes_read: ingest.bytes_read(),
            stats,
            cancelled: self.cancel.is_cancelled(),
        };
        match ingest.free() {
            (_, Some(error)) => Err(PipelineError::Source { error, report }),
            (_, None) => Ok(report),
        }
    }

    fn work<R, I>(
        &self,
        id: usize,
        ingest: &Turnstile<Ingest<R>>,
        dispatch: &Turnstile<Dispatcher<&C, I>>,
    ) where
        R: embedded_io::Read,
        I: Interpreter,
    {
        let _guard = CancelOnPanic(&self.cancel);
        let framing = &self.config.framing;
        let mut raw = BoundedBuffer::new(self.config.fill_target);
        let mut block = Destuffed::with_capacity(self.config.fill_target);
        let mut blocks = 0usize;

        loop {
            let Some(mut source) = ingest.acquire(id, &self.cancel) else {
                break;
            };
            let len = source.fill(&mut raw);
            drop(source);
            if len == 0 {
                break;
            }

            destuff_into(framing, raw.data(), &mut block);

            let Some(mut dispatcher) = dispatch.acquire(id, &self.cancel) else {
                break;
            };
            trace!(
                "worker {}: {} raw bytes, {} markers",
                id,
                len,
                block.markers.len()
            );
            dispatcher.dispatch_raw(raw.data(), &mut block);
            blocks += 1;
        }

        debug!("worker {} retiring after {} blocks", id, blocks);
    }
}

/// Cancels the pipeline if a worker unwinds, so the others stop
/// waiting for its turns.
struct CancelOnPanic<'a>(&'a CancelToken);

impl Drop for CancelOnPanic<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.cancel();
        }
    }
}
