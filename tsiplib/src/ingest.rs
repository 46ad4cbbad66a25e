use log::{debug, warn};

use crate::buffer::BoundedBuffer;
use crate::DecoderConfig;

/// Pulls raw blocks from a byte source.
///
/// The first empty read, or the first error, exhausts the source for
/// good: every later block comes back empty without touching it.
#[derive(Debug)]
pub struct Ingest<R>
where
    R: embedded_io::Read,
{
    source: R,
    fill_target: usize,
    chunk_size: usize,
    exhausted: bool,
    bytes_read: u64,
    error: Option<R::Error>,
}

impl<R> Ingest<R>
where
    R: embedded_io::Read,
{
    pub fn new(config: &DecoderConfig, source: R) -> Self {
        Self {
            source,
            fill_target: config.fill_target,
            chunk_size: config.chunk_size,
            exhausted: false,
            bytes_read: 0,
            error: None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Release the source, and the error that exhausted it, if any.
    pub fn free(self) -> (R, Option<R::Error>) {
        (self.source, self.error)
    }

    /// Replace the contents of `raw` with the next block.
    ///
    /// Reads in chunks until the block reaches its fill target or the
    /// source runs dry. Returns the block length; zero means the
    /// source is exhausted.
    pub fn fill(&mut self, raw: &mut BoundedBuffer) -> usize {
        raw.clear();
        if self.exhausted {
            return 0;
        }

        let target = self.fill_target.min(raw.capacity());
        while raw.len() < target {
            let want = (target - raw.len()).min(self.chunk_size);
            match raw.read(&mut self.source, want) {
                Ok(0) => {
                    debug!("byte source exhausted after {} bytes", self.bytes_read);
                    self.exhausted = true;
                    break;
                }
                Ok(amt) => self.bytes_read += amt as u64,
                Err(e) => {
                    warn!("byte source failed after {} bytes: {:?}", self.bytes_read, e);
                    self.error = Some(e);
                    self.exhausted = true;
                    break;
                }
            }
        }

        raw.len()
    }
}
