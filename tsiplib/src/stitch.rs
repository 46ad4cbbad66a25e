//! Carrying unfinished packets across block boundaries.
//!
//! Blocks are destuffed independently, so a packet may start in one
//! block and end in a later one, and an escape byte may be the very
//! last byte of a block with its partner at the start of the next.
//! [CarryOver] holds what is left over from the previous block and
//! patches up the markers of the next one to match.

use crate::buffer::{BoundedBuffer, CapacityError};
use crate::protocol::{destuff_after_escape, Destuffed, Framing, Marker, MarkerKind};

/// Bytes of a packet that started in an earlier block and has not
/// been closed yet.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CarryOver {
    buffer: BoundedBuffer,
    hanging_escape: bool,
}

impl CarryOver {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: BoundedBuffer::new(capacity),
            hanging_escape: false,
        }
    }

    pub fn data(&self) -> &[u8] {
        self.buffer.data()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The carried data ends on an escape byte whose meaning depends
    /// on the next block.
    pub fn hanging_escape(&self) -> bool {
        self.hanging_escape
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.hanging_escape = false;
    }

    /// Append the start of a block to the carried packet.
    ///
    /// On overflow the carried data is dropped.
    pub fn extend(&mut self, bytes: &[u8]) -> Result<(), CapacityError> {
        self.buffer.extend(bytes).map_err(|e| {
            self.reset();
            e
        })
    }

    /// Resolve an escape byte left hanging by the previous block,
    /// using the first bytes of `block`.
    ///
    /// The previous escape was carried over as data. Depending on what
    /// follows it, it is either a literal escape (and stays), or the
    /// first half of an end or start sequence (and is removed from
    /// the carried data, with a marker added at position 0 instead).
    pub fn reconcile(&mut self, framing: &Framing, block: &mut Destuffed) {
        if self.buffer.is_empty() || !self.hanging_escape {
            return;
        }
        self.hanging_escape = false;

        if block.markers.first() == Some(&Marker::start(0)) {
            // this block began with an escape pair, but its escape was
            // really the partner of ours
            block.markers.remove(0);
            return;
        }

        let Some(&first) = block.data.first() else {
            return;
        };

        if first == framing.terminator {
            block.markers.insert(0, Marker::end(0));
        } else if first != framing.escape {
            block.markers.insert(0, Marker::start(0));
        }
        self.buffer.shrink(1);
    }

    /// Resolve an escape byte left hanging by the previous block, by
    /// destuffing `raw` again with its first byte as the escape's
    /// partner. `block` must hold the destuffed contents of `raw`.
    ///
    /// Unlike [Self::reconcile], this also gets it right when `raw`
    /// begins with an escape followed by another escape or the
    /// terminator, where the independent destuffing paired bytes up
    /// wrong. Returns whether `block` was rewritten.
    pub fn resolve_hanging(
        &mut self,
        framing: &Framing,
        raw: &[u8],
        block: &mut Destuffed,
    ) -> bool {
        if self.buffer.is_empty() || !self.hanging_escape || raw.is_empty() {
            return false;
        }
        self.hanging_escape = false;

        destuff_after_escape(framing, raw, block);
        if raw[0] != framing.escape {
            // the carried escape opened a start or end sequence
            self.buffer.shrink(1);
        }
        true
    }

    /// Keep whatever part of `block` belongs to an unfinished packet,
    /// after all complete packets have been taken out of it.
    ///
    /// On overflow the carried data is dropped.
    pub fn store_trailing(
        &mut self,
        framing: &Framing,
        block: &Destuffed,
    ) -> Result<(), CapacityError> {
        match block.markers.last() {
            None => self.append_block(block),
            Some(&Marker {
                kind: MarkerKind::Start,
                position,
            }) => {
                let tail = &block.data[position..];
                match self.buffer.replace(tail) {
                    Ok(()) => {
                        self.hanging_escape = block.hanging_escape;
                        Ok(())
                    }
                    Err(e) => {
                        self.reset();
                        Err(e)
                    }
                }
            }
            Some(_) => {
                if block.hanging_escape && block.data.last() == Some(&framing.escape) {
                    // the block ended on an escape that might start
                    // the next packet
                    self.buffer.clear();
                    self.buffer.extend(&[framing.escape])?;
                    self.hanging_escape = true;
                } else {
                    // trailing data outside any packet
                    self.reset();
                }
                Ok(())
            }
        }
    }

    /// Append a block with no markers at all. It is either the middle
    /// of the carried packet, or garbage.
    ///
    /// On overflow the carried data is dropped, except for a hanging
    /// escape that might still start the next packet.
    pub fn append_block(&mut self, block: &Destuffed) -> Result<(), CapacityError> {
        if let Err(e) = self.extend(&block.data) {
            if block.hanging_escape {
                self.buffer.extend(&block.data[block.data.len() - 1..])?;
                self.hanging_escape = true;
            }
            return Err(e);
        }
        self.hanging_escape = block.hanging_escape;
        Ok(())
    }
}
