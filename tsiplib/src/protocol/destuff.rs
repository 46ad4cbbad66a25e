use alloc::vec::Vec;

use super::Framing;

/// Which packet boundary a [Marker] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MarkerKind {
    /// Escape followed by any non-control byte. The byte is the first
    /// byte of the packet.
    Start,
    /// Escape followed by terminator.
    End,
}

/// A packet boundary inside a destuffed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Marker {
    pub position: usize,
    pub kind: MarkerKind,
}

impl Marker {
    pub const fn start(position: usize) -> Self {
        Self {
            position,
            kind: MarkerKind::Start,
        }
    }

    pub const fn end(position: usize) -> Self {
        Self {
            position,
            kind: MarkerKind::End,
        }
    }

    pub fn is_start(&self) -> bool {
        self.kind == MarkerKind::Start
    }

    pub fn is_end(&self) -> bool {
        self.kind == MarkerKind::End
    }
}

/// One block of destuffed data, and the packet boundaries inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Destuffed {
    /// Data with escape sequences removed.
    pub data: Vec<u8>,
    /// Boundaries, in non-decreasing position order.
    pub markers: Vec<Marker>,
    /// The raw block ended on an escape byte that was copied into
    /// `data` uninterpreted.
    pub hanging_escape: bool,
}

impl Destuffed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve room for destuffing raw blocks of up to `block` bytes
    /// without reallocating.
    pub fn with_capacity(block: usize) -> Self {
        Self {
            data: Vec::with_capacity(block),
            // one marker per two raw bytes, plus one inserted while
            // stitching
            markers: Vec::with_capacity(block / 2 + 2),
            hanging_escape: false,
        }
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.markers.clear();
        self.hanging_escape = false;
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Remove escape sequences from a raw block, and mark packet
/// boundaries.
pub fn destuff(framing: &Framing, raw: &[u8]) -> Destuffed {
    let mut out = Destuffed::with_capacity(raw.len());
    destuff_into(framing, raw, &mut out);
    out
}

/// Like [destuff], but reuses the storage in `out`.
///
/// An escape byte at the very end of `raw` can't be interpreted
/// without the next block. It is copied into the output as-is, and
/// `hanging_escape` is set.
pub fn destuff_into(framing: &Framing, raw: &[u8], out: &mut Destuffed) {
    out.clear();
    destuff_from(framing, raw, 0, out);
}

/// Like [destuff_into], but the first byte of `raw` completes an
/// escape that ended the previous block.
///
/// That escape is not part of `raw`, so a second escape here yields no
/// output byte; the literal is whatever already holds the first one.
pub fn destuff_after_escape(framing: &Framing, raw: &[u8], out: &mut Destuffed) {
    out.clear();
    let Some(&first) = raw.first() else {
        return;
    };

    if first == framing.terminator {
        out.markers.push(Marker::end(0));
    } else if first != framing.escape {
        out.markers.push(Marker::start(0));
        out.data.push(first);
    }
    destuff_from(framing, raw, 1, out);
}

fn destuff_from(framing: &Framing, raw: &[u8], mut i: usize, out: &mut Destuffed) {
    while i < raw.len() {
        let b = raw[i];
        if b != framing.escape {
            out.data.push(b);
            i += 1;
            continue;
        }

        let Some(&next) = raw.get(i + 1) else {
            // figure it out later
            out.data.push(b);
            out.hanging_escape = true;
            break;
        };

        if next == framing.terminator {
            out.markers.push(Marker::end(out.data.len()));
        } else if next == framing.escape {
            out.data.push(next);
        } else {
            out.markers.push(Marker::start(out.data.len()));
            out.data.push(next);
        }
        i += 2;
    }
}
