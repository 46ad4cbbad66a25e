use log::{debug, trace};

use crate::protocol::{
    ChecksumStyle, Destuffed, Framing, MarkerKind, Validator, ID_LEN, TRAILER_LEN,
};
use crate::report::DecodeStats;
use crate::stitch::CarryOver;
use crate::DecoderConfig;

/// A validated packet, with the checksum trailer removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet<'a> {
    data: &'a [u8],
}

impl<'a> Packet<'a> {
    /// Wrap identifier and payload bytes. Returns [None] if there is
    /// no room for an identifier.
    pub fn new(data: &'a [u8]) -> Option<Self> {
        (data.len() >= ID_LEN).then_some(Self { data })
    }

    pub fn id(&self) -> u8 {
        self.data[0]
    }

    pub fn sub_id(&self) -> u8 {
        self.data[1]
    }

    /// Payload after the two identifier bytes.
    pub fn body(&self) -> &'a [u8] {
        &self.data[ID_LEN..]
    }

    /// Identifier and payload.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl core::ops::Deref for Packet<'_> {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        self.data
    }
}

/// Consumes validated packets, in stream order.
pub trait Interpreter {
    fn interpret(&mut self, packet: Packet<'_>);
}

impl<F> Interpreter for F
where
    F: FnMut(Packet<'_>),
{
    fn interpret(&mut self, packet: Packet<'_>) {
        self(packet)
    }
}

/// Finds, validates and interprets packets in destuffed blocks.
///
/// Blocks must be handed over in the order they were read; the
/// dispatcher owns the carry-over that stitches packets across
/// block boundaries.
#[derive(Debug, Clone)]
pub struct Dispatcher<C, I> {
    framing: Framing,
    validator: Validator<C>,
    carry: CarryOver,
    interpreter: I,
    stats: DecodeStats,
}

impl<C, I> Dispatcher<C, I>
where
    C: ChecksumStyle,
    I: Interpreter,
{
    pub fn new(config: &DecoderConfig, crc: C, interpreter: I) -> Self {
        Self {
            framing: config.framing,
            validator: Validator::new(crc, config.framing, config.max_payload),
            carry: CarryOver::new(config.carry_capacity()),
            interpreter,
            stats: DecodeStats::default(),
        }
    }

    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    pub fn carry(&self) -> &CarryOver {
        &self.carry
    }

    pub fn interpreter(&self) -> &I {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut I {
        &mut self.interpreter
    }

    /// Release the interpreter and final counts.
    pub fn free(self) -> (I, DecodeStats) {
        (self.interpreter, self.stats)
    }

    /// Handle the next block in stream order.
    ///
    /// Markers in `block` may be adjusted to account for an escape left
    /// hanging by the previous block.
    pub fn dispatch(&mut self, block: &mut Destuffed) {
        self.carry.reconcile(&self.framing, block);
        self.dispatch_reconciled(block);
    }

    /// Handle the next block in stream order, given both its raw bytes
    /// and their destuffed contents.
    ///
    /// If the previous block left an escape hanging, `block` is rebuilt
    /// from `raw` with that escape taken into account.
    pub fn dispatch_raw(&mut self, raw: &[u8], block: &mut Destuffed) {
        if self.carry.resolve_hanging(&self.framing, raw, block) {
            trace!("resolved hanging escape against {:#04x}", raw[0]);
        }
        self.dispatch_reconciled(block);
    }

    fn dispatch_reconciled(&mut self, block: &mut Destuffed) {
        self.stats.blocks += 1;
        self.stats.bytes += block.data.len() as u64;

        trace!(
            "dispatching {} bytes, {} markers, {} carried",
            block.data.len(),
            block.markers.len(),
            self.carry.len()
        );

        if block.markers.is_empty() {
            if let Err(e) = self.carry.append_block(block) {
                debug!("dropping unterminated fragment: {}", e);
                self.stats.record_overflow(&e);
            }
            return;
        }

        let Self {
            validator,
            carry,
            interpreter,
            stats,
            framing,
        } = self;

        // close out a packet left over from the last block
        let first = block.markers[0];
        if !carry.is_empty() && first.kind == MarkerKind::End {
            match carry.extend(&block.data[..first.position]) {
                Ok(()) => submit(validator, interpreter, stats, carry.data()),
                Err(e) => {
                    debug!("dropping unterminated fragment: {}", e);
                    stats.record_overflow(&e);
                }
            }
            carry.reset();
        }

        for pair in block.markers.windows(2) {
            if pair[0].kind == MarkerKind::Start && pair[1].kind == MarkerKind::End {
                let packet = &block.data[pair[0].position..pair[1].position];
                submit(validator, interpreter, stats, packet);
            }
        }

        if let Err(e) = carry.store_trailing(framing, block) {
            debug!("dropping unterminated fragment: {}", e);
            stats.record_overflow(&e);
        }
    }
}

fn submit<C, I>(
    validator: &Validator<C>,
    interpreter: &mut I,
    stats: &mut DecodeStats,
    packet: &[u8],
) where
    C: ChecksumStyle,
    I: Interpreter,
{
    match validator.validate(packet) {
        Ok(()) => {
            // validation guarantees room for identifier and trailer
            if let Some(packet) = Packet::new(&packet[..packet.len() - TRAILER_LEN]) {
                interpreter.interpret(packet);
                stats.packets += 1;
            }
        }
        Err(e) => {
            debug!("dropping packet: {}", e);
            stats.record_packet_error(&e);
        }
    }
}
