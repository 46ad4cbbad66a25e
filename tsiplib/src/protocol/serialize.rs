use super::crc::ChecksumStyle;
use super::{Framing, ID_LEN};

/// A trait for writing framed packets.
pub trait Serializer {
    type Error;

    fn write_u8(&mut self, val: u8) -> Result<(), Self::Error>;

    // everything else can be written in terms of write_u8

    fn write_bytes(&mut self, val: &[u8]) -> Result<(), Self::Error> {
        for b in val.iter() {
            self.write_u8(*b)?;
        }
        Ok(())
    }

    fn write_be_u32(&mut self, val: u32) -> Result<(), Self::Error> {
        self.write_bytes(&val.to_be_bytes())
    }
}

impl<S> Serializer for &mut S
where
    S: Serializer,
{
    type Error = S::Error;

    fn write_u8(&mut self, val: u8) -> Result<(), Self::Error> {
        (*self).write_u8(val)
    }

    fn write_bytes(&mut self, val: &[u8]) -> Result<(), Self::Error> {
        (*self).write_bytes(val)
    }

    fn write_be_u32(&mut self, val: u32) -> Result<(), Self::Error> {
        (*self).write_be_u32(val)
    }
}

/// Wrap an [embedded_io::Write] to become a Serializer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SerializerWrap<T> {
    inner: T,
}

impl<T> SerializerWrap<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn done(self) -> T {
        self.inner
    }
}

impl<T> core::ops::Deref for SerializerWrap<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> core::ops::DerefMut for SerializerWrap<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<T> Serializer for SerializerWrap<T>
where
    T: embedded_io::Write,
{
    type Error = T::Error;

    fn write_u8(&mut self, val: u8) -> Result<(), Self::Error> {
        self.inner.write_all(&[val])
    }

    fn write_bytes(&mut self, val: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(val)
    }
}

#[cfg(feature = "alloc")]
impl Serializer for alloc::vec::Vec<u8> {
    type Error = core::convert::Infallible;

    fn write_u8(&mut self, val: u8) -> Result<(), Self::Error> {
        self.push(val);
        Ok(())
    }

    fn write_bytes(&mut self, val: &[u8]) -> Result<(), Self::Error> {
        self.extend_from_slice(val);
        Ok(())
    }
}

/// A Serializer that doubles every escape byte it writes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stuffing<S> {
    inner: S,
    escape: u8,
}

impl<S> Stuffing<S> {
    pub fn new(inner: S, framing: &Framing) -> Self {
        Self {
            inner,
            escape: framing.escape,
        }
    }

    pub fn done(self) -> S {
        self.inner
    }
}

impl<S> Serializer for Stuffing<S>
where
    S: Serializer,
{
    type Error = S::Error;

    fn write_u8(&mut self, val: u8) -> Result<(), Self::Error> {
        if val == self.escape {
            self.inner.write_u8(val)?;
        }
        self.inner.write_u8(val)
    }
}

/// A packet that can't be framed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StuffError<E> {
    /// Packet has no room for an identifier.
    TooShort { len: usize },
    /// Payload is longer than the maximum.
    TooLong { len: usize, max: usize },
    /// Identifier would read back as a control sequence.
    IllegalId(u8),
    /// Error from the underlying writer.
    Io(E),
}

#[cfg(feature = "std")]
impl<E> std::error::Error for StuffError<E> where E: core::fmt::Debug {}

impl<E> core::fmt::Display for StuffError<E>
where
    E: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::TooShort { len } => write!(
                f,
                "packet must be at least {} bytes, got {}",
                ID_LEN, len
            ),
            Self::TooLong { len, max } => {
                write!(f, "payload of {} bytes is over the {} byte maximum", len, max)
            }
            Self::IllegalId(id) => write!(f, "packet id {:#04x} cannot be framed", id),
            Self::Io(e) => write!(f, "io error: {:?}", e),
        }
    }
}

impl<E> From<E> for StuffError<E> {
    fn from(other: E) -> Self {
        Self::Io(other)
    }
}

/// Frame a packet: escape, identifier and payload, checksum trailer,
/// escape and terminator. Every escape byte inside is doubled.
///
/// `packet` starts with the two identifier bytes and does not include
/// the trailer.
pub fn stuff_packet<C, S>(
    crc: &C,
    framing: &Framing,
    max_payload: usize,
    ser: &mut S,
    packet: &[u8],
) -> Result<(), StuffError<S::Error>>
where
    C: ChecksumStyle,
    S: Serializer,
{
    if packet.len() < ID_LEN {
        return Err(StuffError::TooShort { len: packet.len() });
    }
    let payload = packet.len() - ID_LEN;
    if payload > max_payload {
        return Err(StuffError::TooLong {
            len: payload,
            max: max_payload,
        });
    }
    if !framing.is_legal_id(packet[0]) {
        return Err(StuffError::IllegalId(packet[0]));
    }

    let sum = crc.checksum(packet);

    ser.write_u8(framing.escape)?;
    let mut stuffed = Stuffing::new(&mut *ser, framing);
    stuffed.write_bytes(packet)?;
    stuffed.write_be_u32(sum)?;
    ser.write_u8(framing.escape)?;
    ser.write_u8(framing.terminator)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::super::crc::{CrcConstant, Crc32};
    use super::super::destuff::{destuff, Marker};
    use super::super::validate::Validator;
    use super::super::{DLE, ETX, MAX_PAYLOAD};
    use super::*;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    fn stuff(packet: &[u8]) -> Result<Vec<u8>, StuffError<core::convert::Infallible>> {
        let mut out = Vec::new();
        stuff_packet(
            &CrcConstant(0xcafe1010),
            &Framing::TSIP,
            MAX_PAYLOAD,
            &mut out,
            packet,
        )?;
        Ok(out)
    }

    #[test]
    fn stuff_simple() {
        assert_eq!(
            stuff(b"\x8fab").unwrap(),
            b"\x10\x8fab\xca\xfe\x10\x10\x10\x10\x10\x03"
        );
    }

    #[test]
    fn stuff_escapes_payload() {
        assert_eq!(
            stuff(b"\x8f\x10\x03").unwrap(),
            b"\x10\x8f\x10\x10\x03\xca\xfe\x10\x10\x10\x10\x10\x03"
        );
    }

    #[test]
    fn stuff_too_short() {
        assert_eq!(stuff(b"\x8f"), Err(StuffError::TooShort { len: 1 }));
    }

    #[test]
    fn stuff_too_long() {
        let packet = vec![0x8f; MAX_PAYLOAD + ID_LEN + 1];
        assert_eq!(
            stuff(&packet),
            Err(StuffError::TooLong {
                len: MAX_PAYLOAD + 1,
                max: MAX_PAYLOAD
            })
        );
    }

    #[test]
    fn stuff_illegal_ids() {
        assert_eq!(stuff(b"\x10\x00"), Err(StuffError::IllegalId(DLE)));
        assert_eq!(stuff(b"\x03\x00"), Err(StuffError::IllegalId(ETX)));
    }

    #[derive(Debug, Clone)]
    struct Packet(Vec<u8>);

    impl Arbitrary for Packet {
        fn arbitrary(g: &mut Gen) -> Self {
            let mut data = Vec::<u8>::arbitrary(g);
            data.truncate(MAX_PAYLOAD);
            let mut id = u8::arbitrary(g);
            while !Framing::TSIP.is_legal_id(id) {
                id = u8::arbitrary(g);
            }
            let mut packet = vec![id, u8::arbitrary(g)];
            packet.extend(data);
            Packet(packet)
        }
    }

    #[quickcheck]
    fn roundtrip(packet: Packet) -> bool {
        let crc = Crc32::new();
        let mut raw = Vec::new();
        stuff_packet(&crc, &Framing::TSIP, MAX_PAYLOAD, &mut raw, &packet.0).unwrap();

        let out = destuff(&Framing::TSIP, &raw);
        let len = out.data.len();
        let validator = Validator::new(&crc, Framing::TSIP, MAX_PAYLOAD);

        out.markers == [Marker::start(0), Marker::end(len)]
            && !out.hanging_escape
            && validator.validate(&out.data).is_ok()
            && out.data[..len - 4] == packet.0[..]
    }
}
