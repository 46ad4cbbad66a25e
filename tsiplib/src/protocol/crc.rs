/// Generic checksum style, for framing and validating packets.
pub trait ChecksumStyle {
    type Digest<'a>: ChecksumDigest
    where
        Self: 'a;

    fn digest<'a>(&'a self) -> Self::Digest<'a>;

    fn validate(&self, calculated: u32, provided: u32) -> bool {
        calculated == provided
    }

    /// Checksum a single contiguous run of bytes.
    fn checksum(&self, bytes: &[u8]) -> u32 {
        let mut digest = self.digest();
        digest.update(bytes);
        digest.finalize()
    }
}

/// Interface for a checksum digest.
pub trait ChecksumDigest {
    fn update(&mut self, bytes: &[u8]);
    fn finalize(self) -> u32;
}

impl<C> ChecksumStyle for &C
where
    C: ChecksumStyle,
{
    type Digest<'a> = C::Digest<'a> where Self: 'a;

    fn digest<'a>(&'a self) -> Self::Digest<'a> {
        (*self).digest()
    }

    fn validate(&self, calculated: u32, provided: u32) -> bool {
        (*self).validate(calculated, provided)
    }
}

/// A checksum that is always a specific given value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CrcConstant(pub u32);

impl ChecksumStyle for CrcConstant {
    type Digest<'a> = CrcConstant;

    fn digest<'a>(&'a self) -> Self::Digest<'a> {
        CrcConstant(self.0)
    }
}

impl ChecksumDigest for CrcConstant {
    fn update(&mut self, _bytes: &[u8]) {}

    fn finalize(self) -> u32 {
        self.0
    }
}

/// A checksum that is always a specific given value, and always validates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CrcConstantIgnore(pub u32);

impl ChecksumStyle for CrcConstantIgnore {
    type Digest<'a> = CrcConstant;

    fn digest<'a>(&'a self) -> Self::Digest<'a> {
        CrcConstant(self.0)
    }

    fn validate(&self, _calculated: u32, _provided: u32) -> bool {
        true
    }
}

/// A 32-bit CRC (ISO-HDLC, the zlib one), used for packet trailers.
#[derive(Clone)]
pub struct Crc32(crc::Crc<u32>);

/// A 32-bit CRC digest struct.
#[derive(Clone)]
pub struct Crc32Digest<'a>(crc::Digest<'a, u32, crc::Table<1>>);

impl Crc32 {
    pub const fn new() -> Self {
        Self(crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC))
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Crc32 {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("Crc32")
    }
}

impl ChecksumStyle for Crc32 {
    type Digest<'a> = Crc32Digest<'a>;

    fn digest<'a>(&'a self) -> Self::Digest<'a> {
        Crc32Digest(self.0.digest())
    }
}

impl<'a> ChecksumDigest for Crc32Digest<'a> {
    fn update(&mut self, bytes: &[u8]) {
        self.0.update(bytes)
    }

    fn finalize(self) -> u32 {
        self.0.finalize()
    }
}

/// Read the big-endian u32 trailer at the start of `bytes`.
pub fn read_be_u32(bytes: &[u8]) -> Option<u32> {
    nom::number::complete::be_u32::<_, nom::error::Error<&[u8]>>(bytes)
        .ok()
        .map(|(_, value)| value)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn crc32_check_value() {
        // the catalogue check value for CRC-32/ISO-HDLC
        assert_eq!(Crc32::new().checksum(b"123456789"), 0xcbf43926);
    }

    #[test]
    fn crc32_digest_in_pieces() {
        let crc = Crc32::new();
        let mut digest = crc.digest();
        digest.update(b"1234");
        digest.update(b"56789");
        assert_eq!(digest.finalize(), crc.checksum(b"123456789"));
    }

    #[test]
    fn constant_ignores_data() {
        assert_eq!(CrcConstant(0xcafe).checksum(b"anything"), 0xcafe);
        assert!(!CrcConstant(0xcafe).validate(0xcafe, 0xbeef));
        assert!(CrcConstantIgnore(0xcafe).validate(0xcafe, 0xbeef));
    }

    #[test]
    fn trailer_is_big_endian() {
        assert_eq!(read_be_u32(&[0x12, 0x34, 0x56, 0x78]), Some(0x12345678));
        assert_eq!(read_be_u32(&[0x12, 0x34, 0x56, 0x78, 0x9a]), Some(0x12345678));
        assert_eq!(read_be_u32(&[0x12, 0x34, 0x56]), None);
    }
}
