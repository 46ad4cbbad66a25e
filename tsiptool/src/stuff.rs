use tsiplib::protocol::serialize::stuff_packet;
use tsiplib::protocol::{Crc32, Framing, MAX_PAYLOAD};

use crate::hexdump;

#[derive(clap::Args, Debug)]
pub struct StuffOpts {
    /// Packet id, decimal or 0x-prefixed hex
    #[arg(value_parser = parse_byte)]
    id1: u8,
    /// Packet sub-id, decimal or 0x-prefixed hex
    #[arg(value_parser = parse_byte)]
    id2: u8,
    /// File holding the raw payload
    payload: String,
    output: String,
}

impl crate::ToolRun for StuffOpts {
    fn run(&self) -> anyhow::Result<()> {
        let payload = std::fs::read(&self.payload)?;
        let mut packet = Vec::with_capacity(payload.len() + 2);
        packet.push(self.id1);
        packet.push(self.id2);
        packet.extend_from_slice(&payload);

        let mut framed = Vec::new();
        stuff_packet(
            &Crc32::new(),
            &Framing::TSIP,
            MAX_PAYLOAD,
            &mut framed,
            &packet,
        )?;

        std::fs::write(&self.output, &framed)?;
        println!("Framed {} payload bytes into {} bytes:", payload.len(), framed.len());
        hexdump::hexdump(&framed);
        Ok(())
    }
}

fn parse_byte(s: &str) -> Result<u8, std::num::ParseIntError> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_bytes() {
        assert_eq!(parse_byte("0x8f"), Ok(0x8f));
        assert_eq!(parse_byte("0X8F"), Ok(0x8f));
        assert_eq!(parse_byte("143"), Ok(0x8f));
        assert!(parse_byte("0x100").is_err());
        assert!(parse_byte("nope").is_err());
    }
}
