use tsiplib::protocol::{ChecksumStyle, Crc32};
use tsiplib::{FromStd, Packet, Pipeline};

use crate::common::{finish, DecoderArgs, SourceArgs};
use crate::hexdump;

#[derive(clap::Args, Debug)]
pub struct DecodeOpts {
    #[command(flatten)]
    source: SourceArgs,
    #[command(flatten)]
    decoder: DecoderArgs,
    /// Print only the totals
    #[arg(short, long)]
    quiet: bool,
}

impl crate::ToolRun for DecodeOpts {
    fn run(&self) -> anyhow::Result<()> {
        let config = self.decoder.config()?;
        let source = self.source.open()?;
        log::info!("decoding {} with {} workers", self.source.name(), config.workers);

        let crc = Crc32::new();
        let pipeline = Pipeline::new(config, Crc32::new())?;
        let quiet = self.quiet;
        let res = pipeline.run(FromStd::new(source), |packet: Packet<'_>| {
            if !quiet {
                print_packet(&crc, packet);
            }
        });

        finish(res)?;
        Ok(())
    }
}

fn print_packet(crc: &Crc32, packet: Packet<'_>) {
    println!(
        "ID1: {} ID2: {} CHKSUM: {:#010x}",
        packet.id(),
        packet.sub_id(),
        crc.checksum(packet.as_bytes())
    );
    hexdump::hexdump_prefix("  ", packet.body());
    println!();
}
