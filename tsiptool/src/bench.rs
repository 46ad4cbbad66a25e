use std::time::Instant;

use tsiplib::protocol::Crc32;
use tsiplib::{Packet, Pipeline};

use crate::common::{finish, DecoderArgs, SourceArgs};

#[derive(clap::Args, Debug)]
pub struct BenchOpts {
    #[command(flatten)]
    source: SourceArgs,
    #[command(flatten)]
    decoder: DecoderArgs,
    /// Number of timed runs
    #[arg(short, long, default_value_t = 1)]
    repeat: usize,
}

impl crate::ToolRun for BenchOpts {
    fn run(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.repeat > 0, "need at least one run");
        let config = self.decoder.config()?;
        let data = self.source.read_all()?;
        println!("Loaded {} bytes from {}", data.len(), self.source.name());

        let pipeline = Pipeline::new(config, Crc32::new())?;
        let mut fastest = None;
        for i in 0..self.repeat {
            let start = Instant::now();
            let res = pipeline.run(&data[..], |_: Packet<'_>| {});
            let elapsed = start.elapsed();

            println!();
            println!("Run {}:", i + 1);
            finish(res)?;
            println!(
                "Time taken {} seconds {} milliseconds",
                elapsed.as_secs(),
                elapsed.subsec_millis()
            );
            fastest = Some(fastest.map_or(elapsed, |f: std::time::Duration| f.min(elapsed)));
        }

        if let Some(fastest) = fastest {
            let secs = fastest.as_secs_f64();
            if secs > 0.0 {
                println!();
                println!(
                    "Best of {}: {:.1} MB/s",
                    self.repeat,
                    data.len() as f64 / secs / 1e6
                );
            }
        }
        Ok(())
    }
}
