use std::io::Read;

use tsiplib::protocol::BAUD_RATE;
use tsiplib::{DecodeReport, DecoderConfig, PipelineError};

#[derive(clap::Args, Debug, Clone)]
pub struct SourceArgs {
    /// Capture file, serial port, or host:port
    source: String,
    /// Read from a serial port
    #[arg(long, conflicts_with = "tcp")]
    serial: bool,
    #[arg(short, long, default_value_t = BAUD_RATE)]
    baud: u32,
    /// Read from a TCP connection
    #[arg(long)]
    tcp: bool,
    /// Seconds of silence on a serial port that end the stream
    #[arg(long, default_value_t = 1)]
    idle: u64,
}

#[derive(Debug)]
pub enum Source {
    Serial(Box<dyn serialport::SerialPort>),
    File(std::io::BufReader<std::fs::File>),
    Tcp(std::net::TcpStream),
}

impl Read for Source {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::Serial(port) => match port.read(buf) {
                // a quiet line is the end of the capture
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
                other => other,
            },
            Self::File(file) => file.read(buf),
            Self::Tcp(stream) => stream.read(buf),
        }
    }
}

impl SourceArgs {
    pub fn name(&self) -> &str {
        &self.source
    }

    pub fn open(&self) -> anyhow::Result<Source> {
        if self.tcp {
            let stream = std::net::TcpStream::connect(&self.source)?;
            Ok(Source::Tcp(stream))
        } else if self.serial {
            // TSIP runs 8-O-1
            let port = serialport::new(&self.source, self.baud)
                .parity(serialport::Parity::Odd)
                .timeout(std::time::Duration::from_secs(self.idle))
                .open()?;
            Ok(Source::Serial(port))
        } else {
            let file = std::fs::File::open(&self.source)?;
            Ok(Source::File(std::io::BufReader::new(file)))
        }
    }

    /// Read the whole source into memory.
    pub fn read_all(&self) -> anyhow::Result<Vec<u8>> {
        let mut data = Vec::new();
        self.open()?.read_to_end(&mut data)?;
        Ok(data)
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct DecoderArgs {
    /// Concurrent decoding workers
    #[arg(short, long, default_value_t = tsiplib::DEFAULT_WORKERS)]
    workers: usize,
    /// Raw bytes per block
    #[arg(long, default_value_t = tsiplib::BLOCK_SIZE)]
    fill: usize,
    /// Largest single read
    #[arg(long, default_value_t = tsiplib::MAX_CHUNK_SIZE)]
    chunk: usize,
    /// Largest packet payload
    #[arg(long, default_value_t = tsiplib::protocol::MAX_PAYLOAD)]
    max_payload: usize,
}

impl DecoderArgs {
    pub fn config(&self) -> anyhow::Result<DecoderConfig> {
        let config = DecoderConfig::new()
            .with_workers(self.workers)
            .with_fill_target(self.fill)
            .with_chunk_size(self.chunk)
            .with_max_payload(self.max_payload);
        config.validate()?;
        Ok(config)
    }
}

pub fn print_report(report: &DecodeReport) {
    let stats = &report.stats;
    println!("Decoded {} packets", report.packets());
    println!(
        "{} bytes read, {} blocks, {} bytes destuffed",
        report.bytes_read, stats.blocks, stats.bytes
    );
    if stats.rejected() > 0 || stats.overflows > 0 {
        println!(
            "rejected: {} size, {} id, {} checksum; {} overflowed",
            stats.size_mismatch, stats.illegal_id, stats.checksum_mismatch, stats.overflows
        );
    }
    if report.cancelled {
        println!("stopped early");
    }
}

/// Print whatever was decoded, even if the source failed partway.
pub fn finish<E>(res: Result<DecodeReport, PipelineError<E>>) -> anyhow::Result<DecodeReport>
where
    E: std::fmt::Debug,
{
    match res {
        Ok(report) => {
            print_report(&report);
            Ok(report)
        }
        Err(e) => {
            print_report(e.report());
            anyhow::bail!("{}", e)
        }
    }
}
