use clap::{Parser, Subcommand};

mod bench;
mod common;
mod decode;
mod generate;
mod hexdump;
mod stuff;

trait ToolRun {
    fn run(&self) -> anyhow::Result<()>;
}

#[derive(Parser, Debug)]
#[command(name = "tsiptool", version, about = "Decode and produce TSIP byte streams")]
struct ToolOptions {
    #[command(subcommand)]
    command: ToolCommand,

    /// Verbose logging (-v, -vv, -vvv), RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum ToolCommand {
    /// Decode a stream, printing every packet
    Decode(decode::DecodeOpts),
    /// Time decoding of a stream held in memory
    Bench(bench::BenchOpts),
    /// Write a synthetic stream of random packets
    Generate(generate::GenerateOpts),
    /// Frame a single packet
    Stuff(stuff::StuffOpts),
}

impl ToolRun for ToolCommand {
    fn run(&self) -> anyhow::Result<()> {
        use ToolCommand::*;
        match self {
            Decode(o) => o.run(),
            Bench(o) => o.run(),
            Generate(o) => o.run(),
            Stuff(o) => o.run(),
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> anyhow::Result<()> {
    let opts = ToolOptions::parse();
    init_logging(opts.verbose);
    opts.command.run()
}
