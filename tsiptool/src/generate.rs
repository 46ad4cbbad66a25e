use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tsiplib::protocol::serialize::stuff_packet;
use tsiplib::protocol::{Crc32, Framing, MAX_PAYLOAD};

/// Most garbage bytes written between two packets.
const MAX_NOISE: usize = 16;

#[derive(clap::Args, Debug)]
pub struct GenerateOpts {
    output: String,
    /// Packets to write
    #[arg(short, long, default_value_t = 1000)]
    count: usize,
    /// Seed for a reproducible stream
    #[arg(short, long)]
    seed: Option<u64>,
    /// Largest payload to generate
    #[arg(long, default_value_t = 64)]
    max_payload: usize,
    /// Chance of garbage bytes before each packet
    #[arg(long, default_value_t = 0.0)]
    noise: f64,
}

impl crate::ToolRun for GenerateOpts {
    fn run(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.max_payload <= MAX_PAYLOAD,
            "max payload can be at most {}",
            MAX_PAYLOAD
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.noise),
            "noise must be between 0 and 1"
        );

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let stream = generate(
            &mut rng,
            &Framing::TSIP,
            self.count,
            self.max_payload,
            self.noise,
        )?;

        std::fs::write(&self.output, &stream)?;
        println!(
            "Wrote {} packets, {} bytes to {}",
            self.count,
            stream.len(),
            self.output
        );
        Ok(())
    }
}

fn generate<R>(
    rng: &mut R,
    framing: &Framing,
    count: usize,
    max_payload: usize,
    noise: f64,
) -> anyhow::Result<Vec<u8>>
where
    R: Rng,
{
    let crc = Crc32::new();
    let mut out = Vec::new();
    let mut packet = Vec::with_capacity(max_payload + 2);

    for _ in 0..count {
        if rng.gen_bool(noise) {
            // anything but an escape, which would make a real sequence
            for _ in 0..rng.gen_range(1..=MAX_NOISE) {
                let b = loop {
                    let b: u8 = rng.gen();
                    if b != framing.escape {
                        break b;
                    }
                };
                out.push(b);
            }
        }

        let id = loop {
            let id: u8 = rng.gen();
            if framing.is_legal_id(id) {
                break id;
            }
        };
        let len = rng.gen_range(0..=max_payload);

        packet.clear();
        packet.push(id);
        packet.push(rng.gen());
        packet.extend((0..len).map(|_| rng.gen::<u8>()));
        stuff_packet(&crc, framing, max_payload, &mut out, &packet)?;
    }

    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use tsiplib::{Decoder, DecoderConfig, Packet};

    fn decode(stream: &[u8], max_payload: usize) -> Vec<Vec<u8>> {
        let mut seen = Vec::new();
        let config = DecoderConfig::new().with_max_payload(max_payload);
        let mut decoder =
            Decoder::new(config, Crc32::new(), |p: Packet<'_>| seen.push(p.to_vec())).unwrap();
        decoder.feed(stream);
        drop(decoder);
        seen
    }

    #[test]
    fn seeded_is_reproducible() {
        let a = generate(&mut StdRng::seed_from_u64(7), &Framing::TSIP, 20, 32, 0.5).unwrap();
        let b = generate(&mut StdRng::seed_from_u64(7), &Framing::TSIP, 20, 32, 0.5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn decodes_back() {
        let stream = generate(&mut StdRng::seed_from_u64(1), &Framing::TSIP, 100, 48, 0.0).unwrap();
        assert_eq!(decode(&stream, 48).len(), 100);
    }

    #[test]
    fn decodes_back_with_noise() {
        let stream = generate(&mut StdRng::seed_from_u64(2), &Framing::TSIP, 100, 48, 1.0).unwrap();
        assert_eq!(decode(&stream, 48).len(), 100);
    }
}
