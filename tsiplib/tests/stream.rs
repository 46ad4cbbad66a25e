use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

use tsiplib::protocol::crc::Crc32;
use tsiplib::protocol::serialize::stuff_packet;
use tsiplib::protocol::{destuff, Framing, DLE, ETX, MAX_PAYLOAD};
use tsiplib::{DecodeStats, Decoder, DecoderConfig, Dispatcher, Packet};

fn stuff(packets: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    for p in packets {
        stuff_packet(&Crc32::new(), &Framing::TSIP, MAX_PAYLOAD, &mut out, p).unwrap();
    }
    out
}

fn decode_with(config: DecoderConfig, blocks: &[&[u8]]) -> (Vec<Vec<u8>>, DecodeStats) {
    let mut seen = Vec::new();
    let mut decoder =
        Decoder::new(config, Crc32::new(), |p: Packet<'_>| seen.push(p.to_vec())).unwrap();
    for block in blocks {
        decoder.feed(block);
    }
    let (_, stats) = decoder.free();
    (seen, stats)
}

fn decode(blocks: &[&[u8]]) -> (Vec<Vec<u8>>, DecodeStats) {
    decode_with(DecoderConfig::new(), blocks)
}

/// A packet heavy on escape and terminator bytes.
#[derive(Debug, Clone)]
struct TestPacket(Vec<u8>);

impl Arbitrary for TestPacket {
    fn arbitrary(g: &mut Gen) -> Self {
        let interesting = [DLE, DLE, ETX, 0x8f];
        let byte = |g: &mut Gen| {
            if bool::arbitrary(g) {
                *g.choose(&interesting).unwrap_or(&DLE)
            } else {
                u8::arbitrary(g)
            }
        };

        let mut id = byte(g);
        while !Framing::TSIP.is_legal_id(id) {
            id = u8::arbitrary(g);
        }
        let len = usize::arbitrary(g) % 24;
        let mut packet = vec![id, byte(g)];
        packet.extend((0..len).map(|_| byte(g)));
        TestPacket(packet)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let id = self.0[..2].to_vec();
        Box::new(self.0[2..].to_vec().shrink().map(move |body| {
            let mut packet = id.clone();
            packet.extend(body);
            TestPacket(packet)
        }))
    }
}

fn packets(test: &[TestPacket]) -> Vec<Vec<u8>> {
    test.iter().map(|p| p.0.clone()).collect()
}

#[test]
fn example_stream_every_split() {
    let sent = vec![b"AAB".to_vec(), vec![b'B', DLE, 0x99]];
    let raw = stuff(&sent);
    assert_eq!(raw[..4], [DLE, b'A', b'A', b'B']);
    assert!(raw.windows(3).any(|w| w == [DLE, DLE, 0x99]));
    for split in 0..=raw.len() {
        let (seen, stats) = decode(&[&raw[..split], &raw[split..]]);
        assert_eq!(seen, sent, "split at {}", split);
        assert_eq!(seen[1][1..2], [DLE]);
        assert_eq!(stats.rejected(), 0);
    }
}

#[quickcheck]
fn split_anywhere(sent: Vec<TestPacket>, split: usize) -> bool {
    let sent = packets(&sent);
    let raw = stuff(&sent);
    let split = split % (raw.len() + 1);
    decode(&[&raw[..split], &raw[split..]]).0 == sent
}

#[quickcheck]
fn split_three_ways(sent: Vec<TestPacket>, a: usize, b: usize) -> bool {
    let sent = packets(&sent);
    let raw = stuff(&sent);
    let a = a % (raw.len() + 1);
    let b = a + b % (raw.len() - a + 1);
    decode(&[&raw[..a], &raw[a..b], &raw[b..]]).0 == sent
}

#[quickcheck]
fn byte_at_a_time(sent: Vec<TestPacket>) -> bool {
    let sent = packets(&sent);
    let raw = stuff(&sent);
    let blocks: Vec<&[u8]> = raw.chunks(1).collect();
    decode(&blocks).0 == sent
}

#[test]
fn split_around_escape_pairs() {
    // a literal escape right before the end sequence, and a checksum
    // that may itself hold escapes
    let sent = vec![
        vec![0x8f, 0x20, DLE],
        vec![0x8f, DLE, DLE, DLE, ETX],
        vec![0x41, ETX],
    ];
    let raw = stuff(&sent);
    for (i, pair) in raw.windows(2).enumerate() {
        if pair[0] != DLE {
            continue;
        }
        // directly after the escape
        let (seen, _) = decode(&[&raw[..i + 1], &raw[i + 1..]]);
        assert_eq!(seen, sent, "split after escape at {}", i);
    }
}

#[test]
fn literal_escapes_preserved() {
    let sent = vec![vec![0x8f, DLE, DLE, b'x', DLE]];
    let raw = stuff(&sent);
    for a in 0..=raw.len() {
        for b in a..=raw.len() {
            let (seen, _) = decode(&[&raw[..a], &raw[a..b], &raw[b..]]);
            assert_eq!(seen, sent, "split at {} and {}", a, b);
        }
    }
}

#[test]
fn oversize_fragments_discarded() {
    let config = DecoderConfig::new().with_max_payload(8);
    let good = stuff(&[b"\x8fok".to_vec()]);
    let junk = [b'j'; 32];

    let (seen, stats) = decode_with(
        config.clone(),
        &[&b"\x10\x8fstart"[..], &junk, &junk, &junk, &good],
    );
    assert_eq!(seen, [b"\x8fok".to_vec()]);
    assert_eq!(stats.overflows, 3);
    assert_eq!(stats.rejected(), 0);

    // each oversize block is dropped on its own, with nothing left
    // behind to spoil what follows
    let (seen, stats) = decode_with(config, &[&junk[..], &good]);
    assert_eq!(seen, [b"\x8fok".to_vec()]);
    assert_eq!(stats.overflows, 1);
}

#[test]
fn oversize_packet_rejected() {
    let config = DecoderConfig::new().with_max_payload(4);
    let raw = stuff(&[b"\x8f\x01big payload".to_vec(), b"\x8f\x02fits".to_vec()]);
    let (seen, stats) = decode_with(config, &[&raw]);
    assert_eq!(seen, [b"\x8f\x02fits".to_vec()]);
    assert_eq!(stats.size_mismatch, 1);
}

#[test]
fn corrupted_checksum_rejected() {
    let mut raw = stuff(&[b"\x8fab".to_vec(), b"\x8fcd".to_vec()]);
    // flip a payload bit in the first packet
    raw[2] ^= 0x01;
    let (seen, stats) = decode(&[&raw]);
    assert_eq!(seen, [b"\x8fcd".to_vec()]);
    assert_eq!(stats.checksum_mismatch, 1);
}

#[test]
fn illegal_id_from_stream() {
    let first = stuff(&[b"\x8fab".to_vec()]);
    let mut block1 = first.clone();
    block1.push(DLE);
    // the hanging escape turns out to be a literal, which then leads
    // the next "packet"
    let block2 = &b"\x10abcde\x10\x03"[..];

    let (seen, stats) = decode(&[&block1[..], block2]);
    assert_eq!(seen, [b"\x8fab".to_vec()]);
    assert_eq!(stats.illegal_id, 1);
}

#[test]
fn garbage_between_packets() {
    let sent = vec![b"\x8f\x01".to_vec(), b"\x8f\x02".to_vec()];
    let one = stuff(&sent[..1]);
    let two = stuff(&sent[1..]);
    let raw = [
        &b"noise"[..],
        &one[..],
        &b"more\x03noise"[..],
        &two[..],
        &b"trailing"[..],
    ]
    .concat();
    for split in 0..=raw.len() {
        let (seen, _) = decode(&[&raw[..split], &raw[split..]]);
        assert_eq!(seen, sent, "split at {}", split);
    }
}

// Dispatching destuffed blocks alone (without their raw bytes) relies
// on the first processed byte to resolve a hanging escape. These pin
// down how that behaves.

fn dispatch_processed(blocks: &[&[u8]]) -> (Vec<Vec<u8>>, DecodeStats) {
    let mut seen = Vec::new();
    let mut dispatcher = Dispatcher::new(&DecoderConfig::new(), Crc32::new(), |p: Packet<'_>| {
        seen.push(p.to_vec())
    });
    for raw in blocks {
        let mut block = destuff(&Framing::TSIP, raw);
        dispatcher.dispatch(&mut block);
    }
    let (_, stats) = dispatcher.free();
    (seen, stats)
}

#[test]
fn processed_literal_after_hanging_escape() {
    // literal escape split down the middle, followed by more payload
    let sent = vec![vec![0x8f, DLE, b'x', b'y']];
    let raw = stuff(&sent);
    let split = 3;
    assert_eq!(raw[..split], [DLE, 0x8f, DLE]);
    assert_eq!(raw[split..split + 2], [DLE, b'x']);

    let (seen, _) = dispatch_processed(&[&raw[..split], &raw[split..]]);
    assert_eq!(seen, sent);
}

#[test]
fn processed_doubled_literal_after_hanging_escape() {
    let config = DecoderConfig::new();
    let blocks: [&[u8]; 2] = [b"\x10\x8fa\x10", b"\x10\x10b"];

    // the block starts with a complete escape pair: it stands in for
    // the carried escape, which is dropped
    let mut processed = Dispatcher::new(&config, Crc32::new(), |_: Packet<'_>| {});
    for raw in blocks {
        processed.dispatch(&mut destuff(&Framing::TSIP, raw));
    }
    assert_eq!(processed.carry().data(), b"\x8fa\x10b");

    // with the raw bytes, the carried escape is the literal, and the
    // rest starts a new packet
    let mut resolved = Dispatcher::new(&config, Crc32::new(), |_: Packet<'_>| {});
    for raw in blocks {
        resolved.dispatch_raw(raw, &mut destuff(&Framing::TSIP, raw));
    }
    assert_eq!(resolved.carry().data(), b"b");
}

#[test]
fn processed_and_raw_agree_on_plain_splits() {
    let sent = vec![b"\x8fhello".to_vec(), b"\x8eworld".to_vec()];
    let raw = stuff(&sent);
    for split in 0..=raw.len() {
        if raw.get(split) == Some(&DLE) {
            continue;
        }
        let blocks = [&raw[..split], &raw[split..]];
        let processed = dispatch_processed(&blocks).0;
        let resolved = decode(&blocks).0;
        assert_eq!(processed, resolved, "split at {}", split);
    }
}
