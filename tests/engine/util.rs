use std::collections::HashMap;

use bytes::{Bytes, BytesMut};
use dquic::packet::{next_frame, Frame, Header, Packet, PacketType, StreamId};
use dquic::Endpoint;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A bound endpoint with reproducible randomness.
pub fn endpoint(seed: u64) -> Endpoint {
    let mut endpoint = Endpoint::with_rng(StdRng::seed_from_u64(seed));
    endpoint.bind("127.0.0.1:0").unwrap();
    endpoint
}

pub fn random_blob(len: usize, seed: u64) -> Bytes {
    let mut rng = StdRng::seed_from_u64(seed);
    Bytes::from((0..len).map(|_| rng.random()).collect::<Vec<u8>>())
}

/// Split a raw datagram into its header and (frame, payload) pairs.
pub fn parse_datagram(datagram: &[u8]) -> (Header, Vec<(Frame, Bytes)>) {
    let mut bytes = Bytes::copy_from_slice(datagram);
    let packet = Packet::decode(&mut bytes).unwrap();
    let mut body = packet.body;
    let mut frames = Vec::new();
    while let Some(entry) = next_frame(&mut body).unwrap() {
        frames.push(entry);
    }
    (packet.header, frames)
}

/// Build the ack a conforming receiver would answer a data packet with,
/// advancing `delivered` for in-order frames and quoting the cumulative
/// in-order offset for everything else.
pub fn build_ack(
    header: Header,
    frames: &[(Frame, Bytes)],
    delivered: &mut HashMap<StreamId, u64>,
) -> Bytes {
    let mut body = BytesMut::new();
    for (frame, _) in frames {
        let expected = delivered.entry(frame.stream_id).or_insert(0);
        let mut ack = *frame;
        if ack.offset == *expected {
            *expected += u64::from(ack.length);
        }
        ack.offset = *expected;
        ack.into_ack().encode(&mut body);
    }
    let ack_header = Header::new(PacketType::Ack, header.packet_number);
    Packet::new(ack_header, body.freeze()).encode()
}
