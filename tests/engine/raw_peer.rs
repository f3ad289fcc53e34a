//! Wire-level checks against a stub peer made of a raw socket plus the
//! packet codec, and crafted datagrams aimed at a real endpoint.

use std::collections::HashMap;
use std::net::UdpSocket;
use std::thread;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use dquic::endpoint::{MAX_FRAMES_IN_PACKET, MAX_STREAM_SIZE, MIN_STREAM_SIZE};
use dquic::packet::{Frame, FrameType, Header, Packet, PacketType};
use dquic::Endpoint;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::util;

#[test]
fn test_packet_and_segment_bounds() {
    let stub = UdpSocket::bind("127.0.0.1:0").unwrap();
    let stub_addr = stub.local_addr().unwrap();

    let streams: HashMap<u32, Bytes> = (1..=5)
        .map(|sid| (sid, util::random_blob(10_000, 80 + u64::from(sid))))
        .collect();
    let expected_total = 50_000u64;

    let sender = thread::spawn(move || {
        // unbound on purpose: the first transmission binds an ephemeral port
        let mut a = Endpoint::with_rng(StdRng::seed_from_u64(81));
        a.send_to(stub_addr, &streams).unwrap()
    });

    let mut delivered: HashMap<u32, u64> = HashMap::new();
    let mut lengths: HashMap<u32, Vec<u32>> = HashMap::new();
    let mut got = 0u64;
    let mut buf = [0u8; 65536];
    while got < expected_total {
        let (n, from) = stub.recv_from(&mut buf).unwrap();
        let (header, frames) = util::parse_datagram(&buf[..n]);

        assert_eq!(header.packet_type, PacketType::Short);
        assert!(!frames.is_empty());
        assert!(frames.len() <= MAX_FRAMES_IN_PACKET);

        let mut sids: Vec<u32> = frames.iter().map(|(f, _)| f.stream_id).collect();
        sids.sort_unstable();
        sids.dedup();
        assert_eq!(sids.len(), frames.len(), "duplicate stream id in packet");

        for (frame, payload) in &frames {
            assert_eq!(frame.frame_type, FrameType::Data);
            assert_eq!(frame.length as usize, payload.len());
            assert!(frame.length > 0);
            assert!(frame.length <= MAX_STREAM_SIZE);
            let in_order = frame.offset == delivered.get(&frame.stream_id).copied().unwrap_or(0);
            if in_order {
                got += u64::from(frame.length);
                lengths.entry(frame.stream_id).or_default().push(frame.length);
            }
        }

        let ack = util::build_ack(header, &frames, &mut delivered);
        stub.send_to(&ack, from).unwrap();
    }

    assert_eq!(sender.join().unwrap(), expected_total);

    // one fixed segment size per stream per call, only the terminal
    // segment may come in under the minimum
    for lens in lengths.values() {
        let (last, rest) = lens.split_last().unwrap();
        for len in rest {
            assert!(*len >= MIN_STREAM_SIZE);
            assert_eq!(len, &rest[0]);
        }
        if let Some(seg) = rest.first() {
            assert!(last <= seg);
        }
        assert_eq!(lens.iter().map(|l| u64::from(*l)).sum::<u64>(), 10_000);
    }
}

#[test]
fn test_future_offset_is_not_delivered_in_order() {
    let mut b = util::endpoint(90);
    let b_addr = b.local_addr().unwrap();
    let raw = UdpSocket::bind("127.0.0.1:0").unwrap();
    let raw_addr = raw.local_addr().unwrap();
    let mut buf = [0u8; 256];

    // a frame claiming to start at offset 500 on a virgin stream
    let mut body = BytesMut::new();
    Frame {
        stream_id: 9,
        frame_type: FrameType::Data,
        offset: 500,
        length: 4,
    }
    .encode(&mut body);
    body.extend_from_slice(b"wxyz");
    let packet = Packet::new(Header::new(PacketType::Short, 0), body.freeze()).encode();
    raw.send_to(&packet, b_addr).unwrap();

    let (from, objects) = b.receive_from(65536).unwrap();
    assert_eq!(from, raw_addr);
    // the payload is handed to the application but the stream offset stays
    assert_eq!(objects[&9], Bytes::from_static(b"wxyz"));
    assert_eq!(b.connection(raw_addr).unwrap().stream_bytes_ack[&9], 0);

    let (n, _) = raw.recv_from(&mut buf).unwrap();
    let (header, frames) = util::parse_datagram(&buf[..n]);
    assert_eq!(header, Header::new(PacketType::Ack, 0));
    assert_eq!(frames.len(), 1);
    let (ack, payload) = &frames[0];
    assert_eq!(ack.stream_id, 9);
    assert_eq!(ack.frame_type, FrameType::Ack);
    assert_eq!(ack.offset, 0);
    assert_eq!(ack.length, 0);
    assert!(payload.is_empty());

    // resuming from the quoted offset goes through and advances the stream
    let mut body = BytesMut::new();
    Frame {
        stream_id: 9,
        frame_type: FrameType::Data,
        offset: 0,
        length: 4,
    }
    .encode(&mut body);
    body.extend_from_slice(b"abcd");
    let packet = Packet::new(Header::new(PacketType::Short, 1), body.freeze()).encode();
    raw.send_to(&packet, b_addr).unwrap();

    let (_, objects) = b.receive_from(65536).unwrap();
    assert_eq!(objects[&9], Bytes::from_static(b"abcd"));
    assert_eq!(b.connection(raw_addr).unwrap().stream_bytes_ack[&9], 4);

    let (n, _) = raw.recv_from(&mut buf).unwrap();
    let (_, frames) = util::parse_datagram(&buf[..n]);
    assert_eq!(frames[0].0.offset, 4);
}

#[test]
fn test_wrong_packet_type_yields_empty_map() {
    let mut b = util::endpoint(91);
    let b_addr = b.local_addr().unwrap();
    let raw = UdpSocket::bind("127.0.0.1:0").unwrap();
    raw.set_read_timeout(Some(Duration::from_millis(300)))
        .unwrap();

    let packet = Packet::new(Header::new(PacketType::Ack, 3), Bytes::new()).encode();
    raw.send_to(&packet, b_addr).unwrap();

    let (from, objects) = b.receive_from(65536).unwrap();
    assert_eq!(from, raw.local_addr().unwrap());
    assert!(objects.is_empty());

    let conn = b.connection(from).unwrap();
    assert_eq!(conn.recv_packet_number, 0);

    // a non-data packet is never acked
    let mut buf = [0u8; 64];
    assert!(raw.recv_from(&mut buf).is_err());
}

#[test]
fn test_size_cap_withholds_ack() {
    let mut b = util::endpoint(92);
    let b_addr = b.local_addr().unwrap();
    let raw = UdpSocket::bind("127.0.0.1:0").unwrap();
    raw.set_read_timeout(Some(Duration::from_millis(300)))
        .unwrap();

    let mut body = BytesMut::new();
    for sid in [1u32, 2] {
        Frame {
            stream_id: sid,
            frame_type: FrameType::Data,
            offset: 0,
            length: 600,
        }
        .encode(&mut body);
        body.extend_from_slice(&[sid as u8; 600]);
    }
    let packet = Packet::new(Header::new(PacketType::Short, 0), body.freeze()).encode();
    raw.send_to(&packet, b_addr).unwrap();

    let (from, objects) = b.receive_from(1000).unwrap();
    // the frame that crossed the cap is not delivered
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[&1], Bytes::from(vec![1u8; 600]));

    // both frames were still walked before the cap fired
    let conn = b.connection(from).unwrap();
    assert_eq!(conn.stream_bytes_ack[&1], 600);
    assert_eq!(conn.stream_bytes_ack[&2], 600);

    // no ack: the sender is left to retransmit
    let mut buf = [0u8; 256];
    assert!(raw.recv_from(&mut buf).is_err());
}

#[test]
fn test_truncated_tail_keeps_parsed_frames() {
    let mut b = util::endpoint(93);
    let b_addr = b.local_addr().unwrap();
    let raw = UdpSocket::bind("127.0.0.1:0").unwrap();
    let mut buf = [0u8; 256];

    let mut body = BytesMut::new();
    Frame {
        stream_id: 1,
        frame_type: FrameType::Data,
        offset: 0,
        length: 12,
    }
    .encode(&mut body);
    body.extend_from_slice(b"hello world!");
    // a second frame whose declared length overruns the datagram
    Frame {
        stream_id: 2,
        frame_type: FrameType::Data,
        offset: 0,
        length: 500,
    }
    .encode(&mut body);
    body.extend_from_slice(&[0u8; 30]);
    let packet = Packet::new(Header::new(PacketType::Short, 0), body.freeze()).encode();
    raw.send_to(&packet, b_addr).unwrap();

    let (from, objects) = b.receive_from(65536).unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[&1], Bytes::from_static(b"hello world!"));
    assert_eq!(b.connection(from).unwrap().stream_bytes_ack[&1], 12);

    // the ack mirrors only the frame that parsed
    let (n, _) = raw.recv_from(&mut buf).unwrap();
    let (header, frames) = util::parse_datagram(&buf[..n]);
    assert_eq!(header.packet_type, PacketType::Ack);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].0.stream_id, 1);
    assert_eq!(frames[0].0.offset, 12);
}
