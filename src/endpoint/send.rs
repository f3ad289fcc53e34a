use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use rand::seq::index;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::packet::{next_frame, Frame, FrameType, Header, Packet, PacketType, StreamId};
use crate::result::{DquicError, DquicResult};

use super::{
    Endpoint, ACK_TIMEOUT, MAX_FRAMES_IN_PACKET, MAX_RECV_BYTES, MAX_STREAM_SIZE, MAX_TRIES,
    MIN_STREAM_SIZE,
};

impl Endpoint {
    /// Ship a set of streams to `peer` and return the number of payload
    /// bytes the peer acknowledged.
    ///
    /// Each stream is cut into segments of a per-call random size, up to
    /// [`MAX_FRAMES_IN_PACKET`] streams are packed per packet (sampled at
    /// random when more are still in flight), and every packet is
    /// retransmitted until its ack arrives or [`MAX_TRIES`] retries lapse.
    /// An unresponsive peer ends the call early; progress acked up to that
    /// point stays recorded on the connection.
    pub fn send_to(
        &mut self,
        peer: SocketAddr,
        streams: &HashMap<StreamId, Bytes>,
    ) -> DquicResult<u64> {
        self.ensure_socket()?;
        let Some(socket) = self.socket.as_ref() else {
            return Err(DquicError::SocketClosed);
        };
        let conn = self.connections.find_or_create(peer);

        // One frame per stream. `frames` keeps the cumulative acked offset
        // for the whole call; `pending` is the working set of stream ids
        // that still owe bytes.
        let mut seg_sizes: HashMap<StreamId, u32> = HashMap::new();
        let mut frames: Vec<Frame> = Vec::with_capacity(streams.len());
        let mut pending: Vec<StreamId> = Vec::with_capacity(streams.len());
        for (&sid, _) in streams.iter() {
            let seg_size = self.rng.random_range(MIN_STREAM_SIZE..=MAX_STREAM_SIZE);
            seg_sizes.insert(sid, seg_size);
            frames.push(Frame::data(sid, seg_size));
            pending.push(sid);
            conn.stream_bytes_sent.entry(sid).or_insert(0);
        }

        let mut started: Option<Instant> = None;
        let mut elapsed: HashMap<StreamId, Duration> = HashMap::new();
        let mut recv_buf = vec![0u8; MAX_RECV_BYTES];
        let mut total_acked: u64 = 0;

        'transmit: while !pending.is_empty() {
            // sample the streams carried by this packet
            let selected: Vec<StreamId> = if pending.len() <= MAX_FRAMES_IN_PACKET {
                pending.clone()
            } else {
                index::sample(&mut self.rng, pending.len(), MAX_FRAMES_IN_PACKET)
                    .iter()
                    .map(|i| pending[i])
                    .collect()
            };

            // pack one segment per selected stream, retiring streams whose
            // acked offset has reached the end of their blob
            let mut body = BytesMut::new();
            let mut completed: Vec<StreamId> = Vec::new();
            for &sid in &selected {
                let Some(frame) = frames.iter_mut().find(|f| f.stream_id == sid) else {
                    continue;
                };
                let blob = &streams[&sid];
                let remaining = (blob.len() as u64).saturating_sub(frame.offset);
                let bytes_to_send = u64::from(seg_sizes[&sid]).min(remaining);
                if bytes_to_send == 0 {
                    completed.push(sid);
                    elapsed.insert(sid, started.map(|t| t.elapsed()).unwrap_or_default());
                    continue;
                }
                frame.length = bytes_to_send as u32;
                frame.encode(&mut body);
                let start = frame.offset as usize;
                body.extend_from_slice(&blob[start..start + bytes_to_send as usize]);
            }
            pending.retain(|sid| !completed.contains(sid));

            // every selected stream completed mid-round; nothing to transmit
            if body.is_empty() {
                continue;
            }

            let header = Header::new(PacketType::Short, conn.sent_packet_number);
            conn.sent_packet_number = conn.sent_packet_number.wrapping_add(1);
            let datagram = Packet::new(header, body.freeze()).encode();

            if started.is_none() {
                started = Some(Instant::now());
            }

            // stop and wait: retransmit the same packet until its ack comes
            // back or the retry budget is gone
            let mut acked = false;
            for attempt in 0..=MAX_TRIES {
                if attempt > 0 {
                    debug!(
                        packet = header.packet_number,
                        attempt, "retransmitting packet"
                    );
                }
                socket.send_to(&datagram, peer)?;
                socket.set_read_timeout(Some(ACK_TIMEOUT))?;
                let len = match socket.recv_from(&mut recv_buf) {
                    Ok((len, _)) => len,
                    Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };

                let mut ack_body = Bytes::copy_from_slice(&recv_buf[..len]);
                let Ok(ack_header) = Header::decode(&mut ack_body) else {
                    continue;
                };
                if ack_header.packet_type != PacketType::Ack
                    || ack_header.packet_number != header.packet_number
                {
                    debug!(
                        expected = header.packet_number,
                        got = ack_header.packet_number,
                        "discarding packet that acks nothing"
                    );
                    continue;
                }

                // each ack frame quotes the receiver's cumulative in-order
                // offset for one stream; resume that stream exactly there
                loop {
                    let (ack_frame, _) = match next_frame(&mut ack_body) {
                        Ok(Some(entry)) => entry,
                        Ok(None) | Err(_) => break,
                    };
                    if ack_frame.frame_type != FrameType::Ack {
                        continue;
                    }
                    if !pending.contains(&ack_frame.stream_id) {
                        continue;
                    }
                    if let Some(sent) = frames
                        .iter_mut()
                        .find(|f| f.stream_id == ack_frame.stream_id)
                    {
                        sent.offset = ack_frame.offset;
                        let segment = u64::from(sent.length);
                        *conn.stream_bytes_sent.entry(sent.stream_id).or_insert(0) += segment;
                        total_acked += segment;
                    }
                }
                acked = true;
                break;
            }

            if !acked {
                warn!(%peer, packet = header.packet_number, "receiver not responding");
                break 'transmit;
            }
        }

        // pace report, silenced for control-plane payloads
        if frames.first().is_some_and(|f| f.offset > 50) {
            let overall = elapsed.values().copied().max().unwrap_or_default();
            for frame in &frames {
                let took = elapsed
                    .get(&frame.stream_id)
                    .copied()
                    .unwrap_or_default()
                    .as_secs_f64();
                let pace = if took > 0.0 {
                    frame.offset as f64 / took
                } else {
                    0.0
                };
                info!(
                    stream = frame.stream_id,
                    bytes = frame.offset,
                    seg_size = seg_sizes[&frame.stream_id],
                    pace_bps = pace,
                    "stream delivered"
                );
            }
            let secs = overall.as_secs_f64();
            let pace = if secs > 0.0 {
                total_acked as f64 / secs
            } else {
                0.0
            };
            info!(
                %peer,
                bytes = total_acked,
                packets = conn.sent_packet_number,
                pace_bps = pace,
                "send complete"
            );
        }

        Ok(total_acked)
    }
}
