use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::packet::{next_frame, Header, Packet, PacketType, StreamId};
use crate::result::{DquicError, DquicResult};

use super::{Endpoint, MAX_RECV_BYTES};

impl Endpoint {
    /// Block until a datagram arrives, deliver its stream payloads, and
    /// answer with an ack packet mirroring the received frames.
    ///
    /// The returned map holds the payload of each data frame in the packet,
    /// keyed by stream id, whether or not it arrived in order. Only in-order
    /// payloads advance the per-stream offset; anything else is answered
    /// with the current offset so the peer resends from there. Once the
    /// delivered payload bytes exceed `max_bytes` the call returns what it
    /// has without acking, leaving the overflow to a retransmission.
    pub fn receive_from(
        &mut self,
        max_bytes: u64,
    ) -> DquicResult<(SocketAddr, HashMap<StreamId, Bytes>)> {
        self.ensure_socket()?;
        let Some(socket) = self.socket.as_ref() else {
            return Err(DquicError::SocketClosed);
        };

        // a prior send_to may have left its ack timeout on the socket
        socket.set_read_timeout(None)?;
        let mut recv_buf = vec![0u8; MAX_RECV_BYTES];
        let (len, sender) = socket.recv_from(&mut recv_buf)?;
        let mut datagram = Bytes::copy_from_slice(&recv_buf[..len]);

        let conn = self.connections.find_or_create(sender);
        let mut objects: HashMap<StreamId, Bytes> = HashMap::new();

        let Ok(header) = Header::decode(&mut datagram) else {
            return Ok((sender, objects));
        };
        if header.packet_type != PacketType::Short {
            debug!(packet_type = ?header.packet_type, "ignoring non-data packet");
            return Ok((sender, objects));
        }
        conn.recv_packet_number += 1;

        let mut ack_body = BytesMut::new();
        let mut objects_bytes: u64 = 0;

        loop {
            let (mut frame, stream_data) = match next_frame(&mut datagram) {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    // the offending frame is dropped, everything parsed so
                    // far is still delivered and acked
                    debug!(%sender, error = %e, "dropping malformed frame tail");
                    break;
                }
            };
            let data_len = u64::from(frame.length);

            let delivered = conn.stream_bytes_ack.entry(frame.stream_id).or_insert(0);
            if frame.offset == *delivered {
                frame.offset += data_len;
                *delivered += data_len;
            } else {
                // gap or duplicate: quote the expected offset back so the
                // sender resumes from it
                frame.offset = *delivered;
            }
            frame.into_ack().encode(&mut ack_body);

            objects_bytes += data_len;
            if objects_bytes > max_bytes {
                debug!(%sender, objects_bytes, max_bytes, "size cap hit, withholding ack");
                return Ok((sender, objects));
            }
            objects.insert(frame.stream_id, stream_data);
        }

        let ack_header = Header::new(PacketType::Ack, header.packet_number);
        conn.sent_packet_number = conn.sent_packet_number.wrapping_add(1);
        let ack = Packet::new(ack_header, ack_body.freeze()).encode();
        socket.send_to(&ack, sender)?;

        Ok((sender, objects))
    }
}
