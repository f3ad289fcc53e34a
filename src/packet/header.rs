use bytes::{Buf, BufMut};

use super::error::WireError;
use super::types::PacketType;

/// Packet header width on the wire. Fixed; callers must not measure
/// instances to learn it.
pub const HEADER_LEN: usize = 5;

/// The 5-byte header leading every datagram:
///
/// ```text
/// 0        1                                   5
/// +--------+--------+--------+--------+--------+
/// |  type  |        packet number (u32)        |   big-endian
/// +--------+--------+--------+--------+--------+
/// ```
///
/// The packet number counts packets this endpoint has sent on the
/// connection. An ack packet carries the number of the data packet it acks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub packet_type: PacketType,
    pub packet_number: u32,
}

impl Header {
    pub fn new(packet_type: PacketType, packet_number: u32) -> Self {
        Self {
            packet_type,
            packet_number,
        }
    }

    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.packet_type as u8);
        buf.put_u32(self.packet_number);
    }

    pub fn decode(buf: &mut impl Buf) -> Result<Self, WireError> {
        if buf.remaining() < HEADER_LEN {
            return Err(WireError::Truncated {
                needed: HEADER_LEN,
                remaining: buf.remaining(),
            });
        }
        let packet_type = PacketType::from_u8(buf.get_u8())?;
        let packet_number = buf.get_u32();
        Ok(Self {
            packet_type,
            packet_number,
        })
    }
}
