use bytes::{Buf, BufMut};

use super::error::WireError;
use super::types::{FrameType, StreamId};

/// Frame header width on the wire. Fixed; callers must not measure
/// instances to learn it.
pub const FRAME_LEN: usize = 20;

/// The 20-byte header preceding every run of stream payload:
///
/// ```text
/// 0            4            8                        16           20
/// +------------+------------+------------------------+------------+
/// | stream id  | frame type |      offset (u64)      |   length   |  big-endian
/// +------------+------------+------------------------+------------+
/// ```
///
/// Exactly `length` payload bytes follow the header. `offset` is cumulative
/// on the stream: on a data frame it is the byte position the payload starts
/// at, on an ack frame it is the receiver's in-order delivered byte count
/// and `length` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub stream_id: StreamId,
    pub frame_type: FrameType,
    pub offset: u64,
    pub length: u32,
}

impl Frame {
    /// A data frame at the start of a stream.
    pub fn data(stream_id: StreamId, length: u32) -> Self {
        Self {
            stream_id,
            frame_type: FrameType::Data,
            offset: 0,
            length,
        }
    }

    /// Turn a received data frame into the ack frame mirroring it. `offset`
    /// must already hold the receiver's cumulative in-order byte count.
    pub fn into_ack(mut self) -> Self {
        self.frame_type = FrameType::Ack;
        self.length = 0;
        self
    }

    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u32(self.stream_id);
        buf.put_u32(self.frame_type as u32);
        buf.put_u64(self.offset);
        buf.put_u32(self.length);
    }

    pub fn decode(buf: &mut impl Buf) -> Result<Self, WireError> {
        if buf.remaining() < FRAME_LEN {
            return Err(WireError::Truncated {
                needed: FRAME_LEN,
                remaining: buf.remaining(),
            });
        }
        let stream_id = buf.get_u32();
        let frame_type = FrameType::from_u32(buf.get_u32())?;
        let offset = buf.get_u64();
        let length = buf.get_u32();
        Ok(Self {
            stream_id,
            frame_type,
            offset,
            length,
        })
    }
}
