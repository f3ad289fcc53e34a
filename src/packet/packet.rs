use bytes::{Bytes, BytesMut};

use super::error::WireError;
use super::frame::{Frame, FRAME_LEN};
use super::header::{Header, HEADER_LEN};

/// One datagram's worth of protocol data: a header followed by a body of
/// zero or more frames. The body is kept opaque here; walking it is the
/// job of [`next_frame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub header: Header,
    pub body: Bytes,
}

impl Packet {
    pub fn new(header: Header, body: Bytes) -> Self {
        Self { header, body }
    }

    pub fn encode(&self) -> Bytes {
        let mut bytes = BytesMut::with_capacity(HEADER_LEN + self.body.len());
        self.header.encode(&mut bytes);
        bytes.extend_from_slice(&self.body);
        bytes.freeze()
    }

    pub fn decode(bytes: &mut Bytes) -> Result<Self, WireError> {
        let header = Header::decode(bytes)?;
        let body = bytes.split_off(0);
        Ok(Self { header, body })
    }
}

/// Pull the next frame and its payload off the front of a packet body.
///
/// Returns `Ok(None)` once fewer than [`FRAME_LEN`] bytes remain (any
/// shorter tail is not a frame). A frame whose declared `length` overruns
/// the remaining buffer yields [`WireError::Truncated`]; callers decide
/// whether to surface that or keep what already parsed.
pub fn next_frame(body: &mut Bytes) -> Result<Option<(Frame, Bytes)>, WireError> {
    if body.len() < FRAME_LEN {
        return Ok(None);
    }
    let frame = Frame::decode(body)?;
    let payload_len = frame.length as usize;
    if payload_len > body.len() {
        return Err(WireError::Truncated {
            needed: payload_len,
            remaining: body.len(),
        });
    }
    let payload = body.split_to(payload_len);
    Ok(Some((frame, payload)))
}
