//! A minimal multi-stream reliable message transport over UDP.
//!
//! One datagram carries one packet, one packet carries up to three frames,
//! and each frame belongs to an independently progressing stream. Lost
//! datagrams are repaired by per-stream cumulative acks and whole-packet
//! retransmission, stop-and-wait style.
//!
//! ```text
//! Packet := Header Frame*
//! Header := u8 packet_type | u32 packet_number            (big-endian, 5B)
//! Frame  := u32 stream_id  | u32 frame_type
//!         | u64 offset     | u32 length | bytes[length]   (big-endian, 20B + payload)
//! ```
//!
//! [`Endpoint`] owns the socket and speaks both directions:
//! [`Endpoint::send_to`] ships a `{stream id -> bytes}` map to a peer and
//! blocks until it is acked, [`Endpoint::receive_from`] reassembles the
//! same map on the other side.

pub mod connection;
pub mod endpoint;
pub mod packet;
pub mod result;

pub use endpoint::Endpoint;
pub use result::{DquicError, DquicResult};
