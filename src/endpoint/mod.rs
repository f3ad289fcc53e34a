use std::time::Duration;

pub mod endpoint;
mod recv;
mod send;

pub use endpoint::Endpoint;

/// Largest datagram accepted off the socket.
pub const MAX_RECV_BYTES: usize = 65536;

/// How long a sender waits for the ack of an outstanding packet.
pub const ACK_TIMEOUT: Duration = Duration::from_secs(2);

/// Retries after the first transmission of a packet, so each packet is put
/// on the wire at most `MAX_TRIES + 1` times.
pub const MAX_TRIES: u32 = 4;

/// Upper bound on frames carried by one data packet.
pub const MAX_FRAMES_IN_PACKET: usize = 3;

/// Bounds for the per-stream segment size drawn anew on every `send_to`.
/// Terminal segments may come in under the minimum.
pub const MIN_STREAM_SIZE: u32 = 1000;
pub const MAX_STREAM_SIZE: u32 = 2000;
