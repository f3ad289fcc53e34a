use thiserror::Error;

/// Decode-side failures. Encoding is infallible: both headers have fixed
/// widths and every field value is representable on the wire.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WireError {
    /// The buffer ended before a complete header or declared payload.
    #[error("truncated buffer: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("unknown packet type {0:#04x}")]
    UnknownPacketType(u8),

    #[error("unknown frame type {0:#06x}")]
    UnknownFrameType(u32),
}
