use super::error::WireError;

/// Application-chosen integer channel within a connection.
pub type StreamId = u32;

/// Wire value in the first byte of every packet.
///
/// `Short` marks a data packet; `Ack` marks the echo a receiver produces for
/// it. The two constants share the frame-type value space below, so an ack is
/// recognisable at both levels.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    Short = 3,
    Ack = 6,
}

impl PacketType {
    pub fn from_u8(value: u8) -> Result<Self, WireError> {
        match value {
            3 => Ok(PacketType::Short),
            6 => Ok(PacketType::Ack),
            other => Err(WireError::UnknownPacketType(other)),
        }
    }
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    Data = 5,
    Ack = 6,
}

impl FrameType {
    pub fn from_u32(value: u32) -> Result<Self, WireError> {
        match value {
            5 => Ok(FrameType::Data),
            6 => Ok(FrameType::Ack),
            other => Err(WireError::UnknownFrameType(other)),
        }
    }
}
