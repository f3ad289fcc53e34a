pub mod error;
pub mod frame;
pub mod header;
pub mod packet;

pub mod types;

pub use frame::{Frame, FRAME_LEN};
pub use header::{Header, HEADER_LEN};
pub use packet::{next_frame, Packet};
pub use types::*;
