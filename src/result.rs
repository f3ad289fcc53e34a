use std::io;

use thiserror::Error;

use crate::packet::error::WireError;

pub type DquicResult<T> = Result<T, DquicError>;

#[derive(Debug, Error)]
pub enum DquicError {
    /// The endpoint was closed and its socket released.
    #[error("socket is closed")]
    SocketClosed,

    /// `bind` was called on an endpoint that already owns a bound socket.
    #[error("endpoint is already bound")]
    AlreadyBound,

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("io: {0}")]
    Io(#[from] io::Error),
}
