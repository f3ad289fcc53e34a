use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs, UdpSocket};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::connection::{Connection, ConnectionTable};
use crate::result::{DquicError, DquicResult};

/// One UDP endpoint speaking the protocol in both directions.
///
/// The endpoint is single-threaded and blocking: `send_to` does not return
/// until every stream is acked or the peer stops responding, and
/// `receive_from` blocks until a datagram arrives. Sharing an endpoint
/// across threads needs external mutual exclusion.
pub struct Endpoint {
    pub(crate) socket: Option<UdpSocket>,
    pub(crate) closed: bool,
    pub(crate) connections: ConnectionTable,
    pub(crate) rng: StdRng,
}

impl Endpoint {
    /// An endpoint with no socket yet. The first `send_to` on an unbound
    /// endpoint binds an ephemeral local address.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Same as [`Endpoint::new`] but with caller-supplied randomness, the
    /// seam tests use for reproducible segment sizes and stream sampling.
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            socket: None,
            closed: false,
            connections: ConnectionTable::new(),
            rng,
        }
    }

    pub fn bind(&mut self, addr: impl ToSocketAddrs) -> DquicResult<()> {
        if self.closed {
            return Err(DquicError::SocketClosed);
        }
        if self.socket.is_some() {
            return Err(DquicError::AlreadyBound);
        }
        self.socket = Some(UdpSocket::bind(addr)?);
        Ok(())
    }

    /// Release the socket. Safe to call repeatedly; every later operation
    /// fails with [`DquicError::SocketClosed`].
    pub fn close(&mut self) {
        self.socket = None;
        self.closed = true;
    }

    pub fn local_addr(&self) -> DquicResult<SocketAddr> {
        match &self.socket {
            Some(socket) => Ok(socket.local_addr()?),
            None => Err(DquicError::SocketClosed),
        }
    }

    /// The connection record for a peer, if one was ever created.
    pub fn connection(&self, peer_addr: SocketAddr) -> Option<&Connection> {
        self.connections.find(peer_addr)
    }

    pub(crate) fn ensure_socket(&mut self) -> DquicResult<()> {
        if self.closed {
            return Err(DquicError::SocketClosed);
        }
        if self.socket.is_none() {
            self.socket = Some(UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?);
        }
        Ok(())
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new()
    }
}
