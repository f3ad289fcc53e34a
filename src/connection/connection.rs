use std::collections::HashMap;
use std::net::SocketAddr;

use crate::packet::StreamId;

/// Per-peer state held at an endpoint, created on first contact and kept
/// for the endpoint's lifetime. There is no teardown signal.
#[derive(Debug)]
pub struct Connection {
    pub peer_addr: SocketAddr,
    /// Position in the connection table at insertion time. Informational.
    pub conn_id: usize,
    /// Next value to stamp on an outgoing packet, acks included.
    pub sent_packet_number: u32,
    /// Count of accepted data packets from this peer.
    pub recv_packet_number: u32,
    /// Cumulative acknowledged bytes pushed per stream to this peer.
    pub stream_bytes_sent: HashMap<StreamId, u64>,
    /// Cumulative in-order bytes delivered per stream from this peer.
    /// This is the offset quoted back in acks.
    pub stream_bytes_ack: HashMap<StreamId, u64>,
}

impl Connection {
    pub fn new(peer_addr: SocketAddr, conn_id: usize) -> Self {
        Self {
            peer_addr,
            conn_id,
            sent_packet_number: 0,
            recv_packet_number: 0,
            stream_bytes_sent: HashMap::new(),
            stream_bytes_ack: HashMap::new(),
        }
    }
}

/// All connections known to one endpoint, in insertion order. Lookup is a
/// linear scan over peer addresses; the expected cardinality is tens.
#[derive(Debug, Default)]
pub struct ConnectionTable {
    entries: Vec<Connection>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_or_create(&mut self, peer_addr: SocketAddr) -> &mut Connection {
        let idx = match self.entries.iter().position(|c| c.peer_addr == peer_addr) {
            Some(idx) => idx,
            None => {
                let conn_id = self.entries.len();
                self.entries.push(Connection::new(peer_addr, conn_id));
                conn_id
            }
        };
        &mut self.entries[idx]
    }

    pub fn find(&self, peer_addr: SocketAddr) -> Option<&Connection> {
        self.entries.iter().find(|c| c.peer_addr == peer_addr)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
