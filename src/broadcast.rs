//! # Summary
//!
//! Fan-out/join helper used by every proposer phase: one request goes to
//! each peer, and the caller resumes only once all of them have produced an
//! outcome. The local peer is served by a direct call to its acceptor rather
//! than through the transport.

use std::net::SocketAddr;

use futures::future;

use crate::error::Error;
use crate::message;
use crate::state;
use crate::thread::acceptor::Acceptor;
use crate::transport::Transport;

pub struct Broadcast<'a, V: state::Value> {
    id: usize,
    peers: &'a [SocketAddr],
    acceptor: &'a Acceptor<V>,
    transport: &'a dyn Transport<V>,
}

impl<'a, V: state::Value> Broadcast<'a, V> {
    pub fn new(
        id: usize,
        peers: &'a [SocketAddr],
        acceptor: &'a Acceptor<V>,
        transport: &'a dyn Transport<V>,
    ) -> Self {
        Broadcast {
            id,
            peers,
            acceptor,
            transport,
        }
    }

    /// Index of the sending peer.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Number of peers, including this one.
    pub fn count(&self) -> usize {
        self.peers.len()
    }

    pub fn acceptor(&self) -> &Acceptor<V> {
        self.acceptor
    }

    /// Sends `request` to every peer and waits for exactly one outcome from each.
    pub async fn send(&self, request: message::Request<V>) -> Vec<Result<message::Response<V>, Error>> {
        let calls = self.peers.iter().enumerate().map(|(id, peer)| {
            let request = request.clone();
            async move {
                if id == self.id {
                    Ok(self.acceptor.handle(request))
                } else {
                    self.transport.call(*peer, request).await
                }
            }
        });
        future::join_all(calls).await
    }
}
