use std::net::SocketAddr;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use hashbrown::HashMap as Map;
use parking_lot::RwLock;

use crate::error::Error;
use crate::message;
use crate::state;
use crate::thread::acceptor::Acceptor;
use crate::transport::Transport;

/// In-process network. Every peer built with `Config::local` on the same
/// `Local` can reach every other one; killed or unknown peers refuse calls.
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Default(bound = ""))]
pub struct Local<V: state::Value>(Arc<RwLock<Map<SocketAddr, Acceptor<V>>>>);

impl<V: state::Value> Local<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&self, addr: SocketAddr, acceptor: Acceptor<V>) {
        self.0.write().insert(addr, acceptor);
    }

    /// Removes `addr` from the network, as if its host had been unplugged.
    pub fn disconnect(&self, addr: &SocketAddr) {
        self.0.write().remove(addr);
    }
}

impl<V: state::Value> Transport<V> for Local<V> {
    fn call(
        &self,
        peer: SocketAddr,
        request: message::Request<V>,
    ) -> BoxFuture<'_, Result<message::Response<V>, Error>> {
        let acceptor = self.0.read().get(&peer).cloned();
        async move {
            // Delivery is never instantaneous.
            tokio::task::yield_now().await;
            acceptor
                .and_then(|acceptor| acceptor.serve(request))
                .ok_or_else(|| Error::Unreachable(peer, std::io::ErrorKind::ConnectionRefused.into()))
        }
        .boxed()
    }
}
