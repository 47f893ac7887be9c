use std::net::SocketAddr;

use futures::future::{BoxFuture, FutureExt};
use rand::Rng;

use crate::error::Error;
use crate::message;
use crate::state;
use crate::transport::Transport;

/// Chance out of 1000 that a request is discarded before it is sent.
const DROP_REQUEST: u32 = 100;

/// Chance out of 1000 that the reply to a delivered request is discarded.
const DROP_REPLY: u32 = 200;

/// Fault-injecting decorator around another transport.
#[derive(Clone, Debug)]
pub struct Unreliable<T> {
    inner: T,
    drop_request: u32,
    drop_reply: u32,
}

impl<T> Unreliable<T> {
    pub fn new(inner: T) -> Self {
        Unreliable {
            inner,
            drop_request: DROP_REQUEST,
            drop_reply: DROP_REPLY,
        }
    }

    /// Overrides the per-mille drop rates.
    pub fn with_rates(mut self, drop_request: u32, drop_reply: u32) -> Self {
        self.drop_request = drop_request;
        self.drop_reply = drop_reply;
        self
    }
}

impl<V: state::Value, T: Transport<V>> Transport<V> for Unreliable<T> {
    fn call(
        &self,
        peer: SocketAddr,
        request: message::Request<V>,
    ) -> BoxFuture<'_, Result<message::Response<V>, Error>> {
        let mut rng = rand::thread_rng();
        if rng.gen_range(0..1000) < self.drop_request {
            trace!("dropping request for {} to {}", request.seq(), peer);
            return futures::future::ready(Err(Error::Dropped(peer))).boxed()
        }
        let drop_reply = rng.gen_range(0..1000) < self.drop_reply;
        self.inner
            .call(peer, request)
            .map(move |response| match response {
            | Ok(_) if drop_reply => Err(Error::Dropped(peer)),
            | response => response,
            })
            .boxed()
    }
}
