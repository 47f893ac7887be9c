//! # Summary
//!
//! Point-to-point delivery of peer requests. The protocol only needs one
//! primitive: send a request to a peer and wait for its response or a
//! failure. Any failure is counted the same as a rejection, and is never
//! taken as proof that the peer is down.
//!
//! - `Tcp` dials the peer for every call and exchanges one frame each way.
//! - `Local` routes calls between peers living in the same process.
//! - `Unreliable` wraps another transport and randomly drops requests or replies.

use std::net::SocketAddr;

use futures::future::BoxFuture;

use crate::error::Error;
use crate::message;
use crate::state;

mod local;
mod tcp;
mod unreliable;

pub use self::local::Local;
pub use self::tcp::Tcp;
pub use self::unreliable::Unreliable;

/// Delivers one request to one peer.
pub trait Transport<V: state::Value>: Send + Sync + 'static {
    fn call(
        &self,
        peer: SocketAddr,
        request: message::Request<V>,
    ) -> BoxFuture<'_, Result<message::Response<V>, Error>>;
}
