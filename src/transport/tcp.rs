use std::net::SocketAddr;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;

use crate::error::Error;
use crate::message;
use crate::socket;
use crate::state;
use crate::transport::Transport;

/// Opens a fresh connection per call, bounded by `timeout`.
#[derive(Copy, Clone, Debug)]
pub struct Tcp {
    timeout: Duration,
}

impl Tcp {
    pub fn new(timeout: Duration) -> Self {
        Tcp { timeout }
    }

    async fn exchange<V: state::Value>(
        peer: SocketAddr,
        request: message::Request<V>,
    ) -> Result<message::Response<V>, Error> {
        let stream = TcpStream::connect(peer)
            .await
            .map_err(|err| Error::Unreachable(peer, err))?;
        stream.set_nodelay(true)?;
        let (mut rx, mut tx) = socket::split::<message::Response<V>, message::Request<V>>(stream);
        trace!("sending {:?} to {}", request, peer);
        tx.send(request).await?;
        match rx.next().await {
        | Some(response) => response,
        | None => Err(Error::Closed(peer)),
        }
    }
}

impl<V: state::Value> Transport<V> for Tcp {
    fn call(
        &self,
        peer: SocketAddr,
        request: message::Request<V>,
    ) -> BoxFuture<'_, Result<message::Response<V>, Error>> {
        let timeout = self.timeout;
        async move {
            match tokio::time::timeout(timeout, Self::exchange(peer, request)).await {
            | Ok(response) => response,
            | Err(_) => Err(Error::Timeout(peer)),
            }
        }
        .boxed()
    }
}
