use std::net::SocketAddr;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};

use crate::message;
use crate::socket;
use crate::state;
use crate::thread::acceptor::Acceptor;

/// Accepts connections from other peers until this peer is killed.
pub async fn listen<V: state::Value>(listener: TcpListener, acceptor: Acceptor<V>) {
    match listener.local_addr() {
    | Ok(addr) => info!("{} listening on {}", acceptor.id(), addr),
    | Err(err) => warn!("{} listening on unknown address: {}", acceptor.id(), err),
    }
    loop {
        let accepted = listener.accept().await;
        if acceptor.is_dead() {
            break
        }
        match accepted {
        | Ok((stream, addr)) => {
            tokio::spawn(Peer::new(stream, addr, acceptor.clone()).run());
        }
        | Err(err) => warn!("{} failed to accept: {}", acceptor.id(), err),
        }
    }
    info!("{} stopped listening", acceptor.id());
}

/// Serves requests arriving over one connection.
pub struct Peer<V: state::Value> {
    addr: SocketAddr,
    rx: socket::Rx<message::Request<V>>,
    tx: socket::Tx<message::Response<V>>,
    acceptor: Acceptor<V>,
}

impl<V: state::Value> Peer<V> {
    pub fn new(stream: TcpStream, addr: SocketAddr, acceptor: Acceptor<V>) -> Self {
        let (rx, tx) = socket::split(stream);
        trace!("{} connected to {}", acceptor.id(), addr);
        Peer {
            addr,
            rx,
            tx,
            acceptor,
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.rx.next().await {
            let request = match request {
            | Ok(request) => request,
            | Err(err) => {
                debug!("{} received garbage from {}: {}", self.acceptor.id(), self.addr, err);
                return
            }
            };

            // Killed peers hang up instead of answering
            let response = match self.acceptor.serve(request) {
            | Some(response) => response,
            | None => return,
            };

            if let Err(err) = self.tx.send(response).await {
                debug!("{} failed to reply to {}: {}", self.acceptor.id(), self.addr, err);
                return
            }
        }
    }
}

impl<V: state::Value> Drop for Peer<V> {
    fn drop(&mut self) {
        trace!("{} disconnected from {}", self.acceptor.id(), self.addr);
    }
}
