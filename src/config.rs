use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::error::Error;
use crate::paxos::Paxos;
use crate::shared;
use crate::state;
use crate::thread;
use crate::transport::{self, Transport};

#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct Config<V> {
    /// Every peer, in the same order on every peer
    peers: Vec<SocketAddr>,

    /// Index of this peer in `peers`
    id: usize,

    /// Timeout for a single request to another peer
    timeout: Duration,

    /// Upper bound on the random pause between lost rounds
    backoff: Option<Duration>,

    /// Randomly drop outgoing requests and replies
    unreliable: bool,

    #[derivative(Debug = "ignore")]
    _marker: std::marker::PhantomData<V>,
}

impl<V: state::Value> Config<V> {
    pub fn new(peers: Vec<SocketAddr>, id: usize) -> Self {
        Config {
            peers,
            id,
            timeout: Duration::from_secs(1),
            backoff: None,
            unreliable: false,
            _marker: Default::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = Some(backoff);
        self
    }

    pub fn with_unreliable(mut self, unreliable: bool) -> Self {
        self.unreliable = unreliable;
        self
    }

    /// Binds this peer's own address and starts serving other peers over TCP.
    pub async fn run(self) -> Result<Paxos<V>, Error> {
        self.validate()?;
        let listener = TcpListener::bind(self.peers[self.id]).await?;
        self.serve(listener)
    }

    /// Like `run`, but serves on a listener the caller has already bound.
    pub fn serve(self, listener: TcpListener) -> Result<Paxos<V>, Error> {
        self.validate()?;
        let paxos = self.build(transport::Tcp::new(self.timeout));
        let acceptor = paxos.acceptor().clone();
        paxos.attach(tokio::spawn(thread::peer::listen(listener, acceptor)));
        Ok(paxos)
    }

    /// Joins an in-process network instead of using TCP.
    pub fn local(self, network: &transport::Local<V>) -> Result<Paxos<V>, Error> {
        self.validate()?;
        let paxos = self.build(network.clone());
        network.register(self.peers[self.id], paxos.acceptor().clone());
        Ok(paxos)
    }

    fn build<T: Transport<V>>(&self, transport: T) -> Paxos<V> {
        let transport: Box<dyn Transport<V>> = if self.unreliable {
            Box::new(transport::Unreliable::new(transport))
        } else {
            Box::new(transport)
        };
        let shared = shared::Shared::new(self.id, self.peers.len());
        let acceptor = thread::acceptor::Acceptor::new(self.id, shared);
        Paxos::new(self.id, self.peers.clone(), acceptor, transport, self.backoff)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.peers.is_empty() {
            return Err(Error::Config("no peers".to_string()))
        }
        if self.id >= self.peers.len() {
            return Err(Error::Config(format!("peer {} out of {}", self.id, self.peers.len())))
        }
        for (i, peer) in self.peers.iter().enumerate() {
            if self.peers[..i].contains(peer) {
                return Err(Error::Config(format!("duplicate peer {}", peer)))
            }
        }
        Ok(())
    }
}
